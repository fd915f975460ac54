//! User-facing notification texts.

pub(crate) fn submitted() -> String {
    "Your document review request has been submitted and is pending processing.".to_string()
}

pub(crate) fn processing() -> String {
    "Your document review request is now being processed.".to_string()
}

pub(crate) fn completed() -> String {
    "Your document review is now complete and ready to view.".to_string()
}

pub(crate) fn failed(reason: &str) -> String {
    format!("Your document review failed to process: {reason}. Your credits have been refunded.")
}
