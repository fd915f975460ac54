//! Upstream response parsing.

use crate::analyzer::Analysis;

/// Score used when the upstream reply carries none we can parse.
pub const FALLBACK_SCORE: f64 = 5.0;

/// Parse a raw model reply of the form:
///
/// ```text
/// SCORE: 8.5
///
/// FEEDBACK:
/// <detailed feedback>
/// ```
///
/// A missing or unparseable score is *not* an error: the full reply becomes
/// the report and the score falls back to [`FALLBACK_SCORE`]. A degraded
/// result reaches the user; an internal parse hiccup does not.
pub fn parse_analysis(raw: &str) -> Analysis {
    let score = raw
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("SCORE:"))
        .and_then(|rest| rest.trim().parse::<f64>().ok());

    match score {
        Some(score) => Analysis {
            report: feedback_section(raw),
            score,
        },
        None => {
            tracing::warn!("no parseable score in analysis reply, using fallback");
            Analysis {
                report: raw.trim().to_string(),
                score: FALLBACK_SCORE,
            }
        }
    }
}

/// Everything after the `FEEDBACK:` marker, or the reply minus its score
/// line when the marker is absent.
fn feedback_section(raw: &str) -> String {
    match raw.find("FEEDBACK:") {
        Some(idx) => raw[idx + "FEEDBACK:".len()..].trim().to_string(),
        None => raw
            .lines()
            .filter(|line| !line.trim_start().starts_with("SCORE:"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
    }
}
