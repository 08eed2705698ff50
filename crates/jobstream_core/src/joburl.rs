use std::sync::OnceLock;

use regex::Regex;

fn canonical_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https://www\.linkedin\.com/jobs/view/\d+").expect("valid regex")
    })
}

fn validation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https://(www\.)?linkedin\.com/jobs/view/.+$").expect("valid regex")
    })
}

/// Extract the canonical job-posting URL from arbitrary input.
///
/// Returns exactly the matched `https://www.linkedin.com/jobs/view/<digits>`
/// substring, discarding any trailing query or path. When the pattern does
/// not appear, the input is returned unchanged; callers must validate
/// independently with [`is_valid_job_url`].
pub fn extract_job_url(input: &str) -> &str {
    match canonical_pattern().find(input) {
        Some(found) => found.as_str(),
        None => input,
    }
}

/// Whether the entire input is a LinkedIn job-posting URL.
///
/// Stricter than [`extract_job_url`]: the whole string must match, not just
/// a prefix. Used to gate submission before any network call.
pub fn is_valid_job_url(input: &str) -> bool {
    validation_pattern().is_match(input)
}
