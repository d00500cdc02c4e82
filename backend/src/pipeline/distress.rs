//! Distress heuristic
//!
//! Keyword matching on the child's own message. Misses synonyms, other
//! languages and indirect disclosure; the list is a product decision and
//! stays as is.

/// Keywords that flag a child message for a parent alert
pub const DISTRESS_KEYWORDS: [&str; 7] = [
    "hurt",
    "uncomfortable",
    "scared",
    "touched",
    "secret",
    "help",
    "afraid",
];

/// Case-insensitive substring match against [`DISTRESS_KEYWORDS`]
pub fn detect_distress(message: &str) -> bool {
    let lower = message.to_lowercase();
    DISTRESS_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Keywords present in the message, in list order
pub fn matched_keywords(message: &str) -> Vec<&'static str> {
    let lower = message.to_lowercase();
    DISTRESS_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lower.contains(keyword))
        .collect()
}
