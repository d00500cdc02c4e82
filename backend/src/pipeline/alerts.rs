//! Distress-to-alert policy

/// Location recorded on alerts raised from chat
pub const CHAT_ALERT_LOCATION: &str = "Chat conversation";

/// Characters of the child's message copied into the alert
const ALERT_EXCERPT_CHARS: usize = 100;

/// Outcome of the alert policy for one child turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDecision {
    /// Write an alert the given parent will see
    Create {
        /// Linked parent's user id
        parent_id: String,
    },
    /// The message carried no distress signal
    SkipNoDistress,
    /// Distress, but nobody to notify
    SkipNoParent,
}

/// Decide whether a child turn raises an alert
pub fn decide_alert(distress_detected: bool, parent_id: Option<String>) -> AlertDecision {
    match (distress_detected, parent_id) {
        (false, _) => AlertDecision::SkipNoDistress,
        (true, None) => AlertDecision::SkipNoParent,
        (true, Some(parent_id)) => AlertDecision::Create { parent_id },
    }
}

/// Alert text for a distressing chat message
pub fn distress_alert_message(message: &str) -> String {
    let excerpt: String = message.chars().take(ALERT_EXCERPT_CHARS).collect();
    format!("Distress detected in chat: {}", excerpt)
}
