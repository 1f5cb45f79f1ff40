//! Heuristic for clipboard text that looks like a copied AI reply.

use crate::domain::config::ClipboardConfig;

/// Whether `text` is long enough and carries one of the configured markers.
#[must_use]
pub fn looks_like_ai_reply(text: &str, config: &ClipboardConfig) -> bool {
    text.chars().count() > config.min_length
        && config.markers.iter().any(|m| text.contains(m.as_str()))
}

/// Tracks clipboard reads in follow mode so each reply is offered once.
#[derive(Debug)]
pub struct ReplyDetector {
    config: ClipboardConfig,
    last_offered: Option<String>,
}

impl ReplyDetector {
    #[must_use]
    pub const fn new(config: ClipboardConfig) -> Self {
        Self {
            config,
            last_offered: None,
        }
    }

    /// Whether `text` should be offered as a paste. Text equal to the
    /// previous offer is not offered again.
    pub fn offer(&mut self, text: &str) -> bool {
        if !looks_like_ai_reply(text, &self.config) {
            return false;
        }
        if self.last_offered.as_deref() == Some(text) {
            return false;
        }
        self.last_offered = Some(text.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_and_length_required() {
        let config = ClipboardConfig::default();

        assert!(looks_like_ai_reply(
            "JEMAI says: here is the refactored function",
            &config
        ));
        assert!(!looks_like_ai_reply("JEMAI: ok", &config));
        assert!(!looks_like_ai_reply(
            "a long clipboard string without any marker in it",
            &config
        ));
    }

    #[test]
    fn test_length_is_strictly_greater() {
        let config = ClipboardConfig {
            min_length: 6,
            markers: vec!["OpenAI".into()],
            ..Default::default()
        };
        assert!(!looks_like_ai_reply("OpenAI", &config));
        assert!(looks_like_ai_reply("OpenAI!", &config));
    }

    #[test]
    fn test_detector_offers_each_reply_once() {
        let mut detector = ReplyDetector::new(ClipboardConfig::default());
        let reply = "JEMAI says: here is the refactored function";

        assert!(detector.offer(reply));
        assert!(!detector.offer(reply));
        assert!(!detector.offer("short"));
        assert!(!detector.offer(reply));
        assert!(detector.offer("OpenAI answer with a different body of text"));
        assert!(detector.offer(reply));
    }
}
