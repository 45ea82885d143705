#![forbid(unsafe_code)]

//! Typewriter headline.
//!
//! Three pieces of state drive the effect: which phrase is showing, how many
//! of its characters are visible, and whether it is being typed or deleted.
//! Each [`TypingEffect::step`] returns the text to show and how long to wait
//! before the next step.

use std::time::Duration;

use crate::config::TypingConfig;

/// Typewriter state machine.
#[derive(Debug, Clone)]
pub struct TypingEffect {
    phrases: Vec<Vec<char>>,
    phrase: usize,
    visible: usize,
    deleting: bool,
    type_delay: Duration,
    delete_delay: Duration,
    hold: Duration,
    pause: Duration,
}

/// Output of one typing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingFrame {
    pub text: String,
    pub next: Duration,
}

impl TypingEffect {
    /// Build from config. Returns `None` when there is nothing to type.
    #[must_use]
    pub fn from_config(config: &TypingConfig) -> Option<Self> {
        let phrases: Vec<Vec<char>> = config
            .phrases
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.chars().collect())
            .collect();
        if phrases.is_empty() {
            return None;
        }
        Some(Self {
            phrases,
            phrase: 0,
            visible: 0,
            deleting: false,
            type_delay: Duration::from_millis(config.type_ms),
            delete_delay: Duration::from_millis(config.delete_ms),
            hold: Duration::from_millis(config.hold_ms),
            pause: Duration::from_millis(config.pause_ms),
        })
    }

    /// Advance by one character.
    pub fn step(&mut self) -> TypingFrame {
        let len = self.phrases[self.phrase].len();
        let next = if self.deleting {
            self.visible = self.visible.saturating_sub(1);
            if self.visible == 0 {
                self.deleting = false;
                self.phrase = (self.phrase + 1) % self.phrases.len();
                self.pause
            } else {
                self.delete_delay
            }
        } else {
            self.visible = (self.visible + 1).min(len);
            if self.visible == len {
                self.deleting = true;
                self.hold
            } else {
                self.type_delay
            }
        };
        // `phrase` may have moved on; the text shown is the one just edited.
        let shown = if self.visible == 0 {
            String::new()
        } else {
            self.phrases[self.phrase][..self.visible].iter().collect()
        };
        TypingFrame { text: shown, next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(phrases: &[&str]) -> TypingEffect {
        TypingEffect::from_config(&TypingConfig {
            phrases: phrases.iter().map(|p| (*p).to_owned()).collect(),
            ..TypingConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn types_holds_deletes_and_moves_on() {
        let mut t = effect(&["ab", "x"]);
        let frames: Vec<(String, u64)> = (0..7)
            .map(|_| {
                let f = t.step();
                (f.text, f.next.as_millis() as u64)
            })
            .collect();
        assert_eq!(
            frames,
            vec![
                ("a".to_owned(), 100),
                ("ab".to_owned(), 2000),
                ("a".to_owned(), 50),
                (String::new(), 500),
                ("x".to_owned(), 2000),
                (String::new(), 500),
                ("a".to_owned(), 100),
            ]
        );
    }

    #[test]
    fn empty_phrases_disable() {
        assert!(
            TypingEffect::from_config(&TypingConfig {
                phrases: vec![String::new()],
                ..TypingConfig::default()
            })
            .is_none()
        );
    }

    #[test]
    fn multibyte_phrases_step_by_char() {
        let mut t = effect(&["né"]);
        assert_eq!(t.step().text, "n");
        assert_eq!(t.step().text, "né");
    }
}
