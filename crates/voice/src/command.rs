//! Utterance classification.

use docqa_core::{AppError, AppResult};
use regex::Regex;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Remind { description: String, minutes: i64 },
    Note,
    Other(String),
}

/// Matches utterances against the fixed command set.
///
/// Rules are checked on the lowercased utterance in order: quit, remind, note.
#[derive(Debug, Clone)]
pub struct CommandParser {
    remind: Regex,
}

impl CommandParser {
    pub fn new() -> AppResult<Self> {
        let remind = Regex::new(r"^remind me to (.+) in (\d+) minutes")
            .map_err(|e| AppError::Config(format!("Invalid reminder pattern: {}", e)))?;
        Ok(Self { remind })
    }

    pub fn parse(&self, utterance: &str) -> Command {
        let text = utterance.to_lowercase();

        if text.contains("quit") {
            return Command::Quit;
        }

        if let Some(caps) = self.remind.captures(&text) {
            // Digit runs too long for i64 fall through to the remaining rules
            if let Ok(minutes) = caps[2].parse::<i64>() {
                return Command::Remind {
                    description: caps[1].to_string(),
                    minutes,
                };
            }
        }

        if text.contains("note") {
            return Command::Note;
        }

        Command::Other(utterance.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Command {
        CommandParser::new().unwrap().parse(text)
    }

    #[test]
    fn test_quit_anywhere() {
        assert_eq!(parse("OK QUIT now"), Command::Quit);
        // Quit wins over everything else
        assert_eq!(parse("remind me to quit in 5 minutes"), Command::Quit);
    }

    #[test]
    fn test_remind() {
        assert_eq!(
            parse("Remind me to Call Mom in 15 minutes"),
            Command::Remind {
                description: "call mom".to_string(),
                minutes: 15
            }
        );
    }

    #[test]
    fn test_remind_description_is_greedy() {
        assert_eq!(
            parse("remind me to check in 2 minutes in 10 minutes"),
            Command::Remind {
                description: "check in 2 minutes".to_string(),
                minutes: 10
            }
        );
    }

    #[test]
    fn test_remind_must_start_utterance() {
        assert_eq!(
            parse("please remind me to stretch in 5 minutes"),
            Command::Other("please remind me to stretch in 5 minutes".to_string())
        );
    }

    #[test]
    fn test_remind_beats_note() {
        assert_eq!(
            parse("remind me to take a note in 1 minutes"),
            Command::Remind {
                description: "take a note".to_string(),
                minutes: 1
            }
        );
    }

    #[test]
    fn test_note() {
        assert_eq!(parse("Take a NOTE"), Command::Note);
        assert_eq!(parse("notebook"), Command::Note);
    }

    #[test]
    fn test_other_keeps_original_text() {
        assert_eq!(
            parse("What's the Weather?"),
            Command::Other("What's the Weather?".to_string())
        );
    }
}
