//! Line-based test shortcuts read from stdin.

use mirror_core::{EmotionState, PersonState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Force a state without waiting on the backend.
    Override(PersonState, EmotionState),
    /// Drop back to the awakening state until the next cycle.
    Retry,
    /// Change the synthetic source's brightness.
    Level(u8),
    Quit,
}

/// Parse one input line.
///
/// `1` primary (happy), `2` someone else, `3` nobody, `r` retry,
/// `l <0-255>` set pattern brightness, `q` quit.
pub fn parse(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let cmd = match parts.next()? {
        "1" => Command::Override(PersonState::RecognizedPrimary, EmotionState::Happy),
        "2" => Command::Override(PersonState::RecognizedOther, EmotionState::Neutral),
        "3" => Command::Override(PersonState::NoFaceDetected, EmotionState::Neutral),
        "r" | "retry" => Command::Retry,
        "l" | "level" => Command::Level(parts.next()?.parse().ok()?),
        "q" | "quit" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

pub const HELP: &str = "keys: 1 primary | 2 other | 3 none | r retry | l <0-255> brightness | q quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_keys() {
        assert_eq!(
            parse("1"),
            Some(Command::Override(PersonState::RecognizedPrimary, EmotionState::Happy))
        );
        assert_eq!(
            parse(" 2 "),
            Some(Command::Override(PersonState::RecognizedOther, EmotionState::Neutral))
        );
        assert_eq!(
            parse("3"),
            Some(Command::Override(PersonState::NoFaceDetected, EmotionState::Neutral))
        );
    }

    #[test]
    fn test_level() {
        assert_eq!(parse("l 40"), Some(Command::Level(40)));
        assert_eq!(parse("level 300"), None);
        assert_eq!(parse("l"), None);
    }

    #[test]
    fn test_other_keys() {
        assert_eq!(parse("r"), Some(Command::Retry));
        assert_eq!(parse("q"), Some(Command::Quit));
        assert_eq!(parse(""), None);
        assert_eq!(parse("4"), None);
    }
}
