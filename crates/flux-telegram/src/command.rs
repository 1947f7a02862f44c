//! Bot commands understood by fluxcdbot.

use std::fmt;

/// A lifecycle command sent by a chat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `/start`: register the chat and receive a webhook URL.
    Start,
    /// `/rotate`: replace the chat's webhook secret.
    Rotate,
}

impl Command {
    /// Parses the command at the start of a message.
    ///
    /// Accepts `/start` and `/rotate`, optionally addressed as
    /// `/start@botname`, followed by arguments which are ignored. When
    /// `bot_username` is known, commands addressed to another bot are
    /// rejected. Matching is case-sensitive, as in the Bot API.
    #[must_use]
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let word = word.strip_prefix('/')?;

        let (name, target) = match word.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (word, None),
        };

        if let (Some(target), Some(me)) = (target, bot_username) {
            if !target.eq_ignore_ascii_case(me) {
                return None;
            }
        }

        match name {
            "start" => Some(Self::Start),
            "rotate" => Some(Self::Rotate),
            _ => None,
        }
    }

    /// The command's name without the leading slash.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Rotate => "rotate",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}
