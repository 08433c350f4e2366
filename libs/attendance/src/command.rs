//! Parses the text commands members can post in chat.

use crate::MonthDay;

/// A recognized text command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `!누락자 MM/DD`: who missed the given day.
    Missing(MonthDay),
    /// `!주간누락 MM/DD`: per-member misses for the week containing the day.
    Weekly(MonthDay),
    /// `!누적벌금`: fines accumulated since the program started.
    Fines,
}

/// A recognized command with bad arguments.
///
/// The message is meant to be shown to the member as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("사용법: {command} MM/DD")]
    Usage { command: &'static str },
    #[error("날짜 형식이 올바르지 않습니다. 예: 06/23")]
    Format,
}

impl Command {
    pub const MISSING: &str = "!누락자";
    pub const WEEKLY: &str = "!주간누락";
    pub const FINES: &str = "!누적벌금";

    /// Parses a message's content.
    ///
    /// Returns [`None`] if the message isn't a command at all.
    #[must_use]
    pub fn parse(content: &str) -> Option<Result<Self, CommandError>> {
        let mut tokens = content.split_whitespace();
        let name = tokens.next()?;

        let command = match name {
            Self::MISSING => date_arg(Self::MISSING, tokens).map(Self::Missing),
            Self::WEEKLY => date_arg(Self::WEEKLY, tokens).map(Self::Weekly),
            Self::FINES => Ok(Self::Fines),
            _ => return None,
        };

        Some(command)
    }
}

fn date_arg<'a>(
    command: &'static str,
    mut args: impl Iterator<Item = &'a str>,
) -> Result<MonthDay, CommandError> {
    let (Some(arg), None) = (args.next(), args.next()) else {
        return Err(CommandError::Usage { command });
    };

    MonthDay::parse_label(arg).ok_or(CommandError::Format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(month: u32, day: u32) -> MonthDay {
        MonthDay::new(month, day).expect("valid test date")
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("!누락자 06/23"), Some(Ok(Command::Missing(md(6, 23)))));
        assert_eq!(Command::parse("  !주간누락   06/25 "), Some(Ok(Command::Weekly(md(6, 25)))));
        assert_eq!(Command::parse("!누적벌금"), Some(Ok(Command::Fines)));
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("오늘 인증 완료!"), None);
        assert_eq!(Command::parse("!누락자06/23"), None);
    }

    #[test]
    fn wrong_arg_count() {
        assert_eq!(
            Command::parse("!누락자"),
            Some(Err(CommandError::Usage { command: Command::MISSING }))
        );
        assert_eq!(
            Command::parse("!주간누락 06/23 06/24"),
            Some(Err(CommandError::Usage { command: Command::WEEKLY }))
        );
    }

    #[test]
    fn bad_date_format() {
        assert_eq!(Command::parse("!누락자 2025"), Some(Err(CommandError::Format)));
        assert_eq!(Command::parse("!주간누락 6/23"), Some(Err(CommandError::Format)));
        assert_eq!(Command::parse("!누락자 02/30"), Some(Err(CommandError::Format)));
    }

    #[test]
    fn error_messages() {
        let usage = CommandError::Usage { command: Command::MISSING };
        assert_eq!(usage.to_string(), "사용법: !누락자 MM/DD");
    }
}
