//! Decides whether a message counts as a check-in.

use crate::{MemberId, MonthDay};

/// The thread a message was posted in.
#[derive(Debug, Clone, Copy)]
pub struct ThreadInfo<'a> {
    /// The thread's display name. Check-in threads are named `MM/DD`.
    pub name: &'a str,
    /// The channel the thread was created in.
    pub parent: Option<u64>,
}

/// The facts about a single message that matter for check-ins.
#[derive(Debug, Clone, Copy)]
pub struct CheckinCandidate<'a> {
    pub author: MemberId,
    pub author_is_bot: bool,
    /// Set if the message was posted inside a thread.
    pub thread: Option<ThreadInfo<'a>>,
    /// Whether any attachment is an image. See [`has_image`].
    pub has_image: bool,
    /// Whether this bot already marked the message.
    pub already_marked: bool,
}

/// A qualifying check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkin {
    pub user: MemberId,
    pub date: MonthDay,
}

/// Why a message does not count as a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("author is a bot")]
    Bot,
    #[error("not posted in a thread")]
    NotThread,
    #[error("thread is not under the check-in channel")]
    WrongParent,
    #[error("thread name is not a date label")]
    BadLabel,
    #[error("no image attached")]
    NoImage,
    #[error("already marked")]
    AlreadyMarked,
}

/// Checks a message against the check-in rules.
///
/// `parent` is the channel whose threads are the daily check-in threads.
/// The rules are checked in order and the first failing one is returned.
///
/// # Errors
///
/// Returns the first [`Rejection`] that applies.
pub fn evaluate(candidate: &CheckinCandidate<'_>, parent: u64) -> Result<Checkin, Rejection> {
    if candidate.author_is_bot {
        return Err(Rejection::Bot);
    }

    let thread = candidate.thread.ok_or(Rejection::NotThread)?;
    if thread.parent != Some(parent) {
        return Err(Rejection::WrongParent);
    }

    let date = MonthDay::parse_label(thread.name).ok_or(Rejection::BadLabel)?;

    if !candidate.has_image {
        return Err(Rejection::NoImage);
    }

    if candidate.already_marked {
        return Err(Rejection::AlreadyMarked);
    }

    Ok(Checkin {
        user: candidate.author,
        date,
    })
}

/// Whether any of the declared attachment content types is an image.
pub fn has_image<'a>(content_types: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    content_types
        .into_iter()
        .flatten()
        .any(|t| t.starts_with("image/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARENT: u64 = 1000;

    fn candidate(name: &str) -> CheckinCandidate<'_> {
        CheckinCandidate {
            author: MemberId(7),
            author_is_bot: false,
            thread: Some(ThreadInfo {
                name,
                parent: Some(PARENT),
            }),
            has_image: true,
            already_marked: false,
        }
    }

    #[test]
    fn qualifies() {
        let checkin = evaluate(&candidate("06/23"), PARENT).expect("should qualify");
        assert_eq!(checkin.user, MemberId(7));
        assert_eq!(checkin.date.key(), "06-23");
    }

    #[test]
    fn rejects_each_rule() {
        let bot = CheckinCandidate {
            author_is_bot: true,
            ..candidate("06/23")
        };
        assert_eq!(evaluate(&bot, PARENT), Err(Rejection::Bot));

        let top_level = CheckinCandidate {
            thread: None,
            ..candidate("06/23")
        };
        assert_eq!(evaluate(&top_level, PARENT), Err(Rejection::NotThread));

        assert_eq!(evaluate(&candidate("06/23"), PARENT + 1), Err(Rejection::WrongParent));
        assert_eq!(evaluate(&candidate("잡담"), PARENT), Err(Rejection::BadLabel));

        let marked = CheckinCandidate {
            already_marked: true,
            ..candidate("06/23")
        };
        assert_eq!(evaluate(&marked, PARENT), Err(Rejection::AlreadyMarked));
    }

    #[test]
    fn no_image_never_qualifies() {
        let text_only = CheckinCandidate {
            has_image: false,
            ..candidate("06/23")
        };
        assert_eq!(evaluate(&text_only, PARENT), Err(Rejection::NoImage));
    }

    #[test]
    fn image_content_types() {
        assert!(has_image([Some("image/png")]));
        assert!(has_image([None, Some("text/plain"), Some("image/jpeg")]));
        assert!(!has_image([Some("video/mp4"), None]));
        assert!(!has_image(std::iter::empty()));
    }
}
