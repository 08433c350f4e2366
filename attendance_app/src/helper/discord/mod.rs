use serenity::http::Http;

use crate::prelude::*;

pub mod events;

/// The maximum length of a Discord message's content, in characters.
const MAX_MESSAGE_LEN: usize = 2000;

/// Checks whether this bot already added `emoji` to the message.
pub fn is_marked_by_self(message: &Message, emoji: &ReactionType) -> bool {
    message
        .reactions
        .iter()
        .any(|r| r.me && r.reaction_type == *emoji)
}

/// Sends text to a channel, splitting it into several messages if it doesn't
/// fit into one.
pub async fn send_chunked(http: &Http, channel: ChannelId, content: &str) -> Result {
    for chunk in split_message(content, MAX_MESSAGE_LEN) {
        channel.say(http, chunk).await?;
    }

    Ok(())
}

/// Splits text into pieces of at most `max` characters.
///
/// Splits prefer line breaks, then `", "` separators in mention lists, and
/// only cut in the middle of a word as a last resort.
fn split_message(content: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in pieces(content, max) {
        let sep_len = usize::from(!current.is_empty());
        if current.chars().count() + sep_len + piece.chars().count() > max {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push('\n');
        }

        current.push_str(&piece);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Breaks text into lines, each at most `max` characters.
fn pieces(content: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in content.lines() {
        if line.chars().count() <= max {
            out.push(line.to_owned());
            continue;
        }

        let mut current = String::new();
        for part in line.split_inclusive(", ") {
            if !current.is_empty() && current.chars().count() + part.chars().count() > max {
                out.push(std::mem::take(&mut current));
            }

            current.push_str(part);

            // a single part longer than a message gets hard-cut
            while current.chars().count() > max {
                let cut = current
                    .char_indices()
                    .nth(max)
                    .map_or(current.len(), |(i, _)| i);
                let rest = current.split_off(cut);
                out.push(std::mem::replace(&mut current, rest));
            }
        }

        if !current.is_empty() {
            out.push(current);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::split_message;

    #[test]
    fn short_message_is_kept() {
        assert_eq!(split_message("a\nb", 2000), ["a\nb"]);
    }

    #[test]
    fn splits_on_lines() {
        assert_eq!(split_message("aaaa\nbbbb\ncc", 9), ["aaaa\nbbbb", "cc"]);
    }

    #[test]
    fn splits_long_mention_lists() {
        let chunks = split_message("<@1>, <@2>, <@3>", 12);
        assert_eq!(chunks, ["<@1>, <@2>, ", "<@3>"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
    }

    #[test]
    fn hard_cuts_unbroken_text() {
        assert_eq!(split_message("abcdefgh", 3), ["abc", "def", "gh"]);
    }
}
