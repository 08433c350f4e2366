//! Catches up on check-ins posted while the bot was offline.

use attendance::MonthDay;
use serenity::builder::GetMessages;

use super::{record, thread_info};
use crate::modules::prelude::*;

/// Scans the active check-in threads and records any qualifying message that
/// was not marked yet.
///
/// Failures are logged. One failed thread or message doesn't stop the others.
pub async fn scan_missed_checkins(http: &Http, data: &HBotData) {
    let config = data.config();
    let parent = config.checkin.parent_channel;

    let parent_guild = match parent.to_channel(http).await {
        Ok(Channel::Guild(channel)) => Some(channel.guild_id),
        Ok(_) => None,
        Err(why) => {
            log::warn!("Cannot scan for missed check-ins, check-in channel {parent} not found: {why:?}");
            return;
        },
    };

    if let Err(why) = check_parent(parent, parent_guild, config.guild) {
        log::warn!("Cannot scan for missed check-ins: {why}");
        return;
    }

    let threads = match config.guild.get_active_threads(http).await {
        Ok(threads) => threads.threads,
        Err(why) => {
            log::warn!("Cannot scan for missed check-ins, guild threads unavailable: {why:?}");
            return;
        },
    };

    let threads: Vec<_> = threads
        .into_iter()
        .filter(|t| t.parent_id == Some(parent) && MonthDay::parse_label(&t.name).is_some())
        .collect();

    log::info!("Scanning {} check-in threads for missed check-ins.", threads.len());

    let mut recorded = 0usize;
    for thread in &threads {
        match scan_thread(http, data, thread).await {
            Ok(count) => recorded += count,
            Err(why) => log::error!("Failed to scan thread {} ({}): {why:?}", thread.name, thread.id),
        }
    }

    log::info!("Recorded {recorded} missed check-ins.");
}

/// Ensures the resolved check-in channel belongs to the tracked guild.
fn check_parent(parent: ChannelId, parent_guild: Option<GuildId>, guild: GuildId) -> Result {
    match parent_guild {
        Some(g) if g == guild => Ok(()),
        Some(g) => anyhow::bail!("check-in channel {parent} is in guild {g}, not {guild}"),
        None => anyhow::bail!("check-in channel {parent} is not a guild channel"),
    }
}

async fn scan_thread(http: &Http, data: &HBotData, thread: &GuildChannel) -> Result<usize> {
    let limit = data.config().checkin.backfill_limit;
    let messages = thread
        .id
        .messages(http, GetMessages::new().limit(limit))
        .await
        .context("cannot fetch thread messages")?;

    fn with_id(m: &Message) -> (MessageId, &Message) {
        (m.id, m)
    }

    let recorded = record_each(messages.iter().map(with_id), move |message| {
        record(http, data, message, thread_info(thread))
    })
    .await;

    Ok(recorded)
}

/// Runs `record` for every message and counts the recorded ones.
///
/// A failed message is logged and skipped.
async fn record_each<I, T, F, Fut>(messages: I, mut record: F) -> usize
where
    I: IntoIterator<Item = (MessageId, T)>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let mut recorded = 0usize;
    for (id, message) in messages {
        match record(message).await {
            Ok(true) => recorded += 1,
            Ok(false) => {},
            Err(why) => log::error!("Failed to record message {id}: {why:?}"),
        }
    }

    recorded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_must_be_in_the_guild() {
        let parent = ChannelId::new(5);
        let guild = GuildId::new(1);

        check_parent(parent, Some(guild), guild).expect("same guild");
        check_parent(parent, Some(GuildId::new(2)), guild).expect_err("other guild");
        check_parent(parent, None, guild).expect_err("not a guild channel");
    }

    #[tokio::test]
    async fn failed_message_does_not_stop_the_scan() {
        let messages = [
            (MessageId::new(1), Ok(true)),
            (MessageId::new(2), Err(anyhow::anyhow!("Unknown Message"))),
            (MessageId::new(3), Ok(false)),
            (MessageId::new(4), Ok(true)),
        ];

        let mut seen = 0;
        let recorded = record_each(messages, |outcome| {
            seen += 1;
            async move { outcome }
        })
        .await;

        assert_eq!(seen, 4, "every message is tried");
        assert_eq!(recorded, 2);
    }
}
