use attendance::checkin::{self, CheckinCandidate, Rejection, ThreadInfo};
use attendance::store::AttendanceStore as _;
use attendance::MemberId;
use chrono::{DateTime, Utc};

use super::prelude::*;
use crate::data::db::Record;
use crate::helper::bson::update_indices;
use crate::helper::discord::is_marked_by_self;

pub mod backfill;
mod config;

pub use config::Config;

pub struct Module;

impl super::Module for Module {
    fn intents(&self, _config: &HBotConfig) -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }

    fn validate(&self, config: &HBotConfig) -> Result {
        let limit = config.checkin.backfill_limit;
        anyhow::ensure!(
            (1..=100).contains(&limit),
            "checkin.backfill_limit must be between 1 and 100, but is {limit}"
        );

        anyhow::ensure!(
            !config.checkin.emoji.is_empty(),
            "checkin.emoji must not be empty"
        );

        Ok(())
    }

    async fn db_init(self, db: &mongodb::Database) -> Result {
        update_indices::<Record>(db).await?;
        Ok(())
    }
}

pub async fn message(ctx: &Context, data: &HBotData, new_message: &Message) {
    if let Err(why) = message_inner(ctx, data, new_message).await {
        log::error!("Check-in handling failed: {why:?}");
    }
}

async fn message_inner(ctx: &Context, data: &HBotData, new_message: &Message) -> Result {
    // cheap checks before asking for the channel
    if new_message.author.bot || new_message.guild_id != Some(data.config().guild) {
        return Ok(());
    }

    let channel = new_message
        .channel_id
        .to_channel(ctx)
        .await
        .context("cannot resolve message channel")?;

    let Channel::Guild(channel) = channel else {
        return Ok(());
    };

    record(&ctx.http, data, new_message, thread_info(&channel)).await?;
    Ok(())
}

/// Gets the thread details of a channel, if it is a thread.
pub(super) fn thread_info(channel: &GuildChannel) -> Option<ThreadInfo<'_>> {
    let is_thread = matches!(
        channel.kind,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
    );

    is_thread.then(|| ThreadInfo {
        name: &channel.name,
        parent: channel.parent_id.map(ChannelId::get),
    })
}

/// Records a message as a check-in if it qualifies and marks it.
///
/// Returns whether the message was recorded.
async fn record(
    http: &Http,
    data: &HBotData,
    message: &Message,
    thread: Option<ThreadInfo<'_>>,
) -> Result<bool> {
    let config = &data.config().checkin;
    let reaction = config.reaction();

    let candidate = CheckinCandidate {
        author: MemberId(message.author.id.get()),
        author_is_bot: message.author.bot,
        thread,
        has_image: checkin::has_image(
            message
                .attachments
                .iter()
                .map(|a| a.content_type.as_deref()),
        ),
        already_marked: is_marked_by_self(message, &reaction),
    };

    let checkin = match checkin::evaluate(&candidate, config.parent_channel.get()) {
        Ok(checkin) => checkin,
        Err(Rejection::AlreadyMarked) => {
            log::trace!("Message {} is already marked.", message.id);
            return Ok(false);
        },
        Err(_) => return Ok(false),
    };

    data.store()
        .upsert_checkin(checkin, submitted_at(message))
        .await
        .context("failed to store check-in")?;

    message
        .react(http, reaction)
        .await
        .context("failed to mark check-in")?;

    log::info!(
        "Recorded check-in of {} ({}) for {}.",
        message.author.name,
        checkin.user,
        checkin.date,
    );

    Ok(true)
}

/// When the message was posted.
fn submitted_at(message: &Message) -> DateTime<Utc> {
    DateTime::from_timestamp(message.timestamp.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}
