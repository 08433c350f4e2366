use attendance::command::{Command, CommandError};
use attendance::report::{cumulative_report, cumulative_start, daily_report, weekly_report};
use chrono::Local;

use super::prelude::*;
use crate::helper::discord::send_chunked;

mod config;
pub mod roster;
pub mod schedule;

pub use config::Config;

pub struct Module;

impl super::Module for Module {
    fn intents(&self, _config: &HBotConfig) -> GatewayIntents {
        GatewayIntents::GUILD_MEMBERS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }

    fn validate(&self, config: &HBotConfig) -> Result {
        let start = config.report.program_start;
        let today = Local::now().date_naive();
        anyhow::ensure!(
            start <= today,
            "report.program_start {start} is in the future"
        );

        let (earliest, truncated) = cumulative_start(start, today);
        if truncated {
            log::warn!(
                "report.program_start {start} is more than a year ago, fines only count from {earliest}"
            );
        }

        Ok(())
    }
}

pub async fn message(http: &Http, data: &HBotData, new_message: &Message) {
    if let Err(why) = message_inner(http, data, new_message).await {
        log::error!("Command handling failed: {why:?}");
    }
}

async fn message_inner(http: &Http, data: &HBotData, new_message: &Message) -> Result {
    if new_message.author.bot || new_message.guild_id != Some(data.config().guild) {
        return Ok(());
    }

    let Some(command) = Command::parse(&new_message.content) else {
        return Ok(());
    };

    let command = match command {
        Ok(command) => command,
        Err(why) => return reply_error(http, new_message, why).await,
    };

    log::info!("{} used {command:?}.", new_message.author.name);

    let config = data.config();
    let roster = roster::fetch_roster(http, config.guild).await?;
    let today = Local::now().date_naive();

    match command {
        Command::Missing(date) => {
            let report = daily_report(data.store(), &roster, date).await?;
            send_chunked(http, config.report.notice_channel, &report.to_string()).await?;
        },
        Command::Weekly(date) => {
            let Some(date) = date.resolve_near(today) else {
                return reply_error(http, new_message, CommandError::Format).await;
            };

            let report = weekly_report(data.store(), &roster, date).await?;
            send_chunked(http, config.report.report_channel(), &report.to_string()).await?;
        },
        Command::Fines => {
            let report = cumulative_report(
                data.store(),
                &roster,
                config.report.program_start,
                today,
                config.report.fine_per_miss,
            )
            .await?;

            send_chunked(http, config.report.report_channel(), &report.to_string()).await?;
        },
    }

    Ok(())
}

async fn reply_error(http: &Http, message: &Message, error: CommandError) -> Result {
    message
        .channel_id
        .say(http, error.to_string())
        .await
        .context("cannot reply to command")?;

    Ok(())
}
