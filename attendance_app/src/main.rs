mod build;
mod config;
mod data;
mod health;
mod helper;
mod logging;
mod modules;
mod prelude;

use serenity::prelude::*;

use crate::build::{GIT_HASH, VERSION};
use crate::helper::discord::events::HEventHandler;
use crate::prelude::*;

fn main() -> anyhow::Result<()> {
    return inner();

    // short async fn to reduce `tokio::main` scope
    #[tokio::main]
    async fn inner() -> anyhow::Result<()> {
        let res = run().await;
        if let Err(why) = &res {
            log::error!("Exiting due to error: {why:?}");
        }

        log::logger().flush();
        res
    }
}

async fn run() -> Result {
    let config = config::load()?;
    logging::init(config.log)?;

    log::info!(target: "attendance_app::version", "Attendance Bot v{VERSION} - {GIT_HASH}");

    // the store must be reachable before any event can be handled
    let bot_data = Arc::new(HBotData::connect(config.bot).await?);

    let mut client = Client::builder(&config.discord.token, bot_data.intents())
        .event_handler(HEventHandler::new(Arc::clone(&bot_data)))
        .await
        .context("failed to init discord client")?;

    let nightly = modules::report::schedule::run(Arc::clone(&client.http), Arc::clone(&bot_data));
    let health = health::serve(config.health);
    let discord = async move {
        client
            .start()
            .await
            .context("discord client shut down unexpectedly")
    };

    tokio::try_join!(discord, nightly, health)?;
    Ok(())
}
