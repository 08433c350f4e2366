use bson::doc;
use serenity::model::gateway::GatewayIntents;

use crate::config::HBotConfig;
use crate::modules::{Module as _, for_each_module};
use crate::prelude::*;

pub mod db;

pub use db::MongoStore;

/// The global bot data. Only one instance exists per bot.
///
/// Created once at startup and handed to every event handler and task.
#[derive(Debug)]
pub struct HBotData {
    /// The bot configuration.
    config: HBotConfig,
    /// Where check-ins are stored.
    store: MongoStore,
}

impl HBotData {
    /// Validates the configuration, connects to the database, and prepares its
    /// collections.
    pub async fn connect(config: HBotConfig) -> Result<Self> {
        for_each_module!(|m| m.validate(&config)?);

        let client = mongodb::Client::with_uri_str(&config.mongodb_uri)
            .await
            .context("failed to connect to database cluster")?;

        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.database));

        // the client connects lazily, so make sure the server is actually there
        db.run_command(doc! { "ping": 1 })
            .await
            .context("database did not respond to ping")?;

        for_each_module!(|m| m.db_init(&db).await?);

        log::info!("Connected to MongoDB database `{}`.", db.name());

        Ok(Self {
            config,
            store: MongoStore::new(db),
        })
    }

    /// Gets the bot configuration.
    #[must_use]
    pub fn config(&self) -> &HBotConfig {
        &self.config
    }

    /// Gets the check-in store.
    #[must_use]
    pub fn store(&self) -> &MongoStore {
        &self.store
    }

    /// Gets the gateway intents needed by all modules.
    #[must_use]
    pub fn intents(&self) -> GatewayIntents {
        let mut intents = GatewayIntents::GUILDS;
        for_each_module!(|m| intents |= m.intents(&self.config));
        intents
    }
}
