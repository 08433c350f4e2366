use std::borrow::Cow;

use anyhow::Context as _;
use serde::Deserialize;
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use self::setup::{Builder, Env, File, TomlText};

pub mod setup;
mod token_parse;

/// Selects the `attendance_app.<profile>.toml` layer.
const PROFILE_VAR: &str = "ATTENDANCE_PROFILE";

#[derive(Debug, Deserialize)]
pub struct HConfig {
    pub discord: HDiscordConfig,
    pub bot: HBotConfig,
    #[serde(default)]
    pub health: HHealthConfig,
    #[serde(default)]
    pub log: log4rs::config::RawConfig,
}

#[derive(Debug, Deserialize)]
pub struct HDiscordConfig {
    #[serde(with = "token_parse")]
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct HBotConfig {
    /// The community whose members are tracked.
    pub guild: crate::prelude::GuildId,
    pub mongodb_uri: String,
    /// Used if the URI doesn't name a database.
    #[serde(default = "default_database")]
    pub database: String,
    pub checkin: crate::modules::checkin::Config,
    pub report: crate::modules::report::Config,
}

fn default_database() -> String {
    "attendance".to_owned()
}

const fn default_port() -> u16 {
    3000
}

const fn default_true() -> bool {
    true
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct HHealthConfig {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HHealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            port: default_port(),
        }
    }
}

/// Loads the configuration.
///
/// A `.env` file in the working directory is applied to the process
/// environment first. After that, the layers are, from lowest precedence:
/// the embedded defaults, `attendance_app.toml`,
/// `attendance_app.<profile>.toml`, and the environment.
pub fn load() -> anyhow::Result<HConfig> {
    match dotenvy::dotenv() {
        Ok(path) => log::trace!("Loaded {}.", path.display()),
        Err(why) if why.not_found() => {},
        Err(why) => return Err(why).context("cannot load .env file"),
    }

    let profile = profile()?;
    let profile_config = format!("attendance_app.{profile}.toml");

    Builder::new()
        .add_layer(TomlText::new(include_str!("../../assets/default_config.toml")))
        .add_layer(File::new("attendance_app.toml").required(false))
        .add_layer(File::new(&profile_config).required(false))
        .add_layer(Env::new())
        .build()
}

fn profile() -> anyhow::Result<Cow<'static, str>> {
    use std::env::VarError::NotPresent;

    match std::env::var(PROFILE_VAR) {
        Ok(value) => Ok(value.into()),
        Err(NotPresent) => Ok("release".into()),
        Err(err) => Err(err).with_context(|| format!("cannot load {PROFILE_VAR} env variable")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &str = r#"
        [discord]
        token = "Bot aaaa.bbbb.cccc"

        [bot]
        guild = 1
        mongodb_uri = "mongodb://localhost:27017"

        [bot.checkin]
        parent_channel = 2

        [bot.report]
        notice_channel = 3
    "#;

    #[test]
    fn defaults_complete_the_config() {
        let config: HConfig = Builder::new()
            .add_layer(TomlText::new(include_str!("../../assets/default_config.toml")))
            .add_layer(TomlText::new(REQUIRED))
            .build()
            .expect("valid config");

        assert_eq!(config.discord.token, "aaaa.bbbb.cccc", "prefix is stripped");
        assert_eq!(config.bot.database, "attendance");
        assert_eq!(config.bot.checkin.emoji, "✅");
        assert_eq!(config.bot.checkin.backfill_limit, 100);
        assert_eq!(config.bot.report.fine_per_miss, 1000);
        assert!(config.health.enabled, "health endpoint is on by default");
        assert_eq!(config.health.port, 3000);
    }

    #[test]
    fn malformed_token_is_rejected() {
        Builder::new()
            .add_layer(TomlText::new(include_str!("../../assets/default_config.toml")))
            .add_layer(TomlText::new(REQUIRED))
            .add_layer(TomlText::new("[discord]\ntoken = \"not a token\""))
            .build::<HConfig>()
            .expect_err("token must have three parts");
    }
}
