//! Layered configuration loading.
//!
//! Every layer is merged into one TOML table, later layers overriding earlier
//! ones key by key, and the result is deserialized at the end.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{Context as _, Result};
use serde::de::DeserializeOwned;
use smallvec::SmallVec;
use toml::map::Entry;
use toml::{Table, Value};

/// Flat environment variable names that map to a nested config key.
///
/// These are the names deployments of the check-in bot have always used.
const ENV_ALIASES: &[(&str, &[&str])] = &[
    ("DISCORD_TOKEN", &["discord", "token"]),
    ("GUILD_ID", &["bot", "guild"]),
    ("MONGODB_URI", &["bot", "mongodb_uri"]),
    ("PARENT_CHANNEL_ID", &["bot", "checkin", "parent_channel"]),
    ("NOTICE_CHANNEL_ID", &["bot", "report", "notice_channel"]),
    ("REPORT_CHANNEL_ID", &["bot", "report", "report_channel"]),
    ("PORT", &["health", "port"]),
];

/// Provides a layered builder for deserializing configuration files.
#[must_use]
pub struct Builder {
    table: Result<Table>,
}

impl Builder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self {
            table: Ok(Table::new()),
        }
    }

    /// Adds a layer of configuration.
    ///
    /// Layers added later take precedence over earlier ones.
    pub fn add_layer<L: Layer>(mut self, source: L) -> Self {
        self.table = self.table.and_then(|mut t| {
            source.extend_table(&mut t)?;
            Ok(t)
        });
        self
    }

    /// Deserializes the configuration from the provided layers.
    pub fn build<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let table = self.table?;
        T::deserialize(table).context("cannot deserialize config")
    }
}

/// A configuration layer.
pub trait Layer {
    /// Extends a TOML table by this layer.
    fn extend_table(&self, table: &mut Table) -> Result<()>;
}

/// A TOML file on disk.
#[must_use]
pub struct File {
    path: PathBuf,
    required: bool,
}

impl File {
    /// Creates a new layer for the file at `path`. Required by default.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// Sets whether the file is required.
    ///
    /// A missing optional file is treated as empty.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// TOML text, usually embedded defaults.
#[must_use]
pub struct TomlText<'a> {
    text: &'a str,
}

impl<'a> TomlText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

/// The process environment.
///
/// Names are lowercased and `__` (two underscores) separates nested keys, so
/// `BOT__REPORT__FINE_PER_MISS` sets `bot.report.fine_per_miss`. The names in
/// [`ENV_ALIASES`] are mapped to their nested key instead.
///
/// All values are strings. Fields that need numbers or booleans accept their
/// string form.
#[must_use]
pub struct Env {
    vars: Vec<(String, String)>,
}

impl Env {
    /// Creates a layer from the current process environment.
    pub fn new() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| {
                // non-utf8 keys cannot refer to anything that can be configured
                let key = key.into_string().ok()?;

                // lossy so bad values still show up in deserialization errors
                let value = value
                    .into_string()
                    .unwrap_or_else(|o| o.to_string_lossy().into_owned());

                Some((key, value))
            })
            .collect();

        Self { vars }
    }

    #[cfg(test)]
    fn from_vars(vars: &[(&str, &str)]) -> Self {
        let vars = vars
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();

        Self { vars }
    }
}

impl Layer for File {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(why) if !self.required && why.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(why) => {
                return Err(why).with_context(|| format!("cannot read config {:?}", self.path));
            },
        };

        let file = parse_table(&content)
            .with_context(|| format!("failed to load config {:?}", self.path))?;

        merge_tables(table, file);
        Ok(())
    }
}

impl Layer for TomlText<'_> {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        let toml = parse_table(self.text).context("toml str literal invalid")?;
        merge_tables(table, toml);
        Ok(())
    }
}

impl Layer for Env {
    fn extend_table(&self, table: &mut Table) -> Result<()> {
        for (name, value) in &self.vars {
            if let Some(path) = env_path(name) {
                insert_at(table, &path, Value::String(value.clone()));
            }
        }

        Ok(())
    }
}

/// Maps an environment variable name to the config key it sets.
///
/// Plain names without `__` that aren't aliases are skipped. Those are
/// things like `PATH` or `HOME`.
fn env_path(name: &str) -> Option<SmallVec<[String; 4]>> {
    if let Some(&(_, path)) = ENV_ALIASES.iter().find(|(alias, _)| *alias == name) {
        return Some(path.iter().map(|s| (*s).to_owned()).collect());
    }

    if !name.contains("__") {
        return None;
    }

    let path = name
        .to_ascii_lowercase()
        .split("__")
        .map(str::to_owned)
        .collect();

    Some(path)
}

fn parse_table(text: &str) -> Result<Table> {
    toml::from_str(text).context("config toml is invalid")
}

fn merge_tables(target: &mut Table, consume: Table) {
    for (key, value) in consume {
        match target.entry(key) {
            Entry::Vacant(entry) => _ = entry.insert(value),
            Entry::Occupied(mut entry) => match (entry.get_mut(), value) {
                (Value::Table(a), Value::Table(b)) => merge_tables(a, b),
                (a, b) => *a = b,
            },
        }
    }
}

fn insert_at(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        table.insert(first.clone(), value);
        return;
    }

    let entry = table
        .entry(first.clone())
        .or_insert_with(|| Value::Table(Table::new()));

    // a nested key replaces a plain value at the same place
    if !entry.is_table() {
        *entry = Value::Table(Table::new());
    }

    if let Value::Table(inner) = entry {
        insert_at(inner, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Sample {
        bot: SampleBot,
        #[serde(default)]
        health: Option<SampleHealth>,
    }

    #[derive(Debug, serde::Deserialize)]
    struct SampleBot {
        guild: String,
        checkin: SampleCheckin,
    }

    #[derive(Debug, serde::Deserialize)]
    struct SampleCheckin {
        parent_channel: String,
        emoji: String,
    }

    #[derive(Debug, serde::Deserialize)]
    struct SampleHealth {
        port: String,
    }

    const DEFAULTS: &str = r#"
        [bot]
        guild = "1"

        [bot.checkin]
        parent_channel = "2"
        emoji = "✅"
    "#;

    #[test]
    fn later_layers_win() {
        let sample: Sample = Builder::new()
            .add_layer(TomlText::new(DEFAULTS))
            .add_layer(TomlText::new("[bot.checkin]\nemoji = \"👍\""))
            .build()
            .expect("valid config");

        assert_eq!(sample.bot.guild, "1");
        assert_eq!(sample.bot.checkin.parent_channel, "2");
        assert_eq!(sample.bot.checkin.emoji, "👍");
    }

    #[test]
    fn env_nested_and_aliases() {
        let env = Env::from_vars(&[
            ("BOT__GUILD", "10"),
            ("PARENT_CHANNEL_ID", "20"),
            ("PORT", "8080"),
            ("UNRELATED", "ignored"),
            ("BOT", "not a table"),
        ]);

        let sample: Sample = Builder::new()
            .add_layer(TomlText::new(DEFAULTS))
            .add_layer(env)
            .build()
            .expect("valid config");

        assert_eq!(sample.bot.guild, "10");
        assert_eq!(sample.bot.checkin.parent_channel, "20");
        assert_eq!(sample.bot.checkin.emoji, "✅", "untouched keys are kept");
        assert_eq!(sample.health.map(|h| h.port).as_deref(), Some("8080"));
    }

    #[test]
    fn env_names_to_paths() {
        assert_eq!(
            env_path("BOT__REPORT__FINE_PER_MISS").as_deref(),
            Some(&["bot".to_owned(), "report".to_owned(), "fine_per_miss".to_owned()][..])
        );
        assert_eq!(
            env_path("MONGODB_URI").as_deref(),
            Some(&["bot".to_owned(), "mongodb_uri".to_owned()][..])
        );
        assert_eq!(env_path("HOME"), None);
    }

    #[test]
    fn missing_optional_file_is_empty() {
        let sample: Sample = Builder::new()
            .add_layer(TomlText::new(DEFAULTS))
            .add_layer(File::new("does-not-exist.toml").required(false))
            .build()
            .expect("valid config");

        assert_eq!(sample.bot.guild, "1");
    }

    #[test]
    fn missing_required_file_fails() {
        Builder::new()
            .add_layer(File::new("does-not-exist.toml"))
            .build::<Sample>()
            .expect_err("required file must exist");
    }
}
