//! Defines a `"default"` [`PatternEncoder`].
//!
//! Saves repeating the pattern for every appender in the configuration.
//! Timestamps use local time since check-in days are local days too.

use log4rs::config::{Deserialize, Deserializers};
use log4rs::encode::Encode;
use log4rs::encode::pattern::PatternEncoder;

/// Which parts go in front of each message.
#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct DefaultPatternConfig {
    time: bool,
    target: bool,
}

impl Default for DefaultPatternConfig {
    fn default() -> Self {
        Self {
            time: true,
            target: true,
        }
    }
}

impl DefaultPatternConfig {
    fn pattern(&self) -> String {
        let mut prefix = Vec::with_capacity(3);
        if self.time {
            prefix.push("{d(%Y-%m-%d %H:%M:%S)(local)}");
        }

        prefix.push("{h({l:<5})}");
        if self.target {
            prefix.push("{t}");
        }

        format!("[{}] {{m}}{{n}}", prefix.join(" "))
    }
}

pub struct DefaultPatternDeserializer;

impl Deserialize for DefaultPatternDeserializer {
    type Trait = dyn Encode;
    type Config = DefaultPatternConfig;

    fn deserialize(
        &self,
        config: Self::Config,
        _deserializers: &Deserializers,
    ) -> anyhow::Result<Box<Self::Trait>> {
        Ok(Box::new(PatternEncoder::new(&config.pattern())))
    }
}

#[cfg(test)]
mod tests {
    use super::DefaultPatternConfig;

    #[test]
    fn patterns() {
        let full = DefaultPatternConfig::default();
        assert_eq!(full.pattern(), "[{d(%Y-%m-%d %H:%M:%S)(local)} {h({l:<5})} {t}] {m}{n}");

        let bare = DefaultPatternConfig {
            time: false,
            target: false,
        };
        assert_eq!(bare.pattern(), "[{h({l:<5})}] {m}{n}");
    }
}
