use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::prelude::*;

#[serde_as]
#[derive(Debug, serde::Deserialize)]
pub struct Config {
    /// The channel whose threads are the daily check-in threads.
    pub parent_channel: ChannelId,
    /// Added to qualifying messages.
    #[serde(default = "default_emoji")]
    pub emoji: String,
    /// How many recent messages per thread are scanned at startup.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_backfill_limit")]
    pub backfill_limit: u8,
}

impl Config {
    /// The reaction used to mark check-ins.
    pub fn reaction(&self) -> ReactionType {
        ReactionType::Unicode(self.emoji.clone())
    }
}

fn default_emoji() -> String {
    "✅".to_owned()
}

const fn default_backfill_limit() -> u8 {
    100
}
