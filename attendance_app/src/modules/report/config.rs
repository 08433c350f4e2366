use chrono::{NaiveDate, NaiveTime};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::prelude::*;

#[serde_as]
#[derive(Debug, serde::Deserialize)]
pub struct Config {
    /// Receives the nightly report and `!누락자` replies.
    pub notice_channel: ChannelId,
    /// Receives the weekly and fine reports. Defaults to the notice channel.
    #[serde(default)]
    pub report_channel: Option<ChannelId>,
    /// Local time of the nightly report.
    #[serde(default = "default_nightly_at")]
    pub nightly_at: NaiveTime,
    /// Whether the nightly report is posted when nobody missed.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_true")]
    pub post_all_clear: bool,
    /// The first day counted for fines.
    #[serde(default = "default_program_start")]
    pub program_start: NaiveDate,
    /// Fine per missed day, in won.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default = "default_fine_per_miss")]
    pub fine_per_miss: u64,
}

impl Config {
    /// The channel for weekly and fine reports.
    pub fn report_channel(&self) -> ChannelId {
        self.report_channel.unwrap_or(self.notice_channel)
    }
}

fn default_nightly_at() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()
}

const fn default_true() -> bool {
    true
}

fn default_program_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 23).unwrap_or_default()
}

const fn default_fine_per_miss() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        let config: Config = toml::from_str("notice_channel = 10").expect("valid config");

        assert_eq!(config.notice_channel, ChannelId::new(10));
        assert_eq!(config.report_channel(), ChannelId::new(10));
        assert_eq!(config.nightly_at, NaiveTime::from_hms_opt(23, 59, 0).expect("valid time"));
        assert!(config.post_all_clear);
        assert_eq!(config.fine_per_miss, 1000);
    }

    #[test]
    fn accepts_strings_from_env() {
        let config: Config = toml::from_str(
            r#"
            notice_channel = "10"
            report_channel = "20"
            post_all_clear = "false"
            fine_per_miss = "500"
            program_start = "2025-07-01"
            nightly_at = "21:30:00"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.report_channel(), ChannelId::new(20));
        assert!(!config.post_all_clear);
        assert_eq!(config.fine_per_miss, 500);
        assert_eq!(config.program_start, NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date"));
        assert_eq!(config.nightly_at, NaiveTime::from_hms_opt(21, 30, 0).expect("valid time"));
    }
}
