//! Posts the daily report every night.

use attendance::MonthDay;
use attendance::date::next_occurrence;
use attendance::report::daily_report;
use chrono::{Local, NaiveDate};

use super::roster::fetch_roster;
use crate::helper::discord::send_chunked;
use crate::modules::prelude::*;

/// Runs the nightly report loop. Only returns if no next run can be scheduled.
///
/// A failed run is logged and the loop waits for the next night.
pub async fn run(http: Arc<Http>, data: Arc<HBotData>) -> Result {
    let at = data.config().report.nightly_at;
    let mut last = Local::now().naive_local();

    loop {
        let next = next_occurrence(last, at).context("cannot schedule nightly report")?;
        log::info!("Next nightly report at {next}.");

        let now = Local::now().naive_local();
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        if let Err(why) = post_nightly(&http, &data, next.date()).await {
            log::error!("Nightly report for {next} failed: {why:?}");
        }

        last = next;
    }
}

async fn post_nightly(http: &Http, data: &HBotData, date: NaiveDate) -> Result {
    let config = data.config();
    let roster = fetch_roster(http, config.guild).await?;
    let report = daily_report(data.store(), &roster, MonthDay::from_date(date)).await?;

    if report.is_all_clear() && !config.report.post_all_clear {
        log::info!("Nobody missed {}, skipping the nightly report.", report.date);
        return Ok(());
    }

    send_chunked(http, config.report.notice_channel, &report.to_string()).await?;
    log::info!("Posted nightly report for {}.", report.date);
    Ok(())
}
