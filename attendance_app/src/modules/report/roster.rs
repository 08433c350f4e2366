use attendance::MemberId;

use crate::modules::prelude::*;

/// The maximum page size of the member list endpoint.
const PAGE_SIZE: u64 = 1000;

/// Fetches every non-bot member of the guild, in the order Discord lists them.
pub async fn fetch_roster(http: &Http, guild: GuildId) -> Result<Vec<MemberId>> {
    let mut roster = Vec::new();
    let mut after: Option<UserId> = None;

    loop {
        let page = guild
            .members(http, Some(PAGE_SIZE), after)
            .await
            .context("cannot fetch guild members")?;

        let Some(last) = page.last() else {
            break;
        };

        after = Some(last.user.id);
        let full = u64::try_from(page.len()) == Ok(PAGE_SIZE);

        roster.extend(
            page.iter()
                .filter(|m| !m.user.bot)
                .map(|m| MemberId(m.user.id.get())),
        );

        if !full {
            break;
        }
    }

    log::debug!("Fetched roster of {} members.", roster.len());
    Ok(roster)
}
