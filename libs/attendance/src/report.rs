//! Builds the attendance reports.
//!
//! Every report compares the *current* roster against the stored check-ins.
//! Members who left are not reported and members who joined late are counted
//! as missing for days before they joined.

use std::collections::{HashMap, HashSet};
use std::fmt;

use anyhow::Result;
use chrono::{Days, NaiveDate};

use crate::date::{settled_dates, week_dates, week_labels};
use crate::store::AttendanceStore;
use crate::{MemberId, MonthDay};

/// Gets the roster members that are not certified, in roster order.
#[must_use]
pub fn missing_for(roster: &[MemberId], certified: &HashSet<MemberId>) -> Vec<MemberId> {
    roster
        .iter()
        .copied()
        .filter(|m| !certified.contains(m))
        .collect()
}

/// A member's number of missed days within some period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissCount {
    pub member: MemberId,
    pub misses: u32,
}

/// Counts missed days per member. Members without misses are left out.
fn tally(
    roster: &[MemberId],
    dates: &[MonthDay],
    certified: &HashMap<MonthDay, HashSet<MemberId>>,
) -> Vec<MissCount> {
    roster
        .iter()
        .filter_map(|&member| {
            let misses = dates
                .iter()
                .filter(|&&d| !certified.get(&d).is_some_and(|c| c.contains(&member)))
                .count();

            let misses = u32::try_from(misses).unwrap_or(u32::MAX);
            (misses != 0).then_some(MissCount { member, misses })
        })
        .collect()
}

/// Who missed a single day.
#[derive(Debug, Clone)]
pub struct DailyReport {
    pub date: MonthDay,
    pub missing: Vec<MemberId>,
}

impl DailyReport {
    #[must_use]
    pub fn is_all_clear(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Builds the report for a single day.
///
/// # Errors
///
/// Returns an error if the store lookup fails.
pub async fn daily_report<S: AttendanceStore>(
    store: &S,
    roster: &[MemberId],
    date: MonthDay,
) -> Result<DailyReport> {
    let certified = store.certified_users(date).await?;
    let missing = missing_for(roster, &certified);

    log::debug!(
        "{date}: {} of {} members missing.",
        missing.len(),
        roster.len()
    );

    Ok(DailyReport { date, missing })
}

impl fmt::Display for DailyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.missing.split_first() else {
            return write!(f, "✅ {} 모든 멤버가 인증을 완료했습니다!", self.date);
        };

        write!(f, "❗ {} 인증 누락자:\n{}", self.date, first.mention())?;
        for member in rest {
            write!(f, ", {}", member.mention())?;
        }

        Ok(())
    }
}

/// Misses per member for one Monday-to-Sunday week.
#[derive(Debug, Clone)]
pub struct WeeklyReport {
    pub week: [NaiveDate; 7],
    pub misses: Vec<MissCount>,
}

/// Builds the report for the week containing `date`.
///
/// All seven days are counted, even those that haven't happened yet.
///
/// # Errors
///
/// Returns an error if the store lookup fails.
pub async fn weekly_report<S: AttendanceStore>(
    store: &S,
    roster: &[MemberId],
    date: NaiveDate,
) -> Result<WeeklyReport> {
    let week = week_dates(date);
    let labels = week_labels(date);

    let certified = store.certified_users_in(&labels).await?;
    let misses = tally(roster, &labels, &certified);

    Ok(WeeklyReport { week, misses })
}

impl fmt::Display for WeeklyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = MonthDay::from_date(self.week[0]);
        let end = MonthDay::from_date(self.week[6]);

        if self.misses.is_empty() {
            return write!(f, "✅ {start} ~ {end} 주간 누락자가 없습니다!");
        }

        write!(f, "📅 {start} ~ {end} 주간 인증 누락 현황")?;
        for m in &self.misses {
            write!(f, "\n{}: {}회 누락", m.member.mention(), m.misses)?;
        }

        Ok(())
    }
}

/// A member's accumulated fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fine {
    pub member: MemberId,
    pub misses: u32,
    pub amount: u64,
}

/// The longest period a cumulative report covers.
///
/// Labels carry no year, so a longer period would contain the same label twice
/// and a single check-in would count for both days.
pub const MAX_CUMULATIVE_DAYS: u64 = 365;

/// Gets the first day counted by a cumulative report ending before `today`.
///
/// Returns `start`, or the start of the last [`MAX_CUMULATIVE_DAYS`] days if
/// `start` lies further back. The flag is set in the latter case.
#[must_use]
pub fn cumulative_start(start: NaiveDate, today: NaiveDate) -> (NaiveDate, bool) {
    match today.checked_sub_days(Days::new(MAX_CUMULATIVE_DAYS)) {
        Some(earliest) if start < earliest => (earliest, true),
        _ => (start, false),
    }
}

/// Fines accumulated over every settled day since the program start.
#[derive(Debug, Clone)]
pub struct CumulativeReport {
    /// First and last settled day. [`None`] if no day has been settled yet.
    pub period: Option<(NaiveDate, NaiveDate)>,
    /// Whether days before the period were left out. See [`cumulative_start`].
    pub truncated: bool,
    pub days: usize,
    pub fine_per_miss: u64,
    /// Sorted by amount, highest first. Ties keep roster order.
    pub fines: Vec<Fine>,
}

impl CumulativeReport {
    /// The sum of all fines.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.fines.iter().map(|f| f.amount).sum()
    }
}

/// Builds the cumulative fine report from `start` through the day before
/// `today`.
///
/// At most the last [`MAX_CUMULATIVE_DAYS`] days are counted.
///
/// # Errors
///
/// Returns an error if the store lookup fails.
pub async fn cumulative_report<S: AttendanceStore>(
    store: &S,
    roster: &[MemberId],
    start: NaiveDate,
    today: NaiveDate,
    fine_per_miss: u64,
) -> Result<CumulativeReport> {
    let (start, truncated) = cumulative_start(start, today);
    let dates: Vec<NaiveDate> = settled_dates(start, today).collect();
    let period = dates.first().zip(dates.last()).map(|(&a, &b)| (a, b));

    let labels: Vec<MonthDay> = dates.iter().copied().map(MonthDay::from_date).collect();
    let certified = if labels.is_empty() {
        HashMap::new()
    } else {
        store.certified_users_in(&labels).await?
    };

    let mut fines: Vec<Fine> = tally(roster, &labels, &certified)
        .into_iter()
        .map(|m| Fine {
            member: m.member,
            misses: m.misses,
            amount: u64::from(m.misses).saturating_mul(fine_per_miss),
        })
        .collect();

    fines.sort_by(|a, b| b.amount.cmp(&a.amount));

    Ok(CumulativeReport {
        period,
        truncated,
        days: dates.len(),
        fine_per_miss,
        fines,
    })
}

impl CumulativeReport {
    fn fmt_truncated(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.truncated {
            write!(f, "\n(최근 {MAX_CUMULATIVE_DAYS}일만 집계됩니다)")?;
        }

        Ok(())
    }
}

impl fmt::Display for CumulativeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((start, end)) = self.period else {
            return f.write_str("아직 정산된 날짜가 없습니다.");
        };

        let start = MonthDay::from_date(start);
        let end = MonthDay::from_date(end);

        if self.fines.is_empty() {
            write!(f, "✅ {start} ~ {end} 누적 누락자가 없습니다!")?;
            return self.fmt_truncated(f);
        }

        write!(
            f,
            "💰 {start} ~ {end} 누적 벌금 ({}일, 누락 1회당 {}원)",
            self.days, self.fine_per_miss
        )?;
        self.fmt_truncated(f)?;

        for fine in &self.fines {
            write!(
                f,
                "\n{}: {}회 누락 → {}원",
                fine.member.mention(),
                fine.misses,
                fine.amount
            )?;
        }

        write!(f, "\n합계: {}원", self.total())
    }
}
