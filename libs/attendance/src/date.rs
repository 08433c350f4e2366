//! Calendar helpers for daily check-in labels.
//!
//! Threads and commands name a day as `MM/DD`, the store keys it as `MM-DD`.
//! Both are just renderings of [`MonthDay`].

use std::fmt;

use chrono::{Datelike as _, Days, NaiveDate, NaiveDateTime, NaiveTime};

/// A month and day without a year.
///
/// Any day that exists in a leap year is valid, so `02/29` can be represented.
/// Resolving it to a real date may fail for other years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthDay {
    month: u8,
    day: u8,
}

impl MonthDay {
    // this must be a leap-year
    const REF_YEAR: i32 = 2000;

    /// Creates a new value if the month and day form a valid calendar day.
    #[must_use]
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(Self::REF_YEAR, month, day)?;
        Some(Self {
            month: u8::try_from(month).ok()?,
            day: u8::try_from(day).ok()?,
        })
    }

    /// Parses a user-facing `MM/DD` label, such as a thread name.
    ///
    /// Exactly two digits, a slash, and two digits are accepted. Nothing else,
    /// not even surrounding whitespace.
    #[must_use]
    pub fn parse_label(text: &str) -> Option<Self> {
        Self::parse_with(text, b'/')
    }

    /// Parses a stored `MM-DD` key.
    #[must_use]
    pub fn parse_key(text: &str) -> Option<Self> {
        Self::parse_with(text, b'-')
    }

    fn parse_with(text: &str, separator: u8) -> Option<Self> {
        fn digit(b: u8) -> Option<u32> {
            b.is_ascii_digit().then(|| u32::from(b - b'0'))
        }

        let &[m1, m2, sep, d1, d2] = text.as_bytes() else {
            return None;
        };

        if sep != separator {
            return None;
        }

        let month = digit(m1)? * 10 + digit(m2)?;
        let day = digit(d1)? * 10 + digit(d2)?;
        Self::new(month, day)
    }

    /// Gets the month and day of a full date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        // every real date is also valid in the reference leap year
        Self {
            month: u8::try_from(date.month()).unwrap_or(1),
            day: u8::try_from(date.day()).unwrap_or(1),
        }
    }

    /// Resolves this to a date in the given year.
    ///
    /// Returns [`None`] for `02/29` in non-leap years.
    #[must_use]
    pub fn resolve(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month.into(), self.day.into())
    }

    /// Resolves this to the matching date closest to `today`.
    ///
    /// Looks at the previous, current, and next year, so `12/30` asked in early
    /// January is the December that just passed. Returns [`None`] only for
    /// `02/29` when none of those years is a leap year.
    #[must_use]
    pub fn resolve_near(self, today: NaiveDate) -> Option<NaiveDate> {
        let year = today.year();
        [year - 1, year, year + 1]
            .into_iter()
            .filter_map(|y| self.resolve(y))
            .min_by_key(|d| (*d - today).num_days().abs())
    }

    /// The canonical storage key, `MM-DD`.
    #[must_use]
    pub fn key(self) -> String {
        format!("{:02}-{:02}", self.month, self.day)
    }
}

/// Formats as the `MM/DD` label.
impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.day)
    }
}

/// Gets the Monday-to-Sunday week that contains `date`.
///
/// # Panics
///
/// Panics if the week extends past the range of [`NaiveDate`].
#[must_use]
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    // sunday is 6 days after monday here, not the start of a new week
    let offset = date.weekday().num_days_from_monday();
    let monday = date - Days::new(offset.into());

    [0, 1, 2, 3, 4, 5, 6].map(|i| monday + Days::new(i))
}

/// Same as [`week_dates`], but as labels.
#[must_use]
pub fn week_labels(date: NaiveDate) -> [MonthDay; 7] {
    week_dates(date).map(MonthDay::from_date)
}

/// Iterates every date from `start` up to, but excluding, `today`.
///
/// The current day is never included since it isn't over yet.
pub fn settled_dates(start: NaiveDate, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d < today)
}

/// Finds the first time after `after` where the wall clock shows `at`.
#[must_use]
pub fn next_occurrence(after: NaiveDateTime, at: NaiveTime) -> Option<NaiveDateTime> {
    let same_day = after.date().and_time(at);
    if same_day > after {
        return Some(same_day);
    }

    after.date().succ_opt().map(|d| d.and_time(at))
}
