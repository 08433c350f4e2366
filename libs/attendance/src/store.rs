//! Storage of check-in records.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::checkin::Checkin;
use crate::{MemberId, MonthDay};

/// Persists at most one check-in per member and day.
pub trait AttendanceStore: Send + Sync {
    /// Records a check-in.
    ///
    /// Writing the same member and day again only replaces the timestamp.
    fn upsert_checkin(
        &self,
        checkin: Checkin,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Gets every member that checked in on `date`.
    fn certified_users(
        &self,
        date: MonthDay,
    ) -> impl Future<Output = Result<HashSet<MemberId>>> + Send;

    /// Gets the certified members for several days at once.
    ///
    /// The default implementation queries each day on its own.
    fn certified_users_in(
        &self,
        dates: &[MonthDay],
    ) -> impl Future<Output = Result<HashMap<MonthDay, HashSet<MemberId>>>> + Send {
        async move {
            let mut map = HashMap::with_capacity(dates.len());
            for &date in dates {
                if !map.contains_key(&date) {
                    let users = self.certified_users(date).await?;
                    map.insert(date, users);
                }
            }

            Ok(map)
        }
    }
}

/// Keeps records in memory. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(MemberId, MonthDay), DateTime<Utc>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the stored timestamp for a member and day.
    #[must_use]
    pub fn timestamp(&self, user: MemberId, date: MonthDay) -> Option<DateTime<Utc>> {
        self.lock().get(&(user, date)).copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(MemberId, MonthDay), DateTime<Utc>>> {
        self.records.lock().expect("should not be poisoned")
    }
}

impl AttendanceStore for MemoryStore {
    async fn upsert_checkin(&self, checkin: Checkin, timestamp: DateTime<Utc>) -> Result<()> {
        self.lock().insert((checkin.user, checkin.date), timestamp);
        Ok(())
    }

    async fn certified_users(&self, date: MonthDay) -> Result<HashSet<MemberId>> {
        let users = self
            .lock()
            .keys()
            .filter(|(_, d)| *d == date)
            .map(|&(user, _)| user)
            .collect();

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = MemoryStore::new();
        let date = MonthDay::new(6, 23).expect("valid date");
        let checkin = Checkin {
            user: MemberId(1),
            date,
        };

        let first = Utc::now();
        let second = first + TimeDelta::minutes(5);

        store.upsert_checkin(checkin, first).await.expect("memory store");
        store.upsert_checkin(checkin, second).await.expect("memory store");

        assert_eq!(store.len(), 1, "same member and day must not duplicate");
        assert_eq!(store.timestamp(MemberId(1), date), Some(second), "later write wins");

        let certified = store.certified_users(date).await.expect("memory store");
        assert_eq!(certified, HashSet::from([MemberId(1)]));
    }

    #[tokio::test]
    async fn batch_lookup_covers_every_day() {
        let store = MemoryStore::new();
        let a = MonthDay::new(6, 23).expect("valid date");
        let b = MonthDay::new(6, 24).expect("valid date");

        let checkin = Checkin {
            user: MemberId(2),
            date: b,
        };
        store.upsert_checkin(checkin, Utc::now()).await.expect("memory store");

        let map = store.certified_users_in(&[a, b, a]).await.expect("memory store");
        assert_eq!(map.len(), 2);
        assert!(map[&a].is_empty());
        assert_eq!(map[&b], HashSet::from([MemberId(2)]));
    }
}
