//! The MongoDB-backed check-in store.

use std::collections::{HashMap, HashSet};

use attendance::checkin::Checkin;
use attendance::store::AttendanceStore;
use attendance::{MemberId, MonthDay};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use bson::{Document, doc};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use serde::{Deserialize, Serialize};
use serenity::futures::TryStreamExt as _;

use crate::helper::bson::{ModelCollection, is_upsert_duplicate_key};
use crate::prelude::*;

/// One check-in of one member on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// The Discord user id, reinterpreted as signed.
    pub user: i64,
    /// The day as `MM-DD`.
    pub date: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

fn name_unique(name: &str) -> IndexOptions {
    IndexOptions::builder()
        .name(name.to_owned())
        .unique(true)
        .build()
}

fn name(name: &str) -> IndexOptions {
    IndexOptions::builder().name(name.to_owned()).build()
}

impl ModelCollection for Record {
    const COLLECTION_NAME: &str = "checkin.record";

    fn indices() -> Vec<IndexModel> {
        vec![
            IndexModel::builder()
                .options(name_unique("user-date"))
                .keys(doc! { "user": 1, "date": 1 })
                .build(),
            IndexModel::builder()
                .options(name("date"))
                .keys(doc! { "date": 1 })
                .build(),
        ]
    }
}

fn user_to_bson(user: MemberId) -> i64 {
    user.0.cast_signed()
}

fn user_from_bson(user: i64) -> MemberId {
    MemberId(user.cast_unsigned())
}

/// Stores check-ins in the [`Record`] collection.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Finds records and groups their users by day.
    ///
    /// Records with a malformed date are skipped.
    async fn find_grouped(&self, filter: Document) -> Result<HashMap<MonthDay, HashSet<MemberId>>> {
        let mut cursor = Record::collection(&self.db).find(filter).await?;
        let mut map: HashMap<MonthDay, HashSet<MemberId>> = HashMap::new();

        while let Some(record) = cursor.try_next().await? {
            let Some(date) = MonthDay::parse_key(&record.date) else {
                log::warn!("Skipping check-in with invalid date {:?}.", record.date);
                continue;
            };

            map.entry(date)
                .or_default()
                .insert(user_from_bson(record.user));
        }

        Ok(map)
    }
}

impl AttendanceStore for MongoStore {
    async fn upsert_checkin(&self, checkin: Checkin, timestamp: DateTime<Utc>) -> Result {
        let collection = Record::collection(&self.db);

        let filter = doc! {
            "user": user_to_bson(checkin.user),
            "date": checkin.date.key(),
        };

        let update = doc! {
            "$set": {
                "timestamp": bson::DateTime::from_chrono(timestamp),
            },
        };

        match collection
            .update_one(filter.clone(), update.clone())
            .upsert(true)
            .await
        {
            Ok(_) => Ok(()),
            // a concurrent upsert inserted the record first, so just update it
            Err(err) if is_upsert_duplicate_key(&err) => {
                collection.update_one(filter, update).await?;
                Ok(())
            },
            Err(err) => Err(err.into()),
        }
    }

    async fn certified_users(&self, date: MonthDay) -> Result<HashSet<MemberId>> {
        let filter = doc! { "date": date.key() };
        let mut map = self.find_grouped(filter).await?;
        Ok(map.remove(&date).unwrap_or_default())
    }

    async fn certified_users_in(
        &self,
        dates: &[MonthDay],
    ) -> Result<HashMap<MonthDay, HashSet<MemberId>>> {
        let keys: Vec<String> = dates.iter().map(|d| d.key()).collect();
        let filter = doc! { "date": { "$in": keys } };

        let mut map = self.find_grouped(filter).await?;

        // days without any check-in still get an entry
        for &date in dates {
            map.entry(date).or_default();
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_survive_the_sign_cast() {
        let big = MemberId(u64::MAX - 5);
        assert_eq!(user_from_bson(user_to_bson(big)), big);

        let snowflake = MemberId(480_539_182_201_176_065);
        assert_eq!(user_to_bson(snowflake), 480_539_182_201_176_065);
    }

    #[test]
    fn record_document_shape() {
        let record = Record {
            user: 7,
            date: "06-23".to_owned(),
            timestamp: DateTime::from_timestamp(1_750_000_000, 0).expect("valid timestamp"),
        };

        let doc = bson::to_document(&record).expect("serializable");
        assert_eq!(doc.get_i64("user").ok(), Some(7));
        assert_eq!(doc.get_str("date").ok(), Some("06-23"));
        assert!(doc.get_datetime("timestamp").is_ok(), "timestamp is a bson datetime");
    }

    #[test]
    fn indices_are_named() {
        assert!(
            Record::indices()
                .iter()
                .all(|i| i.options.as_ref().is_some_and(|o| o.name.is_some())),
            "indices need names to be replaceable"
        );
    }
}
