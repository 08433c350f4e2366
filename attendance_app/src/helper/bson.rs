//! Traits and functions for defining or using the database model.

use anyhow::Context as _;
use bson::Document;
use mongodb::error::{CommandError, Error, ErrorKind, WriteError, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

/// Declares a type as being a collection type in MongoDB.
pub trait ModelCollection {
    /// The name of the MongoDB collection.
    const COLLECTION_NAME: &str;

    /// Gets the collection for this type on the given database.
    fn collection(db: &Database) -> Collection<Self>
    where
        Self: Sized + Send + Sync,
    {
        db.collection(Self::COLLECTION_NAME)
    }

    /// Gets the collection as raw [`Document`]s.
    fn collection_raw(db: &Database) -> Collection<Document> {
        db.collection(Self::COLLECTION_NAME)
    }

    /// Gets the indices to create for this collection. Every index must be
    /// named so it can be replaced when its definition changes.
    fn indices() -> Vec<IndexModel> {
        Vec::new()
    }
}

/// Determines whether the error code is `11000 (DuplicateKey)`.
///
/// Two concurrent upserts on the same unique key can both try to insert. The
/// loser gets this error and can retry as a plain update.
pub fn is_upsert_duplicate_key(err: &Error) -> bool {
    // can show up for both command and write errors
    matches!(
        *err.kind,
        ErrorKind::Command(CommandError { code: 11000, .. })
            | ErrorKind::Write(WriteFailure::WriteError(WriteError { code: 11000, .. }))
    )
}

/// Creates the indices for model `M`.
///
/// Indices whose definition changed are dropped and created again.
pub async fn update_indices<M>(db: &Database) -> anyhow::Result<()>
where
    M: ModelCollection,
{
    // 86 `IndexKeySpecsConflict`: an index with that name exists but differs
    fn is_conflict(err: &Error) -> bool {
        matches!(*err.kind, ErrorKind::Command(CommandError { code: 86, .. }))
    }

    let indices = M::indices();
    if indices.is_empty() {
        return Ok(());
    }

    let collection = M::collection_raw(db);

    // the bulk create is a single round-trip and usually just succeeds
    match collection.create_indexes(indices).await {
        Ok(_) => return Ok(()),
        Err(err) if is_conflict(&err) => {},
        Err(err) => return Err(err).context("could not create indices"),
    }

    for index in M::indices() {
        let Err(err) = collection.create_index(index.clone()).await else {
            continue;
        };

        if !is_conflict(&err) {
            return Err(err.into());
        }

        let name = match &index.options {
            Some(IndexOptions {
                name: Some(name), ..
            }) => name.clone(),
            _ => return Err(err).context("must set index name to attempt re-create"),
        };

        log::trace!("Detected index {}/{name} mismatch.", collection.name());
        collection.drop_index(&name).await?;
        collection.create_index(index).await?;
        log::info!("Replaced index {}/{name}.", collection.name());
    }

    Ok(())
}
