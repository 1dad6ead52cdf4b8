//! Document store: MongoDB collections fed by a full-replace load.
//!
//! # Collections
//!
//! - `seasons` - one document per season year
//! - `races` - one per race; `season_year` points at `seasons.year`
//! - `drivers` - one per merged driver; `races.drivers[].driver_id` points here
//!
//! Every load regenerates `_id` values, so documents only ever reference
//! each other through business keys.
//!
//! The [`DocumentStore`] trait is the seam between the loader and MongoDB;
//! tests run the loader against an in-memory implementation.

use async_trait::async_trait;
use mongodb::bson::Document;

pub mod documents;
pub mod loader;
#[cfg(test)]
pub mod memory;
mod mongo;

pub use mongo::MongoStore;

pub const SEASONS: &str = "seasons";
pub const RACES: &str = "races";
pub const DRIVERS: &str = "drivers";

/// An ascending index over one or more fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub keys: &'static [&'static str],
    pub unique: bool,
}

impl IndexSpec {
    pub const fn on(collection: &'static str, keys: &'static [&'static str]) -> Self {
        Self {
            collection,
            keys,
            unique: false,
        }
    }

    pub const fn unique_on(collection: &'static str, keys: &'static [&'static str]) -> Self {
        Self {
            collection,
            keys,
            unique: true,
        }
    }
}

/// Indexes (re)created before every load.
pub const REQUIRED_INDEXES: &[IndexSpec] = &[
    IndexSpec::unique_on(SEASONS, &["year"]),
    IndexSpec::unique_on(SEASONS, &["season_id"]),
    IndexSpec::unique_on(RACES, &["season_year", "race_id"]),
    IndexSpec::unique_on(RACES, &["stage_id"]),
    IndexSpec::unique_on(DRIVERS, &["driver_id"]),
    IndexSpec::on(DRIVERS, &["name"]),
    IndexSpec::on(DRIVERS, &["nationality"]),
];

/// Document store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Creating index {keys:?} on {collection} failed: {message}")]
    Index {
        collection: String,
        keys: Vec<String>,
        message: String,
    },

    #[error("Clearing {collection} failed: {message}")]
    Clear { collection: String, message: String },

    #[error("Inserted {inserted} of {attempted} documents into {collection}: {message}")]
    PartialInsert {
        collection: String,
        inserted: usize,
        attempted: usize,
        message: String,
    },

    #[error("Failed to encode {collection} document: {message}")]
    Encode { collection: String, message: String },
}

/// Operations the loader needs from a document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create an index if it doesn't already exist.
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<(), StoreError>;

    /// Delete every document in `collection`, then insert `documents` in order.
    ///
    /// Returns the number inserted. A failed insert does not restore what
    /// was deleted.
    async fn replace_all(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError>;

    /// Release the connection.
    async fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_indexes_cover_business_keys() {
        let unique: Vec<(&str, &[&str])> = REQUIRED_INDEXES
            .iter()
            .filter(|i| i.unique)
            .map(|i| (i.collection, i.keys))
            .collect();
        assert!(unique.contains(&(SEASONS, &["year"][..])));
        assert!(unique.contains(&(RACES, &["season_year", "race_id"][..])));
        assert!(unique.contains(&(RACES, &["stage_id"][..])));
        assert!(unique.contains(&(DRIVERS, &["driver_id"][..])));
        // Race ids alone repeat across seasons
        assert!(!unique.contains(&(RACES, &["race_id"][..])));
    }

    #[test]
    fn test_partial_insert_message() {
        let err = StoreError::PartialInsert {
            collection: RACES.to_string(),
            inserted: 3,
            attempted: 5,
            message: "E11000 duplicate key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Inserted 3 of 5 documents into races: E11000 duplicate key"
        );
    }
}
