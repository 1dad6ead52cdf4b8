//! Load stage: replace the store's contents with the extracted snapshot.
//!
//! Per collection the store is cleared and then bulk-inserted; there is no
//! upsert and no diffing against what was there. Collections are loaded
//! independently, so a failure in one is reported and the next one still
//! loads. Indexes are ensured first; a failed index is reported and the
//! load carries on.

use mongodb::bson::DateTime;
use serde::Serialize;

use crate::artifacts::DataDir;
use crate::config::StoreConfig;

use super::documents::{self, DriverDocument, RaceDocument, SeasonDocument};
use super::{DRIVERS, DocumentStore, MongoStore, RACES, REQUIRED_INDEXES, SEASONS, StoreError};

/// Documents adapted from the intermediate files, ready to load.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub seasons: Vec<SeasonDocument>,
    pub races: Vec<RaceDocument>,
    pub drivers: Vec<DriverDocument>,
}

impl Snapshot {
    /// Read every season file and the drivers file.
    ///
    /// Unreadable files are logged and left out.
    pub fn read(data: &DataDir) -> Self {
        let now = DateTime::now();
        let mut snapshot = Self::default();

        for path in data.season_files() {
            let season = match data.read_season(&path) {
                Ok(season) => season,
                Err(e) => {
                    tracing::error!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            snapshot.seasons.push(documents::season_document(&season, now));
            snapshot.races.extend(
                season
                    .races
                    .iter()
                    .map(|race| documents::race_document(race, season.year(), now)),
            );
        }

        match data.read_drivers() {
            Ok(Some(drivers)) => {
                snapshot.drivers = drivers
                    .iter()
                    .map(|driver| documents::driver_document(driver, now))
                    .collect();
            }
            Ok(None) => tracing::warn!("No drivers file at {}", data.drivers_path().display()),
            Err(e) => tracing::error!("Skipping drivers: {}", e),
        }

        snapshot
    }
}

/// Outcome for one collection.
#[derive(Debug)]
pub struct CollectionReport {
    pub collection: &'static str,
    pub prepared: usize,
    pub result: Result<usize, StoreError>,
}

impl CollectionReport {
    pub fn inserted(&self) -> usize {
        match &self.result {
            Ok(n) => *n,
            Err(StoreError::PartialInsert { inserted, .. }) => *inserted,
            Err(_) => 0,
        }
    }
}

#[derive(Debug)]
pub struct LoadReport {
    pub index_failures: usize,
    pub collections: Vec<CollectionReport>,
}

/// Create every required index, logging failures. Returns how many failed.
pub async fn ensure_indexes<S: DocumentStore + ?Sized>(store: &S) -> usize {
    let mut failures = 0;
    for spec in REQUIRED_INDEXES {
        if let Err(e) = store.ensure_index(spec).await {
            tracing::error!("{}", e);
            failures += 1;
        }
    }
    if failures == 0 {
        tracing::info!("Indexes ready");
    }
    failures
}

async fn replace_collection<S, T>(
    store: &S,
    collection: &'static str,
    docs: &[T],
) -> CollectionReport
where
    S: DocumentStore + ?Sized,
    T: Serialize,
{
    let prepared = docs.len();
    let result = match documents::encode_all(collection, docs) {
        Ok(encoded) => store.replace_all(collection, encoded).await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(0) => tracing::warn!("No documents to insert into {}", collection),
        Ok(n) => tracing::info!("Inserted {} documents into {}", n, collection),
        Err(e) => tracing::error!("Loading {} failed: {}", collection, e),
    }

    CollectionReport {
        collection,
        prepared,
        result,
    }
}

/// Ensure indexes, then replace seasons, races and drivers in that order.
pub async fn load_snapshot<S: DocumentStore + ?Sized>(
    store: &S,
    snapshot: &Snapshot,
) -> LoadReport {
    let index_failures = ensure_indexes(store).await;

    let collections = vec![
        replace_collection(store, SEASONS, &snapshot.seasons).await,
        replace_collection(store, RACES, &snapshot.races).await,
        replace_collection(store, DRIVERS, &snapshot.drivers).await,
    ];

    LoadReport {
        index_failures,
        collections,
    }
}

/// Connect to MongoDB and load the extracted files.
///
/// `None` means the store was unreachable and nothing was touched.
pub async fn run(config: &StoreConfig, data: &DataDir) -> Option<LoadReport> {
    let store = match MongoStore::connect(&config.connection_string, &config.database).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("{}; skipping load", e);
            return None;
        }
    };

    let snapshot = Snapshot::read(data);
    tracing::info!(
        "Loaded {} seasons, {} races, {} drivers from {}",
        snapshot.seasons.len(),
        snapshot.races.len(),
        snapshot.drivers.len(),
        data.root().display()
    );

    let report = load_snapshot(&store, &snapshot).await;
    store.close().await;
    Some(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::Driver;
    use crate::store::memory::MemoryStore;
    use crate::test_utils::{competitor, race, season_file, temp_data_dir};
    use mongodb::bson::doc;

    fn populated_data_dir() -> (DataDir, tempfile::TempDir) {
        let (data, dir) = temp_data_dir();
        let dixon = competitor("sr:competitor:1", "Dixon, Scott", "New Zealand");
        let palou = competitor("sr:competitor:2", "Palou, Alex", "Spain");
        let drivers: Vec<Driver> = [&dixon, &palou]
            .into_iter()
            .filter_map(Driver::from_competitor)
            .collect();
        data.write_season(&season_file(
            "2021",
            vec![
                race("1", "sr:stage:211", vec![dixon.clone(), palou.clone()]),
                race("2", "sr:stage:212", vec![palou.clone()]),
            ],
        ))
        .unwrap();
        data.write_season(&season_file(
            "2022",
            vec![race("1", "sr:stage:221", vec![dixon])],
        ))
        .unwrap();
        data.write_drivers(&drivers).unwrap();
        (data, dir)
    }

    fn business_keys(store: &MemoryStore) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        for d in store.documents(SEASONS) {
            keys.insert(format!("season:{}", d.get_str("year").unwrap()));
        }
        for d in store.documents(RACES) {
            keys.insert(format!(
                "race:{}:{}:{}",
                d.get_str("season_year").unwrap(),
                d.get_str("race_id").unwrap(),
                d.get_str("stage_id").unwrap()
            ));
        }
        for d in store.documents(DRIVERS) {
            keys.insert(format!("driver:{}", d.get_str("driver_id").unwrap()));
        }
        keys
    }

    fn storage_ids(store: &MemoryStore) -> BTreeSet<String> {
        [SEASONS, RACES, DRIVERS]
            .iter()
            .flat_map(|c| store.documents(c))
            .map(|d| d.get_object_id("_id").unwrap().to_hex())
            .collect()
    }

    #[test]
    fn test_snapshot_read() {
        let (data, _dir) = populated_data_dir();
        let snapshot = Snapshot::read(&data);

        assert_eq!(snapshot.seasons.len(), 2);
        assert_eq!(snapshot.races.len(), 3);
        assert_eq!(snapshot.drivers.len(), 2);

        let first_races: Vec<(&str, &str)> = snapshot
            .races
            .iter()
            .filter(|r| r.race_id == "1")
            .map(|r| (r.season_year.as_str(), r.stage_id.as_str()))
            .collect();
        assert_eq!(first_races, vec![("2021", "sr:stage:211"), ("2022", "sr:stage:221")]);
        assert_eq!(snapshot.races[0].drivers.len(), 2);
    }

    #[test]
    fn test_snapshot_without_drivers_file() {
        let (data, _dir) = temp_data_dir();
        data.write_season(&season_file("2022", vec![])).unwrap();
        let snapshot = Snapshot::read(&data);
        assert_eq!(snapshot.seasons.len(), 1);
        assert!(snapshot.drivers.is_empty());
    }

    #[tokio::test]
    async fn test_load_replaces_existing_documents() {
        let (data, _dir) = populated_data_dir();
        let store = MemoryStore::new();
        store.seed(SEASONS, vec![doc! {"year": "1999"}, doc! {"year": "2000"}]);

        let report = load_snapshot(&store, &Snapshot::read(&data)).await;

        assert_eq!(report.index_failures, 0);
        assert_eq!(store.indexes().len(), REQUIRED_INDEXES.len());
        let years: Vec<String> = store
            .documents(SEASONS)
            .iter()
            .map(|d| d.get_str("year").unwrap().to_string())
            .collect();
        assert_eq!(years, vec!["2021", "2022"]);
        for collection in &report.collections {
            assert_eq!(collection.inserted(), collection.prepared);
        }
    }

    #[tokio::test]
    async fn test_load_twice_is_deterministic() {
        let (data, _dir) = populated_data_dir();
        let store = MemoryStore::new();

        load_snapshot(&store, &Snapshot::read(&data)).await;
        let keys_first = business_keys(&store);
        let ids_first = storage_ids(&store);

        load_snapshot(&store, &Snapshot::read(&data)).await;
        let keys_second = business_keys(&store);
        let ids_second = storage_ids(&store);
        assert_eq!(store.indexes().len(), REQUIRED_INDEXES.len());

        assert_eq!(keys_first, keys_second);
        assert_eq!(keys_first.len(), 2 + 3 + 2);
        assert!(ids_first.is_disjoint(&ids_second));
        assert_eq!(store.documents(RACES).len(), 3);
    }

    #[tokio::test]
    async fn test_partial_insert_reported_and_other_collections_load() {
        let (data, _dir) = populated_data_dir();
        let mut snapshot = Snapshot::read(&data);
        // Same stage twice violates the unique stage_id index
        let mut dup = snapshot.races[0].clone();
        dup.race_id = "9".to_string();
        snapshot.races.push(dup);

        let store = MemoryStore::new();
        store.seed(RACES, vec![doc! {"race_id": "old"}]);
        let report = load_snapshot(&store, &snapshot).await;

        let races = &report.collections[1];
        assert_eq!(races.collection, RACES);
        assert!(matches!(
            races.result,
            Err(StoreError::PartialInsert { inserted: 3, attempted: 4, .. })
        ));
        // Deleted documents are not restored
        assert!(
            store
                .documents(RACES)
                .iter()
                .all(|d| d.get_str("race_id").unwrap() != "old")
        );
        assert_eq!(report.collections[2].inserted(), 2);
        assert_eq!(store.documents(DRIVERS).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_snapshot_clears_collections() {
        let store = MemoryStore::new();
        store.seed(DRIVERS, vec![doc! {"driver_id": "stale"}]);

        let report = load_snapshot(&store, &Snapshot::default()).await;

        assert!(store.documents(DRIVERS).is_empty());
        assert!(report.collections.iter().all(|c| matches!(c.result, Ok(0))));
    }

    #[tokio::test]
    async fn test_run_skips_load_when_store_unreachable() {
        let (data, _dir) = populated_data_dir();
        let config = StoreConfig {
            connection_string: "not-a-mongodb-uri".to_string(),
            database: "indycar".to_string(),
        };
        assert!(run(&config, &data).await.is_none());
        // Extracted files are untouched
        assert_eq!(data.season_files().len(), 2);
    }
}
