//! MongoDB-backed [`DocumentStore`].

use async_trait::async_trait;
use mongodb::bson::{Document, doc};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use super::{DocumentStore, IndexSpec, StoreError};

/// Connection to one MongoDB database.
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a `ping`.
    pub async fn connect(connection_string: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(connection_string)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        let database = client.database(database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        tracing::info!("Connected to MongoDB database '{}'", database.name());
        Ok(Self { client, database })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<(), StoreError> {
        let mut keys = Document::new();
        for key in spec.keys {
            keys.insert(*key, 1);
        }

        let mut model = IndexModel::builder().keys(keys).build();
        if spec.unique {
            model.options = Some(IndexOptions::builder().unique(true).build());
        }

        self.collection(spec.collection)
            .create_index(model)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Index {
                collection: spec.collection.to_string(),
                keys: spec.keys.iter().map(|k| k.to_string()).collect(),
                message: e.to_string(),
            })
    }

    async fn replace_all(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let coll = self.collection(collection);

        let deleted = coll
            .delete_many(doc! {})
            .await
            .map_err(|e| StoreError::Clear {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!("Deleted {} documents from {}", deleted.deleted_count, collection);

        if documents.is_empty() {
            return Ok(0);
        }

        let attempted = documents.len();
        match coll.insert_many(documents).await {
            Ok(result) => Ok(result.inserted_ids.len()),
            Err(e) => {
                // Ordered insert: whatever made it in before the failure stays
                let inserted = coll.count_documents(doc! {}).await.unwrap_or(0) as usize;
                Err(StoreError::PartialInsert {
                    collection: collection.to_string(),
                    inserted,
                    attempted,
                    message: e.to_string(),
                })
            }
        }
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB connection closed");
    }
}
