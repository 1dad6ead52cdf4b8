//! Sportradar IndyCar API integration.
//!
//! # Architecture
//!
//! - **Fetch** (`fetch.rs`) - the retrying GET primitive and the
//!   [`JsonSource`] transport seam
//! - **DTOs** (`dto.rs`) - the parts of the API responses we read by name
//! - **Client** (`client.rs`) - URL construction for the two endpoints
//!
//! Race detail payloads are kept as raw JSON objects: they are persisted
//! wholesale, so only the fields the pipeline actually inspects get types.
//!
//! # Usage
//!
//! ```ignore
//! let client = SportradarClient::from_config(&config)?;
//! if let Some(seasons) = client.seasons().await {
//!     println!("{} seasons", seasons.stages.len());
//! }
//! ```

mod client;
pub mod dto;
pub mod fetch;

pub use client::SportradarClient;
pub use fetch::{FetchError, Fetcher, HttpJsonSource, JsonSource, RetryPolicy};
