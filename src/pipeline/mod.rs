//! The extraction pipeline.
//!
//! Stages run in order, each reading only what the previous one wrote:
//! 1. [`seasons`] - season directory (`seasons.json`)
//! 2. [`races`] - per-season race aggregation (`season_{year}.json`)
//! 3. [`drivers`] - cross-season driver merge (`drivers.json`)
//!
//! Loading into the document store lives in [`crate::store::loader`].

pub mod drivers;
pub mod races;
pub mod seasons;
pub mod shape;
