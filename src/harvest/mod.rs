//! The search aggregation and enrichment engine.
//!
//! A request is resolved to a location bias and a set of query streams; each
//! stream is paginated in turn, hits are deduplicated across all streams, and
//! every unique place is enriched with a details call.

mod dedup;
mod engine;
mod enrich;
mod expand;
mod paginate;

#[cfg(test)]
mod testing;

pub use dedup::SeenPlaces;
pub use engine::{
    HarvestReport, HarvestRequest, HarvestSettings, Harvester, Progress, QueryText, RunStats,
};
pub use enrich::merge_details;
pub use expand::{expand, plan_streams, QueryStream};
pub use paginate::search_pages;
