use hashbrown::HashSet;
use tracing::warn;

use crate::models::RawHit;

/// Identifiers seen so far in one harvest run.
#[derive(Debug, Default)]
pub struct SeenPlaces {
    ids: HashSet<String>,
    rejected: usize,
}

impl SeenPlaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hit's identifier; true only the first time it is seen.
    ///
    /// Hits without an id or resource name cannot be deduplicated or
    /// enriched and are always rejected.
    pub fn admit(&mut self, hit: &RawHit) -> bool {
        match hit.place_id() {
            Some(id) => self.ids.insert(id.to_string()),
            None => {
                warn!(
                    "Dropping hit without identifier: {:?} ({:?})",
                    hit.display_name, hit.provenance
                );
                self.rejected += 1;
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Hits dropped for lack of an identifier
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
