use std::collections::BTreeSet;

use serde::Serialize;

use crate::coordinate::Coordinate;

/// Read-only capture of the search at one iteration, handed to diagnostics
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot<'a> {
    version: &'static str,
    pub iteration: usize,
    pub height: usize,
    pub width: usize,
    pub houses: &'a BTreeSet<Coordinate>,
    pub hospitals: &'a BTreeSet<Coordinate>,
    pub cost: u64,
}

impl<'a> Snapshot<'a> {
    pub fn new(
        iteration: usize,
        (height, width): (usize, usize),
        houses: &'a BTreeSet<Coordinate>,
        hospitals: &'a BTreeSet<Coordinate>,
        cost: u64,
    ) -> Self {
        Snapshot {
            version: env!("CARGO_PKG_VERSION"),
            iteration,
            height,
            width,
            houses,
            hospitals,
            cost,
        }
    }

    /// Artifact name without extension: `prefix` followed by the iteration padded to 3 digits.
    pub fn artifact_stem(&self, prefix: &str) -> String {
        format!("{}{:03}", prefix, self.iteration)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
