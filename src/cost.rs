use std::collections::BTreeSet;

use crate::{
    coordinate::Coordinate,
    error::{PlacementError, Result},
};

/// A house paired with the hospital serving it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub house: Coordinate,
    pub hospital: Coordinate,
    pub distance: u64,
}

/// Sums Manhattan distances from a fixed set of houses to their nearest hospital.
#[derive(Clone, Copy, Debug)]
pub struct CostEvaluator<'a> {
    houses: &'a BTreeSet<Coordinate>,
}

impl<'a> CostEvaluator<'a> {
    pub fn new(houses: &'a BTreeSet<Coordinate>) -> Self {
        Self { houses }
    }

    /// Total cost of serving every house from `hospitals`.
    ///
    /// Fails with an invalid-state error when `hospitals` is empty, even if
    /// there are no houses, since "nearest" is undefined.
    pub fn cost(&self, hospitals: &BTreeSet<Coordinate>) -> Result<u64> {
        ensure_hospitals(hospitals)?;
        Ok(self
            .houses
            .iter()
            .filter_map(|house| nearest(house, hospitals).map(|(_, d)| d))
            .sum())
    }

    /// Nearest-hospital assignment for each house, in house order.
    pub fn assignments(&self, hospitals: &BTreeSet<Coordinate>) -> Result<Vec<Assignment>> {
        ensure_hospitals(hospitals)?;
        Ok(self
            .houses
            .iter()
            .filter_map(|house| {
                nearest(house, hospitals).map(|(hospital, distance)| Assignment {
                    house: *house,
                    hospital: *hospital,
                    distance,
                })
            })
            .collect())
    }
}

/// The closest hospital to `house`. Equal distances resolve to the smallest coordinate.
pub fn nearest<'h>(
    house: &Coordinate,
    hospitals: &'h BTreeSet<Coordinate>,
) -> Option<(&'h Coordinate, u64)> {
    hospitals
        .iter()
        .map(|hospital| (hospital, house.manhattan_distance(hospital)))
        .min_by_key(|(_, d)| *d)
}

fn ensure_hospitals(hospitals: &BTreeSet<Coordinate>) -> Result<()> {
    if hospitals.is_empty() {
        return Err(PlacementError::invalid_state(
            "cost requested for an empty hospital set",
        ));
    }
    Ok(())
}
