use std::collections::BTreeSet;

use crate::{coordinate::Coordinate, space::GridSpace};

/// Relocation of a single hospital to an adjacent free cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Coordinate,
    pub to: Coordinate,
}

impl Move {
    /// The placement that results from applying this move to `hospitals`.
    pub fn apply(&self, hospitals: &BTreeSet<Coordinate>) -> BTreeSet<Coordinate> {
        let mut placement = hospitals.clone();
        placement.remove(&self.from);
        placement.insert(self.to);
        placement
    }
}

/// Enumerates the single-step neighbourhood of the current hospital placement.
///
/// Moves come out hospital by hospital in coordinate order, and within one
/// hospital in the order of [`GridSpace::neighbors_of`]. Nothing here is random.
#[derive(Clone, Copy, Debug)]
pub struct NeighborhoodGenerator<'a> {
    space: &'a GridSpace,
}

impl<'a> NeighborhoodGenerator<'a> {
    pub fn new(space: &'a GridSpace) -> Self {
        Self { space }
    }

    pub fn moves(&self) -> Vec<Move> {
        self.space
            .hospitals()
            .iter()
            .flat_map(|from| {
                self.space
                    .neighbors_of(from)
                    .into_iter()
                    .map(move |to| Move { from: *from, to })
            })
            .collect()
    }

    /// Every candidate placement, paired with the move producing it.
    pub fn candidates(&self) -> Vec<(Move, BTreeSet<Coordinate>)> {
        let hospitals = self.space.hospitals();
        self.moves()
            .into_iter()
            .map(|m| (m, m.apply(hospitals)))
            .collect()
    }
}
