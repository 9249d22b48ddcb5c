use std::collections::BTreeSet;

use itertools::iproduct;
use rand::{seq::SliceRandom, Rng};

use crate::{
    coordinate::Coordinate,
    cost::CostEvaluator,
    error::{ConfigurationError, PreconditionViolation, Result},
    snapshot::Snapshot,
};

/// The problem space: a `height` x `width` grid holding fixed houses and
/// `num_hospitals` movable hospitals.
///
/// Houses and hospitals never share a cell and always lie inside the grid.
/// Once hospitals are placed there are exactly `num_hospitals` of them.
#[derive(Clone, Debug)]
pub struct GridSpace {
    height: usize,
    width: usize,
    num_hospitals: usize,
    houses: BTreeSet<Coordinate>,
    hospitals: BTreeSet<Coordinate>,
}

impl GridSpace {
    pub fn new(height: usize, width: usize, num_hospitals: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(ConfigurationError::EmptyGrid { height, width }.into());
        }
        if num_hospitals == 0 {
            return Err(ConfigurationError::NoHospitals.into());
        }
        Ok(Self {
            height,
            width,
            num_hospitals,
            houses: BTreeSet::new(),
            hospitals: BTreeSet::new(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn num_hospitals(&self) -> usize {
        self.num_hospitals
    }

    pub fn houses(&self) -> &BTreeSet<Coordinate> {
        &self.houses
    }

    pub fn hospitals(&self) -> &BTreeSet<Coordinate> {
        &self.hospitals
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        coordinate.row < self.height && coordinate.col < self.width
    }

    pub fn is_occupied(&self, coordinate: &Coordinate) -> bool {
        self.houses.contains(coordinate) || self.hospitals.contains(coordinate)
    }

    /// Adds a house at (`row`, `col`).
    ///
    /// The cell must be inside the grid and hold neither a house nor a hospital.
    pub fn add_house(&mut self, row: usize, col: usize) -> Result<()> {
        let coordinate = Coordinate::new(row, col);
        self.check_free(&coordinate)?;
        self.houses.insert(coordinate);
        Ok(())
    }

    /// Every in-bounds cell holding neither a house nor a hospital.
    pub fn available_space(&self) -> BTreeSet<Coordinate> {
        iproduct!(0..self.height, 0..self.width)
            .map(Coordinate::from)
            .filter(|c| !self.is_occupied(c))
            .collect()
    }

    /// In-bounds, unoccupied cells adjacent to `coordinate`, ordered up, down, left, right.
    pub fn neighbors_of(&self, coordinate: &Coordinate) -> Vec<Coordinate> {
        coordinate
            .adjacent()
            .filter(|c| self.contains(c) && !self.is_occupied(c))
            .collect()
    }

    pub fn evaluator(&self) -> CostEvaluator<'_> {
        CostEvaluator::new(&self.houses)
    }

    pub fn cost(&self, hospitals: &BTreeSet<Coordinate>) -> Result<u64> {
        self.evaluator().cost(hospitals)
    }

    pub fn current_cost(&self) -> Result<u64> {
        self.cost(&self.hospitals)
    }

    /// Replaces the hospitals with a caller-chosen placement.
    ///
    /// The placement must hold exactly `num_hospitals` distinct, in-bounds cells
    /// that are not houses. On error the current hospitals are left untouched.
    pub fn set_hospitals<I>(&mut self, hospitals: I) -> Result<()>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let mut placement = BTreeSet::new();
        for coordinate in hospitals {
            if !self.contains(&coordinate) {
                return Err(self.out_of_bounds(coordinate).into());
            }
            if self.houses.contains(&coordinate) || !placement.insert(coordinate) {
                return Err(PreconditionViolation::Occupied { coordinate }.into());
            }
        }
        if placement.len() != self.num_hospitals {
            return Err(PreconditionViolation::HospitalCount {
                expected: self.num_hospitals,
                actual: placement.len(),
            }
            .into());
        }
        self.hospitals = placement;
        Ok(())
    }

    /// Clears the hospitals and draws `num_hospitals` cells uniformly, without
    /// replacement, from the cells not taken by houses.
    pub fn place_random_hospitals<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.hospitals.clear();
        let available: Vec<Coordinate> = self.available_space().into_iter().collect();
        if available.len() < self.num_hospitals {
            return Err(ConfigurationError::InsufficientSpace {
                requested: self.num_hospitals,
                available: available.len(),
            }
            .into());
        }
        self.hospitals = available
            .choose_multiple(rng, self.num_hospitals)
            .copied()
            .collect();
        Ok(())
    }

    /// Adopts a placement produced by the search. Callers guarantee it came from
    /// a valid move on the current hospitals.
    pub(crate) fn replace_hospitals(&mut self, hospitals: BTreeSet<Coordinate>) {
        debug_assert_eq!(hospitals.len(), self.num_hospitals);
        debug_assert!(hospitals.is_disjoint(&self.houses));
        debug_assert!(hospitals.iter().all(|c| self.contains(c)));
        self.hospitals = hospitals;
    }

    pub fn snapshot(&self, iteration: usize) -> Result<Snapshot<'_>> {
        Ok(Snapshot::new(
            iteration,
            (self.height, self.width),
            &self.houses,
            &self.hospitals,
            self.current_cost()?,
        ))
    }

    fn check_free(&self, coordinate: &Coordinate) -> Result<()> {
        if !self.contains(coordinate) {
            return Err(self.out_of_bounds(*coordinate).into());
        }
        if self.is_occupied(coordinate) {
            return Err(PreconditionViolation::Occupied {
                coordinate: *coordinate,
            }
            .into());
        }
        Ok(())
    }

    fn out_of_bounds(&self, coordinate: Coordinate) -> PreconditionViolation {
        PreconditionViolation::OutOfBounds {
            coordinate,
            height: self.height,
            width: self.width,
        }
    }
}
