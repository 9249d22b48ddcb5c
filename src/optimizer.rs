use std::{collections::BTreeSet, fmt};

use rand::{seq::SliceRandom, Rng};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    coordinate::Coordinate, error::Result, neighborhood::NeighborhoodGenerator,
    snapshot::Snapshot, space::GridSpace,
};

/// Receives a snapshot after initialization and after every accepted move.
pub type SnapshotSink<'a> = &'a mut dyn for<'r, 's> FnMut(&'r Snapshot<'s>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on accepted moves; `None` climbs until no move improves.
    pub max_iterations: Option<usize>,
    /// Log progress at `info` instead of `debug`.
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchState {
    Initializing,
    Searching,
    /// No neighbouring placement is strictly cheaper.
    Converged,
    /// The iteration bound was hit; the placement may not be a local optimum.
    StoppedAtMax,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchState::Initializing => write!(f, "Initializing"),
            SearchState::Searching => write!(f, "Searching"),
            SearchState::Converged => write!(f, "Converged"),
            SearchState::StoppedAtMax => write!(f, "Stopped At Iteration Limit"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub hospitals: BTreeSet<Coordinate>,
    pub cost: u64,
    /// Number of accepted moves.
    pub iterations: usize,
    pub state: SearchState,
}

/// The result of evaluating every neighbour of the current placement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scan {
    pub best_cost: Option<u64>,
    /// All candidates achieving `best_cost`, in enumeration order.
    pub best: Vec<BTreeSet<Coordinate>>,
}

impl Scan {
    pub fn improves_on(&self, current_cost: u64) -> bool {
        self.best_cost.is_some_and(|best| best < current_cost)
    }
}

/// Costs every candidate of the current placement without touching `space`.
///
/// Candidates are costed in parallel, but ties are gathered afterwards in
/// enumeration order so the result does not depend on scheduling.
pub fn scan(space: &GridSpace) -> Result<Scan> {
    let evaluator = space.evaluator();
    let candidates: Vec<BTreeSet<Coordinate>> = NeighborhoodGenerator::new(space)
        .candidates()
        .into_iter()
        .map(|(_, placement)| placement)
        .collect();
    let costs: Vec<u64> = candidates
        .par_iter()
        .map(|placement| evaluator.cost(placement))
        .collect::<Result<Vec<u64>>>()?;

    let best_cost = costs.iter().copied().min();
    let best = candidates
        .into_iter()
        .zip(costs)
        .filter(|(_, cost)| Some(*cost) == best_cost)
        .map(|(placement, _)| placement)
        .collect();

    Ok(Scan { best_cost, best })
}

/// Steepest-ascent hill climbing with random tie-breaking.
///
/// Each iteration moves to one of the cheapest neighbouring placements, but
/// only if it is strictly cheaper than the current one. Equal-cost plateaus
/// end the search.
#[derive(Clone, Debug, Default)]
pub struct HillClimb {
    config: SearchConfig,
}

impl HillClimb {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Places hospitals at random, then climbs from there.
    ///
    /// Fails only if the grid cannot hold every hospital.
    pub fn run<R: Rng + ?Sized>(
        &self,
        space: &mut GridSpace,
        rng: &mut R,
        sink: Option<SnapshotSink<'_>>,
    ) -> Result<SearchOutcome> {
        debug!(state = %SearchState::Initializing, "placing hospitals");
        space.place_random_hospitals(rng)?;
        self.climb(space, rng, sink)
    }

    /// Climbs from the hospitals currently placed in `space`.
    pub fn climb<R: Rng + ?Sized>(
        &self,
        space: &mut GridSpace,
        rng: &mut R,
        mut sink: Option<SnapshotSink<'_>>,
    ) -> Result<SearchOutcome> {
        let mut cost = space.current_cost()?;
        self.progress(cost, "Initial state");
        emit(&mut sink, space, 0)?;

        let mut iterations = 0;
        let state = loop {
            if self
                .config
                .max_iterations
                .is_some_and(|max| iterations >= max)
            {
                break SearchState::StoppedAtMax;
            }

            debug!(state = %SearchState::Searching, iteration = iterations + 1, "scanning neighbors");
            let neighborhood = scan(space)?;
            let best_cost = match neighborhood.best_cost {
                Some(best) if best < cost => best,
                _ => break SearchState::Converged,
            };
            let Some(next) = neighborhood.best.choose(rng).cloned() else {
                break SearchState::Converged;
            };

            space.replace_hospitals(next);
            cost = best_cost;
            iterations += 1;
            self.progress(cost, "Found better neighbor");
            emit(&mut sink, space, iterations)?;
        };

        info!(%state, iterations, cost, "hill climb finished");

        Ok(SearchOutcome {
            hospitals: space.hospitals().clone(),
            cost,
            iterations,
            state,
        })
    }

    fn progress(&self, cost: u64, message: &str) {
        if self.config.verbose {
            info!(cost, "{}", message);
        } else {
            debug!(cost, "{}", message);
        }
    }
}

fn emit(sink: &mut Option<SnapshotSink<'_>>, space: &GridSpace, iteration: usize) -> Result<()> {
    if let Some(sink) = sink.as_deref_mut() {
        let snapshot = space.snapshot(iteration)?;
        sink(&snapshot);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::error::ErrorKind;

    fn c(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col)
    }

    fn sample_space(num_hospitals: usize) -> GridSpace {
        let mut space = GridSpace::new(6, 12, num_hospitals).unwrap();
        for (row, col) in [(0, 0), (1, 5), (3, 3), (5, 11), (2, 8), (4, 1), (0, 10)] {
            space.add_house(row, col).unwrap();
        }
        space
    }

    #[test]
    fn walks_hospital_next_to_lone_house() {
        let mut space = GridSpace::new(3, 3, 1).unwrap();
        space.add_house(0, 0).unwrap();
        space.set_hospitals([c(2, 2)]).unwrap();

        let mut costs = vec![];
        let mut record = |s: &Snapshot<'_>| costs.push((s.iteration, s.cost));
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = HillClimb::default()
            .climb(&mut space, &mut rng, Some(&mut record))
            .unwrap();

        assert_eq!(outcome.state, SearchState::Converged);
        assert_eq!(outcome.cost, 1);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(costs, vec![(0, 4), (1, 3), (2, 2), (3, 1)]);
        let hospital = *outcome.hospitals.iter().next().unwrap();
        assert!(hospital == c(0, 1) || hospital == c(1, 0));
        assert_eq!(space.hospitals(), &outcome.hospitals);
    }

    #[test]
    fn random_start_always_ends_adjacent() {
        for seed in 0..16 {
            let mut space = GridSpace::new(3, 3, 1).unwrap();
            space.add_house(0, 0).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = HillClimb::default()
                .run(&mut space, &mut rng, None)
                .unwrap();
            assert_eq!(outcome.state, SearchState::Converged, "seed {seed}");
            assert_eq!(outcome.cost, 1, "seed {seed}");
        }
    }

    #[test]
    fn no_houses_converges_immediately() {
        let mut space = GridSpace::new(4, 4, 2).unwrap();
        let mut snapshots = vec![];
        let mut record = |s: &Snapshot<'_>| snapshots.push(s.iteration);
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = HillClimb::default()
            .run(&mut space, &mut rng, Some(&mut record))
            .unwrap();

        assert_eq!(outcome.state, SearchState::Converged);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.cost, 0);
        assert_eq!(snapshots, vec![0]);
    }

    #[test]
    fn hospitals_may_fill_every_free_cell() {
        let mut space = GridSpace::new(2, 3, 4).unwrap();
        space.add_house(0, 0).unwrap();
        space.add_house(1, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let outcome = HillClimb::default()
            .run(&mut space, &mut rng, None)
            .unwrap();

        assert_eq!(outcome.state, SearchState::Converged);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.hospitals.len(), 4);
        assert!(space.available_space().is_empty());
    }

    #[test]
    fn too_many_hospitals_is_a_configuration_error() {
        let mut space = GridSpace::new(2, 2, 4).unwrap();
        space.add_house(0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut called = false;
        let mut record = |_: &Snapshot<'_>| called = true;
        let err = HillClimb::default()
            .run(&mut space, &mut rng, Some(&mut record))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!called);
    }

    #[test]
    fn iteration_bound_stops_early() {
        let mut space = GridSpace::new(3, 3, 1).unwrap();
        space.add_house(0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        space.set_hospitals([c(2, 2)]).unwrap();
        let bounded = HillClimb::new(SearchConfig {
            max_iterations: Some(1),
            verbose: false,
        });
        let outcome = bounded.climb(&mut space, &mut rng, None).unwrap();
        assert_eq!(outcome.state, SearchState::StoppedAtMax);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.cost, 3);

        space.set_hospitals([c(2, 2)]).unwrap();
        let frozen = HillClimb::new(SearchConfig {
            max_iterations: Some(0),
            verbose: true,
        });
        let outcome = frozen.climb(&mut space, &mut rng, None).unwrap();
        assert_eq!(outcome.state, SearchState::StoppedAtMax);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.hospitals, BTreeSet::from([c(2, 2)]));
    }

    #[test]
    fn generous_bound_still_converges() {
        let mut space = GridSpace::new(3, 3, 1).unwrap();
        space.add_house(0, 0).unwrap();
        space.set_hospitals([c(2, 2)]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = HillClimb::new(SearchConfig {
            max_iterations: Some(10),
            verbose: false,
        })
        .climb(&mut space, &mut rng, None)
        .unwrap();
        assert_eq!(outcome.state, SearchState::Converged);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn every_snapshot_is_valid_and_strictly_cheaper() {
        for seed in 0..8 {
            let mut space = sample_space(3);
            let houses = space.houses().clone();
            let mut seen: Vec<(usize, u64, BTreeSet<Coordinate>)> = vec![];
            let mut record =
                |s: &Snapshot<'_>| seen.push((s.iteration, s.cost, s.hospitals.clone()));
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = HillClimb::default()
                .run(&mut space, &mut rng, Some(&mut record))
                .unwrap();

            assert_eq!(seen.len(), outcome.iterations + 1);
            for (index, (iteration, _, hospitals)) in seen.iter().enumerate() {
                assert_eq!(*iteration, index);
                assert_eq!(hospitals.len(), 3);
                assert!(hospitals.is_disjoint(&houses));
                assert!(hospitals.iter().all(|h| h.row < 6 && h.col < 12));
            }
            for pair in seen.windows(2) {
                assert!(pair[1].1 < pair[0].1, "seed {seed}: cost did not drop");
            }
            // Strict descent bounds the number of moves by the starting cost.
            assert!(outcome.iterations as u64 <= seen[0].1);
            assert_eq!(seen.last().unwrap().1, outcome.cost);
        }
    }

    #[test]
    fn converged_placement_has_no_improving_neighbor() {
        let mut space = sample_space(2);
        let mut rng = StdRng::seed_from_u64(42);
        let outcome = HillClimb::default()
            .run(&mut space, &mut rng, None)
            .unwrap();
        assert_eq!(outcome.state, SearchState::Converged);

        let rescan = scan(&space).unwrap();
        assert!(!rescan.improves_on(outcome.cost));
        if let Some(best) = rescan.best_cost {
            assert!(best >= outcome.cost);
        }
    }

    #[test]
    fn same_seed_same_outcome() {
        let climb = |seed| {
            let mut space = sample_space(3);
            let mut rng = StdRng::seed_from_u64(seed);
            HillClimb::default().run(&mut space, &mut rng, None).unwrap()
        };
        assert_eq!(climb(9), climb(9));
    }

    #[test]
    fn scan_keeps_every_tied_candidate() {
        let mut space = GridSpace::new(3, 3, 1).unwrap();
        space.add_house(1, 1).unwrap();
        space.set_hospitals([c(0, 0)]).unwrap();

        // Both (0,1) and (1,0) sit next to the house.
        let result = scan(&space).unwrap();
        assert_eq!(result.best_cost, Some(1));
        assert_eq!(
            result.best,
            vec![BTreeSet::from([c(1, 0)]), BTreeSet::from([c(0, 1)])]
        );
        assert!(result.improves_on(2));
        assert!(!result.improves_on(1));
    }

    #[test]
    fn tie_break_picks_each_tied_candidate() {
        let mut finals = BTreeSet::new();
        for seed in 0..32 {
            let mut space = GridSpace::new(3, 3, 1).unwrap();
            space.add_house(1, 1).unwrap();
            space.set_hospitals([c(0, 0)]).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = HillClimb::default()
                .climb(&mut space, &mut rng, None)
                .unwrap();
            assert_eq!(outcome.cost, 1, "seed {seed}");
            assert_eq!(outcome.iterations, 1, "seed {seed}");
            finals.extend(outcome.hospitals);
        }
        assert_eq!(finals, BTreeSet::from([c(0, 1), c(1, 0)]));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SearchConfig {
            max_iterations: Some(25),
            verbose: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"max_iterations":25,"verbose":true}"#);
        assert_eq!(serde_json::from_str::<SearchConfig>(&json).unwrap(), config);

        let unbounded: SearchConfig =
            serde_json::from_str(r#"{"max_iterations":null,"verbose":false}"#).unwrap();
        assert_eq!(unbounded, SearchConfig::default());
    }

    #[test]
    fn plateau_halts_the_search() {
        // The hospital is already adjacent; every move is equal or worse.
        let mut space = GridSpace::new(1, 3, 1).unwrap();
        space.add_house(0, 0).unwrap();
        space.set_hospitals([c(0, 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = HillClimb::default()
            .climb(&mut space, &mut rng, None)
            .unwrap();
        assert_eq!(outcome.state, SearchState::Converged);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.hospitals, BTreeSet::from([c(0, 1)]));

        // A hospital midway between two houses: shifting either way costs the same.
        let mut space = GridSpace::new(1, 5, 1).unwrap();
        space.add_house(0, 0).unwrap();
        space.add_house(0, 4).unwrap();
        space.set_hospitals([c(0, 2)]).unwrap();
        let outcome = HillClimb::default()
            .climb(&mut space, &mut rng, None)
            .unwrap();
        assert_eq!(outcome.cost, 4);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.hospitals, BTreeSet::from([c(0, 2)]));
    }
}
