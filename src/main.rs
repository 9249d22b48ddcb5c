use anyhow::ensure;
use clap::Parser;
use hospital_climb::prelude::*;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// number of grid rows
    #[clap(long, default_value_t = 6)]
    height: usize,

    /// number of grid columns
    #[clap(long, default_value_t = 12)]
    width: usize,

    /// number of hospitals to place
    #[clap(long, default_value_t = 2)]
    hospitals: usize,

    /// number of houses scattered at random (ignored when --house is given)
    #[clap(long, default_value_t = 5)]
    houses: usize,

    /// explicit house as ROW,COL; may be repeated
    #[clap(long = "house", value_name = "ROW,COL")]
    house: Vec<Coordinate>,

    /// seed for a reproducible run
    #[clap(long)]
    seed: Option<u64>,

    /// stop after this many improving moves
    #[clap(long)]
    max_iterations: Option<usize>,

    /// render every state to <prefix>NNN.png (and .json)
    #[clap(long)]
    image_prefix: Option<String>,

    /// log search progress
    #[clap(long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            max_iterations: self.max_iterations,
            verbose: self.verbose,
        }
    }
}

fn build_space(args: &Args, rng: &mut StdRng) -> anyhow::Result<GridSpace> {
    let mut space = GridSpace::new(args.height, args.width, args.hospitals)?;

    if args.house.is_empty() {
        let cells: Vec<Coordinate> = space.available_space().into_iter().collect();
        ensure!(
            args.houses <= cells.len(),
            "cannot scatter {} houses on a {}x{} grid",
            args.houses,
            args.height,
            args.width
        );
        for house in cells.choose_multiple(rng, args.houses) {
            space.add_house(house.row, house.col)?;
        }
    } else {
        for house in &args.house {
            space.add_house(house.row, house.col)?;
        }
    }

    Ok(space)
}

fn handler(args: Args) -> anyhow::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut space = build_space(&args, &mut rng)?;
    info!(
        height = space.height(),
        width = space.width(),
        houses = space.houses().len(),
        hospitals = space.num_hospitals(),
        "grid ready"
    );

    let renderer = Renderer::new();
    let mut render = |snapshot: &Snapshot<'_>| {
        if let Some(prefix) = &args.image_prefix {
            if let Err(e) = renderer.save(snapshot, prefix) {
                warn!(iteration = snapshot.iteration, "failed to render snapshot: {:?}", e);
            }
        }
    };
    let sink: Option<SnapshotSink<'_>> = match args.image_prefix {
        Some(_) => Some(&mut render),
        None => None,
    };

    let outcome = HillClimb::new(args.config()).run(&mut space, &mut rng, sink)?;

    let hospitals = outcome
        .hospitals
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{} after {} moves", outcome.state, outcome.iterations);
    println!("hospitals: {}", hospitals);
    println!("cost: {}", outcome.cost);

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = handler(Args::parse()) {
        error!("error: {:?}", e);
        std::process::exit(1);
    }
}
