use std::path::PathBuf;

use clap::Parser;
use shieldmc::units::{GEV, M};
use shieldmc::{ParticleTable, RunManager, ScenarioConfig, ShieldingConstruction, ShieldingPrimaryGenerator};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Spacecraft shielding scenario: builds the geometry and generates primaries.
#[derive(Parser, Debug)]
#[command(name = "shielding", version, about)]
struct Args {
    /// JSON scenario file; built-in defaults when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of events, overrides the config
    #[arg(short = 'n', long)]
    events: Option<u64>,

    /// Random seed, overrides the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Worker threads, overrides the config
    #[arg(short, long)]
    workers: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct Summary {
    n:   u64,
    sum: [f64; 2],
    min: [f64; 2],
    max: [f64; 2],
}

impl Summary {
    fn new() -> Self {
        Self {
            n:   0,
            sum: [0.0; 2],
            min: [f64::INFINITY; 2],
            max: [f64::NEG_INFINITY; 2],
        }
    }

    fn add(&mut self, x: f64, z: f64) {
        self.n += 1;
        for (i, v) in [x, z].iter().enumerate() {
            self.sum[i] += v;
            self.min[i] = self.min[i].min(*v);
            self.max[i] = self.max[i].max(*v);
        }
    }
}

fn run(args: Args) -> shieldmc::Result<()> {
    let mut config = match &args.config {
        Some(path) => ScenarioConfig::from_path(path)?,
        None => ScenarioConfig::default(),
    };
    if let Some(n) = args.events {
        config.n_events = n;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.validate()?;

    let particles = ParticleTable::with_standard();
    let generator = ShieldingPrimaryGenerator::from_config(&particles, &config)?;
    let mut run = RunManager::new(ShieldingConstruction::new(config.clone()), generator, config.seed);
    run.initialize()?;

    let events = if config.workers > 1 {
        run.beam_on_parallel(config.n_events, config.workers)?
    } else {
        run.beam_on(config.n_events)?
    };

    let mut summary = Summary::new();
    for event in &events {
        for (vertex, _) in event.primaries() {
            summary.add(vertex.position.x, vertex.position.z);
        }
    }
    let gun = run.generator().gun();
    println!("events:   {}", events.len());
    println!("particle: {} at {} GeV", gun.particle_definition().name, gun.particle_energy() / GEV);
    if summary.n > 0 {
        for (i, axis) in ["x", "z"].iter().enumerate() {
            println!(
                "{}: mean {:+.4} m, min {:+.4} m, max {:+.4} m",
                axis,
                summary.sum[i] / summary.n as f64 / M,
                summary.min[i] / M,
                summary.max[i] / M,
            );
        }
    }
    info!(events = events.len(), "done");
    Ok(())
}

fn main() {
    let args = Args::parse();
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
