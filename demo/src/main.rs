mod loader;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use kdindex::{KdTree, SplitStrategy};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    hint::black_box,
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Instant,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Build a k-d tree over a point cloud and time k nearest neighbor queries.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Point cloud file (.csv, .txt or binary .ply). Asked for on stdin when omitted.
    path: Option<PathBuf>,

    /// Number of random stored points used as queries.
    #[arg(long, default_value_t = 10)]
    queries: usize,

    /// Largest k to time; every k in 1..=max_k is measured.
    #[arg(long, default_value_t = 100)]
    max_k: isize,

    /// Query repetitions averaged per (point, k) pair.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    repeats: u32,

    /// Where the timing csv is written.
    #[arg(short, long, default_value = "Output.csv")]
    output: PathBuf,

    /// Seed for picking query points; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Strategy::Sort)]
    strategy: Strategy,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Strategy {
    Sort,
    Select,
}

impl From<Strategy> for SplitStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Sort => SplitStrategy::Sort,
            Strategy::Select => SplitStrategy::Select,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let path = match args.path {
        Some(path) => path,
        None => prompt_path()?,
    };

    let points = loader::read_point_cloud(&path)?;
    ensure!(!points.is_empty(), "{} holds no points", path.display());

    let start = Instant::now();
    let mut tree = KdTree::with_strategy(kdindex::ColorPoint::DIMENSION, args.strategy.into())?;
    tree.build_tree(points)?;
    info!(elapsed = ?start.elapsed(), height = tree.height(), "built tree");

    let stored: Vec<_> = tree.iter().collect();
    let mut rng = args.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    writer.write_record(["Query Point", "K-Value", "Time Taken (nanoseconds)"])?;

    for _ in 0..args.queries {
        let query = stored[rng.gen_range(0..stored.len())];
        let label = query.to_string();

        for k in 1..=args.max_k {
            let start = Instant::now();
            for _ in 0..args.repeats {
                black_box(tree.query(black_box(query), k)?);
            }
            let mean = start.elapsed().as_nanos() / u128::from(args.repeats);

            let point = if k == 1 { label.as_str() } else { "" };
            let (k, mean) = (k.to_string(), mean.to_string());
            writer.write_record([point, k.as_str(), mean.as_str()])?;
        }
        info!(query = %label, "timed queries");
    }
    writer.flush()?;
    info!(output = %args.output.display(), "wrote timings");
    Ok(())
}

fn prompt_path() -> Result<PathBuf> {
    print!("Enter the path to a point cloud file: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    ensure!(!line.is_empty(), "no point cloud file given");
    Ok(PathBuf::from(line))
}
