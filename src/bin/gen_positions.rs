use anyhow::Result;
use clap::Parser;
use muehle::sampling::{generate_samples, write_jsonl, PhaseTargets, SampleParams};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gen_positions", about = "Sample self-play positions for weight tuning")]
struct Args {
    #[arg(long, default_value_t = 30)]
    target: usize,
    #[arg(long, default_value_t = 4)]
    depth: u32,
    #[arg(long, default_value_t = 5)]
    top_n: usize,
    /// Chance of a random pick among the top N instead of the best move
    #[arg(long, default_value_t = 0.2)]
    epsilon: f64,
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Sample every N-th ply (0 = only forced reasons)
    #[arg(long, default_value_t = 2)]
    interval: usize,
    #[arg(long, default_value_t = 200)]
    max_plies: usize,
    #[arg(long, default_value_t = 7)]
    seed: u64,
    #[arg(long)]
    no_tt: bool,
    #[arg(long, default_value = "data/tuning_positions.jsonl")]
    output: PathBuf,
    /// "placing,moving,flying", must sum to --target
    #[arg(long)]
    phase_targets: Option<String>,
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let a = Args::parse();
    let phase_targets = a.phase_targets.as_deref().map(|raw| PhaseTargets::parse(raw, a.target)).transpose()?;
    let params = SampleParams {
        target: a.target,
        depth: a.depth,
        top_n: a.top_n,
        epsilon: a.epsilon,
        games: a.games,
        interval: a.interval,
        max_plies: a.max_plies,
        seed: a.seed,
        use_tt: !a.no_tt,
        phase_targets,
        progress: !a.no_progress,
    };
    eprintln!("Sampling up to {} positions from {} games (depth={}, epsilon={})", a.target, a.games, a.depth, a.epsilon);
    let samples = generate_samples(&params)?;
    write_jsonl(&samples, &a.output)?;
    eprintln!("Saved {} positions to {}", samples.len(), a.output.display());
    Ok(())
}
