use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use muehle::notation::{parse_board, parse_ply};
use muehle::rules::{draw_reason, winner};
use muehle::search::report::{analysis_overlay, summarize_last_move, tactic_hints_for_ply, LossThresholds, PlayerOverlay};
use muehle::{analyze, legal_plies, play_ply, AnalysisResult, EvalWeights, GameState, Limits, Player};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyse or play Nine Men's Morris positions", long_about = None)]
struct Args {
    /// Operation mode: 'a' analyse once, 's' engine self play, 'h' human vs engine
    #[arg(long, default_value = "a")]
    mode: String,

    /// 24 squares in index order using W, B and '.'; defaults to the empty board
    #[arg(long)]
    board: Option<String>,

    /// Side to move: 'w' or 'b'
    #[arg(long, default_value = "w")]
    to_move: String,

    /// Stones in hand per side; derived from the board when omitted
    #[arg(long)]
    in_hand: Option<String>,

    /// Maximum search depth in plies
    #[arg(long, default_value_t = 3)]
    depth: u32,

    /// Time budget per analysis in milliseconds (0 = none)
    #[arg(long, default_value_t = 0)]
    time_ms: u64,

    /// Node budget per analysis (0 = none)
    #[arg(long, default_value_t = 0)]
    max_nodes: u64,

    /// Number of ranked moves to report
    #[arg(long, default_value_t = 5)]
    top_n: usize,

    /// Disable the transposition table
    #[arg(long)]
    no_tt: bool,

    /// JSON file with evaluation weights
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Rate this ply (e.g. "P:a7" or "M:a7-d7xb4") played from the given position
    #[arg(long)]
    last_ply: Option<String>,

    /// Your colour in human mode: 'w' or 'b'
    #[arg(long, default_value = "w")]
    color: String,

    /// Self-play ply cap
    #[arg(long, default_value_t = 200)]
    max_plies: usize,

    /// Print evaluation breakdowns and overlays
    #[arg(long)]
    verbose: bool,
}

fn parse_player(s: &str) -> Result<Player> {
    match s.to_lowercase().as_str() {
        "w" | "white" => Ok(Player::White),
        "b" | "black" => Ok(Player::Black),
        _ => bail!("Invalid colour: use 'w' or 'b'"),
    }
}

fn load_weights(path: &PathBuf) -> Result<EvalWeights> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing weights from {}", path.display()))
}

fn initial_state(args: &Args) -> Result<GameState> {
    let to_move = parse_player(&args.to_move)?;
    let Some(text) = args.board.as_deref() else {
        return Ok(GameState::initial().with_to_move(to_move));
    };
    let board = parse_board(text)?;
    let state = match args.in_hand.as_deref() {
        Some(hands) => {
            let (w, b) = hands.split_once(',').context("--in-hand expects 'white,black'")?;
            GameState::new(board, to_move, w.trim().parse()?, b.trim().parse()?)?
        }
        None => GameState::from_board(board, to_move)?,
    };
    Ok(state)
}

fn print_analysis(state: &GameState, r: &AnalysisResult, overlay_weights: Option<&EvalWeights>) {
    let best = r.best_move.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
    println!("depth {} nodes {} tt {}/{} score {:.2} best {}", r.depth, r.nodes, r.tt_hits, r.tt_misses, r.score, best);
    for (i, sm) in r.top_moves.iter().enumerate() {
        let pv: Vec<String> = sm.pv.iter().map(|p| p.to_string()).collect();
        println!("{:>2}. {:<12} {:>9.2}  {}", i + 1, sm.ply.to_string(), sm.score, pv.join(" "));
        if overlay_weights.is_some() {
            for (name, v) in sm.breakdown_diff.non_zero() {
                println!("      {:<22} {:+.2}", name, v);
            }
        }
    }
    if let Some(weights) = overlay_weights {
        let overlay = analysis_overlay(state, weights, r.top_moves.len().max(1));
        print_player_overlay(Player::White, overlay.base_eval_white, &overlay.white);
        print_player_overlay(Player::Black, overlay.base_eval_black, &overlay.black);
        for c in &overlay.candidates {
            println!("  static {:<12} {:>9.2} ({:+.2})", c.ply.to_string(), c.score, c.delta);
        }
    }
}

fn print_player_overlay(p: Player, eval: f64, o: &PlayerOverlay) {
    println!("{}: eval {:.2} threats {:?} forks {:?} mobility {} blocked {:?}", p, eval, o.threats, o.fork_threats, o.mobility, o.blocked);
}

fn get_human_ply(state: &GameState) -> Result<muehle::Ply> {
    let legal = legal_plies(state);
    loop {
        print!("Enter your move (e.g. P:a7, M:a7-d7xb4): ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            bail!("input closed");
        }
        match parse_ply(&input) {
            Ok(ply) if legal.contains(&ply) => return Ok(ply),
            Ok(_) => println!("Illegal move!"),
            Err(e) => println!("{}", e),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mode = args.mode.chars().next().unwrap_or('a');
    let human = parse_player(&args.color)?;
    let eval_weights = match &args.weights {
        Some(path) => load_weights(path)?,
        None => EvalWeights::default(),
    };
    let limits = Limits {
        time_ms: (args.time_ms > 0).then_some(args.time_ms),
        max_depth: args.depth,
        max_nodes: (args.max_nodes > 0).then_some(args.max_nodes),
        use_tt: !args.no_tt,
        top_n: args.top_n,
        eval_weights,
    };
    let mut state = initial_state(&args)?;

    if mode == 'a' {
        println!("{}", state);
        let start = Instant::now();
        let r = analyze(&state, &limits, None);
        info!("analysis took {:.2}s", start.elapsed().as_secs_f32());
        print_analysis(&state, &r, args.verbose.then_some(&limits.eval_weights));

        if let Some(text) = args.last_ply.as_deref() {
            let ply = parse_ply(text)?;
            let summary = summarize_last_move(&state, &ply, &limits, &LossThresholds::default())?;
            println!("{}: {} (score {:.2}, loss {:.2})", ply, summary.label, summary.score, summary.loss);
            let hints = tactic_hints_for_ply(&state, &ply)?;
            if hints.missed_mill_in_1 {
                println!("missed mill-in-1 at {:?}", hints.missed_threats);
            }
            if hints.allowed_mill_in_1 {
                println!("allows opponent mill-in-1 at {:?}", hints.allowed_threats);
            }
        }
        return Ok(());
    }

    for ply_no in 0..args.max_plies {
        if let Some(reason) = draw_reason(&state) {
            println!("\nDraw ({})", reason.as_str());
            break;
        }
        if let Some(w) = winner(&state) {
            println!("\n{} wins!", w);
            break;
        }
        println!("\n{}'s turn (turn {})", state.to_move(), state.turn_no());
        println!("{}", state);

        let ply = if mode == 'h' && state.to_move() == human {
            get_human_ply(&state)?
        } else {
            let start = Instant::now();
            let r = analyze(&state, &limits, None);
            if args.verbose {
                print_analysis(&state, &r, None);
            }
            info!("ply {} searched in {:.2}s", ply_no, start.elapsed().as_secs_f32());
            match r.best_move {
                Some(p) => {
                    println!("Engine plays: {}", p);
                    p
                }
                None => {
                    println!("No legal moves available!");
                    break;
                }
            }
        };
        state = play_ply(&state, &ply)?;
    }
    Ok(())
}
