use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chainsweeper_core::Difficulty;
use chainsweeper_engine::{
    CellView, EngineAdapter, EngineConfig, EngineContext, EngineError, FileStore, PersistenceStore,
    SystemClock,
};
use chainsweeper_protocol::{GameMode, GameSnapshot, GameStatus};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Where the game, statistics and mode are saved
    #[arg(long, default_value = ".chainsweeper")]
    data_dir: PathBuf,

    /// Engine settings in TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a new game from a preset or a custom size
    New {
        #[arg(short, long, value_enum, conflicts_with_all = ["width", "height", "mines"])]
        difficulty: Option<Preset>,
        #[arg(long, requires_all = ["height", "mines"])]
        width: Option<u8>,
        #[arg(long, requires_all = ["width", "mines"])]
        height: Option<u8>,
        #[arg(long, requires_all = ["width", "height"])]
        mines: Option<u16>,
    },
    /// Reveal the cell at column X, row Y
    Reveal { x: u8, y: u8 },
    /// Toggle the flag on a hidden cell
    Flag { x: u8, y: u8 },
    /// Print the board and the game summary
    Show,
    /// Print player statistics
    Stats,
    /// Show the active mode, or switch to another one
    Mode { mode: Option<GameMode> },
    /// Write a JSON backup to FILE, or stdout
    Export { file: Option<PathBuf> },
    /// Restore a JSON backup
    Import { file: PathBuf },
    /// Delete every saved record
    Reset,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl From<Preset> for Difficulty {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Easy => Difficulty::Easy,
            Preset::Medium => Difficulty::Medium,
            Preset::Hard => Difficulty::Hard,
            Preset::Expert => Difficulty::Expert,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
}

fn format_time(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(|| "-".to_owned(), |time| time.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::NotStarted => "not started",
        GameStatus::InProgress => "in progress",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    }
}

fn print_summary(snapshot: &GameSnapshot) {
    println!(
        "{}x{} board, {} mines, {}",
        snapshot.width,
        snapshot.height,
        snapshot.mine_count,
        status_label(snapshot.status)
    );
    println!("score {}, {} clicks", snapshot.score, snapshot.click_count);
    println!("started {}", format_time(snapshot.start_time));
    if snapshot.status.is_finished() {
        let seconds = snapshot.end_time.saturating_sub(snapshot.start_time) / 1000;
        println!("finished {} after {}s", format_time(snapshot.end_time), seconds);
    }
}

async fn print_board(adapter: &EngineAdapter, snapshot: &GameSnapshot) -> Result<()> {
    print!("   ");
    for x in 0..snapshot.width {
        print!("{:>2}", x % 10);
    }
    println!();

    for y in 0..snapshot.height {
        print!("{y:>2} ");
        for x in 0..snapshot.width {
            let symbol = match adapter.cell_view(x, y).await? {
                CellView::Hidden => '#',
                CellView::Flagged => 'F',
                CellView::Mine => '*',
                CellView::Revealed(0) => '.',
                CellView::Revealed(n) => char::from(b'0' + n),
            };
            print!(" {symbol}");
        }
        println!();
    }
    Ok(())
}

async fn show(adapter: &EngineAdapter) -> Result<()> {
    let snapshot = adapter.game_info().await?;
    if !snapshot.initialized {
        println!("No game yet, start one with `chainsweeper new`");
        return Ok(());
    }
    print_board(adapter, &snapshot).await?;
    print_summary(&snapshot);
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    log::debug!("config: {:?}", config);

    let store = PersistenceStore::new(Arc::new(FileStore::new(&args.data_dir)));
    let mut adapter = EngineAdapter::open(EngineContext {
        config,
        store,
        // no wallet provider outside the browser
        ledger: None,
        clock: Arc::new(SystemClock),
    });
    for warning in adapter.take_warnings() {
        eprintln!("warning: {warning}");
    }

    match args.command {
        Command::New {
            difficulty,
            width,
            height,
            mines,
        } => {
            match (width, height, mines) {
                (Some(width), Some(height), Some(mines)) => {
                    adapter.start_game(width, height, mines).await?;
                }
                _ => {
                    let preset = difficulty.map_or(Difficulty::Easy, Difficulty::from);
                    adapter.start_preset(preset).await?;
                }
            }
            show(&adapter).await?;
        }
        Command::Reveal { x, y } => {
            let result = adapter.reveal_cell(x, y).await?;
            if result.is_mine {
                println!("Boom! ({x}, {y}) was a mine");
            }
            show(&adapter).await?;
        }
        Command::Flag { x, y } => {
            let result = adapter.toggle_flag(x, y)?;
            println!(
                "({x}, {y}) {}",
                if result.flagged { "flagged" } else { "unflagged" }
            );
        }
        Command::Show => show(&adapter).await?,
        Command::Stats => {
            let stats = adapter.player_stats().await?;
            println!("games played  {}", stats.total_games_played);
            println!("games won     {}", stats.games_won);
            println!("win rate      {}%", stats.win_rate);
            println!("high score    {}", stats.current_high_score);
        }
        Command::Mode { mode: None } => {
            let mode = adapter.mode();
            println!("{}: {}", mode.display_name(), mode.description());
            let suggestion = adapter.mode_suggestion();
            println!("suggested: {} ({})", suggestion.mode, suggestion.reason);
        }
        Command::Mode { mode: Some(mode) } => match adapter.set_mode(mode) {
            Ok(()) => println!("Switched to {}", mode.display_name()),
            Err(EngineError::ModeUnavailable(mode)) => {
                log::warn!("{} requested without a ledger provider", mode);
                eprintln!(
                    "warning: {} is not available here, staying in {}",
                    mode.display_name(),
                    adapter.mode().display_name()
                );
            }
            Err(err) => return Err(err.into()),
        },
        Command::Export { file } => {
            let json = adapter.export_data()?;
            match file {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Could not write {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Could not read {}", file.display()))?;
            adapter.import_data(&json)?;
            println!("Imported {}", file.display());
        }
        Command::Reset => {
            adapter.reset_all_data();
            println!("All saved data deleted");
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format_target(false)
        .init();

    run(args).await
}
