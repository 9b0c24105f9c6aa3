//! Highway Escape - headless runner
//!
//! Plays one session on autopilot, then records the result on the leaderboard
//! and prints it. Audio is silent unless `--speaker` is given.

use std::path::PathBuf;

use clap::Parser;

use highway_escape::assets::{ASSET_DIR, Assets};
use highway_escape::audio::{AudioManager, open_output};
use highway_escape::consts::TICK_HZ;
use highway_escape::highscores::HIGH_SCORE_FILE;
use highway_escape::settings::{QualityPreset, SETTINGS_FILE};
use highway_escape::sim::Transition;
use highway_escape::{Game, HighScores, Settings};

#[derive(Parser, Debug)]
#[command(name = "highway-escape", about = "Dodge traffic, grab power-ups, survive")]
struct Args {
    #[arg(long, help = "RNG seed (defaults to the current time)")]
    seed: Option<u64>,

    #[arg(long, default_value_t = 60 * 60 * 5, help = "Maximum ticks to simulate (60 per second)")]
    ticks: u64,

    #[arg(long, value_name = "DIR", default_value = ASSET_DIR)]
    assets: PathBuf,

    #[arg(long, value_name = "FILE", default_value = HIGH_SCORE_FILE)]
    highscores: PathBuf,

    #[arg(long, value_name = "FILE", default_value = SETTINGS_FILE)]
    settings: PathBuf,

    #[arg(long, default_value = "Autopilot", help = "Name recorded on the leaderboard")]
    name: String,

    #[arg(long, help = "Write placeholder sprites for any missing asset files")]
    export_assets: bool,

    #[arg(long, help = "Quality preset (low, medium, high); overrides the settings file")]
    quality: Option<QualityPreset>,

    #[arg(long, help = "Play sound through the default output device")]
    speaker: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Highway Escape (headless) starting...");

    let mut settings = Settings::load(&args.settings);
    if let Some(quality) = args.quality {
        settings.quality = quality;
    }
    log::info!("Quality: {} (up to {} particles)", settings.quality, settings.max_particles());

    let mut assets = Assets::new(&args.assets);
    if args.export_assets {
        let created = assets.export_missing_defaults();
        log::info!("Exported {created} default sprites to {}", args.assets.display());
    }
    assets.preload();
    let metrics = assets.sprite_metrics();

    let audio = AudioManager::new(open_output(args.speaker), &args.assets);
    let high_scores = HighScores::load(&args.highscores);

    let seed = args
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
    let mut game = Game::new(seed, metrics, audio, high_scores, settings);
    game.set_autopilot(true);
    game.start();

    let mut outcome = None;
    for _ in 0..=args.ticks {
        if let Transition::GameOver { score, level } = game.step() {
            outcome = Some((score, level));
            break;
        }
    }

    let state = game.state();
    let (score, level) = outcome.unwrap_or((state.score, state.level));
    let seconds = state.time_ticks / TICK_HZ;
    match outcome {
        Some(_) => println!("Wrecked after {seconds}s: score {score}, level {level}"),
        None => println!("Still driving after {seconds}s: score {score}, level {level}"),
    }

    game.finish_run();
    match game.submit_high_score(&args.name) {
        Some(rank) => println!("New high score! Rank #{rank}"),
        None => println!("No high score this time"),
    }

    println!("\nHIGH SCORES");
    if game.high_scores().is_empty() {
        println!("  (none yet)");
    }
    for (i, entry) in game.high_scores().entries.iter().enumerate() {
        println!(
            "{:>3}. {:<16} {:>8}  {:<9} {}",
            i + 1,
            entry.name,
            entry.score,
            entry.difficulty_label,
            entry.timestamp
        );
    }
}
