use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use blastgrid_client::*;
use blastgrid_core::{Millis, PlayerId};
use blastgrid_protocol::Message;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Headless blastgrid peer: replays a scripted relay and prints every
/// outbound message as one JSON line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Local player id
    #[arg(long, default_value = "local")]
    id: String,

    /// Session config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay script (JSON lines)
    #[arg(long)]
    script: PathBuf,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: Millis,

    /// Keep ticking this long after the last script step
    #[arg(long, default_value_t = 3500)]
    tail_ms: Millis,

    /// Pace ticks against the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Print the final board to stderr
    #[arg(long)]
    print_board: bool,

    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SessionConfig::from_toml(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    let text = fs::read_to_string(&cli.script)
        .with_context(|| format!("reading script {}", cli.script.display()))?;
    let steps = parse_script(&text)
        .with_context(|| format!("parsing script {}", cli.script.display()))?;
    log::info!("Loaded {} script steps", steps.len());

    let clock = SessionClock::start();
    let realtime = cli.realtime;
    let replay = replay(
        config,
        PlayerId::new(cli.id),
        &steps,
        cli.frame_ms,
        cli.tail_ms,
        |frame| {
            if realtime {
                let ahead = frame.saturating_sub(clock.now());
                if ahead > 0 {
                    thread::sleep(Duration::from_millis(ahead));
                }
            }
        },
    )?;

    for message in &replay.sent {
        println!("{}", message.encode()?);
    }

    if cli.print_board {
        for row in replay.session.board().to_rows() {
            let line: String = row.iter().map(|code| char::from(b'0' + code)).collect();
            eprintln!("{}", line);
        }
    }

    let local = replay.session.local();
    log::info!(
        "{} finished with health {} ({:?}), stats {:?}",
        local.id(),
        local.health_text(),
        local.life(),
        replay.session.stats()
    );
    Ok(())
}
