use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use readalong::{
    ContentHost, PlaybackState, ReadAloudEngine, SessionReport, SimulatedSpeech, SpeechSettings,
    SpeechSignal, StaticContent,
};

#[derive(Parser, Debug)]
#[command(name = "readalong")]
#[command(about = "Reads extracted article text aloud with synchronized sentence highlighting")]
#[command(version)]
struct Args {
    /// UTF-8 text file to read aloud
    input: PathBuf,

    /// Speech rate hint (0.5-3.0)
    #[arg(long, default_value_t = 1.0)]
    rate: f32,

    /// Speech pitch hint (0.0-2.0)
    #[arg(long, default_value_t = 1.0)]
    pitch: f32,

    /// Speech volume hint (0.0-1.0)
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Simulated speaking pace in words per minute, before rate scaling
    #[arg(long, default_value_t = 180)]
    wpm: u32,

    /// Bytes of drift applied to simulated boundary offsets
    #[arg(long, default_value_t = 2)]
    jitter: usize,

    /// Print the tagged markup rendering before playback starts
    #[arg(long)]
    show_markup: bool,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Session report output file path
    #[arg(long, default_value = "session_report.json")]
    stats_out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting readalong");
    info!(?args, "Parsed CLI arguments");

    // Input problems surface before any session state exists
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let text = tokio::fs::read_to_string(&args.input).await?;
    if text.trim().is_empty() {
        anyhow::bail!("Input file has no readable text: {}", args.input.display());
    }

    let settings = SpeechSettings::new(args.rate, args.pitch, args.volume);
    let (facility, signals) = SimulatedSpeech::new(args.wpm, args.jitter);
    let host = StaticContent::new(text.as_str());
    let mut engine = ReadAloudEngine::new(Some(facility), host, settings)?;

    let started = Instant::now();
    engine.play()?;

    let sentence_count = engine.sentence_count();
    println!(
        "readalong v{} - {} sentences queued",
        env!("CARGO_PKG_VERSION"),
        sentence_count
    );
    if args.show_markup {
        println!("{}", engine.host().markup());
    }

    let bar = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(sentence_count as u64)
    };
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} sentences",
    )?);

    let mut report = SessionReport {
        utterance_bytes: text.len(),
        sentence_count,
        settings,
        ..SessionReport::default()
    };

    let mut signals = ReceiverStream::new(signals);
    while let Some(signal) = signals.next().await {
        let is_boundary = matches!(signal, SpeechSignal::Progress(_));
        let before = engine.current_sentence();

        if let Err(err) = engine.handle_signal(signal) {
            report.playback_errors += 1;
            eprintln!("Playback error: {err}");
        }

        if is_boundary {
            report.boundary_signals += 1;
            if engine.current_sentence() != before {
                report.highlight_changes += 1;
            }
            bar.set_position(engine.current_sentence() as u64 + 1);
        }

        if engine.state() == PlaybackState::Idle {
            break;
        }
    }
    bar.finish_and_clear();

    report.final_state = engine.state().as_str().to_string();
    report.duration_ms = started.elapsed().as_millis() as u64;
    report.save(&args.stats_out).await?;

    println!("Read-aloud complete:");
    println!("  Sentences: {sentence_count}");
    println!("  Boundary signals: {}", report.boundary_signals);
    println!("  Highlight changes: {}", report.highlight_changes);
    if report.playback_errors > 0 {
        println!("  Playback errors: {}", report.playback_errors);
    }
    println!("  Report written to: {}", args.stats_out.display());

    info!(
        "Session finished: {} boundary signals, {} highlight changes, {} ms",
        report.boundary_signals, report.highlight_changes, report.duration_ms
    );

    Ok(())
}
