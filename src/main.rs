// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{bail, Context, Result};
use std::cell::RefCell;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::LocalSet;
use tracing::info;

use xylo::audio::{output::default_device_name, AssetCatalog, SilentPlayer, SoundPlayer, WavPlayer};
use xylo::config::{AppConfig, LoggingSettings, DEFAULT_CONFIG_FILE};
use xylo::music::transcript;
use xylo::sequencer::PlaybackScheduler;
use xylo::session::Session;
use xylo::store::{MemoryBackend, SequenceStore, YamlFileBackend};
use xylo::ui::{App, UiPresenter, UiState};

fn print_usage() {
    println!("xylo - Terminal xylophone");
    println!();
    println!("Usage: xylo [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>     Settings file (default {})", DEFAULT_CONFIG_FILE);
    println!("  --ephemeral         Keep records in memory only");
    println!("  --mute              Do not open the audio device");
    println!("  --list-sounds       List available note sounds");
    println!("  --list-records      List saved records");
    println!("  --play <N>          Play saved record N and exit");
    println!("  --help              Show this help message");
}

/// What to do once options are parsed
enum Command {
    Run,
    ListSounds,
    ListRecords,
    Play(usize),
    Help,
}

struct Options {
    config: PathBuf,
    ephemeral: bool,
    mute: bool,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        config: PathBuf::from(DEFAULT_CONFIG_FILE),
        ephemeral: false,
        mute: false,
        command: Command::Run,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                options.config = PathBuf::from(path);
            }
            "--ephemeral" => options.ephemeral = true,
            "--mute" => options.mute = true,
            "--list-sounds" => options.command = Command::ListSounds,
            "--list-records" => options.command = Command::ListRecords,
            "--play" => {
                let index = iter.next().context("--play requires a record number")?;
                let index: usize = index
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid record number: {}", index))?;
                options.command = Command::Play(index);
            }
            "--help" | "-h" => options.command = Command::Help,
            other => bail!("Unknown option: {}", other),
        }
    }

    Ok(options)
}

fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let level: tracing::Level = settings
        .level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", settings.level))?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)
        .with_context(|| format!("Failed to open log file: {}", settings.file.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

fn open_store(config: &AppConfig, ephemeral: bool) -> SequenceStore {
    let key = config.store.key.clone();
    if ephemeral {
        SequenceStore::open(MemoryBackend::new(), key)
    } else {
        SequenceStore::open(YamlFileBackend::open(&config.store.path), key)
    }
}

fn make_player(config: &AppConfig, mute: bool) -> Rc<dyn SoundPlayer> {
    if mute {
        Rc::new(SilentPlayer)
    } else {
        Rc::new(WavPlayer::new(AssetCatalog::new(&config.audio.asset_dir)))
    }
}

fn make_scheduler(config: &AppConfig, player: Rc<dyn SoundPlayer>) -> PlaybackScheduler {
    PlaybackScheduler::new(player)
        .with_note_delay(config.playback.note_delay())
        .with_policy(config.playback.policy)
}

fn list_sounds(config: &AppConfig) -> Result<()> {
    let catalog = AssetCatalog::new(&config.audio.asset_dir);
    let notes = catalog
        .notes()
        .with_context(|| format!("Failed to read {}", catalog.root().display()))?;

    println!("Sounds in {}:", catalog.root().display());
    if notes.is_empty() {
        println!("  (none)");
    }
    for note in &notes {
        println!("  {}", note);
    }

    match default_device_name() {
        Some(name) => println!("Output device: {}", name),
        None => println!("Output device: (none)"),
    }
    Ok(())
}

fn list_records(store: &SequenceStore) {
    if store.is_empty() {
        println!("No saved records");
        return;
    }
    for (i, record) in store.all().iter().enumerate() {
        println!("{:3}: {} [{}]", i, record.name, transcript(&record.record));
    }
}

async fn play_record(config: &AppConfig, store: &SequenceStore, index: usize, mute: bool) -> Result<()> {
    let Some(record) = store.get(index) else {
        bail!("No record {} (store holds {})", index, store.len());
    };

    println!("Playing {}: {}", record.name, transcript(&record.record));
    let scheduler = make_scheduler(config, make_player(config, mute));
    let span = scheduler.span(&record.record);
    scheduler.play(record.record.clone());

    // Let the last note ring out
    tokio::time::sleep(span + Duration::from_secs(1)).await;
    Ok(())
}

async fn run_ui(config: AppConfig, store: SequenceStore, mute: bool) -> Result<()> {
    let player = make_player(&config, mute);
    let scheduler = make_scheduler(&config, Rc::clone(&player));

    let state = Rc::new(RefCell::new(UiState::new(config.audio.notes.clone())));
    let presenter = UiPresenter::new(Rc::clone(&state));
    let mut session = Session::new(store, player, scheduler, presenter);

    let mut app = App::new(state).context("Failed to initialise terminal")?;
    app.run(&mut session).await?;
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if let Command::Help = options.command {
        print_usage();
        return Ok(());
    }

    let config = AppConfig::load_or_default(&options.config)?;
    init_logging(&config.logging)?;
    info!("xylo starting with {}", options.config.display());

    match options.command {
        Command::ListSounds => list_sounds(&config)?,
        Command::ListRecords => list_records(&open_store(&config, options.ephemeral)),
        Command::Play(index) => {
            let store = open_store(&config, options.ephemeral);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            LocalSet::new().block_on(&runtime, play_record(&config, &store, index, options.mute))?;
        }
        Command::Run => {
            let store = open_store(&config, options.ephemeral);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            LocalSet::new().block_on(&runtime, run_ui(config, store, options.mute))?;
        }
        Command::Help => {}
    }

    Ok(())
}
