/// Giftbook — an animated gift-to-storybook presentation
///
/// Architecture:
///   engine/   — Window, renderer, background music, timers
///   game/     — Scene sequence, stage state, input gestures

mod engine;
mod game;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use giftbook_common::{AppConfig, PageIndexing};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

use crate::engine::sound_engine::SoundEngine;
use crate::game::ports::FocusRing;
use crate::game::stage::ElementId;
use crate::game::Presentation;

#[derive(Parser, Debug)]
#[command(name = "giftbook", version, about = "Unwrap a gift, then page through the storybook inside")]
struct Cli {
    /// Path to the TOML config
    #[arg(short, long, default_value = "giftbook.toml")]
    config: PathBuf,

    /// Number of content pages in the book
    #[arg(long)]
    pages: Option<usize>,

    /// Background music file (mp3, ogg, wav, flac)
    #[arg(long)]
    music: Option<PathBuf>,

    /// Scene to open at, e.g. "book-open" or "page-2"
    #[arg(long)]
    start_at: Option<String>,

    /// Page scene numbering: zero-based or back-cover-excluded
    #[arg(long)]
    indexing: Option<PageIndexing>,

    /// Print the effective config as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Command-line values take precedence over the config file
    fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(pages) = self.pages {
            config.book.page_count = pages;
        }
        if let Some(music) = &self.music {
            config.audio.music = Some(music.clone());
        }
        if let Some(start_at) = &self.start_at {
            config.book.start_at = Some(start_at.clone());
        }
        if let Some(indexing) = self.indexing {
            config.book.page_indexing = indexing;
        }
        config.validate()?;
        Ok(())
    }
}

/// `RUST_LOG` plus a default directive for the giftbook crates
fn log_filter(level: &str) -> Result<EnvFilter> {
    let directive = format!("giftbook={}", level)
        .parse::<Directive>()
        .with_context(|| format!("Invalid log level '{}'", level))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging starts at the default level so config loading is visible,
    // then follows the configured level.
    let (filter, filter_handle) = reload::Layer::new(log_filter(&AppConfig::default().log_level)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    cli.apply(&mut config)?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    filter_handle.reload(log_filter(&config.log_level)?)?;

    tracing::info!("Giftbook v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Book: {} pages ({}), cooldown {} ms",
        config.book.page_count,
        config.book.page_indexing.name(),
        config.timing.cooldown_ms
    );

    let audio = SoundEngine::try_load(config.audio.music.as_deref(), config.audio.volume);
    let focus = FocusRing::new(vec![ElementId::Book]);
    let presentation = Presentation::new(&config, audio, focus)?;

    engine::run(&config, presentation)
}
