// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use readcast::app_config::{self, Config, Selection, SynthesisEngine, TranslationProvider};
use readcast::app_controller::Controller;
use readcast::sources::FreshRss;

/// CLI Wrapper for SynthesisEngine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSynthesisEngine {
    Edge,
    Gtts,
}

impl From<CliSynthesisEngine> for SynthesisEngine {
    fn from(cli_engine: CliSynthesisEngine) -> Self {
        match cli_engine {
            CliSynthesisEngine::Edge => SynthesisEngine::Edge,
            CliSynthesisEngine::Gtts => SynthesisEngine::Gtts,
        }
    }
}

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    LibreTranslate,
    DeepL,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::LibreTranslate => TranslationProvider::LibreTranslate,
            CliTranslationProvider::DeepL => TranslationProvider::DeepL,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert articles to narrated episodes and update the feed (default command)
    #[command(alias = "convert")]
    Run(RunArgs),

    /// List FreshRSS categories and feed subscriptions
    Sources {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Rebuild the podcast feed from the audio files already on disk
    RebuildFeed {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for readcast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Selection file with per-article overrides
    #[arg(short = 'S', long)]
    selection: Option<String>,

    /// Narration engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliSynthesisEngine>,

    /// Narration voice (engine-specific identifier)
    #[arg(short, long)]
    voice: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Output directory for episode audio and the feed document
    #[arg(short, long)]
    output: Option<String>,

    /// Also fold embedded clips into episodes
    #[arg(long)]
    include_clips: bool,

    /// Regenerate audio even when the output file already exists
    #[arg(short, long)]
    force_regenerate: bool,

    /// Skip feed generation at the end of the batch
    #[arg(long)]
    no_feed: bool,

    /// Base URL for enclosure links
    #[arg(short, long)]
    base_url: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// readcast - Read-it-later articles as a podcast
///
/// Fetches articles from Wallabag and FreshRSS, narrates them with a TTS
/// engine, optionally folds in audio from embedded clips, and publishes
/// everything as a podcast feed.
#[derive(Parser, Debug)]
#[command(name = "readcast")]
#[command(author = "readcast contributors")]
#[command(version = "1.0.0")]
#[command(about = "Turn saved articles into narrated podcast episodes")]
#[command(long_about = "readcast fetches saved articles, narrates them and publishes a podcast feed.

EXAMPLES:
    readcast                                    # Convert with defaults from conf.json
    readcast -e gtts -t en                      # Google TTS narration in English
    readcast -S selection.json                  # Process a web-UI selection file
    readcast --include-clips                    # Fold embedded clips into episodes
    readcast rebuild-feed                       # Regenerate podcast.xml from disk
    readcast sources                            # List FreshRSS categories and feeds
    readcast completions bash > readcast.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED ENGINES:
    edge - edge-tts subprocess, Microsoft neural voices (default)
    gtts - Google Translate TTS endpoint, language-code voices")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✗ ",
            Level::Warn => "⚠ ",
            Level::Info => "",
            Level::Debug => "· ",
            Level::Trace => "· ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let marker = Self::get_marker_for_level(record.level());

            let color = match record.level() {
                Level::Error => "\x1B[1;31m",
                Level::Warn => "\x1B[1;33m",
                Level::Info => "\x1B[1;32m",
                Level::Debug => "\x1B[1;36m",
                Level::Trace => "\x1B[1;35m",
            };

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}{}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "readcast", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Sources { config_path }) => {
            let config = load_config(&config_path, None)?;
            list_sources(&config).await
        }
        Some(Commands::RebuildFeed { config_path }) => {
            let config = load_config(&config_path, None)?;
            let controller = Controller::with_config(config)?;
            let path = controller
                .rebuild_feed()
                .await
                .map_err(|e| anyhow!(e.to_string()))?;
            info!("Feed rebuilt: {:?}", path);
            Ok(())
        }
        Some(Commands::Run(args)) => run_batch(args).await,
        None => run_batch(cli.run).await,
    }
}

async fn run_batch(options: RunArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(to_level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_config(&options.config_path, options.log_level.as_ref())?;

    // Override config with CLI options if provided
    if let Some(engine) = &options.engine {
        config.synthesis.engine = engine.clone().into();
    }
    if let Some(voice) = &options.voice {
        config.default_voice = voice.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(output) = &options.output {
        config.output_dir = output.into();
    }
    if let Some(base_url) = &options.base_url {
        config.feed.base_url = base_url.clone();
    }
    if options.include_clips {
        config.include_clips = true;
    }
    if options.force_regenerate {
        config.skip_existing = false;
    }

    // Load the selection file; its global options land in the config
    let selection = match &options.selection {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .context(format!("Failed to read selection file: {}", path))?;
            let selection: Selection = serde_json::from_str(&content)
                .context(format!("Failed to parse selection file: {}", path))?;

            if let Some(engine) = selection.options.engine {
                config.synthesis.engine = engine;
            }
            if let Some(skip) = selection.options.skip_existing {
                config.skip_existing = skip;
            }
            Some(selection)
        }
        None => None,
    };

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    if config.wallabag.is_none() && config.freshrss.is_none() {
        return Err(anyhow!(
            "No article source configured; add a wallabag or freshrss section to the config"
        ));
    }

    info!(
        "Engine: {}, voice: {}, target language: {}",
        config.synthesis.engine, config.default_voice, config.target_language
    );

    let generate_feed = !options.no_feed;
    let controller = Arc::new(Controller::with_config(config)?);

    // One batch at a time on a background worker; the handle resolves to
    // the final status
    let handle = controller.spawn_batch(selection, generate_feed)?;
    let status = handle.await.context("Batch worker panicked")?;

    info!(
        "Done: {}/{} article(s) converted",
        status.produced(),
        status.total
    );

    if status.failed() > 0 {
        warn!("{} article(s) failed; see the log above", status.failed());
    }

    Ok(())
}

async fn list_sources(config: &Config) -> Result<()> {
    let Some(fr_config) = config.freshrss.clone() else {
        return Err(anyhow!("No freshrss section in the config"));
    };

    let mut client = FreshRss::new(fr_config);

    println!("=== CATEGORIES ===");
    match client.list_categories().await {
        Ok(categories) if !categories.is_empty() => {
            for category in categories {
                println!("  - {}", category.name);
            }
        }
        Ok(_) => println!("  (none)"),
        Err(e) => warn!("Could not list categories: {}", e),
    }

    println!("\n=== FEEDS ===");
    match client.list_feeds().await {
        Ok(feeds) if !feeds.is_empty() => {
            for feed in feeds {
                println!("  - {}", feed.title);
                println!("    ID: {}", feed.id);
                if !feed.categories.is_empty() {
                    println!("    Categories: {}", feed.categories.join(", "));
                }
            }
        }
        Ok(_) => println!("  (none)"),
        Err(e) => warn!("Could not list feeds: {}", e),
    }

    Ok(())
}

fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

fn load_config(config_path: &str, cli_log_level: Option<&CliLogLevel>) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        if let Some(log_level) = cli_log_level {
            config.log_level = log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();
        if let Some(log_level) = cli_log_level {
            config.log_level = log_level.clone().into();
        }

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // If log level was not set via command line, honor the config
    if cli_log_level.is_none() {
        log::set_max_level(to_level_filter(&config.log_level));
    }

    Ok(config)
}
