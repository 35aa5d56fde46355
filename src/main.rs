// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use lingo_gapfy::app_config::{self, Config};
use lingo_gapfy::host::HostPage;
use lingo_gapfy::simulator::{Drill, DrillOutput, DrillStats, PageOptions, SimulatedPage, Transcript};

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
    /// Practise listening with an SRT transcript
    Drill(DrillArgs),

    /// Generate shell completions for lingo-gapfy
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct DrillArgs {
    /// SRT transcript to play
    #[arg(value_name = "SRT_FILE")]
    transcript: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Playback speed multiplier
    #[arg(short, long)]
    speed: Option<f64>,

    /// Start playback at this position (seconds)
    #[arg(long)]
    start_at: Option<f64>,

    /// Seed for the simulated caption renderer
    #[arg(long)]
    seed: Option<u64>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Fill-in-the-gap listening exercises over live captions.
#[derive(Parser, Debug)]
#[command(name = "lingo-gapfy")]
#[command(version)]
#[command(about = "Fill-in-the-gap listening exercises over live captions")]
#[command(long_about = "lingo-gapfy pauses a video after every caption line, blanks some of its words
and lets you type them. A wrong answer replays the line.

The drill command plays an SRT transcript through a simulated player in the terminal.
Type the missing word for the highlighted gap and press Enter.

COMMANDS DURING A DRILL:
    <word>   answer the highlighted gap
    :r       replay the current line
    :s       skip the current line
    :c       flip the player's own captions
    :q       quit

EXAMPLES:
    lingo-gapfy drill lesson.srt                 # Practise with default config
    lingo-gapfy drill -s 0.75 lesson.srt         # Slower playback
    lingo-gapfy drill --start-at 60 lesson.srt   # Skip the first minute
    lingo-gapfy completions bash > lingo.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Drill output printing above a playback progress bar
struct ProgressOutput {
    bar: ProgressBar,
}

impl ProgressOutput {
    fn new(duration: f64) -> Self {
        let bar = ProgressBar::new((duration * 1000.0) as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("[{bar:40}] {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        Self { bar }
    }
}

impl DrillOutput for ProgressOutput {
    fn line(&mut self, text: &str) {
        self.bar.println(text);
    }

    fn progress(&mut self, position: f64, duration: f64) {
        self.bar.set_position((position * 1000.0) as u64);
        self.bar.set_message(format!("{} / {}", format_clock(position), format_clock(duration)));
    }
}

fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lingo-gapfy", &mut std::io::stdout());
            Ok(())
        }
        Commands::Drill(args) => run_drill(args).await,
    }
}

async fn run_drill(options: DrillArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    // Load or create configuration
    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(speed) = options.speed {
        config.drill.speed = speed;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }

    let transcript = Transcript::from_file(&options.transcript)
        .context(format!("Failed to load transcript: {}", options.transcript.display()))?;
    info!(
        "Loaded {} cues from {}",
        transcript.len(),
        options.transcript.display()
    );

    let mut page = SimulatedPage::new(transcript, PageOptions::from_config(&config.drill, options.seed));
    if let Some(start_at) = options.start_at {
        page.set_current_time(start_at)
            .context(format!("Invalid start position: {}", start_at))?;
    }

    let output = ProgressOutput::new(page.duration());
    let mut drill = Drill::new(page, &config, output);
    drill.start();

    let tick = config.drill.tick();
    let mut ticker = tokio::time::interval(tick);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !drill.is_finished() {
        tokio::select! {
            _ = ticker.tick() => drill.step(tick),
            line = lines.next_line() => match line.context("Failed to read from stdin")? {
                Some(line) => drill.answer(&line)?,
                None => {
                    debug!("stdin closed, ending drill");
                    break;
                }
            },
        }
    }

    let (stats, output) = drill.finish();
    output.bar.finish_and_clear();
    print_summary(&stats);
    Ok(())
}

fn print_summary(stats: &DrillStats) {
    info!(
        "Drill finished: {} exercise(s), {} correct, {} mistake(s), {} replay(s), {} skipped",
        stats.exercises, stats.correct, stats.mistakes, stats.replays, stats.skipped
    );
}
