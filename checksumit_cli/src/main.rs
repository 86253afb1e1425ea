use anyhow::{Context, Result};
use checksumit_cli::config::{AppConfig, ConfigManager, get_config};
use checksumit_cli::file_discovery::{FileDiscoveryOptions, expand_paths};
use checksumit_cli::output::{OutputFormat, create_formatter, display_name};
use checksumit_cli::progress::{
    self, create_progress_infrastructure, format_bytes, format_throughput, throughput,
};
use checksumit_cli::terminal;
use checksumit_core::{
    BatchResult, CancellationFlag, HashAlgorithm, LocalFile, NullProvider,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use colored::*;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "checksumit")]
#[command(author, version, about = "checksumit - Multi-algorithm file checksums with bounded memory", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate digests for files
    Hash {
        /// Files or directories to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash algorithm to use (can be specified multiple times, e.g. -a MD5 -a SHA-256)
        #[arg(short, long = "algorithm", value_name = "ALGORITHM")]
        algorithms: Vec<String>,

        /// Use every supported algorithm
        #[arg(long, conflicts_with = "algorithms")]
        all: bool,

        /// Output format (defaults to output.default_format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Include patterns (glob patterns, can be specified multiple times)
        #[arg(short = 'i', long = "include", value_name = "PATTERN")]
        include_patterns: Vec<String>,

        /// Exclude patterns (glob patterns, can be specified multiple times, overrides includes)
        #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
        exclude_patterns: Vec<String>,

        /// Process directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Streaming chunk size in MiB (overrides the planned capacity)
        #[arg(long, value_name = "MIB", value_parser = clap::value_parser!(u64).range(1..))]
        capacity_mb: Option<u64>,

        /// Number of files hashed at the same time
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        jobs: Option<u64>,

        /// Disable progress bar display
        #[arg(long)]
        no_progress: bool,
    },

    /// List supported hash algorithms
    Algorithms,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., hasher.capacity_mb)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., hasher.capacity_mb)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,
}

struct HashArgs {
    paths: Vec<PathBuf>,
    algorithms: Vec<String>,
    all: bool,
    format: Option<OutputFormat>,
    discovery: FileDiscoveryOptions,
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("checksumit_core", log::LevelFilter::Debug)
            .filter_module("checksumit_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Commands::Hash {
            paths,
            algorithms,
            all,
            format,
            include_patterns,
            exclude_patterns,
            recursive,
            capacity_mb,
            jobs,
            no_progress,
        } => {
            let mut config = get_config().context("Failed to load configuration")?;
            config.apply_cli_overrides(
                capacity_mb,
                jobs.map(|j| usize::try_from(j).unwrap_or(usize::MAX)),
            );

            let args = HashArgs {
                paths,
                algorithms,
                all,
                format,
                discovery: FileDiscoveryOptions::new()
                    .with_include_patterns(include_patterns)
                    .with_exclude_patterns(exclude_patterns)
                    .with_recursive(recursive),
                no_progress,
            };
            let all_ok = handle_hash_command(args, &config).await?;
            if !all_ok {
                std::process::exit(1);
            }
        }
        Commands::Algorithms => {
            for algorithm in HashAlgorithm::ALL {
                println!("{algorithm}");
            }
        }
        Commands::Config { command } => {
            handle_config_command(command)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Choose the algorithms for a hash run: flags, then `--all`, then configuration
fn resolve_algorithms(args: &HashArgs, config: &AppConfig) -> Result<Vec<HashAlgorithm>> {
    if !args.algorithms.is_empty() {
        return Ok(HashAlgorithm::parse_list(&args.algorithms)?);
    }
    if args.all {
        return Ok(HashAlgorithm::ALL.to_vec());
    }
    config
        .hasher
        .default_algorithms()
        .context("Invalid hasher.default_algorithms")
}

/// Hash every file named on the command line; returns whether all succeeded
async fn handle_hash_command(args: HashArgs, config: &AppConfig) -> Result<bool> {
    // Names are resolved before any file is touched
    let algorithms = resolve_algorithms(&args, config)?;

    let format = match args.format {
        Some(format) => format,
        None => OutputFormat::from_string(&config.output.default_format)
            .context("Invalid output.default_format")?,
    };

    let files = expand_paths(&args.paths, &args.discovery)?;
    if files.is_empty() {
        eprintln!("{}", "No files to hash".yellow());
        return Ok(true);
    }

    let sources: Vec<LocalFile> = files.into_iter().map(LocalFile::new).collect();
    let processor = config.hasher.batch_processor()?;
    log::debug!(
        "Hashing {} file(s) with capacity {}",
        sources.len(),
        processor.calculator().capacity()
    );

    let cancel = CancellationFlag::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let show_progress = !args.no_progress
        && config.output.progress_enabled
        && terminal::should_show_progress_by_default();

    let batch = if show_progress {
        let (provider, rx) = create_progress_infrastructure();
        let renderer = tokio::spawn(progress::render_progress(rx));
        let batch = processor
            .process(&sources, &algorithms, provider.as_ref(), Some(&cancel))
            .await;
        // Renderer exits once every sender is gone
        drop(provider);
        let _ = renderer.await;
        batch
    } else {
        processor
            .process(&sources, &algorithms, &NullProvider, Some(&cancel))
            .await
    };
    ctrl_c.abort();

    let use_color = config.output.color_enabled && terminal::supports_ansi();
    report_failures(&batch, use_color);

    let formatter = create_formatter(format, use_color);
    print!("{}", formatter.format_batch(&batch.results)?);
    std::io::stdout().flush()?;

    if terminal::is_interactive() && batch.total_files > 1 {
        print_summary(&batch);
    }

    Ok(batch.all_succeeded())
}

fn report_failures(batch: &BatchResult, use_color: bool) {
    for outcome in &batch.results {
        if let Err(e) = &outcome.result {
            let message = format!("{}: {}", display_name(&outcome.name), e);
            if use_color {
                eprintln!("{} {}", "Error:".red().bold(), message);
            } else {
                eprintln!("Error: {message}");
            }
        }
    }
}

fn print_summary(batch: &BatchResult) {
    let bytes: u64 = batch.results.iter().filter_map(|o| o.size).sum();
    eprintln!(
        "\n{} {} file(s), {} failed, {} in {:.2}s ({})",
        "Hashed".green().bold(),
        batch.successful,
        batch.failed,
        format_bytes(bytes),
        batch.total_time.as_secs_f64(),
        format_throughput(throughput(bytes, batch.total_time))
    );
}

fn handle_config_command(command: ConfigCommand) -> Result<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Get { key } => match manager.get(&key) {
            Ok(value) => println!("{value}"),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        },
        ConfigCommand::Set { key, value } => match manager.set(&key, &value) {
            Ok(()) => println!(
                "{} {} = {} ({})",
                "Set".green().bold(),
                key,
                value,
                manager.get_config_path().display()
            ),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        },
        ConfigCommand::List => {
            let items = manager.list()?;
            println!(
                "{} {}",
                "Configuration:".bold(),
                manager.get_config_path().display()
            );
            for (key, value) in items {
                println!("  {} = {}", key.cyan(), value);
            }
        }
    }

    Ok(())
}
