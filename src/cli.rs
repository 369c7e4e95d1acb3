//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::candlestick::PatternTaxonomy;
use crate::domain::chain::{self, PredicateChain};
use crate::domain::config_validation::{ScreenerConfig, validate_config};
use crate::domain::error::ScreenerError;
use crate::domain::predicate::PredicateLibrary;
use crate::domain::screener::Screener;
use crate::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "screener", about = "Technical-analysis stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the REST and JSON-RPC servers
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run a predicate chain and print the matching symbols
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Chain as inline JSON or a path to a JSON file
        #[arg(long, conflicts_with = "preset", required_unless_present = "preset")]
        chain: Option<String>,
        /// Name of a built-in chain (bullish, bearish)
        #[arg(long)]
        preset: Option<String>,
    },
    /// List predicate names
    Strategies {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols stored at the base interval
    Universe {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print candlestick pattern occurrences for one symbol
    Patterns {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        interval: String,
        #[arg(long, default_value_t = 12)]
        period: usize,
    },
    /// Aggregate every series of one interval into a coarser one
    Downsample {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Check a chain against the predicate library without reading data
    Validate {
        #[arg(long)]
        chain: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Run {
            config,
            chain,
            preset,
        } => run_chain(&config, chain.as_deref(), preset.as_deref()),
        Command::Strategies { config } => run_strategies(&config),
        Command::Universe { config } => run_universe(&config),
        Command::Patterns {
            config,
            symbol,
            interval,
            period,
        } => run_patterns(&config, &symbol, &interval, period),
        Command::Downsample { config, from, to } => run_downsample(&config, &from, &to),
        Command::Validate { chain } => run_validate(&chain),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<ScreenerConfig, ScreenerError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)
}

/// Loads config, starts logging and builds the screener over the CSV store.
fn load_screener(config_path: &Path) -> Result<(ScreenerConfig, Screener), ScreenerError> {
    let config = load_config(config_path)?;
    init_logging(&config.log_level, config.log_format);
    let data = Arc::new(CsvAdapter::new(config.data_directory.clone()));
    let screener = Screener::new(data, &config.base_interval, config.downsampling.clone());
    Ok((config, screener))
}

/// Inline JSON when the argument looks like an object, otherwise a file path.
pub fn read_chain(arg: &str) -> Result<PredicateChain, ScreenerError> {
    if arg.trim_start().starts_with('{') {
        PredicateChain::from_json(arg)
    } else {
        PredicateChain::from_json(&fs::read_to_string(arg)?)
    }
}

fn find_preset(name: &str) -> Result<PredicateChain, ScreenerError> {
    chain::presets()?
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.chain)
        .ok_or_else(|| ScreenerError::InvalidChain {
            reason: format!("no preset named '{}'", name),
        })
}

fn run_chain(config_path: &Path, chain: Option<&str>, preset: Option<&str>) -> Result<(), ScreenerError> {
    let chain = match (chain, preset) {
        (Some(arg), _) => read_chain(arg)?,
        (None, Some(name)) => find_preset(name)?,
        (None, None) => {
            return Err(ScreenerError::InvalidChain {
                reason: "either --chain or --preset is required".to_string(),
            });
        }
    };
    let (_, screener) = load_screener(config_path)?;
    let response = screener.run_pipeline(&chain)?;
    eprintln!("{}", response.message);
    for symbol in &response.symbols {
        println!("{}", symbol);
    }
    Ok(())
}

fn run_strategies(config_path: &Path) -> Result<(), ScreenerError> {
    let (_, screener) = load_screener(config_path)?;
    let response = screener.strategies();
    eprintln!("{}", response.message);
    for name in &response.strategies {
        println!("{}", name);
    }
    Ok(())
}

fn run_universe(config_path: &Path) -> Result<(), ScreenerError> {
    let (config, screener) = load_screener(config_path)?;
    let universe = screener.universe();
    eprintln!(
        "{} symbols at {} in {}",
        universe.count(),
        config.base_interval,
        config.data_directory.display()
    );
    for symbol in universe.iter() {
        println!("{}", symbol);
    }
    Ok(())
}

fn run_patterns(
    config_path: &Path,
    symbol: &str,
    interval: &str,
    period: usize,
) -> Result<(), ScreenerError> {
    let (_, screener) = load_screener(config_path)?;
    let response = screener.pattern_occurrences(symbol, interval, period)?;
    eprintln!("{}", response.message);
    for occurrence in &response.patterns {
        println!("{}", occurrence);
    }
    Ok(())
}

fn run_downsample(config_path: &Path, from: &str, to: &str) -> Result<(), ScreenerError> {
    let (_, screener) = load_screener(config_path)?;
    let response = screener.write_downsampling(from, to)?;
    println!("{}", response.message);
    Ok(())
}

fn run_validate(chain: &str) -> Result<(), ScreenerError> {
    let chain = read_chain(chain)?;
    let library = PredicateLibrary::standard(Arc::new(PatternTaxonomy::standard()));
    chain.validate(&library)?;
    println!("Chain OK: {}", chain);
    Ok(())
}

fn run_serve(config_path: &Path) -> Result<(), ScreenerError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, serve};

        let (config, screener) = load_screener(config_path)?;
        eprintln!(
            "Serving {} symbols: REST on {}, RPC on {}",
            screener.universe().count(),
            config.rest_listen,
            config.rpc_listen
        );
        let state = AppState::new(screener);
        tokio::runtime::Runtime::new()?.block_on(serve(state, config.rest_listen, config.rpc_listen))
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        Err(ScreenerError::ConfigInvalid {
            section: "server".to_string(),
            key: "web".to_string(),
            reason: "the web feature is required for serve".to_string(),
        })
    }
}
