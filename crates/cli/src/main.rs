//! CLI entry point for the MAC build-flag injector
//!
//! Prints build flags on stdout, so it can be wired into PlatformIO with
//! `build_flags = !load-env`. Diagnostics go to stderr.

use clap::Parser;
use mac_flag_injector::config::ConfigError;
use mac_flag_injector::{
    open_sink, render_template, run, BuildFlag, BuildFlagSink, FlagFormat, LoaderConfig,
    DEFAULT_SETTINGS_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Inject device MAC addresses from a .env file as firmware build flags
#[derive(Parser, Debug)]
#[command(name = "load-env")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (TOML); defaults to load-env.toml when present
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Env file holding the MAC addresses
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    /// Template suggested when the env file is missing
    #[arg(long)]
    template: Option<PathBuf>,

    /// Output format: platformio, plain or json
    #[arg(short, long)]
    format: Option<FlagFormat>,

    /// Write flags to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validate only; do not emit any flags
    #[arg(long)]
    check: bool,

    /// Print an env template for the required keys and exit
    #[arg(long)]
    print_template: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_settings(args: &Args) -> Result<LoaderConfig, ConfigError> {
    let mut config = match &args.settings {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::load_or_default(DEFAULT_SETTINGS_FILE)?,
    };

    if let Some(path) = &args.env_file {
        config.env.path = path.clone();
    }
    if let Some(path) = &args.template {
        config.env.template = path.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(path) = &args.output {
        config.output.path = Some(path.clone());
    }

    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match load_settings(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "Resolved settings");

    if args.print_template {
        print!("{}", render_template(&config.devices.required_keys));
        return ExitCode::SUCCESS;
    }

    let mut sink: Box<dyn BuildFlagSink> = if args.check {
        Box::new(Vec::<BuildFlag>::new())
    } else {
        open_sink(config.output.format, config.output.path.as_deref())
    };

    match run(&config, sink.as_mut()) {
        Ok(summary) => {
            eprintln!("{}", summary.confirmation());
            if args.check {
                eprintln!("Check passed; no build flags emitted");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.diagnostic());
            ExitCode::FAILURE
        }
    }
}
