//! SIAP CLI - role-gated field operations records
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SIAP_*`)
//! 3. Project config (`.siap/config.toml` in the project root)
//! 4. Global config (`~/.siap/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `SIAP_DEBUG`, `SIAP_VERBOSE`: output switches (`true`/`false`)
//! - `SIAP_DATA_DIR`, `SIAP_BLOB_DIR`, `SIAP_ACCOUNTS_FILE`: collaborator storage
//! - `SIAP_SESSION_FILE`: cached session location
//! - `SIAP_ROLE_MATCH`: `exact` or `ignore_case`
//! - `SIAP_APP_ID`: record namespace
//!
//! # Exit Status
//!
//! - `0` success
//! - `1` any other failure
//! - `2` no session; `redirect: /` is printed
//! - `3` the signed-in role lacks the capability

mod commands;
mod log_file;

use anyhow::Result;
use clap::Parser;
use commands::Command;
use log_file::LogFile;
use siap_app::{
    AppError, ConfigError, ConfigLoader, ConfigResolver, Notice, RoleMatch, Route, SiapApp,
    SiapConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// SIAP CLI - role-gated field operations records
#[derive(Parser, Debug)]
#[command(name = "siap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Document store directory (also: SIAP_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Session file (also: SIAP_SESSION_FILE)
    #[arg(long, global = true, value_name = "FILE")]
    session_file: Option<PathBuf>,

    /// Role comparison for mutation checks: exact or ignore_case
    #[arg(long, global = true, value_name = "MODE", value_parser = parse_role_match)]
    role_match: Option<RoleMatch>,

    /// Override log file directory path
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Override file log level (default: debug)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn parse_role_match(s: &str) -> Result<RoleMatch, String> {
    RoleMatch::parse(s).ok_or_else(|| format!("expected exact or ignore_case, got '{s}'"))
}

/// CLI-based configuration resolver.
///
/// Merges file/env config via [`ConfigLoader`] and applies CLI argument
/// overrides as the highest-priority layer.
struct CliConfigResolver {
    project_root: PathBuf,
    debug: bool,
    verbose: bool,
    data_dir: Option<PathBuf>,
    session_file: Option<PathBuf>,
    role_match: Option<RoleMatch>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to get current directory, using '.'");
                PathBuf::from(".")
            })
        });

        Self {
            project_root,
            debug: args.debug,
            verbose: args.verbose,
            data_dir: args.data_dir.clone(),
            session_file: args.session_file.clone(),
            role_match: args.role_match,
            log_file: args.log_file.clone(),
            log_level: args.log_level.clone(),
        }
    }
}

impl ConfigResolver for CliConfigResolver {
    fn resolve(&self) -> Result<SiapConfig, ConfigError> {
        let mut config = ConfigLoader::new()
            .with_project_root(&self.project_root)
            .load()?;

        if self.debug {
            config.debug = true;
        }
        if self.verbose {
            config.ui.verbose = true;
        }
        if let Some(ref p) = self.data_dir {
            config.backend.data_dir = Some(p.clone());
        }
        if let Some(ref p) = self.session_file {
            config.paths.session_file = Some(p.clone());
        }
        if let Some(mode) = self.role_match {
            config.auth.role_match = mode;
        }
        if let Some(ref p) = self.log_file {
            config.logging.file = true;
            config.logging.file_path = Some(p.clone());
        }
        if let Some(ref level) = self.log_level {
            config.logging.file_level.clone_from(level);
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);

    // Resolved early for the logging settings; the builder resolves again.
    let resolved_config = resolver
        .resolve()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    init_tracing(&args, &resolved_config);

    info!(path = %resolver.project_root.display(), "Project root");

    let app = SiapApp::builder(resolver).build()?;
    info!(
        "Application initialized (debug={}, verbose={})",
        app.config().debug,
        app.config().ui.verbose
    );

    let exit_code = match commands::execute(&app, args.command).await {
        Ok(()) => 0,
        Err(e) => report(&e),
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

/// Terminal filter: --debug > --verbose > RUST_LOG > "warn".
/// File filter: `logging.file_level`, independent of the terminal.
fn init_tracing(args: &Args, config: &SiapConfig) {
    let terminal_filter = if args.debug || config.debug {
        EnvFilter::new("debug,tokio=warn")
    } else if args.verbose || config.ui.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let terminal_layer = fmt::layer()
        .with_target(false)
        .with_ansi(config.ui.color)
        .with_writer(std::io::stderr);

    let log_file = if config.logging.file {
        LogFile::open(&config.logging.resolved_file_path())
    } else {
        None
    };

    if let Some(file) = log_file {
        let path = file.path().to_path_buf();
        let file_filter = EnvFilter::new(config.logging.file_filter_directive());
        let file_layer = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(file);

        tracing_subscriber::registry()
            .with(terminal_layer.with_filter(terminal_filter))
            .with(file_layer.with_filter(file_filter))
            .init();

        info!(
            path = %path.display(),
            level = %config.logging.file_level,
            "File logging enabled"
        );
    } else {
        tracing_subscriber::registry()
            .with(terminal_layer.with_filter(terminal_filter))
            .init();
    }
}

/// Prints a failed command's result and picks the exit status.
fn report(err: &AppError) -> i32 {
    if err.is_redirect() {
        println!("redirect: {}", Route::Entry);
        return 2;
    }

    match err {
        AppError::Record(record_err) => {
            eprintln!("{}", Notice::from(record_err));
            if let Some(route) = record_err.navigation() {
                println!("navigate: {route}");
            }
        }
        other => eprintln!("Error: {other}"),
    }
    exit_code(err)
}

fn exit_code(err: &AppError) -> i32 {
    if err.is_redirect() {
        2
    } else if err.is_denied() {
        3
    } else {
        1
    }
}
