// coresync CLI - drill-core table validation and web-file publishing

mod exit_codes;
mod upload;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "coresync")]
#[command(about = "Reconcile drill-core tables and publish drill-core web files")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the primary table against the secondary table and save the result
    #[command(after_help = "\
Examples:
  coresync validate
  coresync validate --config coresync.toml
  coresync validate --primary ddh.csv --secondary iet.csv --output ddh_updated.csv
  coresync validate --json > report.json")]
    Validate {
        /// TOML config file (every field optional)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Primary table, mutated and saved to --output
        #[arg(long)]
        primary: Option<PathBuf>,

        /// Secondary table, read-only source of corrections
        #[arg(long)]
        secondary: Option<PathBuf>,

        /// Where to save the reconciled primary table
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the run report as JSON instead of the human summary
        #[arg(long)]
        json: bool,
    },

    /// Publish local files to the drill-core object store
    #[command(subcommand)]
    Upload(upload::UploadCommands),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nrecon:   coresync-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Validate {
            config,
            primary,
            secondary,
            output,
            json,
        } => validate::cmd_validate(validate::ValidateOptions {
            config,
            primary,
            secondary,
            output,
            json,
        }),
        Commands::Upload(cmd) => upload::cmd_upload(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<coresync_store::StoreError> for CliError {
    fn from(err: coresync_store::StoreError) -> Self {
        let code = exit_codes::store_exit_code(&err);
        let hint = match &err {
            coresync_store::StoreError::Credentials { .. } => {
                Some("the file must hold one line: access_key, secret_key".to_string())
            }
            coresync_store::StoreError::Http { status: 403, .. } => {
                Some("check the credentials and the bucket policy".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
