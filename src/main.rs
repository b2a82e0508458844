use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a job kind from string
fn parse_job_kind(s: &str) -> Result<jobwatch::JobKind, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid job kind '{}'. Valid values: evaluation_batch, workflow_execution, debate_session",
            s
        )
    })
}

#[derive(Parser)]
#[command(name = "jobwatch")]
#[command(
    version,
    about = "Submit and track long-running orchestration jobs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new job to the backend
    Submit {
        #[arg(value_parser = parse_job_kind, help = "Job kind: evaluation_batch, workflow_execution, debate_session")]
        kind: jobwatch::JobKind,
        #[arg(long, short, help = "Job parameters as a JSON object")]
        params: Option<String>,
        #[arg(long, short, help = "Stay attached and stream status until the job finishes")]
        watch: bool,
        #[arg(long, help = "Poll interval in milliseconds")]
        interval: Option<u64>,
        #[arg(long, help = "Maximum poll attempts before giving up")]
        max_attempts: Option<u32>,
        #[arg(long, help = "Maximum total watch time in seconds")]
        max_elapsed: Option<u64>,
    },

    /// Watch an existing job until it reaches a terminal state
    Watch {
        #[arg(help = "Job identifier to watch")]
        job_id: String,
        #[arg(long, help = "Poll interval in milliseconds")]
        interval: Option<u64>,
        #[arg(long, help = "Maximum poll attempts before giving up")]
        max_attempts: Option<u32>,
        #[arg(long, help = "Maximum total watch time in seconds")]
        max_elapsed: Option<u64>,
    },

    /// Fetch the current status of a job once
    Status {
        #[arg(help = "Job identifier to query")]
        job_id: String,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Ask the backend to stop a job
    Cancel {
        #[arg(help = "Job identifier to cancel")]
        job_id: String,
    },

    /// Check backend reachability and circuit breaker state
    Health,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Edit configuration file with $EDITOR
    Edit {
        #[arg(long, short, help = "Edit global config")]
        global: bool,
    },
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
        #[arg(long, help = "Backend endpoint to write into the project config")]
        endpoint: Option<String>,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        // Extract panic message
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mJobWatch encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!("\n\x1b[33mPlease report this issue at:\x1b[0m");
        eprintln!("  https://github.com/jobwatch/jobwatch/issues");
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    // Install panic handler first
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Submit {
            kind,
            params,
            watch,
            interval,
            max_attempts,
            max_elapsed,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(jobwatch::cli::commands::submit::run(
                kind,
                params.as_deref(),
                watch,
                interval,
                max_attempts,
                max_elapsed,
            ))?;
        }
        Commands::Watch {
            job_id,
            interval,
            max_attempts,
            max_elapsed,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(jobwatch::cli::commands::watch::run(
                &job_id,
                interval,
                max_attempts,
                max_elapsed,
            ))?;
        }
        Commands::Status { job_id, format } => {
            let rt = Runtime::new()?;
            rt.block_on(jobwatch::cli::commands::status::run(&job_id, &format))?;
        }
        Commands::Cancel { job_id } => {
            let rt = Runtime::new()?;
            rt.block_on(jobwatch::cli::commands::cancel::run(&job_id))?;
        }
        Commands::Health => {
            let rt = Runtime::new()?;
            rt.block_on(jobwatch::cli::commands::health::run())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                jobwatch::cli::commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                jobwatch::cli::commands::config::path()?;
            }
            ConfigAction::Edit { global } => {
                jobwatch::cli::commands::config::edit(global)?;
            }
            ConfigAction::Init {
                global,
                force,
                endpoint,
            } => {
                if global {
                    jobwatch::cli::commands::config::init_global(force)?;
                } else {
                    jobwatch::cli::commands::config::init_project(endpoint.as_deref())?;
                }
            }
        },
    }

    Ok(())
}
