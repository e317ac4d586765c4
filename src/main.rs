//! alterego CLI entry point

use alterego::{
    app::App,
    chat::Mode,
    commands::{
        cmd_analyze, cmd_ask, cmd_autopsy_generate, cmd_autopsy_latest_job, cmd_autopsy_show,
        cmd_init, cmd_job, cmd_status, cmd_upload, cmd_voice, print_autopsy_report,
        print_chat_reply, print_init_summary, print_job_report, print_status,
        print_upload_summary, print_voice_reply,
    },
    config::{Config, LoggingConfig},
    error::{Error, Result},
    mcp::McpServer,
    progress::LogWriterFactory,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "alterego")]
#[command(version, about = "Build an AI twin from your watch history and talk to it", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize alterego configuration and database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Upload a watch-history export (.zip), replacing all stored data
    Upload {
        /// Path to the export archive
        path: PathBuf,
    },

    /// Run the analysis pipeline over the stored posts
    Analyze,

    /// Show an analysis job and its results
    Job {
        /// Job ID (defaults to the latest job)
        job_id: Option<String>,
    },

    /// Ask your twin a question
    Ask {
        /// The question or statement
        question: String,

        /// Analysis job to answer from (defaults to the latest job)
        #[arg(long = "job")]
        job_id: Option<String>,

        /// Conversational stance: mirror or devil
        #[arg(short, long, default_value = "mirror")]
        mode: String,
    },

    /// Ask your twin with a recorded audio question
    Voice {
        /// Path to the audio file
        audio: PathBuf,

        /// Analysis job to answer from (defaults to the latest job)
        #[arg(long = "job")]
        job_id: Option<String>,

        /// Conversational stance: mirror or devil
        #[arg(short, long, default_value = "mirror")]
        mode: String,
    },

    /// Psychological autopsy reports
    Autopsy {
        #[command(subcommand)]
        action: AutopsyAction,
    },

    /// Show system status
    Status,

    /// Start the JSON-RPC server on stdio
    Serve,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum AutopsyAction {
    /// Generate a new report
    Generate {
        /// Job ID (defaults to the latest job)
        #[arg(long = "job")]
        job_id: Option<String>,
    },

    /// Show the stored report
    Show {
        /// Job ID (defaults to the latest job)
        #[arg(long = "job")]
        job_id: Option<String>,
    },

    /// Print the ID of the latest analysis job
    Latest,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool, json_logs: bool) {
    let level = logging.filter_directive(verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(fmt::layer().json().with_writer(LogWriterFactory::default()))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(LogWriterFactory::default()))
            .init();
    }
}

fn emit<T: Serialize>(json: bool, value: &T, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => None,
        _ => Some(load_config(cli.config.as_deref())),
    };
    let logging = match &config {
        Some(Ok(config)) => config.logging.clone(),
        _ => LoggingConfig::from_env(),
    };
    init_logging(&logging, cli.verbose, cli.json_logs);

    match &cli.command {
        Commands::Init { force } => {
            let base_dir = init_base_dir(cli.config.as_deref());
            let summary = cmd_init(Some(base_dir), *force).await?;
            return emit(cli.json, &summary, print_init_summary);
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "alterego", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = match config {
        Some(config) => config?,
        None => unreachable!(),
    };
    let app = App::connect(config).await?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Upload { path } => {
            let summary = cmd_upload(&app, &path).await?;
            emit(cli.json, &summary, print_upload_summary)?;
        }

        Commands::Analyze => {
            let report = cmd_analyze(app.clone()).await?;
            emit(cli.json, &report, print_job_report)?;
        }

        Commands::Job { job_id } => {
            let report = cmd_job(&app, job_id.as_deref()).await?;
            emit(cli.json, &report, print_job_report)?;
        }

        Commands::Ask {
            question,
            job_id,
            mode,
        } => {
            let mode = Mode::parse_lenient(&mode);
            let reply = cmd_ask(&app, &question, job_id.as_deref(), mode).await?;
            emit(cli.json, &reply, |r| print_chat_reply(r, mode))?;
        }

        Commands::Voice {
            audio,
            job_id,
            mode,
        } => {
            let mode = Mode::parse_lenient(&mode);
            let reply = cmd_voice(&app, &audio, job_id.as_deref(), mode).await?;
            emit(cli.json, &reply, |r| print_voice_reply(r, mode))?;
        }

        Commands::Autopsy { action } => match action {
            AutopsyAction::Generate { job_id } => {
                let report = cmd_autopsy_generate(&app, job_id.as_deref()).await?;
                emit(cli.json, &report, print_autopsy_report)?;
            }
            AutopsyAction::Show { job_id } => {
                let report = cmd_autopsy_show(&app, job_id.as_deref()).await?;
                emit(cli.json, &report, print_autopsy_report)?;
            }
            AutopsyAction::Latest => {
                let job_id = cmd_autopsy_latest_job(&app).await?;
                if cli.json {
                    println!("{}", serde_json::json!({ "job_id": job_id }));
                } else {
                    println!("{}", job_id);
                }
            }
        },

        Commands::Status => {
            let status = cmd_status(&app).await?;
            emit(cli.json, &status, print_status)?;
        }

        Commands::Serve => {
            McpServer::new(app).run().await?;
        }
    }

    Ok(())
}

/// Base directory for `init`: the parent of a given `.toml` path, a given
/// directory, or the default
fn init_base_dir(config: Option<&Path>) -> PathBuf {
    match config {
        Some(path) if path.extension().is_some_and(|e| e == "toml") => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir),
        Some(dir) => dir.to_path_buf(),
        None => Config::default_base_dir(),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        return Err(Error::NotInitialized);
    }

    Config::load(&config_path)
}
