#![forbid(unsafe_code)]

mod cmd;
mod output;

use bugtrack_cli::config::{SERVER_ENV, load_client_config, resolve_server_url};
use bugtrack_cli::{ApiClient, BugBoard, ClientError};
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bugs: command-line client for the bugtrack API",
    long_about = None
)]
struct Cli {
    /// API base URL (overrides BUGTRACK_URL and the user config file).
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "List bugs",
        long_about = "List every bug, newest first.",
        after_help = "EXAMPLES:\n    bugs list\n    bugs list --status open\n    bugs list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        about = "Report a new bug",
        long_about = "Validate the fields locally, then create the bug on the server.",
        after_help = "EXAMPLES:\n    bugs create --title \"Crash on submit\" --reporter \"QA Tester\" --priority high --tags \"ui, regression\""
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        about = "Change a bug's status",
        after_help = "EXAMPLES:\n    bugs status 3f2a9c resolved\n    bugs status 3f2a9c in-progress --json"
    )]
    Status(cmd::status::StatusArgs),

    #[command(about = "Delete a bug")]
    Delete(cmd::delete::DeleteArgs),

    #[command(about = "Check that the server is up")]
    Health,

    #[command(about = "Generate shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BUGTRACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "bugtrack=debug,info"
        } else {
            "bugtrack=warn,error"
        })
    });

    let format = env::var("BUGTRACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let user_config = load_client_config()?;
    let env_server = env::var(SERVER_ENV).ok();
    let server = resolve_server_url(cli.server.as_deref(), env_server.as_deref(), &user_config);
    debug!(%server, "resolved api server");

    let client = ApiClient::new(&server);
    if matches!(cli.command, Commands::Health) {
        return cmd::health::run_health(&client, output);
    }

    let mut board = BugBoard::new(client);
    match &cli.command {
        Commands::List(args) => cmd::list::run_list(args, &mut board, output),
        Commands::Create(args) => cmd::create::run_create(args, &mut board, output),
        Commands::Status(args) => cmd::status::run_status(args, &mut board, output),
        Commands::Delete(args) => cmd::delete::run_delete(args, &mut board, output),
        Commands::Health | Commands::Completions(_) => Ok(()),
    }
}

fn to_cli_error(err: &anyhow::Error) -> CliError {
    match err.downcast_ref::<ClientError>() {
        Some(client_err) => CliError {
            message: client_err.to_string(),
            status: client_err.status(),
            details: client_err.details().cloned(),
        },
        None => CliError::new(format!("{err:#}")),
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();

    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if output::render_error(output, &to_cli_error(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
