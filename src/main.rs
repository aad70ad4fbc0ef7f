//! pagecast - Export chat replies to Notion

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pagecast::export::Exporter;
use pagecast::notion::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, NotionClient};
use pagecast::settings::{self, ENV_FILE, JsonFileStore, Resolver, Settings};
use pagecast::{ExportResult, Notice, Request};

#[derive(Parser)]
#[command(name = "pagecast")]
#[command(
    version,
    about = "Export the latest assistant reply of a chat page to Notion",
    long_about = None
)]
#[command(after_help = "EXAMPLES:
    pagecast export chat.html                  Upload the last reply
    pagecast blocks chat.html                  Print the export message
    pagecast blocks chat.html | pagecast handle
    pagecast configure -k secret_x -d 1a2b     Save credentials")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file with NOTION_API_KEY and NOTION_DATABASE_ID
    #[arg(long, value_name = "PATH", default_value = ENV_FILE, global = true)]
    env_file: PathBuf,

    /// Settings store (JSON); defaults to the config directory
    #[arg(long, value_name = "PATH", global = true)]
    store: Option<PathBuf>,

    /// Notion API base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE, global = true)]
    api_base: String,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the last assistant reply of a saved page and upload it
    Export {
        #[arg(value_name = "PAGE")]
        page: PathBuf,
    },
    /// Print the exportToNotion message for a saved page
    Blocks {
        #[arg(value_name = "PAGE")]
        page: PathBuf,
    },
    /// Answer one JSON message from stdin
    Handle,
    /// Save credentials to the settings store
    Configure {
        #[arg(short = 'k', long)]
        api_key: String,
        #[arg(short, long)]
        database_id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let outcome = match &cli.command {
        Command::Export { page } => export(&cli, page),
        Command::Blocks { page } => blocks(page),
        Command::Handle => handle(&cli),
        Command::Configure {
            api_key,
            database_id,
        } => configure(&cli, api_key, database_id),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `--verbose` and `--quiet` win over `RUST_LOG`.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn notify(cli: &Cli, notice: &Notice) {
    if notice.is_error || !cli.quiet {
        eprintln!("{notice}");
    }
}

fn store(cli: &Cli) -> JsonFileStore {
    match &cli.store {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::in_config_dir(),
    }
}

/// The store is only opened when the env file cannot supply both values.
fn exporter(cli: &Cli) -> Result<Exporter<Resolver<JsonFileStore>, NotionClient>, ExportResult> {
    let resolver = Resolver::new(Some(cli.env_file.clone()), store(cli));
    let client = NotionClient::new(&cli.api_base, cli.timeout)
        .map_err(|e| ExportResult::failure(e.to_string()))?;
    Ok(Exporter::new(resolver, client))
}

fn export(cli: &Cli, page: &Path) -> pagecast::Result<bool> {
    notify(cli, &Notice::sending());

    let extraction = match pagecast::read_page(page) {
        Ok(extraction) => extraction,
        Err(pagecast::Error::Locate(e)) => {
            notify(cli, &Notice::error(e.to_string()));
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    if extraction.is_empty() {
        notify(cli, &Notice::no_content());
        return Ok(true);
    }

    let result = match exporter(cli) {
        Ok(exporter) => exporter.export(&extraction.to_request()),
        Err(failure) => failure,
    };
    notify(cli, &result.notice());
    Ok(result.success)
}

fn blocks(page: &Path) -> pagecast::Result<bool> {
    let extraction = pagecast::read_page(page)?;
    let message = Request::ExportToNotion(extraction.to_request());
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(true)
}

fn handle(cli: &Cli) -> pagecast::Result<bool> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let result = match serde_json::from_str::<Request>(&input) {
        Ok(request) => match exporter(cli) {
            Ok(exporter) => exporter.handle(&request),
            Err(failure) => failure,
        },
        Err(e) => ExportResult::failure(format!("malformed message: {e}")),
    };
    println!("{}", serde_json::to_string(&result)?);
    Ok(result.success)
}

fn configure(cli: &Cli, api_key: &str, database_id: &str) -> pagecast::Result<bool> {
    let mut store = store(cli);
    settings::save(&mut store, &Settings::new(api_key, database_id))?;
    if let Some(path) = store.path() {
        notify(cli, &Notice::info(format!("Settings saved to {}", path.display())));
    }
    Ok(true)
}
