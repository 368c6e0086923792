use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use docsum::{
    api,
    config::{self, Config},
    logging,
    preferences::JsonFileStore,
    session::{PreferenceUpdate, SessionController, SummaryOverrides},
    summarization::{HttpSummaryClient, LengthClass, ProviderId},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "docsum",
    version,
    about = "Summarize PDF and DOCX documents with OpenAI or Gemini"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default).
    Serve {
        /// Port to bind; overrides SERVER_PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Summarize one document and print the summary.
    Summarize {
        /// PDF or DOCX file to summarize.
        file: PathBuf,
        /// Provider for this run only.
        #[arg(long, value_parser = parse_provider)]
        provider: Option<ProviderId>,
        /// Summary length for this run only.
        #[arg(long, value_parser = parse_length)]
        length: Option<LengthClass>,
        /// API key for this run only.
        #[arg(long, env = "DOCSUM_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Also write the summary to `<name>_summary.txt`.
        #[arg(long)]
        download: bool,
        /// Directory for the downloaded summary; overrides DOCSUM_OUTPUT_DIR.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Show or change stored preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print stored preferences (the API key is shown as set/unset).
    Show,
    /// Update one or more stored preferences.
    Set {
        /// Provider used for summaries (openai or gemini).
        #[arg(long, value_parser = parse_provider)]
        provider: Option<ProviderId>,
        /// API key for the provider.
        #[arg(long)]
        api_key: Option<String>,
        /// Summary length (short, medium, or long).
        #[arg(long, value_parser = parse_length)]
        length: Option<LengthClass>,
    },
}

fn parse_provider(value: &str) -> Result<ProviderId, String> {
    value
        .parse()
        .map_err(|()| format!("unknown provider '{value}' (expected openai or gemini)"))
}

fn parse_length(value: &str) -> Result<LengthClass, String> {
    value
        .parse()
        .map_err(|()| format!("unknown length '{value}' (expected short, medium, or long)"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve { port: None });
    let serving = matches!(command, Command::Serve { .. });
    logging::init_tracing(!serving);
    let config = config::init_config().context("failed to load configuration")?;
    let controller = Arc::new(build_controller(config)?);

    match command {
        Command::Serve { port } => serve(controller, port.or(config.server_port)).await,
        Command::Summarize {
            file,
            provider,
            length,
            api_key,
            download,
            output_dir,
        } => {
            controller
                .select_path(&file)
                .await
                .with_context(|| format!("failed to load {}", file.display()))?;
            let summary = controller
                .summarize_with(SummaryOverrides {
                    provider,
                    length,
                    api_key,
                })
                .await?;
            println!("{summary}");

            if download {
                let target = output_dir.unwrap_or_else(|| config.output_dir.clone());
                let saved = controller
                    .download()
                    .await
                    .ok_or_else(|| anyhow!("no summary available to download"))?;
                let path = target.join(&saved.file_name);
                tokio::fs::create_dir_all(&target)
                    .await
                    .with_context(|| format!("failed to create {}", target.display()))?;
                tokio::fs::write(&path, saved.contents)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Summary saved to {}", path.display());
            }
            Ok(())
        }
        Command::Prefs { action } => match action {
            PrefsAction::Show => {
                let view = controller.preferences().await;
                println!("{}", serde_json::to_string_pretty(&view)?);
                Ok(())
            }
            PrefsAction::Set {
                provider,
                api_key,
                length,
            } => {
                let view = controller
                    .update_preferences(PreferenceUpdate {
                        provider: provider.map(|p| p.as_str().to_string()),
                        api_key,
                        length: length.map(|l| l.as_str().to_string()),
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&view)?);
                Ok(())
            }
        },
    }
}

fn build_controller(config: &Config) -> Result<SessionController> {
    let summarizer =
        HttpSummaryClient::new(config).context("failed to construct HTTP client")?;
    let store = JsonFileStore::new(config.preferences_path.clone());
    SessionController::new(Box::new(store), Arc::new(summarizer))
        .context("failed to load preferences")
}

async fn serve(controller: Arc<SessionController>, port: Option<u16>) -> Result<()> {
    let app = api::create_router(controller);
    let (listener, port) = bind_listener(port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn bind_listener(port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4300..=4399;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4300-4399",
    ))
}
