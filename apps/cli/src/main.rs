use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    is_accepted_upload, ActionStatus, ApiClient, AssessmentApi, AuthForm, AuthMode, Orchestrator,
    SessionStore, UploadFile, UploadForm, View, ACCEPTED_UPLOAD_EXTENSIONS,
};
use shared::{domain::AssessmentId, protocol::AssessmentMeta};
use storage::Storage;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, prepare_database_url, Settings};

/// Locale offered by the upload form when none is chosen.
const DEFAULT_LOCALE: &str = "en";

#[derive(Parser, Debug)]
#[command(name = "fh", about = "Financial health assessment client")]
struct Cli {
    /// Overrides `api_base_url` from fh.toml / FH__API_BASE_URL.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    /// Overrides `database_url` from fh.toml / FH__DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account, then sign in with it.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Status,
    List,
    /// Show one assessment; defaults to the most recent.
    Show {
        #[arg(long)]
        id: Option<i64>,
    },
    /// Upload financial data (.csv, .xlsx or .pdf) for a new assessment.
    Upload {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        business_name: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long, default_value = DEFAULT_LOCALE)]
        locale: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings()?;
    if let Some(api_base_url) = cli.api_base_url {
        settings.api_base_url = api_base_url;
    }
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }

    let orchestrator = start(&settings).await?;
    run(&orchestrator, &settings, cli.command).await
}

/// Opens the token store, builds the API client and restores any persisted
/// session (refreshing the list when one exists).
async fn start(settings: &Settings) -> Result<Arc<Orchestrator>> {
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open token store; verify the parent directory is writable"
        );
        error
    })?;

    let api: Arc<dyn AssessmentApi> = Arc::new(
        ApiClient::with_timeout(&settings.api_base_url, settings.request_timeout())
            .context("invalid api_base_url")?,
    );
    let session = SessionStore::new(Arc::new(storage), Arc::clone(&api))
        .with_key(settings.token_key.clone());

    let orchestrator = Orchestrator::new(api, session);
    orchestrator.startup().await;
    Ok(orchestrator)
}

async fn run(orchestrator: &Orchestrator, settings: &Settings, command: Command) -> Result<()> {
    match command {
        Command::Register {
            email,
            password,
            full_name,
        } => {
            let status = orchestrator
                .submit_auth(AuthForm {
                    email,
                    password,
                    full_name,
                    mode: AuthMode::Register,
                })
                .await;
            into_result(status)?;
            print_signed_in(orchestrator).await;
        }
        Command::Login { email, password } => {
            let status = orchestrator
                .submit_auth(AuthForm {
                    email,
                    password,
                    full_name: None,
                    mode: AuthMode::SignIn,
                })
                .await;
            into_result(status)?;
            print_signed_in(orchestrator).await;
        }
        Command::Logout => {
            orchestrator.logout().await;
            println!("Signed out.");
        }
        Command::Status => {
            let snapshot = orchestrator.snapshot().await;
            println!("{}", render::status(&snapshot, &settings.api_base_url));
        }
        Command::List => {
            require_session(orchestrator).await?;
            let snapshot = orchestrator.snapshot().await;
            print!(
                "{}",
                render::assessment_list(
                    &snapshot.assessments,
                    snapshot.selected.as_ref().map(|a| a.id)
                )
            );
        }
        Command::Show { id } => {
            require_session(orchestrator).await?;
            if let Some(id) = id {
                if !orchestrator.select(AssessmentId(id)).await {
                    bail!("no assessment with id {id}");
                }
            }
            match orchestrator.snapshot().await.selected {
                Some(selected) => print!("{}", render::assessment_detail(&selected)),
                None => println!("No assessments yet."),
            }
        }
        Command::Upload {
            file,
            business_name,
            industry,
            locale,
        } => {
            require_session(orchestrator).await?;
            let upload = UploadFile::read(&file).await?;
            if !is_accepted_upload(&upload.file_name) {
                warn!(
                    file = %upload.file_name,
                    accepted = ?ACCEPTED_UPLOAD_EXTENSIONS,
                    "file type is not one the service normally accepts"
                );
            }

            let meta = AssessmentMeta::from_form(
                business_name.as_deref().unwrap_or_default(),
                industry.as_deref().unwrap_or_default(),
                &locale,
            );
            let status = orchestrator
                .upload(UploadForm {
                    meta,
                    file: Some(upload),
                })
                .await;
            into_result(status)?;
            if let Some(created) = orchestrator.snapshot().await.selected {
                print!("{}", render::assessment_detail(&created));
            }
        }
    }
    Ok(())
}

fn into_result(status: ActionStatus) -> Result<()> {
    match status.error {
        Some(message) => Err(anyhow!(message)),
        None => Ok(()),
    }
}

async fn require_session(orchestrator: &Orchestrator) -> Result<()> {
    if orchestrator.view().await == View::Dashboard {
        Ok(())
    } else {
        bail!("not signed in; run `fh login` first")
    }
}

async fn print_signed_in(orchestrator: &Orchestrator) {
    let snapshot = orchestrator.snapshot().await;
    println!("Signed in.");
    print!(
        "{}",
        render::assessment_list(
            &snapshot.assessments,
            snapshot.selected.as_ref().map(|a| a.id)
        )
    );
}
