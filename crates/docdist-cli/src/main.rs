//! docdist: command-line sample for the document distribution gateway.
//!
//! Set DOCDIST_CLIENT_ID, DOCDIST_CLIENT_SECRET, DOCDIST_AUTHORIZATION_SCOPE and
//! DOCDIST_SUBSCRIPTION_ID (a `.env` file works too).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use docdist_cli::{document_name_for, init_tracing, report, AppConfiguration};
use docdist_client::{
    CitizenDocumentType, CitizenDocumentsClient, CompanyDocumentRequest, CompanyDocumentType,
    CompanyDocumentsClient, DocumentProviderConfigRequest, SendCitizenDocumentRequest,
    UploadFileParameters,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "docdist", about = "Document distribution gateway CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a citizen document in blocks and register it
    UploadCitizen {
        /// Path to the document
        file: PathBuf,
        /// Citizen CPR number
        #[arg(long)]
        cpr: String,
        /// Citizen document provider configuration UUID
        #[arg(long)]
        config_id: Uuid,
        /// Document name (defaults to the file name)
        #[arg(long)]
        document_name: Option<String>,
        /// CitizenDocument, DigitalPostCoverLetter or SnailMailCoverLetter
        #[arg(long, default_value = "CitizenDocument")]
        document_type: CitizenDocumentType,
        #[arg(long, default_value = "3")]
        retention_days: u32,
        /// Block size in bytes (defaults to the configured block size)
        #[arg(long)]
        block_size: Option<usize>,
    },
    /// Upload a company document in blocks and register it
    UploadCompany {
        /// Path to the document
        file: PathBuf,
        /// Company CVR number (repeat for several companies)
        #[arg(long = "cvr", required = true)]
        cvrs: Vec<String>,
        /// Document provider configuration UUID
        #[arg(long)]
        config_id: Uuid,
        /// Document name (defaults to the file name)
        #[arg(long)]
        document_name: Option<String>,
        /// Document, DigitalPostCoverLetter or SnailMailCoverLetter
        #[arg(long, default_value = "Document")]
        document_type: CompanyDocumentType,
        #[arg(long, default_value = "3")]
        retention_days: u32,
        #[arg(long, default_value = "LogicTestUser")]
        sender: String,
        #[arg(long, default_value = "This is test comment")]
        comment: String,
    },
    /// Provider configuration operations
    Configs {
        #[command(subcommand)]
        sub: ConfigCommands,
    },
    /// Distribute a previously uploaded citizen document
    Send {
        /// Uploaded citizen document UUID
        document_id: Uuid,
        #[arg(long)]
        cpr: String,
        #[arg(long, default_value = "test")]
        sending_system: String,
        #[arg(long, default_value = "alm brev")]
        document_type: String,
        #[arg(long, default_value = "test")]
        title: String,
        /// Provider configuration UUID
        #[arg(long)]
        config_id: Option<Uuid>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List provider configurations of the subscription
    List,
    /// Create a provider configuration
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "Create config")]
        app_title: String,
        #[arg(long, default_value = "test")]
        system_name: String,
        #[arg(long, default_value = "test")]
        page_header: String,
        #[arg(long, default_value = "footer")]
        footer: String,
        /// Digital post configuration UUID
        #[arg(long)]
        digital_post_config_id: Option<Uuid>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Cancel in-flight uploads on Ctrl-C so no block list gets committed.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling upload");
            trigger.cancel();
        }
    });
    cancel
}

async fn open_document(file: &Path) -> anyhow::Result<tokio::fs::File> {
    tokio::fs::File::open(file)
        .await
        .with_context(|| format!("Failed to open file: {}", file.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfiguration::from_env()?;
    let issuer = config.token_issuer();

    match cli.command {
        Commands::UploadCitizen {
            file,
            cpr,
            config_id,
            document_name,
            document_type,
            retention_days,
            block_size,
        } => {
            let client =
                CitizenDocumentsClient::with_owned_transport(&issuer, config.documents.clone())
                    .map_err(report)?;
            let document_name = document_name_for(&file, document_name)?;
            let parameters = UploadFileParameters::new(
                config_id,
                config.documents.subscription_id(),
                cpr,
                document_name,
                document_type,
            )
            .with_retention_period(retention_days)
            .with_buffer_size(block_size.unwrap_or(config.documents.block_size_bytes()));

            let document = open_document(&file).await?;
            let outcome = client
                .upload_file_cancellable(document, &parameters, cancel_on_ctrl_c())
                .await
                .map_err(report)?;
            print_json(&outcome)?;
        }
        Commands::UploadCompany {
            file,
            cvrs,
            config_id,
            document_name,
            document_type,
            retention_days,
            sender,
            comment,
        } => {
            let client =
                CompanyDocumentsClient::with_owned_transport(&issuer, config.documents.clone())
                    .map_err(report)?;
            let document_name = document_name_for(&file, document_name)?;
            let request =
                CompanyDocumentRequest::new(config_id, cvrs, document_name, document_type)
                    .with_retention_period(retention_days)
                    .with_sender(sender, comment);

            let document = open_document(&file).await?;
            let outcome = client
                .upload_company_file_cancellable(document, &request, cancel_on_ctrl_c())
                .await
                .map_err(report)?;
            print_json(&outcome)?;
        }
        Commands::Configs { sub } => {
            let client =
                CitizenDocumentsClient::with_owned_transport(&issuer, config.documents.clone())
                    .map_err(report)?;
            match sub {
                ConfigCommands::List => {
                    let configs = client.load_provider_configurations().await.map_err(report)?;
                    print_json(&configs)?;
                }
                ConfigCommands::Create {
                    name,
                    app_title,
                    system_name,
                    page_header,
                    footer,
                    digital_post_config_id,
                } => {
                    let request = DocumentProviderConfigRequest {
                        config_name: name,
                        app_title,
                        digital_post_configuration_id: digital_post_config_id,
                        system_name,
                        page_header,
                        footer,
                    };
                    let created = client
                        .create_provider_configuration(&request)
                        .await
                        .map_err(report)?;
                    print_json(&created)?;
                }
            }
        }
        Commands::Send {
            document_id,
            cpr,
            sending_system,
            document_type,
            title,
            config_id,
        } => {
            let client =
                CitizenDocumentsClient::with_owned_transport(&issuer, config.documents.clone())
                    .map_err(report)?;
            let request = SendCitizenDocumentRequest {
                citizen_document_id: document_id,
                cpr,
                sending_system,
                document_type,
                title,
                configuration_id: config_id,
            };
            let response = client.send_document(&request).await.map_err(report)?;
            print_json(&response)?;
        }
    }

    Ok(())
}
