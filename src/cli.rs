//! Command line surface of the analysis service.
//!
//! Every command prints one JSON document on stdout. Failures carry the
//! client-facing message only.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

use br_app::{AnalysisOrchestrator, ServiceError};
use br_core::ids::{AnalysisId, UserId};
use br_core::storage::ObjectKey;

#[derive(Debug, Parser)]
#[command(name = "beauty-rating")]
#[command(about = "Score portrait photos and share the results", long_about = None)]
pub struct Cli {
    /// Config file; defaults to `<data dir>/config.toml` when it exists
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the database, uploaded images and logs
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Upload an image and score it
    Analyze {
        file: PathBuf,
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
    /// List a user's analyses, newest first
    List {
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
    /// List a user's favorite analyses, newest first
    Favorites {
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
    Favorite {
        id: i64,
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
    Unfavorite {
        id: i64,
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
    Delete {
        id: i64,
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
    /// Issue a 24h share link for an analysis
    Share {
        id: i64,
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
    /// Open a shared analysis from its token query string
    Resolve { token: String },
    /// Copy a stored analysis image to a local file
    Image {
        key: String,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(short, long, allow_negative_numbers = true)]
        user: i64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn io_error(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> CommandError {
    let context = context.into();
    move |source| CommandError::Io { context, source }
}

/// Run one command against the orchestrator and return its JSON output.
#[tracing::instrument(name = "cli.execute", skip(orchestrator))]
pub async fn execute(
    orchestrator: &AnalysisOrchestrator,
    command: Commands,
) -> Result<Value, CommandError> {
    let output = match command {
        Commands::Analyze { file, user } => {
            let image = tokio::fs::read(&file)
                .await
                .map_err(io_error(format!("failed to read {}", file.display())))?;
            let view = orchestrator
                .analyze(UserId::new(user), &upload_name(&file), Bytes::from(image))
                .await?;
            serde_json::to_value(view)?
        }
        Commands::List { user } => serde_json::to_value(orchestrator.list(UserId::new(user)).await?)?,
        Commands::Favorites { user } => {
            serde_json::to_value(orchestrator.favorites(UserId::new(user)).await?)?
        }
        Commands::Favorite { id, user } => {
            orchestrator.favorite(UserId::new(user), AnalysisId::new(id)).await?;
            json!({ "id": id, "isFavorite": true })
        }
        Commands::Unfavorite { id, user } => {
            orchestrator.unfavorite(UserId::new(user), AnalysisId::new(id)).await?;
            json!({ "id": id, "isFavorite": false })
        }
        Commands::Delete { id, user } => {
            orchestrator.delete(UserId::new(user), AnalysisId::new(id)).await?;
            json!({ "id": id, "deleted": true })
        }
        Commands::Share { id, user } => {
            let token = orchestrator.share(UserId::new(user), AnalysisId::new(id)).await?;
            let mut value = serde_json::to_value(&token)?;
            value["token"] = Value::String(token.to_string());
            value
        }
        Commands::Resolve { token } => serde_json::to_value(orchestrator.resolve_share(&token).await?)?,
        Commands::Image { key, out, user } => {
            let bytes =
                copy_image(orchestrator, UserId::new(user), &ObjectKey::new(key.clone()), &out)
                    .await?;
            json!({ "key": key, "bytes": bytes, "out": out.display().to_string() })
        }
    };

    Ok(output)
}

/// Only the final path component reaches the object store.
fn upload_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn copy_image(
    orchestrator: &AnalysisOrchestrator,
    user_id: UserId,
    key: &ObjectKey,
    out: &Path,
) -> Result<u64, CommandError> {
    let mut file = tokio::fs::File::create(out)
        .await
        .map_err(io_error(format!("failed to create {}", out.display())))?;

    let written = match orchestrator.image(user_id, key, &mut file).await {
        Ok(written) => written,
        Err(err) => {
            drop(file);
            let _ = tokio::fs::remove_file(out).await;
            return Err(err.into());
        }
    };

    file.flush()
        .await
        .map_err(io_error(format!("failed to write {}", out.display())))?;
    Ok(written)
}
