use std::path::{Path, PathBuf};

use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    convert::{convert, ConversionResult, ConvertError},
    utils::parallel_future,
};

#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("conversion task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// A file that could not be converted.
#[derive(Debug, Error)]
#[error("{file_name}: {reason}")]
pub struct FileFailure {
    pub file_name: String,

    #[source]
    pub reason: FailureReason,
}

/// Outcome of converting many files, in completion order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub successes: Vec<ConversionResult>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// All magnet links, one per line.
    pub fn links(&self) -> String {
        self.successes
            .iter()
            .map(ConversionResult::magnet_uri)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Value {
        let errors = self
            .failures
            .iter()
            .map(|f| json!({"file": f.file_name, "error": f.reason.to_string()}))
            .collect::<Vec<_>>();
        json!({
            "results": self.successes,
            "errors": errors,
        })
    }
}

/// Name shown for `path` in results and errors.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn convert_path(path: &Path, file_name: String) -> Result<ConversionResult, FailureReason> {
    let data = tokio::fs::read(path).await?;
    let result = tokio::task::spawn_blocking(move || convert(&data, Some(&file_name))).await??;
    Ok(result)
}

/// Read and convert a single torrent file.
pub async fn convert_file(path: impl AsRef<Path>) -> Result<ConversionResult, FileFailure> {
    let path = path.as_ref();
    let file_name = file_label(path);
    debug!(file = %file_name, "converting");

    convert_path(path, file_name.clone())
        .await
        .map_err(|reason| FileFailure { file_name, reason })
}

/// Convert every file with at most `jobs` of them in flight.
///
/// A failing file is recorded in the report and does not stop the others.
pub async fn convert_files<I, P>(paths: I, jobs: usize) -> BatchReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let paths = paths
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect::<Vec<PathBuf>>();
    debug!("converting {} files, jobs={}", paths.len(), jobs);

    let outcomes = parallel_future(paths, jobs, convert_file).await;

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(result) => report.successes.push(result),
            Err(failure) => {
                warn!("failed to convert {}", failure);
                report.failures.push(failure);
            }
        }
    }
    report
}
