use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

use crate::archive;
use crate::document;
use crate::error::{Result, SubcheckError};
use crate::pacer::Sleeper;
use crate::policy::ExtractPolicy;
use crate::requirements::RequirementsTable;
use crate::scanner::{MatchRecord, Scanner};
use crate::search::{SearchClient, SearchConfig};
use crate::validate::{ValidationResult, validate};
use crate::workspace::Workspace;

const DEFAULT_ARCHIVE_NAME: &str = "submission.zip";

/// Everything one submission run needs, borrowed from the long-lived service state.
pub struct SubmissionContext<'a> {
    pub table: &'a RequirementsTable,
    pub workspace: &'a Workspace,
    pub policy: &'a ExtractPolicy,
    pub search: &'a SearchConfig,
    pub client: &'a dyn SearchClient,
    pub sleeper: &'a dyn Sleeper,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub matches: Vec<MatchRecord>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubmissionReport {
    pub request_id: Uuid,
    pub domain: String,
    pub validation: Option<ValidationResult>,
    pub validation_error: Option<String>,
    /// Files with at least one match, in submission order.
    pub plagiarism_report: Vec<FileReport>,
    /// User-visible problems from the scanning phase.
    pub notices: Vec<String>,
    /// Documents that were actually sent through the scanner.
    pub scanned_files: Vec<String>,
    pub generated_at: String,
}

pub fn process(
    ctx: &SubmissionContext<'_>,
    request_id: Uuid,
    archive_name: &str,
    archive_bytes: &[u8],
    domain: &str,
) -> Result<SubmissionReport> {
    let scope = ctx.workspace.begin()?;

    let zip_path = scope.upload_dir().join(archive_file_name(archive_name));
    fs::write(&zip_path, archive_bytes)?;

    let submitted = archive::extract(archive_bytes, scope.extract_dir(), ctx.policy)?;
    tracing::info!(files = submitted.len(), "archive extracted");

    let (validation, validation_error) = match validate(ctx.table, domain, &submitted) {
        Ok(v) => (Some(v), None),
        Err(e @ SubcheckError::UnknownDomain(_)) => (None, Some(e.to_string())),
        Err(e) => return Err(e),
    };

    // Rayon workers do not inherit the caller's span.
    let span = tracing::Span::current();
    let documents: Vec<(String, Vec<String>)> = submitted
        .par_iter()
        .filter(|name| document::is_scannable(name))
        .map(|name| {
            let _entered = span.enter();
            let chunks = document::extract_chunks(&scope.extract_dir().join(name));
            (name.clone(), chunks)
        })
        .collect();

    let scanner = Scanner::new(ctx.search, ctx.client, ctx.sleeper);
    let mut plagiarism_report = Vec::new();
    let mut notices = Vec::new();
    let mut scanned_files = Vec::new();

    for (filename, chunks) in documents {
        tracing::info!(file = %filename, chunks = chunks.len(), "scanning document");
        match scanner.scan(&chunks) {
            Ok(outcome) => {
                scanned_files.push(filename.clone());
                let quota = outcome.quota_exceeded();
                let matches = outcome.into_matches();
                if !matches.is_empty() {
                    plagiarism_report.push(FileReport { filename, matches });
                }
                if quota {
                    notices.push(SubcheckError::SearchQuotaExceeded.to_string());
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("scan skipped: {e}");
                notices.push(e.to_string());
                break;
            }
        }
    }

    Ok(SubmissionReport {
        request_id,
        domain: domain.to_string(),
        validation,
        validation_error,
        plagiarism_report,
        notices,
        scanned_files,
        generated_at: timestamp(),
    })
}

fn archive_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_ARCHIVE_NAME)
        .to_string()
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_default()
}
