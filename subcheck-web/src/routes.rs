use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::Html;
use subcheck_core::{SubcheckError, SubmissionContext, SubmissionReport, process};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::SharedState;

const FIELD_ARCHIVE: &str = "zip_file";
const FIELD_DOMAIN: &str = "domain";

/// Form fields of one upload.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub domain: String,
}

pub async fn index(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    state.workspace.purge_stale();
    let html = state.templates.index(state.table.domains())?;
    Ok(Html(html))
}

pub async fn process_form(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let upload = read_upload(multipart).await?;
    let report = run_submission(state.clone(), upload).await?;
    Ok(Html(state.templates.results(&report)?))
}

pub async fn process_api(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<SubmissionReport>, ApiError> {
    let upload = read_upload(multipart).await?;
    Ok(Json(run_submission(state, upload).await?))
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Both the archive and the domain must be present and non-empty.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut archive: Option<(String, Vec<u8>)> = None;
    let mut domain: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_ARCHIVE => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    archive = Some((file_name, bytes.to_vec()));
                }
            }
            FIELD_DOMAIN => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    domain = Some(text);
                }
            }
            _ => {}
        }
    }

    match (archive, domain) {
        (Some((file_name, bytes)), Some(domain)) => Ok(Upload {
            file_name,
            bytes,
            domain,
        }),
        _ => Err(SubcheckError::MissingUploadOrDomain.into()),
    }
}

/// Runs the blocking pipeline off the async executor.
pub async fn run_submission(
    state: SharedState,
    upload: Upload,
) -> Result<SubmissionReport, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("submission", %request_id, domain = %upload.domain);

    let report = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        tracing::info!(archive = %upload.file_name, bytes = upload.bytes.len(), "processing submission");
        let ctx = SubmissionContext {
            table: &state.table,
            workspace: &state.workspace,
            policy: &state.config.extract,
            search: &state.config.search,
            client: state.client.as_ref(),
            sleeper: state.sleeper.as_ref(),
        };
        process(
            &ctx,
            request_id,
            &upload.file_name,
            &upload.bytes,
            &upload.domain,
        )
    })
    .await??;

    tracing::info!(
        %request_id,
        flagged_files = report.plagiarism_report.len(),
        "submission processed"
    );
    Ok(report)
}
