use std::fs;
use std::path::{Path, PathBuf};

use subcheck_core::error::{Result, SubcheckError};
use subcheck_core::pacer::ThreadSleeper;
use subcheck_core::{
    AppConfig, CustomSearchClient, ExtractPolicy, RequirementsTable, ScanOutcome, Scanner,
    SubmissionContext, Workspace, archive, document, process, validate,
};
use uuid::Uuid;

use crate::presentation::cli::SearchArgs;

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{s}");
    Ok(())
}

fn scratch_workspace() -> Result<Workspace> {
    let root = std::env::temp_dir().join("subcheckdev");
    Workspace::open(&root.join("uploads"), &root.join("extracted"))
}

pub(crate) fn resolve_config(args: &SearchArgs) -> Result<AppConfig> {
    let mut cfg = AppConfig::load(args.config.as_deref())?;
    apply_search_args(&mut cfg, args);
    Ok(cfg)
}

fn apply_search_args(cfg: &mut AppConfig, args: &SearchArgs) {
    if let Some(k) = &args.api_key {
        cfg.search.api_key = k.clone();
    }
    if let Some(id) = &args.engine_id {
        cfg.search.engine_id = id.clone();
    }
    if let Some(ms) = args.interval_ms {
        cfg.search.request_interval_ms = ms;
    }
}

pub fn handle_domains(requirements: Option<PathBuf>) -> Result<()> {
    let table = RequirementsTable::load_or_embedded(requirements.as_deref())?;
    for e in table.entries() {
        println!("{:<45} {} documents", e.name, e.required.len());
    }
    Ok(())
}

pub fn handle_requirements(domain: String, requirements: Option<PathBuf>) -> Result<()> {
    let table = RequirementsTable::load_or_embedded(requirements.as_deref())?;
    for (i, label) in table.lookup(&domain)?.iter().enumerate() {
        println!("{:>2}. {label}", i + 1);
    }
    Ok(())
}

pub fn handle_list(archive: PathBuf) -> Result<()> {
    let bytes = fs::read(&archive)?;
    for row in archive::list_members(&bytes)? {
        let kind = if row.is_dir { "dir " } else { "file" };
        println!("{kind}  {:>10}  {}", row.size, row.name);
    }
    Ok(())
}

pub fn handle_extract(archive: PathBuf, dest: PathBuf) -> Result<()> {
    let names = archive::extract_file(&archive, &dest, &ExtractPolicy::default())?;
    for n in &names {
        println!("{n}");
    }
    eprintln!("extract: {} files -> {}", names.len(), dest.display());
    Ok(())
}

pub fn handle_validate(
    archive: PathBuf,
    domain: String,
    requirements: Option<PathBuf>,
) -> Result<()> {
    let table = RequirementsTable::load_or_embedded(requirements.as_deref())?;
    let ws = scratch_workspace()?;
    let scope = ws.begin()?;
    let submitted =
        archive::extract_file(&archive, scope.extract_dir(), &ExtractPolicy::default())?;
    let result = validate(&table, &domain, &submitted)?;
    print_json(&result)?;
    if result.complete {
        eprintln!("validate: all {} documents submitted", result.required.len());
    } else {
        eprintln!(
            "validate: {} of {} documents missing",
            result.missing.len(),
            result.required.len()
        );
    }
    Ok(())
}

pub fn handle_chunks(file: PathBuf) -> Result<()> {
    let text = document::read_text(&file)?;
    let chunks = document::split_chunks(&text);
    for (i, c) in chunks.iter().enumerate() {
        println!("#{:<4} {c}", i + 1);
    }
    eprintln!("chunks: {} from {}", chunks.len(), display_name(&file));
    Ok(())
}

pub fn handle_scan(file: PathBuf, search: SearchArgs) -> Result<()> {
    let cfg = resolve_config(&search)?;
    let chunks = document::extract_chunks(&file);
    let client = CustomSearchClient::new(&cfg.search);
    let outcome = Scanner::new(&cfg.search, &client, &ThreadSleeper).scan(&chunks)?;
    print_json(&outcome.matches())?;
    match outcome {
        ScanOutcome::Completed(m) => {
            eprintln!("scan: {} of {} chunks matched", m.len(), chunks.len());
            Ok(())
        }
        ScanOutcome::QuotaExceeded { partial } => {
            eprintln!("scan: stopped early, {} matches so far", partial.len());
            Err(SubcheckError::SearchQuotaExceeded)
        }
    }
}

pub fn handle_check(archive: PathBuf, domain: String, search: SearchArgs) -> Result<()> {
    let cfg = resolve_config(&search)?;
    let table = RequirementsTable::load_or_embedded(cfg.requirements_path.as_deref())?;
    let ws = scratch_workspace()?;
    let client = CustomSearchClient::new(&cfg.search);
    let ctx = SubmissionContext {
        table: &table,
        workspace: &ws,
        policy: &cfg.extract,
        search: &cfg.search,
        client: &client,
        sleeper: &ThreadSleeper,
    };
    let bytes = fs::read(&archive)?;
    let report = process(&ctx, Uuid::new_v4(), &display_name(&archive), &bytes, &domain)?;
    print_json(&report)?;
    for n in &report.notices {
        eprintln!("check: {n}");
    }
    Ok(())
}

fn display_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}
