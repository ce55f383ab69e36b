use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path};

use serde::Serialize;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{Result, SubcheckError};
use crate::policy::ExtractPolicy;

const RESOURCE_FORK_DIR: &str = "__MACOSX";

#[derive(Clone, Debug, Serialize)]
pub struct MemberRow {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

fn open(archive: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>> {
    Ok(ZipArchive::new(Cursor::new(archive))?)
}

pub fn list_members(archive: &[u8]) -> Result<Vec<MemberRow>> {
    let mut zip = open(archive)?;
    let mut rows = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        rows.push(MemberRow {
            name: entry.name().to_string(),
            size: entry.size(),
            is_dir: entry.is_dir(),
        });
    }
    Ok(rows)
}

/// Unpack every file member into `dest` by basename and return the resulting
/// filenames. Same-name members overwrite each other; directories are not recreated.
///
/// Header sizes are only a first filter. The bytes actually inflated are
/// counted against `max_uncompressed` while writing.
pub fn extract(archive: &[u8], dest: &Path, policy: &ExtractPolicy) -> Result<Vec<String>> {
    let mut zip = open(archive)?;
    check_limits(&mut zip, policy)?;
    fs::create_dir_all(dest)?;
    let mut budget = policy.max_uncompressed.unwrap_or(u64::MAX);

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let raw_name = entry.name().to_string();
        let Some(rel) = entry.enclosed_name() else {
            tracing::warn!(member = %raw_name, "skipping archive member with unsafe path");
            continue;
        };
        if policy.skip_resource_forks && is_resource_fork(&rel) {
            tracing::debug!(member = %raw_name, "skipping resource fork");
            continue;
        }
        let Some(file_name) = rel.file_name() else {
            continue;
        };

        let target = dest.join(file_name);
        let mut out = fs::File::create(&target)?;
        let mut limited = entry.by_ref().take(budget.saturating_add(1));
        let written = io::copy(&mut limited, &mut out)
            .map_err(|e| SubcheckError::CorruptArchive(format!("{raw_name}: {e}")))?;
        if written > budget {
            drop(out);
            let _ = fs::remove_file(&target);
            return Err(SubcheckError::CorruptArchive(format!(
                "{raw_name}: expands past the {} byte limit",
                policy.max_uncompressed.unwrap_or(u64::MAX)
            )));
        }
        budget -= written;
    }

    list_extracted(dest)
}

pub fn extract_file(archive: &Path, dest: &Path, policy: &ExtractPolicy) -> Result<Vec<String>> {
    let bytes = fs::read(archive)?;
    extract(&bytes, dest, policy)
}

/// Sorted names of the regular files directly under `dir`.
pub fn list_extracted(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
        })?;
        if entry.file_type().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn check_limits(zip: &mut ZipArchive<Cursor<&[u8]>>, policy: &ExtractPolicy) -> Result<()> {
    if let Some(max) = policy.max_entries {
        if zip.len() as u64 > max {
            return Err(SubcheckError::CorruptArchive(format!(
                "archive has {} entries, limit is {max}",
                zip.len()
            )));
        }
    }
    if let Some(max) = policy.max_uncompressed {
        let mut total = 0u64;
        for i in 0..zip.len() {
            total = total.saturating_add(zip.by_index(i)?.size());
        }
        if total > max {
            return Err(SubcheckError::CorruptArchive(format!(
                "archive expands to {total} bytes, limit is {max}"
            )));
        }
    }
    Ok(())
}

fn is_resource_fork(rel: &Path) -> bool {
    let in_fork_dir = rel
        .components()
        .any(|c| matches!(c, Component::Normal(s) if s == RESOURCE_FORK_DIR));
    let apple_double = rel
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("._"));
    in_fork_dir || apple_double
}
