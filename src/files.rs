//! Document management commands: `files`, `reload`, `upload`, `download`.

use anyhow::{Context, Result};
use docchat_core::FileDomain;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::session::Session;

pub fn print_domain(domain: &FileDomain) {
    if domain.is_empty() {
        println!("No documents.");
        return;
    }
    if !domain.folders.is_empty() {
        println!("Folders:");
        for folder in &domain.folders {
            println!("  {}/", folder);
        }
    }
    if !domain.files.is_empty() {
        println!("Files:");
        for file in &domain.files {
            println!("  {}", file);
        }
    }
}

/// `docchat files`
pub async fn run_files(session: &mut Session) -> Result<()> {
    let domain = session.load_filters().await;
    print_domain(domain);
    Ok(())
}

/// `docchat reload`
pub async fn run_reload(session: &Session) -> Result<()> {
    let report = session.client().reload().await?;
    println!("{} ({} documents)", report.message, report.doc_count);
    Ok(())
}

/// `docchat upload`: one file at a time; a failed file does not stop the rest.
///
/// Errors at the end if any file failed.
pub async fn run_upload(session: &Session, paths: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;
    for path in paths {
        match session.client().upload(path).await {
            Ok(report) if report.is_success() => {
                let name = report
                    .filename
                    .unwrap_or_else(|| path.display().to_string());
                match report.total_documents {
                    Some(total) => println!("Uploaded {} ({} documents indexed)", name, total),
                    None => println!("Uploaded {}", name),
                }
            }
            Ok(report) => {
                failed += 1;
                println!(
                    "Failed {}: {}",
                    path.display(),
                    report.error.unwrap_or_default()
                );
            }
            Err(e) => {
                failed += 1;
                warn!(file = %path.display(), error = %e, "Upload failed");
                println!("Failed {}: {:#}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} uploads failed", failed, paths.len());
    }
    Ok(())
}

/// Local file name for a downloaded document: its final path component.
pub fn local_name(filename: &str) -> Option<&str> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// `docchat download`
pub async fn run_download(session: &Session, filename: &str, output: &Path) -> Result<PathBuf> {
    let name = local_name(filename)
        .with_context(|| format!("Cannot derive a local file name from '{}'", filename))?;
    let bytes = session.client().download(filename).await?;

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let path = output.join(name);
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
