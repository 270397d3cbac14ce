//! `docchat search`: one retrieval round-trip, printed.

use anyhow::{Context, Result};
use docchat_core::SearchHit;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::display::trusted_text;
use crate::session::Session;

/// Run a search with the session's current scope and print the hits.
///
/// With `images_dir`, decoded hit images are written there as
/// `<hit>-<n>.<ext>` and their paths printed.
pub async fn run_search(session: &Session, query: &str, images_dir: Option<&Path>) -> Result<()> {
    let hits = session.search(query).await?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    if let Some(dir) = images_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    for (i, hit) in hits.iter().enumerate() {
        print_hit(i + 1, hit);
        if let Some(dir) = images_dir {
            for path in save_images(hit, i + 1, dir)? {
                println!("    image: {}", path.display());
            }
        }
        println!();
    }

    Ok(())
}

pub fn print_hit(rank: usize, hit: &SearchHit) {
    println!("{}. [{:.2}] {}", rank, hit.score, hit.display_name());
    if let Some(folder) = hit.folder_path() {
        println!("    folder: {}", folder);
    }

    let mut meta = vec![hit.metadata.file_type.clone()];
    meta.extend(hit.metadata.file_size.clone());
    meta.extend(hit.metadata.modified_date.clone());
    meta.retain(|m| !m.is_empty());
    if !meta.is_empty() {
        println!("    file: {}", meta.join(" · "));
    }
    if !hit.method.is_empty() {
        println!("    method: {}", hit.method);
    }
    if !hit.sub_scores.is_empty() {
        let parts: Vec<String> = [
            ("tfidf", hit.sub_scores.tfidf_score),
            ("bm25", hit.sub_scores.bm25_score),
            ("semantic", hit.sub_scores.semantic_score),
        ]
        .iter()
        .filter_map(|(name, score)| score.map(|s| format!("{} {:.2}", name, s)))
        .collect();
        println!("    scores: {}", parts.join(", "));
    }

    if !hit.summary.is_empty() {
        println!("    summary: {}", trusted_text(&hit.summary).replace('\n', " "));
    }
    if let Some(snippet) = hit.snippet.as_ref().filter(|s| !s.is_empty()) {
        println!("    excerpt: \"{}\"", trusted_text(snippet).replace('\n', " ").trim());
    }
    for point in &hit.key_points {
        println!("    - {}", trusted_text(point).replace('\n', " "));
    }
    if !hit.images.is_empty() {
        println!("    images: {}", hit.images.len());
    }
}

/// Decode and write every image of `hit`. Undecodable images are skipped.
fn save_images(hit: &SearchHit, rank: usize, dir: &Path) -> Result<Vec<PathBuf>> {
    let stem: String = hit
        .display_name()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    let mut written = Vec::new();
    for (n, image) in hit.images.iter().enumerate() {
        let bytes = match image.decode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %hit.filename, image = n + 1, error = %e, "Skipping undecodable image");
                continue;
            }
        };
        let suffix = match image.page() {
            Some(page) => format!("p{}-{}", page, n + 1),
            None => format!("{}", n + 1),
        };
        let path = dir.join(format!("{}-{}-{}.{}", rank, stem, suffix, image.extension()));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
