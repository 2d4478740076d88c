use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::snapshot::manifest_path;
use crate::model::SnapshotManifest;
use crate::schedule::SectionLocator;
use crate::snapshot::{document_path, snapshot_dir};
use crate::util::{read_json, sha256_file};

pub fn run(args: StatusArgs, locator: &SectionLocator) -> Result<()> {
    info!(cache_root = %args.cache_root.display(), "status requested");

    for group in locator.groups() {
        info!(
            group = %group.name,
            title = %group.title,
            pooling = ?group.pooling,
            dates = group.dates.len(),
            "date group"
        );
    }

    let manifest_path = manifest_path(&args.cache_root);
    if !manifest_path.exists() {
        warn!(path = %manifest_path.display(), "snapshot manifest missing");
        return Ok(());
    }

    let manifest: SnapshotManifest = read_json(&manifest_path)?;
    info!(
        generated_at = %manifest.generated_at,
        document_count = manifest.document_count,
        missing = manifest.missing_documents.len(),
        "loaded snapshot manifest"
    );

    let stale = stale_documents(&manifest, &snapshot_dir(&args.cache_root))?;
    if stale.is_empty() {
        info!("snapshots match manifest");
    } else {
        for document in &stale {
            warn!(document = %document, "snapshot changed since manifest was written");
        }
    }

    Ok(())
}

/// Documents whose snapshot file is gone or hashes differently than recorded.
fn stale_documents(manifest: &SnapshotManifest, snapshot_dir: &std::path::Path) -> Result<Vec<String>> {
    let mut stale = Vec::new();

    for entry in &manifest.documents {
        let path = document_path(snapshot_dir, &entry.document);
        if !path.is_file() || sha256_file(&path)? != entry.sha256 {
            stale.push(entry.document.clone());
        }
    }

    Ok(stale)
}
