use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::SnapshotArgs;
use crate::model::{SnapshotEntry, SnapshotManifest};
use crate::schedule::{Grid, SectionLocator};
use crate::snapshot::{document_path, snapshot_dir};
use crate::util::{now_utc_string, read_json, sha256_file, write_json_pretty};

pub fn run(args: SnapshotArgs, locator: &SectionLocator) -> Result<()> {
    let manifest = build_manifest(&snapshot_dir(&args.cache_root), locator)?;

    if args.dry_run {
        info!(
            document_count = manifest.document_count,
            missing = manifest.missing_documents.len(),
            source = %manifest.snapshot_directory,
            "snapshot dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| manifest_path(&args.cache_root));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote snapshot manifest");
    info!(document_count = manifest.document_count, "snapshot inventory completed");

    Ok(())
}

pub fn manifest_path(cache_root: &Path) -> std::path::PathBuf {
    cache_root.join("manifests").join("snapshot_inventory.json")
}

pub fn build_manifest(snapshot_dir: &Path, locator: &SectionLocator) -> Result<SnapshotManifest> {
    let mut documents = Vec::new();
    let mut missing_documents = Vec::new();

    for document in locator.documents() {
        let path = document_path(snapshot_dir, &document.id);
        if !path.is_file() {
            warn!(document = %document.id, path = %path.display(), "snapshot missing");
            missing_documents.push(document.id.clone());
            continue;
        }

        let grid: Grid = read_json(&path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        documents.push(SnapshotEntry {
            document: document.id.clone(),
            tab: document.tab.clone(),
            filename,
            sha256: sha256_file(&path)?,
            row_count: grid.row_count(),
            max_columns: grid.max_columns(),
        });
    }

    Ok(SnapshotManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        snapshot_directory: snapshot_dir.display().to_string(),
        document_count: documents.len(),
        documents,
        missing_documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_present_documents_and_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            document_path(dir.path(), "A"),
            r#"[["a"], ["b", "c", "d"]]"#,
        )
        .unwrap();

        let locator = SectionLocator::builtin().unwrap();
        let manifest = build_manifest(dir.path(), &locator).unwrap();

        assert_eq!(manifest.document_count, 1);
        assert_eq!(manifest.documents[0].document, "A");
        assert_eq!(manifest.documents[0].filename, "A.json");
        assert_eq!(manifest.documents[0].row_count, 2);
        assert_eq!(manifest.documents[0].max_columns, 3);
        assert_eq!(manifest.documents[0].sha256.len(), 64);
        assert_eq!(manifest.missing_documents, vec!["B".to_string()]);
    }

    #[test]
    fn run_writes_manifest_under_cache_root() {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = snapshot_dir(dir.path());
        std::fs::create_dir_all(&snapshots).unwrap();
        std::fs::write(document_path(&snapshots, "B"), "[]").unwrap();

        let locator = SectionLocator::builtin().unwrap();
        run(
            SnapshotArgs {
                cache_root: dir.path().to_path_buf(),
                manifest_path: None,
                dry_run: false,
            },
            &locator,
        )
        .unwrap();

        let written: SnapshotManifest = read_json(&manifest_path(dir.path())).unwrap();
        assert_eq!(written.documents[0].document, "B");
        assert_eq!(written.missing_documents, vec!["A".to_string()]);
    }
}
