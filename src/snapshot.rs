use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::schedule::{Grid, GridSet, SectionLocator};
use crate::util::read_json;

pub fn load_layout(path: Option<&Path>) -> Result<SectionLocator> {
    let locator = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SectionLocator::from_json(&raw)
                .with_context(|| format!("invalid layout {}", path.display()))?
        }
        None => SectionLocator::builtin()?,
    };

    let source = path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());
    info!(
        source = %source,
        documents = locator.documents().len(),
        dates = locator.days().len(),
        sections = locator.sections().len(),
        "loaded layout"
    );

    Ok(locator)
}

pub fn snapshot_dir(cache_root: &Path) -> PathBuf {
    cache_root.join("snapshots")
}

pub fn document_path(snapshot_dir: &Path, document: &str) -> PathBuf {
    snapshot_dir.join(format!("{document}.json"))
}

pub fn load_grids(snapshot_dir: &Path, locator: &SectionLocator) -> Result<GridSet> {
    let mut grids = GridSet::new();

    for document in locator.documents() {
        let path = document_path(snapshot_dir, &document.id);
        if !path.exists() {
            warn!(
                document = %document.id,
                tab = %document.tab,
                path = %path.display(),
                "snapshot missing; document treated as absent"
            );
            continue;
        }

        let grid: Grid = read_json(&path)?;
        info!(
            document = %document.id,
            rows = grid.row_count(),
            columns = grid.max_columns(),
            "loaded snapshot"
        );
        grids.insert(document.id.clone(), grid);
    }

    Ok(grids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshots_are_skipped_and_present_ones_loaded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(document_path(dir.path(), "A"), r#"[["", "[judge] en 1"]]"#).unwrap();

        let locator = SectionLocator::builtin().unwrap();
        let grids = load_grids(dir.path(), &locator).unwrap();

        assert!(grids.get("A").is_some());
        assert!(grids.get("B").is_none());
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(document_path(dir.path(), "B"), "{not json").unwrap();

        let locator = SectionLocator::builtin().unwrap();
        let err = load_grids(dir.path(), &locator).unwrap_err();
        assert!(err.to_string().contains("failed to parse"), "{err}");
    }

    #[test]
    fn layout_file_overrides_builtin_and_reports_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, r#"{"layout_version": 2, "documents": [], "eras": [], "dates": []}"#)
            .unwrap();

        let err = load_layout(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("invalid layout"), "{err}");
        assert!(format!("{err:#}").contains("layout_version"), "{err:#}");

        assert_eq!(load_layout(None).unwrap().documents().len(), 2);
    }
}
