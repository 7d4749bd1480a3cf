//! UTF-8 byte order mark removal

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// `data` without a leading UTF-8 BOM, or `None` if there was none.
pub fn strip_bom(data: &[u8]) -> Option<&[u8]> {
    data.strip_prefix(UTF8_BOM)
}

/// Result of a BOM stripping pass.
#[derive(Debug, Clone, Default)]
pub struct BomReport {
    /// Number of `.txt` files looked at.
    pub scanned: usize,
    /// Files that had a BOM, relative to the root.
    pub changed: Vec<PathBuf>,
    /// Files that could not be read or written, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Remove the BOM from every `.txt` file under `root`. With `dry_run` the
/// files are only reported.
pub fn strip_bom_dir(root: &Path, dry_run: bool) -> Result<BomReport> {
    let mut report = BomReport::default();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")) {
            continue;
        }
        report.scanned += 1;
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", path.display());
                report.failed.push((relative, e.to_string()));
                continue;
            }
        };
        let Some(stripped) = strip_bom(&data) else {
            continue;
        };
        let rewrite = if dry_run { Ok(()) } else { std::fs::write(path, stripped) };
        if let Err(e) = rewrite {
            tracing::warn!("Could not rewrite {}: {e}", path.display());
            report.failed.push((relative, e.to_string()));
            continue;
        }
        tracing::debug!("Stripped BOM: {}", path.display());
        report.changed.push(relative);
    }
    Ok(report)
}
