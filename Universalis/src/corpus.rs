//! Source file discovery and parallel scanning
//!
//! Every source file is read and scanned before anything is converted. A
//! file that fails to read or scan is recorded as skipped and the rest of
//! the batch carries on.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use clausewitz::script::{BlockScanner, ScriptTree};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

/// A scanned source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the game root, used in comments and diagnostics.
    pub relative: PathBuf,
    pub text: String,
    pub tree: ScriptTree,
}

impl SourceFile {
    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// File name with extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// The unnamed root of a file scanned with [`ScanMode::Document`].
    pub fn root(&self) -> Option<&clausewitz::script::ScriptBlock> {
        self.tree.blocks.first().filter(|b| b.name.is_empty())
    }
}

/// A file left out of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// How a file's top level is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// `name = { ... }` blocks only.
    Blocks,
    /// The whole file as one unnamed block, keeping top-level attributes.
    Document,
}

/// Progress of a scan, reported once per file.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub current: usize,
    pub total: usize,
    pub file: String,
}

/// Result of scanning a set of files.
#[derive(Debug, Clone, Default)]
pub struct CorpusScan {
    /// Successfully scanned files, in input order.
    pub files: Vec<SourceFile>,
    pub skipped: Vec<SkippedFile>,
}

impl CorpusScan {
    /// Files attempted, scanned or not.
    pub fn attempted(&self) -> usize {
        self.files.len() + self.skipped.len()
    }

    /// Absorb another scan.
    pub fn extend(&mut self, other: CorpusScan) {
        self.files.extend(other.files);
        self.skipped.extend(other.skipped);
    }
}

/// Find all `.txt` files under `dir`, sorted. A missing directory yields nothing.
pub fn find_script_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        tracing::debug!("No script directory at {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Read and scan `paths` in parallel.
///
/// # Arguments
/// * `paths` - Files to scan
/// * `base` - Game root, for relative display paths
/// * `scanner` - Scanner shared by every file
/// * `mode` - How each file's top level is read
/// * `progress` - Callback for progress updates
pub fn scan_files<F>(
    paths: &[PathBuf],
    base: &Path,
    scanner: &BlockScanner,
    mode: ScanMode,
    progress: F,
) -> CorpusScan
where
    F: Fn(&ScanProgress) + Send + Sync,
{
    let processed = AtomicUsize::new(0);
    let total = paths.len();

    let outcomes: Vec<Result<SourceFile, SkippedFile>> = paths
        .par_iter()
        .map(|path| {
            let relative = path.strip_prefix(base).unwrap_or(path.as_path()).to_path_buf();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&ScanProgress {
                current,
                total,
                file: relative.to_string_lossy().to_string(),
            });

            scan_one(path, relative, scanner, mode)
        })
        .collect();

    let mut scan = CorpusScan::default();
    for outcome in outcomes {
        match outcome {
            Ok(file) => scan.files.push(file),
            Err(skipped) => scan.skipped.push(skipped),
        }
    }
    scan
}

fn scan_one(
    path: &Path,
    relative: PathBuf,
    scanner: &BlockScanner,
    mode: ScanMode,
) -> Result<SourceFile, SkippedFile> {
    let skip = |reason: String| {
        tracing::warn!("Skipping {}: {reason}", relative.display());
        SkippedFile {
            path: relative.clone(),
            reason,
        }
    };

    let bytes = std::fs::read(path).map_err(|e| skip(format!("read failed: {e}")))?;
    let text = String::from_utf8(bytes).map_err(|e| skip(format!("invalid UTF-8: {e}")))?;

    let tree = match mode {
        ScanMode::Blocks => ScriptTree::parse_with(scanner, &text),
        ScanMode::Document => ScriptTree::parse_document(scanner, &text),
    }
    .map_err(|e| skip(e.to_string()))?;

    tracing::debug!("Scanned {} ({} blocks)", relative.display(), tree.len());
    Ok(SourceFile {
        path: path.to_path_buf(),
        relative,
        text,
        tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_script_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.TXT"), "").unwrap();
        std::fs::write(dir.path().join("sub/c.txt"), "").unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();

        let names: Vec<_> = find_script_files(dir.path())
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.txt", "sub/c.txt"]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        assert!(find_script_files("/definitely/not/here").is_empty());
    }

    #[test]
    fn test_bad_file_is_skipped_and_others_scan() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        std::fs::write(&good, "a = { color = rgb { 1 2 3 } }").unwrap();
        std::fs::write(&bad, "a = { b = {").unwrap();

        let counter = AtomicUsize::new(0);
        let scan = scan_files(
            &[bad, good],
            dir.path(),
            &BlockScanner::default(),
            ScanMode::Blocks,
            |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(scan.attempted(), 2);
        assert_eq!(scan.files.len(), 1);
        assert_eq!(scan.files[0].stem(), "good");
        assert_eq!(scan.skipped[0].path, PathBuf::from("bad.txt"));
        assert!(scan.skipped[0].reason.contains("unbalanced"));
    }

    #[test]
    fn test_document_mode_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rome.txt");
        std::fs::write(&path, "color = rgb { 200 0 0 }\nreligion = roman_pantheon\n").unwrap();

        let scan = scan_files(&[path], dir.path(), &BlockScanner::default(), ScanMode::Document, |_| {});
        let root = scan.files[0].root().unwrap();
        assert_eq!(root.attribute("religion"), Some("roman_pantheon"));
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let scan = scan_files(
            &[dir.path().join("absent.txt")],
            dir.path(),
            &BlockScanner::default(),
            ScanMode::Blocks,
            |_| {},
        );
        assert!(scan.files.is_empty());
        assert!(scan.skipped[0].reason.starts_with("read failed"));
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"gallic = { name = \"Gaul\xe9\" }").unwrap();

        let scan = scan_files(&[path], dir.path(), &BlockScanner::default(), ScanMode::Blocks, |_| {});
        assert!(scan.files.is_empty());
        assert_eq!(scan.skipped[0].path, PathBuf::from("latin1.txt"));
        assert!(scan.skipped[0].reason.starts_with("invalid UTF-8"));
    }
}
