//! Supporting helpers: colored message prefixes, target discovery, and
//! source decoding.

use crate::error::InputError;
use owo_colors::OwoColorize;
use std::fs;
use std::path::{Path, PathBuf};

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if colors_enabled() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Expand glob `patterns` relative to `root`; sorted, deduplicated files.
pub fn collect_targets(root: &Path, patterns: &[String]) -> (Vec<PathBuf>, Vec<String>) {
    let mut targets = Vec::new();
    let mut errors = Vec::new();
    for pat in patterns {
        let pattern = root.join(pat).to_string_lossy().to_string();
        match glob::glob(&pattern) {
            Ok(paths) => targets.extend(paths.flatten().filter(|p| p.is_file())),
            Err(e) => errors.push(format!("bad glob pattern '{}': {}", pat, e)),
        }
    }
    targets.sort();
    targets.dedup();
    (targets, errors)
}

/// Path of `path` relative to `root` for display.
pub fn display_path(root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Read a file that must be UTF-8 source text.
pub fn read_source(path: &Path) -> Result<String, InputError> {
    let bytes = fs::read(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| InputError::Encoding {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

/// True for files whose contract code lives in template literals.
pub fn is_host_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs")
    )
}
