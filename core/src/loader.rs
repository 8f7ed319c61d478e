use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Reads every `.txt` file directly inside `dir` as `(file_name, contents)`, sorted by name.
pub fn load_corpus_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<(String, String)>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        bail!("corpus directory {} does not exist", dir.display());
    }
    let mut docs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let p = entry.path();
        // Path::is_file follows symlinks, DirEntry::file_type does not
        if !p.is_file() { continue; }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".txt") { continue; }
        let text = fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
        docs.push((name, text));
    }
    docs.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::debug!(dir = %dir.display(), num_docs = docs.len(), "loaded corpus");
    Ok(docs)
}

pub fn read_query_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("reading query file {}", path.display()))
}
