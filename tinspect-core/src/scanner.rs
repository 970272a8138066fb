use std::path::{Path, PathBuf};
use tinspect_common::Result;

/// every `*.parquet` file below `base`, sorted by path so dataset reads are deterministic
pub fn scan_directory(base: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();
    scan_recursive(base, &mut results)?;
    results.sort();
    Ok(results)
}

fn scan_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            scan_recursive(&path, out)?;
        } else if file_type.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some("parquet")
        {
            out.push(path);
        }
    }
    Ok(())
}

/// size in bytes of a file, or the recursive sum of regular files in a directory;
/// symlinks are never followed or counted
pub fn path_size(path: &Path) -> Result<u64> {
    let meta = std::fs::metadata(path)?;
    if !meta.is_dir() {
        return Ok(meta.len());
    }
    let mut total = 0u64;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            total += path_size(&entry.path())?;
        } else {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}
