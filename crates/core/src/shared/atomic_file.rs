use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling temp path used while a file is being written: `name.ext.part`.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Writes `bytes` to a temp sibling and renames it over `dest`.
///
/// Readers of `dest` see either the previous contents or the new ones,
/// never a partially written file.
pub fn write_atomically(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp = part_path(dest);
    let result = fs::write(&temp, bytes).and_then(|()| fs::rename(&temp, dest));
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}
