use std::path::{Path, PathBuf};

/// Splits a name into stem and extension at the last dot.
///
/// Names without a dot, or whose only dot is the leading one (`.bashrc`),
/// have no extension and the whole name is the stem.
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Adds a numeric counter to a name before the extension.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(add_counter_to_name("AAA.jpg", 2), "AAA_2.jpg");
/// ```
fn add_counter_to_name(name: &str, counter: u64) -> String {
    match split_name(name) {
        (stem, Some(ext)) => format!("{}_{}.{}", stem, counter, ext),
        (stem, None) => format!("{}_{}", stem, counter),
    }
}

/// Returns a destination path under `destination_dir` that does not exist yet.
///
/// If `destination_dir/source_name` is free it is returned unchanged,
/// otherwise `stem_1.ext`, `stem_2.ext`, ... are probed in order and the first
/// unoccupied one wins. Nothing is created on disk; the caller performs the write.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use datamgr::file::naming::resolve_unique_destination;
///
/// // If /path/to/AAA.jpg exists:
/// let result = resolve_unique_destination(Path::new("/path/to"), "AAA.jpg");
/// // Returns: /path/to/AAA_1.jpg (or the next free counter)
/// ```
pub fn resolve_unique_destination(destination_dir: &Path, source_name: &str) -> PathBuf {
    let candidate = destination_dir.join(source_name);

    // symlink_metadata so dangling links still count as occupied
    if candidate.symlink_metadata().is_err() {
        return candidate;
    }

    let mut counter = 1u64;
    loop {
        let candidate = destination_dir.join(add_counter_to_name(source_name, counter));
        if candidate.symlink_metadata().is_err() {
            tracing::debug!("Destination collision for {}, using {:?}", source_name, candidate);
            return candidate;
        }
        counter += 1;
    }
}

/// Builds the directory name used for a timestamped backup of `dir_name`
pub fn backup_name(dir_name: &str, timestamp: &chrono::DateTime<chrono::Local>) -> String {
    format!("{}_backup_{}", dir_name, timestamp.format("%Y%m%d_%H%M%S"))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_no_collision() {
        let temp = TempDir::new().unwrap();
        let result = resolve_unique_destination(temp.path(), "test.jpg");
        assert_eq!(result, temp.path().join("test.jpg"));
        assert!(!result.exists());
    }

    #[test]
    fn test_resolve_first_free_counter() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), b"0").unwrap();
        fs::write(temp.path().join("a_1.txt"), b"1").unwrap();
        fs::write(temp.path().join("a_3.txt"), b"3").unwrap();

        let result = resolve_unique_destination(temp.path(), "a.txt");
        assert_eq!(result, temp.path().join("a_2.txt"));
    }

    #[test]
    fn test_resolve_directory_name() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("project")).unwrap();

        let result = resolve_unique_destination(temp.path(), "project");
        assert_eq!(result, temp.path().join("project_1"));
    }

    #[test]
    fn test_resolve_is_side_effect_free() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), b"0").unwrap();

        let first = resolve_unique_destination(temp.path(), "a.txt");
        let second = resolve_unique_destination(temp.path(), "a.txt");
        assert_eq!(first, second);
        assert!(!first.exists());
    }
}
