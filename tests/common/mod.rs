use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Generate test file content of a specific size
pub fn generate_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Write `content` to `root/relative`, creating parent directories
#[allow(dead_code)]
pub fn write_file(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Build the scenario project: 10 files over 3 subdirectories, 100 KB total
#[allow(dead_code)]
pub fn create_project_tree(root: &Path) -> (u64, u64) {
    let layout = [
        ("README.md", 4_000),
        ("Cargo.toml", 1_000),
        ("src/main.rs", 15_000),
        ("src/lib.rs", 12_000),
        ("src/util.rs", 8_000),
        ("docs/guide.md", 20_000),
        ("docs/api.md", 10_000),
        ("assets/logo.png", 18_000),
        ("assets/icon.ico", 7_000),
        ("assets/font.ttf", 5_000),
    ];
    for (relative, size) in layout {
        write_file(root, relative, &generate_test_content(size));
    }
    let total: usize = layout.iter().map(|(_, size)| size).sum();
    (layout.len() as u64, total as u64)
}

/// Relative path -> content of every file under `root`
#[allow(dead_code)]
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    collect(root, root, &mut files);
    files
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let relative = path.strip_prefix(root).unwrap().to_path_buf();
            files.insert(relative, fs::read(&path).unwrap());
        }
    }
}

/// Helper to verify file contents match expected
#[allow(dead_code)]
pub fn verify_file_content(path: &Path, expected: &[u8]) -> Result<(), String> {
    let content = fs::read(path).map_err(|e| format!("Failed to read file: {}", e))?;

    if content == expected {
        Ok(())
    } else {
        Err(format!(
            "File content mismatch: expected {} bytes, got {} bytes",
            expected.len(),
            content.len()
        ))
    }
}
