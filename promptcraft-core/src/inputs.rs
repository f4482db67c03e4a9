//! # Input collection
//!
//! Two directories feed a request: one with instruction fragments, one with
//! input fragments. A missing directory is simply "no content". Entries that
//! are not regular files, or cannot be read as UTF-8 text, are skipped.
//! Files are visited in the order the operating system lists them.

use std::path::{Path, PathBuf};

/// Extensions accepted as a video reference image (lowercase)
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Regular files of `dir`, in listing order. Missing dir yields nothing.
fn list_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "directory not readable, treating as empty");
            return Vec::new();
        }
    };

    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect()
}

fn read_text(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
            None
        }
    }
}

/// Concatenate every instruction file as-is.
pub fn load_instructions(dir: impl AsRef<Path>) -> String {
    list_files(dir.as_ref())
        .iter()
        .filter_map(|p| read_text(p))
        .collect()
}

/// Concatenate every input file, each preceded by a `File: <path>` line and
/// followed by a newline.
pub fn load_input(dir: impl AsRef<Path>) -> String {
    let mut input = String::new();
    for path in list_files(dir.as_ref()) {
        let Some(text) = read_text(&path) else { continue };
        input.push_str("File: ");
        input.push_str(&path.display().to_string());
        input.push('\n');
        input.push_str(&text);
        input.push('\n');
    }
    input
}

/// First file in `dir` whose extension is an accepted image type.
pub fn find_reference_image(dir: impl AsRef<Path>) -> Option<PathBuf> {
    list_files(dir.as_ref()).into_iter().find(|p| is_image(p))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("instruction");

        assert_eq!(load_instructions(&missing), "");
        assert_eq!(load_input(&missing), "");
        assert_eq!(find_reference_image(&missing), None);
    }

    #[test]
    fn test_instructions_concatenated_without_headers() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rules.md"), "Reply with OK.").unwrap();

        assert_eq!(load_instructions(dir.path()), "Reply with OK.");
    }

    #[test]
    fn test_input_headers_in_listing_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("b.txt"), "beta").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let listed = list_files(dir.path());
        assert_eq!(listed.len(), 2);

        let input = load_input(dir.path());
        let mut cursor = 0;
        for path in &listed {
            let header = format!("File: {}\n", path.display());
            let body = std::fs::read_to_string(path).unwrap();
            let block = format!("{}{}\n", header, body);

            let at = input[cursor..].find(&block).expect("file block present") + cursor;
            cursor = at + block.len();
        }
        assert_eq!(cursor, input.len());
    }

    #[test]
    fn test_single_input_block_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ping.txt");
        std::fs::write(&path, "ping").unwrap();

        assert_eq!(load_input(dir.path()), format!("File: {}\nping\n", path.display()));
    }

    #[test]
    fn test_non_utf8_input_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("photo.png"), [0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ping").unwrap();

        let input = load_input(dir.path());
        assert!(input.contains("notes.txt"));
        assert!(input.contains("ping"));
        assert!(!input.contains("photo.png"));
    }

    #[test]
    fn test_reference_image_lookup() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.txt"), "text").unwrap();
        std::fs::write(dir.path().join("B.png"), [0u8; 4]).unwrap();

        assert_eq!(find_reference_image(dir.path()), Some(dir.path().join("B.png")));
    }

    #[test]
    fn test_reference_image_extension_case_insensitive() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("shot.JPEG"), [0u8; 4]).unwrap();
        assert!(is_image(&dir.path().join("shot.JPEG")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("png")));

        assert_eq!(find_reference_image(dir.path()), Some(dir.path().join("shot.JPEG")));
    }
}
