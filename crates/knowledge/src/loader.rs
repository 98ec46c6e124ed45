//! Loading document text from uploads and directories.

use crate::types::SourceDocument;
use docqa_core::{AppError, AppResult};
use std::path::Path;
use walkdir::WalkDir;

/// Decode raw upload bytes as UTF-8 text.
pub fn decode_text(name: &str, bytes: Vec<u8>) -> AppResult<String> {
    String::from_utf8(bytes).map_err(|e| {
        AppError::Validation(format!("{} is not valid UTF-8 text: {}", name, e.utf8_error()))
    })
}

/// Load every file under `dir` (recursively) as a document.
///
/// Files are visited in file-name order. Files that are not valid UTF-8 are
/// skipped with a warning; a missing directory is an error.
pub fn load_documents(dir: &Path) -> AppResult<Vec<SourceDocument>> {
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "Data directory does not exist: {:?}",
            dir
        )));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }

        let name = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

        match decode_text(&name, bytes) {
            Ok(text) => documents.push(SourceDocument { name, text }),
            Err(e) => tracing::warn!("Skipping {:?}: {}", path, e),
        }
    }

    tracing::debug!("Loaded {} documents from {:?}", documents.len(), dir);
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text("a.txt", b"hello".to_vec()).unwrap(), "hello");

        let result = decode_text("bad.bin", vec![0xff, 0xfe, 0x00]);
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("bad.bin")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_documents_recursive_and_sorted() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "second").unwrap();
        fs::write(temp.path().join("a.txt"), "first").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub").join("c.md"), "nested").unwrap();

        let docs = load_documents(temp.path()).unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();

        assert_eq!(docs.len(), 3);
        assert_eq!(names[0], "a.txt");
        assert_eq!(names[1], "b.txt");
        assert!(names[2].ends_with("c.md"));
        assert_eq!(docs[0].text, "first");
    }

    #[test]
    fn test_non_utf8_files_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("good.txt"), "fine").unwrap();
        fs::write(temp.path().join("image.bin"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();

        let docs = load_documents(temp.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "good.txt");
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = load_documents(&temp.path().join("absent"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
