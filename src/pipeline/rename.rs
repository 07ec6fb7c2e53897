//! Target-name construction and the collision-safe rename itself.

use crate::error::FileError;
use crate::label::PageLabel;
use std::path::Path;

/// Prefix and separator of every renamed file. A file whose name starts
/// with it has already been processed.
pub const MARKER: char = '_';

/// Whether `file_name` was produced by an earlier run.
pub fn is_marked(file_name: &str) -> bool {
    file_name.starts_with(MARKER)
}

/// `_<label>_<base><ext>`.
pub fn labelled_name(label: &PageLabel, file_name: &str) -> String {
    let (base, ext) = split_extension(file_name);
    format!("{MARKER}{label}{MARKER}{base}{ext}")
}

/// `_<NNNN>_<base><ext>` for a 1-based `position`.
pub fn indexed_name(position: usize, file_name: &str) -> String {
    let (base, ext) = split_extension(file_name);
    format!("{MARKER}{position:04}{MARKER}{base}{ext}")
}

/// Split `name` into base and extension (with its dot) at the last `.`.
/// A leading dot does not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

/// Rename `from` to `to` inside `dir`, refusing to overwrite.
pub async fn rename_in(dir: &Path, from: &str, to: &str) -> Result<(), FileError> {
    ensure_vacant(dir, to).await?;
    tokio::fs::rename(dir.join(from), dir.join(to))
        .await
        .map_err(|e| FileError::RenameFailed {
            target: to.to_string(),
            detail: e.to_string(),
        })
}

/// Fail with [`FileError::Collision`] if `dir/name` already exists.
pub async fn ensure_vacant(dir: &Path, name: &str) -> Result<(), FileError> {
    match tokio::fs::try_exists(dir.join(name)).await {
        Ok(false) => Ok(()),
        Ok(true) => Err(FileError::Collision {
            target: name.to_string(),
        }),
        Err(e) => Err(FileError::RenameFailed {
            target: name.to_string(),
            detail: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelled_names() {
        let seven = PageLabel::Number("0007".into());
        assert_eq!(labelled_name(&seven, "scan01.png"), "_0007_scan01.png");
        let cover = PageLabel::Marker("cover".into());
        assert_eq!(labelled_name(&cover, "IMG.2024.JPG"), "_cover_IMG.2024.JPG");
    }

    #[test]
    fn indexed_names() {
        assert_eq!(indexed_name(1, "a.png"), "_0001_a.png");
        assert_eq!(indexed_name(123, "b.tiff"), "_0123_b.tiff");
    }

    #[test]
    fn split_keeps_dot_with_extension() {
        assert_eq!(split_extension("a.b.png"), ("a.b", ".png"));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("plain"), ("plain", ""));
    }

    #[test]
    fn marker_detection() {
        assert!(is_marked("_0001_a.png"));
        assert!(!is_marked("a_0001.png"));
    }

    #[tokio::test]
    async fn rename_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();

        rename_in(dir.path(), "a.png", "_0001_a.png").await.unwrap();
        assert!(!dir.path().join("a.png").exists());
        assert!(dir.path().join("_0001_a.png").exists());
    }

    #[tokio::test]
    async fn rename_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"new").unwrap();
        std::fs::write(dir.path().join("_0001_a.png"), b"old").unwrap();

        let err = rename_in(dir.path(), "a.png", "_0001_a.png")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FileError::Collision {
                target: "_0001_a.png".into()
            }
        );
        assert_eq!(std::fs::read(dir.path().join("_0001_a.png")).unwrap(), b"old");
        assert!(dir.path().join("a.png").exists());
    }

    #[tokio::test]
    async fn missing_source_reports_rename_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = rename_in(dir.path(), "gone.png", "_0001_gone.png")
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::RenameFailed { .. }));
    }
}
