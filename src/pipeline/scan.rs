//! Directory listing: which files are page images, and in what order.

use crate::error::RenameError;
use std::path::Path;
use tracing::{debug, warn};

/// Extensions treated as page images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// Whether `file_name` has one of [`IMAGE_EXTENSIONS`].
pub fn is_supported_image(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// List the image files directly inside `dir`, sorted by name.
///
/// The sort is a plain byte-wise comparison so the order is the same on
/// every platform and independent of how the OS returns entries.
/// Subdirectories and names that are not valid UTF-8 are ignored.
pub fn list_image_files(dir: &Path) -> Result<Vec<String>, RenameError> {
    if !dir.exists() {
        return Err(RenameError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(RenameError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let read_err = |source| RenameError::ReadDirFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.path().is_file() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("Ignoring non-UTF-8 file name {:?}", raw);
                continue;
            }
        };
        if is_supported_image(&name) {
            files.push(name);
        }
    }

    files.sort_unstable();
    debug!("Found {} image files in {}", files.len(), dir.display());
    Ok(files)
}
