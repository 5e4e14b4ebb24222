use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted by the collector, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Input directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether `path` carries one of the supported image extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// List the image files directly inside `dir`, sorted by path.
///
/// Subdirectories and non-image files are skipped. An existing directory with
/// nothing to process yields an empty vector rather than an error.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, CollectError> {
    if !dir.is_dir() {
        return Err(CollectError::DirectoryNotFound(dir.to_path_buf()));
    }

    let io_err = |source| CollectError::Io { path: dir.to_path_buf(), source };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }
    images.sort();

    tracing::debug!(dir = %dir.display(), count = images.len(), "collected images");
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        match collect_images(&missing) {
            Err(CollectError::DirectoryNotFound(p)) => assert_eq!(p, missing),
            other => panic!("expected DirectoryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn file_instead_of_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        assert!(matches!(
            collect_images(&dir.path().join("a.png")),
            Err(CollectError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn only_non_images_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "anim.gif");
        touch(dir.path(), "README");
        assert!(collect_images(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn empty_directory_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_images(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn matches_extensions_in_any_case() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "a.jpg", "b.JPEG", "c.Png", "d.bmp", "e.TIFF", "f.tif", "g.gif", "h.txt", "i.jpg.bak",
        ] {
            touch(dir.path(), name);
        }
        let found = collect_images(dir.path()).unwrap();
        assert_eq!(
            names(&found),
            ["a.jpg", "b.JPEG", "c.Png", "d.bmp", "e.TIFF", "f.tif"]
        );
    }

    #[test]
    fn subdirectories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::create_dir(dir.path().join("looks_like.png")).unwrap();
        touch(&dir.path().join("nested"), "deep.png");
        touch(dir.path(), "top.png");
        let found = collect_images(dir.path()).unwrap();
        assert_eq!(names(&found), ["top.png"]);
    }

    #[test]
    fn result_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.png", "a.png", "b.png"] {
            touch(dir.path(), name);
        }
        let found = collect_images(dir.path()).unwrap();
        assert_eq!(names(&found), ["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn is_supported_image_rejects_extensionless() {
        assert!(!is_supported_image(Path::new("png")));
        assert!(!is_supported_image(Path::new(".png.")));
        assert!(is_supported_image(Path::new("scan.PNG")));
    }
}
