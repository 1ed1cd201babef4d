//! Filesystem bookkeeping for generated and uploaded artifacts.
//!
//! All artifacts live flat in one output directory with stage suffixes in
//! the filename (`_no_bg`, `_with_bg`, `_enhanced`, `_<style>`). Generated
//! images use a sequential index per request; names are deliberately stable
//! across requests, so a new request overwrites the previous artifacts.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{Error, Result};

/// Derive the sibling path for a pipeline stage, e.g.
/// `photo.png` + `_no_bg` → `photo_no_bg.png`.
pub fn stage_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.png"))
}

/// Manager for the artifact output directory.
#[derive(Debug, Clone)]
pub struct OutputStore {
    base_dir: PathBuf,
}

impl OutputStore {
    /// Create a new `OutputStore` rooted at the given directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The directory artifacts are written to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }

    /// Path for the `index`-th generated image of a request (1-based name).
    pub fn generated_path(&self, index: usize) -> PathBuf {
        self.base_dir
            .join(format!("generated_image_{}.png", index + 1))
    }

    /// Resolve an artifact by filename, verifying it exists.
    ///
    /// The name is reduced to its final path component first, so callers can
    /// pass client-supplied strings without escaping the output directory.
    pub fn find(&self, filename: &str) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        let path = self.base_dir.join(name);
        if !path.is_file() {
            return Err(Error::not_found("image", filename));
        }
        Ok(path)
    }

    /// Save an uploaded file under its client-supplied filename.
    ///
    /// Only the final path component of the name is kept.
    pub fn save_upload(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        let path = self.base_dir.join(name);
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// List the files currently present in the output directory, sorted by
    /// name.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Package every file in the output directory into a zip archive at
    /// `zip_path`. The archive reflects the directory contents at call time.
    pub fn zip_all(&self, zip_path: &Path) -> Result<PathBuf> {
        let file = File::create(zip_path)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for path in self.list_files()? {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            writer
                .start_file(&name, options)
                .map_err(|e| Error::Internal(format!("zip entry {name}: {e}")))?;
            writer.write_all(&std::fs::read(&path)?)?;
        }

        writer
            .finish()
            .map_err(|e| Error::Internal(format!("zip finish: {e}")))?;
        Ok(zip_path.to_path_buf())
    }
}

/// Reduce a client-supplied filename to its final path component.
fn sanitize_filename(filename: &str) -> Result<String> {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != ".." && n != ".")
        .ok_or_else(|| Error::Validation(format!("invalid filename: {filename:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn store() -> (tempfile::TempDir, OutputStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().to_path_buf());
        store.ensure_dirs().unwrap();
        (dir, store)
    }

    #[test]
    fn stage_path_appends_suffix() {
        let path = stage_path(Path::new("/out/photo.png"), "_no_bg");
        assert_eq!(path, PathBuf::from("/out/photo_no_bg.png"));
    }

    #[test]
    fn stage_path_normalizes_extension_to_png() {
        let path = stage_path(Path::new("/out/photo.jpg"), "_no_bg");
        assert_eq!(path, PathBuf::from("/out/photo_no_bg.png"));
    }

    #[test]
    fn generated_path_is_one_based() {
        let store = OutputStore::new(PathBuf::from("/out"));
        assert_eq!(
            store.generated_path(0),
            PathBuf::from("/out/generated_image_1.png")
        );
        assert_eq!(
            store.generated_path(2),
            PathBuf::from("/out/generated_image_3.png")
        );
    }

    #[test]
    fn save_upload_strips_directories() {
        let (_dir, store) = store();
        let path = store
            .save_upload("../../etc/passwd.png", b"data")
            .unwrap();
        assert_eq!(path, store.base_dir().join("passwd.png"));
        assert!(path.exists());
    }

    #[test]
    fn save_upload_rejects_empty_name() {
        let (_dir, store) = store();
        assert!(store.save_upload("", b"data").is_err());
        assert!(store.save_upload("..", b"data").is_err());
    }

    #[test]
    fn find_missing_file_is_not_found() {
        let (_dir, store) = store();
        let err = store.find("nothing.png").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn list_files_skips_subdirectories() {
        let (_dir, store) = store();
        store.save_upload("a.png", b"a").unwrap();
        store.save_upload("b.png", b"b").unwrap();
        std::fs::create_dir(store.base_dir().join("nested")).unwrap();

        let files = store.list_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn zip_all_contains_exactly_current_files() {
        let (dir, store) = store();
        store.save_upload("one.png", b"1").unwrap();
        store.save_upload("two.png", b"22").unwrap();

        let zip_path = dir.path().join("all.zip");
        store.zip_all(&zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["one.png", "two.png"]);

        let mut contents = String::new();
        archive
            .by_name("two.png")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "22");
    }
}
