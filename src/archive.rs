/// Archive extraction for files relocated into the archives folder.
///
/// Zip archives unpack into a sibling directory named after the archive's
/// stem. Tar-family archives (`.tar`, `.tar.gz`, `.tgz`, `.gz`) unpack
/// directly into the archive's parent directory. Failures are returned as
/// [`ExtractError`] values and never abort a sorting run.
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

/// Archive formats the extractor knows how to unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.tar`, `.tar.gz`, `.tgz` and `.gz`
    Tar,
}

impl ArchiveFormat {
    /// Detects the format from the file name suffix, ignoring ASCII case.
    ///
    /// ```
    /// use clean_folder::archive::ArchiveFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(ArchiveFormat::from_path(Path::new("a.ZIP")), Some(ArchiveFormat::Zip));
    /// assert_eq!(ArchiveFormat::from_path(Path::new("a.tar.gz")), Some(ArchiveFormat::Tar));
    /// assert_eq!(ArchiveFormat::from_path(Path::new("a.rar")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<ArchiveFormat> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if [".tar", ".tar.gz", ".tgz", ".gz"]
            .iter()
            .any(|suffix| name.ends_with(suffix))
        {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }
}

/// Errors that can occur while extracting an archive.
#[derive(Debug)]
pub enum ExtractError {
    /// The archive's suffix is not one the extractor supports.
    Unsupported { path: PathBuf },
    /// Reading the archive or writing its contents failed.
    Io { path: PathBuf, source: io::Error },
    /// The zip container is corrupt or uses an unsupported feature.
    Zip { path: PathBuf, source: ZipError },
    /// An entry name is not valid UTF-8 or would escape the target directory.
    InvalidEntry { path: PathBuf, entry: String },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported { path } => {
                write!(f, "Unsupported archive type: {}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Could not extract {}: {}", path.display(), source)
            }
            Self::Zip { path, source } => {
                write!(f, "Could not read zip archive {}: {}", path.display(), source)
            }
            Self::InvalidEntry { path, entry } => {
                write!(
                    f,
                    "Archive {} contains an invalid entry name: {}",
                    path.display(),
                    entry
                )
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Zip { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Extracts an archive next to itself.
///
/// Returns the directory the contents were written to: `<parent>/<stem>` for
/// zip archives, `<parent>` for tar-family archives. The archive file itself
/// is never removed here.
///
/// # Examples
///
/// ```no_run
/// use clean_folder::archive;
/// use std::path::Path;
///
/// match archive::extract(Path::new("/data/archives/photos.zip")) {
///     Ok(dir) => println!("Extracted into {}", dir.display()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn extract(archive_path: &Path) -> Result<PathBuf, ExtractError> {
    match ArchiveFormat::from_path(archive_path) {
        Some(ArchiveFormat::Zip) => extract_zip(archive_path),
        Some(ArchiveFormat::Tar) => extract_tar(archive_path),
        None => Err(ExtractError::Unsupported {
            path: archive_path.to_path_buf(),
        }),
    }
}

/// Returns the sibling directory a zip archive unpacks into.
pub fn extraction_dir(archive_path: &Path) -> PathBuf {
    let parent = archive_path.parent().unwrap_or_else(|| Path::new(""));
    match archive_path.file_stem() {
        Some(stem) => parent.join(stem),
        None => parent.to_path_buf(),
    }
}

fn extract_zip(archive_path: &Path) -> Result<PathBuf, ExtractError> {
    let target = extraction_dir(archive_path);
    let created = !target.exists();
    fs::create_dir_all(&target).map_err(|e| ExtractError::Io {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    match unpack_zip(archive_path, &target) {
        Ok(()) => Ok(target),
        Err(e) => {
            // Only remove what this call created; an existing folder may hold
            // the output of an earlier run.
            if created {
                let _ = fs::remove_dir_all(&target);
            }
            Err(e)
        }
    }
}

fn unpack_zip(archive_path: &Path, target: &Path) -> Result<(), ExtractError> {
    let io_err = |e: io::Error| ExtractError::Io {
        path: archive_path.to_path_buf(),
        source: e,
    };
    let zip_err = |e: ZipError| ExtractError::Zip {
        path: archive_path.to_path_buf(),
        source: e,
    };

    let file = File::open(archive_path).map_err(io_err)?;
    let mut archive = ZipArchive::new(file).map_err(zip_err)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_err)?;

        let name = std::str::from_utf8(entry.name_raw())
            .map_err(|_| ExtractError::InvalidEntry {
                path: archive_path.to_path_buf(),
                entry: String::from_utf8_lossy(entry.name_raw()).into_owned(),
            })?
            .to_string();
        let relative = enclosed_path(&name).ok_or_else(|| ExtractError::InvalidEntry {
            path: archive_path.to_path_buf(),
            entry: name.clone(),
        })?;
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(io_err)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut out = File::create(&out_path).map_err(io_err)?;
        io::copy(&mut entry, &mut out).map_err(io_err)?;
    }

    Ok(())
}

/// Turns an entry name into a relative path that stays inside the target.
fn enclosed_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(path)
}

fn extract_tar(archive_path: &Path) -> Result<PathBuf, ExtractError> {
    let io_err = |e: io::Error| ExtractError::Io {
        path: archive_path.to_path_buf(),
        source: e,
    };
    let target = archive_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .to_path_buf();

    // `.tar` files may still be gzip-compressed, so trust the magic bytes
    // rather than the name.
    let gzipped = infer::get_from_path(archive_path)
        .map_err(io_err)?
        .is_some_and(|kind| kind.mime_type() == "application/gzip");

    let file = File::open(archive_path).map_err(io_err)?;
    if gzipped {
        tar::Archive::new(GzDecoder::new(file))
            .unpack(&target)
            .map_err(io_err)?;
    } else {
        tar::Archive::new(file).unpack(&target).map_err(io_err)?;
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).expect("Failed to create zip");
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("Failed to start zip entry");
            writer
                .write_all(content.as_bytes())
                .expect("Failed to write zip entry");
        }
        writer.finish().expect("Failed to finish zip");
    }

    fn tar_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .expect("Failed to append tar entry");
        }
        builder.into_inner().expect("Failed to finish tar")
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).expect("Failed to gzip");
        encoder.finish().expect("Failed to finish gzip")
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ArchiveFormat::from_path(Path::new("x.zip")), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_path(Path::new("x.tar")), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::from_path(Path::new("x.tgz")), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::from_path(Path::new("x.gz")), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::from_path(Path::new("x.TAR.GZ")), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::from_path(Path::new("x.rar")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("zip")), None);
    }

    #[test]
    fn test_extraction_dir_is_named_after_stem() {
        assert_eq!(
            extraction_dir(Path::new("/base/archives/photos.zip")),
            PathBuf::from("/base/archives/photos")
        );
    }

    #[test]
    fn test_zip_extracts_into_stem_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("bundle.zip");
        write_zip(&archive_path, &[("a.txt", "alpha"), ("nested/b.txt", "beta")]);

        let out = extract(&archive_path).expect("Extraction should succeed");

        assert_eq!(out, temp_dir.path().join("bundle"));
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(out.join("nested/b.txt")).unwrap(), "beta");
        assert!(archive_path.exists(), "Extractor must not delete the archive");
    }

    #[test]
    fn test_zip_keeps_utf8_entry_names() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("docs.zip");
        write_zip(&archive_path, &[("Звіт.txt", "report")]);

        let out = extract(&archive_path).expect("Extraction should succeed");

        assert!(out.join("Звіт.txt").exists());
    }

    #[test]
    fn test_tar_gz_extracts_flat_into_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("data.tar.gz");
        fs::write(&archive_path, gzip(&tar_bytes(&[("b.csv", "1,2,3")]))).unwrap();

        let out = extract(&archive_path).expect("Extraction should succeed");

        assert_eq!(out, temp_dir.path());
        assert_eq!(fs::read_to_string(temp_dir.path().join("b.csv")).unwrap(), "1,2,3");
        assert!(!temp_dir.path().join("data.tar").exists());
    }

    #[test]
    fn test_plain_tar_extracts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("plain.tar");
        fs::write(&archive_path, tar_bytes(&[("c.txt", "gamma")])).unwrap();

        extract(&archive_path).expect("Extraction should succeed");

        assert!(temp_dir.path().join("c.txt").exists());
    }

    #[test]
    fn test_corrupt_zip_fails_and_cleans_up() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("broken.zip");
        fs::write(&archive_path, b"definitely not a zip archive").unwrap();

        let result = extract(&archive_path);

        assert!(matches!(result, Err(ExtractError::Zip { .. })));
        assert!(!temp_dir.path().join("broken").exists());
        assert!(archive_path.exists());
    }

    #[test]
    fn test_corrupt_gz_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("broken.tgz");
        fs::write(&archive_path, gzip(b"this is not a tar stream at all, just text")).unwrap();

        assert!(matches!(extract(&archive_path), Err(ExtractError::Io { .. })));
    }

    #[test]
    fn test_unsupported_format_leaves_no_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("music.rar");
        fs::write(&archive_path, b"Rar!").unwrap();

        let result = extract(&archive_path);

        assert!(matches!(result, Err(ExtractError::Unsupported { .. })));
        assert!(!temp_dir.path().join("music").exists());
    }

    #[test]
    fn test_failed_extraction_keeps_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let existing = temp_dir.path().join("broken");
        fs::create_dir(&existing).unwrap();
        fs::write(existing.join("keep.txt"), "from an earlier run").unwrap();
        let archive_path = temp_dir.path().join("broken.zip");
        fs::write(&archive_path, b"garbage").unwrap();

        assert!(extract(&archive_path).is_err());
        assert!(existing.join("keep.txt").exists());
    }

    #[test]
    fn test_enclosed_path_rejects_escapes() {
        assert_eq!(enclosed_path("a/b.txt"), Some(PathBuf::from("a/b.txt")));
        assert_eq!(enclosed_path("./a.txt"), Some(PathBuf::from("a.txt")));
        assert_eq!(enclosed_path("../evil.txt"), None);
        assert_eq!(enclosed_path("/etc/passwd"), None);
    }
}
