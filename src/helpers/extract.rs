//! Archive extraction
//!
//! Unpacks the downloaded source archive into the working directory using
//! native Rust readers. Entries that would land outside the destination are
//! rejected rather than skipped: a source archive with such entries is not
//! something we want to stage headers from.

use crate::core::descriptor::ArchiveFormat;
use crate::core::error::{Result, StageError};
use crate::helpers::internal::progress;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path};

fn extract_err(archive: &Path, reason: impl Into<String>) -> StageError {
    StageError::Extract {
        archive: archive.to_path_buf(),
        reason: reason.into(),
    }
}

fn open(archive_path: &Path) -> Result<BufReader<File>> {
    let file = File::open(archive_path)
        .map_err(|e| StageError::io(format!("cannot open {}", archive_path.display()), e))?;
    Ok(BufReader::new(file))
}

/// Extract a zip archive, returning the number of files written.
fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize> {
    let mut archive = zip::ZipArchive::new(open(archive_path)?)
        .map_err(|e| extract_err(archive_path, format!("not a valid zip: {}", e)))?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extract_err(archive_path, format!("zip entry error: {}", e)))?;

        let rel = entry.enclosed_name().ok_or_else(|| {
            extract_err(
                archive_path,
                format!("entry escapes destination: {}", entry.name()),
            )
        })?;
        let outpath = dest.join(rel);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| {
                StageError::io(format!("cannot create directory {}", outpath.display()), e)
            })?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StageError::io(format!("cannot create directory {}", parent.display()), e)
            })?;
        }

        let mut outfile = File::create(&outpath)
            .map_err(|e| StageError::io(format!("cannot create {}", outpath.display()), e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| {
            extract_err(
                archive_path,
                format!("corrupt entry {}: {}", outpath.display(), e),
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode)).ok();
            }
        }

        files += 1;
    }

    Ok(files)
}

fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Extract a tar stream, returning the number of regular files written.
fn extract_tar<R: Read>(archive_path: &Path, reader: R, dest: &Path) -> Result<usize> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive
        .entries()
        .map_err(|e| extract_err(archive_path, format!("tar read error: {}", e)))?;

    let mut files = 0;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| extract_err(archive_path, format!("tar entry error: {}", e)))?;

        let path = entry
            .path()
            .map_err(|e| extract_err(archive_path, format!("tar path error: {}", e)))?
            .into_owned();

        // GitHub tarballs carry a pax_global_header with the commit id.
        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::XGlobalHeader {
            continue;
        }

        if !is_contained(&path) {
            return Err(extract_err(
                archive_path,
                format!("entry escapes destination: {}", path.display()),
            ));
        }

        if entry_type.is_symlink() || entry_type.is_hard_link() {
            let target = entry
                .link_name()
                .map_err(|e| extract_err(archive_path, format!("tar link error: {}", e)))?
                .ok_or_else(|| {
                    extract_err(archive_path, format!("link without target: {}", path.display()))
                })?;
            if !is_contained(&target) {
                return Err(extract_err(
                    archive_path,
                    format!(
                        "unsafe link target: {} -> {}",
                        path.display(),
                        target.display()
                    ),
                ));
            }
        }

        let unpacked = entry.unpack_in(dest).map_err(|e| {
            extract_err(archive_path, format!("unpack error for {}: {}", path.display(), e))
        })?;
        if unpacked && entry_type.is_file() {
            files += 1;
        }
    }

    Ok(files)
}

fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<usize> {
    let decoder = flate2::read::GzDecoder::new(open(archive_path)?);
    extract_tar(archive_path, decoder, dest)
}

/// Extract `archive_path` into `dest`, creating `dest` if needed.
///
/// Returns the number of files written.
pub fn extract(archive_path: &Path, dest: &Path, format: ArchiveFormat) -> Result<usize> {
    std::fs::create_dir_all(dest)
        .map_err(|e| StageError::io(format!("cannot create directory {}", dest.display()), e))?;

    let filename = archive_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    let pb = progress::create_spinner(&format!("extracting {}", filename));
    let result = match format {
        ArchiveFormat::Zip => extract_zip(archive_path, dest),
        ArchiveFormat::TarGz => extract_tar_gz(archive_path, dest),
    };
    pb.finish_and_clear();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_zip_nested() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("1.2.1.zip");
        let extract_dir = temp_dir.path().join("work");

        write_zip(
            &archive_path,
            &[
                ("transwarp-1.2.1/src/transwarp.h", "#pragma once"),
                ("transwarp-1.2.1/README.md", "readme"),
            ],
        );

        let files = extract(&archive_path, &extract_dir, ArchiveFormat::Zip).unwrap();
        assert_eq!(files, 2);
        assert_eq!(
            std::fs::read_to_string(extract_dir.join("transwarp-1.2.1/src/transwarp.h")).unwrap(),
            "#pragma once"
        );
    }

    #[test]
    fn test_extract_zip_with_directory_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("dirs.zip");
        let extract_dir = temp_dir.path().join("work");

        let file = File::create(&archive_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        zip.add_directory("pkg-1.0/include/", options).unwrap();
        zip.start_file("pkg-1.0/include/pkg.h", options).unwrap();
        zip.write_all(b"int x;").unwrap();
        zip.finish().unwrap();

        extract(&archive_path, &extract_dir, ArchiveFormat::Zip).unwrap();
        assert!(extract_dir.join("pkg-1.0/include").is_dir());
        assert!(extract_dir.join("pkg-1.0/include/pkg.h").is_file());
    }

    #[test]
    fn test_extract_corrupt_zip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("bad.zip");
        std::fs::write(&archive_path, b"this is not a zip file").unwrap();

        let err = extract(&archive_path, temp_dir.path(), ArchiveFormat::Zip).unwrap_err();
        assert!(matches!(err, StageError::Extract { .. }), "got: {err}");
    }

    #[test]
    fn test_extract_zip_rejects_traversal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("evil.zip");
        let extract_dir = temp_dir.path().join("work");
        write_zip(&archive_path, &[("../evil.h", "pwned")]);

        let err = extract(&archive_path, &extract_dir, ArchiveFormat::Zip).unwrap_err();
        assert!(err.to_string().contains("escapes destination"));
        assert!(!temp_dir.path().join("evil.h").exists());
    }

    #[test]
    fn test_extract_tar_gz() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("2.2.2.tar.gz");
        let extract_dir = temp_dir.path().join("work");

        let file = File::create(&archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let content = b"#pragma once";
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "transwarp-2.2.2/include/transwarp.h", &content[..])
            .unwrap();
        let encoder = builder.into_inner().unwrap();
        encoder.finish().unwrap();

        let files = extract(&archive_path, &extract_dir, ArchiveFormat::TarGz).unwrap();
        assert_eq!(files, 1);
        assert!(extract_dir.join("transwarp-2.2.2/include/transwarp.h").exists());
    }

    #[test]
    fn test_extract_tar_blocks_absolute_symlink() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("escape.tar.gz");
        let extract_dir = temp_dir.path().join("work");

        let file = File::create(&archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut link_header = tar::Header::new_gnu();
        link_header.set_entry_type(tar::EntryType::Symlink);
        link_header.set_size(0);
        link_header.set_mode(0o777);
        link_header.set_link_name("/").unwrap();
        link_header.set_cksum();
        builder
            .append_data(&mut link_header, "a", std::io::empty())
            .unwrap();
        let encoder = builder.into_inner().unwrap();
        encoder.finish().unwrap();

        let err = extract(&archive_path, &extract_dir, ArchiveFormat::TarGz).unwrap_err();
        assert!(err.to_string().contains("unsafe link target"), "got: {err}");
    }

    #[test]
    fn test_extract_corrupt_tar_gz() {
        let temp_dir = tempfile::tempdir().unwrap();
        let archive_path = temp_dir.path().join("bad.tar.gz");
        std::fs::write(&archive_path, b"definitely not gzip").unwrap();

        let err = extract(&archive_path, temp_dir.path(), ArchiveFormat::TarGz).unwrap_err();
        assert!(matches!(err, StageError::Extract { .. }), "got: {err}");
    }
}
