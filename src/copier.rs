use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::PublishError;

/// ENOSPC on Unix
const DISK_FULL: i32 = 28;

/// Copy a single file from src to dst
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, PublishError> {
    // Create parent directory if needed
    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            create_dir(parent)?;
        }
    }

    fs::copy(src, dst).map_err(|e| {
        if e.raw_os_error() == Some(DISK_FULL) {
            return PublishError::DiskFull {
                path: dst.to_path_buf(),
            };
        }
        PublishError::CopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source: e,
        }
    })
}

fn create_dir(path: &Path) -> Result<(), PublishError> {
    fs::create_dir_all(path).map_err(|e| {
        if e.raw_os_error() == Some(DISK_FULL) {
            return PublishError::DiskFull {
                path: path.to_path_buf(),
            };
        }
        PublishError::CreateDirFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Copy directory recursively, returns (files_copied, bytes_copied)
///
/// Directories are recreated even when empty. Symlinks are followed, so the
/// destination holds plain copies of their targets.
pub fn copy_directory(src: &Path, dst: &Path) -> Result<(u64, u64), PublishError> {
    let mut files_copied = 0u64;
    let mut bytes_copied = 0u64;

    create_dir(dst)?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry?;
        let src_path = entry.path();
        let relative = src_path.strip_prefix(src).unwrap_or(src_path);
        let dst_path = dst.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&dst_path)?;
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let bytes = copy_file(src_path, &dst_path)?;
        files_copied += 1;
        bytes_copied += bytes;
    }

    Ok((files_copied, bytes_copied))
}

/// Remove whatever sits at `path`, a directory tree or a single file
pub fn remove_existing(path: &Path) -> Result<(), PublishError> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    };

    result.map_err(|e| PublishError::RemoveFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
