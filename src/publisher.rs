//! Produces the working tree the rewriter mutates.
//!
//! The output directory is always a fresh copy of the input, except when it
//! already exists and `--no-copy` was given; then the input itself is rewritten.

use std::path::PathBuf;

use crate::config::Config;
use crate::copier::{copy_directory, remove_existing};
use crate::error::PublishError;

/// What happened to the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    /// Output did not exist and was copied from the input
    Copied,
    /// Output existed, was removed and copied afresh
    Replaced,
    /// Output existed and was left alone; the input is the working tree
    Reused,
}

/// The directory tree the rewriter operates on
#[derive(Debug, Clone)]
pub struct WorkingTree {
    pub root: PathBuf,
    pub action: PublishAction,
    pub files_copied: u64,
    pub bytes_copied: u64,
}

/// Copy (or reuse) the input directory as the working tree.
///
/// Filesystem errors are fatal and a partially written output is not cleaned up.
pub fn publish(config: &Config) -> Result<WorkingTree, PublishError> {
    let action = if config.output_dir.exists() {
        log::info!("Output directory already exists");
        if config.no_copy {
            log::info!("No copy created since used --no-copy");
            return Ok(WorkingTree {
                root: config.input_dir.clone(),
                action: PublishAction::Reused,
                files_copied: 0,
                bytes_copied: 0,
            });
        }

        log::info!("Removing dir {}", config.output_dir.display());
        remove_existing(&config.output_dir)?;
        PublishAction::Replaced
    } else {
        PublishAction::Copied
    };

    log::info!(
        "Copying dir {} as {}",
        config.input_dir.display(),
        config.output_dir.display()
    );
    let (files_copied, bytes_copied) = copy_directory(&config.input_dir, &config.output_dir)?;
    log::debug!("Copied {files_copied} files ({bytes_copied} bytes)");

    Ok(WorkingTree {
        root: config.output_dir.clone(),
        action,
        files_copied,
        bytes_copied,
    })
}
