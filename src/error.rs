use std::path::PathBuf;
use thiserror::Error;

/// Publishing error types
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Invalid input provided, not a directory: {path}")]
    InputNotDirectory { path: PathBuf },

    #[error("Root prefix must not be empty")]
    EmptyRootPrefix,

    #[error("Output directory {path} is the input directory; use --no-copy to rewrite it in place")]
    OutputIsInput { path: PathBuf },

    #[error("Output directory {output} is inside input directory {input}")]
    OutputInsideInput { input: PathBuf, output: PathBuf },

    #[error("Output directory {output} contains input directory {input}")]
    OutputContainsInput { input: PathBuf, output: PathBuf },

    #[error("Failed to remove {path}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory: {path}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {src} to {dst}")]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No space left on device for {path}")]
    DiskFull { path: PathBuf },

    #[error("Failed to walk directory tree")]
    Walk(#[from] walkdir::Error),

    #[error("Cannot open file {path}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create temp file next to {path}")]
    TempFileFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rewrite {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace {path} with rewritten content")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    /// Whether this error stems from bad user input rather than the filesystem
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            PublishError::InputNotDirectory { .. }
                | PublishError::EmptyRootPrefix
                | PublishError::OutputIsInput { .. }
                | PublishError::OutputInsideInput { .. }
                | PublishError::OutputContainsInput { .. }
        )
    }

    /// The message and its causes on one line, as anyhow's `{:#}` prints them
    pub fn chain_message(&self) -> String {
        anyhow::Chain::new(self)
            .map(|cause| cause.to_string())
            .collect::<Vec<_>>()
            .join(": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_classified() {
        assert!(PublishError::EmptyRootPrefix.is_usage());
        assert!(PublishError::InputNotDirectory {
            path: PathBuf::from("site")
        }
        .is_usage());
        assert!(PublishError::OutputContainsInput {
            input: PathBuf::from("work/site"),
            output: PathBuf::from("work"),
        }
        .is_usage());
        assert!(!PublishError::DiskFull {
            path: PathBuf::from("out")
        }
        .is_usage());
    }

    #[test]
    fn test_display_includes_path() {
        let err = PublishError::OpenFailed {
            path: PathBuf::from("out/index.html"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("out/index.html"));
    }

    #[test]
    fn test_chain_message_joins_sources() {
        let make = || PublishError::PersistFailed {
            path: PathBuf::from("out/index.html"),
            source: std::io::Error::other("disk on fire"),
        };
        let err = make();

        assert_eq!(err.chain_message(), format!("{:#}", anyhow::Error::from(make())));
        assert_eq!(
            err.chain_message(),
            "Failed to replace out/index.html with rewritten content: disk on fire"
        );
    }
}
