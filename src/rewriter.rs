//! Root-relative path rewriting.
//!
//! Files are rewritten line by line. A `/` is treated as the start of a
//! root-relative reference when the closest non-whitespace byte before it is
//! `(`, `'` or `"`, or when nothing but whitespace precedes it on the line.
//! Each such slash is replaced by the configured root prefix; every other byte
//! is copied through unchanged.
//!
//! The scan is not idempotent: running it twice re-prefixes references that
//! the first pass already rewrote.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::PublishError;

/// Bytes that open a path literal
const DELIMITERS: &[u8] = b"('\"";

/// Byte the start of a line stands in for
const LINE_START: u8 = b'(';

/// Whitespace as C's `isspace` classifies it, vertical tab included
#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Indices of every `/` in the line
pub fn slash_positions(line: &[u8]) -> impl Iterator<Item = usize> + '_ {
    line.iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'/')
        .map(|(pos, _)| pos)
}

/// The closest non-whitespace byte before `pos`, or `(` when the line holds
/// only whitespace up to `pos`
pub fn preceding_significant(line: &[u8], pos: usize) -> u8 {
    let mut idx = pos.min(line.len());
    while idx > 0 {
        idx -= 1;
        let b = line[idx];
        if !is_space(b) {
            return b;
        }
    }
    LINE_START
}

/// Whether the `/` at `pos` starts a root-relative reference
#[inline]
pub fn is_qualifying_slash(line: &[u8], pos: usize) -> bool {
    DELIMITERS.contains(&preceding_significant(line, pos))
}

/// Append `line` to `out` with every qualifying slash replaced by `prefix`.
///
/// Context is always read from the original line, so a prefix inserted for one
/// slash never influences the decision for the next. Returns the number of
/// replacements.
pub fn rewrite_line(line: &[u8], prefix: &[u8], out: &mut Vec<u8>) -> usize {
    let mut replaced = 0;
    let mut copied_up_to = 0;

    for pos in slash_positions(line) {
        if !is_qualifying_slash(line, pos) {
            continue;
        }
        out.extend_from_slice(&line[copied_up_to..pos]);
        out.extend_from_slice(prefix);
        copied_up_to = pos + 1;
        replaced += 1;
    }

    out.extend_from_slice(&line[copied_up_to..]);
    replaced
}

/// Rewrite every line from `reader` into `writer`, returning the replacement count.
///
/// Output lines always end in `\n`; a `\r\n` terminator is normalized to `\n`
/// and a missing final terminator is added.
pub fn rewrite_stream<R: BufRead, W: Write>(
    mut reader: R,
    writer: &mut W,
    prefix: &[u8],
) -> io::Result<u64> {
    let mut replaced = 0u64;
    let mut line = Vec::new();
    let mut rewritten = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        let mut content = line.as_slice();
        if let Some(stripped) = content.strip_suffix(b"\n") {
            content = stripped;
        }
        if let Some(stripped) = content.strip_suffix(b"\r") {
            content = stripped;
        }

        rewritten.clear();
        replaced += rewrite_line(content, prefix, &mut rewritten) as u64;
        rewritten.push(b'\n');
        writer.write_all(&rewritten)?;
    }

    Ok(replaced)
}

/// Rewrite a single file in place, returning the replacement count.
///
/// The new content is written to a temporary file in the same directory and
/// renamed over the original, so the original is either fully replaced or left
/// as it was. Every selected file comes out LF-normalized, replacements or not.
pub fn rewrite_file(path: &Path, prefix: &str) -> Result<u64, PublishError> {
    let source = File::open(path).map_err(|e| PublishError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let permissions = source
        .metadata()
        .map_err(|e| PublishError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?
        .permissions();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".build-gh-pages")
        .suffix(".temp")
        .tempfile_in(dir)
        .map_err(|e| PublishError::TempFileFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let write_failed = |e: io::Error| PublishError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let replaced = {
        let mut writer = BufWriter::new(temp.as_file_mut());
        let replaced = rewrite_stream(BufReader::new(source), &mut writer, prefix.as_bytes())
            .map_err(write_failed)?;
        writer.flush().map_err(write_failed)?;
        replaced
    };

    temp.as_file().sync_all().map_err(write_failed)?;
    temp.as_file().set_permissions(permissions).map_err(write_failed)?;
    temp.persist(path).map_err(|e| PublishError::PersistFailed {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(replaced)
}

/// Outcome of rewriting one file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: RewriteStatus,
}

#[derive(Debug)]
pub enum RewriteStatus {
    /// Content replaced, with the number of slashes rewritten
    Rewritten(u64),
    /// No qualifying slash; line endings still normalized
    NoMatches,
    /// Skipped because of an I/O error
    Failed(PublishError),
}

/// Totals across a batch of files
#[derive(Debug, Default)]
pub struct RewriteSummary {
    pub files_scanned: u64,
    pub files_rewritten: u64,
    pub replacements: u64,
    pub failures: Vec<FileOutcome>,
}

impl RewriteSummary {
    fn record(&mut self, outcome: FileOutcome) {
        self.files_scanned += 1;
        match outcome.status {
            RewriteStatus::Rewritten(count) => {
                self.files_rewritten += 1;
                self.replacements += count;
            }
            RewriteStatus::NoMatches => {}
            RewriteStatus::Failed(_) => self.failures.push(outcome),
        }
    }
}

/// Rewrite each file in turn. A failing file is recorded and skipped; it never
/// stops the batch. `on_file` sees every outcome as it happens.
pub fn rewrite_files<F>(files: &[PathBuf], prefix: &str, mut on_file: F) -> RewriteSummary
where
    F: FnMut(&FileOutcome),
{
    let mut summary = RewriteSummary::default();

    for path in files {
        log::debug!("Scanning file {}", path.display());

        let status = match rewrite_file(path, prefix) {
            Ok(0) => RewriteStatus::NoMatches,
            Ok(count) => RewriteStatus::Rewritten(count),
            Err(e) => RewriteStatus::Failed(e),
        };

        let outcome = FileOutcome {
            path: path.clone(),
            status,
        };
        on_file(&outcome);
        summary.record(outcome);
    }

    summary
}
