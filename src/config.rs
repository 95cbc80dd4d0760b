//! CLI configuration and runtime settings for publishing a site.

use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::PublishError;
use crate::scanner::ExtensionFilter;

/// Publish a static site for serving under a project sub-path
#[derive(Parser, Debug)]
#[command(name = "build-gh-pages")]
#[command(version)]
#[command(about = "Publish a static site for serving under a project sub-path")]
pub struct Cli {
    /// Static site directory to publish
    pub input_dir: PathBuf,

    /// Deployment directory (replaced on every run unless --no-copy is set)
    pub output_dir: PathBuf,

    /// Text substituted for root-relative slashes (e.g. "/project-name/")
    #[arg(long, value_name = "PREFIX", allow_hyphen_values = true)]
    pub root_prefix: String,

    /// Only rewrite files with these extensions (repeatable, e.g. --replace-in html css).
    /// Takes every value up to the next option, so give it after the directories
    #[arg(long = "replace-in", value_name = "EXT", num_args = 1..)]
    pub replace_in: Vec<String>,

    /// Rewrite the input directory in place when the output directory already exists
    #[arg(long)]
    pub no_copy: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Option as the command line sees it: its names and whether a value follows
struct KnownOption {
    long: Option<String>,
    short: Option<char>,
    takes_value: bool,
}

/// Split raw arguments into those `Cli` understands and unrecognized options.
///
/// An unrecognized option is dropped along with the plain values after it, up to
/// the next recognized option, so `--force yes` goes away as a unit. Everything
/// after `--` is kept verbatim.
pub fn split_unknown_options<I, T>(args: I) -> (Vec<OsString>, Vec<OsString>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut cmd = Cli::command();
    cmd.build();
    let known: Vec<KnownOption> = cmd
        .get_arguments()
        .filter(|arg| !arg.is_positional())
        .map(|arg| KnownOption {
            long: arg.get_long().map(str::to_string),
            short: arg.get_short(),
            takes_value: arg.get_action().takes_values(),
        })
        .collect();

    let mut kept = Vec::new();
    let mut ignored = Vec::new();
    let mut args = args.into_iter().map(Into::into);
    if let Some(bin) = args.next() {
        kept.push(bin);
    }

    let mut skipping = false;
    let mut expects_value = false;
    while let Some(arg) = args.next() {
        if expects_value {
            expects_value = false;
            kept.push(arg);
            continue;
        }

        let text = arg.to_string_lossy().into_owned();
        if text == "--" {
            kept.push(arg);
            kept.extend(args.by_ref());
            break;
        }

        if text.len() > 1 && text.starts_with('-') {
            match classify_option(&known, &text) {
                Some(needs_value) => {
                    skipping = false;
                    expects_value = needs_value;
                    kept.push(arg);
                }
                None => {
                    skipping = true;
                    ignored.push(arg);
                }
            }
        } else if skipping {
            ignored.push(arg);
        } else {
            kept.push(arg);
        }
    }

    (kept, ignored)
}

/// `Some(needs_separate_value)` for a recognized option, `None` otherwise
fn classify_option(known: &[KnownOption], text: &str) -> Option<bool> {
    if let Some(long) = text.strip_prefix("--") {
        let (name, inline_value) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        let option = known.iter().find(|o| o.long.as_deref() == Some(name))?;
        return Some(option.takes_value && !inline_value);
    }

    let shorts = text.strip_prefix('-')?;
    for (idx, c) in shorts.char_indices() {
        let option = known.iter().find(|o| o.short == Some(c))?;
        if option.takes_value {
            // The rest of the token, if any, is the value
            return Some(idx + c.len_utf8() == shorts.len());
        }
    }
    Some(false)
}

/// Runtime configuration parsed from CLI
#[derive(Debug, Clone)]
pub struct Config {
    /// Site directory to publish
    pub input_dir: PathBuf,
    /// Deployment directory
    pub output_dir: PathBuf,
    /// Replacement for every qualifying `/`
    pub root_prefix: String,
    /// Files eligible for rewriting (empty = all files)
    pub extensions: ExtensionFilter,
    /// Reuse the input directory when the output already exists
    pub no_copy: bool,
    /// Enable verbose output
    pub verbose: bool,
}

impl Config {
    /// Create Config from CLI arguments
    ///
    /// Every check here runs before the filesystem is touched, so a failure
    /// leaves both trees as they were.
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        if !cli.input_dir.is_dir() {
            return Err(PublishError::InputNotDirectory {
                path: cli.input_dir,
            }
            .into());
        }

        if cli.root_prefix.is_empty() {
            return Err(PublishError::EmptyRootPrefix.into());
        }

        let input_dir = cli.input_dir.canonicalize().unwrap_or(cli.input_dir);
        check_output_location(&input_dir, &cli.output_dir, cli.no_copy)?;

        Ok(Config {
            input_dir,
            output_dir: cli.output_dir,
            root_prefix: cli.root_prefix,
            extensions: ExtensionFilter::from_args(&cli.replace_in),
            no_copy: cli.no_copy,
            verbose: cli.verbose,
        })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input dir: {}", self.input_dir.display())?;
        writeln!(f, "Out dir: {}", self.output_dir.display())?;
        write!(f, "Prefix: {}", self.root_prefix)?;
        if !self.extensions.is_empty() {
            write!(f, "\nExtensions: {}", self.extensions)?;
        }
        Ok(())
    }
}

/// Reject output locations that would make the copy destroy or swallow the input
fn check_output_location(input: &Path, output: &Path, no_copy: bool) -> Result<(), PublishError> {
    // With --no-copy an existing output is never written, wherever it lives
    if no_copy && output.exists() {
        return Ok(());
    }

    let resolved = resolve_path(output);
    if resolved == input {
        return Err(PublishError::OutputIsInput {
            path: output.to_path_buf(),
        });
    }

    if resolved.starts_with(input) {
        return Err(PublishError::OutputInsideInput {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
    }

    // Wiping the output would take the input with it
    if input.starts_with(&resolved) {
        return Err(PublishError::OutputContainsInput {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
    }

    Ok(())
}

/// Canonicalize a path that may not exist yet via its nearest existing ancestor
fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve_path(parent).join(name)
        }
        (_, Some(name)) => std::env::current_dir()
            .map(|cwd| cwd.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}
