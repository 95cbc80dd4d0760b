//! # build-gh-pages
//!
//! Publishes a static site directory for serving under a project sub-path,
//! as static hosts do for sites named after a repository.
//!
//! The input tree is copied to the output directory, then every selected file
//! has its root-relative references (`"/style.css"`, `url(/img/a.png)`) prefixed
//! with the configured root, e.g. `"/project-name/style.css"`.
//!
//! ## Usage
//!
//! ```ignore
//! use build_gh_pages::publisher::publish;
//! use build_gh_pages::rewriter::rewrite_files;
//! use build_gh_pages::scanner::collect_candidates;
//!
//! let tree = publish(&config)?;
//! let files = collect_candidates(&tree.root, &config.extensions)?;
//! let summary = rewrite_files(&files, &config.root_prefix, |_| {});
//! ```

/// CLI configuration and argument parsing
pub mod config;

/// Recursive tree copy and removal
pub mod copier;

/// Error types for publishing operations
pub mod error;

/// Output directory preparation
pub mod publisher;

/// Root-relative path rewriting
pub mod rewriter;

/// Candidate file selection
pub mod scanner;
