//! Site build: compile every source file under the posts directory to an
//! HTML file next to it.

use plainmark_config::Config;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Invalid posts directory {0}: directory does not exist")]
    InvalidPostsDir(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One compiled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltFile {
    /// Source path relative to the posts directory.
    pub source: PathBuf,
    /// Output path relative to the posts directory.
    pub output: PathBuf,
    /// Number of places where malformed markup was rendered literally.
    pub degradations: usize,
}

impl fmt::Display for BuiltFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.display(), self.output.display())
    }
}

pub fn validate_posts_dir(path: &Path) -> Result<(), SiteError> {
    if !path.is_dir() {
        return Err(SiteError::InvalidPostsDir(path.to_path_buf()));
    }
    Ok(())
}

/// Source files under `posts_dir` with the given extension, sorted.
pub fn scan_sources(posts_dir: &Path, extension: &str) -> Result<Vec<PathBuf>, SiteError> {
    validate_posts_dir(posts_dir)?;

    let mut files = Vec::new();
    scan_directory_recursive(posts_dir, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(
    dir: &Path,
    extension: &str,
    files: &mut Vec<PathBuf>,
) -> Result<(), SiteError> {
    let read_error = |source| SiteError::Read {
        path: dir.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, extension, files)?;
        } else if let Some(ext) = path.extension()
            && ext == extension
        {
            files.push(path);
        }
    }

    Ok(())
}

/// Compile one source file and write its output next to it.
pub fn build_file(path: &Path, config: &Config) -> Result<BuiltFile, SiteError> {
    let source = fs::read_to_string(path).map_err(|source| SiteError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (html, degradations) = plainmark_syntax::compile_with_diagnostics(&source);
    for degradation in &degradations {
        let line = line_number(&source, degradation.offset());
        log::warn!("{}:{line}: {degradation}", path.display());
    }

    let output_path = path.with_extension(config.output_extension.trim_start_matches('.'));
    fs::write(&output_path, html).map_err(|source| SiteError::Write {
        path: output_path.clone(),
        source,
    })?;
    log::debug!("wrote {}", output_path.display());

    let relative = |p: &Path| {
        p.strip_prefix(&config.posts_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| p.to_path_buf())
    };
    Ok(BuiltFile {
        source: relative(path),
        output: relative(&output_path),
        degradations: degradations.len(),
    })
}

/// Build every source file under the configured posts directory.
pub fn build_site(config: &Config) -> Result<Vec<BuiltFile>, SiteError> {
    let extension = config.source_extension.trim_start_matches('.');
    let sources = scan_sources(&config.posts_dir, extension)?;
    log::info!(
        "Building {} file(s) from {}",
        sources.len(),
        config.posts_dir.display()
    );

    sources.iter().map(|path| build_file(path, config)).collect()
}

/// 1-based line of a byte offset.
fn line_number(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
