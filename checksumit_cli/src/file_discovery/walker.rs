//! Directory walker for file discovery
//!
//! Streams directory entries with walkdir, in file name order, applying the
//! include and exclude filter to each regular file.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{DiscoveredFile, DiscoveryError, Result, filter::PathFilter};

/// Options for file discovery
#[derive(Debug, Clone, Default)]
pub struct FileDiscoveryOptions {
    /// Patterns to include (glob patterns)
    pub include_patterns: Vec<String>,
    /// Patterns to exclude (glob patterns, override includes)
    pub exclude_patterns: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Follow symbolic links
    pub follow_links: bool,
    /// Maximum depth for recursive search (None = unlimited)
    pub max_depth: Option<usize>,
}

impl FileDiscoveryOptions {
    /// Create new options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add include patterns
    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    /// Add exclude patterns
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Set recursive processing
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set whether to follow symbolic links
    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum depth for recursive search
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }
}

/// File discovery iterator over one directory
pub struct FileDiscovery {
    /// Walker for directory traversal
    walker: Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>,
    /// Directory being expanded; patterns see paths relative to it
    root: PathBuf,
    filter: PathFilter,
}

impl FileDiscovery {
    /// Create a new file discovery iterator
    pub fn new(path: &Path, options: &FileDiscoveryOptions) -> Result<Self> {
        if !path.exists() {
            return Err(DiscoveryError::PathNotFound(path.to_path_buf()));
        }

        let filter = PathFilter::new(&options.include_patterns, &options.exclude_patterns)?;

        let mut walker = WalkDir::new(path)
            .follow_links(options.follow_links)
            .sort_by_file_name();

        if !options.recursive {
            walker = walker.max_depth(1);
        } else if let Some(depth) = options.max_depth {
            walker = walker.max_depth(depth);
        }

        Ok(Self {
            walker: Box::new(walker.into_iter()),
            root: path.to_path_buf(),
            filter,
        })
    }

    /// Check if an entry is a file we should include
    fn should_include_entry(&self, entry: &DirEntry) -> bool {
        let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
        entry.file_type().is_file() && self.filter.admits(relative)
    }
}

impl Iterator for FileDiscovery {
    type Item = Result<DiscoveredFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walker.next()? {
                Ok(entry) => {
                    if !self.should_include_entry(&entry) {
                        continue;
                    }
                    match entry.metadata() {
                        Ok(metadata) => {
                            return Some(Ok(DiscoveredFile {
                                path: entry.path().to_path_buf(),
                                size: metadata.len(),
                            }));
                        }
                        Err(e) => {
                            log::warn!("Failed to read metadata for {:?}: {}", entry.path(), e);
                            continue;
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Walk error: {e}");
                    continue;
                }
            }
        }
    }
}

/// Expand command line paths into the files to hash, preserving argument order
///
/// Directories are walked; anything else is returned as given.
pub fn expand_paths(paths: &[PathBuf], options: &FileDiscoveryOptions) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let before = files.len();
            for discovered in FileDiscovery::new(path, options)? {
                files.push(discovered?.path);
            }
            log::debug!(
                "Discovered {} file(s) under {}",
                files.len() - before,
                path.display()
            );
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}
