//! Directory trees as an enumerable capability
//!
//! The packer never touches `std::fs` directly: it consumes a [`TreeSource`],
//! which yields entries in a stable order and opens file contents on demand.
//! [`FsTree`] walks a real directory with `walkdir`; [`MemoryTree`] is an
//! in-memory tree for hosts that assemble artifacts without a filesystem.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A path below the tree root and its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// `/`-separated path relative to the root, without a trailing slash
    pub relative_path: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn file(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Entry name inside a zip archive; directories carry a trailing `/`
    pub fn archive_name(&self) -> String {
        match self.kind {
            EntryKind::Directory => format!("{}/", self.relative_path),
            EntryKind::File => self.relative_path.clone(),
        }
    }

    /// True if this entry or any of its ancestors has a name starting with `.`
    pub fn is_hidden(&self) -> bool {
        self.relative_path
            .split('/')
            .any(|segment| segment.starts_with('.'))
    }
}

/// Enumerates a directory tree and opens its files
pub trait TreeSource {
    /// Entries below the root in traversal order; parents precede children.
    /// The root itself is never yielded.
    fn entries(&self) -> Box<dyn Iterator<Item = Result<TreeEntry>> + '_>;

    /// Open the content of the file entry at `relative_path`
    fn open(&self, relative_path: &str) -> Result<Box<dyn Read + '_>>;
}

/// A directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
    include_hidden: bool,
}

impl FsTree {
    /// Tree rooted at `root`. Hidden entries and everything below them are skipped.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_hidden: false,
        }
    }

    pub fn include_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn to_entry(&self, dent: &DirEntry) -> Result<TreeEntry> {
        let relative = dent.path().strip_prefix(&self.root).map_err(|_| {
            invalid_data(format!(
                "{} is not below {}",
                dent.path().display(),
                self.root.display()
            ))
        })?;
        let relative_path = relative_to_slash(relative)?;
        // Follows symlinks, so a link to a directory is packed as an empty directory
        if dent.path().is_dir() {
            Ok(TreeEntry::directory(relative_path))
        } else {
            Ok(TreeEntry::file(relative_path))
        }
    }
}

fn is_hidden(dent: &DirEntry) -> bool {
    dent.file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Entry name for `relative` with `/` separators; names that cannot be
/// represented in an archive are reported as unreadable tree data.
fn relative_to_slash(relative: &Path) -> Result<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str().ok_or_else(|| {
                invalid_data(format!("non UTF-8 path: {}", relative.display()))
            })?),
            other => {
                return Err(invalid_data(format!(
                    "unexpected path component {:?} in {}",
                    other,
                    relative.display()
                )))
            }
        }
    }
    Ok(segments.join("/"))
}

fn invalid_data(message: String) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, message))
}

impl TreeSource for FsTree {
    fn entries(&self) -> Box<dyn Iterator<Item = Result<TreeEntry>> + '_> {
        let include_hidden = self.include_hidden;
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |dent| include_hidden || !is_hidden(dent))
            .map(move |dent| {
                let dent = dent.map_err(|e| Error::Io(e.into()))?;
                self.to_entry(&dent)
            });
        Box::new(walker)
    }

    fn open(&self, relative_path: &str) -> Result<Box<dyn Read + '_>> {
        let file = File::open(self.root.join(relative_path))?;
        Ok(Box::new(file))
    }
}

/// An in-memory tree keyed by relative path
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    // None marks a directory
    nodes: BTreeMap<String, Option<Vec<u8>>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory, creating missing ancestors
    pub fn with_dir(mut self, relative_path: &str) -> Self {
        self.add_ancestors(relative_path);
        self.nodes.insert(relative_path.to_string(), None);
        self
    }

    /// Add a file, creating missing ancestor directories
    pub fn with_file(mut self, relative_path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.add_ancestors(relative_path);
        self.nodes
            .insert(relative_path.to_string(), Some(content.into()));
        self
    }

    fn add_ancestors(&mut self, relative_path: &str) {
        let mut end = 0;
        while let Some(pos) = relative_path[end..].find('/') {
            end += pos;
            self.nodes
                .entry(relative_path[..end].to_string())
                .or_insert(None);
            end += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl TreeSource for MemoryTree {
    fn entries(&self) -> Box<dyn Iterator<Item = Result<TreeEntry>> + '_> {
        // BTreeMap order puts "a" before "a/b", so parents precede children
        Box::new(self.nodes.iter().map(|(path, node)| {
            Ok(match node {
                Some(_) => TreeEntry::file(path.clone()),
                None => TreeEntry::directory(path.clone()),
            })
        }))
    }

    fn open(&self, relative_path: &str) -> Result<Box<dyn Read + '_>> {
        match self.nodes.get(relative_path) {
            Some(Some(content)) => Ok(Box::new(Cursor::new(content.as_slice()))),
            Some(None) => Err(Error::invalid_argument(format!(
                "{relative_path} is a directory"
            ))),
            None => Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{relative_path} not found in tree"),
            ))),
        }
    }
}
