//! Document store collaborators
//!
//! The engine only needs three things from a note store: folder lookup by
//! normalized path, a full-text read, and document identities that change
//! notifications can be compared against. `MemoryVault` serves tests and
//! embedders; `FsVault` backs the CLI over a directory on disk.

use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Extension of notes that can be tracked.
pub const NOTE_EXTENSION: &str = "md";

/// Identity of one document in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DocumentRef {
    /// Normalized vault-relative path, e.g. `Projects/Todo.md`
    pub path: String,
}

impl DocumentRef {
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
        }
    }

    /// File name with extension.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without its last extension.
    pub fn basename(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(dot) => &name[..dot],
        }
    }

    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => "",
            Some(dot) => &name[dot + 1..],
        }
    }

    /// Normalized path of the containing folder; `/` for the vault root.
    pub fn folder(&self) -> &str {
        match self.path.rfind('/') {
            Some(slash) => &self.path[..slash],
            None => "/",
        }
    }

    pub fn is_note(&self) -> bool {
        self.extension() == NOTE_EXTENSION
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// A folder and the files directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: String,
    pub children: Vec<DocumentRef>,
}

/// Read access to a note store.
pub trait DocumentStore {
    /// Look up a folder by normalized path.
    fn folder(&self, path: &str) -> Option<Folder>;

    /// Read the full text of a document.
    fn read(&self, document: &DocumentRef) -> Result<String>;
}

/// Normalize a vault-relative path: forward slashes, no duplicate,
/// leading or trailing slashes, non-breaking spaces turned into spaces.
/// The vault root normalizes to `/`.
pub fn normalize_path(path: &str) -> String {
    let cleaned = path.replace('\\', "/").replace(['\u{00A0}', '\u{202F}'], " ");
    let parts: Vec<&str> = cleaned
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    if parts.is_empty() {
        "/".to_string()
    } else {
        parts.join("/")
    }
}

/// Find the note named `<file_name>.md` among the folder's direct children.
/// The comparison is case-sensitive.
pub fn find_document(folder: &Folder, file_name: &str) -> Option<DocumentRef> {
    let wanted = format!("{file_name}.{NOTE_EXTENSION}");
    folder
        .children
        .iter()
        .find(|child| child.is_note() && child.name() == wanted)
        .cloned()
}

/// In-memory note store.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    documents: BTreeMap<String, String>,
    folders: HashSet<String>,
    unreadable: HashSet<String>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document, creating its parent folders.
    pub fn insert(&mut self, path: &str, text: impl Into<String>) -> DocumentRef {
        let document = DocumentRef::new(path);
        let mut folder = document.folder().to_string();
        self.folders.insert("/".to_string());
        while folder != "/" {
            self.folders.insert(folder.clone());
            match folder.rfind('/') {
                Some(slash) => folder.truncate(slash),
                None => break,
            }
        }
        self.documents.insert(document.path.clone(), text.into());
        document
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.documents.remove(&normalize_path(path))
    }

    /// Make reads of `path` fail while `unreadable` is set.
    pub fn set_unreadable(&mut self, path: &str, unreadable: bool) {
        let path = normalize_path(path);
        if unreadable {
            self.unreadable.insert(path);
        } else {
            self.unreadable.remove(&path);
        }
    }
}

impl DocumentStore for MemoryVault {
    fn folder(&self, path: &str) -> Option<Folder> {
        let path = normalize_path(path);
        if !self.folders.contains(&path) {
            return None;
        }
        let children = self
            .documents
            .keys()
            .map(|key| DocumentRef { path: key.clone() })
            .filter(|doc| doc.folder() == path)
            .collect();
        Some(Folder { path, children })
    }

    fn read(&self, document: &DocumentRef) -> Result<String> {
        if self.unreadable.contains(&document.path) {
            return Err(Error::Read {
                path: document.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "unreadable"),
            });
        }
        self.documents
            .get(&document.path)
            .cloned()
            .ok_or_else(|| Error::Read {
                path: document.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
            })
    }
}

/// Note store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn open(root: &Path) -> Result<Self> {
        let root = root.canonicalize()?;
        if !root.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "vault root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute filesystem path of a vault-relative path.
    pub fn absolute(&self, path: &str) -> PathBuf {
        let path = normalize_path(path);
        if path == "/" {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    /// Map a filesystem path back to a document in this vault.
    pub fn document_for(&self, path: &Path) -> Result<DocumentRef> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| Error::OutsideVault(path.to_path_buf()))?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                _ => return Err(Error::OutsideVault(path.to_path_buf())),
            }
        }
        if parts.is_empty() {
            return Err(Error::OutsideVault(path.to_path_buf()));
        }
        Ok(DocumentRef::new(&parts.join("/")))
    }
}

impl DocumentStore for FsVault {
    fn folder(&self, path: &str) -> Option<Folder> {
        let path = normalize_path(path);
        let dir = self.absolute(&path);
        let entries = std::fs::read_dir(&dir).ok()?;

        let mut children = Vec::new();
        for entry in entries.flatten() {
            let is_file = entry.file_type().map(|kind| kind.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let child = if path == "/" {
                name
            } else {
                format!("{path}/{name}")
            };
            children.push(DocumentRef::new(&child));
        }
        children.sort();
        Some(Folder { path, children })
    }

    fn read(&self, document: &DocumentRef) -> Result<String> {
        std::fs::read_to_string(self.absolute(&document.path)).map_err(|source| Error::Read {
            path: document.path.clone(),
            source,
        })
    }
}
