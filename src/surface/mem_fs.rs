use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use tracing::debug;

use super::DebugFile;
use super::EntryId;
use super::InspectionFs;
use crate::Result;
use crate::SurfaceError;

#[derive(Debug, Clone)]
enum EntryKind {
    Dir,
    File { mode: u16, file: DebugFile },
}

#[derive(Debug, Clone)]
struct Entry {
    parent: Option<EntryId>,
    name: String,
    kind: EntryKind,
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    /// `None` for directories
    pub mode: Option<u16>,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.mode.is_none()
    }
}

/// In-memory [`InspectionFs`] with slash-separated path resolution.
#[derive(Debug, Default)]
pub struct MemFs {
    entries: DashMap<EntryId, Entry>,
    next_id: AtomicU64,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route of the file at `path`, e.g. `msm-bus-dbg/shell-client/mas`.
    pub fn resolve(
        &self,
        path: &str,
    ) -> Result<DebugFile> {
        let id = self.lookup(path)?;
        match self.entries.get(&id).map(|e| e.kind.clone()) {
            Some(EntryKind::File { file, .. }) => Ok(file),
            _ => Err(not_found(path)),
        }
    }

    /// Children of the directory at `path`, sorted by name. An empty path
    /// lists the top level.
    pub fn list(
        &self,
        path: &str,
    ) -> Result<Vec<DirEntry>> {
        let parent = if components(path).next().is_none() {
            None
        } else {
            let id = self.lookup(path)?;
            match self.entries.get(&id).map(|e| matches!(e.kind, EntryKind::Dir)) {
                Some(true) => Some(id),
                _ => return Err(not_found(path)),
            }
        };

        let mut listing: Vec<DirEntry> = self
            .entries
            .iter()
            .filter(|e| e.parent == parent)
            .map(|e| DirEntry {
                name: e.name.clone(),
                mode: match &e.kind {
                    EntryKind::Dir => None,
                    EntryKind::File { mode, .. } => Some(*mode),
                },
            })
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    pub fn exists(
        &self,
        path: &str,
    ) -> bool {
        self.lookup(path).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(
        &self,
        path: &str,
    ) -> Result<EntryId> {
        let mut parent = None;
        let mut found = None;
        for name in components(path) {
            let id = self.child(parent, name).ok_or_else(|| not_found(path))?;
            parent = Some(id);
            found = Some(id);
        }
        found.ok_or_else(|| not_found(path))
    }

    fn child(
        &self,
        parent: Option<EntryId>,
        name: &str,
    ) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|e| e.parent == parent && e.name == name)
            .map(|e| *e.key())
    }

    fn insert(
        &self,
        parent: Option<EntryId>,
        name: &str,
        kind: EntryKind,
    ) -> Result<EntryId> {
        if let Some(parent) = parent {
            let parent_is_dir = self
                .entries
                .get(&parent)
                .map(|e| matches!(e.kind, EntryKind::Dir));
            if parent_is_dir != Some(true) {
                return Err(SurfaceError::Backend(format!("parent {parent} is not a directory")).into());
            }
        }
        if self.child(parent, name).is_some() {
            return Err(SurfaceError::Backend(format!("entry {name} already exists")).into());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(
            id,
            Entry {
                parent,
                name: name.to_string(),
                kind,
            },
        );
        Ok(id)
    }
}

impl InspectionFs for MemFs {
    fn create_dir(
        &self,
        parent: Option<EntryId>,
        name: &str,
    ) -> Result<EntryId> {
        self.insert(parent, name, EntryKind::Dir)
    }

    fn create_file(
        &self,
        parent: EntryId,
        name: &str,
        mode: u16,
        file: DebugFile,
    ) -> Result<EntryId> {
        self.insert(Some(parent), name, EntryKind::File { mode, file })
    }

    fn remove_recursive(
        &self,
        entry: EntryId,
    ) {
        let mut pending = vec![entry];
        let mut removed = 0usize;
        while let Some(id) = pending.pop() {
            let children: Vec<EntryId> = self
                .entries
                .iter()
                .filter(|e| e.parent == Some(id))
                .map(|e| *e.key())
                .collect();
            pending.extend(children);
            if self.entries.remove(&id).is_some() {
                removed += 1;
            }
        }
        debug!(entry, removed, "Removed inspection entries");
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

fn not_found(path: &str) -> crate::Error {
    SurfaceError::NotFound {
        path: path.to_string(),
    }
    .into()
}
