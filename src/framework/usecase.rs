//! Usecase data model shared with the scaling framework.
//!
//! A [`ClientDescriptor`] is a shared handle: the framework keeps the one it
//! was registered with and reads the addressed usecase when a request is
//! updated, so writes through the handle are visible to later votes.

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use parking_lot::RwLock;

/// Numeric client id handed out by the scaling framework; `0` means "no client".
pub type ClientId = u32;

/// Bus topology node id (master or slave port).
pub type NodeId = i32;

/// One `{source, destination, ab, ib}` path vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathVector {
    pub src: NodeId,
    pub dst: NodeId,
    /// Guaranteed (average) bandwidth
    pub ab: u64,
    /// Peak (instantaneous) bandwidth
    pub ib: u64,
}

impl PathVector {
    pub fn new(
        src: NodeId,
        dst: NodeId,
        ab: u64,
        ib: u64,
    ) -> Self {
        Self { src, dst, ab, ib }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Usecase {
    pub vectors: Vec<PathVector>,
}

impl Usecase {
    pub fn new(vectors: Vec<PathVector>) -> Self {
        Self { vectors }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsecaseTable {
    pub name: Option<String>,
    pub active_only: bool,
    pub usecases: Vec<Usecase>,
}

impl UsecaseTable {
    pub fn new(
        name: impl Into<String>,
        usecases: Vec<Usecase>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            active_only: false,
            usecases,
        }
    }

    /// Paths per usecase, taken from the first usecase.
    pub fn num_paths(&self) -> usize {
        self.usecases.first().map(|u| u.vectors.len()).unwrap_or(0)
    }
}

#[derive(Clone)]
pub struct ClientDescriptor {
    inner: Arc<RwLock<UsecaseTable>>,
}

impl ClientDescriptor {
    pub fn new(table: UsecaseTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    pub fn name(&self) -> Option<String> {
        self.inner.read().name.clone()
    }

    pub fn num_usecases(&self) -> usize {
        self.inner.read().usecases.len()
    }

    pub fn read<R>(
        &self,
        f: impl FnOnce(&UsecaseTable) -> R,
    ) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut UsecaseTable) -> R,
    ) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Vector `path` of usecase `index`, if both exist.
    pub fn vector(
        &self,
        index: usize,
        path: usize,
    ) -> Option<PathVector> {
        self.read(|t| t.usecases.get(index).and_then(|u| u.vectors.get(path)).copied())
    }
}

impl fmt::Debug for ClientDescriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ClientDescriptor")
            .field("name", &self.name())
            .field("num_usecases", &self.num_usecases())
            .finish()
    }
}

/// Opaque reference to a client created through the handle API instead of a
/// usecase table. Two handles are the same client only if they point at the
/// same allocation.
#[derive(Clone)]
pub struct ClientHandle {
    inner: Arc<HandleInfo>,
}

#[derive(Debug)]
struct HandleInfo {
    name: Option<String>,
    master: NodeId,
    slave: NodeId,
}

impl ClientHandle {
    pub fn new(
        name: Option<String>,
        master: NodeId,
        slave: NodeId,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInfo { name, master, slave }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn master(&self) -> NodeId {
        self.inner.master
    }

    pub fn slave(&self) -> NodeId {
        self.inner.slave
    }
}

impl PartialEq for ClientHandle {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ClientHandle {}

impl Hash for ClientHandle {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        (Arc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("name", &self.inner.name)
            .field("master", &self.inner.master)
            .field("slave", &self.inner.slave)
            .finish()
    }
}
