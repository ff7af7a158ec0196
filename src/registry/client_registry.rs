use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::DisplayBuffer;
use crate::surface::EntryId;
use crate::utils::bytes::find_subslice;
use crate::ClientDescriptor;
use crate::ClientHandle;
use crate::ClientId;
use crate::NodeId;
use crate::RegistryError;
use crate::ShellClientState;

/// Identity a client record is keyed by: exactly one of numeric id or handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientIdentity {
    Id(ClientId),
    Handle(ClientHandle),
}

impl fmt::Display for ClientIdentity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ClientIdentity::Id(id) => write!(f, "client {id}"),
            ClientIdentity::Handle(handle) => {
                write!(f, "handle {}", handle.name().unwrap_or("<unnamed>"))
            }
        }
    }
}

/// How the client was created with the scaling framework.
#[derive(Debug, Clone)]
pub enum ClientKind {
    Descriptor {
        id: ClientId,
        descriptor: ClientDescriptor,
    },
    Handle(ClientHandle),
}

#[derive(Debug, Clone)]
pub struct ClientRecord {
    kind: ClientKind,
    /// Current usecase index, `-1` until the first vote is recorded
    pub(crate) index: i32,
    pub(crate) vote_count: u64,
    pub(crate) buffer: DisplayBuffer,
    /// Inspection entry serving this record, while the surface is live
    pub(crate) file: Option<EntryId>,
}

impl ClientRecord {
    pub fn from_descriptor(
        id: ClientId,
        descriptor: ClientDescriptor,
        buffer: DisplayBuffer,
    ) -> Self {
        Self::new(ClientKind::Descriptor { id, descriptor }, buffer)
    }

    pub fn from_handle(
        handle: ClientHandle,
        buffer: DisplayBuffer,
    ) -> Self {
        Self::new(ClientKind::Handle(handle), buffer)
    }

    fn new(
        kind: ClientKind,
        buffer: DisplayBuffer,
    ) -> Self {
        Self {
            kind,
            index: -1,
            vote_count: 0,
            buffer,
            file: None,
        }
    }

    pub fn identity(&self) -> ClientIdentity {
        match &self.kind {
            ClientKind::Descriptor { id, .. } => ClientIdentity::Id(*id),
            ClientKind::Handle(handle) => ClientIdentity::Handle(handle.clone()),
        }
    }

    pub fn kind(&self) -> &ClientKind {
        &self.kind
    }

    pub fn client_id(&self) -> Option<ClientId> {
        match &self.kind {
            ClientKind::Descriptor { id, .. } => Some(*id),
            ClientKind::Handle(_) => None,
        }
    }

    pub fn descriptor(&self) -> Option<&ClientDescriptor> {
        match &self.kind {
            ClientKind::Descriptor { descriptor, .. } => Some(descriptor),
            ClientKind::Handle(_) => None,
        }
    }

    pub fn name(&self) -> Option<String> {
        match &self.kind {
            ClientKind::Descriptor { descriptor, .. } => descriptor.name(),
            ClientKind::Handle(handle) => handle.name().map(str::to_owned),
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn vote_count(&self) -> u64 {
        self.vote_count
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }
}

/// Records in insertion order, indexed by identity.
#[derive(Debug, Default)]
pub(crate) struct ClientTable {
    records: BTreeMap<u64, ClientRecord>,
    index: HashMap<ClientIdentity, u64>,
    next_seq: u64,
}

impl ClientTable {
    pub(crate) fn insert(
        &mut self,
        record: ClientRecord,
    ) -> Result<(), RegistryError> {
        let identity = record.identity();
        if self.index.contains_key(&identity) {
            return Err(RegistryError::DuplicateClient {
                identity: identity.to_string(),
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(identity, seq);
        self.records.insert(seq, record);
        Ok(())
    }

    pub(crate) fn remove(
        &mut self,
        identity: &ClientIdentity,
    ) -> Option<ClientRecord> {
        let seq = self.index.remove(identity)?;
        self.records.remove(&seq)
    }

    pub(crate) fn get(
        &self,
        identity: &ClientIdentity,
    ) -> Option<&ClientRecord> {
        self.index.get(identity).and_then(|seq| self.records.get(seq))
    }

    pub(crate) fn get_mut(
        &mut self,
        identity: &ClientIdentity,
    ) -> Option<&mut ClientRecord> {
        let seq = self.index.get(identity)?;
        self.records.get_mut(seq)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ClientRecord> {
        self.records.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClientRecord> {
        self.records.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn drain(&mut self) -> Vec<ClientRecord> {
        self.index.clear();
        std::mem::take(&mut self.records).into_values().collect()
    }
}

/// Everything guarded by the client-domain lock.
#[derive(Debug)]
pub(crate) struct ClientDomain {
    pub(crate) clients: ClientTable,
    pub(crate) shell: ShellClientState,
    /// BCM nodes walked by the consumer vote dump, in registration order
    pub(crate) bcms: Vec<NodeId>,
}

/// Live collection of per-client vote records.
///
/// Every operation runs under one lock shared with the shell client state and
/// the consumer link walk. Clones share that lock.
#[derive(Clone)]
pub struct ClientRegistry {
    inner: Arc<Mutex<ClientDomain>>,
}

impl ClientRegistry {
    pub(crate) fn new(shell: ShellClientState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ClientDomain {
                clients: ClientTable::default(),
                shell,
                bcms: Vec::new(),
            })),
        }
    }

    /// Runs `f` inside the client-domain critical section.
    pub(crate) fn with_domain<R>(
        &self,
        f: impl FnOnce(&mut ClientDomain) -> R,
    ) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn register(
        &self,
        record: ClientRecord,
    ) -> Result<(), RegistryError> {
        let identity = record.identity();
        self.with_domain(|d| d.clients.insert(record))?;
        debug!(%identity, "Registered client record");
        Ok(())
    }

    /// Removes the record; absent identities are a no-op.
    pub fn unregister(
        &self,
        identity: &ClientIdentity,
    ) -> Option<ClientRecord> {
        let removed = self.with_domain(|d| d.clients.remove(identity));
        if removed.is_some() {
            debug!(%identity, "Unregistered client record");
        }
        removed
    }

    pub fn find_by_identity(
        &self,
        identity: &ClientIdentity,
    ) -> Option<ClientRecord> {
        self.with_domain(|d| d.clients.get(identity).cloned())
    }

    /// First record, in insertion order, whose descriptor name occurs in
    /// `text`, paired with the token after the first space following the
    /// match (`None` when no space follows).
    pub fn find_by_name_substring<'t>(
        &self,
        text: &'t [u8],
    ) -> Option<(ClientRecord, Option<&'t [u8]>)> {
        self.with_domain(|d| {
            d.clients.iter().find_map(|record| {
                let name = record.descriptor()?.name()?;
                let start = find_subslice(text, name.as_bytes())?;
                let rest = &text[start + name.len()..];
                let token = rest
                    .iter()
                    .position(|b| *b == b' ')
                    .map(|space| &rest[space + 1..]);
                Some((record.clone(), token))
            })
        })
    }

    /// Slice of the record's display buffer; `None` if the identity is unknown.
    pub fn snapshot_read(
        &self,
        identity: &ClientIdentity,
        offset: u64,
        count: usize,
    ) -> Option<Vec<u8>> {
        self.with_domain(|d| d.clients.get(identity).map(|r| r.buffer.read_at(offset, count)))
    }

    pub fn len(&self) -> usize {
        self.with_domain(|d| d.clients.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn identities(&self) -> Vec<ClientIdentity> {
        self.with_domain(|d| d.clients.iter().map(ClientRecord::identity).collect())
    }

    /// Releases every record; clearing an empty registry is a no-op.
    pub fn clear(&self) -> Vec<ClientRecord> {
        self.with_domain(|d| d.clients.drain())
    }
}
