//! Composition root of the inspection subsystem.
//!
//! [`BusDbg`] owns the two lock domains (client domain and fabric registry),
//! the injected collaborators and the live inspection tree. Framework-facing
//! hooks (`add_client`, `record_transaction`, `commit_fabric`, ...) populate the
//! registries; [`BusDbg::read`] and [`BusDbg::write`] serve the debug files.
mod builder;
mod render;
pub use builder::*;
pub use render::*;


use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::constants::DUMP_BCM_CLIENTS_BANNER;
use crate::constants::DUMP_CLIENTS_BANNER;
use crate::utils::bytes::read_slice;
use crate::utils::bytes::trimmed_text;
use crate::utils::time::stamp_since;
use crate::BusDbgConfig;
use crate::ClientDescriptor;
use crate::ClientHandle;
use crate::ClientId;
use crate::ClientIdentity;
use crate::ClientRecord;
use crate::ClientRegistry;
use crate::CommandError;
use crate::CommandParser;
use crate::ConsumerLinkRegistry;
use crate::ConsumerLinkVote;
use crate::DebugFile;
use crate::DisplayBuffer;
use crate::EntryId;
use crate::Error;
use crate::FabricBuffer;
use crate::FabricRecord;
use crate::FabricRegistry;
use crate::InspectionFs;
use crate::NodeId;
use crate::RegistryError;
use crate::Result;
use crate::RulesFormatter;
use crate::ShellClient;
use crate::SurfaceError;
use crate::SurfaceTree;

pub struct BusDbg {
    config: BusDbgConfig,
    epoch: Instant,
    clients: ClientRegistry,
    fabrics: FabricRegistry,
    consumer_links: ConsumerLinkRegistry,
    shell: ShellClient,
    parser: CommandParser,
    rules: Arc<dyn RulesFormatter>,
    rules_buffer: Mutex<Option<DisplayBuffer>>,
    surface: ArcSwapOption<SurfaceTree>,
    /// Serializes bring-up and teardown
    lifecycle: Mutex<()>,
}

impl BusDbg {
    pub fn config(&self) -> &BusDbgConfig {
        &self.config
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn fabrics(&self) -> &FabricRegistry {
        &self.fabrics
    }

    pub fn consumer_links(&self) -> &ConsumerLinkRegistry {
        &self.consumer_links
    }

    pub fn shell(&self) -> &ShellClient {
        &self.shell
    }

    pub fn is_live(&self) -> bool {
        self.surface.load().is_some()
    }

    // -
    // Client records

    /// Records a client registered through a usecase table.
    ///
    /// Re-adding a live id is tolerated: the existing record is kept and its
    /// id returned.
    pub fn add_client(
        &self,
        client_id: ClientId,
        descriptor: ClientDescriptor,
    ) -> Result<ClientId> {
        let buffer = DisplayBuffer::try_new(&self.config.buffer)?;
        self.insert_client(ClientRecord::from_descriptor(client_id, descriptor, buffer))?;
        Ok(client_id)
    }

    /// Records a client created through the handle API.
    pub fn add_handle_client(
        &self,
        handle: ClientHandle,
    ) -> Result<()> {
        let buffer = DisplayBuffer::try_new(&self.config.buffer)?;
        self.insert_client(ClientRecord::from_handle(handle, buffer))
    }

    pub fn remove_client(
        &self,
        identity: &ClientIdentity,
    ) -> bool {
        let Some(record) = self.clients.unregister(identity) else {
            return false;
        };
        if let (Some(file), Some(tree)) = (record.file, self.surface.load_full()) {
            tree.remove(file);
        }
        true
    }

    fn insert_client(
        &self,
        record: ClientRecord,
    ) -> Result<()> {
        let identity = record.identity();
        match self.clients.register(record) {
            Ok(()) => {}
            Err(RegistryError::DuplicateClient { .. }) => {
                warn!(%identity, "Client already recorded, keeping existing record");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let Some(tree) = self.surface.load_full() else {
            return Ok(());
        };
        let Some(record) = self.clients.find_by_identity(&identity) else {
            return Ok(());
        };
        match tree.create_client_file(&record) {
            Ok(Some(file)) => self.attach_client_file(&tree, &identity, file),
            Ok(None) => {}
            Err(e) => warn!(%identity, "Cannot create client data file: {e}"),
        }
        Ok(())
    }

    /// Renders the vote of usecase `index` into the client's display buffer
    /// and counts it. Unknown clients and indices are ignored.
    pub fn record_transaction(
        &self,
        client_id: ClientId,
        index: u32,
    ) {
        let stamp = stamp_since(self.epoch);
        self.clients.with_domain(|d| {
            let Some(record) = d.clients.get_mut(&ClientIdentity::Id(client_id)) else {
                debug!(client_id, "Transaction for unknown client");
                return;
            };
            let Some(descriptor) = record.descriptor().cloned() else {
                return;
            };
            let recorded = descriptor.read(|t| {
                let Some(usecase) = t.usecases.get(index as usize) else {
                    return false;
                };
                render::client_transaction(&mut record.buffer, &stamp, index, usecase);
                true
            });
            if !recorded {
                debug!(client_id, index, "Transaction for unknown usecase");
                return;
            }
            record.index = index as i32;
            record.vote_count += 1;
        });
    }

    pub fn record_handle_transaction(
        &self,
        handle: &ClientHandle,
        ab: u64,
        ib: u64,
    ) {
        let stamp = stamp_since(self.epoch);
        self.clients.with_domain(|d| {
            let Some(record) = d.clients.get_mut(&ClientIdentity::Handle(handle.clone())) else {
                debug!(handle = ?handle.name(), "Transaction for unknown handle");
                return;
            };
            render::handle_transaction(&mut record.buffer, &stamp, handle, ab, ib);
            record.vote_count += 1;
        });
    }

    // -
    // Fabric commits

    /// Appends a commit snapshot to the fabric's buffer, creating the record
    /// on first commit.
    pub fn commit_fabric(
        &self,
        name: &str,
        votes: &[CommitVote],
    ) -> Result<()> {
        let buffer = match self.fabrics.buffer(name) {
            Some(buffer) => buffer,
            None => self.insert_fabric(name)?,
        };
        let stamp = stamp_since(self.epoch);
        render::fabric_commit(&mut buffer.write(), &stamp, votes);
        Ok(())
    }

    fn insert_fabric(
        &self,
        name: &str,
    ) -> Result<FabricBuffer> {
        let record = FabricRecord::new(name, DisplayBuffer::try_new(&self.config.buffer)?);
        let buffer = match self.fabrics.insert(record) {
            Ok(buffer) => buffer,
            Err(RegistryError::DuplicateFabric { .. }) => {
                return self.fabrics.buffer(name).ok_or_else(|| {
                    RegistryError::FabricNotFound {
                        name: name.to_string(),
                    }
                    .into()
                });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(tree) = self.surface.load_full() {
            match tree.create_fabric_file(name) {
                Ok(file) => self.attach_fabric_file(&tree, name, file),
                Err(e) => warn!(fabric = name, "Cannot create files for commit data: {e}"),
            }
        }
        Ok(buffer)
    }

    pub fn remove_fabric(
        &self,
        name: &str,
    ) -> bool {
        let Some(record) = self.fabrics.remove(name) else {
            return false;
        };
        if let (Some(file), Some(tree)) = (record.file, self.surface.load_full()) {
            tree.remove(file);
        }
        true
    }

    // -
    // BCM walk

    pub fn add_bcm(
        &self,
        bcm: NodeId,
    ) {
        self.consumer_links.add_bcm(bcm);
    }

    pub fn remove_bcm(
        &self,
        bcm: NodeId,
    ) {
        self.consumer_links.remove_bcm(bcm);
    }

    // -
    // Dumps and requests

    /// Emits the current vote of every descriptor client that has voted, one
    /// event per path on the `bus_client_status` target.
    pub fn dump_clients(&self) -> Vec<ClientVoteStatus> {
        let statuses = self.clients.with_domain(|d| {
            let mut statuses = Vec::new();
            for record in d.clients.iter() {
                let Some(descriptor) = record.descriptor() else {
                    continue;
                };
                let Ok(index) = usize::try_from(record.index()) else {
                    continue;
                };
                descriptor.read(|t| {
                    let Some(usecase) = t.usecases.get(index) else {
                        return;
                    };
                    for v in usecase.vectors.iter().take(t.num_paths()) {
                        statuses.push(ClientVoteStatus {
                            name: t.name.clone().unwrap_or_default(),
                            src: v.src,
                            dst: v.dst,
                            ab: v.ab,
                            ib: v.ib,
                            active_only: t.active_only,
                            vote_count: record.vote_count(),
                        });
                    }
                });
            }
            statuses
        });

        for s in &statuses {
            info!(
                target: "bus_client_status",
                name = %s.name,
                src = s.src,
                dst = s.dst,
                ab = s.ab,
                ib = s.ib,
                active_only = s.active_only,
                vote_count = s.vote_count,
                "client vote"
            );
        }
        statuses
    }

    pub fn dump_bcm_clients(&self) -> Vec<ConsumerLinkVote> {
        self.consumer_links.dump()
    }

    /// Runs the update-request text protocol over `input`.
    pub fn update_request(
        &self,
        input: &[u8],
    ) -> Result<usize> {
        self.parser.execute(input)
    }

    // -
    // Inspection surface

    /// Creates the inspection tree: directories, control files, rules buffer,
    /// client files, dump files, then fabric files. Any failure removes
    /// everything created and is reported as one initialization failure.
    pub fn bring_up(
        &self,
        fs: Arc<dyn InspectionFs>,
    ) -> Result<()> {
        let _lifecycle = self.lifecycle.lock();
        if self.is_live() {
            debug!("Inspection surface already live");
            return Ok(());
        }

        let tree = SurfaceTree::create_dirs(fs, &self.config.surface.root_dir)
            .map_err(initialization_failure)?;
        if let Err(e) = self.populate(&tree) {
            tree.remove_all();
            self.detach_files();
            *self.rules_buffer.lock() = None;
            warn!("Inspection surface bring-up failed: {e}");
            return Err(initialization_failure(e));
        }

        self.surface.store(Some(Arc::new(tree)));
        info!(root = %self.config.surface.root_dir, "Inspection surface is live");
        Ok(())
    }

    fn populate(
        &self,
        tree: &SurfaceTree,
    ) -> Result<()> {
        tree.create_control_files()?;

        *self.rules_buffer.lock() = Some(DisplayBuffer::try_new(&self.config.buffer)?);

        let records: Vec<ClientRecord> = self.clients.with_domain(|d| d.clients.iter().cloned().collect());
        for record in &records {
            if let Some(file) = tree.create_client_file(record)? {
                self.attach_client_file(tree, &record.identity(), file);
            }
        }

        tree.create_dump_files()?;

        for name in self.fabrics.names() {
            let file = tree.create_fabric_file(&name)?;
            self.attach_fabric_file(tree, &name, file);
        }
        Ok(())
    }

    /// Links a created file to its client record; the file is removed again
    /// if the record is gone.
    fn attach_client_file(
        &self,
        tree: &SurfaceTree,
        identity: &ClientIdentity,
        file: EntryId,
    ) {
        let attached = self.clients.with_domain(|d| match d.clients.get_mut(identity) {
            Some(record) => {
                record.file = Some(file);
                true
            }
            None => false,
        });
        if !attached {
            tree.remove(file);
        }
    }

    fn attach_fabric_file(
        &self,
        tree: &SurfaceTree,
        name: &str,
        file: EntryId,
    ) {
        let attached = self.fabrics.with_records(|records| match records.get_mut(name) {
            Some(record) => {
                record.file = Some(file);
                true
            }
            None => false,
        });
        if !attached {
            tree.remove(file);
        }
    }

    fn detach_files(&self) {
        self.clients.with_domain(|d| {
            for record in d.clients.iter_mut() {
                record.file = None;
            }
        });
        self.fabrics.with_records(|records| {
            for record in records.values_mut() {
                record.file = None;
            }
        });
    }

    /// Removes the inspection tree, releases the shell client registration and
    /// drops every record. Safe to call repeatedly.
    pub fn teardown(&self) {
        let _lifecycle = self.lifecycle.lock();
        if let Some(tree) = self.surface.swap(None) {
            tree.remove_all();
        }
        self.shell.release();

        let clients = self.clients.clear();
        self.clients.with_domain(|d| d.bcms.clear());
        let fabrics = self.fabrics.clear();
        *self.rules_buffer.lock() = None;
        info!(
            clients = clients.len(),
            fabrics = fabrics.len(),
            "Inspection subsystem torn down"
        );
    }

    /// Serves a read of an inspection file.
    pub fn read(
        &self,
        file: &DebugFile,
        offset: u64,
        count: usize,
    ) -> Result<Vec<u8>> {
        let bytes = match file {
            DebugFile::ClientData(identity) => self
                .clients
                .snapshot_read(identity, offset, count)
                .unwrap_or_default(),
            DebugFile::FabricData(name) => self.fabrics.read(name, offset, count)?,
            DebugFile::DumpClients => {
                if offset == 0 {
                    self.dump_clients();
                }
                read_slice(DUMP_CLIENTS_BANNER.as_bytes(), offset, count)
            }
            DebugFile::DumpBcmClients => {
                if offset == 0 {
                    self.dump_bcm_clients();
                }
                read_slice(DUMP_BCM_CLIENTS_BANNER.as_bytes(), offset, count)
            }
            DebugFile::PrintRules => self.read_rules(offset, count)?,
            DebugFile::ShellMaster => scalar(self.shell.master(), offset, count),
            DebugFile::ShellSlave => scalar(self.shell.slave(), offset, count),
            DebugFile::ShellAb => scalar(self.shell.requested_ab(), offset, count),
            DebugFile::ShellIb => scalar(self.shell.requested_ib(), offset, count),
            DebugFile::ShellEnable => scalar(u8::from(self.shell.is_enabled()), offset, count),
            DebugFile::UpdateRequest => {
                return Err(SurfaceError::PermissionDenied {
                    path: format!("{file:?}"),
                }
                .into())
            }
        };
        Ok(bytes)
    }

    fn read_rules(
        &self,
        offset: u64,
        count: usize,
    ) -> Result<Vec<u8>> {
        let mut guard = self.rules_buffer.lock();
        let buffer = guard.as_mut().ok_or(SurfaceError::NotReady)?;
        buffer.clear();
        buffer.append(&self.rules.render_rules());
        Ok(buffer.read_at(offset, count))
    }

    /// Serves a write to an inspection file; returns the bytes consumed.
    pub fn write(
        &self,
        file: &DebugFile,
        data: &[u8],
    ) -> Result<usize> {
        match file {
            DebugFile::UpdateRequest => return self.update_request(data),
            DebugFile::ShellMaster => self.shell.set_master(parse_scalar(data)?),
            DebugFile::ShellSlave => self.shell.set_slave(parse_scalar(data)?),
            DebugFile::ShellAb => self.shell.set_requested_ab(parse_scalar(data)?),
            DebugFile::ShellIb => self.shell.set_requested_ib(parse_scalar(data)?),
            DebugFile::ShellEnable => self.shell.set_enable(parse_scalar::<u64>(data)? != 0)?,
            _ => {
                return Err(SurfaceError::PermissionDenied {
                    path: format!("{file:?}"),
                }
                .into())
            }
        }
        Ok(data.len())
    }
}

fn initialization_failure(e: Error) -> Error {
    SurfaceError::InitializationFailure {
        reason: e.to_string(),
    }
    .into()
}

fn scalar(
    value: impl std::fmt::Display,
    offset: u64,
    count: usize,
) -> Vec<u8> {
    read_slice(format!("{value}\n").as_bytes(), offset, count)
}

fn parse_scalar<T: std::str::FromStr>(data: &[u8]) -> Result<T> {
    trimmed_text(data)
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| {
            CommandError::InvalidValue {
                input: String::from_utf8_lossy(data).into_owned(),
            }
            .into()
        })
}
