//! In-process scaling framework used by the operator binary.
//!
//! Hands out client ids and reports every registration, vote and commit back
//! into the attached [`BusDbg`] service, the way a real framework feeds the
//! debug hooks.

use std::collections::HashMap;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use super::ClientDescriptor;
use super::ClientId;
use super::ScalingFramework;
use crate::BusDbg;
use crate::ClientIdentity;
use crate::CommitVote;
use crate::FrameworkError;

/// Status returned for requests naming an unknown client or usecase
const EINVAL: i32 = -22;

pub struct LoopbackFramework {
    fabric: String,
    next_id: AtomicU32,
    clients: Mutex<HashMap<ClientId, ClientDescriptor>>,
    service: OnceLock<Weak<BusDbg>>,
}

impl LoopbackFramework {
    /// Commits of every vote are reported under the fabric `fabric`.
    pub fn new(fabric: impl Into<String>) -> Self {
        Self {
            fabric: fabric.into(),
            next_id: AtomicU32::new(1),
            clients: Mutex::new(HashMap::new()),
            service: OnceLock::new(),
        }
    }

    /// Starts reporting into `service`. Only the first call has an effect.
    pub fn attach(
        &self,
        service: &Arc<BusDbg>,
    ) {
        if self.service.set(Arc::downgrade(service)).is_err() {
            warn!("Loopback framework already attached");
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    fn service(&self) -> Option<Arc<BusDbg>> {
        self.service.get().and_then(Weak::upgrade)
    }
}

impl ScalingFramework for LoopbackFramework {
    fn register_client(
        &self,
        descriptor: &ClientDescriptor,
    ) -> ClientId {
        let client_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clients.lock().insert(client_id, descriptor.clone());
        debug!(client_id, name = ?descriptor.name(), "Loopback client registered");

        if let Some(service) = self.service() {
            if let Err(e) = service.add_client(client_id, descriptor.clone()) {
                warn!(client_id, "Failed to record client: {e}");
            }
        }
        client_id
    }

    fn unregister_client(
        &self,
        client_id: ClientId,
    ) {
        if self.clients.lock().remove(&client_id).is_none() {
            debug!(client_id, "Unregistering unknown loopback client");
            return;
        }
        if let Some(service) = self.service() {
            service.remove_client(&ClientIdentity::Id(client_id));
        }
    }

    fn update_request(
        &self,
        client_id: ClientId,
        index: u32,
    ) -> Result<(), FrameworkError> {
        let descriptor = self
            .clients
            .lock()
            .get(&client_id)
            .cloned()
            .ok_or(FrameworkError::Status(EINVAL))?;
        let votes: Vec<CommitVote> = descriptor
            .read(|t| {
                t.usecases
                    .get(index as usize)
                    .map(|u| u.vectors.iter().map(|v| CommitVote::new(v.dst, v.ab, v.ib)).collect())
            })
            .ok_or(FrameworkError::Status(EINVAL))?;

        if let Some(service) = self.service() {
            service.record_transaction(client_id, index);
            if let Err(e) = service.commit_fabric(&self.fabric, &votes) {
                warn!(fabric = %self.fabric, "Failed to record commit: {e}");
            }
        }
        Ok(())
    }
}
