//! Operator-driven synthetic client.
//!
//! The shell client lets an operator pick a master/slave pair, stage ab/ib
//! values and push them to the scaling framework. State is kept in the client
//! domain and every framework call happens after the domain lock is released.
//!
//! ## States
//! - **Unregistered**: no client id held.
//! - **Registered & disabled**: id held, votes are not dispatched.
//! - **Registered & enabled**: each `set_enable(true)` dispatches the staged
//!   request, alternating usecase 2 and 1 so the framework always observes an
//!   index change.
mod state;
pub use state::*;


use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::ClientId;
use crate::ClientRegistry;
use crate::NodeId;
use crate::Result;
use crate::ScalingFramework;

#[derive(Clone)]
pub struct ShellClient {
    clients: ClientRegistry,
    framework: Arc<dyn ScalingFramework>,
}

impl ShellClient {
    pub fn new(
        clients: ClientRegistry,
        framework: Arc<dyn ScalingFramework>,
    ) -> Self {
        Self { clients, framework }
    }

    pub fn master(&self) -> NodeId {
        let master = self.clients.with_domain(|d| d.shell.endpoint(Endpoint::Master));
        debug!(master, "Get master");
        master
    }

    pub fn slave(&self) -> NodeId {
        let slave = self.clients.with_domain(|d| d.shell.endpoint(Endpoint::Slave));
        debug!(slave, "Get slave");
        slave
    }

    pub fn requested_ab(&self) -> u64 {
        self.clients.with_domain(|d| d.shell.snapshot().requested.ab)
    }

    pub fn requested_ib(&self) -> u64 {
        self.clients.with_domain(|d| d.shell.snapshot().requested.ib)
    }

    pub fn is_enabled(&self) -> bool {
        self.clients.with_domain(|d| d.shell.enable)
    }

    pub fn client_id(&self) -> Option<ClientId> {
        self.clients.with_domain(|d| d.shell.client)
    }

    pub fn snapshot(&self) -> ShellClientSnapshot {
        self.clients.with_domain(|d| d.shell.snapshot())
    }

    pub fn set_master(
        &self,
        master: NodeId,
    ) {
        debug!(master, "Set master");
        self.set_endpoint(Endpoint::Master, master);
    }

    pub fn set_slave(
        &self,
        slave: NodeId,
    ) {
        debug!(slave, "Set slave");
        self.set_endpoint(Endpoint::Slave, slave);
    }

    /// Stages ab for the next update; never registers or votes by itself.
    pub fn set_requested_ab(
        &self,
        ab: u64,
    ) {
        debug!(ab, "Set ab");
        self.clients.with_domain(|d| d.shell.set_requested(Some(ab), None));
    }

    /// Stages ib for the next update; never registers or votes by itself.
    pub fn set_requested_ib(
        &self,
        ib: u64,
    ) {
        debug!(ib, "Set ib");
        self.clients.with_domain(|d| d.shell.set_requested(None, Some(ib)));
    }

    /// Enabling registers the client if needed and dispatches the staged
    /// request. Disabling keeps the registration.
    pub fn set_enable(
        &self,
        enable: bool,
    ) -> Result<()> {
        debug!(enable, "Set enable");
        let ticket = self.clients.with_domain(|d| {
            d.shell.enable = enable;
            if enable {
                d.shell.ticket()
            } else {
                None
            }
        });
        if !enable {
            return Ok(());
        }

        if let Some(ticket) = ticket {
            if self.register(&ticket).is_none() {
                return Ok(());
            }
        }
        self.apply_pending_request()
    }

    /// Drops the external registration, if any, and returns to the initial
    /// state: invalid topology, zero votes, disabled.
    pub(crate) fn release(&self) {
        let held = self.clients.with_domain(|d| {
            let held = d.shell.client.take();
            d.shell.reset();
            held
        });
        if let Some(client) = held {
            debug!(client, "Unregistering shell client");
            self.framework.unregister_client(client);
        }
    }

    fn set_endpoint(
        &self,
        endpoint: Endpoint,
        value: NodeId,
    ) {
        let (stale, ticket) = self.clients.with_domain(|d| {
            // A new master or slave invalidates the vote contract of the held client.
            let stale = if d.shell.endpoint(endpoint) != value {
                d.shell.current_index = ActiveSlot::Uninitialized;
                d.shell.mirror_endpoint(endpoint, value);
                d.shell.client.take()
            } else {
                None
            };
            if !d.shell.enable {
                debug!("Enable bit not set, skipping registration");
                return (stale, None);
            }
            let ticket = d.shell.ticket();
            if ticket.is_none() {
                debug!("Client registered, skipping registration");
            }
            (stale, ticket)
        });
        if let Some(client) = stale {
            debug!(client, ?endpoint, "Shell client topology changed. Unregistering");
            self.framework.unregister_client(client);
        }
        if let Some(ticket) = ticket {
            self.register(&ticket);
        }
    }

    /// Registers outside the domain lock and returns the client held
    /// afterwards. A registration that lost a race with another caller, or
    /// whose topology changed meanwhile, is handed back to the framework.
    fn register(
        &self,
        ticket: &RegistrationTicket,
    ) -> Option<ClientId> {
        debug!("Registering shell client");
        let client = self.framework.register_client(&ticket.descriptor);
        if client == 0 {
            warn!("Scaling framework declined shell client registration");
            return None;
        }
        let (adopted, held) = self.clients.with_domain(|d| {
            let adopted = d.shell.adopt(ticket, client);
            (adopted, d.shell.client)
        });
        if !adopted {
            debug!(client, ?held, "Shell client registration superseded. Unregistering");
            self.framework.unregister_client(client);
        }
        held
    }

    fn apply_pending_request(&self) -> Result<()> {
        let (client, slot, enable) = self.clients.with_domain(|d| {
            let slot = d.shell.advance();
            (d.shell.client, slot, d.shell.enable)
        });
        let Some(client) = client else {
            return Ok(());
        };
        if !enable {
            debug!("Enable bit not set. Skipping update request");
            return Ok(());
        }

        debug!(client, index = slot.index(), "Updating request for shell client");
        self.framework.update_request(client, slot.index())?;
        Ok(())
    }
}
