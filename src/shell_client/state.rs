use crate::constants::INVALID_NODE;
use crate::constants::SHELL_CURRENT_SLOT;
use crate::constants::SHELL_INIT_SLOT;
use crate::constants::SHELL_REQUESTED_SLOT;
use crate::ClientDescriptor;
use crate::ClientId;
use crate::NodeId;
use crate::PathVector;
use crate::Usecase;
use crate::UsecaseTable;

/// Usecase slot last presented to the scaling framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActiveSlot {
    Uninitialized,
    Current,
    Requested,
}

impl ActiveSlot {
    /// Usecase index sent with `update_request`.
    pub fn index(self) -> u32 {
        match self {
            ActiveSlot::Uninitialized => SHELL_INIT_SLOT as u32,
            ActiveSlot::Current => SHELL_CURRENT_SLOT as u32,
            ActiveSlot::Requested => SHELL_REQUESTED_SLOT as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Master,
    Slave,
}

/// Shell client registers with a three-usecase descriptor: init template,
/// live current mirror and pending operator request. Topology is identical
/// across the three; only ab/ib differ.
#[derive(Debug)]
pub struct ShellClientState {
    pub(crate) client: Option<ClientId>,
    pub(crate) enable: bool,
    pub(crate) current_index: ActiveSlot,
    pub(crate) descriptor: ClientDescriptor,
    /// Bumped whenever the vote contract changes (topology edit or reset).
    /// A registration started under an older generation is stale.
    pub(crate) generation: u64,
}

/// Registration attempt started outside the domain lock
#[derive(Debug, Clone)]
pub(crate) struct RegistrationTicket {
    pub(crate) descriptor: ClientDescriptor,
    pub(crate) generation: u64,
}

impl ShellClientState {
    pub fn new(name: &str) -> Self {
        let unset = Usecase::new(vec![PathVector::new(INVALID_NODE, INVALID_NODE, 0, 0)]);
        let table = UsecaseTable::new(name, vec![unset.clone(), unset.clone(), unset]);
        Self {
            client: None,
            enable: false,
            current_index: ActiveSlot::Uninitialized,
            descriptor: ClientDescriptor::new(table),
            generation: 0,
        }
    }

    /// Back to the initial topology and zero votes. A held registration is
    /// left to the caller.
    pub(crate) fn reset(&mut self) {
        self.descriptor.write(|t| {
            for usecase in &mut t.usecases {
                usecase.vectors[0] = PathVector::new(INVALID_NODE, INVALID_NODE, 0, 0);
            }
        });
        self.enable = false;
        self.current_index = ActiveSlot::Uninitialized;
        self.generation += 1;
    }

    /// Ticket for a registration, `None` when one is already held.
    pub(crate) fn ticket(&self) -> Option<RegistrationTicket> {
        if self.client.is_some() {
            return None;
        }
        Some(RegistrationTicket {
            descriptor: self.descriptor.clone(),
            generation: self.generation,
        })
    }

    /// Stores a fresh registration if no other caller got there first and the
    /// contract has not changed since `ticket` was taken. Returns `false` when
    /// the new id must be given back to the framework.
    pub(crate) fn adopt(
        &mut self,
        ticket: &RegistrationTicket,
        client: ClientId,
    ) -> bool {
        if self.client.is_some() || self.generation != ticket.generation {
            return false;
        }
        self.client = Some(client);
        true
    }

    pub(crate) fn slot(
        &self,
        slot: usize,
    ) -> PathVector {
        self.descriptor.vector(slot, 0).unwrap_or_default()
    }

    pub(crate) fn endpoint(
        &self,
        endpoint: Endpoint,
    ) -> NodeId {
        let init = self.slot(SHELL_INIT_SLOT);
        match endpoint {
            Endpoint::Master => init.src,
            Endpoint::Slave => init.dst,
        }
    }

    pub(crate) fn mirror_endpoint(
        &mut self,
        endpoint: Endpoint,
        value: NodeId,
    ) {
        self.generation += 1;
        self.descriptor.write(|t| {
            for usecase in &mut t.usecases {
                let vector = &mut usecase.vectors[0];
                match endpoint {
                    Endpoint::Master => vector.src = value,
                    Endpoint::Slave => vector.dst = value,
                }
            }
        });
    }

    pub(crate) fn set_requested(
        &mut self,
        ab: Option<u64>,
        ib: Option<u64>,
    ) {
        self.descriptor.write(|t| {
            let requested = &mut t.usecases[SHELL_REQUESTED_SLOT].vectors[0];
            if let Some(ab) = ab {
                requested.ab = ab;
            }
            if let Some(ib) = ib {
                requested.ib = ib;
            }
        });
    }

    /// Flips the live slot so every operator update reaches the framework as
    /// an index change: anything below `Requested` moves to `Requested` as is,
    /// `Requested` moves to `Current` after copying the requested ab/ib over.
    pub(crate) fn advance(&mut self) -> ActiveSlot {
        if self.current_index < ActiveSlot::Requested {
            self.current_index = ActiveSlot::Requested;
        } else {
            self.current_index = ActiveSlot::Current;
            self.descriptor.write(|t| {
                let requested = t.usecases[SHELL_REQUESTED_SLOT].vectors[0];
                let current = &mut t.usecases[SHELL_CURRENT_SLOT].vectors[0];
                current.ab = requested.ab;
                current.ib = requested.ib;
            });
        }
        self.current_index
    }

    pub fn snapshot(&self) -> ShellClientSnapshot {
        ShellClientSnapshot {
            client: self.client,
            enable: self.enable,
            current_index: self.current_index,
            init: self.slot(SHELL_INIT_SLOT),
            current: self.slot(SHELL_CURRENT_SLOT),
            requested: self.slot(SHELL_REQUESTED_SLOT),
        }
    }
}

/// Point-in-time copy of the shell client state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellClientSnapshot {
    pub client: Option<ClientId>,
    pub enable: bool,
    pub current_index: ActiveSlot,
    pub init: PathVector,
    pub current: PathVector,
    pub requested: PathVector,
}
