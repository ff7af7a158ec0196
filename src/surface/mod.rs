//! Inspection surface: the debug file tree operators read and write.
//!
//! The tree is created through an [`InspectionFs`] backend. Each file carries
//! a [`DebugFile`] route that the service uses to serve reads and writes.
mod layout;
mod mem_fs;
pub use layout::*;
pub use mem_fs::*;

#[cfg(test)]
mod layout_test;

#[cfg(test)]
use mockall::automock;

use crate::ClientIdentity;
use crate::Result;

/// Backend-assigned id of a directory or file
pub type EntryId = u64;

/// What an inspection file serves
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DebugFile {
    /// Display buffer of one client
    ClientData(ClientIdentity),
    /// Shared `"<client-name> <index>"` write target
    UpdateRequest,
    DumpClients,
    DumpBcmClients,
    /// Last commit snapshot of the named fabric
    FabricData(String),
    ShellMaster,
    ShellSlave,
    ShellAb,
    ShellIb,
    /// Shell client enable flag; writing a non-zero value triggers a vote
    ShellEnable,
    PrintRules,
}

impl DebugFile {
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            DebugFile::UpdateRequest
                | DebugFile::ShellMaster
                | DebugFile::ShellSlave
                | DebugFile::ShellAb
                | DebugFile::ShellIb
                | DebugFile::ShellEnable
        )
    }
}

#[cfg_attr(test, automock)]
pub trait InspectionFs: Send + Sync + 'static {
    /// Creates a directory under `parent`, or at the top level when `None`.
    fn create_dir(
        &self,
        parent: Option<EntryId>,
        name: &str,
    ) -> Result<EntryId>;

    fn create_file(
        &self,
        parent: EntryId,
        name: &str,
        mode: u16,
        file: DebugFile,
    ) -> Result<EntryId>;

    /// Removes `entry` and everything below it. Unknown entries are ignored.
    fn remove_recursive(
        &self,
        entry: EntryId,
    );
}
