use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::DebugFile;
use super::EntryId;
use super::InspectionFs;
use crate::constants::CLIENT_DATA_DIR;
use crate::constants::COMMIT_DATA_DIR;
use crate::constants::DUMP_BCM_CLIENTS_FILE;
use crate::constants::DUMP_CLIENTS_FILE;
use crate::constants::MODE_READ_ONLY;
use crate::constants::MODE_READ_WRITE;
use crate::constants::PRINT_RULES_FILE;
use crate::constants::RULES_DBG_DIR;
use crate::constants::SHELL_AB_FILE;
use crate::constants::SHELL_CLIENT_DIR;
use crate::constants::SHELL_ENABLE_FILE;
use crate::constants::SHELL_IB_FILE;
use crate::constants::SHELL_MASTER_FILE;
use crate::constants::SHELL_SLAVE_FILE;
use crate::constants::UPDATE_REQUEST_FILE;
use crate::ClientRecord;
use crate::Result;

/// Live inspection tree: the backend plus the ids of the fixed directories.
#[derive(Clone)]
pub struct SurfaceTree {
    fs: Arc<dyn InspectionFs>,
    pub root: EntryId,
    pub client_data: EntryId,
    pub shell_client: EntryId,
    pub commit_data: EntryId,
    pub rules_dbg: EntryId,
}

impl SurfaceTree {
    /// Creates the root and its four subdirectories. On failure whatever was
    /// created is removed again.
    pub(crate) fn create_dirs(
        fs: Arc<dyn InspectionFs>,
        root_dir: &str,
    ) -> Result<Self> {
        let root = fs.create_dir(None, root_dir)?;
        let subdirs = (|| -> Result<[EntryId; 4]> {
            Ok([
                fs.create_dir(Some(root), CLIENT_DATA_DIR)?,
                fs.create_dir(Some(root), SHELL_CLIENT_DIR)?,
                fs.create_dir(Some(root), COMMIT_DATA_DIR)?,
                fs.create_dir(Some(root), RULES_DBG_DIR)?,
            ])
        })();
        let [client_data, shell_client, commit_data, rules_dbg] = match subdirs {
            Ok(ids) => ids,
            Err(e) => {
                fs.remove_recursive(root);
                return Err(e);
            }
        };
        debug!(root_dir, "Created inspection directories");

        Ok(Self {
            fs,
            root,
            client_data,
            shell_client,
            commit_data,
            rules_dbg,
        })
    }

    /// Rules file, shell client files and the shared update-request file.
    pub(crate) fn create_control_files(&self) -> Result<()> {
        self.fs
            .create_file(self.rules_dbg, PRINT_RULES_FILE, MODE_READ_WRITE, DebugFile::PrintRules)?;

        let shell_files = [
            (SHELL_ENABLE_FILE, DebugFile::ShellEnable),
            (SHELL_IB_FILE, DebugFile::ShellIb),
            (SHELL_AB_FILE, DebugFile::ShellAb),
            (SHELL_SLAVE_FILE, DebugFile::ShellSlave),
            (SHELL_MASTER_FILE, DebugFile::ShellMaster),
        ];
        for (name, file) in shell_files {
            self.fs.create_file(self.shell_client, name, MODE_READ_WRITE, file)?;
        }

        self.fs.create_file(
            self.client_data,
            UPDATE_REQUEST_FILE,
            MODE_READ_WRITE,
            DebugFile::UpdateRequest,
        )?;
        Ok(())
    }

    pub(crate) fn create_dump_files(&self) -> Result<()> {
        self.fs
            .create_file(self.client_data, DUMP_CLIENTS_FILE, MODE_READ_WRITE, DebugFile::DumpClients)?;
        self.fs.create_file(
            self.client_data,
            DUMP_BCM_CLIENTS_FILE,
            MODE_READ_WRITE,
            DebugFile::DumpBcmClients,
        )?;
        Ok(())
    }

    /// Read-only file named after the client; nameless clients get none.
    pub(crate) fn create_client_file(
        &self,
        record: &ClientRecord,
    ) -> Result<Option<EntryId>> {
        let Some(name) = record.name() else {
            debug!(identity = %record.identity(), "Client name not found");
            return Ok(None);
        };
        let id = self.fs.create_file(
            self.client_data,
            &name,
            MODE_READ_ONLY,
            DebugFile::ClientData(record.identity()),
        )?;
        Ok(Some(id))
    }

    pub(crate) fn create_fabric_file(
        &self,
        name: &str,
    ) -> Result<EntryId> {
        self.fs.create_file(
            self.commit_data,
            name,
            MODE_READ_ONLY,
            DebugFile::FabricData(name.to_string()),
        )
    }

    pub(crate) fn remove(
        &self,
        entry: EntryId,
    ) {
        self.fs.remove_recursive(entry);
    }

    /// Removes the whole tree.
    pub(crate) fn remove_all(&self) {
        self.fs.remove_recursive(self.root);
    }
}

impl fmt::Debug for SurfaceTree {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("SurfaceTree")
            .field("root", &self.root)
            .field("client_data", &self.client_data)
            .field("shell_client", &self.shell_client)
            .field("commit_data", &self.commit_data)
            .field("rules_dbg", &self.rules_dbg)
            .finish()
    }
}
