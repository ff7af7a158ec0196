// -
// Display buffers

/// Default capacity of a client/fabric display buffer
pub(crate) const MAX_BUFF_SIZE: usize = 4096;
/// Headroom below which a display buffer restarts from empty
pub(crate) const FILL_LIMIT: usize = 128;

// -
// Shell client

/// Topology sentinel meaning "no master/slave chosen"
pub const INVALID_NODE: i32 = -1;
/// Usecase slots of the shell client descriptor
pub(crate) const SHELL_INIT_SLOT: usize = 0;
pub(crate) const SHELL_CURRENT_SLOT: usize = 1;
pub(crate) const SHELL_REQUESTED_SLOT: usize = 2;
pub(crate) const SHELL_DEFAULT_NAME: &str = "test-client";

// -
// Inspection tree

pub(crate) const DEFAULT_ROOT_DIR: &str = "msm-bus-dbg";
pub const CLIENT_DATA_DIR: &str = "client-data";
pub const SHELL_CLIENT_DIR: &str = "shell-client";
pub const COMMIT_DATA_DIR: &str = "commit-data";
pub const RULES_DBG_DIR: &str = "rules-dbg";

pub const PRINT_RULES_FILE: &str = "print_rules";
pub const SHELL_ENABLE_FILE: &str = "update_request";
pub const SHELL_IB_FILE: &str = "ib";
pub const SHELL_AB_FILE: &str = "ab";
pub const SHELL_SLAVE_FILE: &str = "slv";
pub const SHELL_MASTER_FILE: &str = "mas";
pub const UPDATE_REQUEST_FILE: &str = "update-request";
pub const DUMP_CLIENTS_FILE: &str = "dump_clients";
pub const DUMP_BCM_CLIENTS_FILE: &str = "dump_bcm_clients";

pub(crate) const MODE_READ_ONLY: u16 = 0o444;
pub(crate) const MODE_READ_WRITE: u16 = 0o644;

pub(crate) const DUMP_CLIENTS_BANNER: &str = "\nDumping current client votes to trace log\n";
pub(crate) const DUMP_BCM_CLIENTS_BANNER: &str = "\nDumping current BCM client votes to trace log\n";
