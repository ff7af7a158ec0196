use std::sync::Arc;

use mockall::predicate::always;
use mockall::predicate::eq;

use super::*;
use crate::constants::UPDATE_REQUEST_FILE;
use crate::test_utils::descriptor_record;
use crate::test_utils::display_buffer;
use crate::ClientDescriptor;
use crate::ClientRecord;
use crate::Error;
use crate::SurfaceError;
use crate::UsecaseTable;

#[test]
fn creates_fixed_tree_in_memory() {
    let fs = Arc::new(MemFs::new());
    let tree = SurfaceTree::create_dirs(fs.clone(), "msm-bus-dbg").unwrap();
    tree.create_control_files().unwrap();
    tree.create_dump_files().unwrap();

    let names = |path: &str| -> Vec<String> {
        fs.list(path).unwrap().into_iter().map(|e| e.name).collect()
    };
    assert_eq!(
        names("msm-bus-dbg"),
        vec!["client-data", "commit-data", "rules-dbg", "shell-client"]
    );
    assert_eq!(
        names("msm-bus-dbg/shell-client"),
        vec!["ab", "ib", "mas", "slv", "update_request"]
    );
    assert_eq!(
        names("msm-bus-dbg/client-data"),
        vec!["dump_bcm_clients", "dump_clients", "update-request"]
    );
    assert_eq!(
        fs.resolve("msm-bus-dbg/rules-dbg/print_rules").unwrap(),
        DebugFile::PrintRules
    );
}

#[test]
fn client_and_fabric_files_are_read_only() {
    let fs = Arc::new(MemFs::new());
    let tree = SurfaceTree::create_dirs(fs.clone(), "dbg").unwrap();

    let record = descriptor_record(7, "camera", 2);
    assert!(tree.create_client_file(&record).unwrap().is_some());
    tree.create_fabric_file("fab-mmss").unwrap();

    let listing = fs.list("dbg/client-data").unwrap();
    assert_eq!(listing[0].mode, Some(0o444));
    assert_eq!(
        fs.resolve("dbg/commit-data/fab-mmss").unwrap(),
        DebugFile::FabricData("fab-mmss".into())
    );
}

#[test]
fn nameless_clients_get_no_file() {
    let fs = Arc::new(MemFs::new());
    let tree = SurfaceTree::create_dirs(fs.clone(), "dbg").unwrap();
    let nameless = ClientDescriptor::new(UsecaseTable::default());
    let record = ClientRecord::from_descriptor(3, nameless, display_buffer());

    assert_eq!(tree.create_client_file(&record).unwrap(), None);
    assert!(fs.list("dbg/client-data").unwrap().is_empty());
}

#[test]
fn failed_subdirectory_unwinds_root() {
    let mut fs = MockInspectionFs::new();
    fs.expect_create_dir()
        .with(eq(None), eq("msm-bus-dbg"))
        .times(1)
        .returning(|_, _| Ok(1));
    fs.expect_create_dir()
        .with(eq(Some(1)), eq("client-data"))
        .returning(|_, _| Ok(2));
    fs.expect_create_dir()
        .with(eq(Some(1)), eq("shell-client"))
        .returning(|_, _| Err(SurfaceError::Backend("no space".into()).into()));
    fs.expect_remove_recursive().with(eq(1)).times(1).return_const(());

    let err = SurfaceTree::create_dirs(Arc::new(fs), "msm-bus-dbg").unwrap_err();
    assert!(matches!(err, Error::Surface(SurfaceError::Backend(_))));
}

#[test]
fn failed_root_leaves_nothing_to_unwind() {
    let mut fs = MockInspectionFs::new();
    fs.expect_create_dir()
        .returning(|_, _| Err(SurfaceError::Backend("read-only".into()).into()));
    fs.expect_remove_recursive().times(0);

    assert!(SurfaceTree::create_dirs(Arc::new(fs), "msm-bus-dbg").is_err());
}

#[test]
fn control_file_failure_is_reported() {
    let mut fs = MockInspectionFs::new();
    let mut next = 0;
    fs.expect_create_dir().returning(move |_, _| {
        next += 1;
        Ok(next)
    });
    fs.expect_create_file()
        .with(always(), eq(UPDATE_REQUEST_FILE), always(), always())
        .returning(|_, _, _, _| Err(SurfaceError::Backend("quota".into()).into()));
    fs.expect_create_file().returning(|_, _, _, _| Ok(100));

    let tree = SurfaceTree::create_dirs(Arc::new(fs), "msm-bus-dbg").unwrap();
    assert!(tree.create_control_files().is_err());
}
