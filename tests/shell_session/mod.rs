//! Operator sessions driven purely through the inspection files.

use bus_dbg::ClientIdentity;
use bus_dbg::CommandError;
use bus_dbg::Error;

use crate::common::FrameworkCall;
use crate::common::Harness;

fn stage_topology_and_bandwidth(h: &Harness) {
    h.write("shell-client/mas", "5").unwrap();
    h.write("shell-client/slv", "9").unwrap();
    h.write("shell-client/ab", "100").unwrap();
    h.write("shell-client/ib", "50\n").unwrap();
}

#[test]
fn enable_registers_then_oscillates_between_requested_and_current() {
    let h = Harness::new();
    stage_topology_and_bandwidth(&h);
    assert!(h.framework.take_calls().is_empty());

    h.write("shell-client/update_request", "1").unwrap();
    let calls = h.framework.take_calls();
    let id = h.service.shell().client_id().expect("shell client registered");
    assert_eq!(
        calls,
        vec![FrameworkCall::Register { src: 5, dst: 9 }, FrameworkCall::Update(id, 2)]
    );
    let record = h.cat("client-data/test-client").unwrap();
    assert!(record.contains("curr   :        2"), "{record}");
    assert!(record.contains("ab     :      100"), "{record}");
    assert!(record.contains("ib     :       50"), "{record}");

    h.write("shell-client/update_request", "1").unwrap();
    assert_eq!(h.framework.take_calls(), vec![FrameworkCall::Update(id, 1)]);
    let record = h.cat("client-data/test-client").unwrap();
    assert!(record.contains("curr   :        1"), "{record}");

    h.write("shell-client/update_request", "0").unwrap();
    h.write("shell-client/update_request", "1").unwrap();
    assert_eq!(h.framework.take_calls(), vec![FrameworkCall::Update(id, 2)]);
    assert_eq!(h.cat("shell-client/update_request").unwrap(), "1\n");
}

#[test]
fn topology_change_reregisters_under_a_new_id() {
    let h = Harness::new();
    stage_topology_and_bandwidth(&h);
    h.write("shell-client/update_request", "1").unwrap();
    let first = h.service.shell().client_id().unwrap();
    h.framework.take_calls();

    h.write("shell-client/mas", "6").unwrap();

    let second = h.service.shell().client_id().unwrap();
    assert_ne!(first, second);
    assert_eq!(
        h.framework.take_calls(),
        vec![
            FrameworkCall::Unregister(first),
            FrameworkCall::Register { src: 6, dst: 9 }
        ]
    );
    let ids = h.service.clients().identities();
    assert!(!ids.contains(&ClientIdentity::Id(first)));
    assert!(ids.contains(&ClientIdentity::Id(second)));
    assert_eq!(h.cat("shell-client/mas").unwrap(), "6\n");

    h.write("shell-client/update_request", "1").unwrap();
    assert_eq!(h.framework.take_calls(), vec![FrameworkCall::Update(second, 2)]);
}

#[test]
fn update_request_file_switches_named_client_usecase() {
    let h = Harness::new();
    stage_topology_and_bandwidth(&h);
    h.write("shell-client/update_request", "1").unwrap();
    let id = h.service.shell().client_id().unwrap();
    h.framework.take_calls();

    assert_eq!(h.write("client-data/update-request", "test-client 0").unwrap(), 13);
    assert_eq!(h.framework.take_calls(), vec![FrameworkCall::Update(id, 0)]);

    let err = h.write("client-data/update-request", "test-client 7").unwrap_err();
    assert!(matches!(err, Error::Command(CommandError::IndexOutOfRange { .. })));
    let err = h.write("client-data/update-request", "test-client one").unwrap_err();
    assert!(matches!(err, Error::Command(CommandError::InvalidIndexFormat { .. })));
    h.write("client-data/update-request", "camera 1").unwrap();
    h.write("client-data/update-request", "").unwrap();
    assert!(h.framework.take_calls().is_empty());
}

#[test]
fn teardown_unregisters_shell_client_and_clears_tree() {
    let h = Harness::new();
    stage_topology_and_bandwidth(&h);
    h.write("shell-client/update_request", "1").unwrap();
    let id = h.service.shell().client_id().unwrap();
    h.framework.take_calls();

    h.service.teardown();

    assert_eq!(h.framework.take_calls(), vec![FrameworkCall::Unregister(id)]);
    assert!(h.fs.is_empty());
    assert!(h.service.clients().is_empty());
    h.service.teardown();
    assert!(h.framework.take_calls().is_empty());
}
