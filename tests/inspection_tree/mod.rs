//! Layout and read paths of the inspection tree.

use std::sync::Arc;

use bus_dbg::BusDbgBuilder;
use bus_dbg::BusDbgConfig;
use bus_dbg::ClientHandle;
use bus_dbg::ConsumerLinkVote;
use bus_dbg::Error;
use bus_dbg::MemFs;
use bus_dbg::ScalingFramework;
use bus_dbg::SurfaceError;
use bus_dbg::ClientDescriptor;
use bus_dbg::PathVector;
use bus_dbg::Usecase;
use bus_dbg::UsecaseTable;

use crate::common::link;
use crate::common::Harness;
use crate::common::RecordingFramework;
use crate::common::StaticTopology;
use crate::common::LOOPBACK_FABRIC;

fn camera() -> ClientDescriptor {
    let usecases = (0..3)
        .map(|i| Usecase::new(vec![PathVector::new(1, 512, 1000 * i, 2000 * i)]))
        .collect();
    ClientDescriptor::new(UsecaseTable::new("camera", usecases))
}

#[test]
fn fixed_layout_is_created_at_bring_up() {
    let h = Harness::new();

    assert_eq!(
        h.names(""),
        vec!["client-data", "commit-data", "rules-dbg", "shell-client"]
    );
    assert_eq!(
        h.names("shell-client"),
        vec!["ab", "ib", "mas", "slv", "update_request"]
    );
    assert_eq!(
        h.names("client-data"),
        vec!["dump_bcm_clients", "dump_clients", "update-request"]
    );
    assert_eq!(h.names("rules-dbg"), vec!["print_rules"]);
    assert!(h.names("commit-data").is_empty());
    assert_eq!(h.cat("shell-client/mas").unwrap(), "-1\n");
}

#[test]
fn records_present_before_bring_up_are_published() {
    let framework = Arc::new(RecordingFramework::new());
    let service = BusDbgBuilder::new(BusDbgConfig::default(), framework.clone()).build();
    framework.attach(&service);
    let id = framework.register_client(&camera());
    service
        .add_handle_client(ClientHandle::new(Some("venus".into()), 63, 512))
        .unwrap();
    framework.update_request(id, 1).unwrap();

    let fs = Arc::new(MemFs::new());
    service.bring_up(fs.clone()).unwrap();

    let clients: Vec<String> = fs
        .list("msm-bus-dbg/client-data")
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(clients.contains(&"camera".to_string()));
    assert!(clients.contains(&"venus".to_string()));
    assert!(fs.exists(&format!("msm-bus-dbg/commit-data/{LOOPBACK_FABRIC}")));
}

#[test]
fn client_votes_reach_client_and_commit_files() {
    let h = Harness::new();
    let id = h.framework.register_client(&camera());

    h.write("client-data/update-request", "camera 2").unwrap();

    let record = h.cat("client-data/camera").unwrap();
    assert!(record.contains("ab     :     2000"), "{record}");
    let commit = h.cat(&format!("commit-data/{LOOPBACK_FABRIC}")).unwrap();
    assert!(commit.contains("node   :   512"), "{commit}");

    let statuses = h.service.dump_clients();
    assert_eq!(statuses.len(), 1);
    assert_eq!((statuses[0].ab, statuses[0].ib, statuses[0].vote_count), (2000, 4000, 1));

    h.framework.unregister_client(id);
    assert!(!h.fs.exists("msm-bus-dbg/client-data/camera"));
}

#[test]
fn dump_files_return_banner_and_report_votes() {
    let topology = StaticTopology::single_bcm(
        1000,
        20,
        vec![
            link(0, "modem", (0, 0), (7, 3)),
            link(0, "idle", (0, 0), (0, 0)),
        ],
    );
    let h = Harness::with_topology(topology);
    h.service.add_bcm(1000);

    assert_eq!(
        h.cat("client-data/dump_bcm_clients").unwrap(),
        "\nDumping current BCM client votes to trace log\n"
    );
    assert_eq!(
        h.cat("client-data/dump_clients").unwrap(),
        "\nDumping current client votes to trace log\n"
    );
    assert_eq!(
        h.service.dump_bcm_clients(),
        vec![ConsumerLinkVote {
            bcm_name: "MC0".into(),
            consumer_name: "modem".into(),
            active_ab: 7,
            active_ib: 3,
            sleep_ab: 7,
            sleep_ib: 3,
        }]
    );
}

#[test]
fn rules_file_renders_formatter_output() {
    let h = Harness::new();
    assert_eq!(h.cat("rules-dbg/print_rules").unwrap(), "rule: gpu-throttle\n");
}

#[test]
fn unknown_paths_and_read_only_files_are_reported() {
    let h = Harness::new();

    assert!(matches!(
        h.cat("client-data/nobody"),
        Err(Error::Surface(SurfaceError::NotFound { .. }))
    ));
    assert!(matches!(
        h.write("rules-dbg/print_rules", "x"),
        Err(Error::Surface(SurfaceError::PermissionDenied { .. }))
    ));
}
