use std::sync::Arc;
use std::thread;

use tracing_test::traced_test;

use super::*;
use crate::test_utils::descriptor_record;
use crate::test_utils::handle_record;
use crate::ClientHandle;
use crate::RegistryError;
use crate::ShellClientState;

fn registry() -> ClientRegistry {
    ClientRegistry::new(ShellClientState::new("test-client"))
}

#[test]
#[traced_test]
fn register_then_find_by_identity() {
    let registry = registry();
    registry.register(descriptor_record(7, "gpu", 3)).unwrap();

    let record = registry.find_by_identity(&ClientIdentity::Id(7)).unwrap();
    assert_eq!(record.client_id(), Some(7));
    assert_eq!(record.name().as_deref(), Some("gpu"));
    assert_eq!(record.index(), -1);
    assert_eq!(record.vote_count(), 0);
    assert!(registry.find_by_identity(&ClientIdentity::Id(8)).is_none());
}

#[test]
fn duplicate_identity_is_rejected() {
    let registry = registry();
    registry.register(descriptor_record(7, "gpu", 3)).unwrap();

    let err = registry.register(descriptor_record(7, "gpu-again", 1)).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateClient { .. }));
    assert_eq!(registry.len(), 1);
    let kept = registry.find_by_identity(&ClientIdentity::Id(7)).unwrap();
    assert_eq!(kept.name().as_deref(), Some("gpu"));
}

#[test]
fn handle_identity_matches_by_reference_only() {
    let registry = registry();
    let (handle, record) = handle_record("camera");
    registry.register(record).unwrap();

    let same_name = ClientHandle::new(Some("camera".into()), 26, 512);
    assert!(registry.find_by_identity(&ClientIdentity::Handle(handle.clone())).is_some());
    assert!(registry.find_by_identity(&ClientIdentity::Handle(same_name.clone())).is_none());

    // A distinct handle with the same name is a distinct client.
    let other = ClientRecord::from_handle(same_name, crate::test_utils::display_buffer());
    registry.register(other).unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn unregister_absent_identity_is_noop() {
    let registry = registry();
    registry.register(descriptor_record(1, "gpu", 2)).unwrap();

    assert!(registry.unregister(&ClientIdentity::Id(99)).is_none());
    assert_eq!(registry.len(), 1);
    assert!(registry.unregister(&ClientIdentity::Id(1)).is_some());
    assert!(registry.is_empty());
}

#[test]
fn reregister_after_unregister_is_allowed() {
    let registry = registry();
    registry.register(descriptor_record(1, "gpu", 2)).unwrap();
    registry.unregister(&ClientIdentity::Id(1));

    assert!(registry.register(descriptor_record(1, "gpu", 2)).is_ok());
}

#[test]
fn name_search_uses_insertion_order_and_returns_trailing_token() {
    let registry = registry();
    registry.register(descriptor_record(20, "video", 4)).unwrap();
    registry.register(descriptor_record(10, "video-enc", 4)).unwrap();

    // "video" was inserted first and is a substring of "video-enc".
    let (record, token) = registry.find_by_name_substring(b"video-enc 2").unwrap();
    assert_eq!(record.client_id(), Some(20));
    assert_eq!(token, Some(&b"2"[..]));
}

#[test]
fn name_search_without_space_yields_no_token() {
    let registry = registry();
    registry.register(descriptor_record(3, "gpu", 4)).unwrap();

    let (record, token) = registry.find_by_name_substring(b"gpu").unwrap();
    assert_eq!(record.client_id(), Some(3));
    assert_eq!(token, None);

    let (_, token) = registry.find_by_name_substring(b"gpu ").unwrap();
    assert_eq!(token, Some(&b""[..]));
}

#[test]
fn name_search_skips_handle_clients() {
    let registry = registry();
    let (_, record) = handle_record("camera");
    registry.register(record).unwrap();

    assert!(registry.find_by_name_substring(b"camera 1").is_none());
}

#[test]
fn snapshot_read_slices_display_buffer() {
    let registry = registry();
    let mut record = descriptor_record(5, "gpu", 2);
    record.buffer.append("0123456789");
    registry.register(record).unwrap();

    let id = ClientIdentity::Id(5);
    assert_eq!(registry.snapshot_read(&id, 2, 3), Some(b"234".to_vec()));
    assert_eq!(registry.snapshot_read(&id, 20, 3), Some(Vec::new()));
    assert_eq!(registry.snapshot_read(&ClientIdentity::Id(6), 0, 3), None);
}

#[test]
fn clear_releases_all_records_and_is_idempotent() {
    let registry = registry();
    registry.register(descriptor_record(1, "a", 1)).unwrap();
    registry.register(descriptor_record(2, "b", 1)).unwrap();

    assert_eq!(registry.clear().len(), 2);
    assert!(registry.is_empty());
    assert!(registry.clear().is_empty());
}

#[test]
fn concurrent_register_unregister_never_duplicates() {
    let registry = Arc::new(registry());
    let mut handles = vec![];

    for t in 0..8u32 {
        let registry = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            for round in 0..200u32 {
                let id = (t + round) % 5 + 1;
                let _ = registry.register(descriptor_record(id, "c", 1));
                if round % 3 == 0 {
                    registry.unregister(&ClientIdentity::Id(id));
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let mut ids = registry.identities();
    let before = ids.len();
    ids.sort_by_key(|i| match i {
        ClientIdentity::Id(id) => *id,
        ClientIdentity::Handle(_) => 0,
    });
    ids.dedup();
    assert_eq!(ids.len(), before);
    assert!(before <= 5);
}
