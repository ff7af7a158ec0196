use crate::BufferConfig;
use crate::BusDbgConfig;
use crate::ClientDescriptor;
use crate::ClientHandle;
use crate::ClientId;
use crate::ClientRecord;
use crate::DisplayBuffer;
use crate::PathVector;
use crate::Usecase;
use crate::UsecaseTable;

pub(crate) fn display_buffer() -> DisplayBuffer {
    DisplayBuffer::try_new(&BufferConfig::default()).expect("allocate display buffer")
}

/// `num_usecases` single-path usecases; usecase `i` votes `ab = 100 * i`, `ib = 200 * i`.
pub(crate) fn sample_descriptor(
    name: &str,
    num_usecases: usize,
) -> ClientDescriptor {
    let usecases = (0..num_usecases as u64)
        .map(|i| Usecase::new(vec![PathVector::new(1, 512, 100 * i, 200 * i)]))
        .collect();
    ClientDescriptor::new(UsecaseTable::new(name, usecases))
}

pub(crate) fn descriptor_record(
    id: ClientId,
    name: &str,
    num_usecases: usize,
) -> ClientRecord {
    ClientRecord::from_descriptor(id, sample_descriptor(name, num_usecases), display_buffer())
}

pub(crate) fn handle_record(name: &str) -> (ClientHandle, ClientRecord) {
    let handle = ClientHandle::new(Some(name.to_string()), 26, 512);
    let record = ClientRecord::from_handle(handle.clone(), display_buffer());
    (handle, record)
}

pub(crate) fn test_config() -> BusDbgConfig {
    BusDbgConfig::default()
}
