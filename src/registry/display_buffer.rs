use std::fmt;

use crate::utils::bytes::read_slice;
use crate::BufferConfig;
use crate::Error;
use crate::Result;

/// Fixed-capacity text snapshot served by an inspection file.
///
/// Appends past the capacity are truncated. A new record starts from an empty
/// buffer once fewer than `fill_limit` bytes remain.
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    data: Vec<u8>,
    capacity: usize,
    fill_limit: usize,
}

impl DisplayBuffer {
    /// Reserves the whole capacity up front.
    pub fn try_new(config: &BufferConfig) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(config.capacity)
            .map_err(|_| Error::allocation(config.capacity))?;
        Ok(Self {
            data,
            capacity: config.capacity,
            fill_limit: config.fill_limit,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Makes room for one more record.
    pub fn begin_record(&mut self) {
        if self.data.len() + self.fill_limit > self.capacity {
            self.data.clear();
        }
    }

    /// Appends as much of `text` as fits; returns the number of bytes written.
    pub fn append(
        &mut self,
        text: &str,
    ) -> usize {
        let room = self.capacity - self.data.len();
        let take = text.len().min(room);
        self.data.extend_from_slice(&text.as_bytes()[..take]);
        take
    }

    pub fn read_at(
        &self,
        offset: u64,
        count: usize,
    ) -> Vec<u8> {
        read_slice(&self.data, offset, count)
    }
}

impl fmt::Write for DisplayBuffer {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        self.append(s);
        Ok(())
    }
}

impl fmt::Debug for DisplayBuffer {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("DisplayBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
