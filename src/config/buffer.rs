use serde::Deserialize;
use serde::Serialize;

use crate::constants::FILL_LIMIT;
use crate::constants::MAX_BUFF_SIZE;
use crate::Error;
use crate::Result;

/// Sizing of the bounded display buffers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BufferConfig {
    /// Fixed capacity of every client/fabric/rules buffer, in bytes
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// A buffer with fewer free bytes than this is cleared before the next
    /// record is appended
    #[serde(default = "default_fill_limit")]
    pub fill_limit: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            fill_limit: default_fill_limit(),
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fill_limit == 0 {
            return Err(Error::InvalidConfig("buffer.fill_limit cannot be 0".into()));
        }
        if self.capacity <= self.fill_limit {
            return Err(Error::InvalidConfig(format!(
                "buffer.capacity ({}) must exceed buffer.fill_limit ({})",
                self.capacity, self.fill_limit
            )));
        }
        Ok(())
    }
}

fn default_capacity() -> usize {
    MAX_BUFF_SIZE
}
fn default_fill_limit() -> usize {
    FILL_LIMIT
}
