use serde::Deserialize;
use serde::Serialize;

/// Update-request text protocol
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CommandConfig {
    /// When false (default) an index equal to the usecase count is still
    /// accepted and only `index > num_usecases` is rejected. When true the
    /// index must address an existing usecase (`index < num_usecases`).
    #[serde(default)]
    pub strict_usecase_bound: bool,
}

impl CommandConfig {
    /// Whether `index` is rejected for a table holding `num_usecases` entries.
    pub fn is_out_of_range(
        &self,
        index: u64,
        num_usecases: usize,
    ) -> bool {
        let count = num_usecases as u64;
        if self.strict_usecase_bound {
            index >= count
        } else {
            index > count
        }
    }
}
