use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::utils::bytes::parse_decimal;
use crate::utils::bytes::try_copy;
use crate::ClientId;
use crate::ClientRegistry;
use crate::CommandConfig;
use crate::CommandError;
use crate::Result;
use crate::ScalingFramework;

/// Resolved `(client, usecase index)` pair ready for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    pub client_id: ClientId,
    pub index: u32,
}

#[derive(Clone)]
pub struct CommandParser {
    clients: ClientRegistry,
    framework: Arc<dyn ScalingFramework>,
    config: CommandConfig,
}

impl CommandParser {
    pub fn new(
        clients: ClientRegistry,
        framework: Arc<dyn ScalingFramework>,
        config: CommandConfig,
    ) -> Self {
        Self {
            clients,
            framework,
            config,
        }
    }

    /// Resolves `input` against the live client records.
    ///
    /// `Ok(None)` means nothing is to be dispatched: empty input, no client
    /// name in the input, or a name with no index after it.
    pub fn parse(
        &self,
        input: &[u8],
    ) -> Result<Option<UpdateRequest>> {
        if input.is_empty() {
            return Ok(None);
        }
        let scratch = try_copy(input)?;
        debug!(
            buffer = %String::from_utf8_lossy(&scratch),
            size = scratch.len(),
            "Update request input"
        );

        let Some((record, token)) = self.clients.find_by_name_substring(&scratch) else {
            debug!("No client name found in input");
            return Ok(None);
        };
        let (Some(client_id), Some(descriptor)) = (record.client_id(), record.descriptor()) else {
            return Ok(None);
        };
        let Some(token) = token else {
            debug!(client_id, "Error parsing input. Index not found");
            return Ok(None);
        };

        let index = parse_decimal(token).ok_or_else(|| {
            debug!("Index conversion failed");
            CommandError::InvalidIndexFormat {
                token: String::from_utf8_lossy(token).into_owned(),
            }
        })?;

        let num_usecases = descriptor.num_usecases();
        let out_of_range = || CommandError::IndexOutOfRange {
            client: record.name().unwrap_or_default(),
            index,
            num_usecases,
        };
        if self.config.is_out_of_range(index, num_usecases) {
            debug!(client_id, index, num_usecases, "Invalid index");
            return Err(out_of_range().into());
        }
        let index = u32::try_from(index).map_err(|_| out_of_range())?;

        Ok(Some(UpdateRequest { client_id, index }))
    }

    /// Parses `input` and forwards the request to the scaling framework.
    ///
    /// Returns the number of input bytes consumed. A status reported by the
    /// framework is logged, not returned.
    pub fn execute(
        &self,
        input: &[u8],
    ) -> Result<usize> {
        let Some(request) = self.parse(input)? else {
            return Ok(input.len());
        };

        debug!(client_id = request.client_id, index = request.index, "Dispatching update request");
        if let Err(e) = self.framework.update_request(request.client_id, request.index) {
            warn!(client_id = request.client_id, index = request.index, "Update request failed: {e}");
        }
        Ok(input.len())
    }
}
