//! Boundary to the collaborators this crate instruments but does not own:
//! the bandwidth scaling framework, the bus device graph and the rules
//! formatter.
mod loopback;
mod topology;
mod usecase;
pub use loopback::*;
pub use topology::*;
pub use usecase::*;


#[cfg(test)]
use mockall::automock;

use crate::FrameworkError;

#[cfg_attr(test, automock)]
pub trait ScalingFramework: Send + Sync + 'static {
    /// Registers a client; returns its id, or `0` when the framework declines.
    fn register_client(
        &self,
        descriptor: &ClientDescriptor,
    ) -> ClientId;

    fn unregister_client(
        &self,
        client_id: ClientId,
    );

    /// Switches the client's vote to usecase `index` of its descriptor.
    fn update_request(
        &self,
        client_id: ClientId,
        index: u32,
    ) -> Result<(), FrameworkError>;
}

#[cfg_attr(test, automock)]
pub trait TopologyGraph: Send + Sync + 'static {
    fn find_node(
        &self,
        id: NodeId,
    ) -> Option<BusNode>;
}

#[cfg_attr(test, automock)]
pub trait RulesFormatter: Send + Sync + 'static {
    /// Current rule configuration, rendered as text.
    fn render_rules(&self) -> String;
}

/// Graph with no nodes; every BCM walk comes back empty.
#[derive(Debug, Default)]
pub struct EmptyTopology;

impl TopologyGraph for EmptyTopology {
    fn find_node(
        &self,
        _id: NodeId,
    ) -> Option<BusNode> {
        None
    }
}

/// Formatter used when no rules engine is attached.
#[derive(Debug, Default)]
pub struct NoRules;

impl RulesFormatter for NoRules {
    fn render_rules(&self) -> String {
        String::new()
    }
}
