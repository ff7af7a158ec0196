//! Builder for the [`BusDbg`] service.
//!
//! Only the scaling framework is mandatory. The device graph defaults to an
//! empty topology and the rules file to empty output.
//!
//! ## Example
//! ```ignore
//! let service = BusDbgBuilder::new(config, framework)
//!     .topology(graph)
//!     .rules(formatter)
//!     .build();
//! service.bring_up(fs)?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::debug;

use super::BusDbg;
use crate::BusDbgConfig;
use crate::ClientRegistry;
use crate::CommandParser;
use crate::ConsumerLinkRegistry;
use crate::EmptyTopology;
use crate::FabricRegistry;
use crate::NoRules;
use crate::RulesFormatter;
use crate::ScalingFramework;
use crate::ShellClient;
use crate::ShellClientState;
use crate::TopologyGraph;

pub struct BusDbgBuilder {
    config: BusDbgConfig,
    framework: Arc<dyn ScalingFramework>,
    topology: Option<Arc<dyn TopologyGraph>>,
    rules: Option<Arc<dyn RulesFormatter>>,
}

impl BusDbgBuilder {
    pub fn new(
        config: BusDbgConfig,
        framework: Arc<dyn ScalingFramework>,
    ) -> Self {
        Self {
            config,
            framework,
            topology: None,
            rules: None,
        }
    }

    /// Device graph walked by the BCM client dump.
    pub fn topology(
        mut self,
        topology: Arc<dyn TopologyGraph>,
    ) -> Self {
        self.topology = Some(topology);
        self
    }

    /// Formatter behind the `print_rules` file.
    pub fn rules(
        mut self,
        rules: Arc<dyn RulesFormatter>,
    ) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn build(self) -> Arc<BusDbg> {
        let topology = self.topology.unwrap_or_else(|| Arc::new(EmptyTopology));
        let rules = self.rules.unwrap_or_else(|| Arc::new(NoRules));

        let clients = ClientRegistry::new(ShellClientState::new(&self.config.shell_client.name));
        let consumer_links = ConsumerLinkRegistry::new(clients.clone(), topology);
        let shell = ShellClient::new(clients.clone(), self.framework.clone());
        let parser = CommandParser::new(clients.clone(), self.framework, self.config.command.clone());
        debug!(?self.config, "Built bus debug service");

        Arc::new(BusDbg {
            config: self.config,
            epoch: Instant::now(),
            clients,
            fabrics: FabricRegistry::new(),
            consumer_links,
            shell,
            parser,
            rules,
            rules_buffer: Mutex::new(None),
            surface: ArcSwapOption::empty(),
            lifecycle: Mutex::new(()),
        })
    }
}
