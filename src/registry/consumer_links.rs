use std::sync::Arc;

use tracing::info;
use tracing::warn;

use super::ClientRegistry;
use crate::NodeId;
use crate::TopologyGraph;

/// One consumer's votes as seen through a BCM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerLinkVote {
    pub bcm_name: String,
    pub consumer_name: String,
    /// Active-context values, or the sleep-context values when the active
    /// pair is zero
    pub active_ab: u64,
    pub active_ib: u64,
    pub sleep_ab: u64,
    pub sleep_ib: u64,
}

/// Read path over the device graph, aggregating consumer votes per BCM.
///
/// The BCM list lives in the client domain, so registration and the walk
/// both run under the client registry's lock.
#[derive(Clone)]
pub struct ConsumerLinkRegistry {
    clients: ClientRegistry,
    graph: Arc<dyn TopologyGraph>,
}

impl ConsumerLinkRegistry {
    pub fn new(
        clients: ClientRegistry,
        graph: Arc<dyn TopologyGraph>,
    ) -> Self {
        Self { clients, graph }
    }

    /// Adds a BCM node to the walk; repeated ids are ignored.
    pub fn add_bcm(
        &self,
        bcm: NodeId,
    ) {
        self.clients.with_domain(|d| {
            if !d.bcms.contains(&bcm) {
                d.bcms.push(bcm);
            }
        });
    }

    pub fn remove_bcm(
        &self,
        bcm: NodeId,
    ) {
        self.clients.with_domain(|d| d.bcms.retain(|id| *id != bcm));
    }

    pub fn bcms(&self) -> Vec<NodeId> {
        self.clients.with_domain(|d| d.bcms.clone())
    }

    /// Walks BCM → link → consumer device → consumer link and returns one
    /// entry per in-use consumer link carrying a non-zero vote.
    pub fn collect(&self) -> Vec<ConsumerLinkVote> {
        self.clients.with_domain(|d| {
            let mut votes = Vec::new();
            for bcm_id in &d.bcms {
                let Some(bcm) = self.graph.find_node(*bcm_id) else {
                    warn!(bcm = bcm_id, "BCM node missing from device graph");
                    continue;
                };
                for link in bcm.links.iter().filter(|l| l.in_use) {
                    let Some(consumer) = self.graph.find_node(link.bus_dev_id) else {
                        warn!(bcm = %bcm.name, device = link.bus_dev_id, "Consumer device not found");
                        continue;
                    };
                    for lnode in consumer.links.iter().filter(|l| l.in_use) {
                        if lnode.active.is_zero() && lnode.sleep.is_zero() {
                            continue;
                        }
                        let active = if lnode.active.is_zero() {
                            lnode.sleep
                        } else {
                            lnode.active
                        };
                        votes.push(ConsumerLinkVote {
                            bcm_name: bcm.name.clone(),
                            consumer_name: lnode.consumer_name.clone(),
                            active_ab: active.ab,
                            active_ib: active.ib,
                            sleep_ab: lnode.sleep.ab,
                            sleep_ib: lnode.sleep.ib,
                        });
                    }
                }
            }
            votes
        })
    }

    /// Emits every collected vote on the `bus_bcm_client_status` target.
    pub fn dump(&self) -> Vec<ConsumerLinkVote> {
        let votes = self.collect();
        for v in &votes {
            info!(
                target: "bus_bcm_client_status",
                bcm = %v.bcm_name,
                client = %v.consumer_name,
                act_ab = v.active_ab,
                act_ib = v.active_ib,
                slp_ab = v.sleep_ab,
                slp_ib = v.sleep_ib,
                "bcm client vote"
            );
        }
        votes
    }
}
