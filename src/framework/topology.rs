use super::NodeId;

/// `(ab, ib)` pair voted in one context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bandwidth {
    pub ab: u64,
    pub ib: u64,
}

impl Bandwidth {
    pub fn new(
        ab: u64,
        ib: u64,
    ) -> Self {
        Self { ab, ib }
    }

    pub fn is_zero(&self) -> bool {
        self.ab == 0 && self.ib == 0
    }
}

/// Consumer-to-node binding as published by the device graph
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkNode {
    pub in_use: bool,
    /// Device the link points at
    pub bus_dev_id: NodeId,
    pub consumer_name: String,
    pub active: Bandwidth,
    pub sleep: Bandwidth,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BusNode {
    pub id: NodeId,
    pub name: String,
    pub links: Vec<LinkNode>,
}
