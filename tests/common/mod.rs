use std::collections::HashMap;
use std::sync::Arc;

use bus_dbg::Bandwidth;
use bus_dbg::BusDbg;
use bus_dbg::BusDbgBuilder;
use bus_dbg::BusDbgConfig;
use bus_dbg::BusNode;
use bus_dbg::ClientDescriptor;
use bus_dbg::ClientId;
use bus_dbg::FrameworkError;
use bus_dbg::LinkNode;
use bus_dbg::LoopbackFramework;
use bus_dbg::MemFs;
use bus_dbg::NodeId;
use bus_dbg::Result;
use bus_dbg::RulesFormatter;
use bus_dbg::ScalingFramework;
use bus_dbg::TopologyGraph;
use parking_lot::Mutex;

pub const ROOT: &str = "msm-bus-dbg";
pub const LOOPBACK_FABRIC: &str = "fab-loopback";

/// Framework call as observed at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameworkCall {
    Register { src: NodeId, dst: NodeId },
    Unregister(ClientId),
    Update(ClientId, u32),
}

/// Loopback framework that also journals every call
pub struct RecordingFramework {
    inner: LoopbackFramework,
    calls: Mutex<Vec<FrameworkCall>>,
}

impl RecordingFramework {
    pub fn new() -> Self {
        Self {
            inner: LoopbackFramework::new(LOOPBACK_FABRIC),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn attach(
        &self,
        service: &Arc<BusDbg>,
    ) {
        self.inner.attach(service);
    }

    pub fn take_calls(&self) -> Vec<FrameworkCall> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl ScalingFramework for RecordingFramework {
    fn register_client(
        &self,
        descriptor: &ClientDescriptor,
    ) -> ClientId {
        let init = descriptor.vector(0, 0).unwrap_or_default();
        self.calls.lock().push(FrameworkCall::Register {
            src: init.src,
            dst: init.dst,
        });
        self.inner.register_client(descriptor)
    }

    fn unregister_client(
        &self,
        client_id: ClientId,
    ) {
        self.calls.lock().push(FrameworkCall::Unregister(client_id));
        self.inner.unregister_client(client_id);
    }

    fn update_request(
        &self,
        client_id: ClientId,
        index: u32,
    ) -> std::result::Result<(), FrameworkError> {
        self.calls.lock().push(FrameworkCall::Update(client_id, index));
        self.inner.update_request(client_id, index)
    }
}

/// Device graph backed by a fixed node table
#[derive(Default)]
pub struct StaticTopology {
    nodes: HashMap<NodeId, BusNode>,
}

impl StaticTopology {
    /// BCM `bcm` → device `device` carrying `consumers`.
    pub fn single_bcm(
        bcm: NodeId,
        device: NodeId,
        consumers: Vec<LinkNode>,
    ) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            bcm,
            BusNode {
                id: bcm,
                name: "MC0".into(),
                links: vec![link(device, "", (0, 0), (0, 0))],
            },
        );
        nodes.insert(
            device,
            BusNode {
                id: device,
                name: "slv-ebi".into(),
                links: consumers,
            },
        );
        Self { nodes }
    }
}

impl TopologyGraph for StaticTopology {
    fn find_node(
        &self,
        id: NodeId,
    ) -> Option<BusNode> {
        self.nodes.get(&id).cloned()
    }
}

pub struct StaticRules(pub &'static str);

impl RulesFormatter for StaticRules {
    fn render_rules(&self) -> String {
        self.0.to_string()
    }
}

pub fn link(
    dev: NodeId,
    name: &str,
    active: (u64, u64),
    sleep: (u64, u64),
) -> LinkNode {
    LinkNode {
        in_use: true,
        bus_dev_id: dev,
        consumer_name: name.to_string(),
        active: Bandwidth::new(active.0, active.1),
        sleep: Bandwidth::new(sleep.0, sleep.1),
    }
}

/// Live service over an in-memory tree, driven through file paths
pub struct Harness {
    pub service: Arc<BusDbg>,
    pub fs: Arc<MemFs>,
    pub framework: Arc<RecordingFramework>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_topology(StaticTopology::default())
    }

    pub fn with_topology(topology: StaticTopology) -> Self {
        let framework = Arc::new(RecordingFramework::new());
        let service = BusDbgBuilder::new(BusDbgConfig::default(), framework.clone())
            .topology(Arc::new(topology))
            .rules(Arc::new(StaticRules("rule: gpu-throttle\n")))
            .build();
        framework.attach(&service);
        let fs = Arc::new(MemFs::new());
        service.bring_up(fs.clone()).expect("bring up inspection surface");
        Self {
            service,
            fs,
            framework,
        }
    }

    pub fn path(rel: &str) -> String {
        format!("{ROOT}/{rel}")
    }

    pub fn cat(
        &self,
        rel: &str,
    ) -> Result<String> {
        let file = self.fs.resolve(&Self::path(rel))?;
        let bytes = self.service.read(&file, 0, 64 * 1024)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn write(
        &self,
        rel: &str,
        data: &str,
    ) -> Result<usize> {
        let file = self.fs.resolve(&Self::path(rel))?;
        self.service.write(&file, data.as_bytes())
    }

    pub fn names(
        &self,
        rel: &str,
    ) -> Vec<String> {
        self.fs
            .list(&Self::path(rel))
            .expect("list directory")
            .into_iter()
            .map(|e| e.name)
            .collect()
    }
}
