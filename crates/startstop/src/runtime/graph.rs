//! Object graph model: nodes, labelled dependency edges and the graph handle

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::component::{self, Component};
use super::context::Context;
use super::driver;
use super::error::LifecycleError;
use super::levels::{self, CycleError, Level};
use super::phase;
use super::plan::Plan;
use crate::config::LifecycleConfig;

/// Index of a node inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A labelled reference from one node to the node it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependence {
    /// Name of the referencing field, for diagnostics
    pub field: String,
    /// The node depended upon
    pub object: NodeId,
}

/// A wrapped application object plus its outgoing dependencies.
pub struct Node {
    name: String,
    value: Arc<dyn Component>,
    dependencies: Vec<Dependence>,
    eligible: bool,
}

impl Node {
    fn new(name: String, value: Arc<dyn Component>) -> Self {
        let eligible = component::is_eligible(value.as_ref());
        Self {
            name,
            value,
            dependencies: Vec::new(),
            eligible,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &dyn Component {
        self.value.as_ref()
    }

    pub fn dependencies(&self) -> &[Dependence] {
        &self.dependencies
    }

    /// Whether the object implements at least one lifecycle capability.
    pub fn is_eligible(&self) -> bool {
        self.eligible
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("eligible", &self.eligible)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

pub(crate) struct GraphInner {
    pub(crate) nodes: Vec<Node>,
    pub(crate) config: LifecycleConfig,
    pub(crate) started: Mutex<Vec<NodeId>>,
}

impl GraphInner {
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len()).map(NodeId).collect()
    }
}

/// A built object graph whose lifecycle can be driven once.
///
/// `start` brings every eligible object up dependency-first, `stop` tears
/// the successfully started ones down dependent-first. A graph is started
/// and stopped at most once: calling `start` a second time is unsupported
/// and its outcome is unspecified.
///
/// Cloning is cheap and shares the same graph.
#[derive(Clone)]
pub struct Graph {
    inner: Arc<GraphInner>,
}

impl Graph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.inner.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.inner
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.inner.config
    }

    #[cfg(test)]
    pub(crate) fn inner_nodes(&self) -> &[Node] {
        &self.inner.nodes
    }

    /// Levels over every node, most-depended-upon level last.
    pub fn levels(&self) -> Result<Vec<Level>, CycleError> {
        levels::levels(&self.inner.nodes, &self.inner.ids())
    }

    /// Start order with capabilities, for dry runs.
    pub fn plan(&self) -> Result<Plan, CycleError> {
        Plan::build(&self.inner.nodes, &self.inner.ids())
    }

    /// Snapshot of the nodes whose start-phase calls completed.
    pub async fn started(&self) -> Vec<NodeId> {
        self.inner.started.lock().await.clone()
    }

    /// Open and start every eligible object, dependencies first.
    ///
    /// Returns the first lifecycle error, or the context's own error if it
    /// is cancelled or its deadline passes first. In the latter case the
    /// phase may still be running in the background and the started set
    /// has an unknown extent (see `TimeoutPolicy`).
    pub async fn start(&self, ctx: &Context) -> Result<(), LifecycleError> {
        let inner = Arc::clone(&self.inner);
        phase::with_timeout(ctx, self.inner.config.on_timeout, "start", move |ctx| async move {
            driver::start(&inner, &ctx).await
        })
        .await
    }

    /// Stop and close every successfully started object, dependents first.
    pub async fn stop(&self, ctx: &Context) -> Result<(), LifecycleError> {
        let inner = Arc::clone(&self.inner);
        phase::with_timeout(ctx, self.inner.config.on_timeout, "stop", move |ctx| async move {
            driver::stop(&inner, &ctx).await
        })
        .await
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.inner.nodes)
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Collects nodes and edges handed over by the graph builder.
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    config: LifecycleConfig,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the graph.
    pub fn add<C: Component>(&mut self, name: impl Into<String>, value: Arc<C>) -> NodeId {
        self.add_shared(name, value)
    }

    /// Add an already type-erased object to the graph.
    pub fn add_shared(&mut self, name: impl Into<String>, value: Arc<dyn Component>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name.into(), value));
        id
    }

    /// Record that field `field` of `from` references `to`.
    pub fn depend(
        &mut self,
        from: NodeId,
        field: impl Into<String>,
        to: NodeId,
    ) -> Result<(), GraphError> {
        let field = field.into();
        if to.0 >= self.nodes.len() {
            return Err(GraphError::UnknownNode { id: to, field });
        }
        let Some(node) = self.nodes.get_mut(from.0) else {
            return Err(GraphError::UnknownNode { id: from, field });
        };
        node.dependencies.push(Dependence { field, object: to });
        Ok(())
    }

    pub fn config(&mut self, config: LifecycleConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Graph {
        Graph {
            inner: Arc::new(GraphInner {
                nodes: self.nodes,
                config: self.config,
                started: Mutex::new(Vec::new()),
            }),
        }
    }
}

/// Errors raised while handing a graph over
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Dependency '{field}' refers to unknown node {id}")]
    UnknownNode { id: NodeId, field: String },
}
