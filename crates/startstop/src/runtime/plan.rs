//! Start plan for dry-run display

use super::component::{self, Step};
use super::graph::{Node, NodeId};
use super::levels::{self, CycleError};

/// Levels in start order, with what each node will be asked to do.
#[derive(Debug, Clone)]
pub struct Plan {
    pub levels: Vec<PlanLevel>,
}

/// One level of the plan
#[derive(Debug, Clone)]
pub struct PlanLevel {
    /// Eligible transitive dependencies shared by every member
    pub dependencies: usize,
    pub nodes: Vec<PlanNode>,
}

/// A node in the plan
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub id: NodeId,
    pub name: String,
    pub steps: Vec<Step>,
    /// Direct dependencies as (field, object name)
    pub dependencies: Vec<(String, String)>,
}

impl Plan {
    pub(crate) fn build(nodes: &[Node], subset: &[NodeId]) -> Result<Self, CycleError> {
        let levels = levels::keyed_levels(nodes, subset)?
            .into_iter()
            .rev()
            .map(|(dependencies, level)| PlanLevel {
                dependencies,
                nodes: level
                    .into_iter()
                    .map(|id| {
                        let node = &nodes[id.index()];
                        PlanNode {
                            id,
                            name: node.to_string(),
                            steps: component::steps(node.value()),
                            dependencies: node
                                .dependencies()
                                .iter()
                                .map(|dep| (dep.field.clone(), nodes[dep.object.index()].to_string()))
                                .collect(),
                        }
                    })
                    .collect(),
            })
            .collect();
        Ok(Self { levels })
    }

    /// Node names in the order `start` visits them.
    pub fn start_order(&self) -> impl Iterator<Item = &str> {
        self.levels
            .iter()
            .flat_map(|level| level.nodes.iter().map(|node| node.name.as_str()))
    }
}

/// Display the plan in a human-readable format
impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Start Plan")?;
        writeln!(f, "==========")?;

        for (i, level) in self.levels.iter().enumerate() {
            writeln!(f)?;
            let noun = if level.dependencies == 1 {
                "dependency"
            } else {
                "dependencies"
            };
            writeln!(
                f,
                "Level {} ({} eligible {}):",
                i + 1,
                level.dependencies,
                noun
            )?;
            for node in &level.nodes {
                let steps: Vec<&str> = node.steps.iter().map(|s| s.as_str()).collect();
                writeln!(f, "  {} [{}]", node.name, steps.join(", "))?;
                for (field, object) in &node.dependencies {
                    writeln!(f, "     {} -> {}", field, object)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Context, Graph, Stopper};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Plain;
    crate::component!(Plain);

    struct Worker;

    #[async_trait]
    impl Stopper for Worker {
        async fn stop(&self, _ctx: &Context) -> anyhow::Result<()> {
            Ok(())
        }
    }

    crate::component!(Worker: Stopper);

    #[test]
    fn test_plan_lists_start_order() {
        let mut builder = Graph::builder();
        let queue = builder.add("queue", Arc::new(Worker));
        let settings = builder.add("settings", Arc::new(Plain));
        let consumer = builder.add("consumer", Arc::new(Worker));
        builder.depend(consumer, "queue", queue).unwrap();
        builder.depend(consumer, "settings", settings).unwrap();
        let graph = builder.build();

        let plan = graph.plan().unwrap();
        let order: Vec<_> = plan.start_order().collect();
        assert_eq!(order, vec!["queue", "consumer"]);
        assert_eq!(plan.levels[0].dependencies, 0);
        assert_eq!(plan.levels[1].dependencies, 1);

        let rendered = plan.to_string();
        assert!(rendered.contains("Level 1 (0 eligible dependencies):"));
        assert!(rendered.contains("Level 2 (1 eligible dependency):"));
        assert!(rendered.contains("  consumer [stop]"));
        assert!(rendered.contains("     settings -> settings"));
    }
}
