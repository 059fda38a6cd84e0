//! Simulation manifest YAML schema definitions

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::settings::{ConfigError, LifecycleConfig};
use crate::runtime::{Graph, GraphError, SimulatedComponent, Step};

/// Root manifest: lifecycle settings plus the simulated object graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Lifecycle settings
    #[serde(default)]
    pub settings: LifecycleConfig,

    /// Component definitions (ordered map for deterministic node ids)
    pub components: IndexMap<String, ComponentConfig>,
}

/// Component configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Lifecycle capabilities; empty means a plain pass-through object
    #[serde(default)]
    pub capabilities: Vec<Step>,

    /// Dependencies - components referenced by this one
    #[serde(default)]
    pub depends_on: Vec<DependencySpec>,

    /// Simulated duration of each lifecycle call in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Lifecycle call that returns an error
    #[serde(default)]
    pub fail: Option<Step>,
}

/// Dependency specification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// Simple dependency: the field is named after the component
    Simple(String),
    /// Labelled dependency: { component_name: field }
    Labelled(HashMap<String, String>),
}

impl DependencySpec {
    /// Get the component name this dependency refers to
    pub fn component_name(&self) -> Option<&str> {
        match self {
            DependencySpec::Simple(name) => Some(name),
            DependencySpec::Labelled(map) => map.keys().next().map(String::as_str),
        }
    }

    /// Get the referencing field (defaults to the component name)
    pub fn field(&self) -> Option<&str> {
        match self {
            DependencySpec::Simple(name) => Some(name),
            DependencySpec::Labelled(map) => map.values().next().map(String::as_str),
        }
    }
}

impl Manifest {
    /// Load manifest from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse manifest from YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_yaml::from_str(content).map_err(ManifestError::Parse)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ManifestError> {
        self.settings.validate()?;

        for (name, component) in &self.components {
            if let Some(step) = component.fail {
                if !component.capabilities.contains(&step) {
                    return Err(ManifestError::Validation(format!(
                        "Component '{}': cannot fail '{}' without that capability",
                        name, step
                    )));
                }
            }

            for dep in &component.depends_on {
                let (Some(dep_name), Some(_)) = (dep.component_name(), dep.field()) else {
                    return Err(ManifestError::Validation(format!(
                        "Component '{}': empty dependency entry",
                        name
                    )));
                };
                if let DependencySpec::Labelled(map) = dep {
                    if map.len() != 1 {
                        return Err(ManifestError::Validation(format!(
                            "Component '{}': labelled dependency must name exactly one component",
                            name
                        )));
                    }
                }
                if !self.components.contains_key(dep_name) {
                    return Err(ManifestError::Validation(format!(
                        "Component '{}': depends on unknown component '{}'",
                        name, dep_name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Build a graph of simulated components
    pub fn build_graph(&self) -> Result<Graph, ManifestError> {
        let mut builder = Graph::builder();

        let mut ids = HashMap::new();
        for (name, config) in &self.components {
            let component = SimulatedComponent::new(name.clone(), config.capabilities.clone())
                .with_delay(Duration::from_millis(config.delay_ms))
                .with_failure(config.fail);
            ids.insert(name.as_str(), builder.add(name.clone(), Arc::new(component)));
        }

        for (name, config) in &self.components {
            for dep in &config.depends_on {
                let (Some(dep_name), Some(field)) = (dep.component_name(), dep.field()) else {
                    continue;
                };
                let (Some(&from), Some(&to)) = (ids.get(name.as_str()), ids.get(dep_name)) else {
                    return Err(ManifestError::Validation(format!(
                        "Component '{}': depends on unknown component '{}'",
                        name, dep_name
                    )));
                };
                builder.depend(from, field, to)?;
            }
        }

        builder.config(self.settings.clone());
        Ok(builder.build())
    }
}

/// Errors that can occur when loading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
}
