//! Plugin registration and composition.
//!
//! Plugins are data here: a name, ordering hints, and a closed capability
//! variant. Actually applying a capability is the compiler's job.

use crate::error::{ErrorReport, ResolveError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A registered plugin: identity, ordering hints, and the capability it adds.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct PluginDescriptor {
    /// Unique plugin name.
    pub name: String,

    /// Names of plugins this plugin must be applied after.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    /// What the plugin registers with the compiler.
    #[serde(default)]
    pub capability: PluginCapability,
}

/// The closed set of capabilities a plugin can register.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PluginCapability {
    /// New utility class generators.
    Utilities {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        classes: Vec<String>,
    },
    /// New variant modifiers.
    Variants {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<String>,
    },
}

impl Default for PluginCapability {
    fn default() -> Self {
        Self::Utilities {
            classes: Vec::new(),
        }
    }
}

/// Order plugins for application.
///
/// Declaration order is the default; `after` edges induce a stable
/// topological sort, so among otherwise-unconstrained plugins the
/// earliest-declared runs first. Dependencies only ever move a plugin later,
/// never perturb unrelated ones.
pub fn compose(descriptors: &[PluginDescriptor]) -> Result<Vec<PluginDescriptor>, ErrorReport> {
    let mut report = ErrorReport::default();
    let index: BTreeMap<&str, usize> = descriptors
        .iter()
        .enumerate()
        .map(|(position, descriptor)| (descriptor.name.as_str(), position))
        .collect();

    let mut indegree = vec![0usize; descriptors.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); descriptors.len()];
    for (position, descriptor) in descriptors.iter().enumerate() {
        for dependency in &descriptor.after {
            match index.get(dependency.as_str()) {
                Some(&dependency_position) => {
                    dependents[dependency_position].push(position);
                    indegree[position] += 1;
                }
                None => report.push(ResolveError::UnknownDependency {
                    plugin: descriptor.name.clone(),
                    dependency: dependency.clone(),
                }),
            }
        }
    }
    if !report.is_empty() {
        return Err(report);
    }

    // Kahn's algorithm; the ready set is ordered by declaration index, which
    // is the stability tie-break.
    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(position, _)| position)
        .collect();
    let mut ordered = Vec::with_capacity(descriptors.len());
    while let Some(&position) = ready.iter().next() {
        ready.remove(&position);
        ordered.push(descriptors[position].clone());
        for &dependent in &dependents[position] {
            indegree[dependent] -= 1;
            if indegree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if ordered.len() < descriptors.len() {
        let members = descriptors
            .iter()
            .enumerate()
            .filter(|(position, _)| indegree[*position] > 0)
            .map(|(_, descriptor)| descriptor.name.clone())
            .collect();
        report.push(ResolveError::CyclicDependency { members });
        return Err(report);
    }

    Ok(ordered)
}
