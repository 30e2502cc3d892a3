//! Build manifest produced by the interfaces.
//!
//! A [`TargetsDescription`] lists, per library, the generated sources, the
//! preprocessor flags, the link dependencies and the exported entry points.
//! It is filled by every interface treated and consumed by an external
//! build-file generator.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use petgraph::algo::{is_cyclic_directed, kosaraju_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::interfaces::errors::GenerationError;

/// Output format of the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestFormat::Json => "targets.json",
            ManifestFormat::Toml => "targets.toml",
        }
    }
}

impl std::str::FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ManifestFormat::Json),
            "toml" => Ok(ManifestFormat::Toml),
            _ => Err(format!(
                "invalid manifest format '{}'; expected 'json' or 'toml'",
                s
            )),
        }
    }
}

/// A shared library to be built from generated sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryDescription {
    /// Library name, without prefix or suffix
    pub name: String,
    /// File name prefix (`lib` on unix)
    pub prefix: String,
    /// File name suffix (`so`, `dll`...)
    pub suffix: String,
    /// Generated sources
    pub sources: Vec<String>,
    /// Preprocessor flags
    pub cppflags: Vec<String>,
    /// Include directories
    pub include_directories: Vec<String>,
    /// Link directories
    pub link_directories: Vec<String>,
    /// Libraries to link against
    pub link_libraries: Vec<String>,
    /// Exported entry points
    pub entry_points: Vec<String>,
    /// Other libraries of the manifest this one depends on
    pub deps: Vec<String>,
}

impl LibraryDescription {
    /// Create a shared library description with the platform naming.
    pub fn new(name: impl Into<String>) -> Self {
        let (prefix, suffix) = if cfg!(windows) {
            ("", "dll")
        } else if cfg!(target_os = "macos") {
            ("lib", "dylib")
        } else {
            ("lib", "so")
        };
        LibraryDescription {
            name: name.into(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            ..Default::default()
        }
    }

    /// File name of the built library.
    pub fn file_name(&self) -> String {
        format!("{}{}.{}", self.prefix, self.name, self.suffix)
    }

    /// Merge another description of the same library.
    pub fn merge(&mut self, other: &LibraryDescription) {
        insert_all(&mut self.sources, &other.sources);
        insert_all(&mut self.cppflags, &other.cppflags);
        insert_all(&mut self.include_directories, &other.include_directories);
        insert_all(&mut self.link_directories, &other.link_directories);
        insert_all(&mut self.link_libraries, &other.link_libraries);
        insert_all(&mut self.entry_points, &other.entry_points);
        insert_all(&mut self.deps, &other.deps);
    }
}

/// A named target built by shell commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificTarget {
    pub deps: Vec<String>,
    pub commands: Vec<String>,
}

/// The build manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsDescription {
    pub libraries: BTreeMap<String, LibraryDescription>,
    /// Generated headers, relative to the output directory
    pub headers: Vec<String>,
    pub specific_targets: BTreeMap<String, SpecificTarget>,
}

/// Append the values not already present, keeping the order.
pub fn insert_if(values: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}

fn insert_all(values: &mut Vec<String>, others: &[String]) {
    for v in others {
        insert_if(values, v.clone());
    }
}

impl TargetsDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a library.
    pub fn library_mut(&mut self, name: &str) -> &mut LibraryDescription {
        self.libraries
            .entry(name.to_string())
            .or_insert_with(|| LibraryDescription::new(name))
    }

    pub fn library(&self, name: &str) -> Option<&LibraryDescription> {
        self.libraries.get(name)
    }

    /// Get or create a specific target.
    pub fn specific_target_mut(&mut self, name: &str) -> &mut SpecificTarget {
        self.specific_targets.entry(name.to_string()).or_default()
    }

    /// Merge another manifest into this one.
    pub fn merge(&mut self, other: &TargetsDescription) {
        for (name, lib) in &other.libraries {
            self.library_mut(name).merge(lib);
        }
        insert_all(&mut self.headers, &other.headers);
        for (name, target) in &other.specific_targets {
            let t = self.specific_target_mut(name);
            insert_all(&mut t.deps, &target.deps);
            insert_all(&mut t.commands, &target.commands);
        }
    }

    /// Specific targets in dependency order (dependencies first).
    ///
    /// Dependencies that are not specific targets (libraries, files) are
    /// ignored. A cycle is an error.
    pub fn specific_targets_order(&self) -> Result<Vec<String>, GenerationError> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        for name in self.specific_targets.keys() {
            nodes.insert(name.as_str(), graph.add_node(name.as_str()));
        }
        for (name, target) in &self.specific_targets {
            for dep in &target.deps {
                if let Some(&d) = nodes.get(dep.as_str()) {
                    // edge from the dependency to the dependent
                    graph.add_edge(d, nodes[name.as_str()], ());
                }
            }
        }
        if is_cyclic_directed(&graph) {
            let targets = kosaraju_scc(&graph)
                .into_iter()
                .find(|scc| {
                    scc.len() > 1 || graph.contains_edge(scc[0], scc[0])
                })
                .map(|scc| scc.into_iter().map(|n| graph[n].to_string()).collect())
                .unwrap_or_default();
            return Err(GenerationError::SpecificTargetCycle { targets });
        }
        let order = petgraph::algo::toposort(&graph, None)
            .map_err(|_| GenerationError::SpecificTargetCycle {
                targets: Vec::new(),
            })?
            .into_iter()
            .map(|n| graph[n].to_string())
            .collect();
        Ok(order)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize the targets description")
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize the targets description")
    }

    /// Write the manifest, merged with an already existing one.
    pub fn write(&self, dir: &Path, format: ManifestFormat) -> Result<std::path::PathBuf> {
        self.specific_targets_order()
            .map_err(|e| anyhow::anyhow!("{}", e.to_diagnostic()))?;
        let path = dir.join(format.file_name());
        let mut merged = if path.exists() {
            let contents = crate::util::fs::read_to_string(&path)?;
            match format {
                ManifestFormat::Json => serde_json::from_str(&contents)
                    .with_context(|| format!("failed to parse {}", path.display()))?,
                ManifestFormat::Toml => toml::from_str(&contents)
                    .with_context(|| format!("failed to parse {}", path.display()))?,
            }
        } else {
            TargetsDescription::new()
        };
        merged.merge(self);
        let contents = match format {
            ManifestFormat::Json => merged.to_json()?,
            ManifestFormat::Toml => merged.to_toml()?,
        };
        crate::util::fs::write_string(&path, &contents)?;
        tracing::debug!("wrote build manifest {}", path.display());
        Ok(path)
    }
}
