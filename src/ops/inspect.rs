//! Implementation of `mfront-interfaces list` and `mfront-interfaces hypotheses`.

use std::path::Path;

use anyhow::Result;

use crate::core::hypothesis::ModellingHypothesis;
use crate::interfaces::{InterfaceRegistry, KeywordFile};
use crate::ops::generate::{load_behaviour, select_interfaces, treat_keywords};

/// What an interface supports.
#[derive(Debug, Clone)]
pub struct InterfaceSummary {
    pub name: &'static str,

    /// Library name of a behaviour without `@Library`
    pub library: String,

    pub hypotheses: Vec<ModellingHypothesis>,

    pub behaviour_types: Vec<String>,

    /// Interface specific keywords, prefixed
    pub keywords: Vec<String>,
}

/// Summaries of the registered interfaces.
pub fn list_interfaces(registry: &InterfaceRegistry) -> Vec<InterfaceSummary> {
    registry
        .all()
        .map(|i| {
            let profile = i.profile();
            InterfaceSummary {
                name: i.name(),
                library: profile.library_name(""),
                hypotheses: profile.supported_hypotheses(),
                behaviour_types: profile
                    .behaviour_types
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
                keywords: i.keywords(),
            }
        })
        .collect()
}

/// Format the summaries for the terminal.
pub fn format_summaries(summaries: &[InterfaceSummary], verbose: bool) -> String {
    let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for s in summaries {
        let hypotheses: Vec<String> = s.hypotheses.iter().map(|h| h.to_string()).collect();
        out.push_str(&format!(
            "{:width$}  {}\n",
            s.name,
            hypotheses.join(", "),
            width = width
        ));
        if verbose {
            out.push_str(&format!("{:width$}  library: {}\n", "", s.library, width = width));
            out.push_str(&format!(
                "{:width$}  behaviours: {}\n",
                "",
                s.behaviour_types.join(", "),
                width = width
            ));
            if !s.keywords.is_empty() {
                out.push_str(&format!(
                    "{:width$}  keywords: {}\n",
                    "",
                    s.keywords.join(", "),
                    width = width
                ));
            }
        }
    }
    out
}

/// Hypotheses an interface would treat for a behaviour.
pub fn treated_hypotheses(
    behaviour: &Path,
    interface: &str,
    keywords: Option<&Path>,
) -> Result<Vec<ModellingHypothesis>> {
    let registry = InterfaceRegistry::new();
    let selected = select_interfaces(&registry, &[interface.to_string()])?;
    let mut bd = load_behaviour(behaviour)?;
    if let Some(path) = keywords {
        treat_keywords(&selected, &mut bd, &KeywordFile::load(path)?)?;
    }
    Ok(selected[0].modelling_hypotheses_to_be_treated(&bd)?)
}
