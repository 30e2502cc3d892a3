//! Implementation of `mfront-interfaces generate`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::behaviour::BehaviourDescription;
use crate::core::targets::{ManifestFormat, TargetsDescription};
use crate::interfaces::{hosts, Interface, InterfaceRegistry, KeywordFile};
use crate::util::context::GenerationContext;
use crate::util::fs::{glob_files, list_files};

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Behaviour description file
    pub behaviour: PathBuf,

    /// Interfaces to generate (at least one)
    pub interfaces: Vec<String>,

    /// Keyword file holding the interface specific statements
    pub keywords: Option<PathBuf>,

    /// Build manifest format
    pub manifest_format: ManifestFormat,
}

/// Outcome of a generation.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    /// Behaviour name
    pub behaviour: String,

    /// Every file written, the manifest excluded
    pub files: Vec<PathBuf>,

    /// Build manifest
    pub manifest: PathBuf,

    /// Keywords no selected interface consumed
    pub unused_keywords: Vec<String>,
}

/// Load a behaviour description, naming it after its file when the file
/// description is empty.
pub fn load_behaviour(path: &Path) -> Result<BehaviourDescription> {
    let mut bd = BehaviourDescription::load(path)
        .with_context(|| format!("failed to load behaviour `{}`", path.display()))?;
    if bd.file_description.file_name.is_empty() {
        if let Some(name) = path.file_name() {
            bd.file_description.file_name = name.to_string_lossy().into_owned();
        }
    }
    Ok(bd)
}

/// Behaviour files named by `patterns`, relative to `base`.
///
/// A directory stands for every `.toml` file below it, anything else is a
/// glob pattern.
pub fn resolve_behaviours(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = base.join(pattern);
        let found = if path.is_dir() {
            list_files(&path)
                .into_iter()
                .filter(|f| f.extension().is_some_and(|e| e == "toml"))
                .collect()
        } else {
            glob_files(base, pattern)?
        };
        if found.is_empty() {
            bail!("no behaviour file matches `{}`", pattern);
        }
        files.extend(found);
    }
    let mut seen = BTreeSet::new();
    files.retain(|f| seen.insert(f.clone()));
    Ok(files)
}

/// Resolve interface names against the registry, keeping the first
/// occurrence of duplicates.
pub fn select_interfaces(registry: &InterfaceRegistry, names: &[String]) -> Result<Vec<Interface>> {
    if names.is_empty() {
        bail!(
            "no interface selected\n\
             available interfaces: {}",
            registry.all().map(|i| i.name()).collect::<Vec<_>>().join(", ")
        );
    }
    let mut selected: Vec<Interface> = Vec::new();
    for name in names {
        let interface = *registry.find(name)?;
        if selected.iter().all(|i| i.id() != interface.id()) {
            selected.push(interface);
        }
    }
    Ok(selected)
}

/// Hand every statement of a keyword file to the selected interfaces.
///
/// Returns the keys no interface consumed. A key carrying the prefix of an
/// interface that is not selected, or scoped to other interfaces, is
/// expected: it is only traced and not returned.
pub fn treat_keywords(
    interfaces: &[Interface],
    bd: &mut BehaviourDescription,
    file: &KeywordFile,
) -> Result<Vec<String>> {
    let statements = file
        .statements()
        .map_err(|e| anyhow::anyhow!("{:?}", miette::Report::new(e)))?;
    let mut unused = Vec::new();
    for statement in statements {
        let mut consumed = false;
        for interface in interfaces {
            let (treated, _) = interface.treat_keyword(
                bd,
                &statement.key,
                &statement.targets,
                &file.tokens,
                statement.position,
            )?;
            consumed |= treated;
        }
        if consumed {
            continue;
        }
        let foreign = hosts::all().any(|p| p.strip_prefix(&statement.key).is_some())
            || !statement.targets.is_empty();
        if foreign {
            tracing::debug!("`{}` is meant for another interface", statement.key);
        } else {
            tracing::debug!("`{}` is not used by any interface", statement.key);
            unused.push(statement.key);
        }
    }
    Ok(unused)
}

/// Generate the sources of a behaviour for the selected interfaces and
/// update the build manifest.
///
/// Every interface checks the behaviour before the first file is written,
/// so a rejected behaviour leaves the output directory untouched.
pub fn generate(ctx: &GenerationContext, opts: &GenerateOptions) -> Result<GenerateResult> {
    let registry = InterfaceRegistry::new();
    let interfaces = select_interfaces(&registry, &opts.interfaces)?;

    let mut bd = load_behaviour(&opts.behaviour)?;
    let unused_keywords = match &opts.keywords {
        Some(path) => {
            let file = KeywordFile::load(path)?;
            treat_keywords(&interfaces, &mut bd, &file)?
        }
        None => Vec::new(),
    };

    for interface in &interfaces {
        interface.plan(&bd, ctx)?;
    }

    let mut files = Vec::new();
    let mut td = TargetsDescription::new();
    for interface in &interfaces {
        let generated = interface.end_treatment(&bd, ctx)?;
        files.extend(generated.all().cloned());
        interface.targets_description(&mut td, &bd, ctx)?;
    }
    let manifest = td.write(ctx.output_dir(), opts.manifest_format)?;

    Ok(GenerateResult {
        behaviour: bd.behaviour_name(),
        files,
        manifest,
        unused_keywords,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::GenerationError;
    use crate::test_support::fixtures::TEST_PLASTICITY_TOML;
    use tempfile::TempDir;

    fn setup_with(extra: &str, keywords: Option<&str>) -> (TempDir, GenerateOptions) {
        let tmp = TempDir::new().unwrap();
        let behaviour = tmp.path().join("TestPlasticity.toml");
        std::fs::write(&behaviour, format!("{}{}", TEST_PLASTICITY_TOML, extra)).unwrap();
        let keywords = keywords.map(|src| {
            let path = tmp.path().join("keywords.mfront");
            std::fs::write(&path, src).unwrap();
            path
        });
        let opts = GenerateOptions {
            behaviour,
            interfaces: vec!["ansys".to_string()],
            keywords,
            manifest_format: ManifestFormat::Json,
        };
        (tmp, opts)
    }

    fn setup(keywords: Option<&str>) -> (TempDir, GenerateOptions) {
        setup_with("", keywords)
    }

    #[test]
    fn test_generate_ansys() {
        let (tmp, opts) = setup(None);
        let out = tmp.path().join("out");
        let result = generate(&GenerationContext::new(&out), &opts).unwrap();

        assert_eq!(result.behaviour, "TestPlasticity");
        assert!(out.join("include/MFront/Ansys/ansysTestPlasticity.hxx").exists());
        let source = std::fs::read_to_string(out.join("src/ansysTestPlasticity.cxx")).unwrap();
        for ep in ["_axis", "_pstrain", "_pstress", "_3D"] {
            assert!(source.contains(&format!("TestPlasticity{}", ep)));
        }
        assert!(source.contains("generated from TestPlasticity.toml"));

        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&result.manifest).unwrap()).unwrap();
        let entry_points = &manifest["libraries"]["AnsysBehaviour"]["entry_points"];
        assert_eq!(entry_points.as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_rejected_strategy_writes_nothing() {
        let (tmp, mut opts) = setup_with(
            "\n[attributes]\nstrainMeasure = \"GreenLagrange\"\n",
            Some("@AnsysFiniteStrainStrategy \"Native\";\n"),
        );
        opts.interfaces = vec!["Ansys".to_string()];
        let out = tmp.path().join("out");
        let err = generate(&GenerationContext::new(&out), &opts).unwrap_err();
        assert!(err.downcast_ref::<GenerationError>().is_some());
        assert!(!out.exists());
    }

    #[test]
    fn test_foreign_keywords_are_left_alone() {
        let (tmp, mut opts) = setup(Some(
            "@AbaqusFiniteStrainStrategy \"FiniteRotationSmallStrain\";\n\
             @GenerateMTestFileOnFailure[Ansys] true;\n\
             @GenerateMTestFileOnFailure[Castem] true;\n\
             @UnknownKeyword 1;\n",
        ));
        opts.manifest_format = ManifestFormat::Toml;
        let out = tmp.path().join("out");
        let result = generate(&GenerationContext::new(&out), &opts).unwrap();
        assert_eq!(result.unused_keywords, vec!["@UnknownKeyword"]);
        assert!(result.manifest.ends_with("targets.toml"));
        let manifest = std::fs::read_to_string(&result.manifest).unwrap();
        assert!(manifest.contains("MFrontMTestFileGenerator"));
    }

    #[test]
    fn test_unknown_interface() {
        let (tmp, mut opts) = setup(None);
        opts.interfaces = vec!["Zebulon".to_string()];
        let err = generate(&GenerationContext::new(tmp.path()), &opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenerationError>(),
            Some(GenerationError::UnknownInterface { .. })
        ));
    }

    #[test]
    fn test_resolve_behaviours() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("behaviours");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("Norton.toml"), "").unwrap();
        std::fs::write(dir.join("nested/Plasticity.toml"), "").unwrap();
        std::fs::write(dir.join("notes.txt"), "").unwrap();

        let files = resolve_behaviours(tmp.path(), &["behaviours".to_string()]).unwrap();
        assert_eq!(files.len(), 2);
        let files = resolve_behaviours(tmp.path(), &["behaviours/*.toml".to_string()]).unwrap();
        assert_eq!(files, vec![dir.join("Norton.toml")]);
        assert!(resolve_behaviours(tmp.path(), &["missing.toml".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_behaviours_skips_repeated_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("behaviours");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Norton.toml"), "").unwrap();
        std::fs::write(dir.join("Chaboche.toml"), "").unwrap();

        let patterns = vec![
            "behaviours/Norton.toml".to_string(),
            "behaviours/*.toml".to_string(),
            "behaviours".to_string(),
        ];
        let files = resolve_behaviours(tmp.path(), &patterns).unwrap();
        assert_eq!(files, vec![dir.join("Norton.toml"), dir.join("Chaboche.toml")]);
    }

    #[test]
    fn test_select_interfaces_deduplicates() {
        let registry = InterfaceRegistry::new();
        let names = vec!["castem".to_string(), "Cast3M".to_string(), "aster".to_string()];
        let selected = select_interfaces(&registry, &names).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(select_interfaces(&registry, &[]).is_err());
    }
}
