//! Host interfaces.
//!
//! An [`Interface`] is one capability object driven by a [`HostProfile`]
//! record: it reads the host keywords, selects the hypotheses to treat,
//! writes the generated files and fills the build manifest. The
//! [`InterfaceRegistry`] holds one interface per built-in host.

pub mod assets;
pub mod errors;
pub mod host;
pub mod hosts;
pub mod keywords;
pub mod wrapper;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::behaviour::BehaviourDescription;
use crate::core::finite_strain::declare_strategy;
use crate::core::hypothesis::ModellingHypothesis;
use crate::core::targets::{insert_if, TargetsDescription};
use crate::util::context::GenerationContext;
use crate::util::fs::write_atomic;

pub use errors::GenerationError;
pub use host::{HostId, HostProfile, OrthotropyPolicy};
pub use keywords::{KeywordFile, KeywordStatement};
pub use wrapper::InterfacePlan;

use keywords::{read_value, ParsedValue, Token};

/// Files written by [`Interface::end_treatment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub header: PathBuf,
    pub source: PathBuf,
    /// Shared resources and example inputs.
    pub assets: Vec<PathBuf>,
}

impl GeneratedFiles {
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.header, &self.source].into_iter().chain(&self.assets)
    }
}

/// Interface of a host code.
#[derive(Debug, Clone, Copy)]
pub struct Interface {
    profile: &'static HostProfile,
}

impl Interface {
    /// Interface of a built-in host.
    pub fn new(id: HostId) -> Self {
        Interface {
            profile: hosts::profile(id),
        }
    }

    pub fn from_profile(profile: &'static HostProfile) -> Self {
        Interface { profile }
    }

    pub fn id(&self) -> HostId {
        self.profile.id
    }

    /// Name selecting the interface.
    pub fn name(&self) -> &'static str {
        self.profile.name()
    }

    pub fn profile(&self) -> &'static HostProfile {
        self.profile
    }

    /// Keywords accepted by the interface, `@` included.
    pub fn keywords(&self) -> Vec<String> {
        self.profile
            .keywords
            .iter()
            .map(|k| self.profile.full_keyword(k.name))
            .collect()
    }

    /// Names a behaviour must not use for its variables.
    pub fn reserved_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .profile
            .parameters
            .iter()
            .map(|p| p.name)
            .chain(wrapper::RESERVED_LOCALS.iter().copied())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Treat the keyword `key` whose value starts at `tokens[pos]`.
    ///
    /// Returns whether the keyword was consumed and the position after it.
    /// Keys of other interfaces are left alone. A key carrying the host
    /// prefix, or restricted to this interface by `targets`, must be one
    /// of [`Interface::keywords`].
    pub fn treat_keyword(
        &self,
        bd: &mut BehaviourDescription,
        key: &str,
        targets: &[String],
        tokens: &[Token],
        pos: usize,
    ) -> Result<(bool, usize), GenerationError> {
        let scoped = !targets.is_empty();
        if scoped && !targets.iter().any(|t| self.profile.is_targeted_by(t)) {
            return Ok((false, pos));
        }
        let name = match self.profile.strip_prefix(key) {
            Some(name) => name,
            None if scoped => key.trim_start_matches('@'),
            None => return Ok((false, pos)),
        };
        let Some(keyword) = self.profile.find_keyword(name) else {
            return Err(GenerationError::UnsupportedKeyword {
                interface: self.name().to_string(),
                keyword: key.to_string(),
                allowed: self.keywords(),
            });
        };
        let (value, next) = read_value(key, keyword.value, tokens, pos)?;
        match value {
            ParsedValue::Strategy(strategy) => declare_strategy(bd, self.name(), strategy)?,
            value => bd.set_attribute(
                &self.profile.attribute_key(keyword.name),
                value.to_attribute(),
                false,
            )?,
        }
        tracing::debug!("{}: treated `{}`", self.name(), key);
        Ok((true, next))
    }

    /// Hypotheses declared by the behaviour and supported by the host.
    ///
    /// A behaviour declaring no hypothesis gets every supported one. An
    /// empty intersection is an error.
    pub fn modelling_hypotheses_to_be_treated(
        &self,
        bd: &BehaviourDescription,
    ) -> Result<Vec<ModellingHypothesis>, GenerationError> {
        let supported = self.profile.supported_hypotheses();
        let treated: Vec<ModellingHypothesis> = if bd.hypotheses.is_empty() {
            supported.clone()
        } else {
            supported
                .iter()
                .copied()
                .filter(|h| bd.hypotheses.contains(h))
                .collect()
        };
        if treated.is_empty() {
            return Err(GenerationError::NoHypothesisToTreat {
                interface: self.name().to_string(),
                behaviour: bd.behaviour_name(),
                declared: bd.hypotheses.iter().map(|h| h.to_string()).collect(),
                supported: supported.iter().map(|h| h.to_string()).collect(),
            });
        }
        Ok(treated)
    }

    /// Who handles the orthotropic frame.
    pub fn orthotropy_policy(&self, bd: &BehaviourDescription) -> OrthotropyPolicy {
        let key = self
            .profile
            .attribute_key(hosts::abaqus::ORTHOTROPY_MANAGEMENT_POLICY);
        match (self.profile.id, bd.string_attribute(&key)) {
            (HostId::Abaqus, Some("MFront")) => OrthotropyPolicy::StateVariables,
            _ => self.profile.orthotropy,
        }
    }

    /// Plan the generated glue without writing anything.
    pub fn plan(
        &self,
        bd: &BehaviourDescription,
        ctx: &GenerationContext,
    ) -> Result<InterfacePlan<'static>, GenerationError> {
        let hypotheses = self.modelling_hypotheses_to_be_treated(bd)?;
        InterfacePlan::build(
            self.profile,
            bd,
            ctx,
            &hypotheses,
            self.orthotropy_policy(bd),
        )
    }

    /// Generate the header, the source and the assets of a behaviour.
    ///
    /// Every check runs before the first file is written. Shared resources
    /// are copied under the context lock.
    pub fn end_treatment(
        &self,
        bd: &BehaviourDescription,
        ctx: &GenerationContext,
    ) -> Result<GeneratedFiles, GenerationError> {
        let plan = self.plan(bd, ctx)?;
        let header = ctx.include_dir().join(&plan.header);
        let source = ctx.src_dir().join(&plan.source);
        write_file(&header, &wrapper::render_header(&plan))?;
        write_file(&source, &wrapper::render_source(&plan))?;

        let mut files = GeneratedFiles {
            header,
            source,
            assets: Vec::new(),
        };
        if !self.profile.resources.is_empty() {
            let _guard = ctx.lock().acquire()?;
            for resource in self.profile.resources {
                let path = ctx.output_dir().join(resource.path);
                write_file(&path, resource.contents)?;
                files.assets.push(path);
            }
        }
        for asset in assets::assets(&plan) {
            let path = ctx.output_dir().join(&asset.path);
            write_file(&path, &asset.contents)?;
            files.assets.push(path);
        }
        tracing::info!(
            "{}: generated {} for `{}`",
            self.name(),
            plan.entry_point_names().join(", "),
            plan.behaviour
        );
        Ok(files)
    }

    /// Add the library of a behaviour to the manifest.
    pub fn targets_description(
        &self,
        td: &mut TargetsDescription,
        bd: &BehaviourDescription,
        ctx: &GenerationContext,
    ) -> Result<(), GenerationError> {
        let plan = self.plan(bd, ctx)?;
        let profile = self.profile;
        let lib = td.library_mut(&plan.library);
        insert_if(&mut lib.sources, plan.source.clone());
        for flag in (profile.cppflags)(ctx.hosts()) {
            insert_if(&mut lib.cppflags, flag);
        }
        for dir in (profile.include_directories)(ctx.hosts()) {
            insert_if(&mut lib.include_directories, dir);
        }
        let libraries = profile
            .link_libraries
            .iter()
            .chain(hosts::TFEL_LIBRARIES)
            .chain(plan.options.mtest.then_some(&hosts::MTEST_LIBRARY));
        for l in libraries {
            insert_if(&mut lib.link_libraries, *l);
        }
        for name in plan.entry_point_names() {
            insert_if(&mut lib.entry_points, name);
        }
        insert_if(&mut td.headers, plan.header);
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), GenerationError> {
    write_atomic(path, contents.as_bytes()).map_err(|e| GenerationError::io(path, e))?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

/// Registry of the available interfaces.
pub struct InterfaceRegistry {
    interfaces: HashMap<HostId, Interface>,
}

impl InterfaceRegistry {
    /// Create a registry with every built-in host.
    pub fn new() -> Self {
        let mut registry = InterfaceRegistry {
            interfaces: HashMap::new(),
        };
        for profile in hosts::all() {
            registry.register(Interface::from_profile(profile));
        }
        registry
    }

    pub fn register(&mut self, interface: Interface) {
        self.interfaces.insert(interface.id(), interface);
    }

    pub fn get(&self, id: HostId) -> Option<&Interface> {
        self.interfaces.get(&id)
    }

    /// Find an interface by name or alias.
    pub fn find(&self, name: &str) -> Result<&Interface, GenerationError> {
        let id: HostId = name.parse()?;
        self.get(id).ok_or_else(|| GenerationError::UnknownInterface {
            name: name.to_string(),
            available: self.ids().map(|id| id.to_string()).collect(),
        })
    }

    /// Registered ids, in display order.
    pub fn ids(&self) -> impl Iterator<Item = HostId> + '_ {
        HostId::ALL
            .into_iter()
            .filter(|id| self.interfaces.contains_key(id))
    }

    /// Registered interfaces, in display order.
    pub fn all(&self) -> impl Iterator<Item = &Interface> + '_ {
        self.ids().filter_map(|id| self.interfaces.get(&id))
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn contains(&self, id: HostId) -> bool {
        self.interfaces.contains_key(&id)
    }
}

impl Default for InterfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::core::behaviour::AttributeValue;
    use crate::core::finite_strain::{resolve_strategy, FiniteStrainStrategy};
    use crate::core::hypothesis::ModellingHypothesis as MH;
    use crate::test_support::{fixtures, RecordingLock};

    /// Feed every statement of a keyword source to an interface.
    fn treat(
        interface: &Interface,
        bd: &mut BehaviourDescription,
        source: &str,
    ) -> Result<Vec<bool>, GenerationError> {
        let file = KeywordFile::parse("test", source).unwrap();
        let mut consumed = Vec::new();
        for s in file.statements().unwrap() {
            let (done, next) =
                interface.treat_keyword(bd, &s.key, &s.targets, &file.tokens, s.position)?;
            if done {
                assert_eq!(next, s.end);
            }
            consumed.push(done);
        }
        Ok(consumed)
    }

    #[test]
    fn test_registry_has_every_host() {
        let registry = InterfaceRegistry::new();
        assert_eq!(registry.len(), 10);
        assert!(registry.contains(HostId::Zmat));
        assert_eq!(registry.all().next().map(|i| i.name()), Some("Abaqus"));
        assert_eq!(registry.find("cast3m").unwrap().id(), HostId::Castem);
        assert!(matches!(
            registry.find("calculix"),
            Err(GenerationError::UnknownInterface { .. })
        ));
    }

    #[test]
    fn test_hypotheses_to_be_treated() {
        let ansys = Interface::new(HostId::Ansys);
        let all = ansys
            .modelling_hypotheses_to_be_treated(&fixtures::test_plasticity())
            .unwrap();
        assert_eq!(
            all,
            vec![MH::Axisymmetrical, MH::PlaneStrain, MH::PlaneStress, MH::Tridimensional]
        );

        let bd = fixtures::test_plasticity_with(&[MH::Tridimensional, MH::GeneralisedPlaneStrain]);
        assert_eq!(
            ansys.modelling_hypotheses_to_be_treated(&bd).unwrap(),
            vec![MH::Tridimensional]
        );

        let bd = fixtures::test_plasticity_with(&[MH::PlaneStress]);
        let err = Interface::new(HostId::Cyrano)
            .modelling_hypotheses_to_be_treated(&bd)
            .unwrap_err();
        assert!(matches!(err, GenerationError::NoHypothesisToTreat { .. }));
    }

    #[test]
    fn test_treat_own_keywords() {
        let ansys = Interface::new(HostId::Ansys);
        let mut bd = fixtures::test_plasticity();
        let consumed = treat(
            &ansys,
            &mut bd,
            "@AnsysFiniteStrainStrategy \"Native\";\n\
             @AnsysGenerateMTestFileOnFailure true;\n\
             @AbaqusGenerateMTestFileOnFailure false;",
        )
        .unwrap();
        assert_eq!(consumed, vec![true, true, false]);
        assert_eq!(
            resolve_strategy(&bd, "Ansys").unwrap(),
            Some(FiniteStrainStrategy::Native)
        );
        assert!(bd.bool_attribute("Ansys::GenerateMTestFileOnFailure"));
        assert!(!bd.has_attribute("Abaqus::GenerateMTestFileOnFailure"));
    }

    #[test]
    fn test_unknown_own_keyword() {
        let mut bd = fixtures::test_plasticity();
        let err = treat(&Interface::new(HostId::Ansys), &mut bd, "@AnsysUseTimeSubStepping;")
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedKeyword { .. }));
        // the same keyword is legal for Castem
        let mut bd = fixtures::test_plasticity();
        treat(&Interface::new(HostId::Castem), &mut bd, "@CastemUseTimeSubStepping true;").unwrap();
        assert!(bd.bool_attribute("Castem::UseTimeSubStepping"));
    }

    #[test]
    fn test_scoped_keywords() {
        let source = "@GenerateMTestFileOnFailure[Abaqus, Generic] true;";
        let mut bd = fixtures::test_plasticity();
        assert_eq!(
            treat(&Interface::new(HostId::Ansys), &mut bd, source).unwrap(),
            vec![false]
        );
        assert_eq!(
            treat(&Interface::new(HostId::Abaqus), &mut bd, source).unwrap(),
            vec![true]
        );
        assert_eq!(
            treat(&Interface::new(HostId::Generic), &mut bd, source).unwrap(),
            vec![true]
        );
        assert!(bd.bool_attribute("Generic::GenerateMTestFileOnFailure"));
    }

    #[test]
    fn test_generic_alias() {
        let mut bd = fixtures::test_plasticity();
        treat(
            &Interface::new(HostId::Generic),
            &mut bd,
            "@GenericInterfaceGenerateMTestFileOnFailure true;",
        )
        .unwrap();
        assert!(bd.bool_attribute("Generic::GenerateMTestFileOnFailure"));
    }

    #[test]
    fn test_abaqus_orthotropy_policy() {
        let abaqus = Interface::new(HostId::Abaqus);
        let mut bd = fixtures::orthotropic_elasticity();
        assert_eq!(abaqus.orthotropy_policy(&bd), OrthotropyPolicy::HostManaged);
        treat(&abaqus, &mut bd, "@AbaqusOrthotropyManagementPolicy MFront;").unwrap();
        assert_eq!(abaqus.orthotropy_policy(&bd), OrthotropyPolicy::StateVariables);
    }

    #[test]
    fn test_reserved_names() {
        let names = Interface::new(HostId::Abaqus).reserved_names();
        assert!(names.contains(&"STATEV"));
        assert!(names.contains(&"Integrator"));
    }

    #[test]
    fn test_end_treatment_writes_files() {
        let tmp = TempDir::new().unwrap();
        let lock = RecordingLock::default();
        let ctx = GenerationContext::new(tmp.path()).with_lock(Arc::new(lock.clone()));
        let files = Interface::new(HostId::Ansys)
            .end_treatment(&fixtures::test_plasticity(), &ctx)
            .unwrap();
        assert_eq!(
            files.header,
            tmp.path().join("include/MFront/Ansys/ansysTestPlasticity.hxx")
        );
        assert_eq!(files.source, tmp.path().join("src/ansysTestPlasticity.cxx"));
        for f in files.all() {
            assert!(f.exists(), "{} is missing", f.display());
        }
        assert!(tmp.path().join("ansys/usermat.cpp").exists());
        assert!(tmp.path().join("ansys/TestPlasticity.dat").exists());
        assert_eq!(lock.acquisitions(), 1);

        // a second run rewrites the same files
        let again = Interface::new(HostId::Ansys)
            .end_treatment(&fixtures::test_plasticity(), &ctx)
            .unwrap();
        assert_eq!(files, again);
    }

    #[test]
    fn test_hosts_without_resources_skip_the_lock() {
        let tmp = TempDir::new().unwrap();
        let lock = RecordingLock::default();
        let ctx = GenerationContext::new(tmp.path()).with_lock(Arc::new(lock.clone()));
        Interface::new(HostId::Castem)
            .end_treatment(&fixtures::test_plasticity(), &ctx)
            .unwrap();
        assert_eq!(lock.acquisitions(), 0);
    }

    #[test]
    fn test_end_treatment_creates_nested_output_dir() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("build").join("generated");
        let files = Interface::new(HostId::Castem)
            .end_treatment(&fixtures::test_plasticity(), &GenerationContext::new(&out))
            .unwrap();
        assert!(files.header.starts_with(&out));
        assert!(files.source.exists());
    }

    #[test]
    fn test_end_treatment_reports_write_failures() {
        let tmp = TempDir::new().unwrap();
        let blocked = tmp.path().join("blocked");
        std::fs::write(&blocked, "").unwrap();
        let err = Interface::new(HostId::Castem)
            .end_treatment(&fixtures::test_plasticity(), &GenerationContext::new(&blocked))
            .unwrap_err();
        match err {
            GenerationError::Io { path, .. } => {
                assert!(path.starts_with(&*blocked.to_string_lossy()), "{}", path)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_incompatible_strategy_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let ctx = GenerationContext::new(tmp.path());
        let ansys = Interface::new(HostId::Ansys);
        let mut bd = fixtures::test_plasticity_with_measure("GreenLagrange");
        treat(&ansys, &mut bd, "@AnsysFiniteStrainStrategy \"Native\";").unwrap();
        let err = ansys.end_treatment(&bd, &ctx).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::IncompatibleFiniteStrainStrategy { .. }
        ));
        assert!(!tmp.path().join("include").exists());
        assert!(!tmp.path().join("src").exists());
    }

    #[test]
    fn test_targets_description() {
        let ctx = GenerationContext::new("out");
        let mut td = TargetsDescription::new();
        let mut bd = fixtures::test_plasticity();
        Interface::new(HostId::Ansys)
            .targets_description(&mut td, &bd, &ctx)
            .unwrap();
        let lib = td.library("AnsysBehaviour").unwrap();
        assert_eq!(lib.sources, vec!["ansysTestPlasticity.cxx"]);
        assert_eq!(lib.entry_points.len(), 4);
        assert_eq!(lib.link_libraries[0], "AnsysInterface");
        assert!(lib.link_libraries.contains(&"TFELMaterial".to_string()));
        assert!(!lib.link_libraries.contains(&hosts::MTEST_LIBRARY.to_string()));
        assert_eq!(td.headers, vec!["MFront/Ansys/ansysTestPlasticity.hxx"]);

        bd.set_attribute(
            "Abaqus::GenerateMTestFileOnFailure",
            AttributeValue::Bool(true),
            false,
        )
        .unwrap();
        Interface::new(HostId::Abaqus)
            .targets_description(&mut td, &bd, &ctx)
            .unwrap();
        let lib = td.library("AbaqusBehaviour").unwrap();
        assert!(lib.link_libraries.contains(&hosts::MTEST_LIBRARY.to_string()));
        assert_eq!(td.libraries.len(), 2);
    }
}
