//! Host records.
//!
//! Everything that differs between host codes is data: the calling
//! convention of the generated functions, the tensor conventions, the
//! failure protocol, the keywords and the build settings. The
//! [`Interface`](crate::interfaces::Interface) capability object renders
//! every host from its [`HostProfile`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codegen::conventions::TensorConvention;
use crate::codegen::pipeline::{AxesSource, GradientLayout};
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::errors::GenerationError;
use crate::util::config::HostsConfig;

/// Unique identifier of a host code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HostId {
    Abaqus,
    Ansys,
    Aster,
    Castem,
    Cyrano,
    Comsol,
    Diana,
    Lsdyna,
    Zmat,
    Generic,
}

impl HostId {
    /// Every host, in display order.
    pub const ALL: [HostId; 10] = [
        HostId::Abaqus,
        HostId::Ansys,
        HostId::Aster,
        HostId::Castem,
        HostId::Cyrano,
        HostId::Comsol,
        HostId::Diana,
        HostId::Lsdyna,
        HostId::Zmat,
        HostId::Generic,
    ];

    /// Name used to select the interface.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostId::Abaqus => "Abaqus",
            HostId::Ansys => "Ansys",
            HostId::Aster => "Aster",
            HostId::Castem => "Castem",
            HostId::Cyrano => "Cyrano",
            HostId::Comsol => "Comsol",
            HostId::Diana => "DianaFEA",
            HostId::Lsdyna => "LSDYNA",
            HostId::Zmat => "ZMAT",
            HostId::Generic => "Generic",
        }
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HostId {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abaqus" | "abaqusstandard" => Ok(HostId::Abaqus),
            "ansys" => Ok(HostId::Ansys),
            "aster" | "code_aster" => Ok(HostId::Aster),
            "castem" | "cast3m" | "umat" => Ok(HostId::Castem),
            "cyrano" => Ok(HostId::Cyrano),
            "comsol" => Ok(HostId::Comsol),
            "dianafea" | "diana" => Ok(HostId::Diana),
            "lsdyna" | "ls-dyna" => Ok(HostId::Lsdyna),
            "zmat" => Ok(HostId::Zmat),
            "generic" => Ok(HostId::Generic),
            _ => Err(GenerationError::UnknownInterface {
                name: s.to_string(),
                available: HostId::ALL.iter().map(|h| h.as_str().to_string()).collect(),
            }),
        }
    }
}

/// What an argument of the generated function carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    /// Stress at the beginning of the step, updated in place unless
    /// [`Role::StressOut`] is given.
    Stress,
    StressOut,
    StateVariables,
    StateVariablesOut,
    Tangent,
    /// Total strain at the beginning of the step.
    Strain,
    StrainAtEnd,
    StrainIncrement,
    DeformationGradient0,
    DeformationGradient1,
    TimeIncrement,
    Temperature,
    TemperatureAtEnd,
    TemperatureIncrement,
    ExternalStateVariables,
    ExternalStateVariablesAtEnd,
    ExternalStateVariablesIncrement,
    MaterialProperties,
    NumberOfMaterialProperties,
    NumberOfStateVariables,
    Rotation,
    FailureFlag,
    /// Code selecting the hypothesis of a dispatched entry point.
    Dispatch,
    /// Part of the host signature, ignored by the wrapper.
    Unused,
}

impl Role {
    /// Scalars passed by pointer, read as `*name`.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Role::TimeIncrement
                | Role::Temperature
                | Role::TemperatureAtEnd
                | Role::TemperatureIncrement
                | Role::NumberOfMaterialProperties
                | Role::NumberOfStateVariables
                | Role::Dispatch
        )
    }
}

/// An argument of the generated function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiParameter {
    pub name: &'static str,
    /// Full C++ type, `const double* const`...
    pub cxx_type: &'static str,
    pub role: Role,
}

/// Shorthand used by the host tables.
pub const fn param(name: &'static str, cxx_type: &'static str, role: Role) -> AbiParameter {
    AbiParameter {
        name,
        cxx_type,
        role,
    }
}

/// How the entry points are organised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointStyle {
    /// One function per hypothesis, `<behaviour>_<binding>` (or the bare
    /// behaviour name for an empty binding).
    PerHypothesis,
    /// A single function `<prefix><behaviour in lowercase><suffix>`
    /// selecting the hypothesis from the [`Role::Dispatch`] argument;
    /// bindings are the dispatch codes.
    Dispatched {
        prefix: &'static str,
        suffix: &'static str,
    },
}

/// How the generated function reports a failed integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureProtocol {
    /// Statements run on failure, before returning.
    pub statements: &'static [&'static str],
    /// `(success, failure)` return values of non-void functions.
    pub return_values: Option<(&'static str, &'static str)>,
}

/// Storage of a 3x3 matrix argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixLayout {
    ColumnMajor,
    RowMajor,
}

/// Where orthotropy axes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrthotropyPolicy {
    /// The host works in the material frame itself.
    HostManaged,
    /// Rotation matrix passed in the [`Role::Rotation`] argument.
    RotationArgument(MatrixLayout),
    /// Axes stored as leading state variables.
    StateVariables,
}

impl OrthotropyPolicy {
    /// Source of the rotation matrix, `None` when no rotation is rendered.
    pub fn axes_source(&self, profile: &HostProfile) -> Option<AxesSource> {
        match self {
            OrthotropyPolicy::HostManaged => None,
            OrthotropyPolicy::RotationArgument(layout) => {
                let host = profile.expr(Role::Rotation)?;
                Some(match layout {
                    MatrixLayout::ColumnMajor => AxesSource::FortranMatrix { host },
                    MatrixLayout::RowMajor => AxesSource::CMatrix { host },
                })
            }
            OrthotropyPolicy::StateVariables => profile
                .expr(Role::StateVariables)
                .map(|host| AxesSource::StateVariables { host }),
        }
    }
}

/// Value expected after an interface keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordValue {
    /// Optional boolean, `true` when omitted.
    Flag,
    Bool,
    Real,
    UnsignedInt,
    /// One of the listed identifiers (quotes allowed).
    Choice(&'static [&'static str]),
    /// A finite strain strategy name.
    Strategy,
}

/// A keyword accepted by a host, without the `@<Host>` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostKeyword {
    pub name: &'static str,
    pub value: KeywordValue,
}

pub const fn keyword(name: &'static str, value: KeywordValue) -> HostKeyword {
    HostKeyword { name, value }
}

/// Keyword toggling the MTest dump, shared by every host.
pub const GENERATE_MTEST_ON_FAILURE: &str = "GenerateMTestFileOnFailure";

/// Keyword declaring the finite strain strategy.
pub const FINITE_STRAIN_STRATEGY: &str = "FiniteStrainStrategy";

/// A static file copied next to the generated sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// Destination, relative to the output directory.
    pub path: &'static str,
    pub contents: &'static str,
}

/// Full description of a host code.
#[derive(Debug, Clone)]
pub struct HostProfile {
    pub id: HostId,
    /// Directory below `include/MFront/`.
    pub include_dir: &'static str,
    /// Prefix of the generated file names.
    pub file_prefix: &'static str,
    /// C++ namespace of the host adaptor classes.
    pub namespace: &'static str,
    /// Class prefix of the adaptor (`<prefix>Interface`, `<prefix>Traits`...).
    pub class_prefix: &'static str,
    /// Prefix of the host keywords, `@<prefix><Keyword>`.
    pub keyword_prefix: &'static str,
    /// Other accepted keyword prefixes.
    pub keyword_aliases: &'static [&'static str],
    /// Prefix of the library name.
    pub library_prefix: &'static str,
    /// Supported hypotheses with their binding (suffix or dispatch code).
    pub hypotheses: &'static [(ModellingHypothesis, &'static str)],
    pub behaviour_types: &'static [BehaviourType],
    pub entry_points: EntryPointStyle,
    /// Return type of the generated functions.
    pub return_type: &'static str,
    pub parameters: &'static [AbiParameter],
    /// Expressions replacing the parameter of a role.
    pub role_overrides: &'static [(Role, &'static str)],
    pub convention: TensorConvention,
    /// Storage of the host tangent operator.
    pub tangent_column_major: bool,
    pub failure: FailureProtocol,
    /// Whether strain-based behaviours can be used through a finite
    /// strain strategy.
    pub finite_strain_strategies: bool,
    pub gradient_layout: GradientLayout,
    /// TFEL name of the tangent operator expected by the host in finite
    /// strain.
    pub finite_strain_tangent: &'static str,
    pub material_properties: MaterialPropertiesPolicy,
    pub orthotropy: OrthotropyPolicy,
    /// The total strain is kept in leading state variables.
    pub stored_strain: bool,
    /// The temperature is not part of the external state variables.
    pub temperature_removed: bool,
    pub keywords: &'static [HostKeyword],
    pub resources: &'static [Resource],
    pub link_libraries: &'static [&'static str],
    pub cppflags: fn(&HostsConfig) -> Vec<String>,
    pub include_directories: fn(&HostsConfig) -> Vec<String>,
}

/// No host specific flags.
pub fn no_flags(_: &HostsConfig) -> Vec<String> {
    Vec::new()
}

impl HostProfile {
    pub fn name(&self) -> &'static str {
        self.id.as_str()
    }

    /// Binding of a hypothesis, `None` when unsupported.
    pub fn binding(&self, h: ModellingHypothesis) -> Option<&'static str> {
        self.hypotheses
            .iter()
            .find(|(hh, _)| *hh == h)
            .map(|(_, b)| *b)
    }

    pub fn supported_hypotheses(&self) -> Vec<ModellingHypothesis> {
        self.hypotheses.iter().map(|(h, _)| *h).collect()
    }

    pub fn supports_behaviour_type(&self, t: BehaviourType) -> bool {
        self.behaviour_types.contains(&t)
    }

    /// Parameter carrying a role.
    pub fn parameter(&self, role: Role) -> Option<&AbiParameter> {
        self.parameters.iter().find(|p| p.role == role)
    }

    /// Expression giving access to a role, dereferenced for scalars.
    pub fn expr(&self, role: Role) -> Option<String> {
        if let Some((_, e)) = self.role_overrides.iter().find(|(r, _)| *r == role) {
            return Some((*e).to_string());
        }
        self.parameter(role).map(|p| {
            if p.role.is_scalar() {
                format!("*{}", p.name)
            } else {
                p.name.to_string()
            }
        })
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.expr(role).is_some()
    }

    /// Function signature arguments.
    pub fn signature(&self) -> String {
        self.parameters
            .iter()
            .map(|p| format!("{} {}", p.cxx_type, p.name))
            .collect::<Vec<_>>()
            .join(",\n    ")
    }

    /// Full keyword, `@<prefix><name>`.
    pub fn full_keyword(&self, name: &str) -> String {
        format!("@{}{}", self.keyword_prefix, name)
    }

    pub fn find_keyword(&self, name: &str) -> Option<&HostKeyword> {
        self.keywords.iter().find(|k| k.name == name)
    }

    /// Strip one of the host prefixes from a key (`@AnsysFoo` -> `Foo`).
    pub fn strip_prefix<'k>(&self, key: &'k str) -> Option<&'k str> {
        let bare = key.strip_prefix('@')?;
        std::iter::once(self.keyword_prefix)
            .chain(self.keyword_aliases.iter().copied())
            // longest prefix first, `GenericInterface` before `Generic`
            .filter_map(|p| bare.strip_prefix(p).map(|rest| (p.len(), rest)))
            .max_by_key(|(len, _)| *len)
            .map(|(_, rest)| rest)
            .filter(|rest| !rest.is_empty())
    }

    /// Whether a `[target,...]` list names this host.
    pub fn is_targeted_by(&self, target: &str) -> bool {
        target.parse::<HostId>().map(|id| id == self.id).unwrap_or(false)
    }

    /// Attribute key of a host keyword.
    pub fn attribute_key(&self, name: &str) -> String {
        format!("{}::{}", self.name(), name)
    }

    /// Library receiving the generated sources.
    pub fn library_name(&self, library: &str) -> String {
        let lib = if library.is_empty() { "Behaviour" } else { library };
        format!("{}{}", self.library_prefix, lib)
    }

    /// Class name of the out-of-bounds policy.
    pub fn policy_class(&self) -> String {
        format!("{}::{}OutOfBoundsPolicy", self.namespace, self.class_prefix)
    }

    /// Adaptor class integrating the behaviour for a hypothesis.
    pub fn adaptor(&self, h: ModellingHypothesis, class_name: &str) -> String {
        format!(
            "{}::{}Interface<tfel::material::{},tfel::material::{}>",
            self.namespace,
            self.class_prefix,
            h.cxx_enumerator(),
            class_name
        )
    }
}
