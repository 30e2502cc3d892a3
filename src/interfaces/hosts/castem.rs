//! Cast3M `umat`.

use super::{INT_IN, INT_OUT, IN, MTEST, OUT, STRATEGY};
use crate::codegen::conventions::{ShearScaling, StensorOrdering, TensorConvention};
use crate::codegen::pipeline::GradientLayout;
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis as MH;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::host::{
    keyword, no_flags, param, EntryPointStyle, FailureProtocol, HostId, HostProfile,
    KeywordValue, MatrixLayout, OrthotropyPolicy, Role,
};
use crate::util::config::HostsConfig;

pub const USE_TIME_SUB_STEPPING: &str = "UseTimeSubStepping";
pub const MAXIMUM_SUB_STEPPING: &str = "MaximumSubStepping";
pub const DO_SUB_STEPPING_ON_INVALID_RESULTS: &str = "DoSubSteppingOnInvalidResults";

/// Sub-steps allowed when `@CastemMaximumSubStepping` is not given.
pub const DEFAULT_MAXIMUM_SUB_STEPPING: u32 = 8;

fn include_directories(hosts: &HostsConfig) -> Vec<String> {
    hosts
        .castem_root()
        .map(|root| vec![root.join("include").display().to_string()])
        .unwrap_or_default()
}

pub static PROFILE: HostProfile = HostProfile {
    id: HostId::Castem,
    include_dir: "Castem",
    file_prefix: "umat",
    namespace: "castem",
    class_prefix: "Castem",
    keyword_prefix: "Castem",
    keyword_aliases: &["UMAT"],
    library_prefix: "Umat",
    hypotheses: &[
        (MH::Tridimensional, "2"),
        (MH::Axisymmetrical, "0"),
        (MH::PlaneStrain, "-1"),
        (MH::PlaneStress, "-2"),
        (MH::GeneralisedPlaneStrain, "-3"),
        (MH::AxisymmetricalGeneralisedPlaneStrain, "14"),
    ],
    behaviour_types: &[
        BehaviourType::StandardStrainBasedBehaviour,
        BehaviourType::StandardFiniteStrainBehaviour,
    ],
    entry_points: EntryPointStyle::Dispatched {
        prefix: "umat",
        suffix: "",
    },
    return_type: "void",
    parameters: &[
        param("STRESS", OUT, Role::Stress),
        param("STATEV", OUT, Role::StateVariables),
        param("DDSDDE", OUT, Role::Tangent),
        param("SSE", OUT, Role::Unused),
        param("SPD", OUT, Role::Unused),
        param("SCD", OUT, Role::Unused),
        param("RPL", OUT, Role::Unused),
        param("DDSDDT", OUT, Role::Unused),
        param("DRPLDE", OUT, Role::Unused),
        param("DRPLDT", OUT, Role::Unused),
        param("STRAN", IN, Role::Strain),
        param("DSTRAN", IN, Role::StrainIncrement),
        param("TIME", IN, Role::Unused),
        param("DTIME", IN, Role::TimeIncrement),
        param("TEMP", IN, Role::Temperature),
        param("DTEMP", IN, Role::TemperatureIncrement),
        param("PREDEF", IN, Role::ExternalStateVariables),
        param("DPRED", IN, Role::ExternalStateVariablesIncrement),
        param("CMNAME", "const char* const", Role::Unused),
        param("NDI", INT_IN, Role::Dispatch),
        param("NSHR", INT_IN, Role::Unused),
        param("NTENS", INT_IN, Role::Unused),
        param("NSTATV", INT_IN, Role::NumberOfStateVariables),
        param("PROPS", IN, Role::MaterialProperties),
        param("NPROPS", INT_IN, Role::NumberOfMaterialProperties),
        param("COORDS", IN, Role::Unused),
        param("DROT", IN, Role::Rotation),
        param("PNEWDT", OUT, Role::Unused),
        param("CELENT", IN, Role::Unused),
        param("DFGRD0", IN, Role::DeformationGradient0),
        param("DFGRD1", IN, Role::DeformationGradient1),
        param("NOEL", INT_IN, Role::Unused),
        param("NPT", INT_IN, Role::Unused),
        param("LAYER", INT_IN, Role::Unused),
        param("KSPT", INT_IN, Role::Unused),
        param("KSTEP", INT_IN, Role::Unused),
        param("KINC", INT_OUT, Role::FailureFlag),
    ],
    role_overrides: &[],
    convention: TensorConvention {
        ordering: StensorOrdering::Tfel,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: false,
    },
    tangent_column_major: true,
    failure: FailureProtocol {
        statements: &["*KINC = -1;"],
        return_values: None,
    },
    finite_strain_strategies: true,
    gradient_layout: GradientLayout::FortranMatrix,
    finite_strain_tangent: "C_TRUESDELL",
    material_properties: MaterialPropertiesPolicy {
        always_inject_elasticity: true,
        always_inject_thermal_expansion: true,
        mass_density: true,
    },
    orthotropy: OrthotropyPolicy::RotationArgument(MatrixLayout::ColumnMajor),
    stored_strain: false,
    temperature_removed: true,
    keywords: &[
        STRATEGY,
        MTEST,
        keyword(USE_TIME_SUB_STEPPING, KeywordValue::Bool),
        keyword(MAXIMUM_SUB_STEPPING, KeywordValue::UnsignedInt),
        keyword(DO_SUB_STEPPING_ON_INVALID_RESULTS, KeywordValue::Bool),
    ],
    resources: &[],
    link_libraries: &["CastemInterface"],
    cppflags: no_flags,
    include_directories,
};
