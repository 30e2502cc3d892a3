//! Abaqus/Standard UMAT.

use super::{INT_IN, INT_OUT, IN, MTEST, OUT, STRATEGY};
use crate::codegen::conventions::{ShearScaling, StensorOrdering, TensorConvention};
use crate::codegen::pipeline::GradientLayout;
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis as MH;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::host::{
    keyword, no_flags, param, EntryPointStyle, FailureProtocol, HostId, HostProfile,
    KeywordValue, OrthotropyPolicy, Role,
};

/// Keyword selecting who handles the orthotropic frame.
pub const ORTHOTROPY_MANAGEMENT_POLICY: &str = "OrthotropyManagementPolicy";

pub static PROFILE: HostProfile = HostProfile {
    id: HostId::Abaqus,
    include_dir: "Abaqus",
    file_prefix: "abaqus",
    namespace: "abaqus",
    class_prefix: "Abaqus",
    keyword_prefix: "Abaqus",
    keyword_aliases: &[],
    library_prefix: "Abaqus",
    hypotheses: &[
        (MH::Tridimensional, "3D"),
        (MH::PlaneStrain, "PSTRAIN"),
        (MH::PlaneStress, "PSTRESS"),
        (MH::Axisymmetrical, "AXIS"),
    ],
    behaviour_types: &[
        BehaviourType::StandardStrainBasedBehaviour,
        BehaviourType::StandardFiniteStrainBehaviour,
    ],
    entry_points: EntryPointStyle::PerHypothesis,
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
        param("NDI", INT_IN, Role::Unused),
        param("NSHR", INT_IN, Role::Unused),
        param("NTENS", INT_IN, Role::Unused),
        param("NSTATV", INT_IN, Role::NumberOfStateVariables),
        param("PROPS", IN, Role::MaterialProperties),
        param("NPROPS", INT_IN, Role::NumberOfMaterialProperties),
        param("COORDS", IN, Role::Unused),
        param("DROT", IN, Role::Unused),
        param("PNEWDT", OUT, Role::FailureFlag),
        param("CELENT", IN, Role::Unused),
        param("DFGRD0", IN, Role::DeformationGradient0),
        param("DFGRD1", IN, Role::DeformationGradient1),
        param("NOEL", INT_IN, Role::Unused),
        param("NPT", INT_IN, Role::Unused),
        param("LAYER", INT_IN, Role::Unused),
        param("KSPT", INT_IN, Role::Unused),
        param("KSTEP", INT_OUT, Role::Unused),
        param("KINC", INT_IN, Role::Unused),
        param("size", "const int", Role::Unused),
    ],
    role_overrides: &[],
    convention: TensorConvention {
        ordering: StensorOrdering::Tfel,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: true,
    },
    tangent_column_major: true,
    failure: FailureProtocol {
        statements: &["*PNEWDT = 0.2;"],
        return_values: None,
    },
    finite_strain_strategies: true,
    gradient_layout: GradientLayout::FortranMatrix,
    finite_strain_tangent: "ABAQUS",
    material_properties: MaterialPropertiesPolicy {
        always_inject_elasticity: false,
        always_inject_thermal_expansion: false,
        mass_density: false,
    },
    orthotropy: OrthotropyPolicy::HostManaged,
    stored_strain: false,
    temperature_removed: true,
    keywords: &[
        STRATEGY,
        MTEST,
        keyword(
            ORTHOTROPY_MANAGEMENT_POLICY,
            KeywordValue::Choice(&["Native", "MFront"]),
        ),
    ],
    resources: &[],
    link_libraries: &["AbaqusInterface"],
    cppflags: no_flags,
    include_directories: no_flags,
};
