//! Z-set (ZMAT) behaviours.

use super::{INT_IN, INT_OUT, IN, MTEST, OUT};
use crate::codegen::conventions::{ShearScaling, StensorOrdering, TensorConvention};
use crate::codegen::pipeline::GradientLayout;
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis as MH;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::host::{
    no_flags, param, EntryPointStyle, FailureProtocol, HostId, HostProfile, OrthotropyPolicy,
    Role,
};

pub static PROFILE: HostProfile = HostProfile {
    id: HostId::Zmat,
    include_dir: "ZMAT",
    file_prefix: "zmat",
    namespace: "zmat",
    class_prefix: "ZMAT",
    keyword_prefix: "ZMAT",
    keyword_aliases: &[],
    library_prefix: "ZMAT",
    hypotheses: &[
        (MH::Tridimensional, "0"),
        (MH::PlaneStrain, "1"),
        (MH::GeneralisedPlaneStrain, "2"),
        (MH::Axisymmetrical, "3"),
    ],
    behaviour_types: &[
        BehaviourType::StandardStrainBasedBehaviour,
        BehaviourType::StandardFiniteStrainBehaviour,
    ],
    entry_points: EntryPointStyle::Dispatched {
        prefix: "zmat",
        suffix: "_integrate",
    },
    return_type: "void",
    parameters: &[
        param("hypothesis", INT_IN, Role::Dispatch),
        param("stress", OUT, Role::Stress),
        param("statev", OUT, Role::StateVariables),
        param("tangent", OUT, Role::Tangent),
        param("strain", IN, Role::Strain),
        param("dstrain", IN, Role::StrainIncrement),
        param("grad0", IN, Role::DeformationGradient0),
        param("grad1", IN, Role::DeformationGradient1),
        param("delta_t", IN, Role::TimeIncrement),
        param("temperature", IN, Role::Temperature),
        param("dtemperature", IN, Role::TemperatureIncrement),
        param("props", IN, Role::MaterialProperties),
        param("nprops", INT_IN, Role::NumberOfMaterialProperties),
        param("nstatev", INT_IN, Role::NumberOfStateVariables),
        param("predef", IN, Role::ExternalStateVariables),
        param("dpred", IN, Role::ExternalStateVariablesIncrement),
        param("status", INT_OUT, Role::FailureFlag),
    ],
    role_overrides: &[],
    convention: TensorConvention {
        ordering: StensorOrdering::ShearSwapped,
        scaling: ShearScaling::Tensorial,
        reduced_plane_stress: false,
    },
    tangent_column_major: false,
    failure: FailureProtocol {
        statements: &["*status = -1;"],
        return_values: None,
    },
    finite_strain_strategies: false,
    gradient_layout: GradientLayout::Tfel,
    finite_strain_tangent: "DSIG_DF",
    material_properties: MaterialPropertiesPolicy {
        always_inject_elasticity: false,
        always_inject_thermal_expansion: false,
        mass_density: false,
    },
    orthotropy: OrthotropyPolicy::HostManaged,
    stored_strain: false,
    temperature_removed: true,
    keywords: &[MTEST],
    resources: &[],
    link_libraries: &["ZMATInterface"],
    cppflags: no_flags,
    include_directories: no_flags,
};
