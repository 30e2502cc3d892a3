//! DIANA FEA user supplied subroutine.

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
    id: HostId::Diana,
    include_dir: "DianaFEA",
    file_prefix: "dianafea",
    namespace: "dianafea",
    class_prefix: "DianaFEA",
    keyword_prefix: "DianaFEA",
    keyword_aliases: &["Diana"],
    library_prefix: "Diana",
    hypotheses: &[
        (MH::Tridimensional, "3D"),
        (MH::PlaneStrain, "PSTRAIN"),
        (MH::PlaneStress, "PSTRESS"),
        (MH::Axisymmetrical, "AXIS"),
    ],
    behaviour_types: &[BehaviourType::StandardStrainBasedBehaviour],
    entry_points: EntryPointStyle::PerHypothesis,
    return_type: "void",
    parameters: &[
        param("ddsdde", OUT, Role::Tangent),
        param("sigma", OUT, Role::Stress),
        param("sv", OUT, Role::StateVariables),
        param("epsilon", IN, Role::Strain),
        param("depsilon", IN, Role::StrainIncrement),
        param("delta_t", IN, Role::TimeIncrement),
        param("te", IN, Role::Temperature),
        param("dte", IN, Role::TemperatureIncrement),
        param("nprops", INT_IN, Role::NumberOfMaterialProperties),
        param("props", IN, Role::MaterialProperties),
        param("nstatev", INT_IN, Role::NumberOfStateVariables),
        param("esv", IN, Role::ExternalStateVariables),
        param("desv", IN, Role::ExternalStateVariablesIncrement),
        param("nesv", INT_IN, Role::Unused),
        param("status", INT_OUT, Role::FailureFlag),
    ],
    role_overrides: &[],
    convention: TensorConvention {
        ordering: StensorOrdering::ShearSwapped,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: true,
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
    link_libraries: &["DianaFEAInterface"],
    cppflags: no_flags,
    include_directories: no_flags,
};
