//! COMSOL Multiphysics external material.

use super::{INT_IN, IN, MTEST, OUT};
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
    id: HostId::Comsol,
    include_dir: "Comsol",
    file_prefix: "comsol",
    namespace: "comsol",
    class_prefix: "Comsol",
    keyword_prefix: "Comsol",
    keyword_aliases: &[],
    library_prefix: "Comsol",
    hypotheses: &[(MH::Tridimensional, "")],
    behaviour_types: &[BehaviourType::StandardStrainBasedBehaviour],
    entry_points: EntryPointStyle::PerHypothesis,
    return_type: "int",
    parameters: &[
        param("e", IN, Role::StrainAtEnd),
        param("eOld", IN, Role::Strain),
        param("s", OUT, Role::Stress),
        param("D", OUT, Role::Tangent),
        param("nPar", INT_IN, Role::NumberOfMaterialProperties),
        param("par", IN, Role::MaterialProperties),
        param("nStates", INT_IN, Role::NumberOfStateVariables),
        param("states", OUT, Role::StateVariables),
        param("Temp", IN, Role::TemperatureAtEnd),
        param("TempOld", IN, Role::Temperature),
        param("delta", IN, Role::TimeIncrement),
    ],
    role_overrides: &[],
    convention: TensorConvention {
        ordering: StensorOrdering::Voigt,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: false,
    },
    tangent_column_major: false,
    failure: FailureProtocol {
        statements: &[],
        return_values: Some(("0", "1")),
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
    link_libraries: &["ComsolInterface"],
    cppflags: no_flags,
    include_directories: no_flags,
};
