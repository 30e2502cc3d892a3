//! Host-agnostic behaviour ABI.
//!
//! A single `mfront_gb_BehaviourData` argument carries the states at the
//! beginning and at the end of the time step. The temperature is the first
//! external state variable.

use super::{MTEST, STRATEGY};
use crate::codegen::conventions::TensorConvention;
use crate::codegen::pipeline::GradientLayout;
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis as MH;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::host::{
    no_flags, param, EntryPointStyle, FailureProtocol, HostId, HostProfile, MatrixLayout,
    OrthotropyPolicy, Role,
};

pub static PROFILE: HostProfile = HostProfile {
    id: HostId::Generic,
    include_dir: "GenericBehaviour",
    file_prefix: "generic",
    namespace: "mfront::gb",
    class_prefix: "Generic",
    keyword_prefix: "Generic",
    keyword_aliases: &["GenericInterface"],
    library_prefix: "",
    hypotheses: &[
        (MH::AxisymmetricalGeneralisedPlaneStrain, "AxisymmetricalGeneralisedPlaneStrain"),
        (MH::AxisymmetricalGeneralisedPlaneStress, "AxisymmetricalGeneralisedPlaneStress"),
        (MH::Axisymmetrical, "Axisymmetrical"),
        (MH::PlaneStress, "PlaneStress"),
        (MH::PlaneStrain, "PlaneStrain"),
        (MH::GeneralisedPlaneStrain, "GeneralisedPlaneStrain"),
        (MH::Tridimensional, "Tridimensional"),
    ],
    behaviour_types: &[
        BehaviourType::StandardStrainBasedBehaviour,
        BehaviourType::StandardFiniteStrainBehaviour,
        BehaviourType::CohesiveZoneModel,
        BehaviourType::General,
    ],
    entry_points: EntryPointStyle::PerHypothesis,
    return_type: "int",
    parameters: &[param("d", "mfront_gb_BehaviourData* const", Role::Unused)],
    role_overrides: &[
        (Role::Stress, "d->s0.thermodynamic_forces"),
        (Role::StressOut, "d->s1.thermodynamic_forces"),
        (Role::StateVariables, "d->s0.internal_state_variables"),
        (Role::StateVariablesOut, "d->s1.internal_state_variables"),
        (Role::Strain, "d->s0.gradients"),
        (Role::StrainAtEnd, "d->s1.gradients"),
        (Role::DeformationGradient0, "d->s0.gradients"),
        (Role::DeformationGradient1, "d->s1.gradients"),
        (Role::Tangent, "d->K"),
        (Role::TimeIncrement, "d->dt"),
        (Role::Temperature, "d->s0.external_state_variables[0]"),
        (Role::TemperatureAtEnd, "d->s1.external_state_variables[0]"),
        (Role::ExternalStateVariables, "d->s0.external_state_variables+1"),
        (Role::ExternalStateVariablesAtEnd, "d->s1.external_state_variables+1"),
        (Role::MaterialProperties, "d->s1.material_properties"),
        (Role::Rotation, "d->rotation"),
    ],
    convention: TensorConvention::TFEL,
    tangent_column_major: false,
    failure: FailureProtocol {
        statements: &["*(d->rdt) = 0.1;"],
        return_values: Some(("1", "0")),
    },
    finite_strain_strategies: true,
    gradient_layout: GradientLayout::Tfel,
    finite_strain_tangent: "DPK1_DF",
    material_properties: MaterialPropertiesPolicy {
        always_inject_elasticity: false,
        always_inject_thermal_expansion: false,
        mass_density: false,
    },
    orthotropy: OrthotropyPolicy::RotationArgument(MatrixLayout::RowMajor),
    stored_strain: false,
    temperature_removed: false,
    keywords: &[STRATEGY, MTEST],
    resources: &[],
    link_libraries: &["MFrontGenericInterface"],
    cppflags: no_flags,
    include_directories: no_flags,
};
