//! LS-DYNA user material.
//!
//! LS-DYNA only passes strain increments: the total strain is kept in the
//! first state variables, in TFEL's layout, and updated after each
//! successful integration.

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
    id: HostId::Lsdyna,
    include_dir: "LSDYNA",
    file_prefix: "lsdyna",
    namespace: "lsdyna",
    class_prefix: "LSDYNA",
    keyword_prefix: "LSDYNA",
    keyword_aliases: &[],
    library_prefix: "LSDYNA",
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
        param("cm", IN, Role::MaterialProperties),
        param("eps", IN, Role::StrainIncrement),
        param("sigma", OUT, Role::Stress),
        param("hsv", OUT, Role::StateVariables),
        param("nhsv", INT_IN, Role::NumberOfStateVariables),
        param("dt1", IN, Role::TimeIncrement),
        param("temper", IN, Role::Temperature),
        param("dtemper", IN, Role::TemperatureIncrement),
        param("es", OUT, Role::Tangent),
        param("failel", INT_OUT, Role::FailureFlag),
    ],
    role_overrides: &[],
    convention: TensorConvention {
        ordering: StensorOrdering::ShearSwapped,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: false,
    },
    tangent_column_major: false,
    failure: FailureProtocol {
        statements: &["*failel = 1;"],
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
    stored_strain: true,
    temperature_removed: true,
    keywords: &[MTEST],
    resources: &[],
    link_libraries: &["LSDYNAInterface"],
    cppflags: no_flags,
    include_directories: no_flags,
};
