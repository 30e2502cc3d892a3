//! Cyrano fuel performance code.

use super::{INT_IN, INT_OUT, IN, MTEST, OUT};
use crate::codegen::conventions::TensorConvention;
use crate::codegen::pipeline::GradientLayout;
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis as MH;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::host::{
    no_flags, param, EntryPointStyle, FailureProtocol, HostId, HostProfile, OrthotropyPolicy,
    Role,
};
use crate::util::config::HostsConfig;

fn cppflags(hosts: &HostsConfig) -> Vec<String> {
    vec![format!("-DCYRANO_ARCH={}", hosts.cyrano_arch())]
}

pub static PROFILE: HostProfile = HostProfile {
    id: HostId::Cyrano,
    include_dir: "Cyrano",
    file_prefix: "cyrano",
    namespace: "cyrano",
    class_prefix: "Cyrano",
    keyword_prefix: "Cyrano",
    keyword_aliases: &[],
    library_prefix: "Cyrano",
    hypotheses: &[
        (MH::AxisymmetricalGeneralisedPlaneStrain, "1"),
        (MH::AxisymmetricalGeneralisedPlaneStress, "3"),
    ],
    behaviour_types: &[BehaviourType::StandardStrainBasedBehaviour],
    entry_points: EntryPointStyle::Dispatched {
        prefix: "cyrano",
        suffix: "",
    },
    return_type: "void",
    parameters: &[
        param("NTENS", INT_IN, Role::Unused),
        param("DTIME", IN, Role::TimeIncrement),
        param("DROT", IN, Role::Unused),
        param("DDSDDE", OUT, Role::Tangent),
        param("STRAN", IN, Role::Strain),
        param("DSTRAN", IN, Role::StrainIncrement),
        param("TEMP", IN, Role::Temperature),
        param("DTEMP", IN, Role::TemperatureIncrement),
        param("PROPS", IN, Role::MaterialProperties),
        param("NPROPS", INT_IN, Role::NumberOfMaterialProperties),
        param("PREDEF", IN, Role::ExternalStateVariables),
        param("DPRED", IN, Role::ExternalStateVariablesIncrement),
        param("STATEV", OUT, Role::StateVariables),
        param("NSTATV", INT_IN, Role::NumberOfStateVariables),
        param("STRESS", OUT, Role::Stress),
        param("NDI", INT_IN, Role::Dispatch),
        param("KINC", INT_OUT, Role::FailureFlag),
    ],
    role_overrides: &[],
    convention: TensorConvention::TFEL,
    tangent_column_major: false,
    failure: FailureProtocol {
        statements: &["*KINC = -1;"],
        return_values: None,
    },
    finite_strain_strategies: false,
    gradient_layout: GradientLayout::Tfel,
    finite_strain_tangent: "DSIG_DF",
    material_properties: MaterialPropertiesPolicy {
        always_inject_elasticity: true,
        always_inject_thermal_expansion: true,
        mass_density: false,
    },
    orthotropy: OrthotropyPolicy::HostManaged,
    stored_strain: false,
    temperature_removed: true,
    keywords: &[MTEST],
    resources: &[],
    link_libraries: &["CyranoInterface"],
    cppflags,
    include_directories: no_flags,
};
