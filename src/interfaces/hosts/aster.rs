//! Code_Aster `UMAT`.

use super::{INT_IN, IN, MTEST, OUT};
use crate::codegen::conventions::TensorConvention;
use crate::codegen::pipeline::GradientLayout;
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis as MH;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::host::{
    keyword, no_flags, param, EntryPointStyle, FailureProtocol, HostId, HostProfile,
    KeywordValue, MatrixLayout, OrthotropyPolicy, Role,
};
use crate::util::config::HostsConfig;

pub const COMPARE_TO_NUMERICAL_TANGENT_OPERATOR: &str = "CompareToNumericalTangentOperator";
pub const TANGENT_OPERATOR_COMPARISON_CRITERIUM: &str = "TangentOperatorComparisonCriterium";
pub const STRAIN_PERTURBATION_VALUE: &str = "StrainPerturbationValue";
pub const SAVE_TANGENT_OPERATOR: &str = "SaveTangentOperator";
pub const ERROR_REPORT: &str = "ErrorReport";
pub const FINITE_STRAIN_FORMULATION: &str = "FiniteStrainFormulation";

pub const DEFAULT_COMPARISON_CRITERIUM: f64 = 1e7;
pub const DEFAULT_STRAIN_PERTURBATION: f64 = 1e-6;

fn cppflags(hosts: &HostsConfig) -> Vec<String> {
    vec![format!("-DASTER_ARCH={}", hosts.aster_arch())]
}

pub static PROFILE: HostProfile = HostProfile {
    id: HostId::Aster,
    include_dir: "Aster",
    file_prefix: "aster",
    namespace: "aster",
    class_prefix: "Aster",
    keyword_prefix: "Aster",
    keyword_aliases: &[],
    library_prefix: "Aster",
    hypotheses: &[
        (MH::Tridimensional, "3"),
        (MH::Axisymmetrical, "4"),
        (MH::PlaneStress, "5"),
        (MH::PlaneStrain, "6"),
        (MH::GeneralisedPlaneStrain, "7"),
    ],
    behaviour_types: &[
        BehaviourType::StandardStrainBasedBehaviour,
        BehaviourType::StandardFiniteStrainBehaviour,
        BehaviourType::CohesiveZoneModel,
    ],
    entry_points: EntryPointStyle::Dispatched {
        prefix: "aster",
        suffix: "",
    },
    return_type: "void",
    parameters: &[
        param("STRESS", OUT, Role::Stress),
        param("STATEV", OUT, Role::StateVariables),
        param("DDSOE", OUT, Role::Tangent),
        param("STRAN", IN, Role::Strain),
        param("DSTRAN", IN, Role::StrainIncrement),
        param("DTIME", IN, Role::TimeIncrement),
        param("TEMP", IN, Role::Temperature),
        param("DTEMP", IN, Role::TemperatureIncrement),
        param("PREDEF", IN, Role::ExternalStateVariables),
        param("DPRED", IN, Role::ExternalStateVariablesIncrement),
        param("NTENS", INT_IN, Role::Unused),
        param("NSTATV", INT_IN, Role::NumberOfStateVariables),
        param("PROPS", IN, Role::MaterialProperties),
        param("NPROPS", INT_IN, Role::NumberOfMaterialProperties),
        param("DROT", IN, Role::Rotation),
        param("PNEWDT", OUT, Role::FailureFlag),
        param("NUMMOD", INT_IN, Role::Dispatch),
    ],
    // deformation gradients travel in the strain arguments
    role_overrides: &[
        (Role::DeformationGradient0, "STRAN"),
        (Role::DeformationGradient1, "DSTRAN"),
    ],
    convention: TensorConvention::TFEL,
    tangent_column_major: false,
    failure: FailureProtocol {
        statements: &["*PNEWDT = -1.;"],
        return_values: None,
    },
    finite_strain_strategies: false,
    gradient_layout: GradientLayout::FortranMatrix,
    finite_strain_tangent: "DTAU_DDF",
    material_properties: MaterialPropertiesPolicy {
        always_inject_elasticity: false,
        always_inject_thermal_expansion: false,
        mass_density: false,
    },
    orthotropy: OrthotropyPolicy::RotationArgument(MatrixLayout::ColumnMajor),
    stored_strain: false,
    temperature_removed: true,
    keywords: &[
        MTEST,
        keyword(COMPARE_TO_NUMERICAL_TANGENT_OPERATOR, KeywordValue::Flag),
        keyword(TANGENT_OPERATOR_COMPARISON_CRITERIUM, KeywordValue::Real),
        keyword(STRAIN_PERTURBATION_VALUE, KeywordValue::Real),
        keyword(SAVE_TANGENT_OPERATOR, KeywordValue::Flag),
        keyword(
            ERROR_REPORT,
            KeywordValue::Choice(&["Exception", "Message", "NoMessage"]),
        ),
        keyword(
            FINITE_STRAIN_FORMULATION,
            KeywordValue::Choice(&["SIMO_MIEHE", "GROT_GDEP"]),
        ),
    ],
    resources: &[],
    link_libraries: &["AsterInterface"],
    cppflags,
    include_directories: no_flags,
};

/// TFEL tangent operator matching a finite strain formulation.
pub fn formulation_tangent(formulation: &str) -> &'static str {
    match formulation {
        "GROT_GDEP" => "DS_DEGL",
        _ => "DTAU_DDF",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_flag() {
        let mut hosts = HostsConfig::default();
        assert_eq!(cppflags(&hosts), vec!["-DASTER_ARCH=64"]);
        hosts.aster_arch = Some(32);
        assert_eq!(cppflags(&hosts), vec!["-DASTER_ARCH=32"]);
    }

    #[test]
    fn test_formulation_tangent() {
        assert_eq!(formulation_tangent("SIMO_MIEHE"), "DTAU_DDF");
        assert_eq!(formulation_tangent("GROT_GDEP"), "DS_DEGL");
    }
}
