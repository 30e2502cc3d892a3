//! Behaviour fixtures for common test scenarios.

use crate::core::behaviour::{
    attributes, AttributeValue, BehaviourDescription, BehaviourType, MainVariable, SymmetryType,
    VariableDescription,
};
use crate::core::hypothesis::ModellingHypothesis;

fn set(bd: &mut BehaviourDescription, key: &str, value: AttributeValue) {
    bd.attributes.insert(key.to_string(), value);
}

/// Isotropic small strain plasticity, declaring no hypothesis.
///
/// Material properties: `YoungModulus`, `PoissonRatio`, `HardeningSlope`,
/// `YieldStress`. State variables: `ElasticStrain` (stensor) and
/// `EquivalentPlasticStrain`.
pub fn test_plasticity() -> BehaviourDescription {
    let mut bd =
        BehaviourDescription::new("TestPlasticity", BehaviourType::StandardStrainBasedBehaviour);
    bd.data.material_properties = vec![
        VariableDescription::new("young", "stress").with_glossary("YoungModulus"),
        VariableDescription::new("nu", "real").with_glossary("PoissonRatio"),
        VariableDescription::new("H", "stress").with_glossary("HardeningSlope"),
        VariableDescription::new("s0", "stress").with_glossary("YieldStress"),
    ];
    bd.data.state_variables = vec![
        VariableDescription::new("eel", "StrainStensor").with_glossary("ElasticStrain"),
        VariableDescription::new("p", "strain").with_glossary("EquivalentPlasticStrain"),
    ];
    bd
}

/// [`test_plasticity`] restricted to a set of hypotheses.
pub fn test_plasticity_with(hypotheses: &[ModellingHypothesis]) -> BehaviourDescription {
    let mut bd = test_plasticity();
    bd.hypotheses = hypotheses.iter().copied().collect();
    bd
}

/// [`test_plasticity`] declaring a strain measure.
pub fn test_plasticity_with_measure(measure: &str) -> BehaviourDescription {
    let mut bd = test_plasticity();
    set(
        &mut bd,
        attributes::STRAIN_MEASURE,
        AttributeValue::String(measure.to_string()),
    );
    bd
}

/// Norton creep law with a temperature dependent parameter, an external
/// state variable and bounded properties.
pub fn norton() -> BehaviourDescription {
    let mut bd = BehaviourDescription::new("Norton", BehaviourType::StandardStrainBasedBehaviour);
    bd.material = Some("Inconel".to_string());
    bd.library = Some("Creep".to_string());
    bd.data.material_properties = vec![
        VariableDescription::new("young", "stress")
            .with_glossary("YoungModulus")
            .with_bounds(Some(0.), None),
        VariableDescription::new("nu", "real")
            .with_glossary("PoissonRatio")
            .with_bounds(Some(-1.), Some(0.5)),
        VariableDescription::new("A", "real").with_array_size(2),
    ];
    bd.data.state_variables = vec![
        VariableDescription::new("eel", "StrainStensor").with_glossary("ElasticStrain"),
        VariableDescription::new("p", "strain").with_glossary("EquivalentViscoplasticStrain"),
    ];
    bd.data.external_state_variables =
        vec![VariableDescription::new("fd", "real").with_glossary("FissionDensity")];
    bd.data.parameters = vec![VariableDescription::new("theta", "real").with_default_value(0.5)];
    bd
}

/// Orthotropic elasticity requiring the stiffness and thermal expansion
/// tensors.
pub fn orthotropic_elasticity() -> BehaviourDescription {
    let mut bd = BehaviourDescription::new(
        "OrthotropicElastic",
        BehaviourType::StandardStrainBasedBehaviour,
    );
    bd.symmetry = SymmetryType::Orthotropic;
    set(
        &mut bd,
        attributes::REQUIRES_STIFFNESS_TENSOR,
        AttributeValue::Bool(true),
    );
    set(
        &mut bd,
        attributes::REQUIRES_THERMAL_EXPANSION_COEFFICIENT_TENSOR,
        AttributeValue::Bool(true),
    );
    bd.data.state_variables =
        vec![VariableDescription::new("eel", "StrainStensor").with_glossary("ElasticStrain")];
    bd
}

/// Hyperelastic finite strain behaviour.
pub fn saint_venant_kirchhoff() -> BehaviourDescription {
    let mut bd = BehaviourDescription::new(
        "SaintVenantKirchhoffElasticity",
        BehaviourType::StandardFiniteStrainBehaviour,
    );
    bd.data.material_properties = vec![
        VariableDescription::new("young", "stress").with_glossary("YoungModulus"),
        VariableDescription::new("nu", "real").with_glossary("PoissonRatio"),
    ];
    bd
}

/// Cohesive zone model.
pub fn tvergaard() -> BehaviourDescription {
    let mut bd = BehaviourDescription::new("Tvergaard", BehaviourType::CohesiveZoneModel);
    bd.data.material_properties = vec![
        VariableDescription::new("kn", "stress").with_glossary("NormalStiffness"),
        VariableDescription::new("delta_m", "length").with_glossary("MaximumOpeningDisplacement"),
    ];
    bd.data.state_variables = vec![VariableDescription::new("d", "real").with_glossary("Damage")];
    bd
}

/// Steady state heat transfer, a general behaviour with one gradient.
pub fn heat_transfer() -> BehaviourDescription {
    let mut bd = BehaviourDescription::new("StationaryHeatTransfer", BehaviourType::General);
    bd.main_variables = vec![MainVariable {
        gradient: VariableDescription::new("gT", "TemperatureGradient")
            .with_glossary("TemperatureGradient"),
        force: VariableDescription::new("j", "HeatFluxVector").with_glossary("HeatFlux"),
    }];
    bd.data.material_properties =
        vec![VariableDescription::new("k", "thermalconductivity").with_glossary("ThermalConductivity")];
    bd
}

/// TOML serialization of [`test_plasticity`], as read by the CLI.
pub const TEST_PLASTICITY_TOML: &str = r#"
class_name = "TestPlasticity"
behaviour_type = "StandardStrainBasedBehaviour"
hypotheses = []

[[data.material_properties]]
name = "young"
type = "stress"
glossary = "YoungModulus"

[[data.material_properties]]
name = "nu"
glossary = "PoissonRatio"

[[data.material_properties]]
name = "H"
type = "stress"
glossary = "HardeningSlope"

[[data.material_properties]]
name = "s0"
type = "stress"
glossary = "YieldStress"

[[data.state_variables]]
name = "eel"
type = "StrainStensor"
glossary = "ElasticStrain"

[[data.state_variables]]
name = "p"
type = "strain"
glossary = "EquivalentPlasticStrain"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_fixture_matches() {
        let parsed =
            BehaviourDescription::from_toml_str("TestPlasticity.toml", TEST_PLASTICITY_TOML)
                .unwrap();
        assert_eq!(parsed, test_plasticity());
    }
}
