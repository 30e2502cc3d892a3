//! Finite strain strategies.
//!
//! A strain-based behaviour can be used by a host working in finite strain
//! through a strategy turning the deformation gradients into a strain
//! measure and the behaviour stress into the host stress.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::behaviour::{
    attributes, AttributeValue, BehaviourDescription, StrainMeasure,
};
use crate::interfaces::errors::GenerationError;

/// Strategy used to wrap a strain-based behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiniteStrainStrategy {
    Native,
    FiniteRotationSmallStrain,
    MieheApelLambrechtLogarithmicStrain,
}

impl FiniteStrainStrategy {
    pub const ALL: [FiniteStrainStrategy; 3] = [
        FiniteStrainStrategy::Native,
        FiniteStrainStrategy::FiniteRotationSmallStrain,
        FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FiniteStrainStrategy::Native => "Native",
            FiniteStrainStrategy::FiniteRotationSmallStrain => "FiniteRotationSmallStrain",
            FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain => {
                "MieheApelLambrechtLogarithmicStrain"
            }
        }
    }

    /// The only strategy legal for a strain measure.
    pub fn for_strain_measure(measure: StrainMeasure) -> Self {
        match measure {
            StrainMeasure::Linearised => FiniteStrainStrategy::Native,
            StrainMeasure::GreenLagrange => FiniteStrainStrategy::FiniteRotationSmallStrain,
            StrainMeasure::Hencky => FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain,
        }
    }

    /// The strain measure a strategy feeds the behaviour with.
    pub fn strain_measure(&self) -> StrainMeasure {
        match self {
            FiniteStrainStrategy::Native => StrainMeasure::Linearised,
            FiniteStrainStrategy::FiniteRotationSmallStrain => StrainMeasure::GreenLagrange,
            FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain => StrainMeasure::Hencky,
        }
    }

    /// Whether the host passes deformation gradients to the wrapper.
    pub fn uses_deformation_gradients(&self) -> bool {
        !matches!(self, FiniteStrainStrategy::Native)
    }

    /// Code of the `_FiniteStrainStrategy` symbol.
    pub fn symbol_code(&self) -> i32 {
        match self {
            FiniteStrainStrategy::Native => 0,
            FiniteStrainStrategy::FiniteRotationSmallStrain => 1,
            FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain => 2,
        }
    }
}

impl fmt::Display for FiniteStrainStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FiniteStrainStrategy {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Native" | "None" => Ok(FiniteStrainStrategy::Native),
            "FiniteRotationSmallStrain" => Ok(FiniteStrainStrategy::FiniteRotationSmallStrain),
            "MieheApelLambrechtLogarithmicStrain" | "LogarithmicStrain" => {
                Ok(FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain)
            }
            _ => Err(GenerationError::InvalidKeywordValue {
                keyword: attributes::FINITE_STRAIN_STRATEGY.to_string(),
                value: s.to_string(),
                expected: "Native, FiniteRotationSmallStrain or \
                           MieheApelLambrechtLogarithmicStrain"
                    .to_string(),
            }),
        }
    }
}

/// Resolver state for one behaviour and one interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyDeclaration {
    #[default]
    Undeclared,
    Declared(FiniteStrainStrategy),
}

/// Attribute key holding the strategy declared for an interface.
pub fn strategy_attribute_key(interface: &str) -> String {
    format!("{}::{}", interface, attributes::FINITE_STRAIN_STRATEGY)
}

/// Read the strategy explicitly declared for an interface.
pub fn declared_strategy(
    bd: &BehaviourDescription,
    interface: &str,
) -> Result<StrategyDeclaration, GenerationError> {
    match bd.string_attribute(&strategy_attribute_key(interface)) {
        Some(s) => Ok(StrategyDeclaration::Declared(s.parse()?)),
        None => Ok(StrategyDeclaration::Undeclared),
    }
}

/// Record an explicit `@<Host>FiniteStrainStrategy` declaration.
///
/// Only the `Undeclared` state may transition; redeclaring the same
/// strategy is accepted.
pub fn declare_strategy(
    bd: &mut BehaviourDescription,
    interface: &str,
    strategy: FiniteStrainStrategy,
) -> Result<(), GenerationError> {
    if !bd.is_strain_based() {
        return Err(GenerationError::IncompatibleFiniteStrainStrategy {
            reason: format!(
                "finite strain strategies only apply to strain-based behaviours, `{}` is a `{}`",
                bd.behaviour_name(),
                bd.behaviour_type
            ),
        });
    }
    if let StrategyDeclaration::Declared(previous) = declared_strategy(bd, interface)? {
        if previous != strategy {
            return Err(GenerationError::IncompatibleFiniteStrainStrategy {
                reason: format!(
                    "strategy `{}` already declared for `{}`, can't switch to `{}`",
                    previous, interface, strategy
                ),
            });
        }
    }
    bd.set_attribute(
        &strategy_attribute_key(interface),
        AttributeValue::String(strategy.as_str().to_string()),
        true,
    )
}

/// Effective strategy for a behaviour and an interface.
///
/// Returns `None` for behaviours that are not strain-based. Fails on a
/// strategy declared for a non strain-based behaviour and on a declared
/// strategy that disagrees with the declared strain measure.
pub fn resolve_strategy(
    bd: &BehaviourDescription,
    interface: &str,
) -> Result<Option<FiniteStrainStrategy>, GenerationError> {
    let declared = declared_strategy(bd, interface)?;
    if !bd.is_strain_based() {
        if let StrategyDeclaration::Declared(s) = declared {
            return Err(GenerationError::IncompatibleFiniteStrainStrategy {
                reason: format!(
                    "strategy `{}` declared for the `{}` behaviour `{}`",
                    s,
                    bd.behaviour_type,
                    bd.behaviour_name()
                ),
            });
        }
        return Ok(None);
    }
    let measure = bd.strain_measure()?;
    let strategy = match (declared, measure) {
        (StrategyDeclaration::Undeclared, None) => FiniteStrainStrategy::Native,
        (StrategyDeclaration::Undeclared, Some(m)) => FiniteStrainStrategy::for_strain_measure(m),
        (StrategyDeclaration::Declared(s), None) => s,
        (StrategyDeclaration::Declared(s), Some(m)) => {
            let expected = FiniteStrainStrategy::for_strain_measure(m);
            if s != expected {
                return Err(GenerationError::IncompatibleFiniteStrainStrategy {
                    reason: format!(
                        "`{}` declared for `{}` but the strain measure `{}` requires `{}`",
                        s,
                        interface,
                        m.as_str(),
                        expected
                    ),
                });
            }
            s
        }
    };
    Ok(Some(strategy))
}
