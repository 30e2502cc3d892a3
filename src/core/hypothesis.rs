//! Modelling hypotheses.
//!
//! A modelling hypothesis is a kinematic simplification that fixes the space
//! dimension and therefore the number of components of every tensorial
//! object exchanged with a host code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interfaces::errors::GenerationError;

/// Closed set of modelling hypotheses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ModellingHypothesis {
    AxisymmetricalGeneralisedPlaneStrain,
    AxisymmetricalGeneralisedPlaneStress,
    Axisymmetrical,
    PlaneStress,
    PlaneStrain,
    GeneralisedPlaneStrain,
    Tridimensional,
    UndefinedHypothesis,
}

impl ModellingHypothesis {
    /// Every defined hypothesis, in the order used by generated symbol tables.
    pub const ALL: [ModellingHypothesis; 7] = [
        ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain,
        ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress,
        ModellingHypothesis::Axisymmetrical,
        ModellingHypothesis::PlaneStress,
        ModellingHypothesis::PlaneStrain,
        ModellingHypothesis::GeneralisedPlaneStrain,
        ModellingHypothesis::Tridimensional,
    ];

    /// Canonical name, as used in behaviour descriptions and symbols.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain => {
                "AxisymmetricalGeneralisedPlaneStrain"
            }
            ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress => {
                "AxisymmetricalGeneralisedPlaneStress"
            }
            ModellingHypothesis::Axisymmetrical => "Axisymmetrical",
            ModellingHypothesis::PlaneStress => "PlaneStress",
            ModellingHypothesis::PlaneStrain => "PlaneStrain",
            ModellingHypothesis::GeneralisedPlaneStrain => "GeneralisedPlaneStrain",
            ModellingHypothesis::Tridimensional => "Tridimensional",
            ModellingHypothesis::UndefinedHypothesis => "UndefinedHypothesis",
        }
    }

    /// Enumerator name in `tfel::material::ModellingHypothesis`.
    pub fn tfel_enumerator(&self) -> &'static str {
        match self {
            ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain => {
                "AXISYMMETRICALGENERALISEDPLANESTRAIN"
            }
            ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress => {
                "AXISYMMETRICALGENERALISEDPLANESTRESS"
            }
            ModellingHypothesis::Axisymmetrical => "AXISYMMETRICAL",
            ModellingHypothesis::PlaneStress => "PLANESTRESS",
            ModellingHypothesis::PlaneStrain => "PLANESTRAIN",
            ModellingHypothesis::GeneralisedPlaneStrain => "GENERALISEDPLANESTRAIN",
            ModellingHypothesis::Tridimensional => "TRIDIMENSIONAL",
            ModellingHypothesis::UndefinedHypothesis => "UNDEFINEDHYPOTHESIS",
        }
    }

    /// Fully qualified C++ expression for this hypothesis.
    pub fn cxx_enumerator(&self) -> String {
        format!("ModellingHypothesis::{}", self.tfel_enumerator())
    }

    /// Space dimension of the hypothesis.
    pub fn space_dimension(&self) -> Result<u16, GenerationError> {
        match self {
            ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain
            | ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress => Ok(1),
            ModellingHypothesis::Axisymmetrical
            | ModellingHypothesis::PlaneStress
            | ModellingHypothesis::PlaneStrain
            | ModellingHypothesis::GeneralisedPlaneStrain => Ok(2),
            ModellingHypothesis::Tridimensional => Ok(3),
            ModellingHypothesis::UndefinedHypothesis => {
                Err(GenerationError::UnsupportedHypothesis {
                    hypothesis: self.as_str().to_string(),
                    context: "no space dimension is attached to this hypothesis".to_string(),
                })
            }
        }
    }

    /// Number of components of a vector.
    pub fn tvector_size(&self) -> Result<u16, GenerationError> {
        self.space_dimension()
    }

    /// Number of components of a symmetric tensor.
    pub fn stensor_size(&self) -> Result<u16, GenerationError> {
        self.space_dimension().map(stensor_size_for_dimension)
    }

    /// Number of components of a non symmetric tensor.
    pub fn tensor_size(&self) -> Result<u16, GenerationError> {
        self.space_dimension().map(tensor_size_for_dimension)
    }

    /// True for the hypotheses where the axial stress is zero and the
    /// out-of-plane strain is an unknown of the integration.
    pub fn is_plane_stress(&self) -> bool {
        matches!(
            self,
            ModellingHypothesis::PlaneStress
                | ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress
        )
    }
}

/// Number of symmetric tensor components for a space dimension.
pub fn stensor_size_for_dimension(n: u16) -> u16 {
    match n {
        1 => 3,
        2 => 4,
        _ => 6,
    }
}

/// Number of general tensor components for a space dimension.
pub fn tensor_size_for_dimension(n: u16) -> u16 {
    match n {
        1 => 3,
        2 => 5,
        _ => 9,
    }
}

impl fmt::Display for ModellingHypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModellingHypothesis {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let h = match s {
            "AxisymmetricalGeneralisedPlaneStrain" => {
                ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain
            }
            "AxisymmetricalGeneralisedPlaneStress" => {
                ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress
            }
            "Axisymmetrical" => ModellingHypothesis::Axisymmetrical,
            "PlaneStress" => ModellingHypothesis::PlaneStress,
            "PlaneStrain" => ModellingHypothesis::PlaneStrain,
            "GeneralisedPlaneStrain" => ModellingHypothesis::GeneralisedPlaneStrain,
            "Tridimensional" | "3D" => ModellingHypothesis::Tridimensional,
            _ => {
                return Err(GenerationError::UnsupportedHypothesis {
                    hypothesis: s.to_string(),
                    context: "unknown modelling hypothesis name".to_string(),
                })
            }
        };
        Ok(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_are_ordered() {
        for h in ModellingHypothesis::ALL {
            let n = h.space_dimension().unwrap();
            assert_eq!(h.tvector_size().unwrap(), n);
            assert!(h.stensor_size().unwrap() <= h.tensor_size().unwrap());
            assert!(h.tensor_size().unwrap() <= 9);
        }
    }

    #[test]
    fn test_undefined_hypothesis_has_no_dimension() {
        let err = ModellingHypothesis::UndefinedHypothesis
            .space_dimension()
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedHypothesis { .. }));
    }

    #[test]
    fn test_parse_round_trip_names() {
        for h in ModellingHypothesis::ALL {
            assert_eq!(h.as_str().parse::<ModellingHypothesis>().unwrap(), h);
        }
        assert!("Plane".parse::<ModellingHypothesis>().is_err());
    }

    #[test]
    fn test_plane_stress_flags() {
        assert!(ModellingHypothesis::PlaneStress.is_plane_stress());
        assert!(ModellingHypothesis::AxisymmetricalGeneralisedPlaneStress.is_plane_stress());
        assert!(!ModellingHypothesis::PlaneStrain.is_plane_stress());
    }
}
