//! Symbolic sizes of packed arrays.
//!
//! Offsets inside the flat arrays exchanged with host codes depend on the
//! modelling hypothesis. A [`TypeSize`] counts scalars, vectors, symmetric
//! tensors and tensors separately and is only turned into an integer once
//! the hypothesis is known.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::core::hypothesis::{
    stensor_size_for_dimension, tensor_size_for_dimension, ModellingHypothesis,
};
use crate::interfaces::errors::GenerationError;

/// Kind of a variable, as far as its packed size is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Scalar,
    TVector,
    Stensor,
    Tensor,
}

impl VariableType {
    /// Classify a TFEL type name.
    ///
    /// Unknown names are treated as scalars, the front end having already
    /// validated them.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Stensor" | "StrainStensor" | "StressStensor" | "FrequencyStensor"
            | "StrainRateStensor" | "StressRateStensor" => VariableType::Stensor,
            "TVector" | "DisplacementTVector" | "ForceTVector" | "HeatFluxVector"
            | "TemperatureGradient" => VariableType::TVector,
            "Tensor" | "DeformationGradientTensor" | "DeformationGradientRateTensor" => {
                VariableType::Tensor
            }
            _ => VariableType::Scalar,
        }
    }

    /// Integer code used in generated symbol tables.
    pub fn symbol_code(&self) -> i32 {
        match self {
            VariableType::Scalar => 0,
            VariableType::Stensor => 1,
            VariableType::TVector => 2,
            VariableType::Tensor => 3,
        }
    }

    /// Unit size of one object of this type.
    pub fn type_size(&self) -> TypeSize {
        match self {
            VariableType::Scalar => TypeSize::new(1, 0, 0, 0),
            VariableType::TVector => TypeSize::new(0, 1, 0, 0),
            VariableType::Stensor => TypeSize::new(0, 0, 1, 0),
            VariableType::Tensor => TypeSize::new(0, 0, 0, 1),
        }
    }
}

/// Symbolic size: a commutative group element over the four base kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSize {
    pub scalar: i32,
    pub tvector: i32,
    pub stensor: i32,
    pub tensor: i32,
}

impl TypeSize {
    pub fn new(scalar: i32, tvector: i32, stensor: i32, tensor: i32) -> Self {
        TypeSize {
            scalar,
            tvector,
            stensor,
            tensor,
        }
    }

    /// Size of `array_size` objects of type `ty`.
    pub fn of(ty: VariableType, array_size: u16) -> Self {
        ty.type_size() * array_size
    }

    /// Whether this is the zero element.
    pub fn is_null(&self) -> bool {
        self.scalar == 0 && self.tvector == 0 && self.stensor == 0 && self.tensor == 0
    }

    /// Resolve for a space dimension.
    pub fn value_for_dimension(&self, n: u16) -> Result<i32, GenerationError> {
        if !(1..=3).contains(&n) {
            return Err(GenerationError::UnsupportedHypothesis {
                hypothesis: format!("space dimension {}", n),
                context: "space dimension must be 1, 2 or 3".to_string(),
            });
        }
        let n_i = i32::from(n);
        Ok(self.scalar
            + self.tvector * n_i
            + self.stensor * i32::from(stensor_size_for_dimension(n))
            + self.tensor * i32::from(tensor_size_for_dimension(n)))
    }

    /// Resolve for a modelling hypothesis.
    pub fn value_for_hypothesis(&self, h: ModellingHypothesis) -> Result<i32, GenerationError> {
        self.value_for_dimension(h.space_dimension()?)
    }

    /// Resolve for a hypothesis and convert to an unsigned index.
    pub fn index_for_hypothesis(&self, h: ModellingHypothesis) -> Result<usize, GenerationError> {
        let v = self.value_for_hypothesis(h)?;
        usize::try_from(v).map_err(|_| GenerationError::UnsupportedHypothesis {
            hypothesis: h.as_str().to_string(),
            context: format!("negative packed size {} ({})", v, self),
        })
    }
}

impl Add for TypeSize {
    type Output = TypeSize;

    fn add(mut self, rhs: TypeSize) -> TypeSize {
        self += rhs;
        self
    }
}

impl AddAssign for TypeSize {
    fn add_assign(&mut self, rhs: TypeSize) {
        self.scalar += rhs.scalar;
        self.tvector += rhs.tvector;
        self.stensor += rhs.stensor;
        self.tensor += rhs.tensor;
    }
}

impl Sub for TypeSize {
    type Output = TypeSize;

    fn sub(mut self, rhs: TypeSize) -> TypeSize {
        self -= rhs;
        self
    }
}

impl SubAssign for TypeSize {
    fn sub_assign(&mut self, rhs: TypeSize) {
        self.scalar -= rhs.scalar;
        self.tvector -= rhs.tvector;
        self.stensor -= rhs.stensor;
        self.tensor -= rhs.tensor;
    }
}

impl Neg for TypeSize {
    type Output = TypeSize;

    fn neg(self) -> TypeSize {
        TypeSize::default() - self
    }
}

impl Mul<u16> for TypeSize {
    type Output = TypeSize;

    fn mul(self, rhs: u16) -> TypeSize {
        let k = i32::from(rhs);
        TypeSize::new(
            self.scalar * k,
            self.tvector * k,
            self.stensor * k,
            self.tensor * k,
        )
    }
}

impl fmt::Display for TypeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = [
            (self.scalar, ""),
            (self.tvector, "TVectorSize"),
            (self.stensor, "StensorSize"),
            (self.tensor, "TensorSize"),
        ];
        let mut first = true;
        for (count, unit) in terms {
            if count == 0 {
                continue;
            }
            if !first {
                f.write_str(if count > 0 { "+" } else { "-" })?;
            } else if count < 0 {
                f.write_str("-")?;
            }
            let c = count.abs();
            match (unit.is_empty(), c) {
                (true, _) => write!(f, "{}", c)?,
                (false, 1) => f.write_str(unit)?,
                (false, _) => write!(f, "{}*{}", c, unit)?,
            }
            first = false;
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_laws() {
        let a = TypeSize::new(1, 2, 3, 4);
        let b = TypeSize::new(-2, 0, 1, 1);
        assert_eq!(a + b, b + a);
        assert_eq!(a - a, TypeSize::default());
        assert!((a + (-a)).is_null());
        assert_eq!((a + b) - b, a);
    }

    #[test]
    fn test_resolution_per_hypothesis() {
        let s = TypeSize::of(VariableType::Stensor, 1) + TypeSize::of(VariableType::Scalar, 2);
        assert_eq!(
            s.value_for_hypothesis(ModellingHypothesis::Tridimensional).unwrap(),
            8
        );
        assert_eq!(
            s.value_for_hypothesis(ModellingHypothesis::PlaneStrain).unwrap(),
            6
        );
        assert_eq!(
            s.value_for_hypothesis(ModellingHypothesis::AxisymmetricalGeneralisedPlaneStrain)
                .unwrap(),
            5
        );
        let t = TypeSize::of(VariableType::Tensor, 2);
        assert_eq!(t.value_for_dimension(2).unwrap(), 10);
    }

    #[test]
    fn test_undefined_hypothesis_is_rejected() {
        let s = TypeSize::new(1, 0, 0, 0);
        assert!(s
            .value_for_hypothesis(ModellingHypothesis::UndefinedHypothesis)
            .is_err());
        assert!(s.value_for_dimension(4).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeSize::default().to_string(), "0");
        assert_eq!(TypeSize::new(3, 0, 2, 0).to_string(), "3+2*StensorSize");
        assert_eq!(TypeSize::new(0, 1, 0, -1).to_string(), "TVectorSize-TensorSize");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(VariableType::from_type_name("StrainStensor"), VariableType::Stensor);
        assert_eq!(VariableType::from_type_name("real"), VariableType::Scalar);
        assert_eq!(
            VariableType::from_type_name("DeformationGradientTensor"),
            VariableType::Tensor
        );
    }
}
