//! Symmetric tensor storage conventions.
//!
//! TFEL stores symmetric tensors as `(xx, yy, zz, √2·xy, √2·xz, √2·yz)`.
//! Host codes use other component orders and store shear components either
//! as plain tensor components (stresses) or engineering values (strains).
//! The maps computed here say, for each TFEL component, where the host
//! stores it and by which factor it must be scaled.

use std::fmt;
use std::ops::Mul;

use serde::Serialize;

use crate::core::hypothesis::ModellingHypothesis;
use crate::interfaces::errors::GenerationError;

/// Component of a symmetric tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Component {
    XX,
    YY,
    ZZ,
    XY,
    XZ,
    YZ,
}

impl Component {
    pub fn is_shear(&self) -> bool {
        matches!(self, Component::XY | Component::XZ | Component::YZ)
    }
}

/// Order in which a host stores the components of a symmetric tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StensorOrdering {
    /// `xx yy zz xy xz yz` (TFEL, Abaqus, Castem, Aster)
    Tfel,
    /// `xx yy zz xy yz xz` (Ansys, DianaFEA, LS-DYNA, Z-set)
    ShearSwapped,
    /// `xx yy zz yz xz xy` (COMSOL)
    Voigt,
}

/// How shear components are scaled by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShearScaling {
    /// `√2` factor on stresses and strains, as TFEL does.
    Tensorial,
    /// Plain stress components and engineering shear strains.
    Engineering,
}

/// Storage convention of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TensorConvention {
    pub ordering: StensorOrdering,
    pub scaling: ShearScaling,
    /// Plane stress tensors omit the out-of-plane component.
    pub reduced_plane_stress: bool,
}

impl TensorConvention {
    pub const TFEL: TensorConvention = TensorConvention {
        ordering: StensorOrdering::Tfel,
        scaling: ShearScaling::Tensorial,
        reduced_plane_stress: false,
    };
}

/// Scaling factor applied to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scale {
    One,
    Two,
    Half,
    Sqrt2,
    InvSqrt2,
}

impl Scale {
    fn exponent(&self) -> i32 {
        // powers of √2
        match self {
            Scale::One => 0,
            Scale::Two => 2,
            Scale::Half => -2,
            Scale::Sqrt2 => 1,
            Scale::InvSqrt2 => -1,
        }
    }

    fn from_exponent(e: i32) -> Self {
        match e {
            0 => Scale::One,
            1 => Scale::Sqrt2,
            -1 => Scale::InvSqrt2,
            2 => Scale::Two,
            _ => Scale::Half,
        }
    }

    /// Factor undoing this one.
    pub fn inverse(&self) -> Scale {
        Scale::from_exponent(-self.exponent())
    }

    pub fn value(&self) -> f64 {
        std::f64::consts::SQRT_2.powi(self.exponent())
    }

    /// C++ multiplicative suffix (`*cste`), empty for one.
    pub fn cxx_factor(&self) -> &'static str {
        match self {
            Scale::One => "",
            Scale::Two => "*2",
            Scale::Half => "/2",
            Scale::Sqrt2 => "*cste_sqrt2",
            Scale::InvSqrt2 => "*cste_isqrt2",
        }
    }
}

impl Mul for Scale {
    type Output = Scale;

    fn mul(self, rhs: Scale) -> Scale {
        Scale::from_exponent(self.exponent() + rhs.exponent())
    }
}

/// Physical nature of the converted tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TensorKind {
    Strain,
    Stress,
}

/// Link between a TFEL component and its host storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentLink {
    pub tfel: usize,
    /// `None` when the host does not store the component.
    pub host: Option<usize>,
    /// Factor turning the host value into the TFEL value.
    pub to_tfel: Scale,
}

/// Component map of a symmetric tensor for one hypothesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentMap {
    pub tfel_size: usize,
    pub host_size: usize,
    pub links: Vec<ComponentLink>,
}

impl ComponentMap {
    /// True when the host stores the tensor exactly as TFEL does.
    pub fn is_identity(&self) -> bool {
        self.tfel_size == self.host_size
            && self
                .links
                .iter()
                .all(|l| l.host == Some(l.tfel) && l.to_tfel == Scale::One)
    }

    /// Whether the map permutes components.
    pub fn is_permutation(&self) -> bool {
        self.links
            .iter()
            .any(|l| l.host.is_some() && l.host != Some(l.tfel))
    }

    /// Host position of a TFEL component.
    pub fn host_index(&self, tfel: usize) -> Option<usize> {
        self.links.get(tfel).and_then(|l| l.host)
    }
}

/// TFEL component order for a hypothesis.
pub fn tfel_layout(h: ModellingHypothesis) -> Result<Vec<Component>, GenerationError> {
    use Component::*;
    Ok(match h.space_dimension()? {
        1 => vec![XX, YY, ZZ],
        2 => vec![XX, YY, ZZ, XY],
        _ => vec![XX, YY, ZZ, XY, XZ, YZ],
    })
}

/// Host component order for a hypothesis.
pub fn host_layout(
    convention: &TensorConvention,
    h: ModellingHypothesis,
) -> Result<Vec<Component>, GenerationError> {
    use Component::*;
    let n = h.space_dimension()?;
    if n == 2 && h == ModellingHypothesis::PlaneStress && convention.reduced_plane_stress {
        return Ok(vec![XX, YY, XY]);
    }
    if n < 3 {
        return tfel_layout(h);
    }
    Ok(match convention.ordering {
        StensorOrdering::Tfel => vec![XX, YY, ZZ, XY, XZ, YZ],
        StensorOrdering::ShearSwapped => vec![XX, YY, ZZ, XY, YZ, XZ],
        StensorOrdering::Voigt => vec![XX, YY, ZZ, YZ, XZ, XY],
    })
}

fn shear_scale(convention: &TensorConvention, kind: TensorKind) -> Scale {
    match (convention.scaling, kind) {
        (ShearScaling::Tensorial, _) => Scale::One,
        // γ = 2ε, TFEL stores √2ε = γ/√2
        (ShearScaling::Engineering, TensorKind::Strain) => Scale::InvSqrt2,
        (ShearScaling::Engineering, TensorKind::Stress) => Scale::Sqrt2,
    }
}

/// Map used to import a host tensor into TFEL's layout (and export back).
pub fn component_map(
    convention: &TensorConvention,
    h: ModellingHypothesis,
    kind: TensorKind,
) -> Result<ComponentMap, GenerationError> {
    let tfel = tfel_layout(h)?;
    let host = host_layout(convention, h)?;
    let shear = shear_scale(convention, kind);
    let links = tfel
        .iter()
        .enumerate()
        .map(|(i, c)| ComponentLink {
            tfel: i,
            host: host.iter().position(|hc| hc == c),
            to_tfel: if c.is_shear() { shear } else { Scale::One },
        })
        .collect();
    Ok(ComponentMap {
        tfel_size: tfel.len(),
        host_size: host.len(),
        links,
    })
}

/// Entry of the host tangent operator, expressed from the TFEL one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TangentLink {
    pub host_row: usize,
    pub host_column: usize,
    pub tfel_row: usize,
    pub tfel_column: usize,
    pub factor: Scale,
}

/// Map exporting `∂σ/∂ε` from TFEL's layout into the host's.
///
/// Entries of components the host does not store are dropped, which
/// truncates plane stress operators.
pub fn tangent_map(
    convention: &TensorConvention,
    h: ModellingHypothesis,
) -> Result<Vec<TangentLink>, GenerationError> {
    let stress = component_map(convention, h, TensorKind::Stress)?;
    let strain = component_map(convention, h, TensorKind::Strain)?;
    let mut links = Vec::new();
    for r in &stress.links {
        let Some(host_row) = r.host else { continue };
        for c in &strain.links {
            let Some(host_column) = c.host else { continue };
            // σ_h = σ_t / a_r, ε_t = b_c ε_h  =>  D_h = K_t · b_c / a_r
            links.push(TangentLink {
                host_row,
                host_column,
                tfel_row: r.tfel,
                tfel_column: c.tfel,
                factor: r.to_tfel.inverse() * c.to_tfel,
            });
        }
    }
    Ok(links)
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Component::XX => "xx",
            Component::YY => "yy",
            Component::ZZ => "zz",
            Component::XY => "xy",
            Component::XZ => "xz",
            Component::YZ => "yz",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSYS: TensorConvention = TensorConvention {
        ordering: StensorOrdering::ShearSwapped,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: false,
    };

    const ABAQUS: TensorConvention = TensorConvention {
        ordering: StensorOrdering::Tfel,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: true,
    };

    #[test]
    fn test_tfel_convention_is_identity() {
        for h in ModellingHypothesis::ALL {
            let m = component_map(&TensorConvention::TFEL, h, TensorKind::Strain).unwrap();
            assert!(m.is_identity());
        }
    }

    #[test]
    fn test_ansys_swaps_shear_components_in_3d() {
        let m = component_map(&ANSYS, ModellingHypothesis::Tridimensional, TensorKind::Strain)
            .unwrap();
        assert_eq!(m.host_index(3), Some(3));
        assert_eq!(m.host_index(4), Some(5));
        assert_eq!(m.host_index(5), Some(4));
        assert!(m.is_permutation());
        assert_eq!(m.links[4].to_tfel, Scale::InvSqrt2);
        assert_eq!(m.links[0].to_tfel, Scale::One);
        // no permutation in 2D
        let m2 = component_map(&ANSYS, ModellingHypothesis::PlaneStrain, TensorKind::Stress)
            .unwrap();
        assert!(!m2.is_permutation());
        assert_eq!(m2.links[3].to_tfel, Scale::Sqrt2);
    }

    #[test]
    fn test_reduced_plane_stress_is_padded() {
        let m = component_map(&ABAQUS, ModellingHypothesis::PlaneStress, TensorKind::Stress)
            .unwrap();
        assert_eq!(m.host_size, 3);
        assert_eq!(m.tfel_size, 4);
        assert_eq!(m.links[2].host, None);
        assert_eq!(m.host_index(3), Some(2));
    }

    #[test]
    fn test_voigt_ordering() {
        let comsol = TensorConvention {
            ordering: StensorOrdering::Voigt,
            scaling: ShearScaling::Engineering,
            reduced_plane_stress: false,
        };
        let m = component_map(&comsol, ModellingHypothesis::Tridimensional, TensorKind::Stress)
            .unwrap();
        assert_eq!(m.host_index(3), Some(5));
        assert_eq!(m.host_index(4), Some(4));
        assert_eq!(m.host_index(5), Some(3));
    }

    #[test]
    fn test_tangent_factors() {
        let links = tangent_map(&ANSYS, ModellingHypothesis::Tridimensional).unwrap();
        assert_eq!(links.len(), 36);
        let find = |r: usize, c: usize| {
            links
                .iter()
                .find(|l| l.tfel_row == r && l.tfel_column == c)
                .copied()
                .unwrap()
        };
        assert_eq!(find(0, 0).factor, Scale::One);
        assert_eq!(find(3, 3).factor, Scale::Half);
        assert_eq!(find(0, 3).factor, Scale::InvSqrt2);
        assert_eq!(find(3, 0).factor, Scale::InvSqrt2);
        assert_eq!(find(4, 5).host_row, 5);
        assert_eq!(find(4, 5).host_column, 4);
        let reduced = tangent_map(&ABAQUS, ModellingHypothesis::PlaneStress).unwrap();
        assert_eq!(reduced.len(), 9);
    }

    #[test]
    fn test_scale_algebra() {
        assert_eq!(Scale::InvSqrt2 * Scale::InvSqrt2, Scale::Half);
        assert_eq!(Scale::Sqrt2 * Scale::InvSqrt2, Scale::One);
        assert_eq!(Scale::Sqrt2.inverse(), Scale::InvSqrt2);
        assert!((Scale::Half.value() - 0.5).abs() < 1e-12);
    }
}
