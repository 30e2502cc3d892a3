//! Built-in host records.

pub mod abaqus;
pub mod ansys;
pub mod aster;
pub mod castem;
pub mod comsol;
pub mod cyrano;
pub mod diana;
pub mod generic;
pub mod lsdyna;
pub mod zmat;

use crate::interfaces::host::{
    keyword, HostId, HostKeyword, HostProfile, KeywordValue, FINITE_STRAIN_STRATEGY,
    GENERATE_MTEST_ON_FAILURE,
};

/// Libraries every generated library links against.
pub const TFEL_LIBRARIES: &[&str] = &["TFELMaterial", "TFELMath", "TFELUtilities", "TFELException"];

/// Library providing the MTest file generators.
pub const MTEST_LIBRARY: &str = "MFrontMTestFileGenerator";

pub(crate) const IN: &str = "const double* const";
pub(crate) const OUT: &str = "double* const";
pub(crate) const INT_IN: &str = "const int* const";
pub(crate) const INT_OUT: &str = "int* const";

pub(crate) const MTEST: HostKeyword = keyword(GENERATE_MTEST_ON_FAILURE, KeywordValue::Bool);
pub(crate) const STRATEGY: HostKeyword = keyword(FINITE_STRAIN_STRATEGY, KeywordValue::Strategy);

/// Record of a host.
pub fn profile(id: HostId) -> &'static HostProfile {
    match id {
        HostId::Abaqus => &abaqus::PROFILE,
        HostId::Ansys => &ansys::PROFILE,
        HostId::Aster => &aster::PROFILE,
        HostId::Castem => &castem::PROFILE,
        HostId::Cyrano => &cyrano::PROFILE,
        HostId::Comsol => &comsol::PROFILE,
        HostId::Diana => &diana::PROFILE,
        HostId::Lsdyna => &lsdyna::PROFILE,
        HostId::Zmat => &zmat::PROFILE,
        HostId::Generic => &generic::PROFILE,
    }
}

/// Every host record.
pub fn all() -> impl Iterator<Item = &'static HostProfile> {
    HostId::ALL.into_iter().map(profile)
}
