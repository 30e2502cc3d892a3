//! Example input files shipped next to the generated sources.
//!
//! Material cards list the material properties and state variables in the
//! order the wrapper expects them, with placeholders for the values.

use crate::interfaces::host::HostId;
use crate::interfaces::wrapper::{HypothesisPlan, InterfacePlan};

/// A generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: String,
    pub contents: String,
}

/// Assets of a plan.
pub fn assets(plan: &InterfacePlan<'_>) -> Vec<Asset> {
    match plan.host.id {
        HostId::Abaqus => vec![Asset {
            path: format!("abaqus/{}.inp", plan.behaviour),
            contents: abaqus_input(plan),
        }],
        HostId::Ansys => vec![Asset {
            path: format!("ansys/{}.dat", plan.behaviour),
            contents: ansys_input(plan),
        }],
        _ => Vec::new(),
    }
}

fn state_variables_count(hp: &HypothesisPlan) -> usize {
    hp.leading_size + hp.state_variables_size + hp.trailing_size
}

fn property_names(hp: &HypothesisPlan) -> Vec<String> {
    hp.material_properties.external_names()
}

fn abaqus_input(plan: &InterfacePlan<'_>) -> String {
    let mut out = String::new();
    for (ep, hp) in plan.entry_points.iter().zip(&plan.hypotheses) {
        out.push_str(&format!(
            "** {} ({})\n*Material, name={}\n",
            plan.behaviour, hp.hypothesis, ep.name
        ));
        let nstatv = state_variables_count(hp);
        if nstatv > 0 {
            out.push_str(&format!("*Depvar\n{},\n", nstatv));
            for (name, offset) in &hp.state_variable_offsets {
                out.push_str(&format!("{}, {}\n", offset + 1, name));
            }
        }
        let names = property_names(hp);
        out.push_str("** Replace the placeholders by the values of the material properties\n");
        out.push_str(&format!("*User Material, constants={}\n", names.len()));
        for chunk in names.chunks(8) {
            let values: Vec<String> = chunk.iter().map(|n| format!("<{}>", n)).collect();
            out.push_str(&values.join(", "));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn ansys_input(plan: &InterfacePlan<'_>) -> String {
    let mut out = String::new();
    for (id, (ep, hp)) in plan.entry_points.iter().zip(&plan.hypotheses).enumerate() {
        let matid = id + 1;
        let names = property_names(hp);
        out.push_str(&format!(
            "/com, {} ({}), add `{} lib{}.so {}` to mfront-usermat.dat\n",
            plan.behaviour, hp.hypothesis, matid, plan.library, ep.name
        ));
        out.push_str(&format!("tb,user,{},1,{}\n", matid, names.len()));
        out.push_str("tbtemp,0.\n");
        for (i, chunk) in names.chunks(6).enumerate() {
            let values: Vec<String> = chunk.iter().map(|n| format!("<{}>", n)).collect();
            out.push_str(&format!("tbdata,{},{}\n", 6 * i + 1, values.join(",")));
        }
        let nstatv = state_variables_count(hp);
        if nstatv > 0 {
            out.push_str(&format!("tb,state,{},,{}\n", matid, nstatv));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hypothesis::ModellingHypothesis as MH;
    use crate::interfaces::hosts;
    use crate::test_support::fixtures;
    use crate::util::context::GenerationContext;

    #[test]
    fn test_abaqus_material_card() {
        let bd = fixtures::test_plasticity();
        let host = hosts::profile(HostId::Abaqus);
        let plan = InterfacePlan::build(
            host,
            &bd,
            &GenerationContext::new("out"),
            &[MH::Tridimensional],
            host.orthotropy,
        )
        .unwrap();
        let assets = assets(&plan);
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].path, "abaqus/TestPlasticity.inp");
        let card = &assets[0].contents;
        assert!(card.contains("*Material, name=TestPlasticity_3D"));
        assert!(card.contains("*Depvar\n7,\n1, ElasticStrain\n7, EquivalentPlasticStrain\n"));
        assert!(card.contains("*User Material, constants=4\n"));
        assert!(card.contains("<YoungModulus>, <PoissonRatio>, <HardeningSlope>, <YieldStress>"));
    }

    #[test]
    fn test_ansys_material_card() {
        let bd = fixtures::test_plasticity();
        let host = hosts::profile(HostId::Ansys);
        let plan = InterfacePlan::build(
            host,
            &bd,
            &GenerationContext::new("out"),
            &[MH::PlaneStrain, MH::Tridimensional],
            host.orthotropy,
        )
        .unwrap();
        let card = &assets(&plan)[0].contents;
        assert!(card.contains("tb,user,1,1,4\n"));
        assert!(card.contains("tbdata,1,<YoungModulus>,<PoissonRatio>,<HardeningSlope>,<YieldStress>\n"));
        assert!(card.contains("tb,state,1,,5\n"));
        assert!(card.contains("tb,state,2,,7\n"));
        assert!(card.contains("TestPlasticity_3D"));
    }

    #[test]
    fn test_other_hosts_have_no_assets() {
        let bd = fixtures::test_plasticity();
        let host = hosts::profile(HostId::Castem);
        let plan = InterfacePlan::build(
            host,
            &bd,
            &GenerationContext::new("out"),
            &[MH::Tridimensional],
            host.orthotropy,
        )
        .unwrap();
        assert!(assets(&plan).is_empty());
    }
}
