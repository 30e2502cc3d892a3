//! CLI integration tests for mfront-interfaces.
//!
//! These tests run the binary on behaviour descriptions written to a
//! temporary directory and inspect the generated tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const TEST_PLASTICITY: &str = r#"
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

/// Get the mfront-interfaces binary command.
fn mfront_interfaces() -> Command {
    Command::cargo_bin("mfront-interfaces").unwrap()
}

/// Write a behaviour description, with extra TOML appended.
fn write_behaviour(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("TestPlasticity.toml");
    fs::write(&path, format!("{}{}", TEST_PLASTICITY, extra)).unwrap();
    path
}

// ============================================================================
// mfront-interfaces generate
// ============================================================================

#[test]
fn test_generate_ansys() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "");

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["--interface", "ansys", "--output-dir", "out"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished `TestPlasticity`"));

    let out = tmp.path().join("out");
    let header = out.join("include/MFront/Ansys/ansysTestPlasticity.hxx");
    let source = out.join("src/ansysTestPlasticity.cxx");
    assert!(header.exists());
    assert!(out.join("ansys/usermat.cpp").exists());
    assert!(out.join("ansys/TestPlasticity.dat").exists());

    let source = fs::read_to_string(source).unwrap();
    for ep in [
        "TestPlasticity_axis",
        "TestPlasticity_pstrain",
        "TestPlasticity_pstress",
        "TestPlasticity_3D",
    ] {
        assert!(source.contains(ep), "missing {}", ep);
    }

    let manifest = fs::read_to_string(out.join("targets.json")).unwrap();
    assert!(manifest.contains("AnsysBehaviour"));
    assert!(manifest.contains("TestPlasticity_3D"));
}

#[test]
fn test_generate_several_interfaces_merges_manifest() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "");

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["-i", "castem", "-i", "generic", "-o", "out"])
        .current_dir(tmp.path())
        .assert()
        .success();

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["-i", "aster", "-o", "out"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("out/targets.json")).unwrap();
    assert!(manifest.contains("UmatBehaviour"));
    assert!(manifest.contains("AsterBehaviour"));
}

#[test]
fn test_generate_behaviour_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("behaviours");
    fs::create_dir_all(&dir).unwrap();
    write_behaviour(&dir, "");
    fs::write(
        dir.join("Elasticity.toml"),
        TEST_PLASTICITY.replace("TestPlasticity", "Elasticity"),
    )
    .unwrap();

    mfront_interfaces()
        .args(["generate", "--behaviour", "behaviours", "-i", "comsol", "-o", "out"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished `Elasticity`"))
        .stderr(predicate::str::contains("Finished `TestPlasticity`"));

    let manifest = fs::read_to_string(tmp.path().join("out/targets.json")).unwrap();
    assert!(manifest.contains("Elasticity"));
    assert!(manifest.contains("TestPlasticity"));
}

#[test]
fn test_generate_rejects_incompatible_strategy() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "\n[attributes]\nstrainMeasure = \"GreenLagrange\"\n");
    let keywords = tmp.path().join("keywords.mfront");
    fs::write(&keywords, "@AnsysFiniteStrainStrategy \"Native\";\n").unwrap();

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["--interface", "Ansys", "--output-dir", "out", "--keywords"])
        .arg(&keywords)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("GreenLagrange"));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_generate_reports_keyword_syntax_errors() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "");
    let keywords = tmp.path().join("keywords.mfront");
    fs::write(&keywords, "@AnsysGenerateMTestFileOnFailure true\n").unwrap();

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["--interface", "ansys", "--output-dir", "out", "--keywords"])
        .arg(&keywords)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing `;`"));
}

#[test]
fn test_generate_warns_about_unused_keywords() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "");
    let keywords = tmp.path().join("keywords.mfront");
    fs::write(
        &keywords,
        "@CastemGenerateMTestFileOnFailure true;\n@Typo 1;\n",
    )
    .unwrap();

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["--interface", "ansys", "--output-dir", "out", "--keywords"])
        .arg(&keywords)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: keyword `@Typo` is not used"))
        .stderr(predicate::str::contains("@CastemGenerateMTestFileOnFailure").not());
}

#[test]
fn test_generate_without_shared_hypothesis() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("TestPlasticity.toml");
    fs::write(
        &path,
        TEST_PLASTICITY.replace("hypotheses = []", "hypotheses = [\"PlaneStress\"]"),
    )
    .unwrap();

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&path)
        .args(["--interface", "cyrano", "--output-dir", "out"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cyrano"));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_generate_unknown_interface() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "");

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["--interface", "zebulon"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown interface `zebulon`"));
}

#[test]
fn test_generate_uses_project_config() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "");
    fs::create_dir_all(tmp.path().join(".mfront")).unwrap();
    fs::write(
        tmp.path().join(".mfront/config.toml"),
        "[generation]\noutput_dir = \"generated\"\nmanifest_format = \"toml\"\n",
    )
    .unwrap();

    mfront_interfaces()
        .args(["generate", "--behaviour"])
        .arg(&behaviour)
        .args(["--interface", "generic"])
        .current_dir(tmp.path())
        .env_remove("MFRONT_INTERFACES_OUTPUT_DIR")
        .assert()
        .success();

    assert!(tmp.path().join("generated/targets.toml").exists());
}

// ============================================================================
// mfront-interfaces list / hypotheses / completions
// ============================================================================

#[test]
fn test_list_interfaces() {
    mfront_interfaces()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Abaqus"))
        .stdout(predicate::str::contains("LSDYNA"))
        .stdout(predicate::str::contains("DianaFEA"));
}

#[test]
fn test_list_long_shows_keywords() {
    mfront_interfaces()
        .args(["list", "--long"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@AbaqusOrthotropyManagementPolicy"));
}

#[test]
fn test_hypotheses() {
    let tmp = TempDir::new().unwrap();
    let behaviour = write_behaviour(tmp.path(), "");

    mfront_interfaces()
        .args(["hypotheses", "--behaviour"])
        .arg(&behaviour)
        .args(["--interface", "cyrano"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AxisymmetricalGeneralisedPlaneStrain"))
        .stdout(predicate::str::contains("Tridimensional").not());
}

#[test]
fn test_completions() {
    mfront_interfaces()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mfront-interfaces"));
}
