use std::env;
use std::fs;
use std::process;

use ndarray::{array, Array1};

use crate::interfaces::psi4::{Psi4ActiveSpaceOptions, Psi4CisInput, Psi4CisJob};
use crate::interfaces::InputHandle;
use crate::symmetry::PointGroup;
use crate::target::active_space::{ActiveSpace, SelectionCriterion};

const ETHENE: &str = "\
0 1
C   0.000000   0.000000   0.668188
C   0.000000   0.000000  -0.668188
H   0.000000   0.923274   1.238289
H   0.000000  -0.923274   1.238289
H   0.000000   0.923274  -1.238289
H   0.000000  -0.923274  -1.238289
symmetry d2h
";

#[test]
fn test_interfaces_psi4_cis_input() {
    let input = Psi4CisInput::builder()
        .geometry(ETHENE)
        .num_roots(4)
        .avg_states(vec![0, 1, 2, 3])
        .build()
        .unwrap();
    assert_eq!(input.basis, "cc-pVDZ");
    assert_eq!(input.e_convergence, 10);

    let rendered = input.to_string();
    assert!(rendered.starts_with("molecule {\n0 1\n"));
    assert!(rendered.contains("symmetry d2h\n}\n"));
    assert!(rendered.contains("    basis                   cc-pVDZ\n"));
    assert!(rendered.contains("    ex_level                1"));
    assert!(rendered.contains("    opdm                    true"));
    assert!(rendered.contains("    num_roots               4\n"));
    assert!(rendered.contains("    avg_states              [0, 1, 2, 3]\n"));
    assert!(rendered.contains("psi4.energy(\"detci\", return_wfn=True)"));
    assert!(!rendered.contains("np.save"));

    let input = Psi4CisInput::builder()
        .geometry(ETHENE)
        .basis("6-31G*")
        .num_roots(3)
        .avg_states(vec![1, 2])
        .e_convergence(8)
        .npy_export_stem("ethene")
        .build()
        .unwrap();
    let rendered = input.to_string();
    assert!(rendered.contains("    basis                   6-31G*\n"));
    assert!(rendered.contains("    e_convergence           8\n"));
    assert!(rendered.contains("np.save(f\"ethene.density.irrep{h}.npy\", da.nph[h])"));
    assert!(rendered.contains("np.save(f\"ethene.coefficients.irrep{h}.npy\", ca.nph[h])"));
}

#[test]
fn test_interfaces_psi4_cis_input_validation() {
    assert!(Psi4CisInput::builder()
        .geometry(ETHENE)
        .num_roots(2)
        .avg_states(vec![0, 2])
        .build()
        .is_err());
    assert!(Psi4CisInput::builder()
        .geometry(ETHENE)
        .num_roots(2)
        .avg_states(vec![])
        .build()
        .is_err());
    assert!(Psi4CisInput::builder()
        .geometry(ETHENE)
        .avg_states(vec![0])
        .build()
        .is_err());
}

#[test]
fn test_interfaces_psi4_cis_input_write() {
    let input = Psi4CisInput::builder()
        .geometry(ETHENE)
        .num_roots(2)
        .avg_states(vec![0, 1])
        .build()
        .unwrap();
    let path = env::temp_dir().join(format!("cinoas-psi4-input-{}.dat", process::id()));
    input.write(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), input.to_string());
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_interfaces_psi4_active_space_options() {
    let act = ActiveSpace::select(
        PointGroup::C2v,
        &[array![0.999, 0.97], Array1::zeros(0), array![0.95], array![0.999]],
        &[array![0.02, 0.001], array![0.04], array![0.0], array![0.002]],
        Some(&SelectionCriterion::Count(2)),
        Some(&SelectionCriterion::Count(2)),
    )
    .unwrap();
    let options = Psi4ActiveSpaceOptions::from(&act);
    assert_eq!(options.restricted_docc, vec![1, 0, 0, 1]);
    assert_eq!(options.active, vec![2, 1, 1, 0]);
    assert_eq!(options.restricted_uocc, vec![1, 0, 1, 1]);
    assert_eq!(options.n_active_electrons, 4);

    let rendered = options.to_string();
    assert_eq!(
        rendered,
        "# CAS(4e, 4o)\n\
         set {\n    \
         restricted_docc         [1, 0, 0, 1]\n    \
         active                  [2, 1, 1, 0]\n    \
         restricted_uocc         [1, 0, 1, 1]\n\
         }\n"
    );
}

#[test]
fn test_interfaces_psi4_cis_job_yaml() {
    let dir = env::temp_dir().join(format!("cinoas-psi4-job-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    let input_file = dir.join("sacis.dat");

    let yaml = format!(
        "\
input:
  geometry: |
    0 1
    H 0.0 0.0 0.0
    H 0.0 0.0 0.74
  num_roots: 3
  avg_states: [0, 1, 2]
  npy_export_stem: h2
input_file: {}
",
        input_file.display()
    );
    let job: Psi4CisJob = serde_yaml::from_str(&yaml).unwrap();
    assert!(!job.execute);
    assert_eq!(job.input.basis, "cc-pVDZ");
    assert_eq!(job.input.e_convergence, 10);
    job.handle().unwrap();
    let written = fs::read_to_string(&input_file).unwrap();
    assert_eq!(written, job.input.to_string());
    assert!(written.contains("H 0.0 0.0 0.74"));

    // Deserialisation bypasses the builder, so the job checks the roots itself.
    let mut bad = job.clone();
    bad.input.avg_states = vec![0, 3];
    bad.input_file = dir.join("bad.dat");
    assert!(bad.handle().is_err());
    assert!(!dir.join("bad.dat").exists());
    bad.input.num_roots = 0;
    assert!(bad.input.validate().is_err());

    fs::remove_dir_all(&dir).unwrap();
}
