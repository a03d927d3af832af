use std::env;
use std::fs;
use std::process;

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2};
use ndarray_npy::read_npy;

use crate::drivers::natural_orbitals::{CinoDriver, CinoParams, CoefficientsFormat};
use crate::drivers::CinoasDriver;
use crate::interfaces::binaries::{read_matrix_with_ncols, ByteOrder, MatrixOrder};
use crate::io::{read_cinoas_binary, CinoasFileType};
use crate::symmetry::PointGroup;
use crate::target::natural_orbitals::NaturalOrbitals;
use crate::target::reference::CisReference;

fn cs_reference() -> CisReference {
    CisReference::builder()
        .point_group(PointGroup::Cs)
        .doccpi(vec![2, 1])
        .density_blocks(vec![
            array![
                [0.99, 0.01, 0.02],
                [0.01, 0.97, 0.00],
                [0.02, 0.00, 0.02],
            ],
            array![[0.96, 0.03], [0.03, 0.04]],
        ])
        .coefficient_blocks(vec![
            array![
                [0.8, 0.1, 0.2],
                [0.1, 0.9, 0.3],
                [0.3, 0.2, 0.7],
                [0.1, 0.3, 0.4],
            ],
            array![[0.7, 0.2], [0.2, 0.9]],
        ])
        .build()
        .unwrap()
}

#[test]
fn test_drivers_natural_orbitals_result_before_run() {
    let params = CinoParams::default();
    let reference = cs_reference();
    let driver = CinoDriver::builder()
        .parameters(&params)
        .reference(&reference)
        .build()
        .unwrap();
    assert!(driver.result().is_err());
}

#[test]
fn test_drivers_natural_orbitals_binaries_export() {
    let dir = env::temp_dir().join(format!("cinoas-cino-driver-bin-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    let params = CinoParams::builder()
        .result_save_name(Some(dir.join("cs")))
        .coefficients_save_name(Some(dir.join("cs_cino")))
        .coefficients_format(CoefficientsFormat::Binaries {
            matrix_order: MatrixOrder::ColMajor,
            byte_order: ByteOrder::BigEndian,
        })
        .build()
        .unwrap();
    let reference = cs_reference();
    let mut driver = CinoDriver::builder()
        .parameters(&params)
        .reference(&reference)
        .build()
        .unwrap();
    driver.run().unwrap();
    let nos = driver.result().unwrap();
    assert_abs_diff_eq!(
        nos.n_electrons_alpha(),
        reference.density_trace(),
        epsilon = 1e-12
    );

    let saved: NaturalOrbitals = read_cinoas_binary(dir.join("cs"), CinoasFileType::Cino).unwrap();
    assert_eq!(saved.doccpi(), nos.doccpi());
    assert_eq!(saved.coefficients(), nos.coefficients());

    let c0 = read_matrix_with_ncols(
        dir.join("cs_cino.irrep0.bin"),
        3,
        MatrixOrder::ColMajor,
        ByteOrder::BigEndian,
    )
    .unwrap();
    assert_eq!(c0, nos.coefficients()[0]);
    let c1 = read_matrix_with_ncols(
        dir.join("cs_cino.irrep1.bin"),
        2,
        MatrixOrder::ColMajor,
        ByteOrder::BigEndian,
    )
    .unwrap();
    assert_eq!(c1, nos.coefficients()[1]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_drivers_natural_orbitals_npy_export() {
    let dir = env::temp_dir().join(format!("cinoas-cino-driver-npy-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    let params = CinoParams::builder()
        .write_occupations(false)
        .coefficients_save_name(Some(dir.join("cs_cino")))
        .coefficients_format(CoefficientsFormat::Npy)
        .build()
        .unwrap();
    let reference = cs_reference();
    let mut driver = CinoDriver::builder()
        .parameters(&params)
        .reference(&reference)
        .build()
        .unwrap();
    driver.run().unwrap();
    let nos = driver.result().unwrap();

    let c1: Array2<f64> = read_npy(dir.join("cs_cino.irrep1.npy")).unwrap();
    assert_eq!(c1, nos.coefficients()[1]);
    assert!(!dir.join("cs.cinoas.cino").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_drivers_natural_orbitals_params_yaml() {
    let params: CinoParams = serde_yaml::from_str("result_save_name: out/h2o\n").unwrap();
    assert!(params.write_occupations);
    assert_eq!(params.coefficients_format, CoefficientsFormat::default());
    assert!(params.to_string().contains("out/h2o.cinoas.cino"));

    let params: CinoParams = serde_yaml::from_str("result_save_name: run.sa\n").unwrap();
    assert!(params.to_string().contains("run.cinoas.cino"));
    assert!(!params.to_string().contains("run.sa.cinoas.cino"));

    let params: CinoParams =
        serde_yaml::from_str("coefficients_save_name: c\ncoefficients_format: Npy\n").unwrap();
    assert!(params.to_string().contains("c.irrep*.npy"));
}
