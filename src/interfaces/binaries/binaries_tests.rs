use std::env;
use std::fs::{self, File};
use std::path::PathBuf;
use std::process;

use ndarray::{array, Array2};

use crate::interfaces::binaries::{
    read_matrix_with_ncols, read_square_matrix, write_matrix, BinariesCisSource, ByteOrder,
    MatrixOrder,
};
use crate::interfaces::input::CisReferenceSourceHandle;
use crate::symmetry::PointGroup;

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("cinoas-binaries-{tag}-{}", process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_interfaces_binaries_matrix_orders() {
    let dir = scratch_dir("orders");
    let mat = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

    for (matrix_order, byte_order) in [
        (MatrixOrder::RowMajor, ByteOrder::LittleEndian),
        (MatrixOrder::ColMajor, ByteOrder::LittleEndian),
        (MatrixOrder::RowMajor, ByteOrder::BigEndian),
        (MatrixOrder::ColMajor, ByteOrder::BigEndian),
    ] {
        let path = dir.join(format!("{matrix_order:?}-{byte_order:?}.bin"));
        assert_eq!(write_matrix(&path, &mat, matrix_order, byte_order).unwrap(), 6);
        assert_eq!(fs::metadata(&path).unwrap().len(), 48);
        let read = read_matrix_with_ncols(&path, 3, matrix_order, byte_order).unwrap();
        assert_eq!(read, mat);
    }

    // Column-major data read as row-major comes out transposed and reshaped.
    let path = dir.join("ColMajor-LittleEndian.bin");
    let misread =
        read_matrix_with_ncols(&path, 3, MatrixOrder::RowMajor, ByteOrder::LittleEndian).unwrap();
    assert_eq!(misread, array![[1.0, 4.0, 2.0], [5.0, 3.0, 6.0]]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_interfaces_binaries_shape_errors() {
    let dir = scratch_dir("shapes");
    let path = dir.join("three.bin");
    write_matrix(
        &path,
        &array![[1.0, 2.0, 3.0]],
        MatrixOrder::RowMajor,
        ByteOrder::LittleEndian,
    )
    .unwrap();
    assert!(read_square_matrix(&path, MatrixOrder::RowMajor, ByteOrder::LittleEndian).is_err());
    assert!(
        read_matrix_with_ncols(&path, 2, MatrixOrder::RowMajor, ByteOrder::LittleEndian).is_err()
    );
    assert!(
        read_matrix_with_ncols(&path, 0, MatrixOrder::RowMajor, ByteOrder::LittleEndian).is_err()
    );

    let empty = dir.join("empty.bin");
    File::create(&empty).unwrap();
    assert_eq!(
        read_square_matrix(&empty, MatrixOrder::RowMajor, ByteOrder::LittleEndian)
            .unwrap()
            .dim(),
        (0, 0)
    );
    assert_eq!(
        read_matrix_with_ncols(&empty, 0, MatrixOrder::RowMajor, ByteOrder::LittleEndian)
            .unwrap()
            .dim(),
        (0, 0)
    );

    assert!(read_square_matrix(
        dir.join("missing.bin"),
        MatrixOrder::RowMajor,
        ByteOrder::LittleEndian
    )
    .is_err());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_interfaces_binaries_cis_source() {
    let dir = scratch_dir("source");
    let densities = vec![
        array![[0.99, 0.01, 0.0], [0.01, 0.98, 0.0], [0.0, 0.0, 0.03]],
        Array2::zeros((0, 0)),
    ];
    let coefficients = vec![
        array![
            [0.7, 0.1, 0.2],
            [0.2, 0.8, 0.1],
            [0.1, 0.3, 0.9],
            [0.0, 0.2, 0.4]
        ],
        Array2::zeros((0, 0)),
    ];
    let density_paths = (0..2)
        .map(|h| dir.join(format!("den.irrep{h}.bin")))
        .collect::<Vec<_>>();
    let coefficient_paths = (0..2)
        .map(|h| dir.join(format!("coef.irrep{h}.bin")))
        .collect::<Vec<_>>();
    for h in 0..2 {
        write_matrix(
            &density_paths[h],
            &densities[h],
            MatrixOrder::ColMajor,
            ByteOrder::BigEndian,
        )
        .unwrap();
        write_matrix(
            &coefficient_paths[h],
            &coefficients[h],
            MatrixOrder::ColMajor,
            ByteOrder::BigEndian,
        )
        .unwrap();
    }

    let source = BinariesCisSource::builder()
        .point_group(PointGroup::Cs)
        .doccpi(vec![2, 0])
        .densities(density_paths.clone())
        .coefficients(coefficient_paths.clone())
        .matrix_order(MatrixOrder::ColMajor)
        .byte_order(ByteOrder::BigEndian)
        .build()
        .unwrap();
    let reference = source.cis_reference().unwrap();
    assert_eq!(reference.nmopi(), vec![3, 0]);
    assert_eq!(reference.nsopi(), vec![4, 0]);
    assert_eq!(reference.density_blocks()[0], densities[0]);
    assert_eq!(reference.coefficient_blocks()[0], coefficients[0]);

    let wrong_irreps = BinariesCisSource::builder()
        .point_group(PointGroup::C2v)
        .doccpi(vec![2, 0, 0, 0])
        .densities(density_paths.clone())
        .coefficients(coefficient_paths.clone())
        .build()
        .unwrap();
    assert!(wrong_irreps.cis_reference().is_err());

    let too_many_docc = BinariesCisSource::builder()
        .point_group(PointGroup::Cs)
        .doccpi(vec![4, 0])
        .densities(density_paths)
        .coefficients(coefficient_paths)
        .matrix_order(MatrixOrder::ColMajor)
        .byte_order(ByteOrder::BigEndian)
        .build()
        .unwrap();
    assert!(too_many_docc.cis_reference().is_err());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_interfaces_binaries_trailing_bytes() {
    use std::io::Write;

    let dir = scratch_dir("trailing");
    let path = dir.join("nine.bin");
    write_matrix(
        &path,
        &Array2::<f64>::eye(3),
        MatrixOrder::RowMajor,
        ByteOrder::LittleEndian,
    )
    .unwrap();
    assert!(read_square_matrix(&path, MatrixOrder::RowMajor, ByteOrder::LittleEndian).is_ok());

    fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap()
        .write_all(&[0u8; 3])
        .unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 75);
    let err = read_square_matrix(&path, MatrixOrder::RowMajor, ByteOrder::LittleEndian)
        .unwrap_err()
        .to_string();
    assert!(err.contains("75 byte(s)"));

    fs::remove_dir_all(&dir).unwrap();
}
