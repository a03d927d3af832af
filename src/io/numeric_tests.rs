use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian};
use ndarray::{array, Array2};

use crate::io::numeric::{NumericReader, NumericWriter};

#[test]
fn test_io_numeric_reader_f64_le() {
    let bytes = (0..9)
        .flat_map(|i| f64::from(i).to_le_bytes())
        .collect::<Vec<u8>>();
    let v = NumericReader::<_, LittleEndian, f64>::new(Cursor::new(bytes)).collect::<Vec<_>>();
    let a = Array2::from_shape_vec((3, 3), v).unwrap();
    let a_ref = array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]];
    assert_eq!(a, a_ref);
}

#[test]
fn test_io_numeric_reader_i64_be() {
    let bytes = (0..15_i64)
        .flat_map(|i| i.to_be_bytes())
        .collect::<Vec<u8>>();
    let v = NumericReader::<_, BigEndian, i64>::new(Cursor::new(bytes)).collect::<Vec<_>>();
    assert_eq!(v, (0..15).collect::<Vec<i64>>());
}

#[test]
fn test_io_numeric_reader_ignores_trailing_partial_value() {
    let mut bytes = 1.5_f64.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0_u8, 1, 2]);
    let v = NumericReader::<_, LittleEndian, f64>::new(Cursor::new(bytes)).collect::<Vec<_>>();
    assert_eq!(v, vec![1.5]);
}

#[test]
fn test_io_numeric_writer_byte_order() {
    let mut buffer = Vec::<u8>::new();
    let n = NumericWriter::<_, BigEndian>::new(&mut buffer)
        .write_f64s([0.25, -3.0])
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(&buffer[..8], &0.25_f64.to_be_bytes());
    assert_eq!(&buffer[8..], &(-3.0_f64).to_be_bytes());

    let v = NumericReader::<_, BigEndian, f64>::new(Cursor::new(buffer.clone()))
        .collect::<Vec<_>>();
    assert_eq!(v, vec![0.25, -3.0]);
    let v_wrong = NumericReader::<_, LittleEndian, f64>::new(Cursor::new(buffer))
        .collect::<Vec<_>>();
    assert_ne!(v_wrong, vec![0.25, -3.0]);
}
