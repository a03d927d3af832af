//! Numeric readers and writers for raw binary files.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use anyhow;
use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

#[cfg(test)]
#[path = "numeric_tests.rs"]
mod numeric_tests;

/// Iterable structure for reading numeric binary files.
pub struct NumericReader<R: BufRead, B: ByteOrder, T> {
    /// The inner file reader.
    inner: R,

    /// The byte order of the numeric values to be read.
    byte_order: PhantomData<B>,

    /// The type of the numeric values to be read.
    numeric_type: PhantomData<T>,
}

impl<R: BufRead, B: ByteOrder, T> NumericReader<R, B, T> {
    /// Constructs a new numeric binary reader wrapping around a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `inner` - The underlying reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            byte_order: PhantomData,
            numeric_type: PhantomData,
        }
    }
}

impl<B: ByteOrder, T> NumericReader<BufReader<File>, B, T> {
    /// Constructs a new numeric binary reader wrapping around a buffered file reader from a
    /// filename.
    ///
    /// # Arguments
    ///
    /// * `filename` - The path to the file to be read.
    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Self, anyhow::Error> {
        let f = File::open(&filename)?;
        Ok(Self::new(BufReader::new(f)))
    }
}

macro_rules! impl_iterator_numeric_reader {
    ($($t:ty => $read:ident),+) => {$(
        impl<R: BufRead, B: ByteOrder> Iterator for NumericReader<R, B, $t> {
            type Item = $t;

            fn next(&mut self) -> Option<Self::Item> {
                self.inner.$read::<B>().ok()
            }
        }
    )+}
}

impl_iterator_numeric_reader!(
    f32 => read_f32,
    f64 => read_f64,
    i32 => read_i32,
    i64 => read_i64,
    u32 => read_u32,
    u64 => read_u64
);

/// Structure for writing numeric values into raw binary files.
pub struct NumericWriter<W: Write, B: ByteOrder> {
    /// The inner writer.
    inner: W,

    /// The byte order of the numeric values to be written.
    byte_order: PhantomData<B>,
}

impl<W: Write, B: ByteOrder> NumericWriter<W, B> {
    /// Constructs a new numeric binary writer wrapping around a writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            byte_order: PhantomData,
        }
    }

    /// Writes a sequence of `f64` values and flushes the underlying writer.
    ///
    /// # Arguments
    ///
    /// * `values` - The values to be written, in the order they are to appear in the file.
    ///
    /// # Returns
    ///
    /// The number of values written.
    pub fn write_f64s<I>(&mut self, values: I) -> Result<usize, anyhow::Error>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0;
        for value in values {
            self.inner.write_f64::<B>(value)?;
            count += 1;
        }
        self.inner.flush()?;
        Ok(count)
    }
}

impl<B: ByteOrder> NumericWriter<BufWriter<File>, B> {
    /// Constructs a new numeric binary writer creating (or truncating) the named file.
    ///
    /// # Arguments
    ///
    /// * `filename` - The path to the file to be written.
    pub fn to_file<P: AsRef<Path>>(filename: P) -> Result<Self, anyhow::Error> {
        let f = File::create(&filename)?;
        Ok(Self::new(BufWriter::new(f)))
    }
}
