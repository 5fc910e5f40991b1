//! Test fixture generation helpers.

use arbitrary::{Arbitrary, Unstructured};
use rand::{rngs::OsRng, RngCore};

/// Default buffer size backing the generator.
const ARB_GEN_LEN: usize = 1 << 14;

/// Generates `Arbitrary` values from a random persistent buffer.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    /// Creates a new generator with the default buffer size.
    pub fn new() -> Self {
        Self::new_with_size(ARB_GEN_LEN)
    }

    /// Creates a new generator with a specified buffer size.
    pub fn new_with_size(s: usize) -> Self {
        let mut buf = vec![0u8; s];
        OsRng.fill_bytes(&mut buf);
        Self { buf }
    }

    /// Generates an arbitrary instance of `T`, refilling the buffer with
    /// fresh randomness each call.
    pub fn generate<T>(&mut self) -> T
    where
        T: for<'a> Arbitrary<'a>,
    {
        OsRng.fill_bytes(&mut self.buf);
        let mut u = Unstructured::new(&self.buf);
        T::arbitrary(&mut u).expect("arbitrary generation failed")
    }
}
