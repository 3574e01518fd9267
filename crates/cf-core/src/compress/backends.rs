//! Built-in compression backends.
//!
//! Each backend wraps its codec at the strongest compression setting, since
//! shorter codewords mean sharper probability estimates. Encoded bytes go
//! into the pool's scratch buffer and only the length survives.

use std::io::Write;

use cf_common::{Error, Result, Symbol};

use super::{bytes_to_bits, probability_to_code_length, Compressor};
use crate::automaton::SensingDfa;

/// Zstandard at its maximum level, reusing one compression context.
pub struct ZstdCompressor {
    context: zstd::bulk::Compressor<'static>,
}

impl ZstdCompressor {
    pub fn new() -> Result<Self> {
        let level = *zstd::compression_level_range().end();
        let context = zstd::bulk::Compressor::new(level)
            .map_err(|err| Error::Compressors(format!("cannot init zstd compressor: {err}")))?;
        Ok(Self { context })
    }
}

impl Compressor for ZstdCompressor {
    fn compress(&mut self, data: &[Symbol], output_buffer: &mut Vec<u8>) -> Result<u64> {
        let bound = zstd::zstd_safe::compress_bound(data.len());
        if output_buffer.len() < bound {
            output_buffer.resize(bound, 0);
        }
        let written = self
            .context
            .compress_to_buffer(data, &mut output_buffer[..])
            .map_err(|err| Error::Compressors(format!("zstd: {err}")))?;
        Ok(bytes_to_bits(written))
    }
}

/// zlib (deflate with a zlib header) at best compression.
#[derive(Default)]
pub struct ZlibCompressor;

impl ZlibCompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&mut self, data: &[Symbol], output_buffer: &mut Vec<u8>) -> Result<u64> {
        output_buffer.clear();
        let mut encoder =
            flate2::write::ZlibEncoder::new(&mut *output_buffer, flate2::Compression::best());
        encoder
            .write_all(data)
            .map_err(|err| Error::Compressors(format!("zlib: {err}")))?;
        encoder
            .finish()
            .map_err(|err| Error::Compressors(format!("zlib: {err}")))?;
        Ok(bytes_to_bits(output_buffer.len()))
    }
}

/// bzip2 with the largest block size.
#[derive(Default)]
pub struct Bzip2Compressor;

impl Bzip2Compressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for Bzip2Compressor {
    fn compress(&mut self, data: &[Symbol], output_buffer: &mut Vec<u8>) -> Result<u64> {
        output_buffer.clear();
        let mut encoder =
            bzip2::write::BzEncoder::new(&mut *output_buffer, bzip2::Compression::best());
        encoder
            .write_all(data)
            .map_err(|err| Error::Compressors(format!("bzip2: {err}")))?;
        encoder
            .finish()
            .map_err(|err| Error::Compressors(format!("bzip2: {err}")))?;
        Ok(bytes_to_bits(output_buffer.len()))
    }
}

/// The multi-head sensing automaton exposed as a compressor: the code
/// length is the rounded negated logarithm of the probability it assigns
/// to the whole sequence.
pub struct AutomatonCompressor {
    automaton: SensingDfa,
}

impl Default for AutomatonCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomatonCompressor {
    pub fn new() -> Self {
        Self {
            automaton: SensingDfa::new(0, Symbol::MAX),
        }
    }
}

impl Compressor for AutomatonCompressor {
    fn compress(&mut self, data: &[Symbol], _output_buffer: &mut Vec<u8>) -> Result<u64> {
        let probability = self.automaton.eval_probability(data);
        Ok(probability_to_code_length(&probability))
    }

    fn set_alphabet(&mut self, min: Symbol, max: Symbol) {
        self.automaton.set_min_symbol(min);
        self.automaton.set_max_symbol(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_empty_input_still_produces_a_header() {
        let mut backend = ZlibCompressor::new();
        let mut buffer = Vec::new();
        let bits = backend.compress(&[], &mut buffer).unwrap();
        assert!(bits > 0);
    }

    #[test]
    fn test_redundant_input_compresses_better_than_noise() {
        let constant = vec![0u8; 512];
        let noisy: Vec<u8> = (0..512u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();
        let mut buffer = Vec::new();

        let mut zstd_backend = ZstdCompressor::new().unwrap();
        assert!(
            zstd_backend.compress(&constant, &mut buffer).unwrap()
                < zstd_backend.compress(&noisy, &mut buffer).unwrap()
        );

        let mut zlib_backend = ZlibCompressor::new();
        assert!(
            zlib_backend.compress(&constant, &mut buffer).unwrap()
                < zlib_backend.compress(&noisy, &mut buffer).unwrap()
        );

        let mut bzip2_backend = Bzip2Compressor::new();
        assert!(
            bzip2_backend.compress(&constant, &mut buffer).unwrap()
                < bzip2_backend.compress(&noisy, &mut buffer).unwrap()
        );
    }

    #[test]
    fn test_automaton_backend_empty_input_costs_nothing() {
        let mut backend = AutomatonCompressor::new();
        let mut buffer = Vec::new();
        assert_eq!(backend.compress(&[], &mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_automaton_backend_uses_alphabet_bounds() {
        let mut backend = AutomatonCompressor::new();
        let mut buffer = Vec::new();
        let data = vec![0u8, 1, 0, 1, 0, 1, 0, 1];

        let wide = backend.compress(&data, &mut buffer).unwrap();
        backend.set_alphabet(0, 1);
        let narrow = backend.compress(&data, &mut buffer).unwrap();
        // A binary alphabet concentrates the probability mass.
        assert!(narrow < wide);
    }
}
