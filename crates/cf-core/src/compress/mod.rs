//! Compressor port and the named compressor pool.
//!
//! A [`Compressor`] reports the bit length of a lossless encoding of its
//! input; the pipeline never looks at the encoded bytes. The pool owns the
//! registered backends together with one scratch output buffer that is
//! reused across calls and only ever grows.

pub mod adaptor;
pub mod backends;

use std::collections::HashMap;

use cf_common::{Error, Result, Symbol};
use cf_math::WideF64;
use tracing::debug;

use crate::continuation::Continuation;

pub(crate) fn bytes_to_bits(bytes: usize) -> u64 {
    bytes as u64 * 8
}

/// Rounded code length of a sequence with the given probability, clamped to
/// the representable maximum.
pub(crate) fn probability_to_code_length(probability: &WideF64) -> u64 {
    let bits = (-probability.log2()).ceil();
    if !bits.is_finite() || bits >= u64::MAX as f64 {
        u64::MAX
    } else if bits <= 0.0 {
        0
    } else {
        bits as u64
    }
}

/// The capability the forecasting pipeline needs from a compression backend.
pub trait Compressor {
    /// Bit length of a lossless encoding of `data`. Backends that produce
    /// bytes write them into `output_buffer` (which is grown, never shrunk)
    /// and report `8 *` the byte count.
    fn compress(&mut self, data: &[Symbol], output_buffer: &mut Vec<u8>) -> Result<u64>;

    /// Bit lengths of `history ⧺ ending` for every ending. The default
    /// implementation compresses each concatenation independently; backends
    /// with reusable state may do better but must return the same lengths.
    fn compress_continuations(
        &mut self,
        history: &[Symbol],
        endings: &[Continuation],
    ) -> Result<Vec<u64>> {
        if endings.is_empty() {
            return Ok(Vec::new());
        }
        let mut input = Vec::with_capacity(history.len() + endings[0].len());
        input.extend_from_slice(history);
        let mut output = Vec::new();
        let mut lengths = Vec::with_capacity(endings.len());
        for ending in endings {
            input.truncate(history.len());
            input.extend_from_slice(ending.digits());
            lengths.push(self.compress(&input, &mut output)?);
        }
        Ok(lengths)
    }

    /// Advisory alphabet bounds of the upcoming data. Codec-style backends
    /// ignore this; the automaton and adaptor-wrapped predictors need it.
    fn set_alphabet(&mut self, _min: Symbol, _max: Symbol) {}
}

/// Named registry of compressors sharing one scratch output buffer.
pub struct CompressorPool {
    compressors: HashMap<String, Box<dyn Compressor>>,
    output_buffer: Vec<u8>,
}

impl Default for CompressorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressorPool {
    pub fn new() -> Self {
        Self {
            compressors: HashMap::new(),
            output_buffer: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, compressor: Box<dyn Compressor>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::Compressors(
                "cannot register a compressor under an empty name".into(),
            ));
        }
        if self.compressors.contains_key(name) {
            return Err(Error::Compressors(format!(
                "compressor {name} is already registered"
            )));
        }
        debug!(name, "registering compressor");
        self.compressors.insert(name.to_owned(), compressor);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.compressors.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.compressors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Broadcasts the alphabet bounds to every registered compressor.
    pub fn set_alphabet(&mut self, min: Symbol, max: Symbol) {
        for compressor in self.compressors.values_mut() {
            compressor.set_alphabet(min, max);
        }
    }

    pub fn compress(&mut self, name: &str, data: &[Symbol]) -> Result<u64> {
        let compressor = self
            .compressors
            .get_mut(name)
            .ok_or_else(|| Error::Compressors(format!("unknown compressor name {name}")))?;
        compressor.compress(data, &mut self.output_buffer)
    }

    pub fn compress_continuations(
        &mut self,
        name: &str,
        history: &[Symbol],
        endings: &[Continuation],
    ) -> Result<Vec<u64>> {
        let compressor = self
            .compressors
            .get_mut(name)
            .ok_or_else(|| Error::Compressors(format!("unknown compressor name {name}")))?;
        compressor.compress_continuations(history, endings)
    }
}

/// The pool with the built-in backends under their canonical names.
///
/// `zstd`, `bzip2` and `zlib` wrap their ecosystem codecs at maximum
/// compression; `automation` is the multi-head sensing automaton. Further
/// backends (`lcacomp`, `rp`, `ppmd`, `zpaq`, ...) are external and join via
/// [`CompressorPool::register`].
pub fn standard_pool() -> Result<CompressorPool> {
    let mut pool = CompressorPool::new();
    pool.register("zstd", Box::new(backends::ZstdCompressor::new()?))?;
    pool.register("bzip2", Box::new(backends::Bzip2Compressor::new()))?;
    pool.register("zlib", Box::new(backends::ZlibCompressor::new()))?;
    pool.register("automation", Box::new(backends::AutomatonCompressor::new()))?;
    Ok(pool)
}
