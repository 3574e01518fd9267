//! Adaptor turning a per-symbol stream predictor into a compressor.
//!
//! The wrapped predictor sees the history prefix and answers with a guessed
//! next symbol and a confidence flag. The adaptor scores each observed
//! symbol with the Krichevsky mixture: during a run of confident guesses a
//! local counter tracks the run, otherwise the global letter frequencies
//! built from past symbols are used. The accumulated probability's negated
//! logarithm is the reported code length.

use cf_common::{Result, Symbol};
use cf_math::{krichevsky, WideF64};

use super::{probability_to_code_length, Compressor};
use crate::continuation::Continuation;

/// How sure the predictor is about its guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confidence {
    Confident,
    NotConfident,
}

/// A per-symbol predictor: anything that can guess the next symbol of a
/// sequence from its prefix.
pub trait StreamPredictor {
    /// Guess for the symbol following `prefix`.
    fn give_next_prediction(&mut self, prefix: &[Symbol]) -> (Symbol, Confidence);

    /// Advisory alphabet bounds of the upcoming data.
    fn set_alphabet(&mut self, _min: Symbol, _max: Symbol) {}
}

/// Krichevsky accumulator over one evaluation. Snapshotting this after the
/// history lets each continuation extend incrementally instead of rescoring
/// the history.
#[derive(Clone)]
struct EvaluationState {
    position: usize,
    confident_run_length: usize,
    probability: WideF64,
    letters_freq: Vec<usize>,
    confident_guess_freq: Vec<usize>,
}

impl EvaluationState {
    fn new() -> Self {
        Self {
            position: 0,
            confident_run_length: 0,
            probability: WideF64::ONE,
            letters_freq: vec![0; Symbol::MAX as usize + 1],
            confident_guess_freq: vec![0; Symbol::MAX as usize + 1],
        }
    }
}

/// Wraps a [`StreamPredictor`] into the [`Compressor`] port.
pub struct StreamPredictorAdaptor {
    algorithm: Box<dyn StreamPredictor>,
    min_symbol: Option<Symbol>,
    max_symbol: Option<Symbol>,
}

impl StreamPredictorAdaptor {
    pub fn new(algorithm: Box<dyn StreamPredictor>) -> Self {
        Self {
            algorithm,
            min_symbol: None,
            max_symbol: None,
        }
    }

    /// Bounds fall back to the data's own min/max on the first call if the
    /// pool never set them.
    fn ensure_alphabet(&mut self, data: &[Symbol]) {
        if self.min_symbol.is_some() && self.max_symbol.is_some() {
            return;
        }
        let (min, max) = match (data.iter().min(), data.iter().max()) {
            (Some(&min), Some(&max)) => (min, max),
            _ => (0, Symbol::MAX),
        };
        self.set_alphabet(min, max);
    }

    fn alphabet_range(&self) -> usize {
        let min = self.min_symbol.unwrap_or(0);
        let max = self.max_symbol.unwrap_or(Symbol::MAX);
        max as usize - min as usize + 1
    }

    /// Scores `data` from the state's current position to its end.
    fn evaluate(&mut self, data: &[Symbol], state: &mut EvaluationState) {
        let range = self.alphabet_range();
        while state.position < data.len() {
            let position = state.position;
            let (guessed, confidence) = self.algorithm.give_next_prediction(&data[..position]);
            let observed = data[position] as usize;
            match confidence {
                Confidence::Confident => {
                    state.confident_run_length += 1;
                    state.confident_guess_freq[guessed as usize] = state.confident_run_length;
                    let step = krichevsky(
                        state.confident_guess_freq[observed],
                        state.confident_run_length,
                        range,
                    );
                    state.probability *= step;
                    state.confident_guess_freq[guessed as usize] = 0;
                }
                Confidence::NotConfident => {
                    state.confident_run_length = 0;
                    let step = krichevsky(state.letters_freq[observed], position, range);
                    state.probability *= step;
                }
            }
            state.letters_freq[observed] += 1;
            state.position += 1;
        }
    }
}

impl Compressor for StreamPredictorAdaptor {
    fn compress(&mut self, data: &[Symbol], _output_buffer: &mut Vec<u8>) -> Result<u64> {
        self.ensure_alphabet(data);
        let mut state = EvaluationState::new();
        self.evaluate(data, &mut state);
        Ok(probability_to_code_length(&state.probability))
    }

    fn compress_continuations(
        &mut self,
        history: &[Symbol],
        endings: &[Continuation],
    ) -> Result<Vec<u64>> {
        if endings.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure_alphabet(history);

        let mut history_state = EvaluationState::new();
        self.evaluate(history, &mut history_state);

        let mut input = Vec::with_capacity(history.len() + endings[0].len());
        input.extend_from_slice(history);
        let mut lengths = Vec::with_capacity(endings.len());
        for ending in endings {
            input.truncate(history.len());
            input.extend_from_slice(ending.digits());
            let mut state = history_state.clone();
            self.evaluate(&input, &mut state);
            lengths.push(probability_to_code_length(&state.probability));
        }
        Ok(lengths)
    }

    fn set_alphabet(&mut self, min: Symbol, max: Symbol) {
        self.min_symbol = Some(min);
        self.max_symbol = Some(max);
        self.algorithm.set_alphabet(min, max);
    }
}
