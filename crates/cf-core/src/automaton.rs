//! The predicting multi-head sensing automaton.
//!
//! A deterministic finite-state automaton with ten one-way read heads walks
//! the symbol tape and, at selected steps, guesses the next symbol together
//! with a confidence flag. Each guess updates a running Krichevsky-mixture
//! probability of the whole word; the negated logarithm of that probability
//! is the automaton's code length, which is how it plugs into the
//! compressor pool.
//!
//! The head choreography follows Smith, "Prediction of infinite words with
//! automata" (Theory of Computing Systems, 2018). The paper works with
//! infinite words; here the automaton simply stops when any required move
//! would fall off the tape end.

use cf_common::Symbol;
use cf_math::{krichevsky, WideF64};

const HEAD_COUNT: usize = 10;

// Head numbering is fixed at construction; the names follow the paper.
const H3A: usize = 0;
const H1: usize = 1;
const H2: usize = 2;
const H3: usize = 3;
const H4: usize = 4;
const INNER: usize = 5;
const OUTER: usize = 6;
const L: usize = 7;
const R: usize = 8;
const T: usize = 9;

#[cfg(test)]
const HEAD_NAMES: [&str; HEAD_COUNT] = [
    "h3a", "h1", "h2", "h3", "h4", "inner", "outer", "l", "r", "t",
];

/// Tape symbols are data bytes extended with one out-of-alphabet sentinel
/// marking the position before the first letter.
type TapeSymbol = u16;

const BEGINNING_DELIMITER: TapeSymbol = Symbol::MAX as TapeSymbol + 1;

/// Frequency tables index tape symbols, sentinel included.
const EXTENDED_ALPHABET: usize = BEGINNING_DELIMITER as usize + 1;

/// The tape: a finite word indexable from position −1 (the sentinel).
#[derive(Default)]
struct AutomatonWord {
    symbols: Vec<TapeSymbol>,
}

impl AutomatonWord {
    fn new(word: &[Symbol]) -> Self {
        Self {
            symbols: word.iter().map(|&s| TapeSymbol::from(s)).collect(),
        }
    }

    fn len(&self) -> i64 {
        self.symbols.len() as i64
    }

    fn at(&self, position: i64) -> TapeSymbol {
        debug_assert!(position >= -1, "only position -1 is valid below zero");
        if position >= 0 {
            self.symbols[position as usize]
        } else {
            BEGINNING_DELIMITER
        }
    }
}

#[cfg(test)]
#[derive(Default)]
struct Journal {
    moves: Vec<(&'static str, i64)>,
    guesses: Vec<TapeSymbol>,
}

/// The 10-head sensing DFA.
pub struct SensingDfa {
    tape: AutomatonWord,
    heads: [i64; HEAD_COUNT],
    rightmost: usize,

    min_symbol: Symbol,
    max_symbol: Symbol,

    probability: WideF64,
    confident_run_length: usize,
    letters_freq: [usize; EXTENDED_ALPHABET],
    confident_guess_freq: [usize; EXTENDED_ALPHABET],

    #[cfg(test)]
    journal: Journal,
}

impl SensingDfa {
    pub fn new(min_symbol: Symbol, max_symbol: Symbol) -> Self {
        Self {
            tape: AutomatonWord::default(),
            heads: [-1; HEAD_COUNT],
            rightmost: 0,
            min_symbol,
            max_symbol,
            probability: WideF64::ONE,
            confident_run_length: 0,
            letters_freq: [0; EXTENDED_ALPHABET],
            confident_guess_freq: [0; EXTENDED_ALPHABET],
            #[cfg(test)]
            journal: Journal::default(),
        }
    }

    pub fn set_min_symbol(&mut self, min_symbol: Symbol) {
        self.min_symbol = min_symbol;
    }

    pub fn set_max_symbol(&mut self, max_symbol: Symbol) {
        self.max_symbol = max_symbol;
    }

    /// Probability the automaton assigns to the whole word. State is reset
    /// before every evaluation.
    pub fn eval_probability(&mut self, word: &[Symbol]) -> WideF64 {
        self.tape = AutomatonWord::new(word);
        self.init();
        self.run();
        self.probability
    }

    fn init(&mut self) {
        self.heads = [-1; HEAD_COUNT];
        self.rightmost = 0;
        self.probability = WideF64::ONE;
        self.confident_run_length = 0;
        self.letters_freq = [0; EXTENDED_ALPHABET];
        self.confident_guess_freq = [0; EXTENDED_ALPHABET];
        #[cfg(test)]
        {
            self.journal = Journal::default();
        }
    }

    fn alphabet_range(&self) -> usize {
        self.max_symbol as usize - self.min_symbol as usize + 1
    }

    fn mean_symbol(&self) -> TapeSymbol {
        ((self.min_symbol as usize + self.max_symbol as usize) / 2) as TapeSymbol
    }

    /// Symbol under the given head.
    fn at(&self, head: usize) -> TapeSymbol {
        self.tape.at(self.heads[head])
    }

    fn is_rightmost(&self, head: usize) -> bool {
        self.heads[head] == self.heads[self.rightmost]
    }

    /// Moves a head one position to the right. Fails (without moving) when
    /// the head already stands on the last tape position. The letter
    /// frequencies count exactly the symbols the rightmost head has seen.
    fn advance(&mut self, head: usize) -> bool {
        if self.heads[head] + 1 == self.tape.len() {
            return false;
        }
        self.heads[head] += 1;
        #[cfg(test)]
        self.journal.moves.push((HEAD_NAMES[head], self.heads[head]));
        if self.heads[self.rightmost] < self.heads[head] {
            self.rightmost = head;
        }
        if head == self.rightmost {
            let observed = self.tape.at(self.heads[head]);
            self.letters_freq[observed as usize] += 1;
        }
        true
    }

    /// Moves several heads in order, stopping at the first failure.
    fn advance_all(&mut self, heads: &[usize]) -> bool {
        heads.iter().all(|&head| self.advance(head))
    }

    /// Updates the evaluated probability with one guess. Nothing is scored
    /// when the rightmost head stands on the last position: there is no
    /// observed symbol to compare against.
    fn guess(&mut self, guessed: TapeSymbol, confident: bool) {
        if self.heads[self.rightmost] >= self.tape.len() - 1 {
            return;
        }
        #[cfg(test)]
        self.journal.guesses.push(guessed);
        let observed = self.tape.at(self.heads[self.rightmost] + 1) as usize;
        let range = self.alphabet_range();
        if confident {
            self.confident_run_length += 1;
            self.confident_guess_freq[guessed as usize] = self.confident_run_length;
            let step = krichevsky(
                self.confident_guess_freq[observed],
                self.confident_run_length,
                range,
            );
            self.probability *= step;
            self.confident_guess_freq[guessed as usize] = 0;
        } else {
            self.confident_run_length = 0;
            let position = self.heads[self.rightmost];
            let step = krichevsky(
                self.letters_freq[observed],
                (position + 1) as usize,
                range,
            );
            self.probability *= step;
        }
    }

    fn guess_if_rightmost(&mut self, head: usize, confident: bool) {
        let symbol = self.at(head);
        self.guess_symbol_if_rightmost(head, symbol, confident);
    }

    fn guess_symbol_if_rightmost(&mut self, head: usize, symbol: TapeSymbol, confident: bool) {
        if !self.is_rightmost(head) {
            return;
        }
        if confident {
            self.guess(symbol, true);
        } else {
            self.guess(self.mean_symbol(), false);
        }
    }

    fn run(&mut self) {
        while self.heads[H4] < self.tape.len() {
            self.guess_if_rightmost(R, false);
            if !(self.advance(R) && self.correction() && self.matching()) {
                return;
            }
        }
    }

    /// Skips one run of symbols matching under `t`, guessing at head `i`.
    fn advance_one(&mut self, i: usize) -> bool {
        while self.heads[T] != self.heads[i] {
            self.advance(T);
        }

        self.guess_if_rightmost(i, false);
        if !self.advance(i) {
            return false;
        }

        while self.heads[INNER] != self.heads[R] {
            self.advance(INNER);
        }

        while self.heads[L] != self.heads[INNER] {
            if self.at(T) == self.at(i) {
                if !self.advance_all(&[L, R, OUTER]) {
                    return false;
                }
            } else {
                while self.heads[INNER] != self.heads[R] {
                    self.advance(INNER);
                }
                self.guess_if_rightmost(i, false);
                if !self.advance(i) {
                    return false;
                }
            }

            if !self.advance(T) {
                return false;
            }
            self.guess_if_rightmost(i, false);
            if !self.advance(i) {
                return false;
            }
        }

        while self.at(T) == self.at(i) {
            if !self.advance(T) {
                return false;
            }
            let symbol = self.at(T);
            self.guess_symbol_if_rightmost(i, symbol, true);
            if !self.advance(i) {
                return false;
            }
        }

        true
    }

    /// Skips many matching runs, bounded by the `l`/`outer` bracket.
    fn advance_many(&mut self, i: usize) -> bool {
        while self.heads[OUTER] != self.heads[R] {
            self.advance(OUTER);
        }
        while self.heads[L] != self.heads[OUTER] {
            if !(self.advance_one(i) && self.advance_all(&[L, R])) {
                return false;
            }
        }

        true
    }

    /// Realigns the four rolling heads one after another.
    fn correction(&mut self) -> bool {
        while self.heads[H1] != self.heads[H4] {
            self.advance(H1);
        }
        if !self.advance_one(H1) {
            return false;
        }

        while self.heads[H2] != self.heads[H1] {
            self.advance(H2);
        }
        if !self.advance_many(H2) {
            return false;
        }

        while self.heads[H3] != self.heads[H2] {
            self.advance(H3);
        }
        if !self.advance_many(H3) {
            return false;
        }

        while self.heads[H4] != self.heads[H3] {
            self.advance(H4);
        }
        if !self.advance_many(H4) {
            return false;
        }

        true
    }

    /// Extends an observed period while the rolling heads keep agreeing,
    /// emitting confident guesses for every extension.
    fn matching(&mut self) -> bool {
        while self.heads[H4] < self.tape.len() {
            while self.heads[H3A] != self.heads[H3] {
                self.advance(H3A);
            }

            while self.at(H1) == self.at(H2)
                && self.at(H2) == self.at(H3)
                && self.at(H3) == self.at(H4)
            {
                if !self.advance_all(&[H1, H2, H3A, H3]) {
                    return false;
                }
                let symbol = self.at(H2);
                self.guess_symbol_if_rightmost(H4, symbol, true);
                if !self.advance(H4) {
                    return false;
                }
            }

            if self.at(H2) != self.at(H4) {
                break;
            }

            while self.at(H2) == self.at(H3) && self.at(H3) == self.at(H4) {
                if !self.advance_all(&[H2, H3]) {
                    return false;
                }
                let symbol = self.at(H3);
                self.guess_symbol_if_rightmost(H4, symbol, true);
                if !self.advance(H4) {
                    return false;
                }
            }

            if self.at(H3) != self.at(H4) {
                break;
            }

            while self.at(H3A) == self.at(H3) && self.at(H3) == self.at(H4) {
                if !self.advance_all(&[H3A, H3]) {
                    return false;
                }
                let symbol = self.at(H3A);
                self.guess_symbol_if_rightmost(H4, symbol, true);
                if !self.advance(H4) {
                    return false;
                }
            }

            if self.at(H3A) != self.at(H4) {
                break;
            }

            while self.heads[H3A] != self.heads[H3] && self.at(H3A) == self.at(H4) {
                if !self.advance(H3A) {
                    return false;
                }
                let symbol = self.at(H3A);
                self.guess_symbol_if_rightmost(H4, symbol, true);
                if !self.advance(H4) {
                    return false;
                }
            }

            if self.at(H3A) != self.at(H4) {
                break;
            }
        }

        true
    }

    #[cfg(test)]
    fn head_history(&self) -> &[(&'static str, i64)] {
        &self.journal.moves
    }

    #[cfg(test)]
    fn guess_history(&self) -> &[TapeSymbol] {
        &self.journal.guesses
    }
}
