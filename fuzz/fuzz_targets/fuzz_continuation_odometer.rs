//! Fuzz target for the continuation odometer.
//!
//! Incrementing must never panic, must stay inside the alphabet, and the
//! overflow flag must be idempotent.

#![no_main]

use cf_core::Continuation;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, u8, u16)| {
    let (alphabet, length, steps) = input;
    let alphabet = usize::from(alphabet.clamp(1, 16));
    let length = usize::from(length % 6);

    let mut continuation = match Continuation::new(alphabet, length) {
        Ok(continuation) => continuation,
        Err(_) => return,
    };
    for _ in 0..steps {
        continuation.increment();
        assert!(continuation
            .digits()
            .iter()
            .all(|&digit| usize::from(digit) < alphabet));
        if continuation.overflow() {
            let frozen = continuation.digits().to_vec();
            continuation.increment();
            assert_eq!(continuation.digits(), frozen.as_slice());
        }
    }
});
