//! Mixture weights over compressors and quantization partitions.

/// Equal weights `1/n`, the default for compressor groups.
pub fn uniform_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Weights of a countable mixture: `1/(i+1) - 1/(i+2)` for the first `n - 1`
/// entries and `1/n` for the last, summing to one. Used for partition
/// mixtures, where finer partitions receive geometrically less mass.
pub fn countable_weights(n: usize) -> Vec<f64> {
    debug_assert!(n > 0);
    let mut weights = vec![0.0; n];
    for (i, weight) in weights.iter_mut().take(n - 1).enumerate() {
        *weight = 1.0 / (i as f64 + 1.0) - 1.0 / (i as f64 + 2.0);
    }
    weights[n - 1] = 1.0 / n as f64;
    weights
}
