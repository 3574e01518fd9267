//! End-to-end compressor selection scenarios.

use cf_core::{select_best_compressors_discrete, select_best_compressors_real, Share};

#[test]
fn selection_is_a_subset_of_the_candidates() {
    let candidates = vec![
        "automation".to_string(),
        "bzip2".to_string(),
        "zlib".to_string(),
        "zstd".to_string(),
    ];
    let history: Vec<u8> = (0..128).map(|i| ((i / 3) % 5) as u8).collect();

    for target in 0..=candidates.len() {
        let chosen = select_best_compressors_discrete(
            &history,
            &candidates,
            0,
            &[],
            Share::new(0.5).unwrap(),
            target,
        )
        .unwrap();
        assert_eq!(chosen.len(), target);
        for name in &chosen {
            assert!(candidates.contains(name));
        }
    }
}

#[test]
fn selection_of_more_than_available_fails() {
    let candidates = vec!["zlib".to_string()];
    let history = vec![0u8, 1, 2, 3];
    let result = select_best_compressors_discrete(
        &history,
        &candidates,
        0,
        &[],
        Share::new(1.0).unwrap(),
        2,
    );
    assert!(result.is_err());
}

#[test]
fn empty_candidates_select_nothing() {
    let history = vec![0u8, 1, 2, 3];
    let chosen = select_best_compressors_discrete(
        &history,
        &[],
        0,
        &[],
        Share::new(1.0).unwrap(),
        0,
    )
    .unwrap();
    assert!(chosen.is_empty());
}

#[test]
fn real_selection_considers_all_quantization_levels() {
    let candidates = vec!["bzip2".to_string(), "zlib".to_string(), "zstd".to_string()];
    let history: Vec<f64> = (0..100).map(|i| (i as f64 * 0.3).sin() * 10.0).collect();

    let chosen = select_best_compressors_real(
        &history,
        &candidates,
        1,
        &[2, 4, 8, 16],
        Share::new(0.7).unwrap(),
        2,
    )
    .unwrap();
    assert_eq!(chosen.len(), 2);
}

#[test]
fn real_selection_without_levels_is_rejected() {
    let candidates = vec!["zlib".to_string()];
    let history = vec![1.0, 2.0, 3.0];
    let result = select_best_compressors_real(
        &history,
        &candidates,
        0,
        &[],
        Share::new(1.0).unwrap(),
        1,
    );
    assert!(result.is_err());
}

#[test]
fn invalid_share_is_rejected_at_construction() {
    assert!(Share::new(1.5).is_err());
    assert!(Share::new(-0.5).is_err());
}

#[test]
fn unknown_candidate_surfaces_as_compressors_error() {
    let candidates = vec!["made-up".to_string()];
    let history = vec![0u8, 1, 0, 1];
    let result = select_best_compressors_discrete(
        &history,
        &candidates,
        0,
        &[],
        Share::new(1.0).unwrap(),
        1,
    );
    assert!(result.is_err());
}
