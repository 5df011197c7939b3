use gorilla_chunk::{AppendOutcome, Chunk};

/// Append all samples, asserting every append succeeds, then collect the
/// decoded round trip.
fn roundtrip(capacity: usize, samples: &[(u64, f64)]) -> Vec<(u64, f64)> {
    let mut chunk = Chunk::new(capacity);
    for &(ts, v) in samples {
        assert_eq!(chunk.append(ts, v).unwrap(), AppendOutcome::Written);
    }
    chunk.iter().collect()
}

#[test]
fn s1_single_sample() {
    let mut chunk = Chunk::new(128);
    assert_eq!(chunk.append(1000, 3.14).unwrap(), AppendOutcome::Written);
    assert_eq!(chunk.num_samples(), 1);
    assert_eq!(chunk.bit_len(), 0);
    let samples: Vec<_> = chunk.iter().collect();
    assert_eq!(samples, vec![(1000, 3.14)]);
    assert_eq!(chunk.iter().count(), 1);
}

#[test]
fn s2_constant_delta_and_value() {
    let mut chunk = Chunk::new(128);
    for ts in [1000, 1010, 1020] {
        chunk.append(ts, 5.0).unwrap();
    }
    // See DESIGN.md: the first delta-of-delta is nonzero (8 bits), only
    // the second is zero (2 bits), 10 bits total, not 4.
    assert_eq!(chunk.bit_len(), 10);
    let samples: Vec<_> = chunk.iter().collect();
    assert_eq!(samples, vec![(1000, 5.0), (1010, 5.0), (1020, 5.0)]);
}

#[test]
fn s3_small_delta_of_delta_bucket() {
    let samples = [(0u64, 1.0), (1, 1.0), (3, 1.0)];
    let mut chunk = Chunk::new(128);
    for &(ts, v) in &samples {
        chunk.append(ts, v).unwrap();
    }
    assert_eq!(chunk.bit_len(), 16);
    assert_eq!(chunk.iter().collect::<Vec<_>>(), samples);
}

#[test]
fn s4_capacity_exhaustion_is_transactional() {
    let mut chunk = Chunk::new(64);
    let mut i: u64 = 0;
    loop {
        let before = (chunk.num_samples(), chunk.bit_len());
        match chunk.append(i, 0.0).unwrap() {
            AppendOutcome::Written => i += 1,
            AppendOutcome::End => {
                assert_eq!((chunk.num_samples(), chunk.bit_len()), before);
                break;
            }
        }
    }
    assert_eq!(chunk.num_samples(), i);
    assert!(chunk.bit_len() <= chunk.capacity() * 8);
    let decoded: Vec<_> = chunk.iter().collect();
    assert_eq!(decoded.len() as u64, i);
    for (idx, (ts, v)) in decoded.iter().enumerate() {
        assert_eq!(*ts, idx as u64);
        assert_eq!(*v, 0.0);
    }
}

#[test]
fn s5_reuse_branch_exercised() {
    let samples = [(0u64, 1.0), (1, 2.0), (2, 3.0), (3, 2.0)];
    assert_eq!(roundtrip(256, &samples), samples);
}

#[test]
fn s6_delta_escape_boundary() {
    let ts0: u64 = 0;
    let delta1: i64 = (1i64 << 31) - 1;
    let ts1 = (ts0 as i64 + delta1) as u64;
    let delta2 = delta1 + (1i64 << 31);
    let ts2 = (ts1 as i64 + delta2) as u64;

    let samples = [(ts0, 1.0), (ts1, 1.0), (ts2, 1.0)];
    assert_eq!(roundtrip(256, &samples), samples);
}

#[test]
fn empty_chunk_yields_nothing() {
    let chunk = Chunk::new(128);
    assert_eq!(chunk.num_samples(), 0);
    assert_eq!(chunk.iter().count(), 0);
}

#[test]
fn nan_and_signed_zero_round_trip_bit_exact() {
    let mut chunk = Chunk::new(4096);
    let samples: Vec<(u64, f64)> = vec![
        (0, 1.0),
        (1, f64::NAN),
        (2, -0.0),
        (3, 0.0),
        (4, f64::NAN),
        (5, f64::INFINITY),
        (6, f64::NEG_INFINITY),
    ];
    for &(ts, v) in &samples {
        chunk.append(ts, v).unwrap();
    }
    let decoded: Vec<_> = chunk.iter().collect();
    assert_eq!(decoded.len(), samples.len());
    for ((_, expected), (_, actual)) in samples.iter().zip(decoded.iter()) {
        assert_eq!(expected.to_bits(), actual.to_bits());
    }
}

#[test]
fn varying_intervals_and_values_round_trip() {
    let samples: Vec<(u64, f64)> = (0..2000u64)
        .map(|i| {
            let ts = i * i % 97 + i * 10;
            let v = (i as f64 * 0.013).sin() * 1000.0;
            (ts, v)
        })
        // enforce monotonicity by scanning a running max
        .scan(0u64, |max_ts, (ts, v)| {
            *max_ts = (*max_ts).max(ts);
            Some((*max_ts, v))
        })
        .collect();
    assert_eq!(roundtrip(1 << 20, &samples), samples);
}

#[test]
fn non_monotonic_append_is_rejected_and_leaves_state_untouched() {
    let mut chunk = Chunk::new(128);
    chunk.append(100, 1.0).unwrap();
    chunk.append(110, 2.0).unwrap();
    let before = (chunk.num_samples(), chunk.bit_len());
    let err = chunk.append(105, 3.0).unwrap_err();
    assert!(matches!(
        err,
        gorilla_chunk::ChunkError::NonMonotonicTimestamp { prev: 110, next: 105 }
    ));
    assert_eq!((chunk.num_samples(), chunk.bit_len()), before);
}
