use proptest::prelude::*;
use stem_chunker::{ChunkSpec, SplitError, MAX_CHUNK_LEN};

fn bounds(spec: &ChunkSpec, total: usize) -> Vec<(usize, usize)> {
    spec.plan(total)
        .unwrap()
        .iter()
        .map(|w| (w.start, w.end))
        .collect()
}

#[test]
fn ten_hz_five_second_segments_cover_hundred_frames_in_two_windows() {
    let spec = ChunkSpec::new(10, 5.0, 0.1).unwrap();
    assert_eq!(spec.chunk_len(), 55);
    assert_eq!(spec.overlap_len(), 1);

    let plan = spec.plan(100).unwrap();
    assert_eq!(bounds(&spec, 100), vec![(0, 55), (54, 109)]);

    assert_eq!(plan[0].envelope.fade_in_len(), 0);
    assert_eq!(plan[0].envelope.fade_out_len(), 1);
    assert_eq!(plan[1].envelope.fade_in_len(), 1);
    assert_eq!(plan[1].envelope.fade_out_len(), 0);
    assert_eq!(plan[1].valid_range(100), 54..100);
}

#[test]
fn zero_overlap_tiles_without_fades() {
    let spec = ChunkSpec::new(10, 2.0, 0.0).unwrap();
    assert_eq!(spec.hop(), 20);
    assert_eq!(bounds(&spec, 70), vec![(0, 20), (20, 40), (40, 60), (60, 80)]);
    for w in spec.plan(70).unwrap() {
        assert_eq!(w.envelope.fade_in_len(), 0);
        assert_eq!(w.envelope.fade_out_len(), 0);
        assert!(w.envelope.gains().iter().all(|&g| g == 1.0));
    }
}

#[test]
fn signal_within_one_chunk_gets_single_unfaded_window() {
    let spec = ChunkSpec::new(10, 5.0, 0.1).unwrap();
    for total in [2, 40, 55] {
        let plan = spec.plan(total).unwrap();
        assert_eq!(plan.len(), 1, "total={total}");
        assert_eq!(plan[0].envelope.fade_in_len(), 0);
        assert_eq!(plan[0].envelope.fade_out_len(), 0);
    }
}

#[test]
fn overlap_outside_unit_interval_is_invalid() {
    for overlap in [1.0, 1.5, -0.1, f64::NAN] {
        assert!(
            matches!(
                ChunkSpec::new(44_100, 10.0, overlap),
                Err(SplitError::InvalidConfiguration(_))
            ),
            "overlap={overlap}"
        );
    }
}

#[test]
fn non_positive_segment_is_invalid() {
    for segment in [0.0, -3.0, f64::INFINITY] {
        assert!(matches!(
            ChunkSpec::new(44_100, segment, 0.1),
            Err(SplitError::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn oversized_chunks_are_invalid() {
    for segment in [1e30, f64::MAX] {
        assert!(
            matches!(
                ChunkSpec::new(10, segment, 0.1),
                Err(SplitError::InvalidConfiguration(_))
            ),
            "segment={segment}"
        );
    }
    assert!(ChunkSpec::from_lengths(MAX_CHUNK_LEN, 0).is_ok());
    assert!(matches!(
        ChunkSpec::from_lengths(MAX_CHUNK_LEN + 1, 0),
        Err(SplitError::InvalidConfiguration(_))
    ));
}

#[test]
fn degenerate_lengths_are_geometry_errors() {
    let spec = ChunkSpec::from_lengths(10, 3).unwrap();
    assert!(matches!(spec.plan(0), Err(SplitError::Geometry(_))));
    assert!(matches!(spec.plan(3), Err(SplitError::Geometry(_))));
    assert_eq!(spec.plan(4).unwrap().len(), 1);

    let tiled = ChunkSpec::from_lengths(10, 0).unwrap();
    assert!(matches!(tiled.plan(0), Err(SplitError::Geometry(_))));
    assert_eq!(tiled.plan(1).unwrap().len(), 1);
}

proptest! {
    #[test]
    fn windows_cover_signal_and_fades_sum_to_one(
        rate in 1u32..200,
        segment in 0.05f64..5.0,
        overlap in 0.0f64..0.45,
        total in 1usize..2000,
    ) {
        let Ok(spec) = ChunkSpec::new(rate, segment, overlap) else {
            return Ok(());
        };
        let Ok(plan) = spec.plan(total) else {
            prop_assert!(spec.overlap_len() > 0 && total <= spec.overlap_len());
            return Ok(());
        };
        let (c, v) = (spec.chunk_len(), spec.overlap_len());

        prop_assert_eq!(plan[0].start, 0);
        prop_assert!(plan.last().unwrap().end >= total);
        prop_assert_eq!(plan.len(), spec.window_count(total));

        for (i, w) in plan.iter().enumerate() {
            let is_last = i + 1 == plan.len();
            prop_assert_eq!(w.len(), c);
            prop_assert_eq!(w.is_first(), i == 0);
            prop_assert_eq!(w.envelope.fade_in_len(), if w.is_first() { 0 } else { v });
            prop_assert_eq!(w.envelope.fade_out_len(), if is_last { 0 } else { v });
            prop_assert_eq!(w.end >= total, is_last);
            if !is_last {
                prop_assert_eq!(plan[i + 1].start, w.end - v);
            }
        }

        let mut gain = vec![0.0f32; total];
        let mut coverage = vec![0usize; total];
        for w in &plan {
            for frame in w.valid_range(total) {
                gain[frame] += w.envelope.gain(frame - w.start);
                coverage[frame] += 1;
            }
        }
        for frame in 0..total {
            match coverage[frame] {
                1 => prop_assert_eq!(gain[frame], 1.0),
                2 => prop_assert!((gain[frame] - 1.0).abs() < 1e-6, "frame {} gain {}", frame, gain[frame]),
                n => prop_assert!(false, "frame {} covered {} times", frame, n),
            }
        }
    }
}
