//! Timestamp planning tests.

use std::time::Duration;

use framextractor::{
    ExtractError, ExtractionRequest, MAX_BATCH_FRAMES, Resolution, Sampling, compute_timestamps,
};

fn assert_strictly_increasing(offsets: &[Duration]) {
    for pair in offsets.windows(2) {
        assert!(pair[0] < pair[1], "{:?} is not before {:?}", pair[0], pair[1]);
    }
}

// ── Fixed rate ─────────────────────────────────────────────────────

#[test]
fn fixed_rate_yields_ceil_of_duration_times_rate() {
    let cases = [
        (Duration::from_secs(10), 1.0, 10),
        (Duration::from_millis(10_500), 1.0, 11),
        (Duration::from_secs(3), 0.5, 2),
        (Duration::from_millis(1600), 2.0, 4),
        (Duration::from_millis(250), 30.0, 8),
        (Duration::from_secs(7), 4.0, 28),
    ];

    for (duration, rate, expected) in cases {
        let request = ExtractionRequest::batch(Sampling::FixedRate(rate));
        let offsets = compute_timestamps(duration, &request).unwrap();

        assert_eq!(offsets.len(), expected, "{duration:?} at {rate} fps");
        assert_eq!(offsets[0], Duration::ZERO);
        assert!(offsets.iter().all(|offset| *offset < duration));
        assert_strictly_increasing(&offsets);
    }
}

#[test]
fn fixed_rate_spacing_is_one_over_rate() {
    let request = ExtractionRequest::batch(Sampling::FixedRate(4.0));
    let offsets = compute_timestamps(Duration::from_secs(1), &request).unwrap();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::from_millis(250),
            Duration::from_millis(500),
            Duration::from_millis(750),
        ]
    );
}

#[test]
fn short_clip_at_low_rate_still_gets_the_first_frame() {
    let request = ExtractionRequest::batch(Sampling::FixedRate(0.1));
    let offsets = compute_timestamps(Duration::from_secs(2), &request).unwrap();
    assert_eq!(offsets, vec![Duration::ZERO]);
}

// ── Fixed count ────────────────────────────────────────────────────

#[test]
fn fixed_count_yields_evenly_spaced_offsets_from_zero() {
    let duration = Duration::from_secs(12);
    for count in [1_u32, 2, 3, 5, 12, 100] {
        let request = ExtractionRequest::batch(Sampling::FixedCount(count));
        let offsets = compute_timestamps(duration, &request).unwrap();

        assert_eq!(offsets.len(), count as usize);
        assert_eq!(offsets[0], Duration::ZERO);
        assert!(offsets.iter().all(|offset| *offset < duration));
        assert_strictly_increasing(&offsets);

        let interval = duration / count;
        for (index, offset) in offsets.iter().enumerate() {
            assert_eq!(*offset, interval * index as u32);
        }
    }
}

// ── Single and invalid requests ────────────────────────────────────

#[test]
fn single_mode_is_always_one_offset_at_zero() {
    for duration in [Duration::ZERO, Duration::from_secs(90)] {
        let offsets = compute_timestamps(duration, &ExtractionRequest::single()).unwrap();
        assert_eq!(offsets, vec![Duration::ZERO]);
    }
}

#[test]
fn zero_duration_batch_is_rejected() {
    let request = ExtractionRequest::batch(Sampling::FixedRate(1.0));
    match compute_timestamps(Duration::ZERO, &request) {
        Err(ExtractError::InvalidRequest(_)) => {}
        other => panic!("Expected InvalidRequest, got: {other:?}"),
    }
}

#[test]
fn oversized_batch_is_rejected() {
    let request = ExtractionRequest::batch(Sampling::FixedCount(MAX_BATCH_FRAMES as u32 + 1));
    assert!(compute_timestamps(Duration::from_secs(60), &request).is_err());

    let request = ExtractionRequest::batch(Sampling::FixedCount(MAX_BATCH_FRAMES as u32));
    assert_eq!(
        compute_timestamps(Duration::from_secs(60), &request)
            .unwrap()
            .len(),
        MAX_BATCH_FRAMES
    );
}

// ── Resolution ─────────────────────────────────────────────────────

#[test]
fn rescale_preserves_aspect_ratio() {
    assert_eq!(Resolution::Width(960).resolve(1920, 1080).unwrap(), (960, 540));
    assert_eq!(Resolution::Width(640).resolve(1280, 720).unwrap(), (640, 360));
    assert_eq!(Resolution::Width(100).resolve(300, 200).unwrap(), (100, 67));
    assert_eq!(Resolution::Original.resolve(1920, 1080).unwrap(), (1920, 1080));
}
