use murmur::domain::plan;

fn span_sum(plan: &murmur::domain::ChunkPlan) -> f64 {
    plan.segments.iter().map(|s| s.duration_sec).sum()
}

#[test]
fn given_short_audio_when_planning_then_single_segment_covers_it() {
    let result = plan(1200.0, 48, 24, 1400);

    assert!(!result.needs_split);
    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].start_sec, 0.0);
    assert_eq!(result.segments[0].duration_sec, 1200.0);
}

#[test]
fn given_duration_over_model_cap_when_planning_then_splits_at_padded_cap() {
    // 48 kbps -> 6000 bytes/s; 24 MB -> seg-by-size ~4192s; 1400s cap -> 1395s.
    let result = plan(3000.0, 48, 24, 1400);

    assert!(result.needs_split);
    assert_eq!(result.bytes_per_second, 6000);
    assert_eq!(result.segment_duration_sec, 1395);

    let durations: Vec<f64> = result.segments.iter().map(|s| s.duration_sec).collect();
    assert_eq!(durations, vec![1395.0, 1395.0, 210.0]);
}

#[test]
fn given_split_plan_when_inspecting_spans_then_contiguous_and_covering() {
    let result = plan(3000.0, 48, 24, 1400);

    let mut expected_start = 0.0;
    for (i, span) in result.segments.iter().enumerate() {
        assert_eq!(span.index, i);
        assert!((span.start_sec - expected_start).abs() < 1e-9);
        assert!(span.duration_sec <= result.segment_duration_sec as f64);
        expected_start += span.duration_sec;
    }
    assert!((span_sum(&result) - 3000.0).abs() < 1e-9);
}

#[test]
fn given_high_bitrate_when_size_binds_first_then_size_ceiling_wins() {
    // 256 kbps -> 32000 bytes/s; 24 MB / 32000 - 2 = 784s, below the 1395s cap.
    let result = plan(1399.0, 256, 24, 1400);

    assert!(result.needs_split);
    assert_eq!(result.segment_duration_sec, 784);
    assert!(result.segments.iter().all(|s| s.duration_sec <= 784.0));
    assert!((span_sum(&result) - 1399.0).abs() < 1e-9);
}

#[test]
fn given_duration_exactly_at_cap_when_planning_then_no_split() {
    let result = plan(1400.0, 48, 24, 1400);

    assert!(!result.needs_split);
    assert_eq!(result.segments.len(), 1);
}

#[test]
fn given_zero_duration_when_planning_then_single_zero_length_segment() {
    let result = plan(0.0, 48, 24, 1400);

    assert!(!result.needs_split);
    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.segments[0].duration_sec, 0.0);
}

#[test]
fn given_tiny_size_ceiling_when_planning_then_segment_length_floors_at_sixty() {
    let result = plan(500.0, 48, 0, 1400);

    assert!(result.needs_split);
    assert_eq!(result.segment_duration_sec, 60);
    assert!((span_sum(&result) - 500.0).abs() < 1e-9);
}
