/// Floor on the computed segment length, to avoid degenerate over-splitting.
const MIN_SEGMENT_SEC: u64 = 60;
/// Pad subtracted from the size-derived ceiling to leave room for container headers.
const SIZE_PAD_SEC: u64 = 2;
/// Pad subtracted from the duration ceiling to stay under the model limit.
const DURATION_PAD_SEC: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    pub index: usize,
    pub start_sec: f64,
    pub duration_sec: f64,
}

#[derive(Debug, Clone)]
pub struct ChunkPlan {
    pub total_duration_sec: f64,
    pub bytes_per_second: u64,
    pub max_bytes: u64,
    pub max_duration_sec: u64,
    pub segment_duration_sec: u64,
    pub needs_split: bool,
    pub segments: Vec<SegmentSpan>,
}

/// Decide whether the audio must be split and at what segment length.
///
/// Pure and deterministic. Segments are contiguous, cover `[0, duration_sec)`
/// in order, and each span is at most `segment_duration_sec` long. A zero
/// duration yields a single zero-length segment.
pub fn plan(
    duration_sec: f64,
    bitrate_kbps: u32,
    max_chunk_mb: u64,
    max_duration_sec: u64,
) -> ChunkPlan {
    let bytes_per_second = bitrate_kbps as u64 * 1000 / 8;
    let max_bytes = max_chunk_mb * 1024 * 1024;

    let seg_by_size = match max_bytes.checked_div(bytes_per_second) {
        Some(q) => q.saturating_sub(SIZE_PAD_SEC).max(MIN_SEGMENT_SEC),
        None => u64::MAX,
    };
    let seg_by_duration = max_duration_sec
        .saturating_sub(DURATION_PAD_SEC)
        .max(MIN_SEGMENT_SEC);
    let segment_duration_sec = seg_by_size.min(seg_by_duration);

    let needs_split = duration_sec * bytes_per_second as f64 > max_bytes as f64
        || duration_sec > max_duration_sec as f64;

    let mut segments = Vec::new();
    if duration_sec <= 0.0 {
        segments.push(SegmentSpan {
            index: 0,
            start_sec: 0.0,
            duration_sec: 0.0,
        });
    } else if !needs_split {
        segments.push(SegmentSpan {
            index: 0,
            start_sec: 0.0,
            duration_sec,
        });
    } else {
        let step = segment_duration_sec as f64;
        let mut start = 0.0;
        while start < duration_sec {
            let len = step.min(duration_sec - start);
            segments.push(SegmentSpan {
                index: segments.len(),
                start_sec: start,
                duration_sec: len,
            });
            start += len;
        }
    }

    ChunkPlan {
        total_duration_sec: duration_sec,
        bytes_per_second,
        max_bytes,
        max_duration_sec,
        segment_duration_sec,
        needs_split,
        segments,
    }
}
