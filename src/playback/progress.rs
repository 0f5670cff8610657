//! Aggregate progress across chunk boundaries.

/// Computes the narration progress percentage.
///
/// `chunk_offset` is the character offset of the current chunk within the
/// normalized narration text, `in_chunk_offset` the character offset the
/// engine has reached within that chunk, and `total_len` the length of the
/// normalized narration text. The result is clamped to `[0, 100]`.
///
/// Progress is recomputed only when the engine reports a word boundary, so
/// its granularity is whatever the engine reports; there is no timer-based
/// interpolation.
pub fn progress(chunk_offset: usize, in_chunk_offset: usize, total_len: usize) -> f32 {
    if total_len == 0 {
        return 0.0;
    }
    let spoken = (chunk_offset + in_chunk_offset) as f32;
    (spoken / total_len as f32 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(progress(0, 0, 100), 0.0);
    }

    #[test]
    fn accounts_for_completed_chunks() {
        assert_eq!(progress(50, 25, 100), 75.0);
    }

    #[test]
    fn clamps_to_one_hundred() {
        assert_eq!(progress(90, 30, 100), 100.0);
    }

    #[test]
    fn empty_text_reports_zero() {
        assert_eq!(progress(0, 0, 0), 0.0);
    }

    #[test]
    fn non_decreasing_across_boundaries() {
        // Word boundaries within chunk 0, then within chunk 1.
        let seq = [(0, 0), (0, 6), (0, 12), (13, 0), (13, 5), (13, 10)];
        let mut last = 0.0;
        for (chunk_offset, in_chunk) in seq {
            let pct = progress(chunk_offset, in_chunk, 28);
            assert!(pct >= last);
            last = pct;
        }
    }
}
