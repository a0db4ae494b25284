use std::ops::Range;

use crate::{
    core::fade::FadeEnvelope,
    error::{Result, SplitError},
    types::SplitOptions,
};

/// Longest chunk, in frames, that a [`ChunkSpec`] accepts.
pub const MAX_CHUNK_LEN: usize = u32::MAX as usize;

/// Window geometry in frames: every window is `chunk_len` long and shares
/// `overlap_len` frames with its successor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSpec {
    chunk_len: usize,
    overlap_len: usize,
}

impl ChunkSpec {
    /// `chunk_len = round(rate * segment * (1 + overlap))`,
    /// `overlap_len = round(rate * overlap)`.
    pub fn new(sample_rate: u32, segment_secs: f64, overlap: f64) -> Result<Self> {
        if sample_rate == 0 {
            return Err(SplitError::config("sample rate must be positive"));
        }
        let opts = SplitOptions {
            segment_secs,
            overlap,
            ..SplitOptions::default()
        };
        opts.validate()?;

        let rate = sample_rate as f64;
        let chunk_len = (rate * segment_secs * (1.0 + overlap)).round();
        let overlap_len = (rate * overlap).round();
        if chunk_len > MAX_CHUNK_LEN as f64 {
            return Err(SplitError::config(format!(
                "{segment_secs} s segments at {sample_rate} Hz exceed {MAX_CHUNK_LEN} frames per chunk"
            )));
        }
        Self::from_lengths(chunk_len as usize, overlap_len as usize)
    }

    pub fn from_options(sample_rate: u32, opts: &SplitOptions) -> Result<Self> {
        Self::new(sample_rate, opts.segment_secs, opts.overlap)
    }

    pub fn from_lengths(chunk_len: usize, overlap_len: usize) -> Result<Self> {
        if chunk_len == 0 {
            return Err(SplitError::config("chunk length rounds to zero frames"));
        }
        if chunk_len > MAX_CHUNK_LEN {
            return Err(SplitError::config(format!(
                "chunk of {chunk_len} frames exceeds {MAX_CHUNK_LEN}"
            )));
        }
        if overlap_len * 2 > chunk_len {
            return Err(SplitError::config(format!(
                "overlap of {overlap_len} frames does not fit twice in a {chunk_len}-frame chunk"
            )));
        }
        Ok(Self {
            chunk_len,
            overlap_len,
        })
    }

    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    pub fn overlap_len(&self) -> usize {
        self.overlap_len
    }

    /// Distance between consecutive window starts.
    pub fn hop(&self) -> usize {
        self.chunk_len - self.overlap_len
    }

    pub fn check_length(&self, total_len: usize) -> Result<()> {
        if total_len == 0 {
            return Err(SplitError::geometry("signal is empty"));
        }
        if self.overlap_len > 0 && total_len <= self.overlap_len {
            return Err(SplitError::geometry(format!(
                "signal of {total_len} frames is not longer than one overlap ({} frames)",
                self.overlap_len
            )));
        }
        Ok(())
    }

    /// Number of windows needed to cover `total_len` frames.
    pub fn window_count(&self, total_len: usize) -> usize {
        let span = total_len.saturating_sub(self.overlap_len);
        span.div_ceil(self.hop())
    }

    pub fn windows(&self, total_len: usize) -> Result<Windows> {
        self.check_length(total_len)?;
        Ok(Windows {
            spec: *self,
            total_len,
            cursor: 0,
            index: 0,
        })
    }

    /// All windows for `total_len` frames, checked to reach the end of the signal.
    pub fn plan(&self, total_len: usize) -> Result<Vec<Window>> {
        let plan: Vec<Window> = self.windows(total_len)?.collect();
        match plan.last() {
            Some(last) if last.end >= total_len => Ok(plan),
            Some(last) => Err(SplitError::geometry(format!(
                "windows stop at frame {} of {total_len}",
                last.end
            ))),
            None => Err(SplitError::geometry("no windows planned")),
        }
    }

    /// The `index`-th window; `is_last` decides whether it fades out.
    pub fn window(&self, index: usize, is_last: bool) -> Window {
        let start = index * self.hop();
        Window {
            index,
            start,
            end: start + self.chunk_len,
            envelope: FadeEnvelope::new(self, index == 0, is_last),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub index: usize,
    pub start: usize,
    /// Exclusive; may run past the end of the signal.
    pub end: usize,
    pub envelope: FadeEnvelope,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Frames of the window that lie inside a signal of `total_len` frames.
    pub fn valid_range(&self, total_len: usize) -> Range<usize> {
        self.start..self.end.min(total_len)
    }
}

/// Cursor over the windows of one signal.
#[derive(Clone, Debug)]
pub struct Windows {
    spec: ChunkSpec,
    total_len: usize,
    cursor: usize,
    index: usize,
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        let stop = self.total_len.saturating_sub(self.spec.overlap_len);
        if self.cursor >= stop {
            return None;
        }
        let end = self.cursor + self.spec.chunk_len;
        let window = self.spec.window(self.index, end >= self.total_len);
        self.cursor += self.spec.hop();
        self.index += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.spec.window_count(self.total_len) - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Windows {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_follow_rate_segment_and_overlap() {
        let spec = ChunkSpec::new(44_100, 10.0, 0.1).unwrap();
        assert_eq!(spec.chunk_len(), 485_100);
        assert_eq!(spec.overlap_len(), 4_410);
        assert_eq!(spec.hop(), 480_690);
    }

    #[test]
    fn zero_sample_rate_rejected() {
        assert!(matches!(
            ChunkSpec::new(0, 1.0, 0.1),
            Err(SplitError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn chunk_that_rounds_to_nothing_rejected() {
        assert!(matches!(
            ChunkSpec::new(10, 0.01, 0.0),
            Err(SplitError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn overlap_wider_than_half_chunk_rejected() {
        // C = round(10 * 0.5 * 1.9) = 10, V = round(10 * 0.9) = 9
        assert!(matches!(
            ChunkSpec::new(10, 0.5, 0.9),
            Err(SplitError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn window_count_matches_iterator() {
        let spec = ChunkSpec::from_lengths(12, 3).unwrap();
        for total in 4..200 {
            let windows = spec.windows(total).unwrap();
            assert_eq!(windows.len(), spec.window_count(total), "total={total}");
            assert_eq!(windows.count(), spec.window_count(total), "total={total}");
        }
    }

    #[test]
    fn window_index_math() {
        let spec = ChunkSpec::from_lengths(10, 2).unwrap();
        let w = spec.window(3, false);
        assert_eq!((w.start, w.end), (24, 34));
        assert_eq!(w.envelope.fade_in_len(), 2);
        assert_eq!(w.envelope.fade_out_len(), 2);
        assert_eq!(w.valid_range(30), 24..30);
    }
}
