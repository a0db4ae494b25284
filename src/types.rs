use std::{fs, ops::Range, path::Path};

use ndarray::{s, Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Segment duration in seconds, not counting the overlap margin.
    pub segment_secs: f64,
    /// Overlap fraction in `[0, 1)`.
    pub overlap: f64,
    /// Windows inferred concurrently by `split_signal_parallel`; 0 uses the rayon pool size.
    pub max_parallel_windows: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            segment_secs: 10.0,
            overlap: 0.1,
            max_parallel_windows: 0,
        }
    }
}

impl SplitOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.segment_secs.is_finite() || self.segment_secs <= 0.0 {
            return Err(SplitError::config(format!(
                "segment must be a positive number of seconds, got {}",
                self.segment_secs
            )));
        }
        if !self.overlap.is_finite() || !(0.0..1.0).contains(&self.overlap) {
            return Err(SplitError::config(format!(
                "overlap must be in [0, 1), got {}",
                self.overlap
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let opts: SplitOptions = serde_json::from_str(json)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }
}

/// Read-only multi-channel input, stored planar as `(channels, frames)`.
#[derive(Clone, Debug)]
pub struct Signal {
    samples: Array2<f32>,
    sample_rate: u32,
}

impl Signal {
    pub fn from_planar(samples: Array2<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Builds a signal from interleaved samples. A trailing partial frame is dropped.
    pub fn from_interleaved(interleaved: &[f32], channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(SplitError::config("signal must have at least one channel"));
        }
        let ch = channels as usize;
        let frames = interleaved.len() / ch;
        let samples = Array2::from_shape_fn((ch, frames), |(c, i)| interleaved[i * ch + c]);
        Ok(Self::from_planar(samples, sample_rate))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.samples.nrows()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.samples.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.samples.view()
    }

    /// Copies `len` frames starting at `start`, zero-filling past the end of the signal.
    pub fn padded_window(&self, start: usize, len: usize) -> Array2<f32> {
        let mut chunk = Array2::<f32>::zeros((self.channels(), len));
        let end = (start + len).min(self.len());
        if start < end {
            chunk
                .slice_mut(s![.., ..end - start])
                .assign(&self.samples.slice(s![.., start..end]));
        }
        chunk
    }
}

/// Finished per-source output, shaped `(sources, channels, frames)`.
#[derive(Clone, Debug)]
pub struct Separation {
    sources: Vec<String>,
    samples: Array3<f32>,
    sample_rate: u32,
}

impl Separation {
    pub(crate) fn new(sources: Vec<String>, samples: Array3<f32>, sample_rate: u32) -> Self {
        Self {
            sources,
            samples,
            sample_rate,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.samples.shape()[1]
    }

    /// Number of frames per source.
    pub fn len(&self) -> usize {
        self.samples.shape()[2]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Case-insensitive lookup of a source's position.
    pub fn source_index(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.sources.iter().position(|s| s.to_lowercase() == key)
    }

    pub fn source(&self, name: &str) -> Option<ArrayView2<'_, f32>> {
        let idx = self.source_index(name)?;
        Some(self.samples.index_axis(Axis(0), idx))
    }

    /// Planar view of `range` for one source, or `None` if the name or range is unknown.
    pub fn frames(&self, name: &str, range: Range<usize>) -> Option<ArrayView2<'_, f32>> {
        if range.start > range.end || range.end > self.len() {
            return None;
        }
        let idx = self.source_index(name)?;
        Some(self.samples.slice(s![idx, .., range]))
    }

    pub fn to_interleaved(&self, name: &str) -> Option<Vec<f32>> {
        let stem = self.source(name)?;
        let mut inter = Vec::with_capacity(stem.len());
        for frame in stem.axis_iter(Axis(1)) {
            inter.extend(frame.iter().copied());
        }
        Some(inter)
    }

    pub fn as_array(&self) -> &Array3<f32> {
        &self.samples
    }

    pub fn into_array(self) -> Array3<f32> {
        self.samples
    }
}
