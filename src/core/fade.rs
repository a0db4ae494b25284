use ndarray::{ArrayViewMut3, Axis};

use crate::core::segment::ChunkSpec;

/// Linear fade-in / fade-out gains for one window.
///
/// A fade of `n` frames ramps over `t(i) = i / (n - 1)` (0 when `n == 1`):
/// the fade-in gain is `t(i)`, the fade-out gain `1 - t(i)`. Because the next
/// window's fade-in covers exactly the frames of this window's fade-out, the
/// two gains sum to one on every shared frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FadeEnvelope {
    len: usize,
    fade_in: usize,
    fade_out: usize,
}

impl FadeEnvelope {
    pub fn new(spec: &ChunkSpec, is_first: bool, is_last: bool) -> Self {
        let overlap = spec.overlap_len();
        Self {
            len: spec.chunk_len(),
            fade_in: if is_first { 0 } else { overlap },
            fade_out: if is_last { 0 } else { overlap },
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn fade_in_len(&self) -> usize {
        self.fade_in
    }

    pub fn fade_out_len(&self) -> usize {
        self.fade_out
    }

    /// Gain at frame `offset` of the window. Offsets past the window are silent.
    pub fn gain(&self, offset: usize) -> f32 {
        if offset >= self.len {
            return 0.0;
        }
        let out_start = self.len - self.fade_out;
        if offset < self.fade_in {
            ramp(offset, self.fade_in)
        } else if offset >= out_start {
            1.0 - ramp(offset - out_start, self.fade_out)
        } else {
            1.0
        }
    }

    pub fn gains(&self) -> Vec<f32> {
        (0..self.len).map(|i| self.gain(i)).collect()
    }

    /// Scales frames of `out` (`(sources, channels, frames)`) in place. Only the
    /// faded edges are touched; the flat middle is left as is.
    pub fn apply(&self, mut out: ArrayViewMut3<'_, f32>) {
        let frames = out.len_of(Axis(2)).min(self.len);
        let out_start = self.len - self.fade_out;
        for i in (0..self.fade_in.min(frames)).chain(out_start..frames) {
            let g = self.gain(i);
            out.index_axis_mut(Axis(2), i).mapv_inplace(|x| x * g);
        }
    }
}

fn ramp(i: usize, n: usize) -> f32 {
    if n <= 1 {
        0.0
    } else {
        i as f32 / (n - 1) as f32
    }
}
