use ndarray::{s, Array3};

use crate::{
    core::segment::Window,
    error::{Result, SplitError},
};

/// Full-length output buffer that window outputs are cross-faded into.
#[derive(Debug)]
pub struct CrossfadeAccumulator {
    acc: Array3<f32>,
}

impl CrossfadeAccumulator {
    pub fn new(sources: usize, channels: usize, total_len: usize) -> Self {
        Self {
            acc: Array3::zeros((sources, channels, total_len)),
        }
    }

    pub fn total_len(&self) -> usize {
        self.acc.shape()[2]
    }

    /// Fades `output` with the window's envelope and adds the frames that fall
    /// inside the signal. Padding past the end is dropped.
    pub fn add(&mut self, window: &Window, mut output: Array3<f32>) -> Result<()> {
        let (sources, channels, total) = self.acc.dim();
        check_shape(window, &output, [sources, channels, window.len()])?;

        window.envelope.apply(output.view_mut());

        let range = window.valid_range(total);
        let valid = range.len();
        let mut dst = self.acc.slice_mut(s![.., .., range]);
        dst += &output.slice(s![.., .., ..valid]);
        Ok(())
    }

    pub fn into_inner(self) -> Array3<f32> {
        self.acc
    }
}

pub(crate) fn check_shape(window: &Window, output: &Array3<f32>, expected: [usize; 3]) -> Result<()> {
    if output.shape() != expected {
        return Err(SplitError::AdapterShape {
            window: window.index,
            expected,
            actual: output.shape().to_vec(),
        });
    }
    Ok(())
}
