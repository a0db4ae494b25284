use anyhow::Result;
use ndarray::{Array3, ArrayView2, Axis};

/// Black-box separation model run on one fixed-length window.
///
/// `infer` receives a planar `(channels, frames)` chunk and must return
/// `(sources, channels, frames)` with sources in the order of `sources()`.
/// It must not keep state between calls that changes its output.
pub trait SeparationModel {
    fn sources(&self) -> &[String];

    fn infer(&self, chunk: ArrayView2<'_, f32>) -> Result<Array3<f32>>;

    /// Sample rate the model was trained for, if it cares.
    fn sample_rate(&self) -> Option<u32> {
        None
    }
}

impl<M: SeparationModel + ?Sized> SeparationModel for &M {
    fn sources(&self) -> &[String] {
        (**self).sources()
    }

    fn infer(&self, chunk: ArrayView2<'_, f32>) -> Result<Array3<f32>> {
        (**self).infer(chunk)
    }

    fn sample_rate(&self) -> Option<u32> {
        (**self).sample_rate()
    }
}

impl<M: SeparationModel + ?Sized> SeparationModel for Box<M> {
    fn sources(&self) -> &[String] {
        (**self).sources()
    }

    fn infer(&self, chunk: ArrayView2<'_, f32>) -> Result<Array3<f32>> {
        (**self).infer(chunk)
    }

    fn sample_rate(&self) -> Option<u32> {
        (**self).sample_rate()
    }
}

/// Copies the input window into every source unchanged.
#[derive(Clone, Debug)]
pub struct PassthroughModel {
    sources: Vec<String>,
}

impl PassthroughModel {
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// The usual four-stem layout.
    pub fn four_stems() -> Self {
        Self::new(["vocals", "drums", "bass", "other"])
    }
}

impl SeparationModel for PassthroughModel {
    fn sources(&self) -> &[String] {
        &self.sources
    }

    fn infer(&self, chunk: ArrayView2<'_, f32>) -> Result<Array3<f32>> {
        let (channels, frames) = chunk.dim();
        let out = chunk
            .insert_axis(Axis(0))
            .broadcast((self.sources.len(), channels, frames))
            .ok_or_else(|| anyhow::anyhow!("cannot broadcast chunk to {} sources", self.sources.len()))?
            .to_owned();
        Ok(out)
    }
}

/// Adapts a closure into a `SeparationModel`.
pub struct FnModel<F> {
    sources: Vec<String>,
    sample_rate: Option<u32>,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(ArrayView2<'_, f32>) -> Result<Array3<f32>>,
{
    pub fn new<I, S>(sources: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            sample_rate: None,
            f,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }
}

impl<F> SeparationModel for FnModel<F>
where
    F: Fn(ArrayView2<'_, f32>) -> Result<Array3<f32>>,
{
    fn sources(&self) -> &[String] {
        &self.sources
    }

    fn infer(&self, chunk: ArrayView2<'_, f32>) -> Result<Array3<f32>> {
        (self.f)(chunk)
    }

    fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }
}
