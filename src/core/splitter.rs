use ndarray::{Array3, ArrayView2};
use rayon::prelude::*;

use crate::{
    core::{
        accumulator::CrossfadeAccumulator,
        segment::{ChunkSpec, Window},
    },
    error::{Result, SplitError},
    io::progress::{emit_chunk_progress, emit_split_progress, SplitProgress},
    model::SeparationModel,
    types::{Separation, Signal, SplitOptions},
};

/// Runs `model` over `signal` window by window and cross-fades the outputs
/// into one stream per source.
pub fn split_signal<M>(model: &M, signal: &Signal, opts: &SplitOptions) -> Result<Separation>
where
    M: SeparationModel + ?Sized,
{
    let plan = prepare(model, signal, opts)?;
    let total = plan.len();
    let mut acc = CrossfadeAccumulator::new(model.sources().len(), signal.channels(), signal.len());

    emit_split_progress(SplitProgress::Stage("infer"));
    for w in &plan {
        let out = infer_window(model, signal, w)?;
        acc.add(w, out)?;
        log::debug!("window {} [{}, {}) accumulated", w.index, w.start, w.end);
        emit_chunk_progress(w.index + 1, total);
    }

    Ok(finish(model, signal, acc))
}

/// Same result as [`split_signal`], but infers up to
/// `opts.max_parallel_windows` windows at a time on the rayon pool. Outputs
/// are still accumulated one by one in window order.
pub fn split_signal_parallel<M>(model: &M, signal: &Signal, opts: &SplitOptions) -> Result<Separation>
where
    M: SeparationModel + Sync + ?Sized,
{
    let plan = prepare(model, signal, opts)?;
    let total = plan.len();
    let batch = match opts.max_parallel_windows {
        0 => rayon::current_num_threads().max(1),
        n => n,
    };
    let mut acc = CrossfadeAccumulator::new(model.sources().len(), signal.channels(), signal.len());

    emit_split_progress(SplitProgress::Stage("infer"));
    for group in plan.chunks(batch) {
        let outputs: Vec<Result<Array3<f32>>> = group
            .par_iter()
            .map(|w| infer_window(model, signal, w))
            .collect();

        for (w, out) in group.iter().zip(outputs) {
            acc.add(w, out?)?;
            emit_chunk_progress(w.index + 1, total);
        }
        log::debug!("batch of {} windows accumulated", group.len());
    }

    Ok(finish(model, signal, acc))
}

/// Rejects model/signal combinations that no window plan can fix.
pub(crate) fn check_model<M>(model: &M, sample_rate: u32, channels: usize) -> Result<()>
where
    M: SeparationModel + ?Sized,
{
    if model.sources().is_empty() {
        return Err(SplitError::config("model declares no sources"));
    }
    if channels == 0 {
        return Err(SplitError::config("signal has no channels"));
    }
    if let Some(expected) = model.sample_rate() {
        if expected != sample_rate {
            return Err(SplitError::config(format!(
                "model expects {expected} Hz, signal is {sample_rate} Hz"
            )));
        }
    }
    Ok(())
}

pub(crate) fn infer_chunk<M>(model: &M, window: &Window, chunk: ArrayView2<'_, f32>) -> Result<Array3<f32>>
where
    M: SeparationModel + ?Sized,
{
    model.infer(chunk).map_err(|source| SplitError::Adapter {
        window: window.index,
        source,
    })
}

fn prepare<M>(model: &M, signal: &Signal, opts: &SplitOptions) -> Result<Vec<Window>>
where
    M: SeparationModel + ?Sized,
{
    let spec = ChunkSpec::from_options(signal.sample_rate(), opts)?;
    check_model(model, signal.sample_rate(), signal.channels())?;

    emit_split_progress(SplitProgress::Stage("plan"));
    let plan = spec.plan(signal.len())?;
    log::info!(
        "splitting {} frames @ {} Hz into {} windows (chunk={}, overlap={}, sources={})",
        signal.len(),
        signal.sample_rate(),
        plan.len(),
        spec.chunk_len(),
        spec.overlap_len(),
        model.sources().len()
    );
    Ok(plan)
}

fn infer_window<M>(model: &M, signal: &Signal, window: &Window) -> Result<Array3<f32>>
where
    M: SeparationModel + ?Sized,
{
    let chunk = signal.padded_window(window.start, window.len());
    infer_chunk(model, window, chunk.view())
}

fn finish<M>(model: &M, signal: &Signal, acc: CrossfadeAccumulator) -> Separation
where
    M: SeparationModel + ?Sized,
{
    emit_split_progress(SplitProgress::Finished);
    log::info!("split finished: {} frames per source", acc.total_len());
    Separation::new(model.sources().to_vec(), acc.into_inner(), signal.sample_rate())
}
