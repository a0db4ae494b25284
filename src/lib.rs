//! # stem-chunker
//!
//! Runs a fixed-window stem separation model over audio of any length:
//! the signal is cut into overlapping windows, each window goes through the
//! model, and the per-source outputs are cross-faded back into continuous
//! streams with linear fades whose gains sum to one in every overlap.

pub mod core;
pub mod error;
pub mod io;
pub mod model;
pub mod types;

pub use crate::{
    core::{
        accumulator::CrossfadeAccumulator,
        fade::FadeEnvelope,
        segment::{ChunkSpec, Window, Windows, MAX_CHUNK_LEN},
        splitter::{split_signal, split_signal_parallel},
        stream::StreamingSplitter,
    },
    error::{Result, SplitError},
    io::progress::{
        clear_split_progress_callback, set_split_progress_callback, SplitProgress,
    },
    model::{FnModel, PassthroughModel, SeparationModel},
    types::{Separation, Signal, SplitOptions},
};
