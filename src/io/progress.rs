use std::sync::{Arc, Mutex, OnceLock};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitProgress {
    Stage(&'static str),
    Chunks { done: usize, total: usize, percent: f32 },
    Finished,
}

type ProgressCallback = Arc<dyn Fn(SplitProgress) + Send + Sync + 'static>;

static SPLIT_PROGRESS_CB: OnceLock<Mutex<Option<ProgressCallback>>> = OnceLock::new();

/// Installs the process-wide progress callback, replacing any previous one.
///
/// The callback runs outside the registry lock, so it may itself install or
/// clear callbacks.
pub fn set_split_progress_callback(cb: impl Fn(SplitProgress) + Send + Sync + 'static) {
    let slot = SPLIT_PROGRESS_CB.get_or_init(|| Mutex::new(None));
    if let Ok(mut g) = slot.lock() {
        *g = Some(Arc::new(cb));
    }
}

pub fn clear_split_progress_callback() {
    if let Some(m) = SPLIT_PROGRESS_CB.get() {
        if let Ok(mut g) = m.lock() {
            *g = None;
        }
    }
}

pub fn emit_split_progress(progress: SplitProgress) {
    let cb = SPLIT_PROGRESS_CB
        .get()
        .and_then(|m| m.lock().ok().and_then(|g| g.clone()));
    if let Some(cb) = cb {
        cb(progress);
    }
}

pub(crate) fn emit_chunk_progress(done: usize, total: usize) {
    let percent = if total == 0 {
        100.0
    } else {
        done as f32 / total as f32 * 100.0
    };
    emit_split_progress(SplitProgress::Chunks {
        done,
        total,
        percent,
    });
}
