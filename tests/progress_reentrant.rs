// Own test binary: the progress callback is process-wide.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use ndarray::Array2;
use stem_chunker::{
    clear_split_progress_callback, set_split_progress_callback, split_signal, PassthroughModel,
    Signal, SplitOptions,
};

#[test]
fn callback_can_clear_itself() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    set_split_progress_callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        clear_split_progress_callback();
    });

    let signal = Signal::from_planar(Array2::zeros((1, 300)), 100);
    split_signal(&PassthroughModel::new(["mix"]), &signal, &SplitOptions::default()).unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
