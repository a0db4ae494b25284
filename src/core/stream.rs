use ndarray::{aview1, concatenate, s, Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::{
    core::{
        accumulator::check_shape,
        segment::ChunkSpec,
        splitter::{check_model, infer_chunk},
    },
    error::{Result, SplitError},
    model::SeparationModel,
    types::SplitOptions,
};

/// Incremental front-end for input whose length is not known up front.
///
/// Holds at most one chunk of pending input plus the faded overlap of the
/// last window. Every block returned by [`push`](Self::push) and
/// [`finish`](Self::finish) is final; concatenated, they equal what
/// `split_signal` produces for the whole input.
pub struct StreamingSplitter<M> {
    model: M,
    spec: ChunkSpec,
    channels: usize,
    /// Planar input starting at the next window's first frame.
    pending: Vec<Vec<f32>>,
    received: usize,
    emitted: usize,
    next_window: usize,
    /// Faded overlap region of the previous window, `(sources, channels, overlap)`.
    tail: Option<Array3<f32>>,
    /// Window whose inference failed; the stream is unusable from then on.
    failed: Option<usize>,
}

impl<M: SeparationModel> StreamingSplitter<M> {
    pub fn new(model: M, sample_rate: u32, channels: usize, opts: &SplitOptions) -> Result<Self> {
        let spec = ChunkSpec::from_options(sample_rate, opts)?;
        check_model(&model, sample_rate, channels)?;
        Ok(Self {
            model,
            spec,
            channels,
            pending: vec![Vec::with_capacity(spec.chunk_len()); channels],
            received: 0,
            emitted: 0,
            next_window: 0,
            tail: None,
            failed: None,
        })
    }

    pub fn spec(&self) -> &ChunkSpec {
        &self.spec
    }

    /// Frames pushed so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Frames handed back so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Appends a planar `(channels, frames)` block and returns the output
    /// frames that no later window can change.
    ///
    /// After a window fails, every later `push` and `finish` returns
    /// [`SplitError::StreamAborted`].
    pub fn push(&mut self, block: ArrayView2<'_, f32>) -> Result<Array3<f32>> {
        self.check_alive()?;
        if block.nrows() != self.channels {
            return Err(SplitError::geometry(format!(
                "block has {} channels, stream was opened with {}",
                block.nrows(),
                self.channels
            )));
        }
        for (buf, row) in self.pending.iter_mut().zip(block.rows()) {
            buf.extend(row.iter().copied());
        }
        self.received += block.ncols();

        let mut blocks = Vec::new();
        // Only a window that ends before the input seen so far is known not to be the last.
        while self.next_start() + self.spec.chunk_len() < self.received {
            blocks.push(self.run_window(false)?);
        }
        self.join(blocks)
    }

    /// Ends the input and returns everything still held back.
    pub fn finish(mut self) -> Result<Array3<f32>> {
        self.check_alive()?;
        let total = self.received;
        self.spec.check_length(total)?;

        let stop = total - self.spec.overlap_len();
        let mut blocks = Vec::new();
        let mut reached_end = false;
        while self.next_start() < stop {
            let is_last = self.next_start() + self.spec.chunk_len() >= total;
            blocks.push(self.run_window(is_last)?);
            if is_last {
                reached_end = true;
                break;
            }
        }
        if !reached_end || self.emitted != total {
            return Err(SplitError::geometry(format!(
                "stream stopped at frame {} of {total}",
                self.emitted
            )));
        }
        log::info!(
            "stream finished: {} frames in {} windows",
            total,
            self.next_window
        );
        self.join(blocks)
    }

    fn check_alive(&self) -> Result<()> {
        match self.failed {
            Some(window) => Err(SplitError::StreamAborted { window }),
            None => Ok(()),
        }
    }

    fn next_start(&self) -> usize {
        self.next_window * self.spec.hop()
    }

    fn run_window(&mut self, is_last: bool) -> Result<Array3<f32>> {
        let res = self.try_run_window(is_last);
        if res.is_err() {
            self.failed = Some(self.next_window);
        }
        res
    }

    fn try_run_window(&mut self, is_last: bool) -> Result<Array3<f32>> {
        let window = self.spec.window(self.next_window, is_last);
        let chunk_len = self.spec.chunk_len();
        let overlap = self.spec.overlap_len();
        let hop = self.spec.hop();

        let mut chunk = Array2::<f32>::zeros((self.channels, chunk_len));
        for (mut row, buf) in chunk.rows_mut().into_iter().zip(&self.pending) {
            let n = buf.len().min(chunk_len);
            row.slice_mut(s![..n]).assign(&aview1(&buf[..n]));
        }

        let mut out = infer_chunk(&self.model, &window, chunk.view())?;
        check_shape(&window, &out, [self.model.sources().len(), self.channels, chunk_len])?;
        window.envelope.apply(out.view_mut());
        if let Some(tail) = self.tail.take() {
            let mut head = out.slice_mut(s![.., .., ..overlap]);
            head += &tail;
        }

        let ready = if is_last {
            self.received - window.start
        } else {
            if overlap > 0 {
                self.tail = Some(out.slice(s![.., .., hop..]).to_owned());
            }
            hop
        };

        for buf in &mut self.pending {
            let consumed = hop.min(buf.len());
            buf.drain(..consumed);
        }
        self.next_window += 1;
        self.emitted += ready;
        log::debug!(
            "stream window {} [{}, {}) emitted {} frames",
            window.index,
            window.start,
            window.end,
            ready
        );
        Ok(out.slice(s![.., .., ..ready]).to_owned())
    }

    fn join(&self, blocks: Vec<Array3<f32>>) -> Result<Array3<f32>> {
        if blocks.is_empty() {
            return Ok(Array3::zeros((self.model.sources().len(), self.channels, 0)));
        }
        let views: Vec<ArrayView3<'_, f32>> = blocks.iter().map(|b| b.view()).collect();
        let joined = concatenate(Axis(2), &views).map_err(anyhow::Error::from)?;
        Ok(joined)
    }
}
