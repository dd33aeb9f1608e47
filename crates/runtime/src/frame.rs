/// Animation-frame metadata handed to per-frame callbacks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Host timestamp at the start of the frame (milliseconds).
    pub timestamp_ms: f64,
}

impl Frame {
    pub fn new(index: u64, timestamp_ms: f64) -> Self {
        Self {
            index,
            timestamp_ms,
        }
    }

    pub fn next(self, dt_ms: f64) -> Self {
        Self::new(self.index + 1, self.timestamp_ms + dt_ms)
    }
}

/// Tasks deferred to the next animation frame.
///
/// Everything requested before a frame starts runs on that frame, in request
/// order. Tasks requested while draining wait for the following frame.
#[derive(Debug)]
pub struct NextFrame<T> {
    pending: Vec<T>,
}

impl<T> Default for NextFrame<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> NextFrame<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, task: T) {
        self.pending.push(task);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Takes every task due on `frame`.
    pub fn take_due(&mut self, _frame: Frame) -> Vec<T> {
        std::mem::take(&mut self.pending)
    }
}
