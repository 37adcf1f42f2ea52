// Fixed-capacity window over the most recent values, oldest first.

#[derive(Clone, Debug)]
pub(crate) struct RingBuffer {
    buffer: Vec<f64>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Appends `value`, returning the evicted oldest value once full.
    pub(crate) fn push(&mut self, value: f64) -> Option<f64> {
        if self.is_full() {
            let old = self.buffer[self.head];
            self.buffer[self.head] = value;
            self.head = (self.head + 1) % self.buffer.len();
            Some(old)
        } else {
            self.buffer[self.len] = value;
            self.len += 1;
            None
        }
    }

    /// Values from oldest to newest.
    pub(crate) fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (newer, older) = self.buffer[..self.len].split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// Mean of the held values, summed oldest to newest. `None` when empty.
    pub(crate) fn mean(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        Some(self.iter().sum::<f64>() / self.len as f64)
    }
}
