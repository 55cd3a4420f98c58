// Dual cursor over adjacent pairs of an ordered sequence.
// Both positions clamp on the last index instead of running past the end.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCursor {
    current: usize,
    next: usize,
}

impl PairCursor {
    /// Position the cursor on the first pair of a sequence of `len` elements.
    ///
    /// Returns `None` for an empty sequence so the caller can keep whatever
    /// cursor it held before. With a single element both positions resolve
    /// to index 0.
    pub fn begin(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }

        let next = if len == 1 { 0 } else { 1 };
        Some(Self { current: 0, next })
    }

    /// Advance both positions by one, each independently clamped at `len - 1`.
    pub fn iterate(&mut self, len: usize) {
        if self.current + 1 < len {
            self.current += 1;
        }
        if self.next + 1 < len {
            self.next += 1;
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&self) -> usize {
        self.next
    }
}
