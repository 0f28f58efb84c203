//! Multi-operand strided iteration.
//!
//! [`StrideIter`] walks a multi-dimensional index space and maintains one
//! element-offset accumulator per operand. `next` advances the shared index
//! by one (fastest dimension first) and updates every accumulator by the
//! corresponding stride; when the full space has been visited it restores
//! the accumulators to their starting values and reports exhaustion, so the
//! same iterator can drive several passes.

/// Iterator over an index space shared by `N` strided operands.
#[derive(Debug, Clone)]
pub(crate) struct StrideIter<const N: usize> {
    len: Vec<usize>,
    strides: [Vec<isize>; N],
    pos: Vec<usize>,
    total: usize,
    active: bool,
}

impl<const N: usize> StrideIter<N> {
    /// `len` gives the dimension lengths; `strides[k]` gives operand `k`'s
    /// stride along each dimension (same rank as `len`).
    pub fn new(len: &[usize], strides: [&[isize]; N]) -> Self {
        debug_assert!(strides.iter().all(|s| s.len() == len.len()));
        Self {
            len: len.to_vec(),
            strides: strides.map(|s| s.to_vec()),
            pos: vec![0; len.len()],
            total: len.iter().product(),
            active: false,
        }
    }

    /// Advance by one position, updating the offset accumulators.
    ///
    /// The first call after construction (or after exhaustion) enters the
    /// space at the current position without moving. Returns `false` exactly
    /// once per full cycle, with the accumulators back at their entry values.
    pub fn next(&mut self, off: &mut [isize; N]) -> bool {
        if self.total == 0 {
            return false;
        }
        if !self.active {
            self.active = true;
            return true;
        }
        for i in 0..self.len.len() {
            if self.pos[i] + 1 == self.len[i] {
                let back = (self.len[i] - 1) as isize;
                for k in 0..N {
                    off[k] -= back * self.strides[k][i];
                }
                self.pos[i] = 0;
            } else {
                self.pos[i] += 1;
                for k in 0..N {
                    off[k] += self.strides[k][i];
                }
                return true;
            }
        }
        self.active = false;
        false
    }

    /// Seek to the flat index `idx`, adding the corresponding offsets to the
    /// accumulators. The next `next` call enters at this position.
    pub fn position(&mut self, idx: usize, off: &mut [isize; N]) {
        debug_assert!(idx < self.total.max(1));
        let mut rem = idx;
        for (i, &l) in self.len.iter().enumerate() {
            let p = rem % l;
            rem /= l;
            self.pos[i] = p;
            for k in 0..N {
                off[k] += p as isize * self.strides[k][i];
            }
        }
        self.active = false;
    }
}
