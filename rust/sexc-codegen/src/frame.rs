//! Stack-frame layout for a single user function.

/// `N = |params| + |locals|`, rounded up to an even count `N'` purely to
/// keep the reserved area 16-byte aligned; every slot still gets a unique
/// offset, a multiple of 8, starting at 8 regardless of parity — when `N`
/// is odd the last 8 bytes of the frame simply go unused.
pub struct Frame {
    pub frame_bytes: usize,
    offsets: Vec<usize>,
}

impl Frame {
    pub fn compute(num_params: usize, num_locals: usize) -> Self {
        let n = num_params + num_locals;
        // A frame with no slots at all still needs 16 bytes to save the
        // caller's fp safely — rounding 0 up to "even" would otherwise
        // leave a zero-byte frame with nowhere to store it.
        let n_prime = if n == 0 { 2 } else { n + (n % 2) };
        let frame_bytes = n_prime * 8;
        let offsets = (0..n).map(|i| 8 + i * 8).collect();
        Self { frame_bytes, offsets }
    }

    pub fn param_offset(&self, i: usize) -> usize {
        self.offsets[i]
    }

    pub fn local_offset(&self, num_params: usize, i: usize) -> usize {
        self.offsets[num_params + i]
    }
}
