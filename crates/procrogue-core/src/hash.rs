//! FNV-1a hashing for determinism digests.
//!
//! Simulations use [`StateHasher`] to fold their state into the 64-bit
//! value reported by `determinism_hash()`. The hash is not
//! cryptographically secure; it only has to be identical across runs
//! and platforms, so every integer is fed as little-endian bytes.

/// FNV-1a offset basis for 64-bit.
pub const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Incremental FNV-1a hasher.
///
/// Deliberately not a `std::hash::Hasher`: `Hash` impls for std types
/// are free to change byte layout between releases, which would break
/// recorded checkpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateHasher {
    state: u64,
}

impl StateHasher {
    /// A hasher initialised with the FNV offset basis.
    pub const fn new() -> Self {
        Self { state: FNV_OFFSET }
    }

    /// Feed raw bytes.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        for &b in data {
            self.state = fnv1a_byte(self.state, b);
        }
        self
    }

    /// Feed a byte.
    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.state = fnv1a_byte(self.state, v);
        self
    }

    /// Feed a bool as one byte.
    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
    }

    /// Feed a u32 as 4 LE bytes.
    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Feed an i32 as 4 LE bytes.
    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Feed a u64 as 8 LE bytes.
    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.bytes(&v.to_le_bytes())
    }

    /// Feed a string as a u32 length prefix followed by its bytes, so
    /// adjacent strings cannot alias.
    pub fn str(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32).bytes(s.as_bytes())
    }

    /// The current digest.
    pub fn finish(&self) -> u64 {
        self.state
    }
}

impl Default for StateHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hash_is_fnv_offset() {
        assert_eq!(StateHasher::new().finish(), FNV_OFFSET);
    }

    #[test]
    fn known_fnv1a_vector() {
        // FNV-1a 64 of "a".
        assert_eq!(StateHasher::new().bytes(b"a").finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn same_inputs_same_output() {
        let a = StateHasher::new().u32(42).i32(-7).bool(true).finish();
        let b = StateHasher::new().u32(42).i32(-7).bool(true).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn field_order_matters() {
        let a = StateHasher::new().u32(1).u32(2).finish();
        let b = StateHasher::new().u32(2).u32(1).finish();
        assert_ne!(a, b);
    }

    #[test]
    fn string_boundaries_do_not_alias() {
        let a = StateHasher::new().str("ab").str("c").finish();
        let b = StateHasher::new().str("a").str("bc").finish();
        assert_ne!(a, b);
    }
}
