use std::hash::{BuildHasher, Hasher};
use foldhash::fast::{FixedState, FoldHasher};

pub type SmallVec<A> = smallvec::SmallVec<A>;

/// Seeded hash state. Iteration order of maps built with it is stable across runs,
/// which keeps graph dumps and logs reproducible.
pub type DeterministicState = FixedState;

pub struct DefaultHasher(FoldHasher);

pub mod hashmap {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V, super::DeterministicState>;
    pub use hashbrown::hash_map::*;
}

impl DefaultHasher {
    pub fn new() -> Self {
        Self(DeterministicState::default().build_hasher())
    }
}

impl Default for DefaultHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for DefaultHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.0.finish()
    }

    #[inline(always)]
    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }
}

#[cfg(test)]
mod tests {
    use std::hash::Hash;
    use super::*;

    #[test]
    fn hasher_is_deterministic() {
        let hash = |value: &str| {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        };

        assert_eq!(hash("gbuffer"), hash("gbuffer"));
        assert_ne!(hash("gbuffer"), hash("lighting"));
    }

    #[test]
    fn maps_use_fixed_state() {
        let mut a: hashmap::HashMap<&str, u32> = hashmap::HashMap::default();
        let mut b: hashmap::HashMap<&str, u32> = hashmap::HashMap::default();
        for (index, key) in ["albedo", "normal", "depth", "velocity"].into_iter().enumerate() {
            a.insert(key, index as u32);
            b.insert(key, index as u32);
        }

        let order_a: Vec<_> = a.keys().collect();
        let order_b: Vec<_> = b.keys().collect();
        assert_eq!(order_a, order_b);
    }
}
