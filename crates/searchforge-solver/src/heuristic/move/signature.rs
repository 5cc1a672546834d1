use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hashes a value into a tabu signature.
///
/// `DefaultHasher::new` uses fixed keys, so signatures are stable within and
/// across runs.
pub fn signature_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
