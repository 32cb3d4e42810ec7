//! Short key generation.
//!
//! Keys are 6 characters drawn uniformly from `[0-9a-zA-Z]`, giving
//! 62^6 (about 56.8 billion) possible keys.

use rand::Rng;

/// Alphabet for generated keys.
pub const KEY_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated keys.
pub const KEY_LENGTH: usize = 6;

/// Source of candidate short keys.
///
/// Candidates are not guaranteed unique; the store's unique index decides.
#[cfg_attr(test, mockall::automock)]
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws every character independently from the thread-local RNG, which is
/// seeded from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self) -> String {
        generate_key(&mut rand::rng())
    }
}

/// Generates one candidate key from the given RNG.
pub fn generate_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..KEY_LENGTH)
        .map(|_| KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}
