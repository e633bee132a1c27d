//! # Workload Generation
//!
//! A workload is an ordered list of random key/value pairs. Every key and every
//! value is a decimal prefix in `[0, 1_000_000)` followed by exactly `length`
//! letters drawn uniformly (with replacement) from `a-z` and `A-Z`.
//!
//! Keys are not deduplicated. A collision simply means the later write
//! overwrites the earlier one and the later delete removes an already
//! removed key, which every backend accepts.
//!
//! The random source is passed in explicitly so callers can seed it for
//! reproducible runs; by default the driver seeds it from entropy.

use rand::Rng;
use std::ops::Deref;

/// Alphabet used for the random suffix of keys and values.
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Exclusive upper bound of the numeric prefix.
const PREFIX_BOUND: u32 = 1_000_000;

/// Most digits a numeric prefix can have.
pub const MAX_PREFIX_DIGITS: usize = 6;

/// A single generated key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: String,
    pub value: String,
}

/// Ordered sequence of pairs generated for one engine run.
#[derive(Debug, Clone, Default)]
pub struct Workload {
    pairs: Vec<KvPair>,
}

impl Workload {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Deref for Workload {
    type Target = [KvPair];

    fn deref(&self) -> &[KvPair] {
        &self.pairs
    }
}

/// Generate `count` random pairs whose letter suffix is `length` characters.
///
/// Never fails; `count == 0` yields an empty workload.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize, length: usize) -> Workload {
    let pairs = (0..count)
        .map(|_| KvPair {
            key: random_entry(rng, length),
            value: random_entry(rng, length),
        })
        .collect();
    Workload { pairs }
}

fn random_entry<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let prefix = rng.gen_range(0..PREFIX_BOUND);
    let mut s = prefix.to_string();
    s.reserve(length);
    for _ in 0..length {
        s.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
    }
    s
}
