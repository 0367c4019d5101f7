use std::f64::consts::LN_2;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Bits needed for `capacity` items at `error_rate`: `-n ln(p) / ln(2)^2`.
pub fn optimal_num_bits(capacity: usize, error_rate: f64) -> u64 {
    (-(capacity as f64) * error_rate.ln() / (LN_2 * LN_2)).ceil() as u64
}

/// Analytical size of the bit array in bytes; not a measurement.
pub fn estimated_memory_bytes(capacity: usize, error_rate: f64) -> u64 {
    optimal_num_bits(capacity, error_rate).div_ceil(8)
}

/// Classic Bloom filter over strings. No false negatives; the false-positive
/// rate stays near the target while at most `capacity` items are inserted.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
}

impl BloomFilter {
    /// Sized for `capacity` items at `error_rate`. Both must already be valid
    /// (`capacity > 0`, `0 < error_rate < 1`).
    pub fn with_rate(capacity: usize, error_rate: f64) -> Self {
        let num_bits = optimal_num_bits(capacity, error_rate).max(64);
        let num_hashes = ((num_bits as f64 / capacity as f64) * LN_2).round().clamp(1.0, 32.0) as u32;
        let words = num_bits.div_ceil(64) as usize;
        Self { bits: vec![0; words], num_bits, num_hashes }
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    pub fn insert(&mut self, item: &str) {
        let (h1, h2) = hash_pair(item);
        for i in 0..u64::from(self.num_hashes) {
            let bit = h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits;
            self.bits[(bit / 64) as usize] |= 1u64 << (bit % 64);
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        let (h1, h2) = hash_pair(item);
        (0..u64::from(self.num_hashes)).all(|i| {
            let bit = h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits;
            self.bits[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0
        })
    }
}

// double hashing: k bit positions from two independent 64-bit hashes
fn hash_pair(item: &str) -> (u64, u64) {
    let mut a = XxHash64::with_seed(0);
    a.write(item.as_bytes());
    let mut b = XxHash64::with_seed(0x9E37_79B9_7F4A_7C15);
    b.write(item.as_bytes());
    // odd step so positions never collapse onto one bit
    (a.finish(), b.finish() | 1)
}
