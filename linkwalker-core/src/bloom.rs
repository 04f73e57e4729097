//! Bloom filter backing the crawl-wide visited set.
//!
//! Fixed memory for the whole crawl: a membership test can report a false
//! positive (bounded by the configured rate) but never a false negative.

use xxhash_rust::xxh3::xxh3_64_with_seed;

#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u8>,
    num_bits: usize,
    num_hashes: usize,
}

impl BloomFilter {
    /// Create a filter sized for `num_items` expected entries at the given
    /// false-positive rate (e.g. 0.01 for 1%).
    pub fn new(num_items: usize, false_positive_rate: f64) -> Self {
        // m = -n * ln(p) / (ln(2)^2)
        let m = (-(num_items.max(1) as f64) * false_positive_rate.ln()
            / (2.0_f64.ln().powi(2)))
        .ceil() as usize;
        let num_bits = m.max(8);

        // k = m/n * ln(2)
        let k = ((num_bits as f64 / num_items.max(1) as f64) * 2.0_f64.ln()).round() as usize;
        let num_hashes = k.clamp(1, 16);

        Self {
            bits: vec![0u8; num_bits.div_ceil(8)],
            num_bits,
            num_hashes,
        }
    }

    /// Create a filter with explicit bit-array and hash-count parameters.
    pub fn with_params(num_bits: usize, num_hashes: usize) -> Self {
        Self {
            bits: vec![0u8; num_bits.div_ceil(8)],
            num_bits,
            num_hashes,
        }
    }

    pub fn insert(&mut self, item: &[u8]) {
        for seed in 0..self.num_hashes {
            let bit_idx = self.bit_index(item, seed);
            self.bits[bit_idx / 8] |= 1 << (bit_idx % 8);
        }
    }

    /// Returns false if the item is definitely absent, true if it might be
    /// present.
    pub fn contains(&self, item: &[u8]) -> bool {
        (0..self.num_hashes).all(|seed| {
            let bit_idx = self.bit_index(item, seed);
            self.bits[bit_idx / 8] & (1 << (bit_idx % 8)) != 0
        })
    }

    fn bit_index(&self, item: &[u8], seed: usize) -> usize {
        xxh3_64_with_seed(item, seed as u64) as usize % self.num_bits
    }

    /// Fraction of bits set; a filter nearing 1.0 is past its design load
    /// and its false-positive rate is no longer bounded.
    pub fn fill_ratio(&self) -> f64 {
        let set_bits: usize = self.bits.iter().map(|b| b.count_ones() as usize).sum();
        set_bits as f64 / self.num_bits as f64
    }

    pub fn size_bytes(&self) -> usize {
        self.bits.len()
    }
}
