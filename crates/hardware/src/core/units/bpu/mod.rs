//! Branch prediction unit.
//!
//! A set-associative branch target buffer whose entries carry saturating
//! prediction counters. It provides:
//! 1. **Bimodal Prediction:** With history level 0, each entry is a single
//!    saturating counter.
//! 2. **Two-Level Adaptive Prediction:** With level `L >= 1`, each entry
//!    keeps an `L`-bit local history register indexing `2^L` counters.
//! 3. **Target Storage:** The predicted target address, reset when a taken
//!    branch is observed with a different target.
//!
//! Counter orientation: a counter with the `mean_state` bit set predicts
//! taken. Fresh entries start one below the midpoint (weakly not-taken,
//! the target being unknown).

/// Set-associative tag store with LRU replacement.
pub mod tag_array;

use crate::common::{Addr, INSTR_SIZE, SimError};
use crate::config::BpuConfig;

use self::tag_array::CacheTagArray;

/// One branch target buffer entry.
#[derive(Clone, Debug)]
struct BpEntry {
    /// `2^level` saturating counters, indexed by the local history pattern.
    state_table: Vec<u32>,
    current_pattern: usize,
    target: Addr,
}

impl BpEntry {
    fn new(default_state: u32, level: u32) -> Self {
        Self {
            state_table: vec![default_state; 1 << level],
            current_pattern: 0,
            target: 0,
        }
    }

    fn reset(&mut self, default_state: u32) {
        self.state_table.fill(default_state);
        self.current_pattern = 0;
    }

    fn is_taken(&self, mean_state: u32) -> bool {
        self.state_table[self.current_pattern] & mean_state != 0
    }

    fn update(&mut self, taken: bool, target: Addr, mean_state: u32, default_state: u32, pattern_mask: usize) {
        // A taken branch arriving with a new target invalidates whatever
        // was learned about the old one.
        if taken && self.target != target {
            self.reset(default_state);
            self.target = target;
        }

        self.current_pattern = ((self.current_pattern << 1) & pattern_mask) | taken as usize;

        let state = &mut self.state_table[self.current_pattern];
        *state = if taken {
            state.wrapping_add(1)
        } else {
            state.wrapping_sub(1)
        };
        // Saturation via the carry bit: an overflow past the top or an
        // underflow below zero both set `mean_state << 1`, and the masked
        // complement lands the counter back on the violated bound.
        if *state & (mean_state << 1) != 0 {
            *state = !*state & ((mean_state << 1) - 1);
        }
    }
}

/// Branch prediction unit: tag-indexed entries of saturating counters.
#[derive(Debug)]
pub struct Bpu {
    mean_state: u32,
    default_state: u32,
    pattern_mask: usize,
    set_mask: usize,
    /// Entry payloads, indexed `[way][set]` in parallel with the tag store.
    data: Vec<Vec<BpEntry>>,
    tags: CacheTagArray,
}

impl Bpu {
    /// Builds the predictor, validating the geometry.
    pub fn new(config: &BpuConfig) -> Result<Self, SimError> {
        if config.prediction_bits == 0 || config.prediction_bits > 16 {
            return Err(SimError::Config(format!(
                "prediction counter width {} is outside 1..=16",
                config.prediction_bits
            )));
        }
        if config.prediction_level > 8 {
            return Err(SimError::Config(format!(
                "history level {} is outside 0..=8",
                config.prediction_level
            )));
        }
        let tags = CacheTagArray::new(config.size_in_entries, config.ways, 1, config.addr_bits)?;

        let mean_state = 1u32 << (config.prediction_bits - 1);
        let default_state = mean_state - 1;
        let sets = config.size_in_entries / config.ways;
        Ok(Self {
            mean_state,
            default_state,
            pattern_mask: (1usize << config.prediction_level) - 1,
            set_mask: sets - 1,
            data: (0..config.ways)
                .map(|_| vec![BpEntry::new(default_state, config.prediction_level); sets])
                .collect(),
            tags,
        })
    }

    fn set_of(&self, pc: Addr) -> usize {
        pc as usize & self.set_mask
    }

    /// Whether the branch at `pc` is predicted taken. A tag miss predicts
    /// not-taken.
    pub fn predict_taken(&mut self, pc: Addr) -> bool {
        let set = self.set_of(pc);
        match self.tags.read(pc) {
            Some(way) => self.data[way][set].is_taken(self.mean_state),
            None => false,
        }
    }

    /// Predicted next PC: the stored target when the entry predicts taken,
    /// the fall-through otherwise.
    pub fn target(&mut self, pc: Addr) -> Addr {
        let set = self.set_of(pc);
        if let Some(way) = self.tags.read(pc) {
            let entry = &self.data[way][set];
            if entry.is_taken(self.mean_state) {
                return entry.target;
            }
        }
        pc.wrapping_add(INSTR_SIZE)
    }

    /// Trains the predictor with a resolved outcome.
    pub fn update(&mut self, actually_taken: bool, branch_ip: Addr, target: Addr) {
        let way = self.tags.write(branch_ip);
        let set = self.set_of(branch_ip);
        let (mean, default, mask) = (self.mean_state, self.default_state, self.pattern_mask);
        self.data[way][set].update(actually_taken, target, mean, default, mask);
    }
}
