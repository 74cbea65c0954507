//! Set-associative cache tag array with true-LRU replacement.
//!
//! A tag store without a data array: callers learn which way an address
//! lives in and keep their payload alongside. The branch target buffer uses
//! it with a block size of one so that each address maps to exactly one
//! entry slot.

use crate::common::{Addr, SimError};

/// One tag slot.
#[derive(Clone, Copy, Default, Debug)]
struct TagLine {
    tag: Addr,
    valid: bool,
}

/// Per-set usage stacks. Index 0 is the most recently used way; the last
/// index is the eviction victim.
#[derive(Debug)]
struct LruInfo {
    usage: Vec<Vec<usize>>,
}

impl LruInfo {
    fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: (0..sets).map(|_| (0..ways).collect()).collect(),
        }
    }

    /// Moves `way` to the most-recently-used position.
    fn touch(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            stack.remove(pos);
        }
        stack.insert(0, way);
    }

    /// The least-recently-used way of `set`.
    fn victim(&self, set: usize) -> usize {
        *self.usage[set].last().expect("set has at least one way")
    }
}

/// N-way set-associative tag store.
#[derive(Debug)]
pub struct CacheTagArray {
    lines: Vec<TagLine>,
    sets: usize,
    ways: usize,
    block: usize,
    lru: LruInfo,
}

impl CacheTagArray {
    /// Creates a tag array of `size / (ways * block)` sets.
    ///
    /// All parameters must be positive; the total size must divide evenly
    /// into `ways * block`; the resulting set count and the block size must
    /// be powers of two. Violations are construction errors, not runtime
    /// conditions.
    pub fn new(size: usize, ways: usize, block: usize, addr_bits: u32) -> Result<Self, SimError> {
        if size == 0 || ways == 0 || block == 0 || addr_bits == 0 {
            return Err(SimError::Config(
                "tag array sizes must all be greater than zero".into(),
            ));
        }
        if size / ways < block {
            return Err(SimError::Config(format!(
                "each way must hold at least one block (size {}, ways {}, block {})",
                size, ways, block
            )));
        }
        if size % (ways * block) != 0 {
            return Err(SimError::Config(format!(
                "size {} is not a multiple of ways {} x block {}",
                size, ways, block
            )));
        }
        let sets = size / (ways * block);
        if !sets.is_power_of_two() {
            return Err(SimError::Config(format!(
                "set count {} is not a power of two",
                sets
            )));
        }
        if !block.is_power_of_two() {
            return Err(SimError::Config(format!(
                "block size {} is not a power of two",
                block
            )));
        }
        Ok(Self {
            lines: vec![TagLine::default(); sets * ways],
            sets,
            ways,
            block,
            lru: LruInfo::new(sets, ways),
        })
    }

    fn set_of(&self, addr: Addr) -> usize {
        (addr as usize / self.block) & (self.sets - 1)
    }

    fn tag_of(&self, addr: Addr) -> Addr {
        addr / self.block as Addr
    }

    /// Probes for `addr`. A hit refreshes the LRU position and returns the
    /// way holding the tag.
    pub fn read(&mut self, addr: Addr) -> Option<usize> {
        let set = self.set_of(addr);
        let tag = self.tag_of(addr);
        for way in 0..self.ways {
            let line = self.lines[set * self.ways + way];
            if line.valid && line.tag == tag {
                self.lru.touch(set, way);
                return Some(way);
            }
        }
        None
    }

    /// Installs `addr`, re-validating its existing way when the tag is
    /// already resident and claiming the LRU victim otherwise. Returns the
    /// way written.
    pub fn write(&mut self, addr: Addr) -> usize {
        let set = self.set_of(addr);
        let tag = self.tag_of(addr);
        let way = (0..self.ways)
            .find(|&w| self.lines[set * self.ways + w].tag == tag && self.lines[set * self.ways + w].valid)
            .unwrap_or_else(|| self.lru.victim(set));
        self.lines[set * self.ways + way] = TagLine { tag, valid: true };
        self.lru.touch(set, way);
        way
    }
}
