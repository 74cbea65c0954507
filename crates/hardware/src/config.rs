//! Configuration system for the pipeline simulator.
//!
//! This module defines the configuration structures used to parameterize a
//! run. It provides:
//! 1. **Defaults:** Baseline constants (BTB geometry, counter widths, text
//!    base address).
//! 2. **Structures:** Hierarchical config for the run, the machine, and the
//!    branch prediction unit.
//!
//! Configuration is assembled by the CLI from flags, optionally starting
//! from a JSON file deserialized with serde; `Config::default()` gives the
//! baseline machine.

use serde::Deserialize;

/// Default configuration constants for the simulator.
mod defaults {
    /// Default branch target buffer capacity in entries.
    pub const BTB_SIZE: usize = 128;

    /// Default branch target buffer associativity.
    pub const BTB_WAYS: usize = 4;

    /// Default saturating counter width in bits (bimodal two-bit scheme).
    pub const PREDICTION_BITS: u32 = 2;

    /// Default local history width in bits; 0 selects the bimodal scheme.
    pub const PREDICTION_LEVEL: u32 = 0;

    /// Default branch address width in bits.
    pub const BRANCH_IP_BITS: u32 = 32;

    /// Load address and entry point of the program image.
    ///
    /// The conventional MIPS text segment base.
    pub const TEXT_BASE: u64 = 0x0040_0000;
}

/// Root configuration structure for one simulation run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Run control (instruction budget, tracing, functional-only mode).
    #[serde(default)]
    pub run: RunConfig,
    /// Machine parameters outside the predictor.
    #[serde(default)]
    pub machine: MachineConfig,
    /// Branch prediction unit geometry.
    #[serde(default)]
    pub bpu: BpuConfig,
}

/// Run control settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Path to the program image.
    #[serde(default)]
    pub binary: Option<String>,

    /// Number of instructions to retire before stopping.
    #[serde(default)]
    pub num_steps: u64,

    /// Print the colourised per-stage trace to stdout.
    #[serde(default)]
    pub disassembly: bool,

    /// Drive the reference functional model alone, bypassing the pipeline.
    #[serde(default)]
    pub functional_only: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            binary: None,
            num_steps: 0,
            disassembly: false,
            functional_only: false,
        }
    }
}

/// Machine parameters outside the predictor.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Load address and entry point of the program image.
    #[serde(default = "MachineConfig::default_text_base")]
    pub text_base: u64,
}

impl MachineConfig {
    /// Returns the default text segment base address.
    fn default_text_base() -> u64 {
        defaults::TEXT_BASE
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            text_base: defaults::TEXT_BASE,
        }
    }
}

/// Branch prediction unit geometry.
///
/// `size_in_entries` must divide evenly into `ways`, and the resulting set
/// count must be a power of two; the predictor constructor validates this.
#[derive(Debug, Clone, Deserialize)]
pub struct BpuConfig {
    /// Total branch target buffer capacity in entries.
    #[serde(default = "BpuConfig::default_size")]
    pub size_in_entries: usize,

    /// Associativity (entries per set times sets equals capacity).
    #[serde(default = "BpuConfig::default_ways")]
    pub ways: usize,

    /// Saturating counter width in bits.
    #[serde(default = "BpuConfig::default_prediction_bits")]
    pub prediction_bits: u32,

    /// Local history width in bits; 0 selects the bimodal scheme.
    #[serde(default = "BpuConfig::default_prediction_level")]
    pub prediction_level: u32,

    /// Branch address width in bits.
    #[serde(default = "BpuConfig::default_addr_bits")]
    pub addr_bits: u32,
}

impl BpuConfig {
    /// Returns the default branch target buffer capacity.
    fn default_size() -> usize {
        defaults::BTB_SIZE
    }

    /// Returns the default branch target buffer associativity.
    fn default_ways() -> usize {
        defaults::BTB_WAYS
    }

    /// Returns the default saturating counter width.
    fn default_prediction_bits() -> u32 {
        defaults::PREDICTION_BITS
    }

    /// Returns the default local history width.
    fn default_prediction_level() -> u32 {
        defaults::PREDICTION_LEVEL
    }

    /// Returns the default branch address width.
    fn default_addr_bits() -> u32 {
        defaults::BRANCH_IP_BITS
    }
}

impl Default for BpuConfig {
    fn default() -> Self {
        Self {
            size_in_entries: defaults::BTB_SIZE,
            ways: defaults::BTB_WAYS,
            prediction_bits: defaults::PREDICTION_BITS,
            prediction_level: defaults::PREDICTION_LEVEL,
            addr_bits: defaults::BRANCH_IP_BITS,
        }
    }
}
