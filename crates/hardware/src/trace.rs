//! Colourised per-stage trace output.
//!
//! One line per stage per cycle when tracing is enabled: the stage name and
//! cycle number, then the unit of work in green or the reason nothing
//! happened (bubble, flush, misprediction) in red. Human-readable only; not
//! a stable machine interface.

use std::fmt;

use colored::Colorize;

use crate::common::Cycle;

/// Stdout trace writer, silent unless enabled.
pub struct Tracer {
    enabled: bool,
}

impl Tracer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// A stage that performed work this cycle.
    pub fn working(&self, stage: &str, cycle: Cycle, what: &dyn fmt::Display) {
        if self.enabled {
            let text = what.to_string();
            println!("{:<10}cycle {}: {}", stage, cycle, text.as_str().green());
        }
    }

    /// A stage that produced no work this cycle (bubble, flush,
    /// misprediction).
    pub fn event(&self, stage: &str, cycle: Cycle, what: &str) {
        if self.enabled {
            println!("{:<10}cycle {}: {}", stage, cycle, what.red());
        }
    }

    /// Free-form line outside any stage.
    pub fn info(&self, line: &dyn fmt::Display) {
        if self.enabled {
            println!("{}", line);
        }
    }
}
