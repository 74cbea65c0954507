//! Program image loading.
//!
//! Images are raw little-endian flat binaries; there is no container
//! format. The image lands at the configured text base, which is also the
//! entry point.

use std::fs;

use crate::common::{Addr, SimError};
use crate::mem::ProgramMemory;

/// Reads an image file from disk.
pub fn load_image(path: &str) -> Result<Vec<u8>, SimError> {
    fs::read(path).map_err(|source| SimError::Image {
        path: path.to_string(),
        source,
    })
}

/// Reads an image file and builds a memory holding it at `base`.
pub fn load_memory(path: &str, base: Addr) -> Result<ProgramMemory, SimError> {
    let image = load_image(path)?;
    Ok(ProgramMemory::new(&image, base))
}
