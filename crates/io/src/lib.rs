#![deny(unsafe_code)]
//! Host-boundary conversion for mask-forge.
//!
//! `mask-forge-core` never touches files or pixel formats. This crate maps
//! masks to and from 8-bit grayscale buffers, and (behind the default `png`
//! feature) reads and writes them as PNG files for the CLI.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

pub use pixel::{luma8_to_mask, mask_to_luma8, mask_to_rgba};

#[cfg(feature = "png")]
pub use snapshot::{read_png, write_png};
