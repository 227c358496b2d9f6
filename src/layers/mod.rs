//! Overlay layer acquisition.
//!
//! This module provides:
//! - Loading the layer manifest (index of available overlays)
//! - Fetching every layer payload concurrently, all-or-nothing
//! - A channel that bridges the async pipeline to egui's update loop

mod channel;
mod error;
mod fetch;
mod loader;
mod manifest;

pub use channel::{LayerLoadChannel, LayerSource};
pub use error::LayerError;
pub use loader::LoadedLayer;

#[cfg(test)]
pub(crate) use fetch::testing;
#[cfg(test)]
pub(crate) use {loader::fetch_layers, manifest::load_manifest};
