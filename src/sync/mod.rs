//! Turning descriptions and updates into retained render state.
//!
//! - `uniforms` types raw values and applies uniform updates
//! - `textures` builds and rebuilds textures, including the shared atlas
//! - `attributes` applies attribute updates and the growth rendezvous
//! - `plot` builds plots and injects camera uniforms
//! - `scene` builds scene trees
//! - `teardown` deletes plots and scenes and releases their resources

pub mod attributes;
pub mod plot;
pub mod scene;
pub mod teardown;
pub mod textures;
pub mod uniforms;
