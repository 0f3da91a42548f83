//! Renderers for published snapshots.
//!
//! # Submodules
//!
//! - [`json`]: Exports a [`Snapshot`](crate::models::Snapshot) to `latest.json`
//! - [`html`]: Renders the front page served at `/`

pub mod html;
pub mod json;
