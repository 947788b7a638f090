//! LedFx scene API
//!
//! - `PUT /api/scenes` with `{"id": ..., "action": "activate" | "deactivate"}`
//! - `GET /api/scenes` to list the configured scenes

pub mod client;
pub mod error;
pub mod models;

pub use client::LedFxClient;
pub use error::LedFxError;
pub use models::{SceneInfo, SceneRequest, ScenesResponse};
