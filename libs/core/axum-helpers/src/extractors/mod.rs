//! Custom extractors for Axum handlers.
//!
//! Rejections render through [`AppError`](crate::errors::AppError) so every
//! client error shares the same JSON shape.

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
