//! API Routes
//!
//! Route handlers organized by functionality.

pub mod extension;
pub mod health;
pub mod query;
pub mod translate;
