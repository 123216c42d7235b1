//! Utilities module
//!
//! Contains error handling, logging helpers and the fix cache

pub mod error;
pub mod fix_cache;
pub mod logging;
