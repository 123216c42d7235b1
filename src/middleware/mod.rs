//! HTTP middleware module

pub mod auth;
pub mod logging;
