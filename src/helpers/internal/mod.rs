//! Internal utility modules
//!
//! Shared functionality used by the acquire, extract and stage helpers.

pub mod fs_utils;
pub mod progress;
pub mod url_utils;
