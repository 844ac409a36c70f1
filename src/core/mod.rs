//! Core types: descriptors, layouts, recipes, errors, locking and output

pub mod descriptor;
pub mod error;
pub mod layout;
pub mod lock;
pub mod output;
pub mod recipe;
pub mod version;
