//! Step helpers
//!
//! Each helper takes explicit inputs and returns explicit outputs; the
//! engine wires them into the `source` and `package` steps:
//!
//! - **acquire**: download(url, dest, transport)
//! - **extract**: extract(archive, dest, format)
//! - **stage**: select(dir, pattern), copy_selected(dir, files, dest)

pub mod acquire;
pub mod extract;
pub mod internal;
pub mod stage;
