//! Small helper macros shared across modules.

pub mod macros;
