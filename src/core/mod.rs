//! Wrapper core: configuration, the engine boundary layout, option-string
//! encoding, the [`Engine`](engine::Engine) marshaling state machine, and
//! hole detection.

pub mod config;
pub mod engine;
pub mod error;
pub(crate) mod holes;
pub mod io;
pub mod switches;
