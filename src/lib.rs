//! Workspace facade over `shellkit-core`, used by the integration tests in `tests/`.
pub use shellkit_core::*;
