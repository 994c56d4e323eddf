//! Guarded actions, state predicates and explicit waits, as `impl Engine`
//! blocks grouped by concern.

pub mod click;
pub mod dialog;
pub mod keyboard;
pub mod navigate;
pub mod scroll;
pub mod select;
pub mod state;
pub mod wait;

pub use wait::Condition;
