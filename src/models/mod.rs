//! Data models for the Cookio recipe catalog.
//!
//! Stored aggregates are kept separate from the shapes sent to clients.

mod recipe;
mod reference;
mod user;

pub use recipe::*;
pub use reference::*;
pub use user::*;
