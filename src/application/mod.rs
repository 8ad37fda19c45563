//! Application layer - Use cases that coordinate the locators, the installer
//! and the package registry.
//!
//! Commands build these from a [`Config`](crate::commands::config::Config)
//! and only deal with presentation.

mod get;
mod list;
mod show;

pub use get::{GetUseCase, Installed};
pub use list::ListAction;
pub use show::ShowAction;
