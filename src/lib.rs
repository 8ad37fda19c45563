pub mod application;
pub mod archive;
pub mod cleanup;
pub mod commands;
pub mod error;
pub mod http;
pub mod identifier;
pub mod install;
pub mod locator;
pub mod package;
pub mod runtime;
