// Library entry point for the CLI and integration tests

pub mod api;
pub mod auth;
pub mod config;
pub mod navigation;
pub mod stores;
pub mod types;

#[cfg(test)]
mod testutil;
