//! Playlist transfer library - shared modules for all binaries.

pub mod config;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod progress;
pub mod safety;
pub mod scoring;
pub mod spotify;
pub mod transfer;
pub mod youtube;

#[cfg(test)]
mod testing;
