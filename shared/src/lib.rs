//! Shared types for the swarm patrol viewer.
//!
//! This crate contains the common vocabulary used by the overlay
//! synchronization core and the client runtime: geographic primitives,
//! overlay kinds, the backend wire formats, and viewer configuration.

pub mod config;
pub mod geo;
pub mod kind;
pub mod model;
pub mod wire;
