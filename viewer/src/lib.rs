//! Client runtime for the swarm patrol viewer.
//!
//! Fetches the backend's overlay datasets on a fixed schedule and feeds
//! them to the synchronization core. Each dataset kind is fetched
//! independently per tick; a failing kind never delays or corrupts the
//! others.

pub mod ascii;
pub mod fetch;
pub mod sync;
