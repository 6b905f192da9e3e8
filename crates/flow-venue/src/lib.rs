//! flow-venue
//!
//! The engine's only external collaborator, seen through one trait:
//!
//! - [`client`]     : the `VenueClient` trait and its request/ack types
//! - [`http`]       : REST client against the venue order API
//! - [`memory`]     : in-process venue for dry runs and tests
//! - [`wire_types`] : JSON bodies, decimals as strings

pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod wire_types;

pub use client::{CancelAck, CreateOrder, VenueClient};
pub use error::VenueError;
pub use http::HttpVenueClient;
pub use memory::InMemoryVenue;
