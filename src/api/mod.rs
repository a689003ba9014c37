//! PokeAPI gateway: transport client, wire schemas, domain records, and the
//! cached composite client layered on top.

pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod types;
