//! Clients for the external data providers and their on-disk caches.

pub mod cache;
pub mod universalis;
pub mod xivapi;
