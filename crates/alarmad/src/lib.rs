//! Alarm catalog engine.
//!
//! Loads heterogeneous catalog exports into immutable snapshots, serves
//! exact/fuzzy lookups over them, and drives the short menu conversation
//! that collects the two search keys. The transport layer (out of scope
//! here) only ever calls [`cache::CatalogCache`],
//! [`search::SearchEngine`] and [`conversation::ConversationEngine`].

pub mod cache;
pub mod config;
pub mod conversation;
pub mod loader;
pub mod search;
pub mod sessions;
