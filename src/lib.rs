//! Doc Finder - conversational document search.
//!
//! A chat endpoint backed by a model that can call a `searchDocuments` tool.
//! The tool queries an enterprise search engine and returns time-limited
//! download links for the matching files.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
