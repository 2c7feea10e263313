//! # lectern-core
//!
//! Foundation types and utilities for the lectern transcript search agent.
//!
//! This crate provides the shared vocabulary the other lectern crates depend on:
//!
//! - **Entries**: [`entry::Entry`], [`entry::SessionKind`], session aggregates
//! - **Search**: [`search::SearchQuery`], [`search::SearchResult`], term modes and filters
//! - **Keywords**: [`keywords::extract`] stop-word removal and heuristic stemming
//! - **Messages**: [`messages::ChatMessage`] conversation roles, [`messages::FinalAnswer`]
//! - **Tools**: [`tools::ToolDefinition`] JSON-schema declarations for the completion endpoint
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `lectern-store` and `lectern-runtime`.

#![deny(unsafe_code)]

pub mod entry;
pub mod keywords;
pub mod messages;
pub mod search;
pub mod tools;
