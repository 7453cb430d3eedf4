//! Ingestion and navigation logic for ironbar-docs.
//!
//! This crate ties together the upstream source, the schema model and the
//! markdown pipeline into the `ingest` workflow, and builds per-request
//! navigation (sidebar, table of contents, edit link) from its output.

pub mod catalog;
pub mod ingest;
pub mod properties;
pub mod route;
pub mod sidebar;
pub mod toc;
