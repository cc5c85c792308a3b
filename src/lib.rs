//! Capability evidence extraction and report composition
//!
//! Reads AI evaluation reports, extracts schema-validated capability evidence
//! with a generative model, and merges that evidence into a narrative report.

pub mod app;
pub mod cli;
pub mod document;
pub mod model;
pub mod service;
