//! Data-access layer for a video production studio's portfolio site and
//! back-office.
//!
//! The crate mediates between UI-style consumers and a remote document
//! store: results are cached in-process with a freshness window, remote
//! calls run under a deadline, failures degrade to stale cached data, and a
//! single retry covers the nothing-cached case. A poll-based
//! [`query::UiQuery`] exposes the data/loading/error view-state a rendering
//! layer consumes, and [`catalog`] provides the typed portfolio operations
//! built on top.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod remote;
