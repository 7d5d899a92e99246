//! Version-check decision engine
//!
//! Decides whether the running app is older than the minimum version
//! published in a remote manifest and how the user should be told.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Scheduler  │────▶│   Fetcher   │────▶│  Manifest   │────▶│    Alert    │
//! │   (gate)    │     │   (HTTP)    │     │ (evaluate)  │     │  (policy)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │                   │
//!        ▼                                       ▼                   ▼
//! ┌─────────────┐                         ┌─────────────┐     ┌─────────────┐
//! │    Store    │◀────────────────────────│    Skip     │     │  Presenter  │
//! │  (sqlite)   │                         │  registry   │     │  Listener   │
//! └─────────────┘                         └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`checker`]: Context object that runs a check end to end
//! - [`schedule`]: Check frequency policy
//! - [`fetcher`]: Fetcher trait and HTTP implementation
//! - [`manifest`]: Manifest parsing and the update decision
//! - [`vector`]: Dotted numeric versions
//! - [`alert`]: Severity to directive mapping
//! - [`skip`]: "Skip this version" memory
//! - [`store`]: Persistent state trait and SQLite implementation
//! - [`event`]: Listener events
//! - [`presenter`]: Dialog rendering trait
//! - [`localizer`]: Prompt strings
//! - [`error`]: Error types

pub mod alert;
pub mod checker;
pub mod error;
pub mod event;
pub mod fetcher;
pub mod localizer;
pub mod manifest;
pub mod presenter;
pub mod schedule;
pub mod skip;
pub mod store;
pub mod vector;
