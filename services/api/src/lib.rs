//! Voicebridge API Library Crate
//!
//! This library contains all the core logic for the media-room to
//! voice-agent bridge service: the application state, call session
//! management, API handlers and routing. The `api` binary is a thin
//! wrapper around this library.

pub mod call;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
