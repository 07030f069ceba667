//! pilview: a small image viewer that can blur the current image and ask
//! a similarity-search service for look-alikes.
//!
//! The binary in `main.rs` is only the iced shell; everything it drives
//! lives here so it can be tested without a window.

pub mod config;
pub mod error;
pub mod imaging;
pub mod query;
pub mod state;
pub mod ui;
