/// State management module
///
/// This module handles all viewer state, including:
/// - The viewer session: current image, display handle, results (session.rs)
/// - Shared data structures rendered by the UI (data.rs)

pub mod data;
pub mod session;
