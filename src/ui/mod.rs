/// User interface module
///
/// View helpers for the viewer window:
/// - The result strip under the image (results.rs)
/// - Toast notifications for errors and warnings (notifications.rs)

pub mod notifications;
pub mod results;
