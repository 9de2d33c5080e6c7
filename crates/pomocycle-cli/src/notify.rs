//! Cross-platform native desktop notifications
//!
//! Uses notify-rust for native notifications on macOS, Linux, and BSD.

use notify_rust::{Notification, Timeout};

/// Send a desktop notification without blocking the caller.
///
/// Delivery failures are logged at debug level and otherwise ignored.
pub fn send(title: &str, message: &str, timeout_ms: u32) {
    let title = title.to_string();
    let message = message.to_string();

    std::thread::spawn(move || {
        if let Err(e) = Notification::new()
            .summary(&title)
            .body(&message)
            .timeout(Timeout::Milliseconds(timeout_ms))
            .show()
        {
            tracing::debug!("desktop notification failed: {e}");
        }
    });
}
