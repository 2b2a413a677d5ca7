//! User-visible notification seam.
//!
//! Connection failures, authorization rejections and local send errors
//! surface as non-blocking notices. The host application decides how to
//! render them (typically a toast); nothing here halts the application.

/// How prominently the host should surface a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational, e.g. reconnected.
    Info,
    /// Transient degradation, e.g. connection lost and retrying.
    Warning,
    /// Requires user attention, e.g. unauthorized or send failure.
    Error,
}

/// A single user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Display severity.
    pub severity: Severity,
    /// Human-readable text.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Warning notice.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Host-side notification seam.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Surface a notice to the user. Must not block.
    fn notify(&self, notice: Notice);
}

/// Notifier that forwards notices to `tracing`.
///
/// The default choice for headless hosts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!("{}", notice.message),
            Severity::Warning => tracing::warn!("{}", notice.message),
            Severity::Error => tracing::error!("{}", notice.message),
        }
    }
}
