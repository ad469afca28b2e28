//! User-facing notifications
//!
//! Every notification is echoed to the debug log as well.

use std::fmt;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
            NotificationKind::Warning => "⚠",
            NotificationKind::Info => "ℹ",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            NotificationKind::Success => "Success",
            NotificationKind::Error => "Error",
            NotificationKind::Warning => "Warning",
            NotificationKind::Info => "Info",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            NotificationKind::Success => "\x1b[32m",
            NotificationKind::Error => "\x1b[31m",
            NotificationKind::Warning => "\x1b[33m",
            NotificationKind::Info => "\x1b[36m",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_title())
    }
}

/// Prints notifications to stderr
#[derive(Clone, Debug)]
pub struct Notifier {
    colorize: bool,
    quiet: bool,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            colorize: true,
            quiet: false,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Log only; nothing is printed
    #[cfg(test)]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn render(&self, kind: NotificationKind, title: Option<&str>, message: &str) -> String {
        let title = title.unwrap_or(kind.default_title());
        if self.colorize {
            format!("{}{} {title}\x1b[0m: {message}", kind.color(), kind.symbol())
        } else {
            format!("{} {title}: {message}", kind.symbol())
        }
    }

    pub fn notify(&self, kind: NotificationKind, title: Option<&str>, message: &str) {
        let title_text = title.unwrap_or(kind.default_title());
        match kind {
            NotificationKind::Error => error!("Notification: {} - {}", title_text, message),
            NotificationKind::Warning => warn!("Notification: {} - {}", title_text, message),
            _ => info!("Notification: {} - {}", title_text, message),
        }

        if !self.quiet {
            eprintln!("{}", self.render(kind, title, message));
        }
    }

    pub fn success(&self, message: &str) {
        self.notify(NotificationKind::Success, None, message);
    }

    pub fn error(&self, message: &str) {
        self.notify(NotificationKind::Error, None, message);
    }

    pub fn warning(&self, message: &str) {
        self.notify(NotificationKind::Warning, None, message);
    }

    pub fn info(&self, message: &str) {
        self.notify(NotificationKind::Info, None, message);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
