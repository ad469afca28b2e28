//! Output module
//!
//! Response panel, notifications and suite result formatting.

mod formatter;
mod notify;
mod presenter;

pub use formatter::{export_summary, save_response, ExportFormat, OutputFormat, ResultFormatter};
pub use notify::Notifier;
pub use presenter::{status_text, NullSink, ResponsePresenter, ResponseSink};

#[cfg(test)]
pub use presenter::RecordingSink;
