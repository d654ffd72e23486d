pub mod error;
pub mod html;
pub mod mail;
pub mod pipeline;

pub use error::{MailError, ReportError};
pub use html::render_report;
pub use mail::{build_message, subject_for, MailEnvelope, MailTransport, SmtpMailer};
pub use pipeline::{run_daily_report, RunOptions, RunSummary};
