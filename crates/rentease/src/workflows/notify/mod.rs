pub mod directory;
pub mod mailer;
pub mod router;
pub mod service;
pub mod sweep;
pub mod templates;

pub use directory::{DirectoryError, UserDirectory, UserProfile};
pub use mailer::{EmailMessage, MailError, Mailer};
pub use router::notifications_router;
pub use service::{NotificationService, NotifyError};
pub use sweep::{OverdueSweeper, SweepDispatch, SweepOutcome, SweepReport};
