//! Mail composition and delivery.
//!
//! - `compose`: header block + HTML body as raw bytes
//! - `MailTransport`: delivery seam, with a lettre-backed SMTP implementation
//! - `MailDispatcher`: render → compose → send for one request

mod compose;
mod dispatcher;
mod transport;

pub use compose::compose;
pub use dispatcher::{DeliveryReceipt, MailDispatcher};
pub use transport::{parse_address, MailTransport, SmtpMailTransport, TransportError};
