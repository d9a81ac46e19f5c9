//! Producer and consumer services driving one session each.

mod consumer;
mod error;
mod producer;

pub use consumer::Consumer;
pub use error::{ErrorKind, MessagingError, MessagingResult};
pub use producer::Producer;
