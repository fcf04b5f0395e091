//! Session-scoped state carried between requests.

pub mod flash;

pub use flash::{FlashBag, FlashMessage, MessageKind};
