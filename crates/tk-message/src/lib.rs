//! `tk-message` — deferred per-tick inter-entity message bus (spec.md §4.K).
//!
//! # Crate layout
//!
//! | Module      | Contents                                         |
//! |-------------|---------------------------------------------------|
//! | [`envelope`]| `Envelope` — one posted message                   |
//! | [`bus`]     | `MessageBus` — staging + deferred delivery         |
//! | [`error`]   | `MessageError`, `MessageResult<T>`                 |

pub mod bus;
pub mod envelope;
pub mod error;

#[cfg(test)]
mod tests;

pub use bus::MessageBus;
pub use envelope::Envelope;
pub use error::{MessageError, MessageResult};
