//! A NameDrop backed implementation of generic DNS record management.
//!
//! [`NamedropProvider`] implements the four record capabilities
//! ([`RecordGetter`], [`RecordAppender`], [`RecordSetter`] and
//! [`RecordDeleter`]) by posting JSON envelopes to a NameDrop server.

pub mod dns;

pub use dns::namedrop::{NamedropError, NamedropProvider, DEFAULT_SERVER_URI};
pub use dns::wire::TtlMode;
pub use dns::{Record, RecordAppender, RecordDeleter, RecordGetter, RecordSetter};
