//! Durable media storage
//!
//! Downloaded media is handed to a [`BlobSink`], which takes ownership of the
//! local file and returns an opaque reference stored on the post record.

mod filesystem;
mod traits;

pub use filesystem::{link_key, FilesystemBlobSink};
pub use traits::{BlobError, BlobResult, BlobSink};
