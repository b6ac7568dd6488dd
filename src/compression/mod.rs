//! Text compression: local size estimate or the hosted compression service.

pub mod compressor;
pub mod routes;

pub use compressor::{CompressionResult, Compressor, ConversationCompression};
