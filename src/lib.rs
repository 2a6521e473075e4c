//! Loader for NIMA binary scene and animation documents.
//!
//! [`nima::decode_document`] decodes the synchronous sections of a document;
//! [`nima::ActorLoader`] additionally resolves texture atlases and nested actors.

pub mod nima;
