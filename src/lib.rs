pub mod annotations;
pub mod element;
pub mod emitter;
pub mod error;
pub mod import;
pub mod runtime;
pub mod sources;
pub mod types;
pub mod urn;
