//! Remote API plumbing: transport abstraction and envelope decoding.

pub mod envelope;
mod transport;

pub use transport::{ApiMethod, ApiRequest, HttpTransport, Transport};
