pub mod adapters;
pub mod config;
pub mod envelope;
pub mod signer;

pub use adapters::ReqwestTransport;
pub use config::{Endpoints, PayConfig};
