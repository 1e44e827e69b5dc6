pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::{JsapiParams, OrderRef, UnifiedOrderParams};
pub use errors::{PayError, PayResult, TransportError};
pub use value_objects::{SignType, TradeState};
