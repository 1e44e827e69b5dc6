pub mod notify;
pub mod pay_client;

pub use notify::NotifyReply;
pub use pay_client::{PayClient, build_jsapi_params, validate_envelope};
