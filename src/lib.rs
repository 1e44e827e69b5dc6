//! 微信支付 V2（XML）商户接口客户端
//!
//! 统一下单、JSAPI 调起参数、订单查询、关闭订单、支付结果通知解析与签名校验。

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{NotifyReply, PayClient};
pub use domain::{
    JsapiParams, OrderRef, PayError, PayResult, SignType, TradeState, TransportError,
    UnifiedOrderParams,
};
pub use infrastructure::envelope::{CloseOrderResult, OrderQueryResult};
pub use infrastructure::{Endpoints, PayConfig, ReqwestTransport};
pub use ports::XmlTransport;
