use serde::{Deserialize, Serialize};

/// 统一下单参数，生成 prepay_id 所必需
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnifiedOrderParams {
    /// 订单总金额，单位为分
    pub total_fee: String,

    /// 客户端IP，支持IPV6
    pub create_ip: String,

    /// 商品描述
    pub body: String,

    /// 标价币种，ISO 4217 三位字母代码；为空时网关按 CNY 处理
    pub fee_type: String,

    /// 商户订单号，同一商户号下唯一
    pub out_trade_no: String,

    /// 用户标识
    pub openid: String,

    /// 通知地址；为空时使用商户配置中的地址
    pub notify_url: String,
}

/// 订单查询标识，微信订单号与商户订单号二选一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    OutTradeNo(String),
    TransactionId(String),
}

impl OrderRef {
    pub fn field_name(&self) -> &'static str {
        match self {
            OrderRef::OutTradeNo(_) => "out_trade_no",
            OrderRef::TransactionId(_) => "transaction_id",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            OrderRef::OutTradeNo(v) | OrderRef::TransactionId(v) => v,
        }
    }
}

/// JSAPI 调起支付参数，交给前端使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsapiParams {
    pub app_id: String,
    pub time_stamp: String,
    pub nonce_str: String,
    pub package: String,
    pub sign_type: String,
    pub pay_sign: String,
}
