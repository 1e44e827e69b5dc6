use crate::domain::errors::{PayError, PayResult};
use crate::domain::value_objects::TradeState;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub const SUCCESS: &str = "SUCCESS";

const ROOT: &str = "xml";
const TIME_END_FORMAT: &str = "%Y%m%d%H%M%S";

/// 网关响应公共部分：通信标识与业务结果
pub trait GatewayEnvelope {
    fn return_code(&self) -> &str;
    fn result_code(&self) -> &str;
    fn err_code(&self) -> &str;
    fn err_code_des(&self) -> &str;
}

macro_rules! impl_gateway_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl GatewayEnvelope for $ty {
                fn return_code(&self) -> &str {
                    &self.return_code
                }
                fn result_code(&self) -> &str {
                    &self.result_code
                }
                fn err_code(&self) -> &str {
                    &self.err_code
                }
                fn err_code_des(&self) -> &str {
                    &self.err_code_des
                }
            }
        )+
    };
}

/// 序列化为 `<xml>...</xml>` 请求体
pub fn to_xml<T: Serialize>(value: &T) -> PayResult<String> {
    quick_xml::se::to_string_with_root(ROOT, value).map_err(|e| PayError::Encode(e.to_string()))
}

/// 解析网关返回的 XML
pub fn from_xml<T: DeserializeOwned>(raw: &[u8]) -> PayResult<T> {
    quick_xml::de::from_str(&String::from_utf8_lossy(raw)).map_err(|e| PayError::Decode(e.to_string()))
}

/// 金额类字段：空元素按未返回处理
fn optional_fee<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse().map(Some).map_err(serde::de::Error::custom)
}

/// 统一下单请求
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnifiedOrderRequest {
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sign_type: String,
    pub body: String,
    /// 商户订单号
    pub out_trade_no: String,
    /// 标价币种
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fee_type: String,
    /// 标价金额
    pub total_fee: String,
    /// 终端IP
    pub spbill_create_ip: String,
    /// 通知地址
    pub notify_url: String,
    /// 交易类型
    pub trade_type: String,
    /// 用户标识
    #[serde(skip_serializing_if = "String::is_empty")]
    pub openid: String,
}

/// 统一下单返回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifiedOrderResult {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub result_code: String,
    pub trade_type: String,
    pub prepay_id: String,
    pub code_url: String,
    pub err_code: String,
    pub err_code_des: String,
}

/// 查询订单请求，transaction_id 与 out_trade_no 二选一
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderQueryRequest {
    pub appid: String,
    pub mch_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transaction_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub out_trade_no: String,
    pub nonce_str: String,
    pub sign: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sign_type: String,
}

/// 查询订单返回，同时用于支付结果通知
///
/// 代金券明细（coupon_type_$n 等）暂不解析。交易是否成功需调用方自行判断 `trade_state`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderQueryResult {
    /// 通信标识，非交易标识
    pub return_code: String,
    pub return_msg: String,

    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub result_code: String,
    pub err_code: String,
    pub err_code_des: String,

    pub trade_state: String,

    pub device_info: String,
    pub openid: String,
    /// 是否关注公众账号
    pub is_subscribe: String,
    pub trade_type: String,
    /// 付款银行
    pub bank_type: String,
    #[serde(deserialize_with = "optional_fee")]
    pub total_fee: Option<i64>,
    /// 应结订单金额
    #[serde(deserialize_with = "optional_fee")]
    pub settlement_total_fee: Option<i64>,
    pub fee_type: String,
    /// 现金支付金额
    #[serde(deserialize_with = "optional_fee")]
    pub cash_fee: Option<i64>,
    pub cash_fee_type: String,
    #[serde(deserialize_with = "optional_fee")]
    pub coupon_fee: Option<i64>,
    #[serde(deserialize_with = "optional_fee")]
    pub coupon_count: Option<i64>,
    pub transaction_id: String,
    pub out_trade_no: String,
    /// 附加数据，原样返回
    pub attach: String,
    pub trade_state_desc: String,
    /// 支付完成时间，yyyyMMddHHmmss
    pub time_end: String,
}

impl OrderQueryResult {
    /// 解析交易状态；支付通知中不带 trade_state 时返回 None
    pub fn trade_state(&self) -> Option<TradeState> {
        self.trade_state.parse().ok()
    }

    /// 支付完成时间（北京时间）
    pub fn paid_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time_end, TIME_END_FORMAT).ok()
    }
}

/// 关闭订单请求
#[derive(Debug, Clone, Default, Serialize)]
pub struct CloseOrderRequest {
    pub appid: String,
    pub mch_id: String,
    pub out_trade_no: String,
    pub nonce_str: String,
    pub sign: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sign_type: String,
}

/// 关闭订单返回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseOrderResult {
    pub return_code: String,
    pub return_msg: String,
    pub appid: String,
    pub mch_id: String,
    pub nonce_str: String,
    pub sign: String,
    pub result_code: String,
    pub result_msg: String,
    pub err_code: String,
    pub err_code_des: String,
}

impl_gateway_envelope!(UnifiedOrderResult, OrderQueryResult, CloseOrderResult);
