#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wxpay_v2::{Endpoints, PayClient, PayConfig, TransportError, UnifiedOrderParams, XmlTransport};

pub const APP_ID: &str = "wx016b7f8177b8a007";
pub const MCH_ID: &str = "1900000109";
pub const API_KEY: &str = "1ebbd6188e79ed64fc2c4f957a988a5b";
pub const NOTIFY_URL: &str = "https://example.com/api/webhooks/wxpay";

/// 按顺序返回预设响应并记录每次请求的测试传输
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: &str) -> Self {
        self.push(Ok(body.as_bytes().to_vec()))
    }

    pub fn fail(self, status: u16) -> Self {
        self.push(Err(TransportError::Status {
            status,
            body: "unavailable".to_string(),
        }))
    }

    fn push(self, response: Result<Vec<u8>, TransportError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl XmlTransport for RecordingTransport {
    async fn post_xml(&self, url: &str, body: String) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().unwrap().push((url.to_string(), body));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Status {
                    status: 599,
                    body: "no scripted response".to_string(),
                })
            })
    }
}

pub fn test_endpoints() -> Endpoints {
    Endpoints {
        unified_order: "http://primary.test/pay/unifiedorder".to_string(),
        order_query: "http://primary.test/pay/orderquery".to_string(),
        order_query_backup: "http://backup.test/pay/orderquery".to_string(),
        close_order: "http://primary.test/pay/closeorder".to_string(),
    }
}

pub fn test_config() -> PayConfig {
    PayConfig::new(APP_ID, MCH_ID, API_KEY, NOTIFY_URL).with_endpoints(test_endpoints())
}

pub fn recording_client(
    config: PayConfig,
    transport: RecordingTransport,
) -> (PayClient<RecordingTransport>, Arc<RecordingTransport>) {
    let transport = Arc::new(transport);
    (PayClient::new(Arc::new(config), transport.clone()), transport)
}

pub fn order_params() -> UnifiedOrderParams {
    UnifiedOrderParams {
        total_fee: "101".to_string(),
        create_ip: "127.0.0.1".to_string(),
        body: "test goods".to_string(),
        fee_type: "CNY".to_string(),
        out_trade_no: "ORDER123".to_string(),
        openid: "oUpF8uMuAJO_M2pxb1Q9zNjWeS6o".to_string(),
        notify_url: String::new(),
    }
}

pub fn prepay_success() -> String {
    r#"<xml>
        <return_code><![CDATA[SUCCESS]]></return_code>
        <return_msg><![CDATA[OK]]></return_msg>
        <appid><![CDATA[wx016b7f8177b8a007]]></appid>
        <mch_id><![CDATA[1900000109]]></mch_id>
        <nonce_str><![CDATA[IITRi8Iabbblz1Jc]]></nonce_str>
        <sign><![CDATA[7921E432F65EB8ED0CE9755F0E86D72F]]></sign>
        <result_code><![CDATA[SUCCESS]]></result_code>
        <prepay_id><![CDATA[wx11013410710840fc916cf5a91113520800]]></prepay_id>
        <trade_type><![CDATA[JSAPI]]></trade_type>
    </xml>"#
        .to_string()
}

pub fn query_success(trade_state: &str) -> String {
    format!(
        r#"<xml>
        <return_code><![CDATA[SUCCESS]]></return_code>
        <return_msg><![CDATA[OK]]></return_msg>
        <appid><![CDATA[wx016b7f8177b8a007]]></appid>
        <mch_id><![CDATA[1900000109]]></mch_id>
        <nonce_str><![CDATA[ZIWr6e0pCcCgu3Sa]]></nonce_str>
        <sign><![CDATA[A1B2C3]]></sign>
        <result_code><![CDATA[SUCCESS]]></result_code>
        <openid><![CDATA[oUpF8uMuAJO_M2pxb1Q9zNjWeS6o]]></openid>
        <is_subscribe><![CDATA[N]]></is_subscribe>
        <trade_type><![CDATA[JSAPI]]></trade_type>
        <bank_type><![CDATA[CMC]]></bank_type>
        <total_fee>101</total_fee>
        <fee_type><![CDATA[CNY]]></fee_type>
        <cash_fee>101</cash_fee>
        <transaction_id><![CDATA[1004400740201409030005092168]]></transaction_id>
        <out_trade_no><![CDATA[ORDER123]]></out_trade_no>
        <trade_state><![CDATA[{trade_state}]]></trade_state>
        <trade_state_desc><![CDATA[ok]]></trade_state_desc>
        <time_end><![CDATA[20190811013410]]></time_end>
    </xml>"#
    )
}

pub fn business_failure(err_code: &str, err_code_des: &str) -> String {
    format!(
        "<xml><return_code><![CDATA[SUCCESS]]></return_code>\
         <return_msg><![CDATA[OK]]></return_msg>\
         <result_code><![CDATA[FAIL]]></result_code>\
         <err_code><![CDATA[{err_code}]]></err_code>\
         <err_code_des><![CDATA[{err_code_des}]]></err_code_des></xml>"
    )
}

pub fn communication_failure() -> String {
    "<xml><return_code><![CDATA[FAIL]]></return_code>\
     <return_msg><![CDATA[invalid sign]]></return_msg></xml>"
        .to_string()
}
