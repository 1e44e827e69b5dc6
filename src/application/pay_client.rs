use crate::domain::errors::{PayError, PayResult};
use crate::domain::{JsapiParams, OrderRef, UnifiedOrderParams};
use crate::infrastructure::adapters::ReqwestTransport;
use crate::infrastructure::config::PayConfig;
use crate::infrastructure::envelope::{
    self, CloseOrderRequest, CloseOrderResult, GatewayEnvelope, OrderQueryRequest,
    OrderQueryResult, SUCCESS, UnifiedOrderRequest, UnifiedOrderResult,
};
use crate::infrastructure::signer::{self, SignPayload};
use crate::ports::XmlTransport;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const TRADE_TYPE_JSAPI: &str = "JSAPI";

/// 微信支付客户端
///
/// 商户配置在构造后不可变，可在多个并发请求间共享。
pub struct PayClient<T: XmlTransport> {
    config: Arc<PayConfig>,
    transport: Arc<T>,
}

impl<T: XmlTransport> Clone for PayClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl PayClient<ReqwestTransport> {
    /// 使用 reqwest 传输创建客户端
    pub fn from_config(config: Arc<PayConfig>) -> PayResult<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }
}

impl<T: XmlTransport> PayClient<T> {
    pub fn new(config: Arc<PayConfig>, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &PayConfig {
        &self.config
    }

    /// 请求中的 sign_type 字段，MD5 时省略
    fn sign_type_field(&self) -> String {
        if self.config.sign_type.is_default() {
            String::new()
        } else {
            self.config.sign_type.as_str().to_string()
        }
    }

    fn sign(&self, payload: &SignPayload) -> PayResult<(String, String)> {
        let canonical = payload.canonical();
        let sign = signer::sign(&canonical, &self.config.api_key, self.config.sign_type)?;
        debug!("Sign string: {} sign: {}", canonical, sign);
        Ok((canonical, sign))
    }

    /// 统一下单，返回 prepay_id
    pub async fn prepay_id(&self, params: &UnifiedOrderParams) -> PayResult<String> {
        info!("Requesting prepay id for order: {}", params.out_trade_no);

        let nonce_str = signer::nonce_str();
        let sign_type = self.sign_type_field();
        let notify_url = if params.notify_url.is_empty() {
            self.config.notify_url.clone()
        } else {
            params.notify_url.clone()
        };

        let payload = SignPayload::new()
            .field("appid", self.config.app_id.as_str())
            .field("body", params.body.as_str())
            .field("fee_type", params.fee_type.as_str())
            .field("mch_id", self.config.mch_id.as_str())
            .field("nonce_str", nonce_str.as_str())
            .field("notify_url", notify_url.as_str())
            .field("openid", params.openid.as_str())
            .field("out_trade_no", params.out_trade_no.as_str())
            .field("sign_type", sign_type.as_str())
            .field("spbill_create_ip", params.create_ip.as_str())
            .field("total_fee", params.total_fee.as_str())
            .field("trade_type", TRADE_TYPE_JSAPI);
        let (canonical, sign) = self.sign(&payload)?;

        let request = UnifiedOrderRequest {
            appid: self.config.app_id.clone(),
            mch_id: self.config.mch_id.clone(),
            nonce_str,
            sign: sign.clone(),
            sign_type,
            body: params.body.clone(),
            out_trade_no: params.out_trade_no.clone(),
            fee_type: params.fee_type.clone(),
            total_fee: params.total_fee.clone(),
            spbill_create_ip: params.create_ip.clone(),
            notify_url,
            trade_type: TRADE_TYPE_JSAPI.to_string(),
            openid: params.openid.clone(),
        };

        let raw = self
            .transport
            .post_xml(&self.config.endpoints.unified_order, envelope::to_xml(&request)?)
            .await?;

        let result: UnifiedOrderResult = validate_envelope(&raw, &canonical, &sign)?;
        info!("Prepay id created for order: {}", params.out_trade_no);
        Ok(result.prepay_id)
    }

    /// 统一下单并生成 JSAPI 调起支付参数
    pub async fn jsapi_params(&self, params: &UnifiedOrderParams) -> PayResult<JsapiParams> {
        let prepay_id = self.prepay_id(params).await?;
        build_jsapi_params(
            &self.config,
            &prepay_id,
            &signer::nonce_str(),
            chrono::Utc::now().timestamp(),
        )
    }

    /// 按商户订单号查询订单，交易状态需调用方自行判断
    pub async fn order_query(&self, out_trade_no: &str) -> PayResult<OrderQueryResult> {
        self.query(OrderRef::OutTradeNo(out_trade_no.to_string()))
            .await
    }

    /// 按微信订单号查询订单
    pub async fn order_query_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> PayResult<OrderQueryResult> {
        self.query(OrderRef::TransactionId(transaction_id.to_string()))
            .await
    }

    /// 查询订单
    ///
    /// 主域名传输失败时，以同一请求体向备用域名重试一次；业务失败不重试。
    pub async fn query(&self, order: OrderRef) -> PayResult<OrderQueryResult> {
        info!("Querying order by {}: {}", order.field_name(), order.value());

        let nonce_str = signer::nonce_str();
        let sign_type = self.sign_type_field();

        let base = SignPayload::new()
            .field("appid", self.config.app_id.as_str())
            .field("mch_id", self.config.mch_id.as_str())
            .field("nonce_str", nonce_str.as_str());
        let payload = match &order {
            OrderRef::OutTradeNo(no) => base
                .field("out_trade_no", no.as_str())
                .field("sign_type", sign_type.as_str()),
            OrderRef::TransactionId(id) => base
                .field("sign_type", sign_type.as_str())
                .field("transaction_id", id.as_str()),
        };
        let (canonical, sign) = self.sign(&payload)?;

        let mut request = OrderQueryRequest {
            appid: self.config.app_id.clone(),
            mch_id: self.config.mch_id.clone(),
            nonce_str,
            sign: sign.clone(),
            sign_type,
            ..Default::default()
        };
        match order {
            OrderRef::OutTradeNo(no) => request.out_trade_no = no,
            OrderRef::TransactionId(id) => request.transaction_id = id,
        }
        let body = envelope::to_xml(&request)?;

        let endpoints = &self.config.endpoints;
        let raw = match self
            .transport
            .post_xml(&endpoints.order_query, body.clone())
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Order query via {} failed, retrying {}: {}",
                    endpoints.order_query, endpoints.order_query_backup, e
                );
                self.transport
                    .post_xml(&endpoints.order_query_backup, body)
                    .await?
            }
        };

        validate_envelope(&raw, &canonical, &sign)
    }

    /// 关闭订单
    pub async fn close_order(&self, out_trade_no: &str) -> PayResult<CloseOrderResult> {
        info!("Closing order: {}", out_trade_no);

        let nonce_str = signer::nonce_str();
        let sign_type = self.sign_type_field();
        let payload = SignPayload::new()
            .field("appid", self.config.app_id.as_str())
            .field("mch_id", self.config.mch_id.as_str())
            .field("nonce_str", nonce_str.as_str())
            .field("out_trade_no", out_trade_no)
            .field("sign_type", sign_type.as_str());
        let (canonical, sign) = self.sign(&payload)?;

        let request = CloseOrderRequest {
            appid: self.config.app_id.clone(),
            mch_id: self.config.mch_id.clone(),
            out_trade_no: out_trade_no.to_string(),
            nonce_str,
            sign: sign.clone(),
            sign_type,
        };

        let raw = self
            .transport
            .post_xml(&self.config.endpoints.close_order, envelope::to_xml(&request)?)
            .await?;

        validate_envelope(&raw, &canonical, &sign)
    }

    /// 解码支付结果通知
    ///
    /// 失败时只返回对应的状态码，不附带原文。
    pub fn parse_notification(&self, body: &[u8]) -> PayResult<OrderQueryResult> {
        let result: OrderQueryResult = envelope::from_xml(body)?;

        if result.return_code != SUCCESS {
            error!("Notification return_code: {}", result.return_code);
            return Err(PayError::NotifyReturn(result.return_code));
        }
        if result.result_code != SUCCESS {
            error!("Notification result_code: {}", result.result_code);
            return Err(PayError::NotifyResult(result.result_code));
        }

        info!(
            "Payment notification received for order: {}",
            result.out_trade_no
        );
        Ok(result)
    }

    /// 校验支付通知签名，防止伪造通知
    ///
    /// openid、total_fee、out_trade_no 取自下单参数而非通知本身。
    pub fn verify_notification_sign(
        &self,
        result: &OrderQueryResult,
        params: &UnifiedOrderParams,
    ) -> PayResult<()> {
        let cash_fee = result.cash_fee.unwrap_or_default().to_string();
        let fragments: Vec<String> = [
            ("appid", self.config.app_id.as_str()),
            ("mch_id", self.config.mch_id.as_str()),
            ("result_code", result.result_code.as_str()),
            ("openid", params.openid.as_str()),
            ("is_subscribe", result.is_subscribe.as_str()),
            ("trade_type", result.trade_type.as_str()),
            ("bank_type", result.bank_type.as_str()),
            ("total_fee", params.total_fee.as_str()),
            ("cash_fee", cash_fee.as_str()),
            ("transaction_id", result.transaction_id.as_str()),
            ("out_trade_no", params.out_trade_no.as_str()),
            ("time_end", result.time_end.as_str()),
            ("return_code", result.return_code.as_str()),
            ("return_msg", result.return_msg.as_str()),
            ("nonce_str", result.nonce_str.as_str()),
        ]
        .iter()
        .map(|(name, value)| format!("{}={}&", name, value))
        .collect();

        let sign = signer::sign_sorted(fragments, &self.config.api_key, self.config.sign_type)?;
        if sign == result.sign {
            return Ok(());
        }

        warn!(
            "Notification signature mismatch for order: {}",
            params.out_trade_no
        );
        Err(PayError::SignatureMismatch)
    }
}

/// 由 prepay_id 生成 JSAPI 调起支付参数
pub fn build_jsapi_params(
    config: &PayConfig,
    prepay_id: &str,
    nonce_str: &str,
    timestamp: i64,
) -> PayResult<JsapiParams> {
    let package = format!("prepay_id={}", prepay_id);
    let sign_type = config.sign_type.as_str();
    let time_stamp = timestamp.to_string();

    let canonical = SignPayload::new()
        .field("appId", config.app_id.as_str())
        .field("nonceStr", nonce_str)
        .field("package", package.as_str())
        .field("signType", sign_type)
        .field("timeStamp", time_stamp.as_str())
        .canonical();
    let pay_sign = signer::sign(&canonical, &config.api_key, config.sign_type)?;

    Ok(JsapiParams {
        app_id: config.app_id.clone(),
        time_stamp,
        nonce_str: nonce_str.to_string(),
        package,
        sign_type: sign_type.to_string(),
        pay_sign,
    })
}

/// 解析并校验网关返回
///
/// 先判断通信标识 return_code，再判断业务结果 result_code；
/// `signed` 与 `sign` 仅用于错误信息。
pub fn validate_envelope<R>(raw: &[u8], signed: &str, sign: &str) -> PayResult<R>
where
    R: GatewayEnvelope + DeserializeOwned,
{
    let result: R = envelope::from_xml(raw)?;

    if result.return_code() != SUCCESS {
        error!("Gateway return_code: {}", result.return_code());
        return Err(PayError::Communication {
            raw: String::from_utf8_lossy(raw).into_owned(),
            signed: signed.to_string(),
            sign: sign.to_string(),
        });
    }

    if result.result_code() != SUCCESS {
        error!(
            "Gateway result_code: {} err_code: {}",
            result.result_code(),
            result.err_code()
        );
        return Err(PayError::Business {
            err_code: result.err_code().to_string(),
            err_code_des: result.err_code_des().to_string(),
        });
    }

    Ok(result)
}
