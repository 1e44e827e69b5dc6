use crate::domain::errors::{PayError, PayResult};
use crate::domain::value_objects::SignType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_UNIFIED_ORDER_URL: &str = "https://api.mch.weixin.qq.com/pay/unifiedorder";
const DEFAULT_ORDER_QUERY_URL: &str = "https://api.mch.weixin.qq.com/pay/orderquery";
const DEFAULT_ORDER_QUERY_BACKUP_URL: &str = "https://api2.mch.weixin.qq.com/pay/orderquery";
const DEFAULT_CLOSE_ORDER_URL: &str = "https://api.mch.weixin.qq.com/pay/closeorder";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 网关接口地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// 统一下单
    pub unified_order: String,

    /// 查询订单
    pub order_query: String,

    /// 查询订单备用域名，主域名传输失败时使用
    pub order_query_backup: String,

    /// 关闭订单
    pub close_order: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            unified_order: DEFAULT_UNIFIED_ORDER_URL.to_string(),
            order_query: DEFAULT_ORDER_QUERY_URL.to_string(),
            order_query_backup: DEFAULT_ORDER_QUERY_BACKUP_URL.to_string(),
            close_order: DEFAULT_CLOSE_ORDER_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// 以同一个基础地址生成全部接口地址，主要用于测试替身
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            unified_order: format!("{}/pay/unifiedorder", base),
            order_query: format!("{}/pay/orderquery", base),
            order_query_backup: format!("{}/pay/orderquery", base),
            close_order: format!("{}/pay/closeorder", base),
        }
    }
}

/// 微信支付商户配置
#[derive(Clone, Serialize, Deserialize)]
pub struct PayConfig {
    /// 公众账号ID
    pub app_id: String,

    /// 商户号
    pub mch_id: String,

    /// 商户API密钥，只读不写
    #[serde(skip_serializing)]
    pub api_key: String,

    /// 支付结果通知地址
    pub notify_url: String,

    /// 签名类型
    #[serde(default)]
    pub sign_type: SignType,

    #[serde(default)]
    pub endpoints: Endpoints,

    /// 单次请求超时
    #[serde(default = "default_timeout")]
    pub request_timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

impl std::fmt::Debug for PayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayConfig")
            .field("app_id", &self.app_id)
            .field("mch_id", &self.mch_id)
            .field("api_key", &"***")
            .field("notify_url", &self.notify_url)
            .field("sign_type", &self.sign_type)
            .field("endpoints", &self.endpoints)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl PayConfig {
    pub fn new(
        app_id: impl Into<String>,
        mch_id: impl Into<String>,
        api_key: impl Into<String>,
        notify_url: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            mch_id: mch_id.into(),
            api_key: api_key.into(),
            notify_url: notify_url.into(),
            sign_type: SignType::default(),
            endpoints: Endpoints::default(),
            request_timeout: default_timeout(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_sign_type(mut self, sign_type: SignType) -> Self {
        self.sign_type = sign_type;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 从环境变量加载配置
    pub fn from_env() -> PayResult<Arc<Self>> {
        let mut config = Self::new(
            required("WXPAY_APPID")?,
            required("WXPAY_MCHID")?,
            required("WXPAY_API_KEY")?,
            required("WXPAY_NOTIFY_URL")?,
        );

        if let Ok(sign_type) = std::env::var("WXPAY_SIGN_TYPE") {
            config.sign_type = sign_type.parse().map_err(PayError::Configuration)?;
        }

        let defaults = Endpoints::default();
        config.endpoints = Endpoints {
            unified_order: optional("WXPAY_UNIFIED_ORDER_URL", defaults.unified_order),
            order_query: optional("WXPAY_ORDER_QUERY_URL", defaults.order_query),
            order_query_backup: optional(
                "WXPAY_ORDER_QUERY_BACKUP_URL",
                defaults.order_query_backup,
            ),
            close_order: optional("WXPAY_CLOSE_ORDER_URL", defaults.close_order),
        };

        if let Ok(secs) = std::env::var("WXPAY_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                PayError::Configuration(format!("WXPAY_TIMEOUT_SECS is not a number: {}", e))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(Arc::new(config))
    }
}

fn required(name: &str) -> PayResult<String> {
    std::env::var(name).map_err(|_| PayError::Configuration(format!("{} must be set", name)))
}

fn optional(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}
