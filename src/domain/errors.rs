use thiserror::Error;

/// 传输层错误
#[derive(Error, Debug)]
pub enum TransportError {
    /// 连接、超时等 HTTP 请求错误
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// 网关返回非 2xx 状态码
    #[error("Gateway returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// 微信支付客户端错误类型
#[derive(Error, Debug)]
pub enum PayError {
    /// 传输失败
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 请求 XML 编码失败
    #[error("XML encode error: {0}")]
    Encode(String),

    /// 响应 XML 解码失败
    #[error("XML decode error: {0}")]
    Decode(String),

    /// 通信标识 return_code 不为 SUCCESS
    ///
    /// `signed` 为不含密钥的待签名串，便于排查签名问题。
    #[error("[msg : returnCodeFailure] [rawReturn : {raw}] [signstr : {signed}] [sign : {sign}]")]
    Communication {
        raw: String,
        signed: String,
        sign: String,
    },

    /// 业务结果 result_code 不为 SUCCESS
    #[error("{err_code}{err_code_des}")]
    Business {
        err_code: String,
        err_code_des: String,
    },

    /// 支付通知 return_code 不为 SUCCESS
    #[error("{0}")]
    NotifyReturn(String),

    /// 支付通知 result_code 不为 SUCCESS
    #[error("{0}")]
    NotifyResult(String),

    /// 签名验证失败
    #[error("Signature verification failed")]
    SignatureMismatch,

    /// 加密错误
    #[error("Cryptography error: {0}")]
    Crypto(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// 结果类型
pub type PayResult<T> = Result<T, PayError>;
