use crate::domain::errors::TransportError;
use async_trait::async_trait;

/// XML 传输端口接口
///
/// 只负责把已序列化的请求体 POST 到指定地址并返回原始响应字节，
/// 签名与字段映射由客户端完成。
#[async_trait]
pub trait XmlTransport: Send + Sync {
    /// 发送 XML 请求
    async fn post_xml(&self, url: &str, body: String) -> Result<Vec<u8>, TransportError>;
}

