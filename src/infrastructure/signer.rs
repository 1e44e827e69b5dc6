use crate::domain::errors::{PayError, PayResult};
use crate::domain::value_objects::SignType;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 32;

/// 待签名字段，按调用方给定的顺序拼接
///
/// 值为空的字段不参与签名，与请求体中省略的可选字段保持一致。
#[derive(Debug, Clone, Default)]
pub struct SignPayload {
    pairs: Vec<(&'static str, String)>,
}

impl SignPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.pairs.push((name, value));
        }
        self
    }

    /// `a=1&b=2` 形式的待签名串（不含密钥）
    pub fn canonical(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// 对待签名串追加 `&key=` 后计算签名，输出大写十六进制
pub fn sign(canonical: &str, key: &str, sign_type: SignType) -> PayResult<String> {
    let message = if canonical.is_empty() {
        format!("key={}", key)
    } else {
        format!("{}&key={}", canonical, key)
    };
    digest(&message, key, sign_type)
}

/// 对 `name=value&` 片段按字符串排序后拼接，再追加 `key=` 计算签名
pub fn sign_sorted(mut fragments: Vec<String>, key: &str, sign_type: SignType) -> PayResult<String> {
    fragments.sort();
    let mut message = fragments.concat();
    message.push_str("key=");
    message.push_str(key);
    digest(&message, key, sign_type)
}

fn digest(message: &str, key: &str, sign_type: SignType) -> PayResult<String> {
    match sign_type {
        SignType::Md5 => Ok(hex::encode_upper(md5::compute(message.as_bytes()).0)),
        SignType::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(key.as_bytes())
                .map_err(|e| PayError::Crypto(format!("HMAC init error: {}", e)))?;
            mac.update(message.as_bytes());
            Ok(hex::encode_upper(mac.finalize().into_bytes()))
        }
    }
}

/// 生成32位随机字符串
pub fn nonce_str() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "1ebbd6188e79ed64fc2c4f957a988a5b";

    fn jsapi_payload(sign_type: &str) -> SignPayload {
        SignPayload::new()
            .field("appId", "wx016b7f8177b8a007")
            .field("nonceStr", "lwRVpZGwsCPOfohV2CrXtRroDb9vzRPh")
            .field("package", "prepay_id=wx11013410710840fc916cf5a91113520800")
            .field("signType", sign_type)
            .field("timeStamp", "1565458450")
    }

    #[test]
    fn test_canonical_keeps_call_site_order() {
        let payload = SignPayload::new().field("b", "2").field("a", "1");
        assert_eq!(payload.canonical(), "b=2&a=1");
    }

    #[test]
    fn test_canonical_skips_empty_values() {
        let payload = SignPayload::new()
            .field("appid", "wx1")
            .field("fee_type", "")
            .field("mch_id", "100");
        assert_eq!(payload.canonical(), "appid=wx1&mch_id=100");
    }

    #[test]
    fn test_md5_known_digest() {
        let sign = sign(&jsapi_payload("MD5").canonical(), KEY, SignType::Md5).unwrap();
        assert_eq!(sign, "A09F814D8E9C6E18035779A8198F7E9A");
    }

    #[test]
    fn test_hmac_sha256_known_digest() {
        let sign = sign(
            &jsapi_payload("HMAC-SHA256").canonical(),
            KEY,
            SignType::HmacSha256,
        )
        .unwrap();
        assert_eq!(
            sign,
            "5882EA642E9C1062673C7AF0AF14298848E4BC435E3E8BEDAFF830D1ACEA7CA6"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let canonical = jsapi_payload("MD5").canonical();
        let first = sign(&canonical, KEY, SignType::Md5).unwrap();
        let second = sign(&canonical, KEY, SignType::Md5).unwrap();
        assert_eq!(first, second);

        let other_key = sign(&canonical, "another", SignType::Md5).unwrap();
        assert_ne!(first, other_key);
    }

    #[test]
    fn test_sign_sorted_ignores_construction_order() {
        let fragments: Vec<String> = [
            "appid=wx1&",
            "mch_id=100&",
            "result_code=SUCCESS&",
            "openid=o1&",
            "is_subscribe=N&",
            "trade_type=JSAPI&",
            "bank_type=CMC&",
            "total_fee=1&",
            "cash_fee=1&",
            "transaction_id=4200&",
            "out_trade_no=ORDER1&",
            "time_end=20190811013410&",
            "return_code=SUCCESS&",
            "return_msg=OK&",
            "nonce_str=abc&",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut reversed = fragments.clone();
        reversed.reverse();

        let a = sign_sorted(fragments, KEY, SignType::Md5).unwrap();
        let b = sign_sorted(reversed, KEY, SignType::Md5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_sorted_matches_manual_string() {
        let fragments = vec!["b=2&".to_string(), "a=1&".to_string()];
        let expected = sign("a=1&b=2", KEY, SignType::Md5).unwrap();
        assert_eq!(sign_sorted(fragments, KEY, SignType::Md5).unwrap(), expected);
    }

    #[test]
    fn test_nonce_str() {
        let a = nonce_str();
        let b = nonce_str();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
