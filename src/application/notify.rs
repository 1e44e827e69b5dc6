use crate::domain::errors::{PayError, PayResult};
use crate::infrastructure::envelope::SUCCESS;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, Event};

/// 支付结果通知的应答
///
/// 网关收到 SUCCESS 后停止重发通知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyReply {
    pub return_code: String,
    pub return_msg: String,
}

impl NotifyReply {
    pub fn success() -> Self {
        Self {
            return_code: SUCCESS.to_string(),
            return_msg: "OK".to_string(),
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            return_code: "FAIL".to_string(),
            return_msg: msg.into(),
        }
    }

    pub fn to_xml(&self) -> PayResult<String> {
        let mut writer = Writer::new(Vec::new());
        write_event(&mut writer, Event::Start(BytesStart::new("xml")))?;
        write_cdata_element(&mut writer, "return_code", &self.return_code)?;
        write_cdata_element(&mut writer, "return_msg", &self.return_msg)?;
        write_event(&mut writer, Event::End(BytesEnd::new("xml")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| PayError::Encode(e.to_string()))
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> PayResult<()> {
    writer
        .write_event(event)
        .map_err(|e| PayError::Encode(e.to_string()))
}

/// 文本中的 `]]>` 会被拆分到相邻的两个 CDATA 段
fn write_cdata_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> PayResult<()> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        write_event(writer, Event::CData(BytesCData::new(&rest[..pos + 2])))?;
        rest = &rest[pos + 2..];
    }
    write_event(writer, Event::CData(BytesCData::new(rest)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::envelope::{CloseOrderResult, from_xml};

    #[test]
    fn test_success_reply() {
        assert_eq!(
            NotifyReply::success().to_xml().unwrap(),
            "<xml><return_code><![CDATA[SUCCESS]]></return_code>\
             <return_msg><![CDATA[OK]]></return_msg></xml>"
        );
    }

    #[test]
    fn test_fail_reply_keeps_cdata_terminator_in_message() {
        let xml = NotifyReply::fail("bad ]]> sign").to_xml().unwrap();
        assert!(xml.contains("<return_code><![CDATA[FAIL]]></return_code>"));
        assert!(xml.contains("<![CDATA[bad ]]]]><![CDATA[> sign]]>"));

        let decoded: CloseOrderResult = from_xml(xml.as_bytes()).unwrap();
        assert_eq!(decoded.return_code, "FAIL");
        assert_eq!(decoded.return_msg, "bad ]]> sign");
    }
}
