//! Response envelope parsing for the HaoZhu API.

use super::errors::{HaozhuServiceError, classify_response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Codes the service uses for success.
const SUCCESS_CODES: &[&str] = &["0", "200"];

/// Code assumed when the response has no `code` field.
const MISSING_CODE: &str = "-1";

/// Message assumed when the response has no `msg` field.
const MISSING_MSG: &str = "unknown error";

/// Returns true if `code` signals success.
pub(crate) fn is_success_code(code: &str) -> bool {
    SUCCESS_CODES.contains(&code)
}

/// Render a scalar JSON value the way the service means it.
///
/// The service sends the same field as a number on some deployments and as
/// a string on others.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The `code` / `msg` pair present in every response.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    msg: Option<Value>,
}

impl Envelope {
    fn code(&self) -> String {
        match &self.code {
            Some(value) if !value.is_null() => scalar_to_string(value),
            _ => MISSING_CODE.to_string(),
        }
    }

    fn msg(&self) -> String {
        match &self.msg {
            Some(value) if !value.is_null() => scalar_to_string(value),
            _ => MISSING_MSG.to_string(),
        }
    }
}

/// Unified response type for HaoZhu API calls.
#[derive(Debug)]
pub enum HaozhuResponse<T> {
    Success(T),
    Error(HaozhuServiceError),
}

impl<T> HaozhuResponse<T> {
    /// Convert response into a Result for ergonomic error handling.
    pub fn into_result(self) -> Result<T, HaozhuServiceError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Error(e) => Err(e),
        }
    }

    /// Check if response is successful without consuming.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T: DeserializeOwned> HaozhuResponse<T> {
    /// Parse a HaoZhu response from raw body text.
    ///
    /// The body is decoded as JSON whatever content type the server declared
    /// and must be an object. On a success code `T` is decoded from the body
    /// text itself, so numeric tokens reach it unchanged; any other code is
    /// classified into a [`HaozhuServiceError`] labelled with `context`, and
    /// the payload is not looked at.
    pub fn from_text(text: &str, context: &str) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(text)?;
        let envelope = Envelope::deserialize(&Value::Object(object))?;

        let code = envelope.code();
        if !is_success_code(&code) {
            return Ok(Self::Error(classify_response(&code, &envelope.msg(), context)));
        }

        let data = serde_json::from_str(text)?;
        Ok(Self::Success(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::haozhu::errors::HaozhuErrorKind;
    use serde::de::IgnoredAny;

    #[derive(Debug, Deserialize)]
    struct Payload {
        token: Option<String>,
    }

    #[test]
    fn test_success_codes() {
        for body in [
            r#"{"code": 0, "msg": "ok", "token": "abc"}"#,
            r#"{"code": "0", "msg": "ok", "token": "abc"}"#,
            r#"{"code": 200, "msg": "ok", "token": "abc"}"#,
            r#"{"code": "200", "token": "abc"}"#,
        ] {
            let response = HaozhuResponse::<Payload>::from_text(body, "login").unwrap();
            assert!(response.is_success(), "body: {}", body);
            assert_eq!(response.into_result().unwrap().token.as_deref(), Some("abc"));
        }
    }

    #[test]
    fn test_success_ignores_error_keywords_in_msg() {
        let body = r#"{"code": 0, "msg": "token 余额 暂无号码"}"#;
        let response = HaozhuResponse::<IgnoredAny>::from_text(body, "").unwrap();
        assert!(response.is_success());
    }

    #[test]
    fn test_error_response_is_classified() {
        let body = r#"{"code": -1, "msg": "余额不足"}"#;
        let response = HaozhuResponse::<IgnoredAny>::from_text(body, "get phone").unwrap();

        match response.into_result() {
            Err(error) => {
                assert_eq!(error.kind, HaozhuErrorKind::InsufficientBalance);
                assert_eq!(error.message, "get phone: 余额不足");
                assert_eq!(error.code.as_deref(), Some("-1"));
            }
            Ok(_) => panic!("Expected error"),
        }
    }

    #[test]
    fn test_missing_code_is_failure() {
        let response = HaozhuResponse::<IgnoredAny>::from_text(r#"{}"#, "").unwrap();

        match response.into_result() {
            Err(error) => {
                assert_eq!(error.kind, HaozhuErrorKind::Api);
                assert_eq!(error.message, MISSING_MSG);
                assert_eq!(error.code.as_deref(), Some(MISSING_CODE));
            }
            Ok(_) => panic!("Expected error"),
        }
    }

    #[test]
    fn test_non_json_body_is_decode_error() {
        assert!(HaozhuResponse::<IgnoredAny>::from_text("<html></html>", "").is_err());
        assert!(HaozhuResponse::<IgnoredAny>::from_text("[1, 2]", "").is_err());
    }

    #[test]
    fn test_payload_sees_numbers_as_sent() {
        #[derive(Debug, Deserialize)]
        struct Summary {
            money: Box<serde_json::value::RawValue>,
        }

        let body = r#"{"code": 0, "msg": "ok", "money": 88.80}"#;
        let summary = HaozhuResponse::<Summary>::from_text(body, "")
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(summary.money.get(), "88.80");
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&Value::from(86)), "86");
        assert_eq!(scalar_to_string(&Value::from("86")), "86");
        assert_eq!(scalar_to_string(&Value::Null), "");
    }
}
