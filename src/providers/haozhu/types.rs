//! Request options and response types for the HaoZhu API.

use super::carriers::{Carrier, PhoneType};
use super::provinces::Province;
use super::response::scalar_to_string;
use crate::types::{Balance, DialCode, DialCodeError};
use keshvar::{Alpha2, Country};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// Country name used when the service omits it.
pub const DEFAULT_COUNTRY_NAME: &str = "China";
/// ISO alpha-2 country code used when the service omits it.
pub const DEFAULT_COUNTRY_CODE: &str = "CN";
/// Dial code used when the service omits it.
pub const DEFAULT_COUNTRY_DIAL_CODE: &str = "86";

fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .filter(|v| !v.is_null())
        .map(|v| scalar_to_string(&v)))
}

fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {}", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected unsigned integer, got '{}'", s))),
        Some(other) => Err(de::Error::custom(format!(
            "expected unsigned integer, got {}",
            other
        ))),
    }
}

// =============================================================================
// Results
// =============================================================================

/// Account summary returned by `getSummary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountInfo {
    /// Account balance.
    pub money: Balance,
    /// Maximum number of regions the account may hold at once.
    pub num: u32,
}

/// Phone number acquired with `getPhone`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneNumber {
    /// The phone number, without dial code.
    pub phone: String,
    /// Project id the number was acquired for.
    pub sid: u64,
    /// Country name.
    pub country_name: String,
    /// ISO alpha-2 country code.
    pub country_code: String,
    /// Country dial code.
    pub country_qu: String,
    /// Carrier name.
    pub sp: String,
    /// Where the number is registered (province / city).
    pub phone_gsd: String,
}

impl PhoneNumber {
    /// Resolve the country of this number.
    pub fn country(&self) -> Option<Country> {
        Alpha2::try_from(self.country_code.trim().to_uppercase().as_str())
            .ok()
            .map(|alpha2| alpha2.to_country())
    }

    /// Parse the dial code of this number.
    pub fn dial_code(&self) -> Result<DialCode, DialCodeError> {
        DialCode::new(&self.country_qu)
    }

    /// Number in international format, e.g. `+8613800138000`.
    pub fn with_dial_code(&self) -> String {
        format!("+{}{}", self.country_qu.trim_start_matches('+'), self.phone)
    }
}

/// SMS received on a number, returned by `getMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Full message text.
    pub sms: String,
    /// Verification code extracted by the service; empty if none was found.
    pub yzm: String,
    /// Phone number the message was received on.
    pub phone: String,
    /// Project id.
    pub sid: u64,
}

// =============================================================================
// Wire payloads
// =============================================================================

/// Payload of a successful `login` response.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginPayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub token: Option<String>,
}

/// Payload of a successful `getSummary` response.
#[derive(Debug, Deserialize)]
pub(crate) struct SummaryPayload {
    #[serde(default)]
    pub money: Option<Balance>,
    #[serde(default, deserialize_with = "opt_u64")]
    pub num: Option<u64>,
}

impl SummaryPayload {
    pub fn into_account_info(self) -> AccountInfo {
        AccountInfo {
            money: self.money.unwrap_or_default(),
            num: self
                .num
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
                .unwrap_or(0),
        }
    }
}

/// Payload of a successful `getPhone` response.
#[derive(Debug, Deserialize)]
pub(crate) struct GetPhonePayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "opt_u64")]
    pub sid: Option<u64>,
    #[serde(default, deserialize_with = "opt_string")]
    pub country_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub country_code: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub country_qu: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub sp: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub phone_gsd: Option<String>,
}

impl GetPhonePayload {
    /// Fill in defaults. `requested_phone` is used when the service omits
    /// the number.
    pub fn into_phone_number(self, sid: u64, requested_phone: Option<&str>) -> PhoneNumber {
        PhoneNumber {
            phone: self
                .phone
                .or_else(|| requested_phone.map(str::to_string))
                .unwrap_or_default(),
            sid: self.sid.unwrap_or(sid),
            country_name: self
                .country_name
                .unwrap_or_else(|| DEFAULT_COUNTRY_NAME.to_string()),
            country_code: self
                .country_code
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
            country_qu: self
                .country_qu
                .unwrap_or_else(|| DEFAULT_COUNTRY_DIAL_CODE.to_string()),
            sp: self.sp.unwrap_or_default(),
            phone_gsd: self.phone_gsd.unwrap_or_default(),
        }
    }
}

/// Payload of a successful `getMessage` response.
#[derive(Debug, Deserialize)]
pub(crate) struct GetMessagePayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub sms: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub yzm: Option<String>,
}

impl GetMessagePayload {
    pub fn into_message(self, sid: u64, phone: &str) -> Message {
        Message {
            sms: self.sms.unwrap_or_default(),
            yzm: self.yzm.unwrap_or_default(),
            phone: phone.to_string(),
            sid,
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Optional filters for `getPhone`.
///
/// Unset filters, and string filters set to an empty string, are left out
/// of the request entirely.
///
/// ```rust
/// use haozhu::{Carrier, GetPhoneOptions, PhoneType, Province};
///
/// let options = GetPhoneOptions::default()
///     .carrier(Carrier::ChinaMobile)
///     .phone_type(PhoneType::Real)
///     .province(Province::Guangdong)
///     .prefix("1380|1381");
///
/// assert_eq!(options.prefix.as_deref(), Some("1380|1381"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetPhoneOptions {
    /// Carrier filter (`operator`).
    pub carrier: Option<Carrier>,
    /// Province filter.
    pub province: Option<Province>,
    /// Virtual or real SIM.
    pub phone_type: Option<PhoneType>,
    /// Only these number prefixes, `|`-separated (e.g. `"1380|1580"`).
    pub prefix: Option<String>,
    /// Exclude these number prefixes, `|`-separated.
    pub exclude_prefix: Option<String>,
    /// Docking-code id, for accounts with several docking codes.
    pub uid: Option<String>,
    /// Developer account for revenue sharing.
    pub author: Option<String>,
}

impl GetPhoneOptions {
    pub fn carrier(mut self, carrier: Carrier) -> Self {
        self.carrier = Some(carrier);
        self
    }

    pub fn province(mut self, province: Province) -> Self {
        self.province = Some(province);
        self
    }

    pub fn phone_type(mut self, phone_type: PhoneType) -> Self {
        self.phone_type = Some(phone_type);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn exclude_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.exclude_prefix = Some(prefix.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_payload_defaults() {
        let payload: GetPhonePayload =
            serde_json::from_str(r#"{"code": 0, "phone": "13800138000"}"#).unwrap();
        let phone = payload.into_phone_number(123, None);

        assert_eq!(phone.phone, "13800138000");
        assert_eq!(phone.sid, 123);
        assert_eq!(phone.country_name, "China");
        assert_eq!(phone.country_code, "CN");
        assert_eq!(phone.country_qu, "86");
        assert_eq!(phone.sp, "");
        assert_eq!(phone.phone_gsd, "");
    }

    #[test]
    fn test_phone_payload_full() {
        let json = r#"{
            "code": "0",
            "msg": "成功",
            "sid": "456",
            "phone": 13912345678,
            "country_name": "中国",
            "country_code": "CN",
            "country_qu": 86,
            "sp": "移动",
            "phone_gsd": "广东 深圳"
        }"#;

        let phone = serde_json::from_str::<GetPhonePayload>(json)
            .unwrap()
            .into_phone_number(1, None);

        assert_eq!(phone.phone, "13912345678");
        assert_eq!(phone.sid, 456);
        assert_eq!(phone.country_name, "中国");
        assert_eq!(phone.country_qu, "86");
        assert_eq!(phone.sp, "移动");
        assert_eq!(phone.phone_gsd, "广东 深圳");
    }

    #[test]
    fn test_phone_payload_falls_back_to_requested_number() {
        let payload: GetPhonePayload = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        let phone = payload.into_phone_number(7, Some("13800138000"));
        assert_eq!(phone.phone, "13800138000");
        assert_eq!(phone.sid, 7);
    }

    #[test]
    fn test_phone_number_helpers() {
        let phone = serde_json::from_str::<GetPhonePayload>(r#"{"phone": "13800138000"}"#)
            .unwrap()
            .into_phone_number(1, None);

        assert_eq!(phone.with_dial_code(), "+8613800138000");
        assert_eq!(phone.dial_code().unwrap().as_str(), "86");
        assert_eq!(phone.country().map(|c| c.alpha2()), Some(Alpha2::CN));
    }

    #[test]
    fn test_summary_payload() {
        let info = serde_json::from_str::<SummaryPayload>(r#"{"money": "10.50", "num": "20"}"#)
            .unwrap()
            .into_account_info();
        assert_eq!(info.money.as_str(), "10.50");
        assert_eq!(info.num, 20);

        let info = serde_json::from_str::<SummaryPayload>(r#"{}"#)
            .unwrap()
            .into_account_info();
        assert_eq!(info.money.as_str(), "0");
        assert_eq!(info.num, 0);
    }

    #[test]
    fn test_summary_payload_numeric_money() {
        let info = serde_json::from_str::<SummaryPayload>(r#"{"money": 88.80, "num": 5}"#)
            .unwrap()
            .into_account_info();
        assert_eq!(info.money.as_str(), "88.80");

        let info = serde_json::from_str::<SummaryPayload>(r#"{"money": 0.0000001}"#)
            .unwrap()
            .into_account_info();
        assert_eq!(info.money.as_str(), "0.0000001");

        let info = serde_json::from_str::<SummaryPayload>(r#"{"money": null}"#)
            .unwrap()
            .into_account_info();
        assert_eq!(info.money.as_str(), "0");
    }

    #[test]
    fn test_summary_payload_rejects_bad_num() {
        assert!(serde_json::from_str::<SummaryPayload>(r#"{"num": "many"}"#).is_err());
    }

    #[test]
    fn test_message_payload_empty_code() {
        let message = serde_json::from_str::<GetMessagePayload>(
            r#"{"sms": "【某平台】您的验证码是 1234,5分钟内有效", "yzm": ""}"#,
        )
        .unwrap()
        .into_message(9, "13800138000");

        assert_eq!(message.sms, "【某平台】您的验证码是 1234,5分钟内有效");
        assert_eq!(message.yzm, "");
        assert_eq!(message.phone, "13800138000");
        assert_eq!(message.sid, 9);
    }

    #[test]
    fn test_get_phone_options_builder() {
        let options = GetPhoneOptions::default()
            .carrier(Carrier::ChinaUnicom)
            .exclude_prefix("170")
            .uid("u1")
            .author("dev");

        assert_eq!(options.carrier, Some(Carrier::ChinaUnicom));
        assert_eq!(options.exclude_prefix.as_deref(), Some("170"));
        assert_eq!(options.uid.as_deref(), Some("u1"));
        assert_eq!(options.author.as_deref(), Some("dev"));
        assert!(options.province.is_none());
    }
}
