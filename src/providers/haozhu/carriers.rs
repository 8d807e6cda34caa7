//! Carrier and SIM type filters for the HaoZhu API.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Mobile carrier, sent as the `operator` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Carrier {
    /// China Mobile (code: 1).
    ChinaMobile,
    /// China Unicom (code: 5).
    ChinaUnicom,
    /// China Telecom (code: 9).
    ChinaTelecom,
    /// China Broadnet (code: 14).
    ChinaBroadcast,
    /// Mobile virtual network operator (code: 16).
    Virtual,
}

impl Carrier {
    /// All known carriers.
    pub const ALL: [Carrier; 5] = [
        Carrier::ChinaMobile,
        Carrier::ChinaUnicom,
        Carrier::ChinaTelecom,
        Carrier::ChinaBroadcast,
        Carrier::Virtual,
    ];

    /// Get the numeric code for the API.
    pub fn code(&self) -> u8 {
        match self {
            Carrier::ChinaMobile => 1,
            Carrier::ChinaUnicom => 5,
            Carrier::ChinaTelecom => 9,
            Carrier::ChinaBroadcast => 14,
            Carrier::Virtual => 16,
        }
    }

    /// Look up a carrier by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Carrier name as the service spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Carrier::ChinaMobile => "中国移动",
            Carrier::ChinaUnicom => "中国联通",
            Carrier::ChinaTelecom => "中国电信",
            Carrier::ChinaBroadcast => "中国广电",
            Carrier::Virtual => "虚拟运营商",
        }
    }
}

impl Display for Carrier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Carrier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Carrier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Carrier::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown carrier code {}", code)))
    }
}

/// Kind of SIM behind a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhoneType {
    /// Virtual SIM (code: 0).
    Virtual,
    /// Physical SIM (code: 1).
    Real,
}

impl PhoneType {
    /// Get the numeric code for the API.
    pub fn code(&self) -> u8 {
        match self {
            PhoneType::Virtual => 0,
            PhoneType::Real => 1,
        }
    }

    /// Look up a phone type by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PhoneType::Virtual),
            1 => Some(PhoneType::Real),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_codes() {
        assert_eq!(Carrier::ChinaMobile.code(), 1);
        assert_eq!(Carrier::ChinaUnicom.code(), 5);
        assert_eq!(Carrier::ChinaTelecom.code(), 9);
        assert_eq!(Carrier::ChinaBroadcast.code(), 14);
        assert_eq!(Carrier::Virtual.code(), 16);
    }

    #[test]
    fn test_carrier_from_code() {
        for carrier in Carrier::ALL {
            assert_eq!(Carrier::from_code(carrier.code()), Some(carrier));
        }
        assert_eq!(Carrier::from_code(2), None);
    }

    #[test]
    fn test_carrier_serde() {
        assert_eq!(serde_json::to_string(&Carrier::ChinaTelecom).unwrap(), "9");
        let parsed: Carrier = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, Carrier::ChinaUnicom);
        assert!(serde_json::from_str::<Carrier>("3").is_err());
    }

    #[test]
    fn test_phone_type_codes() {
        assert_eq!(PhoneType::Virtual.code(), 0);
        assert_eq!(PhoneType::Real.code(), 1);
        assert_eq!(PhoneType::from_code(1), Some(PhoneType::Real));
        assert_eq!(PhoneType::from_code(2), None);
    }
}
