//! Province codes accepted by the `province` filter.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

/// Mainland China province-level divisions.
///
/// Codes are grouped by region: North 10-14, Northeast 20-22, East 30-36,
/// Central South 40-45, Southwest 50-54, Northwest 60-64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Province {
    Beijing,
    Tianjin,
    Hebei,
    Shanxi,
    InnerMongolia,
    Liaoning,
    Jilin,
    Heilongjiang,
    Shanghai,
    Jiangsu,
    Zhejiang,
    Anhui,
    Fujian,
    Jiangxi,
    Shandong,
    Henan,
    Hubei,
    Hunan,
    Guangdong,
    Guangxi,
    Hainan,
    Chongqing,
    Sichuan,
    Guizhou,
    Yunnan,
    Tibet,
    Shaanxi,
    Gansu,
    Qinghai,
    Ningxia,
    Xinjiang,
}

static CODE2PROVINCE: Lazy<HashMap<u8, Province>> =
    Lazy::new(|| Province::ALL.into_iter().map(|p| (p.code(), p)).collect());

static NAME2PROVINCE: Lazy<HashMap<&'static str, Province>> =
    Lazy::new(|| Province::ALL.into_iter().map(|p| (p.name(), p)).collect());

impl Province {
    /// All provinces in code order.
    pub const ALL: [Province; 31] = [
        Province::Beijing,
        Province::Tianjin,
        Province::Hebei,
        Province::Shanxi,
        Province::InnerMongolia,
        Province::Liaoning,
        Province::Jilin,
        Province::Heilongjiang,
        Province::Shanghai,
        Province::Jiangsu,
        Province::Zhejiang,
        Province::Anhui,
        Province::Fujian,
        Province::Jiangxi,
        Province::Shandong,
        Province::Henan,
        Province::Hubei,
        Province::Hunan,
        Province::Guangdong,
        Province::Guangxi,
        Province::Hainan,
        Province::Chongqing,
        Province::Sichuan,
        Province::Guizhou,
        Province::Yunnan,
        Province::Tibet,
        Province::Shaanxi,
        Province::Gansu,
        Province::Qinghai,
        Province::Ningxia,
        Province::Xinjiang,
    ];

    /// Get the numeric code for the API.
    pub fn code(&self) -> u8 {
        match self {
            Province::Beijing => 10,
            Province::Tianjin => 11,
            Province::Hebei => 12,
            Province::Shanxi => 13,
            Province::InnerMongolia => 14,
            Province::Liaoning => 20,
            Province::Jilin => 21,
            Province::Heilongjiang => 22,
            Province::Shanghai => 30,
            Province::Jiangsu => 31,
            Province::Zhejiang => 32,
            Province::Anhui => 33,
            Province::Fujian => 34,
            Province::Jiangxi => 35,
            Province::Shandong => 36,
            Province::Henan => 40,
            Province::Hubei => 41,
            Province::Hunan => 42,
            Province::Guangdong => 43,
            Province::Guangxi => 44,
            Province::Hainan => 45,
            Province::Chongqing => 50,
            Province::Sichuan => 51,
            Province::Guizhou => 52,
            Province::Yunnan => 53,
            Province::Tibet => 54,
            Province::Shaanxi => 60,
            Province::Gansu => 61,
            Province::Qinghai => 62,
            Province::Ningxia => 63,
            Province::Xinjiang => 64,
        }
    }

    /// Chinese name, e.g. "广东".
    pub fn name(&self) -> &'static str {
        match self {
            Province::Beijing => "北京",
            Province::Tianjin => "天津",
            Province::Hebei => "河北",
            Province::Shanxi => "山西",
            Province::InnerMongolia => "内蒙古",
            Province::Liaoning => "辽宁",
            Province::Jilin => "吉林",
            Province::Heilongjiang => "黑龙江",
            Province::Shanghai => "上海",
            Province::Jiangsu => "江苏",
            Province::Zhejiang => "浙江",
            Province::Anhui => "安徽",
            Province::Fujian => "福建",
            Province::Jiangxi => "江西",
            Province::Shandong => "山东",
            Province::Henan => "河南",
            Province::Hubei => "湖北",
            Province::Hunan => "湖南",
            Province::Guangdong => "广东",
            Province::Guangxi => "广西",
            Province::Hainan => "海南",
            Province::Chongqing => "重庆",
            Province::Sichuan => "四川",
            Province::Guizhou => "贵州",
            Province::Yunnan => "云南",
            Province::Tibet => "西藏",
            Province::Shaanxi => "陕西",
            Province::Gansu => "甘肃",
            Province::Qinghai => "青海",
            Province::Ningxia => "宁夏",
            Province::Xinjiang => "新疆",
        }
    }

    /// Look up a province by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        CODE2PROVINCE.get(&code).copied()
    }

    /// Look up a province by its Chinese name.
    pub fn from_name(name: &str) -> Option<Self> {
        NAME2PROVINCE.get(name.trim()).copied()
    }

    /// Iterate over all provinces in code order.
    pub fn all() -> impl Iterator<Item = Province> {
        Self::ALL.into_iter()
    }
}

impl Display for Province {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_province_codes() {
        assert_eq!(Province::Beijing.code(), 10);
        assert_eq!(Province::Guangdong.code(), 43);
        assert_eq!(Province::Xinjiang.code(), 64);
    }

    #[test]
    fn test_province_lookup() {
        assert_eq!(Province::from_name("广东"), Some(Province::Guangdong));
        assert_eq!(Province::from_name("内蒙古"), Some(Province::InnerMongolia));
        assert_eq!(Province::from_code(22), Some(Province::Heilongjiang));
        assert_eq!(Province::from_code(15), None);
        assert_eq!(Province::from_name("台北"), None);
    }

    #[test]
    fn test_codes_and_names_are_distinct() {
        let codes: std::collections::HashSet<u8> = Province::all().map(|p| p.code()).collect();
        let names: std::collections::HashSet<&str> = Province::all().map(|p| p.name()).collect();
        assert_eq!(codes.len(), Province::ALL.len());
        assert_eq!(names.len(), Province::ALL.len());
        assert_ne!(Province::Xinjiang.code(), Province::Beijing.code());
        assert_eq!(Province::Xinjiang.name(), "新疆");
    }

    #[test]
    fn test_every_province_round_trips() {
        assert_eq!(Province::all().count(), 31);
        for province in Province::all() {
            assert_eq!(Province::from_code(province.code()), Some(province));
            assert_eq!(Province::from_name(province.name()), Some(province));
        }
    }
}
