//! HaoZhu (豪猪) SMS receiving platform.
//!
//! Rents Chinese mobile numbers per project (`sid`) and returns the SMS
//! they receive. Every request is a GET to `<server>/sms/?api=<name>&...`
//! answering a JSON object with a `code` / `msg` envelope.

mod carriers;
mod client;
mod errors;
mod provinces;
mod response;
mod types;

pub use carriers::{Carrier, PhoneType};
pub use client::{HaozhuClient, HaozhuClientBuilder};
pub use errors::{HaozhuError, HaozhuErrorKind, HaozhuServiceError, Result};
pub use provinces::Province;
pub use response::HaozhuResponse;
pub use types::{
    AccountInfo, DEFAULT_COUNTRY_CODE, DEFAULT_COUNTRY_DIAL_CODE, DEFAULT_COUNTRY_NAME,
    GetPhoneOptions, Message, PhoneNumber,
};
