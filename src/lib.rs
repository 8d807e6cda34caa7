//! # HaoZhu
//!
//! Async client for the HaoZhu (豪猪) SMS verification code platform.
//!
//! The platform rents Chinese mobile numbers per project and hands back the
//! verification messages they receive. This crate wraps its HTTP API:
//! login and token handling, account summary, number acquisition with
//! carrier / province / prefix filters, message polling, release and
//! blacklisting.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use haozhu::{Carrier, GetPhoneOptions, HaozhuClient, HaozhuConfig, HaozhuError};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // HAOZHU_USERNAME, HAOZHU_PASSWORD, ...
//!     let config = HaozhuConfig::from_env()?;
//!     let sid = config.sid;
//!     let client = HaozhuClient::new(config)?;
//!
//!     client
//!         .scope(async |client: &mut HaozhuClient| {
//!             let options = GetPhoneOptions::default().carrier(Carrier::ChinaMobile);
//!             let phone = client.get_phone(sid, options).await?;
//!             println!("Got number: {}", phone.with_dial_code());
//!
//!             let message = client
//!                 .wait_for_message(sid, &phone.phone, Duration::from_secs(5), 24)
//!                 .await?;
//!             println!("Got code: {}", message.yzm);
//!
//!             client.release_phone(sid, &phone.phone).await?;
//!             Ok::<_, HaozhuError>(())
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! HaozhuClient        (session + token, domain operations)
//!         │
//!         ▼
//!   dispatch          (URL building, retry on transport failures)
//!         │
//!         ▼
//! HaozhuResponse      (code/msg envelope, error classification)
//! ```
//!
//! ## Features
//!
//! - `tracing` - OpenTelemetry tracing instrumentation (enabled by default)

pub mod config;
pub mod errors;
pub mod providers;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root
pub use config::{ConfigError, HaozhuConfig};
pub use errors::RetryableError;
pub use providers::haozhu::{
    AccountInfo, Carrier, GetPhoneOptions, HaozhuClient, HaozhuClientBuilder, HaozhuError,
    HaozhuErrorKind, HaozhuServiceError, Message, PhoneNumber, PhoneType, Province,
};
pub use types::{Balance, BalanceError, DialCode, DialCodeError};
pub use utils::retry::RetryConfig;
