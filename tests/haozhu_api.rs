//! Integration tests for the HaoZhu API.
//!
//! These tests make real API calls and require a valid account.
//! They are ignored by default and should be run manually.
//!
//! # Setup
//!
//! 1. Copy the example env file:
//!    ```bash
//!    cp tests/.env.example .env
//!    ```
//!
//! 2. Edit `.env` and add your credentials and project id
//!
//! 3. Run the tests:
//!    ```bash
//!    cargo test --test haozhu_api -- --ignored
//!    ```
//!
//! **WARNING**: Tests that take numbers consume balance!

use haozhu::{
    Carrier, GetPhoneOptions, HaozhuClient, HaozhuConfig, HaozhuError, HaozhuErrorKind,
    RetryableError,
};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Load the configuration from the environment or a .env file.
fn load_config() -> HaozhuConfig {
    dotenvy::dotenv().ok();

    let config = HaozhuConfig::from_env().expect("Invalid HAOZHU_* configuration");
    assert!(
        !config.username.is_empty() || config.has_token(),
        "HAOZHU_USERNAME and HAOZHU_PASSWORD (or HAOZHU_TOKEN) must be set.\n\
         Either:\n\
         1. Copy tests/.env.example to .env and fill it in\n\
         2. Run with: HAOZHU_USERNAME=user HAOZHU_PASSWORD=secret cargo test --test haozhu_api -- --ignored",
    );
    config
}

/// Create a test client from the environment.
fn create_client() -> (HaozhuClient, u64) {
    let config = load_config();
    let sid = config.sid;
    let client = HaozhuClient::new(config).expect("Failed to create client");
    (client, sid)
}

/// Skip tests that need a project when none is configured.
fn require_sid(sid: u64) -> bool {
    if sid == 0 {
        println!("HAOZHU_SID not set, skipping");
        return false;
    }
    true
}

// =============================================================================
// Account
// =============================================================================

#[tokio::test]
#[ignore = "requires HaoZhu account"]
async fn test_login() {
    let config = load_config();
    if config.username.is_empty() {
        println!("No credentials, only a token; skipping");
        return;
    }

    let mut client = HaozhuClient::new(config.with_token("")).expect("Failed to create client");
    let token = client.login().await.expect("Login failed");

    assert!(!token.is_empty());
    assert_eq!(client.token().expose_secret(), token);
}

#[tokio::test]
#[ignore = "requires HaoZhu account"]
async fn test_login_with_wrong_password() {
    let config = load_config();
    if config.username.is_empty() {
        return;
    }

    let mut client = HaozhuClient::builder(config.with_token(""))
        .password("definitely-not-the-password")
        .build()
        .expect("Failed to create client");

    let err = client.login().await.unwrap_err();
    println!("Login rejected: {}", err);
    assert!(err.is_authentication());
    assert!(!err.is_retryable());
}

#[tokio::test]
#[ignore = "requires HaoZhu account"]
async fn test_get_account_info() {
    let (mut client, _) = create_client();

    let info = client.get_account_info().await.expect("getSummary failed");
    println!("Balance: {}, regions: {}", info.money, info.num);

    assert!(info.money.to_f64() >= 0.0);
}

// =============================================================================
// Numbers
// =============================================================================

#[tokio::test]
#[ignore = "requires HaoZhu account and consumes balance"]
async fn test_get_and_release_phone() {
    let (client, sid) = create_client();
    if !require_sid(sid) {
        return;
    }

    let result = client
        .scope(async |client: &mut HaozhuClient| {
            let phone = match client.get_phone(sid, GetPhoneOptions::default()).await {
                Ok(phone) => phone,
                Err(e) if e.kind() == Some(HaozhuErrorKind::PhoneNotAvailable) => {
                    println!("No numbers available: {}", e);
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            println!("Got {} ({} {})", phone.with_dial_code(), phone.sp, phone.phone_gsd);
            assert!(!phone.phone.is_empty());
            assert_eq!(phone.sid, sid);

            let message = client.get_message(sid, &phone.phone).await;
            match &message {
                Ok(message) => println!("Unexpected early SMS: {}", message.sms),
                Err(e) => assert!(e.is_message_not_ready(), "unexpected error: {}", e),
            }

            assert!(client.release_phone(sid, &phone.phone).await?);
            Ok::<_, HaozhuError>(())
        })
        .await;

    result.expect("Phone round trip failed");
}

#[tokio::test]
#[ignore = "requires HaoZhu account and consumes balance"]
async fn test_get_phone_with_carrier_filter() {
    let (mut client, sid) = create_client();
    if !require_sid(sid) {
        return;
    }

    let options = GetPhoneOptions::default().carrier(Carrier::ChinaUnicom);
    match client.get_phone(sid, options).await {
        Ok(phone) => {
            println!("Got {} from {}", phone.phone, phone.sp);
            client
                .release_phone(sid, &phone.phone)
                .await
                .expect("Release failed");
        }
        Err(e) => {
            println!("Filtered request failed: {}", e);
            assert_eq!(e.kind(), Some(HaozhuErrorKind::PhoneNotAvailable));
        }
    }
}

#[tokio::test]
#[ignore = "requires HaoZhu account and consumes balance"]
async fn test_wait_for_message_times_out() {
    let (mut client, sid) = create_client();
    if !require_sid(sid) {
        return;
    }

    let phone = match client.get_phone(sid, GetPhoneOptions::default()).await {
        Ok(phone) => phone,
        Err(e) => {
            println!("No number to wait on: {}", e);
            return;
        }
    };

    let result = client
        .wait_for_message(sid, &phone.phone, Duration::from_secs(2), 3)
        .await;
    client.release_phone(sid, &phone.phone).await.ok();

    match result {
        Err(HaozhuError::MessageTimeout { polls, .. }) => assert_eq!(polls, 3),
        Ok(message) => println!("Unexpected SMS: {}", message.sms),
        Err(e) => panic!("Unexpected error: {}", e),
    }
}

#[tokio::test]
#[ignore = "requires HaoZhu account"]
async fn test_release_all() {
    let (mut client, _) = create_client();

    let released = client.release_all().await.expect("cancelAllRecv failed");
    assert!(released);
}
