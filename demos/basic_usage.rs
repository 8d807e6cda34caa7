//! Basic usage example for the HaoZhu client.
//!
//! Logs in, prints the account summary, takes a number, waits for its
//! verification code and releases the number.
//!
//! # Running
//!
//! ```bash
//! HAOZHU_USERNAME=user HAOZHU_PASSWORD=secret HAOZHU_SID=12345 \
//!     cargo run --example basic_usage
//! ```

use haozhu::{GetPhoneOptions, HaozhuClient, HaozhuConfig, HaozhuError};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Settings may also come from a .env file
    dotenvy::dotenv().ok();

    let config = HaozhuConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("haozhu={}", config.log_level)))
        .init();

    let sid = config.sid;
    let client = HaozhuClient::new(config)?;

    client
        .scope(async |client: &mut HaozhuClient| {
            let info = client.get_account_info().await?;
            println!("Balance: {} (regions: {})", info.money, info.num);

            println!("\nRequesting phone number for project {}...", sid);
            let phone = client.get_phone(sid, GetPhoneOptions::default()).await?;

            println!("Got phone number:");
            println!("  Number: {}", phone.phone);
            println!("  International: {}", phone.with_dial_code());
            println!("  Carrier: {}", phone.sp);
            println!("  Location: {}", phone.phone_gsd);

            println!("\nWaiting for SMS...");
            let result = client
                .wait_for_message(sid, &phone.phone, Duration::from_secs(5), 24)
                .await;

            // Release the number whatever happened
            client.release_phone(sid, &phone.phone).await?;

            let message = result?;
            println!("Received SMS: {}", message.sms);
            println!("Code: {}", message.yzm);

            Ok::<_, HaozhuError>(())
        })
        .await?;

    Ok(())
}
