//! Receiving a second message on a number used before.
//!
//! # Running
//!
//! ```bash
//! HAOZHU_TOKEN=token HAOZHU_SID=12345 \
//!     cargo run --example specific_phone -- 13800138000
//! ```

use haozhu::{HaozhuClient, HaozhuConfig, RetryableError};
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = HaozhuConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("haozhu={}", config.log_level)))
        .init();

    let number = env::args()
        .nth(1)
        .ok_or("usage: specific_phone <phone number>")?;

    let sid = config.sid;
    let mut client = HaozhuClient::builder(config)
        .on_retry(|err, wait| {
            println!("Retrying in {:?} after: {}", wait, err);
        })
        .build()?;

    let phone = client.get_phone_specific(sid, &number, None).await?;
    println!("Holding {} again", phone.with_dial_code());

    match client
        .wait_for_message(sid, &phone.phone, Duration::from_secs(5), 12)
        .await
    {
        Ok(message) => println!("Code: {}", message.yzm),
        Err(e) if e.should_retry_operation() => println!("Nothing yet, try later: {}", e),
        Err(e) => println!("Failed: {}", e),
    }

    client.blacklist_phone(sid, &phone.phone).await?;
    println!("Blacklisted {}", phone.phone);

    Ok(())
}
