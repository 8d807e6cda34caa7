//! Requesting numbers with carrier, province and prefix filters.
//!
//! # Running
//!
//! ```bash
//! HAOZHU_USERNAME=user HAOZHU_PASSWORD=secret HAOZHU_SID=12345 \
//!     cargo run --example with_filters
//! ```

use haozhu::{
    Carrier, GetPhoneOptions, HaozhuClient, HaozhuConfig, HaozhuErrorKind, PhoneType, Province,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = HaozhuConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("haozhu={}", config.log_level)))
        .init();

    let sid = config.sid;
    let mut client = HaozhuClient::new(config)?;

    println!("Carriers:");
    for carrier in Carrier::ALL {
        println!("  {:>2} {}", carrier.code(), carrier);
    }

    let options = GetPhoneOptions::default()
        .carrier(Carrier::ChinaMobile)
        .province(Province::Guangdong)
        .phone_type(PhoneType::Real)
        .exclude_prefix("170|171");

    match client.get_phone(sid, options).await {
        Ok(phone) => {
            println!("\nGot {} ({} {})", phone.phone, phone.sp, phone.phone_gsd);
            client.release_phone(sid, &phone.phone).await?;
            println!("Released {}", phone.phone);
        }
        Err(e) if e.kind() == Some(HaozhuErrorKind::PhoneNotAvailable) => {
            println!("\nNo China Mobile number in {} right now: {}", Province::Guangdong, e);
        }
        Err(e) => return Err(e.into()),
    }

    client.close();
    Ok(())
}
