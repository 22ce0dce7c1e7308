//! The full provisioning run: fetch feeds, collect bookings, push
//! codes to both locks per booking, then report.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use reqwest::Client;

use crate::booking;
use crate::core::AppConfig;
use crate::feed;
use crate::lock::HttpLockClient;
use crate::report;
use crate::workflow::{self, Pacing};

pub async fn run(config_path: &str, out_dir: &str, no_export: bool) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let http = Client::builder().timeout(timeout).build()?;
    let now = Local::now().naive_local();

    println!("Collecting bookings for {} rooms...", config.rooms.len());
    let fetched = feed::fetch_all(&http, &config.rooms).await;
    let feeds: Vec<(String, String)> = fetched
        .into_iter()
        .filter_map(|(room, result)| result.ok().map(|text| (room, text)))
        .collect();

    let bookings = booking::collect_bookings(&feeds, now);
    println!("Collected {} upcoming bookings", bookings.len());

    let missing: Vec<_> = bookings.iter().filter(|b| b.phone_code.is_none()).collect();
    if !missing.is_empty() {
        println!("\nBookings missing phone numbers:");
        for b in &missing {
            println!("  {} - {} - {}", b.guest_name, b.room, b.start_date);
        }
    }

    let client = HttpLockClient::new(
        &config.api_base_url,
        &config.client_id,
        &config.access_token,
        timeout,
    )?;

    println!("\nProvisioning codes...");
    let records =
        workflow::process_bookings(&client, &config, &bookings, now, &Pacing::default()).await;

    let summary = report::summarize(&records);
    report::render(&summary);

    if !no_export {
        let path = report::write_csv(&records, Path::new(out_dir))?;
        println!("\nReport exported to {}", path.display());
    }

    Ok(())
}
