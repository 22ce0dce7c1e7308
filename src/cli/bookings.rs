//! Inspect upcoming bookings without provisioning anything.

use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use reqwest::Client;

use crate::booking;
use crate::core::AppConfig;
use crate::feed;

pub async fn run(config_path: &str) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let http = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let now = Local::now().naive_local();

    let fetched = feed::fetch_all(&http, &config.rooms).await;
    let feeds: Vec<(String, String)> = fetched
        .into_iter()
        .filter_map(|(room, result)| result.ok().map(|text| (room, text)))
        .collect();

    let bookings = booking::collect_bookings(&feeds, now);

    println!("Upcoming bookings: {}", bookings.len());
    for b in &bookings {
        println!(
            "  {} | {} | {} to {} | code: {}{}",
            b.room,
            b.guest_name,
            b.start_date,
            b.end_date,
            b.phone_code.as_deref().unwrap_or("NONE"),
            if b.spans_weekend { " | weekend" } else { "" }
        );
    }

    let with_code = bookings.iter().filter(|b| b.phone_code.is_some()).count();
    let without_code = bookings.len() - with_code;
    println!("\nWith phone codes: {}", with_code);
    println!("Without phone codes: {}", without_code);

    if without_code > 0 {
        println!("\nBookings missing phone numbers:");
        for b in bookings.iter().filter(|b| b.phone_code.is_none()) {
            println!("  {} - {} - {}", b.guest_name, b.room, b.start_date);
            let preview: String = b.description.chars().take(80).collect();
            println!("    Description: {}", preview);
        }
    }

    Ok(())
}
