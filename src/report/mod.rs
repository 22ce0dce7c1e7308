//! Summarizes provisioning results and exports the per-run CSV report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::workflow::CodeRecord;

/// Aggregated run statistics with records classified by outcome.
#[derive(Debug, Default)]
pub struct ReportSummary {
    pub total: usize,
    pub no_code: usize,
    pub succeeded: usize,
    pub failed_or_partial: usize,
    /// Fully-succeeded share of processed bookings, as a percentage.
    pub success_rate: f64,
    pub full_success: Vec<CodeRecord>,
    pub partial: Vec<CodeRecord>,
    pub full_failure: Vec<CodeRecord>,
}

/// Pure aggregation over the run's records.
pub fn summarize(records: &[CodeRecord]) -> ReportSummary {
    let mut summary = ReportSummary {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        if record.phone_code.is_none() {
            summary.no_code += 1;
        } else if record.front_door_success && record.room_code_success {
            summary.succeeded += 1;
            summary.full_success.push(record.clone());
        } else if record.front_door_success || record.room_code_success {
            summary.failed_or_partial += 1;
            summary.partial.push(record.clone());
        } else {
            summary.failed_or_partial += 1;
            summary.full_failure.push(record.clone());
        }
    }

    if summary.total > 0 {
        summary.success_rate = summary.succeeded as f64 / summary.total as f64 * 100.0;
    }

    summary
}

/// Render the summary to the console.
pub fn render(summary: &ReportSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("PROVISIONING REPORT");
    println!("{}", "=".repeat(60));
    println!("Bookings processed:        {}", summary.total);
    println!("Without phone numbers:     {}", summary.no_code);
    println!("Fully succeeded:           {}", summary.succeeded);
    println!("Failed or partial:         {}", summary.failed_or_partial);
    if summary.total > 0 {
        println!("Success rate:              {:.1}%", summary.success_rate);
    }

    if !summary.full_success.is_empty() {
        println!("\nSuccessful code assignments:");
        for record in &summary.full_success {
            println!(
                "  {} - {}: code {}",
                record.guest_name,
                record.room,
                record.phone_code.as_deref().unwrap_or("None")
            );
        }
    }

    if !summary.partial.is_empty() {
        println!("\nPartial successes:");
        for record in &summary.partial {
            println!(
                "  {} - {}: front {} / room {}",
                record.guest_name,
                record.room,
                flag(record.front_door_success),
                flag(record.room_code_success)
            );
        }
    }

    if !summary.full_failure.is_empty() {
        println!("\nComplete failures:");
        for record in &summary.full_failure {
            println!(
                "  {} - {}: {}",
                record.guest_name,
                record.room,
                record.failure_reason.as_deref().unwrap_or("")
            );
        }
    }
    println!("{}", "=".repeat(60));
}

/// Flat CSV projection of a [`CodeRecord`].
#[derive(Debug, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Booking_ID")]
    pub booking_id: String,
    #[serde(rename = "Guest_Name")]
    pub guest_name: String,
    #[serde(rename = "Room")]
    pub room: String,
    #[serde(rename = "Check_In")]
    pub check_in: String,
    #[serde(rename = "Check_Out")]
    pub check_out: String,
    #[serde(rename = "Phone_Code")]
    pub phone_code: String,
    #[serde(rename = "Front_Success")]
    pub front_success: String,
    #[serde(rename = "Room_Success")]
    pub room_success: String,
    #[serde(rename = "Overall_Success")]
    pub overall_success: String,
    #[serde(rename = "Is_Weekend")]
    pub is_weekend: String,
    #[serde(rename = "Failure_Reason")]
    pub failure_reason: String,
}

impl From<&CodeRecord> for ReportRow {
    fn from(record: &CodeRecord) -> Self {
        Self {
            booking_id: record.booking_id.clone(),
            guest_name: record.guest_name.clone(),
            room: record.room.clone(),
            check_in: record.start_date.to_string(),
            check_out: record.end_date.to_string(),
            phone_code: record
                .phone_code
                .clone()
                .unwrap_or_else(|| "None".to_string()),
            front_success: flag(record.front_door_success).to_string(),
            room_success: flag(record.room_code_success).to_string(),
            overall_success: flag(record.front_door_success && record.room_code_success)
                .to_string(),
            is_weekend: flag(record.is_weekend).to_string(),
            failure_reason: record.failure_reason.clone().unwrap_or_default(),
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value { "YES" } else { "NO" }
}

/// Write one CSV report per run, named with the run timestamp so
/// consecutive runs never overwrite each other. Returns the path
/// written.
pub fn write_csv(records: &[CodeRecord], out_dir: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = out_dir.join(format!("code_report_{}.csv", timestamp));

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    for record in records {
        writer.serialize(ReportRow::from(record))?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = records.len(), "report_exported");
    Ok(path)
}
