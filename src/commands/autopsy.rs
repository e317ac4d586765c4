//! Autopsy report commands

use crate::app::App;
use crate::autopsy;
use crate::error::Result;
use crate::models::AutopsyReport;

pub async fn cmd_autopsy_generate(app: &App, job_id: Option<&str>) -> Result<AutopsyReport> {
    autopsy::generate(app, job_id).await
}

/// Stored report for a job, or for the latest job when omitted
pub async fn cmd_autopsy_show(app: &App, job_id: Option<&str>) -> Result<AutopsyReport> {
    let job_id = match job_id {
        Some(id) => id.to_string(),
        None => autopsy::latest_job_id(app).await?,
    };
    autopsy::latest(app, &job_id).await
}

pub async fn cmd_autopsy_latest_job(app: &App) -> Result<String> {
    autopsy::latest_job_id(app).await
}

fn score_bar(score: u8) -> String {
    let filled = (score as usize + 5) / 10;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

pub fn print_autopsy_report(report: &AutopsyReport) {
    println!("\n🧬 Digital Autopsy\n");
    println!("Archetype: {}", report.archetype.name);
    println!("  {}", report.archetype.description);

    if !report.biases.is_empty() {
        println!("\nBiases:");
        for bias in &report.biases {
            println!("  {:<12} {} {:>3}", bias.name, score_bar(bias.score), bias.score);
        }
    }

    println!("\nDrift score: {}/100", report.drift_score);
    if let Some(err) = &report.error {
        println!("\n⚠ {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bar_width() {
        assert_eq!(score_bar(0).chars().count(), 10);
        assert_eq!(score_bar(100), "█".repeat(10));
        assert!(score_bar(55).starts_with("██████░"));
    }
}
