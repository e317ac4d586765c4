//! Upload command implementation

use crate::app::App;
use crate::error::Result;
use crate::ingest::{process_upload, UploadSummary};
use std::path::Path;

/// Replace stored history with the contents of an export archive
pub async fn cmd_upload(app: &App, path: &Path) -> Result<UploadSummary> {
    process_upload(app, path).await
}

pub fn print_upload_summary(summary: &UploadSummary) {
    println!("\n✓ Upload processed: {}", summary.file_name);
    println!("  Upload ID: {}", summary.upload_id);
    println!("  Posts found: {}", summary.total_found);
    println!("  New posts: {}", summary.posts_parsed);
    println!("  Duplicates skipped: {}", summary.posts_skipped);
    if summary.total_found == 0 {
        println!("\n⚠ No posts were recognized in this archive.");
    } else {
        println!("\nNext: alterego analyze");
    }
}
