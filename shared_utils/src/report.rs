//! Report Module
//!
//! Provides summary reporting functionality for batch operations.

use crate::batch::BatchResult;
use crate::types::FileSize;
use std::time::Duration;

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

pub fn print_summary_report(
    result: &BatchResult,
    duration: Duration,
    input_size: FileSize,
    output_size: FileSize,
    operation_name: &str,
) {
    let ratio = output_size
        .compression_ratio(input_size)
        .map(|r| r * 100.0)
        .unwrap_or(0.0);

    println!();
    println!("╔══════════════════════════════════════════════════════════════════════════════╗");
    println!(
        "║                        📊 {} Summary Report                        ║",
        operation_name
    );
    println!("╠══════════════════════════════════════════════════════════════════════════════╣");
    println!(
        "║  📁 Files Processed:    {:>10}                                         ║",
        result.total
    );
    println!(
        "║  ✅ Succeeded:          {:>10}                                         ║",
        result.succeeded
    );
    println!(
        "║  ❌ Failed:             {:>10}                                         ║",
        result.failed
    );
    println!(
        "║  ⏭️  Skipped:            {:>10}                                         ║",
        result.skipped
    );
    println!(
        "║  📈 Success Rate:       {:>9.1}%                                         ║",
        result.success_rate()
    );
    println!("╠══════════════════════════════════════════════════════════════════════════════╣");
    println!(
        "║  💾 Input Size:         {:>10}                                         ║",
        input_size.display()
    );
    println!(
        "║  💾 Output Size:        {:>10}                                         ║",
        output_size.display()
    );
    println!(
        "║  📉 Output/Input:       {:>9.1}%                                         ║",
        ratio
    );
    println!("╠══════════════════════════════════════════════════════════════════════════════╣");
    println!(
        "║  ⏱️  Total Time:         {:>10}                                         ║",
        format_duration(duration)
    );
    if result.total > 0 {
        let avg_time = duration.as_secs_f64() / result.total as f64;
        println!(
            "║  ⏱️  Avg Time/File:      {:>9.2}s                                         ║",
            avg_time
        );
    }
    println!("╚══════════════════════════════════════════════════════════════════════════════╝");

    if !result.errors.is_empty() {
        println!();
        println!("❌ Errors encountered:");
        println!(
            "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
        );
        for (path, error) in &result.errors {
            println!("   {} → {}", path.display(), error);
        }
    }
}

pub fn print_simple_summary(result: &BatchResult) {
    println!(
        "\nCompleted: {}/{} conversions successful",
        result.succeeded, result.total
    );
}
