//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by its identity (`category/name`) with a positional
//! index; the source that was finally used, its fallback level and its
//! status follow as indented context lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Images
//! 001 hero/main-banner
//!     Source: /images/hero/main-banner-optimized.jpg
//!     Level: 1 (secondary)
//!     Status: loaded
//! 002 reviews/happy-customer (no metadata)
//!     Source: /images/fallbacks/review-fallback.jpg
//!     Level: 2 (placeholder)
//!     Status: placeholder
//!
//! Fallbacks
//!     hero/main-banner: 1 (levels 0)
//!     reviews/happy-customer: 1 (levels 0)
//!
//! Checked 2 images: 1 loaded, 1 placeholder, 0 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::session::ElementReport;
use crate::stats::StatsRecorder;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn level_name(level: u8) -> &'static str {
    match level {
        0 => "primary",
        1 => "secondary",
        2 => "placeholder",
        _ => "failed",
    }
}

fn status(report: &ElementReport) -> &'static str {
    if report.loaded {
        "loaded"
    } else if report.failed {
        "failed"
    } else if report.level >= 2 {
        "placeholder"
    } else {
        "pending"
    }
}

// ============================================================================
// Stats
// ============================================================================

/// One line per image that ever left its primary source.
pub fn format_stats(stats: &StatsRecorder) -> Vec<String> {
    let snapshot = stats.snapshot();
    if snapshot.is_empty() {
        return vec![format!("{}none", indent(1))];
    }
    snapshot
        .iter()
        .map(|(key, stat)| {
            let levels: Vec<String> = stat.levels_observed.iter().map(u8::to_string).collect();
            format!(
                "{}{}: {} (levels {})",
                indent(1),
                key,
                stat.occurrence_count,
                levels.join(", ")
            )
        })
        .collect()
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(reports: &[ElementReport], stats: &StatsRecorder) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    for (i, report) in reports.iter().enumerate() {
        let detail = if report.degraded { " (no metadata)" } else { "" };
        lines.push(format!("{} {}{}", format_index(i + 1), report.image, detail));
        lines.push(format!("{}Source: {}", indent(1), report.source));
        lines.push(format!(
            "{}Level: {} ({})",
            indent(1),
            report.level,
            level_name(report.level)
        ));
        lines.push(format!("{}Status: {}", indent(1), status(report)));
    }

    lines.push(String::new());
    lines.push("Fallbacks".to_string());
    lines.extend(format_stats(stats));

    let loaded = reports.iter().filter(|r| r.loaded).count();
    let failed = reports.iter().filter(|r| r.failed).count();
    let placeholder = reports.iter().filter(|r| status(r) == "placeholder").count();
    lines.push(String::new());
    lines.push(format!(
        "Checked {} images: {} loaded, {} placeholder, {} failed",
        reports.len(),
        loaded,
        placeholder,
        failed
    ));
    lines
}

pub fn print_check_output(reports: &[ElementReport], stats: &StatsRecorder) {
    for line in format_check_output(reports, stats) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, FallbackLevel};

    fn report(image: &str, level: u8, loaded: bool, failed: bool) -> ElementReport {
        ElementReport {
            image: image.to_string(),
            level,
            source: format!("/images/{image}.jpg"),
            loaded,
            failed,
            degraded: false,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn status_precedence() {
        assert_eq!(status(&report("a", 1, true, false)), "loaded");
        assert_eq!(status(&report("a", 3, false, true)), "failed");
        assert_eq!(status(&report("a", 2, false, false)), "placeholder");
        assert_eq!(status(&report("a", 0, false, false)), "pending");
    }

    // =========================================================================
    // Stats
    // =========================================================================

    #[test]
    fn format_stats_empty() {
        assert_eq!(format_stats(&StatsRecorder::new()), vec!["    none"]);
    }

    #[test]
    fn format_stats_lists_levels() {
        let mut stats = StatsRecorder::new();
        stats.record(Category::Hero, "x", FallbackLevel::Secondary);
        stats.record(Category::Hero, "x", FallbackLevel::Placeholder);
        assert_eq!(format_stats(&stats), vec!["    hero/x: 2 (levels 1, 2)"]);
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn format_check_output_shape() {
        let mut degraded = report("reviews/gone", 2, false, false);
        degraded.degraded = true;
        let reports = vec![report("hero/main-banner", 1, true, false), degraded];
        let mut stats = StatsRecorder::new();
        stats.record(Category::Hero, "main-banner", FallbackLevel::Primary);

        let lines = format_check_output(&reports, &stats);
        assert_eq!(lines[0], "Images");
        assert_eq!(lines[1], "001 hero/main-banner");
        assert_eq!(lines[2], "    Source: /images/hero/main-banner.jpg");
        assert_eq!(lines[3], "    Level: 1 (secondary)");
        assert_eq!(lines[4], "    Status: loaded");
        assert_eq!(lines[5], "002 reviews/gone (no metadata)");
        assert!(lines.contains(&"    hero/main-banner: 1 (levels 0)".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Checked 2 images: 1 loaded, 1 placeholder, 0 failed"
        );
    }
}
