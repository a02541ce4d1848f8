//! Shared human-readable output helpers.

use colored::{ColoredString, Colorize};
use crossrig_core::{BoneMapping, MappingEntry, MappingOrigin, ValidationIssue};

/// Confidence at or above which an entry prints green.
const HIGH_CONFIDENCE: f64 = 0.9;

/// Formats a confidence, colored by how trustworthy it is.
pub fn confidence(value: f64, low: f64) -> ColoredString {
    let text = format!("{:.2}", value);
    if value >= HIGH_CONFIDENCE {
        text.green()
    } else if value >= low {
        text.yellow()
    } else {
        text.red()
    }
}

fn origin(origin: MappingOrigin) -> ColoredString {
    match origin {
        MappingOrigin::Manual => "manual".cyan(),
        MappingOrigin::Auto => "auto".dimmed(),
    }
}

/// Prints one entry as `source -> target (confidence, origin)`.
pub fn print_entry(entry: &MappingEntry, low: f64) {
    println!(
        "  {} {} {} ({}, {})",
        entry.source_bone,
        "->".dimmed(),
        entry.target_bone,
        confidence(entry.confidence, low),
        origin(entry.origin)
    );
}

/// Prints every entry of a mapping.
pub fn print_entries(mapping: &BoneMapping, low: f64) {
    if mapping.is_empty() {
        println!("  {}", "(no entries)".dimmed());
        return;
    }
    for entry in mapping.entries() {
        print_entry(entry, low);
    }
}

/// Prints a titled list of bone names, if any.
pub fn print_bone_list(title: &str, bones: &[String]) {
    if bones.is_empty() {
        return;
    }
    println!("\n{} ({})", title.yellow().bold(), bones.len());
    for bone in bones {
        println!("  {} {}", "-".yellow(), bone);
    }
}

/// Prints validation issues, blocking ones first.
pub fn print_issues(issues: &[ValidationIssue]) {
    let (blocking, advisory): (Vec<_>, Vec<_>) = issues.iter().partition(|i| i.is_blocking());

    if !blocking.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for issue in blocking {
            println!(
                "  {} [{}]: {}",
                "x".red(),
                issue.code.to_string().red(),
                issue.message
            );
        }
    }

    if !advisory.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for issue in advisory {
            println!(
                "  {} [{}]: {}",
                "!".yellow(),
                issue.code.to_string().yellow(),
                issue.message
            );
        }
    }
}
