//! List rules command implementation.

use anyhow::{Context, Result};
use typesmith_rules::{default_rule_set, Preset};

/// Runs the list-rules command.
///
/// # Errors
///
/// Fails only if the built-in catalog is malformed.
pub fn run() -> Result<()> {
    let rules = default_rule_set().context("Failed to build rule catalog")?;

    println!("Available rules (catalog {}):\n", rules.version());
    println!("{:<7} {:<36} {:<11} {:<4} Description", "Code", "Name", "Severity", "Fix");
    println!("{}", "-".repeat(100));

    for rule in rules.iter() {
        println!(
            "{:<7} {:<36} {:<11} {:<4} {}",
            rule.code,
            rule.name,
            rule.severity,
            if rule.is_fixable() { "yes" } else { "no" },
            rule.description
        );
    }

    println!("\nPresets:");
    for preset in Preset::ALL {
        let count = preset.rules().len();
        println!("  {:<12} - {count} rule(s)", preset.name());
    }

    println!("\nUse --rules or --deny to select rules by name or code, e.g.:");
    println!("  typesmith check --rules no-explicit-any,no-double-assertion");
    println!("  typesmith check --deny TY014,TY015");
    Ok(())
}
