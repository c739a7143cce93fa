pub mod table;
pub mod json;

use crate::chart::compare::Comparison;
use crate::error::Result;

pub fn print(comparison: &Comparison, top_n: usize, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", json::render(comparison)?);
    } else {
        print!("{}", table::render(comparison, top_n));
    }
    Ok(())
}

pub fn print_overview(comparisons: &[Comparison], top_n: usize, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", json::render_overview(comparisons)?);
    } else {
        print!("{}", table::render_overview(comparisons, top_n));
    }
    Ok(())
}

/// Print ingestion or load problems the way `--verbose` expects them.
pub fn print_diagnostics(diagnostics: &[String], verbose: bool) {
    if diagnostics.is_empty() {
        return;
    }

    eprintln!();
    if verbose {
        eprintln!("Diagnostics:");
        eprintln!("{}", "-".repeat(40));
        for diagnostic in diagnostics {
            eprintln!("  {diagnostic}");
        }
    } else {
        for diagnostic in diagnostics {
            eprintln!("[diagnostic] {diagnostic}");
        }
    }
}
