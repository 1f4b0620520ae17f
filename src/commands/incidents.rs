//! Incident catalog listing

use colored::*;
use eyre::Result;

use crate::cli::OutputFormat;
use crate::incident::{CATALOG, Severity};

pub fn run(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&CATALOG)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&CATALOG)?),
        OutputFormat::Text => {
            println!("{}", "Incidents:".bold());
            println!();

            for (index, incident) in CATALOG.iter().enumerate() {
                let severity = incident.severity.to_string();
                let severity = match incident.severity {
                    Severity::High => severity.red(),
                    Severity::Medium => severity.yellow(),
                    Severity::Low => severity.green(),
                };
                println!("  {} [{}]", format!("#{}", index + 1).bold(), severity);
                println!("    {}", incident.description);
                println!();
            }

            println!("  Start one with: {}", "warroom chat --incident <N>".cyan());
        }
    }

    Ok(())
}
