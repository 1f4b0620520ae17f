//! Persona listing

use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::persona::ROSTER;
use crate::persona::knowledge::KnowledgeBase;

#[derive(Debug, Serialize)]
struct AgentSummary {
    name: &'static str,
    role: &'static str,
    greeting: &'static str,
    keywords: Vec<String>,
    focus: String,
}

fn summaries(kb: &KnowledgeBase) -> Vec<AgentSummary> {
    ROSTER
        .iter()
        .map(|profile| {
            let knowledge = kb.for_persona(profile.role, profile.name);
            AgentSummary {
                name: profile.name,
                role: profile.role,
                greeting: profile.greeting,
                keywords: knowledge.keywords,
                focus: knowledge.focus,
            }
        })
        .collect()
}

pub fn run(format: OutputFormat, config: &Config) -> Result<()> {
    let kb = KnowledgeBase::resolve(&config.paths)?;
    let agents = summaries(&kb);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&agents)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&agents)?),
        OutputFormat::Text => {
            println!("{}", "Agents:".bold());
            println!();

            for agent in &agents {
                println!("  {} {} {}", "●".green(), agent.name.bold(), format!("({})", agent.role).dimmed());
                println!("    {}", agent.greeting.dimmed());
                if agent.focus.is_empty() {
                    println!("    Focus: {}", "(none)".dimmed());
                } else {
                    println!("    Focus: {}", agent.focus);
                }
                if !agent.keywords.is_empty() {
                    println!("    Keywords: {}", agent.keywords.join(", ").cyan());
                }
                println!();
            }
        }
    }

    Ok(())
}
