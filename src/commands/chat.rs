//! Interactive incident chat

use chrono::Local;
use colored::*;
use eyre::{Context, Result};
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use crate::cli::ChatArgs;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Turn};
use crate::incident::{self, Incident};
use crate::model;
use crate::persona::{self, knowledge::KnowledgeBase};
use crate::session::Session;

const PROMPT: &str = "Incident Manager (You):";
const SYSTEM_LABEL: &str = "System";

/// Timestamped console output with a pause after each line
struct Console {
    pacing: Duration,
    intro_pacing: Duration,
    /// Skip the incident report and greetings
    quiet: bool,
}

impl Console {
    fn new(config: &Config, no_pacing: bool, quiet: bool) -> Self {
        if no_pacing {
            return Self {
                pacing: Duration::ZERO,
                intro_pacing: Duration::ZERO,
                quiet,
            };
        }
        Self {
            pacing: Duration::from_millis(config.console.pacing_ms),
            intro_pacing: Duration::from_millis(config.console.intro_pacing_ms),
            quiet,
        }
    }

    fn report(&self, incident: &Incident) {
        if self.quiet {
            return;
        }
        println!(
            "{} {}\n",
            format!("Incident report (Severity: {}):", incident.severity).red().bold(),
            incident.description
        );
        thread::sleep(self.intro_pacing);
    }

    fn greet(&self, label: &str, text: &str) {
        if !self.quiet {
            self.say(label, text);
        }
    }

    fn say(&self, label: &str, text: &str) {
        println!("{}\n", format_line(&Local::now().format("%H:%M:%S").to_string(), label, text));
        thread::sleep(self.pacing);
    }
}

fn format_line(time: &str, label: &str, text: &str) -> String {
    format!("{} - {}: {}", time.dimmed(), label.cyan().bold(), text)
}

pub fn run(args: ChatArgs, config: &Config, quiet: bool) -> Result<()> {
    let incident = incident::pick(args.incident)?;

    let mut model_config = config.model.clone();
    if let Some(provider) = args.model {
        model_config.provider = provider;
    }
    let model = model::from_config(&model_config).context("Failed to set up language model")?;

    let kb = KnowledgeBase::resolve(&config.paths).context("Failed to load knowledge base")?;
    log::debug!("Knowledge base has {} roles", kb.len());
    let personas = persona::roster(&kb, model)?;
    let session = Session::for_incident(incident.description, personas.iter().map(|p| p.profile()));
    let mut dispatcher = Dispatcher::new(personas, session)?;

    log::info!("Session started: {} severity incident", incident.severity);
    log::debug!(
        "Context preamble is {} bytes",
        dispatcher.session().transcript.preamble().len()
    );

    let console = Console::new(config, args.no_pacing, quiet);
    console.report(incident);
    for persona in dispatcher.personas() {
        log::debug!("{} keywords: {:?}", persona.name(), persona.keywords());
        console.greet(persona.role(), &persona.system_preamble(&dispatcher.session().memory));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} ", PROMPT.bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            // EOF ends the session like `exit`
            println!();
            break;
        };
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        match dispatcher.handle(&line) {
            Turn::Exit => break,
            Turn::Roster(entries) => {
                for (name, role) in entries {
                    println!("{} - {}", name.bold(), role);
                }
            }
            Turn::Focus { focus, .. } => println!("{}", focus),
            Turn::UnknownPersona(name) => {
                println!("{}", format!("No agent named '{}'. Try 'list all agents'.", name).dimmed());
            }
            Turn::Cached { reply } => console.say(SYSTEM_LABEL, &format!("Previously addressed: {}", reply)),
            Turn::Reply { name, reply, route } => {
                log::debug!("{} answered via {:?}", name, route);
                console.say(&name, &reply);
            }
        }
    }

    println!("Exiting chat system...");
    let session = dispatcher.session();
    log::info!(
        "Session ended: {} transcript lines, {} cached replies",
        session.transcript.lines().len(),
        session.memory.len()
    );
    for persona in dispatcher.personas() {
        log::info!("{} answered {} messages", persona.name(), persona.history().len());
    }
    Ok(())
}
