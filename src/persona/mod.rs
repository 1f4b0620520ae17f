//! Incident-room personas
//!
//! Each persona has a fixed profile (name, role, greeting, bio), knowledge
//! loaded for its role, and two pieces of private state:
//! - the exchanges it has answered
//! - how often each of its keywords has matched, used to damp repeat bids

use eyre::Result;
use std::collections::HashMap;
use std::sync::Arc;

pub mod knowledge;
pub mod matcher;

use crate::model::LanguageModel;
use crate::session::{Session, SharedMemory};
use knowledge::{KnowledgeBase, RoleKnowledge};
use matcher::NamePattern;

/// Reply substituted when the model call fails
pub const APOLOGY_REPLY: &str = "Sorry, I encountered an error. Please try again.";

const KEYWORD_POINTS: u32 = 5;
const URGENCY_POINTS: u32 = 10;
/// Matches after this many cost `RECURRENCE_PENALTY` points each
const RECURRENCE_THRESHOLD: u32 = 3;
const RECURRENCE_PENALTY: u32 = 2;

/// Static identity of a persona
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub role: &'static str,
    pub greeting: &'static str,
    pub bio: &'static str,
}

/// The cast, in registry order. Addressing and bid ties resolve in this order.
pub static ROSTER: [Profile; 3] = [
    Profile {
        name: "Ben",
        role: "CEO",
        greeting: "Hello, I'm Ben, the CEO.",
        bio: "As the CEO of the company, Ben is responsible for the overall vision and direction of the \
              company. He focuses on high-level decisions, managing company resources, building \
              partnerships, and maintaining company culture. Ben often interacts with stakeholders, \
              partners, and the media.",
    },
    Profile {
        name: "Tyne",
        role: "CTO",
        greeting: "Hey there, Tyne here - the CTO.",
        bio: "Tyne, as the Chief Technical Officer, oversees all technical operations and strategies of \
              the company. This includes software development, infrastructure, and cybersecurity. Tyne \
              works closely with the technical teams to ensure projects are on track and the company's \
              technical goals are achieved.",
    },
    Profile {
        name: "Da",
        role: "Assistant",
        greeting: "Hi! I'm Da, your trusty technical assistant.",
        bio: "Da is the technical assistant responsible for actual deployments, updates, and hands-on \
              technical tasks. He implements the strategies set by Tyne and often troubleshoots \
              technical issues, ensuring smooth operations. Da is the go-to for understanding the \
              specifics of any technical incident.",
    },
];

/// One answered request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub request: String,
    pub reply: String,
}

pub struct Persona {
    profile: &'static Profile,
    knowledge: RoleKnowledge,
    model: Arc<dyn LanguageModel>,
    name_pattern: NamePattern,
    history: Vec<Exchange>,
    keyword_memory: HashMap<String, u32>,
}

impl Persona {
    pub fn new(profile: &'static Profile, knowledge: RoleKnowledge, model: Arc<dyn LanguageModel>) -> Result<Self> {
        Ok(Self {
            profile,
            knowledge,
            model,
            name_pattern: NamePattern::new(profile.name)?,
            history: Vec::new(),
            keyword_memory: HashMap::new(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.profile.name
    }

    pub fn role(&self) -> &'static str {
        self.profile.role
    }

    pub fn profile(&self) -> &'static Profile {
        self.profile
    }

    pub fn focus(&self) -> &str {
        &self.knowledge.focus
    }

    pub fn keywords(&self) -> &[String] {
        &self.knowledge.keywords
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Greeting plus whatever the shared memory holds under this persona's role
    pub fn system_preamble(&self, memory: &SharedMemory) -> String {
        match memory.get(self.profile.role) {
            Some(recent) => format!("{} {}", self.profile.greeting, recent),
            None => self.profile.greeting.to_string(),
        }
    }

    /// True if the message names this persona as a whole word
    pub fn is_addressed_in(&self, message: &str) -> bool {
        self.name_pattern.is_match(message)
    }

    /// Score how relevant this persona is to `message`.
    ///
    /// Every keyword found adds 5, or 3 once that keyword has matched more
    /// than three times. Each urgency marker adds 10. Updates the keyword
    /// recurrence counters.
    pub fn bid(&mut self, message: &str) -> u32 {
        let mut bid = 0;

        for keyword in &self.knowledge.keywords {
            if !matcher::contains_term(message, keyword) {
                continue;
            }
            let seen = self.keyword_memory.entry(keyword.clone()).or_insert(0);
            *seen += 1;
            bid += if *seen > RECURRENCE_THRESHOLD {
                KEYWORD_POINTS - RECURRENCE_PENALTY
            } else {
                KEYWORD_POINTS
            };
        }

        bid + matcher::urgency_hits(message) as u32 * URGENCY_POINTS
    }

    /// Answer `message` with the whole shared transcript as context.
    ///
    /// Model failures are logged and answered with [`APOLOGY_REPLY`]; the
    /// transcript, shared memory and history are updated either way.
    pub fn respond(&mut self, message: &str, session: &mut Session) -> String {
        let sent_line = session.transcript.push_user(message);
        let prompt = session.transcript.render();

        let reply = match self.model.complete(&prompt) {
            Ok(raw) => self.extract_reply(&raw, &sent_line),
            Err(e) => {
                log::error!("{} failed to get a completion from {}: {:#}", self.name(), self.model.name(), e);
                APOLOGY_REPLY.to_string()
            }
        };

        session.transcript.push_reply(self.name(), &reply);
        session.memory.remember(message, &reply);
        self.history.push(Exchange {
            request: message.to_string(),
            reply: reply.clone(),
        });
        reply
    }

    fn extract_reply(&self, raw: &str, sent_line: &str) -> String {
        let reply = matcher::reply_after(raw, sent_line);
        matcher::strip_label(reply, self.name()).to_string()
    }
}

impl std::fmt::Debug for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persona")
            .field("name", &self.profile.name)
            .field("role", &self.profile.role)
            .field("model", &self.model.name())
            .field("history", &self.history.len())
            .finish()
    }
}

/// Build the full cast with knowledge from `kb`, all sharing one model
pub fn roster(kb: &KnowledgeBase, model: Arc<dyn LanguageModel>) -> Result<Vec<Persona>> {
    ROSTER
        .iter()
        .map(|profile| Persona::new(profile, kb.for_persona(profile.role, profile.name), Arc::clone(&model)))
        .collect()
}
