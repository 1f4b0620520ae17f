//! Shared conversation state
//!
//! One `Session` exists per run. It owns the transcript every persona replays
//! to the model and the exact-text answer cache. The dispatcher holds it and
//! lends it to whichever persona is answering.

use std::collections::HashMap;

use crate::persona::Profile;

/// Label used for user lines in the transcript
pub const USER_LABEL: &str = "User";

/// Who said a transcript line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    User,
    Persona(String),
}

impl Speaker {
    pub fn label(&self) -> &str {
        match self {
            Speaker::User => USER_LABEL,
            Speaker::Persona(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptLine {
    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.text)
    }
}

/// Append-only conversation log, in turn order
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    preamble: String,
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            lines: Vec::new(),
        }
    }

    /// Append a user line and return it as rendered in the prompt
    pub fn push_user(&mut self, text: &str) -> String {
        self.push(Speaker::User, text)
    }

    pub fn push_reply(&mut self, name: &str, text: &str) -> String {
        self.push(Speaker::Persona(name.to_string()), text)
    }

    fn push(&mut self, speaker: Speaker, text: &str) -> String {
        let line = TranscriptLine {
            speaker,
            text: text.to_string(),
        };
        let rendered = line.render();
        self.lines.push(line);
        rendered
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    /// The whole conversation as one prompt
    pub fn render(&self) -> String {
        let mut out = self.preamble.clone();
        for line in &self.lines {
            out.push('\n');
            out.push_str(&line.render());
        }
        out
    }
}

/// Exact-text memo of user messages to the reply they got
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    entries: HashMap<String, String>,
}

impl SharedMemory {
    pub fn get(&self, message: &str) -> Option<&str> {
        self.entries.get(message).map(String::as_str)
    }

    pub fn remember(&mut self, message: &str, reply: &str) {
        self.entries.insert(message.to_string(), reply.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub transcript: Transcript,
    pub memory: SharedMemory,
}

impl Session {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            memory: SharedMemory::default(),
        }
    }

    /// Start a session whose transcript opens with the incident and the cast
    pub fn for_incident<'a>(description: &str, cast: impl IntoIterator<Item = &'a Profile>) -> Self {
        Self::new(Transcript::new(context_preamble(description, cast)))
    }
}

/// Opening context replayed to the model on every turn
pub fn context_preamble<'a>(description: &str, cast: impl IntoIterator<Item = &'a Profile>) -> String {
    let mut out = format!("Incident: {}\n", description);
    for profile in cast {
        out.push_str(&format!("\n{}: {}\n", profile.name, profile.bio));
    }
    out.push_str(
        "\nInstructions for Chat Model:\n\
         1. Always respond from the perspective of the addressed agent.\n\
         2. Avoid prefixing other agent names in the response.\n\
         \n\
         You are now role-playing as these characters. The user is the incident manager who will \
         seek to collaborate with you to solve the Incident. Respond as the respective person based \
         on the user's input. Remember your roles.",
    );
    out
}
