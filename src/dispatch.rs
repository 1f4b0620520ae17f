//! Turn routing
//!
//! For each line of input, in order:
//! 1. console commands (`exit`, `quit`, `list all agents`, `what's your focus <name>`)
//! 2. exact-text cache hit in shared memory
//! 3. a persona named in the message (first in registry order wins)
//! 4. highest bid across all personas, ties to the earliest registered
//!
//! Cached replies are served as-is, even if a different persona would win a
//! fresh round. A repeated question never gets a new answer within a session.

use eyre::Result;
use indexmap::IndexMap;

use crate::persona::{Persona, matcher};
use crate::session::Session;

/// How a persona was chosen to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Addressed,
    Bid,
}

/// Outcome of one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Exit,
    /// `(name, role)` in registry order
    Roster(Vec<(String, String)>),
    Focus { name: String, focus: String },
    UnknownPersona(String),
    Cached { reply: String },
    Reply { name: String, reply: String, route: Route },
}

pub struct Dispatcher {
    personas: IndexMap<String, Persona>,
    session: Session,
}

impl Dispatcher {
    pub fn new(personas: Vec<Persona>, session: Session) -> Result<Self> {
        if personas.is_empty() {
            eyre::bail!("At least one persona is required");
        }

        let mut registry = IndexMap::with_capacity(personas.len());
        for persona in personas {
            let name = persona.name().to_string();
            if registry.insert(name.clone(), persona).is_some() {
                eyre::bail!("Duplicate persona name: {}", name);
            }
        }

        Ok(Self {
            personas: registry,
            session,
        })
    }

    pub fn personas(&self) -> impl Iterator<Item = &Persona> {
        self.personas.values()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Process one line of input
    pub fn handle(&mut self, input: &str) -> Turn {
        if let Some(turn) = self.command(input) {
            return turn;
        }

        if let Some(reply) = self.session.memory.get(input) {
            log::info!("Serving cached reply for {:?}", input);
            return Turn::Cached {
                reply: reply.to_string(),
            };
        }

        let (index, route) = match self.addressed(input) {
            Some(index) => (index, Route::Addressed),
            None => (self.auction(input), Route::Bid),
        };

        let persona = &mut self.personas[index];
        log::info!("Routing to {} ({:?})", persona.name(), route);
        let reply = persona.respond(input, &mut self.session);

        Turn::Reply {
            name: persona.name().to_string(),
            reply,
            route,
        }
    }

    fn command(&self, input: &str) -> Option<Turn> {
        let lowered = input.trim().to_lowercase();
        match lowered.as_str() {
            "exit" | "quit" => Some(Turn::Exit),
            "list all agents" => Some(Turn::Roster(
                self.personas()
                    .map(|p| (p.name().to_string(), p.role().to_string()))
                    .collect(),
            )),
            _ if matcher::is_focus_query(input) => Some(self.focus(input)),
            _ => None,
        }
    }

    fn focus(&self, input: &str) -> Turn {
        let target = matcher::focus_target(input).unwrap_or_default();
        match self.personas().find(|p| p.name().eq_ignore_ascii_case(target)) {
            Some(persona) => Turn::Focus {
                name: persona.name().to_string(),
                focus: persona.focus().to_string(),
            },
            None => Turn::UnknownPersona(target.to_string()),
        }
    }

    /// Index of the first persona named in `message`
    fn addressed(&self, message: &str) -> Option<usize> {
        self.personas.values().position(|p| p.is_addressed_in(message))
    }

    /// Collect a bid from every persona; the strictly highest wins
    fn auction(&mut self, message: &str) -> usize {
        let mut winner = 0;
        let mut best: Option<u32> = None;

        for (index, persona) in self.personas.values_mut().enumerate() {
            let bid = persona.bid(message);
            log::debug!("{} bids {}", persona.name(), bid);
            if best.is_none_or(|b| bid > b) {
                best = Some(bid);
                winner = index;
            }
        }

        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::testing::{ScriptedModel, role_knowledge};
    use crate::persona::{APOLOGY_REPLY, ROSTER};
    use crate::session::Speaker;
    use std::sync::Arc;

    fn dispatcher_with(kb: [(&[&str], &str); 3], model: Arc<ScriptedModel>) -> Dispatcher {
        let personas = ROSTER
            .iter()
            .zip(kb)
            .map(|(profile, (keywords, focus))| {
                Persona::new(profile, role_knowledge(keywords, focus), model.clone()).unwrap()
            })
            .collect();
        Dispatcher::new(personas, Session::for_incident("db down", ROSTER.iter())).unwrap()
    }

    fn dispatcher(model: Arc<ScriptedModel>) -> Dispatcher {
        dispatcher_with(
            [
                (&["press"], "vision"),
                (&["deploy", "rollback"], "strategy"),
                (&["database"], "hands-on"),
            ],
            model,
        )
    }

    fn replied_by(turn: &Turn) -> (&str, Route) {
        match turn {
            Turn::Reply { name, route, .. } => (name.as_str(), *route),
            other => panic!("expected a reply, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_commands() {
        let mut d = dispatcher(ScriptedModel::replying(&[]));
        assert_eq!(d.handle("exit"), Turn::Exit);
        assert_eq!(d.handle("QUIT"), Turn::Exit);
        assert_eq!(d.handle("  Exit "), Turn::Exit);
    }

    #[test]
    fn test_list_all_agents_leaves_state_untouched() {
        let model = ScriptedModel::replying(&[]);
        let mut d = dispatcher(model.clone());

        let turn = d.handle("List All Agents");

        assert_eq!(
            turn,
            Turn::Roster(vec![
                ("Ben".to_string(), "CEO".to_string()),
                ("Tyne".to_string(), "CTO".to_string()),
                ("Da".to_string(), "Assistant".to_string()),
            ])
        );
        assert!(d.session().transcript.lines().is_empty());
        assert!(d.session().memory.is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn test_focus_command() {
        let mut d = dispatcher(ScriptedModel::replying(&[]));
        assert_eq!(
            d.handle("what's your focus tyne?"),
            Turn::Focus {
                name: "Tyne".to_string(),
                focus: "strategy".to_string()
            }
        );
        assert_eq!(d.handle("What's your focus Zed"), Turn::UnknownPersona("Zed".to_string()));
        assert!(d.session().transcript.lines().is_empty());
    }

    #[test]
    fn test_addressed_routing_beats_bidding() {
        let mut d = dispatcher(ScriptedModel::replying(&["ok"]));
        // Da would win the auction on "database" plus urgency
        let turn = d.handle("Tyne the database is corrupted, urgent");
        assert_eq!(replied_by(&turn), ("Tyne", Route::Addressed));
    }

    #[test]
    fn test_addressed_scenario_with_name_keyed_knowledge() {
        let mut d = dispatcher_with([(&[], ""), (&["deploy", "rollback"], ""), (&[], "")], ScriptedModel::replying(&["ok"]));
        let turn = d.handle("Tyne please deploy now");
        assert_eq!(replied_by(&turn), ("Tyne", Route::Addressed));
    }

    #[test]
    fn test_first_named_persona_in_registry_order_wins() {
        let mut d = dispatcher(ScriptedModel::replying(&["ok"]));
        let turn = d.handle("Da and Ben, sync up");
        assert_eq!(replied_by(&turn), ("Ben", Route::Addressed));
    }

    #[test]
    fn test_bid_routing() {
        let mut d = dispatcher(ScriptedModel::replying(&["Checking integrity now."]));
        let turn = d.handle("the database looks corrupted, urgent");

        assert_eq!(
            turn,
            Turn::Reply {
                name: "Da".to_string(),
                reply: "Checking integrity now.".to_string(),
                route: Route::Bid,
            }
        );
    }

    #[test]
    fn test_ties_go_to_first_registered() {
        let mut d = dispatcher(ScriptedModel::replying(&["ok", "ok"]));
        // Everyone bids 0
        assert_eq!(replied_by(&d.handle("hello?")), ("Ben", Route::Bid));
        // Everyone bids 10
        assert_eq!(replied_by(&d.handle("anyone? urgent")), ("Ben", Route::Bid));
    }

    #[test]
    fn test_cache_hit_skips_model_and_transcript() {
        let model = ScriptedModel::replying(&["first answer", "second answer"]);
        let mut d = dispatcher(model.clone());

        d.handle("what happened to the database?");
        let lines_after_first = d.session().transcript.lines().len();

        let turn = d.handle("what happened to the database?");

        assert_eq!(
            turn,
            Turn::Cached {
                reply: "first answer".to_string()
            }
        );
        assert_eq!(model.calls(), 1);
        assert_eq!(d.session().transcript.lines().len(), lines_after_first);
    }

    #[test]
    fn test_cache_is_exact_text() {
        let model = ScriptedModel::replying(&["a", "b"]);
        let mut d = dispatcher(model.clone());

        d.handle("status?");
        let turn = d.handle("Status?");

        assert!(matches!(turn, Turn::Reply { .. }));
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn test_transcript_interleaves_turns() {
        let mut d = dispatcher(ScriptedModel::replying(&["r1", "r2", "r3"]));
        d.handle("Ben, statement for the press?");
        d.handle("rollback plan?");
        d.handle("database state?");

        let speakers: Vec<&str> = d.session().transcript.lines().iter().map(|l| l.speaker.label()).collect();
        assert_eq!(speakers, vec!["User", "Ben", "User", "Tyne", "User", "Da"]);

        let user_lines = d
            .session()
            .transcript
            .lines()
            .iter()
            .filter(|l| l.speaker == Speaker::User)
            .count();
        assert_eq!(user_lines, 3);
    }

    #[test]
    fn test_every_dispatched_message_is_remembered() {
        let mut d = dispatcher(ScriptedModel::replying(&["r1", "r2"]));
        d.handle("Da, restart it");
        d.handle("rollback?");

        assert_eq!(d.session().memory.get("Da, restart it"), Some("r1"));
        assert_eq!(d.session().memory.get("rollback?"), Some("r2"));
    }

    #[test]
    fn test_model_failure_is_not_fatal() {
        let mut d = dispatcher(ScriptedModel::failing());
        let turn = d.handle("database?");

        assert_eq!(
            turn,
            Turn::Reply {
                name: "Da".to_string(),
                reply: APOLOGY_REPLY.to_string(),
                route: Route::Bid,
            }
        );
        assert_eq!(d.handle("exit"), Turn::Exit);
    }

    #[test]
    fn test_rejects_empty_roster() {
        assert!(Dispatcher::new(Vec::new(), Session::default()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let model = ScriptedModel::replying(&[]);
        let personas = vec![
            Persona::new(&ROSTER[0], Default::default(), model.clone()).unwrap(),
            Persona::new(&ROSTER[0], Default::default(), model).unwrap(),
        ];
        assert!(Dispatcher::new(personas, Session::default()).is_err());
    }
}
