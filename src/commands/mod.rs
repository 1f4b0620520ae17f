pub mod agents;
pub mod chat;
pub mod completions;
pub mod incidents;
