//! Offline model
//!
//! Echoes the prompt back and appends an acknowledgement of the latest user
//! line, which is roughly what a chat model replaying a transcript looks like.

use eyre::Result;

use super::LanguageModel;
use crate::session::USER_LABEL;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoModel;

impl LanguageModel for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let user_prefix = format!("{}: ", USER_LABEL);
        let last_user = prompt
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(user_prefix.as_str()))
            .unwrap_or_default();

        Ok(format!("{}\nNoted: \"{}\". Looking into it now.", prompt, last_user))
    }
}
