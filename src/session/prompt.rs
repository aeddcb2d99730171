//! Blocking user prompts raised by the session

/// Modal dialogs the host shows on the session's behalf
pub trait Prompt {
    /// Ask a yes/no question; `true` means the user confirmed
    fn confirm(&mut self, title: &str, message: &str) -> bool;
    /// Show an informational message
    fn inform(&mut self, title: &str, message: &str);
}

/// Prompt with a fixed answer that records every message it was shown
#[derive(Clone, Debug, Default)]
pub struct ScriptedPrompt {
    pub answer: bool,
    pub shown: Vec<(String, String)>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            shown: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        log::debug!("confirm: {title}: {message} -> {}", self.answer);
        self.shown.push((title.to_string(), message.to_string()));
        self.answer
    }

    fn inform(&mut self, title: &str, message: &str) {
        log::debug!("inform: {title}: {message}");
        self.shown.push((title.to_string(), message.to_string()));
    }
}
