use crate::domain::{Key, ToolMode};

/// Session-level action bound to a key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Drop the selection and go back to panning
    FinishRedacting,
}

pub fn handle_key_event(mode: ToolMode, key: Key) -> Option<ShortcutAction> {
    match key {
        // Enter/Return ends a redaction pass
        Key::Enter | Key::Return if mode == ToolMode::Redact => {
            Some(ShortcutAction::FinishRedacting)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_only_bound_in_redact_mode() {
        assert_eq!(
            handle_key_event(ToolMode::Redact, Key::Return),
            Some(ShortcutAction::FinishRedacting)
        );
        assert_eq!(
            handle_key_event(ToolMode::Redact, Key::Enter),
            Some(ShortcutAction::FinishRedacting)
        );
        assert_eq!(handle_key_event(ToolMode::Pin, Key::Enter), None);
        assert_eq!(handle_key_event(ToolMode::Redact, Key::Other), None);
    }
}
