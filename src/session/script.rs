//! Replay of recorded session input
//!
//! A script is a JSON array of steps, each tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "mode", "mode": "arrow"},
//!   {"op": "press", "x": 100, "y": 100},
//!   {"op": "move", "x": 150, "y": 100},
//!   {"op": "release", "x": 150, "y": 100},
//!   {"op": "note", "text": "Click here"},
//!   {"op": "select", "row": 0},
//!   {"op": "delete", "confirm": true},
//!   {"op": "enter"}
//! ]
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::annotation::{AnnotationSession, DeleteOutcome};
use super::prompt::ScriptedPrompt;
use crate::domain::{Key, Point, ToolMode};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    Mode {
        mode: ToolMode,
    },
    Press {
        x: f32,
        y: f32,
    },
    Move {
        x: f32,
        y: f32,
    },
    Release {
        x: f32,
        y: f32,
    },
    Enter,
    /// Select a marker list row
    Select {
        row: usize,
    },
    /// Replace the note editor text
    Note {
        text: String,
    },
    /// Delete the selection, answering the confirmation with `confirm`
    Delete {
        #[serde(default = "default_confirm")]
        confirm: bool,
    },
}

fn default_confirm() -> bool {
    true
}

/// What a step did
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Applied,
    /// The step had no effect (no shortcut bound, row out of range)
    Ignored,
    Delete(DeleteOutcome),
}

pub fn parse_steps(json: &str) -> anyhow::Result<Vec<Step>> {
    serde_json::from_str(json).context("Failed to parse session script")
}

pub fn load_steps(path: &Path) -> anyhow::Result<Vec<Step>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_steps(&json)
}

/// Apply steps in order, returning one outcome per step
pub fn replay(session: &mut AnnotationSession, steps: &[Step]) -> anyhow::Result<Vec<StepOutcome>> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let outcome = match step {
            Step::Mode { mode } => {
                session.set_mode(*mode);
                StepOutcome::Applied
            }
            Step::Press { x, y } => {
                session.pointer_down(Point::new(*x, *y))?;
                StepOutcome::Applied
            }
            Step::Move { x, y } => {
                session.pointer_move(Point::new(*x, *y))?;
                StepOutcome::Applied
            }
            Step::Release { x, y } => {
                session.pointer_up(Point::new(*x, *y))?;
                StepOutcome::Applied
            }
            Step::Enter => {
                if session.key_press(Key::Enter) {
                    StepOutcome::Applied
                } else {
                    StepOutcome::Ignored
                }
            }
            Step::Select { row } => {
                if session.select_row(*row) {
                    StepOutcome::Applied
                } else {
                    StepOutcome::Ignored
                }
            }
            Step::Note { text } => {
                session.set_note_text(text)?;
                StepOutcome::Applied
            }
            Step::Delete { confirm } => {
                let mut prompt = ScriptedPrompt::answering(*confirm);
                StepOutcome::Delete(session.delete_selected(&mut prompt)?)
            }
        };
        log::debug!("Step {index} {step:?}: {outcome:?}");
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SnapmarkConfig;
    use image::RgbaImage;

    const SCRIPT: &str = r#"[
        {"op": "mode", "mode": "pin"},
        {"op": "press", "x": 40, "y": 40},
        {"op": "release", "x": 40, "y": 40},
        {"op": "note", "text": "Save button"},
        {"op": "mode", "mode": "redact"},
        {"op": "press", "x": 100, "y": 100},
        {"op": "move", "x": 160, "y": 130},
        {"op": "release", "x": 160, "y": 130},
        {"op": "enter"},
        {"op": "select", "row": 5},
        {"op": "select", "row": 1},
        {"op": "delete", "confirm": false},
        {"op": "delete"}
    ]"#;

    #[test]
    fn test_parse_defaults_delete_to_confirm() {
        let steps = parse_steps(r#"[{"op": "delete"}, {"op": "enter"}]"#).unwrap();
        assert_eq!(steps, vec![Step::Delete { confirm: true }, Step::Enter]);
        assert!(parse_steps(r#"[{"op": "jump"}]"#).is_err());
    }

    #[test]
    fn test_replay_reports_each_step() {
        let mut session =
            AnnotationSession::new(RgbaImage::new(200, 200), &SnapmarkConfig::default());
        let steps = parse_steps(SCRIPT).unwrap();
        let outcomes = replay(&mut session, &steps).unwrap();

        assert_eq!(outcomes.len(), steps.len());
        assert_eq!(outcomes[9], StepOutcome::Ignored);
        assert_eq!(outcomes[11], StepOutcome::Delete(DeleteOutcome::Declined));
        assert!(matches!(
            outcomes[12],
            StepOutcome::Delete(DeleteOutcome::Deleted { .. })
        ));

        assert_eq!(session.list_labels(), vec!["Pin 1"]);
        assert_eq!(session.store().iter().next().unwrap().note_text, "Save button");
        assert_eq!(session.mode(), ToolMode::Pan);
    }

    #[test]
    fn test_load_steps_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, SCRIPT).unwrap();
        assert_eq!(load_steps(&path).unwrap().len(), 13);
        assert!(load_steps(&dir.path().join("missing.json")).is_err());
    }
}
