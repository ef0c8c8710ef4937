use crate::parser::{ParseWarning, WarningKind};
use crate::tag;
use charla_common::*;
use std::path::Path;

/// Collects authoring problems of a graph. Every warning is non fatal: the
/// player reports the matching runtime error when it reaches the problem.
pub fn validate(graph: &DialogGraph, dialog: Option<&str>, file: Option<&Path>) -> Vec<ParseWarning> {
    let mut warnings = Vec::new();
    let mut warn = |state: Option<&str>, kind: WarningKind| {
        warnings.push(ParseWarning {
            file: file.map(Path::to_path_buf),
            dialog: dialog.map(str::to_string),
            state: state.map(str::to_string),
            kind,
        })
    };

    if !graph.contains(ENTRY_STATE) {
        warn(None, WarningKind::MissingEntry);
    }

    for (name, state) in graph.iter() {
        if let Err(err) = tag::tags(&state.text) {
            warn(Some(name), WarningKind::MalformedTag(err));
        }

        if state.has_responses() {
            if state.auto_advance().is_some() {
                warn(Some(name), WarningKind::AutoAdvanceWithResponses);
            }

            for (index, response) in state.responses.iter().enumerate() {
                match &response.jump {
                    None => warn(Some(name), WarningKind::ResponseWithoutJump { index }),
                    Some(target) if !graph.contains(target) => warn(
                        Some(name),
                        WarningKind::UnknownResponseJump {
                            index,
                            target: target.clone(),
                        },
                    ),
                    Some(_) => {}
                }
            }
        } else if let Some(target) = &state.jump {
            if !graph.contains(target) {
                warn(
                    Some(name),
                    WarningKind::UnknownJump {
                        target: target.clone(),
                    },
                );
            }
        }
    }

    warnings
}
