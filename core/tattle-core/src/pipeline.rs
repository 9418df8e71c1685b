//! Detector pipeline: runs the applicable heuristics for one application
//! and fuses their votes into a single verdict.
//!
//! Merge rule: any heuristic asserting a field true wins; abstentions
//! (`None`) and negative votes cannot veto a positive assertion.

use crate::model::{AppDescriptor, AppUsage, DetectionOptions, DetectionStep};
use crate::path::TargetFile;
use crate::registry::{HeuristicEntry, HeuristicRegistry};

pub fn evaluate(
    app: &AppDescriptor,
    target: &TargetFile,
    is_frontmost: bool,
    registry: &HeuristicRegistry,
    options: &DetectionOptions,
) -> AppUsage {
    let applicable = registry.applicable(&app.bundle_id);

    // With an app-specific heuristic present, drop generic negative-priority
    // fallbacks: their tab-title matching cross-matches unrelated files that
    // share a basename (multi-root editors being the usual offender).
    let has_specific = applicable.iter().any(|entry| entry.rule.specificity() > 0);
    let candidates: Vec<&HeuristicEntry> = if has_specific {
        applicable
            .into_iter()
            .filter(|entry| entry.rule.specificity() > 0 || entry.priority >= 0)
            .collect()
    } else {
        applicable
    };

    let mut displays = false;
    let mut visible = false;
    let mut has_tabs = false;
    let mut steps = Vec::new();

    for entry in candidates {
        let Some(vote) = entry.heuristic.evaluate(app, target) else {
            continue;
        };

        if vote.displays_file == Some(true) {
            displays = true;
        }
        if vote.visible_file == Some(true) {
            visible = true;
        }
        if vote.has_tabs == Some(true) {
            has_tabs = true;
        }

        if options.include_debug {
            steps.push(DetectionStep {
                name: entry.name.clone(),
                notes: vote.notes,
            });
        }
    }

    // Visible implies displayed.
    if visible {
        displays = true;
    }

    AppUsage {
        bundle_id: app.bundle_id.clone(),
        pid: app.pid,
        name: app.name.clone(),
        is_frontmost,
        has_tabs,
        displays_file: displays,
        is_tab_displaying_file_visible: visible,
        debug: options.include_debug.then_some(steps),
    }
}
