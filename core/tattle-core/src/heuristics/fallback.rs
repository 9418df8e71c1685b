//! Universal fallback heuristic for single-document or simply tabbed
//! applications with no bespoke strategy.
//!
//! Only two exact signals: a current-document attribute equal to the
//! target (visible and displayed), and a tab whose title equals the target
//! basename (displayed only; a title match says nothing about which tab
//! is shown).

use std::sync::Arc;

use crate::ax::{self, AccessibilityBridge};
use crate::model::{AppDescriptor, AppUsage};
use crate::path::TargetFile;
use crate::platform::Platform;
use crate::registry::{Heuristic, HeuristicVote};
use crate::reveal::{self, WindowMatch};

use super::{
    tab_group_tabs, visible_document_path, window_contains_path, WINDOW_PATH_SCAN_NODES,
};

pub struct GenericTabHeuristic {
    ax: Arc<dyn AccessibilityBridge>,
}

impl GenericTabHeuristic {
    pub fn new(platform: &Platform) -> GenericTabHeuristic {
        GenericTabHeuristic {
            ax: Arc::clone(&platform.ax),
        }
    }

    fn reveal_impl(&self, usage: &AppUsage, target: &TargetFile) -> bool {
        let ax = self.ax.as_ref();
        let target_name = target.basename();
        let mut best: Option<WindowMatch> = None;

        for window in ax::windows(ax, usage.pid) {
            let mut score = 0;
            let mut tab = None;

            if visible_document_path(ax, window).as_ref() == Some(target) {
                score += 120;
            }

            let title_match = tab_group_tabs(ax, window).into_iter().find(|t| {
                let title = t.title.trim();
                title == target_name
                    || title.ends_with(&format!("/{target_name}"))
                    || title.contains(target_name)
            });
            if let Some(matched_tab) = title_match {
                score += 100;
                if matched_tab.selected {
                    score += 20;
                }
                tab = Some(matched_tab.node);
            }

            if window_contains_path(ax, window, target, WINDOW_PATH_SCAN_NODES) {
                score += 80;
            }

            if score <= 0 {
                continue;
            }
            if best.as_ref().map_or(true, |top| score > top.score) {
                best = Some(WindowMatch { window, tab, score });
            }
        }

        match best {
            Some(matched) => reveal::perform(ax, usage.pid, &matched),
            None => false,
        }
    }
}

impl Heuristic for GenericTabHeuristic {
    fn evaluate(&self, app: &AppDescriptor, target: &TargetFile) -> Option<HeuristicVote> {
        if !self.ax.is_trusted() {
            return Some(HeuristicVote::unknown_with_note("accessibility not trusted"));
        }

        let ax = self.ax.as_ref();
        let windows = ax::windows(ax, app.pid);
        let target_name = target.basename();

        let mut displays = false;
        let mut visible = false;
        let mut has_tabs = false;
        let mut notes = vec![format!("windows={}", windows.len())];

        for &window in &windows {
            let tabs = tab_group_tabs(ax, window);
            if !tabs.is_empty() {
                notes.push(format!("tabs={}", tabs.len()));
            }

            let title_hit =
                !target_name.is_empty() && tabs.iter().any(|tab| tab.title == target_name);

            if visible_document_path(ax, window).as_ref() == Some(target) {
                visible = true;
                displays = true;
                notes.push("document match".to_string());
                if tabs.len() > 1 {
                    has_tabs = true;
                }
            }

            if title_hit {
                displays = true;
                if tabs.len() > 1 {
                    has_tabs = true;
                }
            }
        }

        if visible {
            displays = true;
        }

        Some(HeuristicVote {
            displays_file: Some(displays),
            visible_file: Some(visible),
            has_tabs: Some(has_tabs),
            notes,
        })
    }

    fn reveal(&self, usage: &AppUsage, target: &TargetFile) -> Option<bool> {
        Some(self.reveal_impl(usage, target))
    }
}
