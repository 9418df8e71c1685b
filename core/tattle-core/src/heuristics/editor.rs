//! Code-editor-family heuristic (VS Code stable/insiders, the OSS build,
//! and Cursor share one implementation).
//!
//! Two independent signals per window: the current-document attribute,
//! which is authoritative for visibility, and the set of file-ish editor
//! tab labels. A basename appearing in the workspace tree alone must not
//! count as "open in editor", so a tab-key hit is required before the
//! expensive full-text path search confirms the window really references
//! the target path.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::ax::{self, attr, AccessibilityBridge, AxNode};
use crate::model::{AppDescriptor, AppUsage};
use crate::path::TargetFile;
use crate::platform::Platform;
use crate::registry::{Heuristic, HeuristicVote, MatchRule};
use crate::reveal::{self, WindowMatch};
use crate::statedb::{self, KvStateReader};
use crate::walker;

use super::{visible_document_path, window_contains_path, WINDOW_PATH_SCAN_NODES};

pub const VSCODE_PREFIX: &str = "com.microsoft.VSCode";
pub const VSCODE_OSS_BUNDLE_ID: &str = "com.visualstudio.code.oss";
pub const CURSOR_BUNDLE_ID: &str = "com.todesktop.230313mzl4w4u92";

const TAB_SCAN_NODES: usize = 160_000;
const TEXT_SEARCH_NODES: usize = 800_000;
const REVEAL_TAB_SCAN_NODES: usize = 180_000;

pub struct EditorTabsHeuristic {
    ax: Arc<dyn AccessibilityBridge>,
    state_db: Option<Arc<dyn KvStateReader>>,
    home_dir: Option<PathBuf>,
}

impl EditorTabsHeuristic {
    pub fn new(platform: &Platform) -> EditorTabsHeuristic {
        EditorTabsHeuristic {
            ax: Arc::clone(&platform.ax),
            state_db: platform.state_db.clone(),
            home_dir: platform.home_dir.clone(),
        }
    }

    /// Stable and insiders builds share a bundle-id prefix; the OSS build
    /// and Cursor ship under their own exact ids.
    pub fn match_rules() -> [MatchRule; 3] {
        [
            MatchRule::IdPrefix(VSCODE_PREFIX.to_string()),
            MatchRule::Id(VSCODE_OSS_BUNDLE_ID.to_string()),
            MatchRule::Id(CURSOR_BUNDLE_ID.to_string()),
        ]
    }

    /// Normalized keys of the window's file-ish tab labels.
    fn fileish_tab_keys(&self, window: AxNode) -> HashSet<String> {
        let ax = self.ax.as_ref();
        let mut keys = HashSet::new();
        walker::walk_until(ax, window, TAB_SCAN_NODES, |element| {
            if !is_tab_button(ax, element) {
                return true;
            }
            if let Some(label) = tab_button_label(ax, element) {
                if is_fileish_tab_label(&label) {
                    keys.insert(tab_label_key(&label));
                }
            }
            true
        });
        keys
    }

    /// Last-resort evidence when accessibility introspection is
    /// inconclusive: the editor's persisted recently-opened list still
    /// names the target. Displays-only; never asserts visibility.
    fn apply_state_db_fallback(
        &self,
        app: &AppDescriptor,
        target: &TargetFile,
        vote: &mut HeuristicVote,
    ) {
        let Some(reader) = &self.state_db else {
            return;
        };
        let Some(db) = self.state_db_path(&app.bundle_id) else {
            vote.notes.push("state-db=unmapped".to_string());
            return;
        };
        let Some(raw) = reader.string_value(&db, statedb::RECENTLY_OPENED_KEY) else {
            vote.notes.push("state-db=no-value".to_string());
            return;
        };
        if statedb::parse_recently_opened(&raw)
            .iter()
            .any(|path| path == target)
        {
            vote.displays_file = Some(true);
            vote.notes.push("state-db=recent-hit".to_string());
        } else {
            vote.notes.push("state-db=recent-miss".to_string());
        }
    }

    /// The variant's user-data database under the home directory.
    fn state_db_path(&self, bundle_id: &str) -> Option<PathBuf> {
        let dir = if bundle_id == VSCODE_OSS_BUNDLE_ID {
            "VSCodium"
        } else if bundle_id == CURSOR_BUNDLE_ID {
            "Cursor"
        } else if bundle_id.starts_with(VSCODE_PREFIX) {
            if bundle_id.contains("Insiders") {
                "Code - Insiders"
            } else {
                "Code"
            }
        } else {
            return None;
        };
        Some(
            self.home_dir
                .clone()?
                .join("Library/Application Support")
                .join(dir)
                .join("User/globalStorage/state.vscdb"),
        )
    }

    fn best_reveal_tab(&self, window: AxNode, target_name: &str) -> Option<(AxNode, i32, bool)> {
        let ax = self.ax.as_ref();
        let mut best: Option<(AxNode, i32, bool)> = None;
        walker::walk_until(ax, window, REVEAL_TAB_SCAN_NODES, |element| {
            if !is_tab_button(ax, element) {
                return true;
            }
            let label = tab_button_label(ax, element).unwrap_or_default();
            let normalized = normalize_tab_title(&label);
            let score = score_for_tab_label(&normalized, target_name);
            if score > 0 && best.map_or(true, |(_, top, _)| score > top) {
                let selected = ax::bool_attribute(ax, element, attr::VALUE).unwrap_or(false);
                best = Some((element, score, selected));
            }
            true
        });
        best
    }

    fn reveal_impl(&self, usage: &AppUsage, target: &TargetFile) -> bool {
        let ax = self.ax.as_ref();
        let target_name = target.basename();
        let mut best: Option<WindowMatch> = None;

        for window in ax::windows(ax, usage.pid) {
            let mut score = 0;
            let mut tab = None;

            if visible_document_path(ax, window).as_ref() == Some(target) {
                score += 130;
            }

            if let Some((tab_node, tab_score, selected)) = self.best_reveal_tab(window, target_name)
            {
                tab = Some(tab_node);
                score += tab_score;
                if selected {
                    score += 10;
                }
            }

            if window_contains_path(ax, window, target, WINDOW_PATH_SCAN_NODES) {
                score += 90;
            }

            if score <= 0 {
                continue;
            }
            // Ties keep the first window encountered.
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

impl Heuristic for EditorTabsHeuristic {
    fn evaluate(&self, app: &AppDescriptor, target: &TargetFile) -> Option<HeuristicVote> {
        if !self.ax.is_trusted() {
            let mut vote = HeuristicVote::unknown_with_note("accessibility not trusted");
            self.apply_state_db_fallback(app, target, &mut vote);
            return Some(vote);
        }

        let ax = self.ax.as_ref();
        let windows = ax::windows(ax, app.pid);
        let mut notes = vec![format!("windows={}", windows.len())];

        let mut displays = false;
        let mut visible = false;
        let mut has_tabs = false;
        let target_key = tab_label_key(target.basename());

        for &window in &windows {
            let visible_here = visible_document_path(ax, window).as_ref() == Some(target);
            let tab_keys = self.fileish_tab_keys(window);

            let mut contains = visible_here;
            if !contains {
                if !tab_keys.contains(&target_key) {
                    continue;
                }
                contains = window_contains_path(ax, window, target, TEXT_SEARCH_NODES);
            }
            if !contains {
                continue;
            }

            displays = true;
            if visible_here {
                visible = true;
            }
            if tab_keys.len() >= 2 {
                has_tabs = true;
            }
        }

        if visible {
            displays = true;
        }

        notes.push(format!("displays={displays}"));
        notes.push(format!("visible={visible}"));
        notes.push(format!("tabs={has_tabs}"));

        let mut vote = HeuristicVote {
            displays_file: Some(displays),
            visible_file: Some(visible),
            has_tabs: Some(has_tabs),
            notes,
        };
        if windows.is_empty() {
            self.apply_state_db_fallback(app, target, &mut vote);
        }
        Some(vote)
    }

    fn reveal(&self, usage: &AppUsage, target: &TargetFile) -> Option<bool> {
        Some(self.reveal_impl(usage, target))
    }
}

fn is_tab_button(ax: &dyn AccessibilityBridge, element: AxNode) -> bool {
    ax::role_of(ax, element).as_deref() == Some(crate::ax::role::RADIO_BUTTON)
        && ax::string_attribute(ax, element, attr::SUBROLE).as_deref()
            == Some(crate::ax::role::TAB_BUTTON_SUBROLE)
}

fn tab_button_label(ax: &dyn AccessibilityBridge, element: AxNode) -> Option<String> {
    for name in [attr::DESCRIPTION, attr::TITLE, attr::HELP] {
        if let Some(value) = ax::string_attribute(ax, element, name) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Strips the preview marker and dirty/secondary annotations: `Preview
/// foo.rs`, `foo.rs • Modified`, `foo.rs, tab group 1` all reduce to
/// `foo.rs`. Case is preserved.
fn normalize_tab_title(label: &str) -> String {
    let mut text = label.trim();
    text = text.strip_prefix("Preview ").unwrap_or(text);
    if let Some(idx) = text.find('•') {
        text = &text[..idx];
    }
    if let Some(idx) = text.find(',') {
        text = &text[..idx];
    }
    text.trim().to_string()
}

/// Case-folded key for set membership checks.
fn tab_label_key(label: &str) -> String {
    normalize_tab_title(label).to_lowercase()
}

/// A label that plausibly names a file rather than a view: it carries an
/// extension separator and no keyboard-shortcut annotation.
fn is_fileish_tab_label(label: &str) -> bool {
    let text = label.trim();
    let length = text.chars().count();
    if !(3..=220).contains(&length) {
        return false;
    }
    if !text.contains('.') {
        return false;
    }
    if text.contains('⇧') || text.contains('⌘') || text.contains('⌃') {
        return false;
    }
    if text.contains("(Ctrl") {
        return false;
    }
    true
}

fn score_for_tab_label(label: &str, target_name: &str) -> i32 {
    if target_name.is_empty() {
        return 0;
    }
    if label == target_name {
        return 120;
    }
    if label.ends_with(&format!("/{target_name}")) {
        return 100;
    }
    if label.contains(target_name) {
        return 80;
    }
    0
}
