//! Per-application heuristics and the UI-scan helpers they share.
//!
//! Inapplicability is expressed through the registry's match rules, so
//! every heuristic here returns `Some` vote; missing capability
//! (accessibility not granted) yields an all-unknown vote, never a
//! negative one.

pub mod editor;
pub mod fallback;
pub mod terminal;

use crate::ax::{self, attr, role, AccessibilityBridge, AxNode};
use crate::path::TargetFile;
use crate::walker;

/// One exposed tab: its element, title, and whether it is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub node: AxNode,
    pub title: String,
    pub selected: bool,
}

const TAB_GROUP_SCAN_NODES: usize = 5_000;

/// Ceiling for reveal-time full-text path searches.
pub(crate) const WINDOW_PATH_SCAN_NODES: usize = 300_000;

/// Extracts the (title, selected) pairs from a window's first tab group.
/// Windows without a tab-group/radio-button structure yield nothing.
pub fn tab_group_tabs(ax: &dyn AccessibilityBridge, window: AxNode) -> Vec<TabInfo> {
    let Some(group) = walker::find_first(ax, window, TAB_GROUP_SCAN_NODES, |node| {
        ax::role_of(ax, node).as_deref() == Some(role::TAB_GROUP)
    }) else {
        return Vec::new();
    };

    ax.children(group)
        .into_iter()
        .filter(|child| ax::role_of(ax, *child).as_deref() == Some(role::RADIO_BUTTON))
        .filter_map(|radio| {
            let title = ax::title_of(ax, radio)?;
            let selected = ax::bool_attribute(ax, radio, attr::VALUE).unwrap_or(false);
            Some(TabInfo {
                node: radio,
                title,
                selected,
            })
        })
        .collect()
}

/// The window's current-document attribute as a normalized target, if it
/// carries a file URL. Authoritative for visibility when it equals the
/// target.
pub fn visible_document_path(ax: &dyn AccessibilityBridge, window: AxNode) -> Option<TargetFile> {
    let doc = ax::string_attribute(ax, window, attr::DOCUMENT)?;
    if doc.starts_with("file://") {
        TargetFile::from_input(&doc)
    } else {
        None
    }
}

/// Title-ish strings worth scanning for an embedded path.
pub fn strings_for_search(ax: &dyn AccessibilityBridge, element: AxNode) -> Vec<String> {
    let mut out = Vec::with_capacity(4);
    for name in [attr::TITLE, attr::DESCRIPTION, attr::HELP, attr::VALUE] {
        if let Some(value) = ax::string_attribute(ax, element, name) {
            if !value.is_empty() {
                out.push(value);
            }
        }
    }
    out
}

const MAX_SCANNED_STRING_CHARS: usize = 1024;

/// Extracts normalized candidate paths from a UI string: `file://` URLs,
/// `~/` or absolute paths, and `/Users/...` or `~/...` tokens embedded in
/// longer text.
pub fn extract_paths(raw: &str) -> Vec<TargetFile> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_SCANNED_STRING_CHARS {
        return Vec::new();
    }

    // Editor UX commonly renders "<path> • Modified" and similar.
    let head = trimmed.split('•').next().unwrap_or(trimmed).trim();

    if head.starts_with("file://") || head.starts_with("~/") || head.starts_with('/') {
        return TargetFile::from_input(head).into_iter().collect();
    }

    for marker in ["/Users/", "~/"] {
        if let Some(idx) = head.find(marker) {
            let suffix = &head[idx..];
            let token = suffix.split_whitespace().next().unwrap_or(suffix);
            let cleaned = strip_trailing_path_punctuation(token);
            return TargetFile::from_input(cleaned).into_iter().collect();
        }
    }

    Vec::new()
}

fn strip_trailing_path_punctuation(token: &str) -> &str {
    token.trim_end_matches([')', ']', '}', ',', '.', ';', '\'', '"'])
}

/// Bounded full-text search: does any string under `window` embed a path
/// equal to the target? The basename check is a cheap prefilter before
/// path extraction.
pub fn window_contains_path(
    ax: &dyn AccessibilityBridge,
    window: AxNode,
    target: &TargetFile,
    max_nodes: usize,
) -> bool {
    let basename = target.basename();
    if basename.is_empty() {
        return false;
    }

    let mut found = false;
    walker::walk_until(ax, window, max_nodes, |element| {
        for text in strings_for_search(ax, element) {
            if !text.contains(basename) {
                continue;
            }
            if extract_paths(&text).iter().any(|path| path == target) {
                found = true;
                return false;
            }
        }
        true
    });
    found
}
