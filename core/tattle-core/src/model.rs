//! Core data model shared by the detection pipeline, the reveal engine,
//! and the CLI.

use serde::{Deserialize, Serialize};

/// One running application instance, as reported by the app enumerator.
///
/// Immutable for the lifetime of one resolution; a stale descriptor (the
/// process exited mid-query) is handled downstream as absence of evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppDescriptor {
    pub bundle_id: String,
    pub pid: u32,
    pub name: String,
}

/// Three-way classification of how an application presents the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileVisibility {
    /// Open, but hidden behind a background tab.
    TabHidden,
    /// The selected tab among several.
    TabVisible,
    /// Shown in an untabbed view.
    Visible,
}

impl FileVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileVisibility::TabHidden => "tab_hidden",
            FileVisibility::TabVisible => "tab_visible",
            FileVisibility::Visible => "visible",
        }
    }
}

/// One heuristic's entry in the optional debug trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionStep {
    pub name: String,
    pub notes: Vec<String>,
}

/// Final per-application verdict for one resolution.
///
/// Invariant: `is_tab_displaying_file_visible` implies `displays_file`.
/// The pipeline enforces this after merging heuristic votes.
#[derive(Debug, Clone, Serialize)]
pub struct AppUsage {
    pub bundle_id: String,
    pub pid: u32,
    pub name: String,
    pub is_frontmost: bool,
    pub has_tabs: bool,
    pub displays_file: bool,
    pub is_tab_displaying_file_visible: bool,
    /// Per-heuristic notes, retained only when debug output was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Vec<DetectionStep>>,
}

impl AppUsage {
    pub fn file_visibility(&self) -> FileVisibility {
        if self.is_tab_displaying_file_visible {
            if self.has_tabs {
                FileVisibility::TabVisible
            } else {
                FileVisibility::Visible
            }
        } else {
            FileVisibility::TabHidden
        }
    }
}

/// Caller-tunable knobs for one resolution.
#[derive(Debug, Clone, Default)]
pub struct DetectionOptions {
    /// Retain each heuristic's notes on the produced [`AppUsage`].
    pub include_debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(has_tabs: bool, visible: bool) -> AppUsage {
        AppUsage {
            bundle_id: "com.example.app".to_string(),
            pid: 42,
            name: "Example".to_string(),
            is_frontmost: false,
            has_tabs,
            displays_file: true,
            is_tab_displaying_file_visible: visible,
            debug: None,
        }
    }

    #[test]
    fn visibility_is_plain_visible_without_tabs() {
        assert_eq!(usage(false, true).file_visibility(), FileVisibility::Visible);
    }

    #[test]
    fn visibility_is_tab_visible_with_tabs() {
        assert_eq!(usage(true, true).file_visibility(), FileVisibility::TabVisible);
    }

    #[test]
    fn visibility_is_tab_hidden_when_not_visible() {
        assert_eq!(usage(true, false).file_visibility(), FileVisibility::TabHidden);
        assert_eq!(usage(false, false).file_visibility(), FileVisibility::TabHidden);
    }

    #[test]
    fn visibility_serializes_as_snake_case() {
        let json = serde_json::to_string(&FileVisibility::TabVisible).unwrap();
        assert_eq!(json, "\"tab_visible\"");
        assert_eq!(FileVisibility::TabVisible.as_str(), "tab_visible");
    }
}
