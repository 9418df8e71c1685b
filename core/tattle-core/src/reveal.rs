//! Reveal engine: raise and focus the window/tab displaying the target.
//!
//! The one state-changing operation in the system, attempted at most once
//! per invocation. Strategy selection reuses the registry: the first
//! applicable entry with a reveal capability that reports success wins.

use std::time::Duration;

use crate::ax::{action, attr, AccessibilityBridge, AxNode};
use crate::error::{Result, TattleError};
use crate::model::AppUsage;
use crate::path::TargetFile;
use crate::platform::Platform;
use crate::registry::HeuristicRegistry;
use crate::resolve::FileUsageReport;

/// The window (and optionally tab) a reveal strategy chose, with its
/// score. Transient; never outlives one reveal call.
#[derive(Debug, Clone, Copy)]
pub struct WindowMatch {
    pub window: AxNode,
    pub tab: Option<AxNode>,
    pub score: i32,
}

/// Lets the host UI settle after the press before the call returns.
const SETTLE_DELAY: Duration = Duration::from_millis(120);

/// Activates the owning application, raises the matched window, marks it
/// main, and presses the matched tab.
pub fn perform(ax: &dyn AccessibilityBridge, pid: u32, matched: &WindowMatch) -> bool {
    if !ax.activate_application(pid) {
        return false;
    }
    ax.perform_action(matched.window, action::RAISE);
    ax.set_bool_attribute(matched.window, attr::MAIN, true);
    if let Some(tab) = matched.tab {
        ax.perform_action(tab, action::PRESS);
    }
    std::thread::sleep(SETTLE_DELAY);
    true
}

/// Reveals `target` in the application `usage` describes.
///
/// No-op success when the application is already frontmost with the file
/// visible. Otherwise dispatches to the reveal strategies of the
/// applicable registry entries, in registry order.
pub fn reveal_usage(
    usage: &AppUsage,
    target: &TargetFile,
    registry: &HeuristicRegistry,
    platform: &Platform,
) -> bool {
    if !platform.ax.is_trusted() {
        return false;
    }
    if usage.is_frontmost && usage.is_tab_displaying_file_visible {
        return true;
    }

    for entry in registry.applicable(&usage.bundle_id) {
        match entry.heuristic.reveal(usage, target) {
            Some(true) => return true,
            Some(false) | None => continue,
        }
    }
    false
}

/// Reveal under the exactly-one-candidate rule: zero or several matching
/// applications is a caller-facing failure, never retried.
pub fn reveal_only_match(
    report: &FileUsageReport,
    registry: &HeuristicRegistry,
    platform: &Platform,
) -> Result<()> {
    if report.apps.len() != 1 {
        return Err(TattleError::AmbiguousReveal {
            found: report.apps.len(),
        });
    }

    let usage = &report.apps[0];
    if reveal_usage(usage, &report.target, registry, platform) {
        Ok(())
    } else {
        Err(TattleError::RevealFailed {
            bundle_id: usage.bundle_id.clone(),
        })
    }
}
