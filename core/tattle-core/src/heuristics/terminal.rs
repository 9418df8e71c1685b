//! Terminal-emulator heuristic (ghostty).
//!
//! A terminal exposes no document attribute; the file is held open by some
//! process running inside one of its tabs. Detection correlates the
//! terminal's descendant processes with the target handle, then maps the
//! holding process back to a tab by scoring tab titles against its working
//! directory.
//!
//! The controlling-terminal fallback assumes the invoking process shares a
//! terminal session with the inspected application (true when the CLI runs
//! inside that terminal). Environment-dependent, not a correctness
//! guarantee.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ax::{self, AccessibilityBridge, AxNode};
use crate::model::{AppDescriptor, AppUsage};
use crate::path::{self, TargetFile};
use crate::platform::Platform;
use crate::process::{self, ProcessProbe};
use crate::registry::{Heuristic, HeuristicVote};
use crate::reveal::{self, WindowMatch};

use super::{tab_group_tabs, TabInfo};

pub const GHOSTTY_BUNDLE_ID: &str = "com.mitchellh.ghostty";

pub struct TerminalTabsHeuristic {
    ax: Arc<dyn AccessibilityBridge>,
    procs: Arc<dyn ProcessProbe>,
    home_dir: Option<PathBuf>,
    invoking_pid: u32,
}

impl TerminalTabsHeuristic {
    pub fn new(platform: &Platform) -> TerminalTabsHeuristic {
        TerminalTabsHeuristic {
            ax: Arc::clone(&platform.ax),
            procs: Arc::clone(&platform.procs),
            home_dir: platform.home_dir.clone(),
            invoking_pid: platform.invoking_pid,
        }
    }

    /// Descendant count plus the subset holding an open handle to the
    /// target.
    fn matching_descendants(&self, pid: u32, target: &TargetFile) -> (usize, Vec<u32>) {
        let descendants =
            process::descendant_pids(self.procs.as_ref(), pid, process::DESCENDANT_LIMIT);
        let matching = descendants
            .iter()
            .copied()
            .filter(|&pid| process::has_open_handle(self.procs.as_ref(), pid, target))
            .collect();
        (descendants.len(), matching)
    }

    fn best_tab_by_cwd<'t>(&self, matching: &[u32], tabs: &'t [TabInfo]) -> Option<&'t TabInfo> {
        let mut best: Option<(i32, &TabInfo)> = None;
        for &pid in matching {
            let Some(cwd) = self.procs.working_directory(pid) else {
                continue;
            };
            let matcher = CwdTitleMatcher::new(&cwd, self.home_dir.as_deref());
            for tab in tabs {
                let score = matcher.score(&tab.title);
                if score <= 0 {
                    continue;
                }
                if best.map_or(true, |(top, _)| score > top) {
                    best = Some((score, tab));
                }
            }
        }
        best.map(|(_, tab)| tab)
    }

    fn best_tab_score_by_cwd<'t>(
        &self,
        matching: &[u32],
        tabs: &'t [(AxNode, TabInfo)],
    ) -> Option<(i32, &'t (AxNode, TabInfo))> {
        let mut best: Option<(i32, &(AxNode, TabInfo))> = None;
        for &pid in matching {
            let Some(cwd) = self.procs.working_directory(pid) else {
                continue;
            };
            let matcher = CwdTitleMatcher::new(&cwd, self.home_dir.as_deref());
            for entry in tabs {
                let score = matcher.score(&entry.1.title);
                if score <= 0 {
                    continue;
                }
                if best.map_or(true, |(top, _)| score > top) {
                    best = Some((score, entry));
                }
            }
        }
        best
    }

    fn matching_ttys(&self, matching: &[u32]) -> HashSet<String> {
        matching
            .iter()
            .filter_map(|&pid| self.procs.controlling_terminal(pid))
            .collect()
    }

    /// Visibility by controlling-terminal correlation, used when no tab
    /// title scored.
    fn tty_visibility(&self, matching: &[u32], notes: &mut Vec<String>) -> bool {
        let matching_ttys = self.matching_ttys(matching);
        match self.procs.controlling_terminal(self.invoking_pid) {
            Some(current) => {
                let leaf = current.rsplit('/').next().unwrap_or(&current).to_string();
                if matching_ttys.contains(&current) {
                    notes.push(format!("visibility=tty-match:{leaf}"));
                    true
                } else {
                    notes.push(format!("visibility=tty-miss:{leaf}"));
                    false
                }
            }
            None => {
                notes.push("visibility=unmapped".to_string());
                false
            }
        }
    }

    /// Reveal-time tab pick when no directory score exists: the selected
    /// tab if the invoking terminal is one of the holders' terminals, else
    /// an unselected one.
    fn tty_fallback_tab<'t>(
        &self,
        matching: &[u32],
        tabs: &'t [(AxNode, TabInfo)],
    ) -> Option<&'t (AxNode, TabInfo)> {
        if tabs.is_empty() {
            return None;
        }
        let matching_ttys = self.matching_ttys(matching);
        if matching_ttys.is_empty() {
            return None;
        }
        let current = self.procs.controlling_terminal(self.invoking_pid)?;
        if matching_ttys.contains(&current) {
            tabs.iter().find(|entry| entry.1.selected)
        } else {
            tabs.iter().find(|entry| !entry.1.selected)
        }
    }

    fn reveal_impl(&self, usage: &AppUsage, target: &TargetFile) -> bool {
        let windows = ax::windows(self.ax.as_ref(), usage.pid);
        if windows.is_empty() {
            return false;
        }

        let mut tabs: Vec<(AxNode, TabInfo)> = Vec::with_capacity(8);
        for &window in &windows {
            for tab in tab_group_tabs(self.ax.as_ref(), window) {
                tabs.push((window, tab));
            }
        }

        let (_, matching) = self.matching_descendants(usage.pid, target);
        if matching.is_empty() {
            return false;
        }

        let matched = if tabs.is_empty() {
            // No exposed tabs: best-effort raise of the first window.
            Some(WindowMatch {
                window: windows[0],
                tab: None,
                score: 10,
            })
        } else if let Some((score, (window, tab))) = self.best_tab_score_by_cwd(&matching, &tabs) {
            // Outranks any path-search strategy another entry might score.
            Some(WindowMatch {
                window: *window,
                tab: Some(tab.node),
                score: 200 + score,
            })
        } else {
            self.tty_fallback_tab(&matching, &tabs)
                .map(|(window, tab)| WindowMatch {
                    window: *window,
                    tab: Some(tab.node),
                    score: 150,
                })
        };

        match matched {
            Some(matched) => reveal::perform(self.ax.as_ref(), usage.pid, &matched),
            None => false,
        }
    }
}

impl Heuristic for TerminalTabsHeuristic {
    fn evaluate(&self, app: &AppDescriptor, target: &TargetFile) -> Option<HeuristicVote> {
        if !self.ax.is_trusted() {
            return Some(HeuristicVote::unknown_with_note("accessibility not trusted"));
        }

        let windows = ax::windows(self.ax.as_ref(), app.pid);
        let mut has_tabs = false;
        let mut tabs: Vec<TabInfo> = Vec::with_capacity(8);
        for &window in &windows {
            let window_tabs = tab_group_tabs(self.ax.as_ref(), window);
            if window_tabs.len() > 1 {
                has_tabs = true;
            }
            tabs.extend(window_tabs);
        }

        let (descendant_count, matching) = self.matching_descendants(app.pid, target);
        let mut notes = vec![
            format!("descendants={descendant_count}"),
            format!("matches={}", matching.len()),
        ];

        if matching.is_empty() {
            return Some(HeuristicVote {
                displays_file: Some(false),
                visible_file: Some(false),
                has_tabs: Some(has_tabs),
                notes,
            });
        }

        let visible = if tabs.len() <= 1 {
            // A tabless terminal implicitly shows its one surface; a single
            // tab is by definition the shown one.
            true
        } else {
            match self.best_tab_by_cwd(&matching, &tabs) {
                Some(best) => best.selected,
                None => self.tty_visibility(&matching, &mut notes),
            }
        };

        Some(HeuristicVote {
            displays_file: Some(true),
            visible_file: Some(visible),
            has_tabs: Some(has_tabs),
            notes,
        })
    }

    fn reveal(&self, usage: &AppUsage, target: &TargetFile) -> Option<bool> {
        Some(self.reveal_impl(usage, target))
    }
}

/// Scores a tab title against a process working directory. Substring
/// containment of the full home-relative path, the abbreviated form (every
/// component but the last collapsed to its first character), and the bare
/// leaf name award 10, 5, and 1 points.
struct CwdTitleMatcher {
    home_relative_full: Option<String>,
    home_relative_abbrev: Option<String>,
    leaf: String,
}

impl CwdTitleMatcher {
    fn new(cwd: &Path, home: Option<&Path>) -> CwdTitleMatcher {
        let cwd = path::normalize(cwd);
        let leaf = cwd
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
            .to_string();
        let relative = home
            .and_then(|home| cwd.strip_prefix(home).ok())
            .and_then(|rel| rel.to_str())
            .filter(|rel| !rel.is_empty());
        CwdTitleMatcher {
            home_relative_full: relative.map(|rel| format!("~/{rel}")),
            home_relative_abbrev: relative.map(abbreviate_home_relative),
            leaf,
        }
    }

    fn score(&self, title: &str) -> i32 {
        let mut score = 0;
        if let Some(full) = &self.home_relative_full {
            if title.contains(full.as_str()) {
                score += 10;
            }
        }
        if let Some(abbrev) = &self.home_relative_abbrev {
            if title.contains(abbrev.as_str()) {
                score += 5;
            }
        }
        if !self.leaf.is_empty() && title.contains(&self.leaf) {
            score += 1;
        }
        score
    }
}

/// `projects/tools/tattle` → `~/p/t/tattle`.
fn abbreviate_home_relative(relative: &str) -> String {
    let components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();
    if components.len() <= 1 {
        return format!("~/{relative}");
    }
    let mut parts: Vec<String> = Vec::with_capacity(components.len());
    for (index, component) in components.iter().enumerate() {
        if index == components.len() - 1 {
            parts.push((*component).to_string());
        } else {
            parts.push(component.chars().take(1).collect());
        }
    }
    format!("~/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{FakeApps, FakeProbe, FakeAx};
    use std::sync::Arc;

    const PID: u32 = 100;

    fn app() -> AppDescriptor {
        AppDescriptor {
            bundle_id: GHOSTTY_BUNDLE_ID.to_string(),
            pid: PID,
            name: "Ghostty".to_string(),
        }
    }

    fn heuristic(ax: Arc<FakeAx>, probe: Arc<FakeProbe>) -> TerminalTabsHeuristic {
        let platform = Platform {
            ax,
            procs: probe,
            apps: Arc::new(FakeApps::default()),
            state_db: None,
            home_dir: Some(PathBuf::from("/home/u")),
            invoking_pid: 999,
        };
        TerminalTabsHeuristic::new(&platform)
    }

    #[test]
    fn untrusted_accessibility_abstains() {
        let ax = Arc::new(FakeAx::untrusted());
        let probe = Arc::new(FakeProbe::default());
        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();

        let vote = heuristic(ax, probe).evaluate(&app(), &target).unwrap();
        assert_eq!(vote.displays_file, None);
        assert_eq!(vote.visible_file, None);
        assert_eq!(vote.has_tabs, None);
        assert!(!vote.notes.is_empty());
    }

    #[test]
    fn no_holding_descendant_means_not_displayed() {
        let mut ax = FakeAx::trusted();
        let window = ax.add_node(&[]);
        ax.set_app_windows(PID, &[window]);

        let mut probe = FakeProbe::default();
        probe.add_child(PID, 101);

        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();
        let vote = heuristic(Arc::new(ax), Arc::new(probe))
            .evaluate(&app(), &target)
            .unwrap();
        assert_eq!(vote.displays_file, Some(false));
        assert_eq!(vote.visible_file, Some(false));
    }

    #[test]
    fn tabless_terminal_with_holder_is_visible() {
        let mut ax = FakeAx::trusted();
        let window = ax.add_node(&[]);
        ax.set_app_windows(PID, &[window]);

        let mut probe = FakeProbe::default();
        probe.add_child(PID, 101);
        probe.add_open_file(101, Path::new("/home/u/proj/main.go"));

        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();
        let vote = heuristic(Arc::new(ax), Arc::new(probe))
            .evaluate(&app(), &target)
            .unwrap();
        assert_eq!(vote.displays_file, Some(true));
        assert_eq!(vote.visible_file, Some(true));
        assert_eq!(vote.has_tabs, Some(false));
    }

    #[test]
    fn holding_process_behind_unselected_tab_is_hidden() {
        // Three tabs; the file holder works in ~/proj whose tab is not the
        // selected one.
        let mut ax = FakeAx::trusted();
        let window = ax.add_node(&[]);
        ax.tab_group(
            window,
            &[
                ("~/proj/main.go", false),
                ("~/other", true),
                ("~/stuff", false),
            ],
        );
        ax.set_app_windows(PID, &[window]);

        let mut probe = FakeProbe::default();
        probe.add_child(PID, 101);
        probe.add_child(PID, 102);
        probe.add_open_file(101, Path::new("/home/u/proj/main.go"));
        probe.set_cwd(101, Path::new("/home/u/proj"));
        probe.set_cwd(102, Path::new("/home/u/other"));

        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();
        let vote = heuristic(Arc::new(ax), Arc::new(probe))
            .evaluate(&app(), &target)
            .unwrap();
        assert_eq!(vote.displays_file, Some(true));
        assert_eq!(vote.visible_file, Some(false));
        assert_eq!(vote.has_tabs, Some(true));
    }

    #[test]
    fn selected_tab_of_holding_process_is_visible() {
        let mut ax = FakeAx::trusted();
        let window = ax.add_node(&[]);
        ax.tab_group(window, &[("~/proj", true), ("~/other", false)]);
        ax.set_app_windows(PID, &[window]);

        let mut probe = FakeProbe::default();
        probe.add_child(PID, 101);
        probe.add_open_file(101, Path::new("/home/u/proj/main.go"));
        probe.set_cwd(101, Path::new("/home/u/proj"));

        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();
        let vote = heuristic(Arc::new(ax), Arc::new(probe))
            .evaluate(&app(), &target)
            .unwrap();
        assert_eq!(vote.visible_file, Some(true));
    }

    #[test]
    fn tty_correlation_decides_when_titles_do_not_score() {
        let mut ax = FakeAx::trusted();
        let window = ax.add_node(&[]);
        // Titles unrelated to any working directory.
        ax.tab_group(window, &[("zsh", true), ("zsh", false)]);
        ax.set_app_windows(PID, &[window]);

        let mut probe = FakeProbe::default();
        probe.add_child(PID, 101);
        probe.add_open_file(101, Path::new("/home/u/proj/main.go"));
        probe.set_tty(101, "/dev/ttys003");
        probe.set_tty(999, "/dev/ttys003");

        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();
        let vote = heuristic(Arc::new(ax), Arc::new(probe))
            .evaluate(&app(), &target)
            .unwrap();
        assert_eq!(vote.visible_file, Some(true));
        assert!(vote
            .notes
            .iter()
            .any(|note| note.starts_with("visibility=tty-match")));
    }

    #[test]
    fn abbreviation_collapses_all_but_last_component() {
        assert_eq!(abbreviate_home_relative("projects/tools/tattle"), "~/p/t/tattle");
        assert_eq!(abbreviate_home_relative("proj"), "~/proj");
    }

    #[test]
    fn cwd_scoring_weighs_full_over_abbrev_over_leaf() {
        let matcher = CwdTitleMatcher::new(
            Path::new("/home/u/projects/tools"),
            Some(Path::new("/home/u")),
        );
        assert_eq!(matcher.score("~/projects/tools — zsh"), 11); // full + leaf
        assert_eq!(matcher.score("~/p/tools"), 6); // abbrev + leaf
        assert_eq!(matcher.score("tools"), 1); // leaf only
        assert_eq!(matcher.score("unrelated"), 0);
    }

    #[test]
    fn reveal_without_holder_fails_before_any_action() {
        let mut ax = FakeAx::trusted();
        let window = ax.add_node(&[]);
        ax.set_app_windows(PID, &[window]);
        let ax = Arc::new(ax);

        let probe = Arc::new(FakeProbe::default());
        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();
        let usage = crate::testkit::usage_for(&app());

        let revealed = heuristic(Arc::clone(&ax), probe).reveal(&usage, &target);
        assert_eq!(revealed, Some(false));
        assert!(ax.actions.borrow().is_empty());
        assert!(ax.activations.borrow().is_empty());
    }

    #[test]
    fn reveal_presses_the_best_scoring_tab() {
        let mut ax = FakeAx::trusted();
        let window = ax.add_node(&[]);
        let tab_nodes = ax.tab_group(window, &[("~/proj", false), ("~/other", true)]);
        ax.set_app_windows(PID, &[window]);
        let ax = Arc::new(ax);

        let mut probe = FakeProbe::default();
        probe.add_child(PID, 101);
        probe.add_open_file(101, Path::new("/home/u/proj/main.go"));
        probe.set_cwd(101, Path::new("/home/u/proj"));

        let target = TargetFile::from_input("/home/u/proj/main.go").unwrap();
        let usage = crate::testkit::usage_for(&app());

        let revealed = heuristic(Arc::clone(&ax), Arc::new(probe)).reveal(&usage, &target);
        assert_eq!(revealed, Some(true));
        assert_eq!(ax.activations.borrow().as_slice(), &[PID]);
        let actions = ax.actions.borrow();
        assert!(actions.contains(&(window, "AXRaise".to_string())));
        assert!(actions.contains(&(tab_nodes[0], "AXPress".to_string())));
    }
}
