//! Heuristic registry: named, prioritized, application-matched entries.
//!
//! Built once at startup and read-only afterwards. Evaluation order is a
//! deterministic total order over (priority desc, specificity desc, name
//! asc); registration order never matters.

use std::sync::Arc;

use regex::Regex;

use crate::heuristics::editor::EditorTabsHeuristic;
use crate::heuristics::fallback::GenericTabHeuristic;
use crate::heuristics::terminal::{TerminalTabsHeuristic, GHOSTTY_BUNDLE_ID};
use crate::model::{AppDescriptor, AppUsage};
use crate::path::TargetFile;
use crate::platform::Platform;

/// Predicate over an application's bundle identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    Any,
    Id(String),
    IdPrefix(String),
    IdRegex(String),
}

impl MatchRule {
    pub fn matches(&self, bundle_id: &str) -> bool {
        match self {
            MatchRule::Any => true,
            MatchRule::Id(exact) => bundle_id == exact,
            MatchRule::IdPrefix(prefix) => bundle_id.starts_with(prefix),
            // An unparseable pattern matches nothing.
            MatchRule::IdRegex(pattern) => Regex::new(pattern)
                .map(|re| re.is_match(bundle_id))
                .unwrap_or(false),
        }
    }

    /// How narrowly the rule targets applications. Used for ordering and
    /// for suppressing generic fallbacks.
    pub fn specificity(&self) -> u8 {
        match self {
            MatchRule::Any => 0,
            MatchRule::IdRegex(_) => 1,
            MatchRule::IdPrefix(_) => 2,
            MatchRule::Id(_) => 3,
        }
    }
}

/// One heuristic's partial verdict. A `None` field is an abstention and
/// never overrides another heuristic's vote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeuristicVote {
    pub displays_file: Option<bool>,
    pub visible_file: Option<bool>,
    pub has_tabs: Option<bool>,
    pub notes: Vec<String>,
}

impl HeuristicVote {
    /// All-unknown vote carrying a single note, used when a required
    /// capability is unavailable.
    pub fn unknown_with_note(note: impl Into<String>) -> HeuristicVote {
        HeuristicVote {
            notes: vec![note.into()],
            ..HeuristicVote::default()
        }
    }
}

/// A self-contained detection strategy for one family of applications.
pub trait Heuristic {
    fn evaluate(&self, app: &AppDescriptor, target: &TargetFile) -> Option<HeuristicVote>;

    /// Reveal capability. `None` means this heuristic has no reveal
    /// strategy; `Some(done)` reports whether a window/tab was raised.
    fn reveal(&self, _usage: &AppUsage, _target: &TargetFile) -> Option<bool> {
        None
    }
}

pub struct HeuristicEntry {
    pub name: String,
    pub rule: MatchRule,
    pub priority: i32,
    pub heuristic: Arc<dyn Heuristic>,
}

#[derive(Default)]
pub struct HeuristicRegistry {
    entries: Vec<HeuristicEntry>,
}

impl HeuristicRegistry {
    pub fn new() -> HeuristicRegistry {
        HeuristicRegistry::default()
    }

    pub fn register(&mut self, entry: HeuristicEntry) {
        self.entries.push(entry);
    }

    /// Entries applicable to `bundle_id`, ordered by (priority desc,
    /// specificity desc, name asc).
    pub fn applicable(&self, bundle_id: &str) -> Vec<&HeuristicEntry> {
        let mut hits: Vec<&HeuristicEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.rule.matches(bundle_id))
            .collect();
        hits.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.rule.specificity().cmp(&a.rule.specificity()))
                .then_with(|| a.name.cmp(&b.name))
        });
        hits
    }

    /// The default composition: the ghostty terminal heuristic, the
    /// code-editor family (stable/insiders by prefix, OSS and Cursor by
    /// exact id, one shared heuristic), and the universal tab fallback.
    pub fn standard(platform: &Platform) -> HeuristicRegistry {
        let mut registry = HeuristicRegistry::new();

        registry.register(HeuristicEntry {
            name: "ghostty".to_string(),
            rule: MatchRule::Id(GHOSTTY_BUNDLE_ID.to_string()),
            priority: 50,
            heuristic: Arc::new(TerminalTabsHeuristic::new(platform)),
        });

        let editor: Arc<dyn Heuristic> = Arc::new(EditorTabsHeuristic::new(platform));
        for rule in EditorTabsHeuristic::match_rules() {
            registry.register(HeuristicEntry {
                name: "code-editor".to_string(),
                rule,
                priority: 40,
                heuristic: Arc::clone(&editor),
            });
        }

        registry.register(HeuristicEntry {
            name: "generic-tabs".to_string(),
            rule: MatchRule::Any,
            priority: -100,
            heuristic: Arc::new(GenericTabHeuristic::new(platform)),
        });

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;

    impl Heuristic for Inert {
        fn evaluate(&self, _app: &AppDescriptor, _target: &TargetFile) -> Option<HeuristicVote> {
            Some(HeuristicVote::default())
        }
    }

    fn entry(name: &str, rule: MatchRule, priority: i32) -> HeuristicEntry {
        HeuristicEntry {
            name: name.to_string(),
            rule,
            priority,
            heuristic: Arc::new(Inert),
        }
    }

    #[test]
    fn match_rules_follow_their_variants() {
        assert!(MatchRule::Any.matches("com.apple.TextEdit"));
        assert!(MatchRule::Id("com.apple.TextEdit".into()).matches("com.apple.TextEdit"));
        assert!(!MatchRule::Id("com.apple.TextEdit".into()).matches("com.apple.Safari"));
        assert!(MatchRule::IdPrefix("com.apple.".into()).matches("com.apple.TextEdit"));
        assert!(!MatchRule::IdPrefix("com.apple.dt.".into()).matches("com.apple.TextEdit"));
        assert!(MatchRule::IdRegex(r"^com\.apple\..+$".into()).matches("com.apple.TextEdit"));
        assert!(!MatchRule::IdRegex(r"^org\..*".into()).matches("com.apple.TextEdit"));
    }

    #[test]
    fn invalid_regex_matches_nothing() {
        assert!(!MatchRule::IdRegex("(unclosed".into()).matches("anything"));
    }

    #[test]
    fn specificity_ranks_any_regex_prefix_exact() {
        assert_eq!(MatchRule::Any.specificity(), 0);
        assert_eq!(MatchRule::IdRegex("x".into()).specificity(), 1);
        assert_eq!(MatchRule::IdPrefix("x".into()).specificity(), 2);
        assert_eq!(MatchRule::Id("x".into()).specificity(), 3);
    }

    #[test]
    fn applicable_orders_by_priority_then_specificity_then_name() {
        let mut registry = HeuristicRegistry::new();
        registry.register(entry("zeta", MatchRule::Id("app".into()), 10));
        registry.register(entry("alpha", MatchRule::Id("app".into()), 10));
        registry.register(entry("high", MatchRule::Any, 50));
        registry.register(entry("broad", MatchRule::IdPrefix("a".into()), 10));

        let names: Vec<&str> = registry
            .applicable("app")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["high", "alpha", "zeta", "broad"]);
    }

    #[test]
    fn registration_order_does_not_affect_evaluation_order() {
        let mut forward = HeuristicRegistry::new();
        forward.register(entry("a", MatchRule::Any, 0));
        forward.register(entry("b", MatchRule::Any, 5));

        let mut reversed = HeuristicRegistry::new();
        reversed.register(entry("b", MatchRule::Any, 5));
        reversed.register(entry("a", MatchRule::Any, 0));

        let order = |registry: &HeuristicRegistry| -> Vec<String> {
            registry
                .applicable("any.app")
                .iter()
                .map(|e| e.name.clone())
                .collect()
        };
        assert_eq!(order(&forward), order(&reversed));
    }
}
