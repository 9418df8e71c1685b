//! End-to-end resolution against fake collaborators: the standard
//! registry, the pipeline, and the reveal gate working together.

use std::path::Path;
use std::sync::Arc;

use tattle_core::heuristics::terminal::GHOSTTY_BUNDLE_ID;
use tattle_core::reveal;
use tattle_core::testkit::{FakeApps, FakeAx, FakeProbe};
use tattle_core::{
    AppDescriptor, DetectionOptions, FileUsageReport, FileVisibility, HeuristicRegistry, Platform,
    TattleError,
};

const GHOSTTY_PID: u32 = 100;
const TEXTEDIT_PID: u32 = 200;

fn descriptor(bundle_id: &str, pid: u32, name: &str) -> AppDescriptor {
    AppDescriptor {
        bundle_id: bundle_id.to_string(),
        pid,
        name: name.to_string(),
    }
}

/// A ghostty with a tabless window whose shell holds the target open, and
/// a TextEdit window whose document attribute names the target.
fn fixture(target_path: &Path, frontmost: Option<u32>) -> (Platform, Arc<FakeAx>) {
    let mut ax = FakeAx::trusted();
    let terminal_window = ax.add_node(&[]);
    ax.set_app_windows(GHOSTTY_PID, &[terminal_window]);

    let doc_url = format!("file://{}", target_path.display());
    let editor_window = ax.add_window_with_document(&doc_url);
    ax.set_app_windows(TEXTEDIT_PID, &[editor_window]);
    let ax = Arc::new(ax);

    let mut probe = FakeProbe::default();
    probe.add_child(GHOSTTY_PID, 101);
    probe.add_open_file(101, target_path);

    let platform = Platform {
        ax: ax.clone(),
        procs: Arc::new(probe),
        apps: Arc::new(FakeApps {
            apps: vec![
                descriptor(GHOSTTY_BUNDLE_ID, GHOSTTY_PID, "Ghostty"),
                descriptor("com.apple.TextEdit", TEXTEDIT_PID, "TextEdit"),
                descriptor("com.apple.Safari", 300, "Safari"),
            ],
            frontmost,
        }),
        state_db: None,
        home_dir: None,
        invoking_pid: 999,
    };
    (platform, ax)
}

#[test]
fn resolves_both_holders_in_enumeration_order() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, b"x").unwrap();
    let target = tattle_core::TargetFile::from_path(&file);

    let (platform, _ax) = fixture(target.as_path(), Some(TEXTEDIT_PID));
    let registry = HeuristicRegistry::standard(&platform);

    let report = FileUsageReport::resolve(
        &file.to_string_lossy(),
        &platform,
        &registry,
        &DetectionOptions {
            include_debug: true,
        },
    )
    .unwrap();

    let names: Vec<&str> = report.apps.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Ghostty", "TextEdit"]);

    let ghostty = &report.apps[0];
    assert!(ghostty.displays_file);
    assert_eq!(ghostty.file_visibility(), FileVisibility::Visible);
    assert!(!ghostty.is_frontmost);
    assert!(ghostty.debug.is_some());

    let textedit = &report.apps[1];
    assert!(textedit.is_frontmost);
    assert_eq!(textedit.file_visibility(), FileVisibility::Visible);
}

#[test]
fn reveal_with_two_matches_fails_before_any_action() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, b"x").unwrap();
    let target = tattle_core::TargetFile::from_path(&file);

    let (platform, ax) = fixture(target.as_path(), None);
    let registry = HeuristicRegistry::standard(&platform);

    let report = FileUsageReport::resolve(
        &file.to_string_lossy(),
        &platform,
        &registry,
        &DetectionOptions::default(),
    )
    .unwrap();
    assert_eq!(report.apps.len(), 2);

    let err = reveal::reveal_only_match(&report, &registry, &platform).unwrap_err();
    assert!(matches!(err, TattleError::AmbiguousReveal { found: 2 }));
    assert!(ax.actions.borrow().is_empty());
    assert!(ax.activations.borrow().is_empty());
}

#[test]
fn reveal_short_circuits_for_the_frontmost_visible_match() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("solo.txt");
    std::fs::write(&file, b"x").unwrap();
    let target = tattle_core::TargetFile::from_path(&file);

    // Only TextEdit shows this one, and it is already frontmost.
    let mut ax = FakeAx::trusted();
    let doc_url = format!("file://{}", target.as_path().display());
    let editor_window = ax.add_window_with_document(&doc_url);
    ax.set_app_windows(TEXTEDIT_PID, &[editor_window]);
    let ax = Arc::new(ax);

    let platform = Platform {
        ax: ax.clone(),
        procs: Arc::new(FakeProbe::default()),
        apps: Arc::new(FakeApps {
            apps: vec![descriptor("com.apple.TextEdit", TEXTEDIT_PID, "TextEdit")],
            frontmost: Some(TEXTEDIT_PID),
        }),
        state_db: None,
        home_dir: None,
        invoking_pid: 999,
    };
    let registry = HeuristicRegistry::standard(&platform);

    let report = FileUsageReport::resolve(
        &file.to_string_lossy(),
        &platform,
        &registry,
        &DetectionOptions::default(),
    )
    .unwrap();
    assert_eq!(report.apps.len(), 1);
    assert!(report.apps[0].is_frontmost);
    assert!(report.apps[0].is_tab_displaying_file_visible);

    reveal::reveal_only_match(&report, &registry, &platform).unwrap();
    assert!(ax.actions.borrow().is_empty());
    assert!(ax.activations.borrow().is_empty());
}
