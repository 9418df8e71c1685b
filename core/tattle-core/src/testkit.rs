//! Test doubles for the platform collaborators.
//!
//! Shared by this crate's unit tests and the integration tests, so the
//! fake UI tree lives in the library rather than being duplicated per test
//! file. Not intended for production use.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ax::{attr, role, AccessibilityBridge, AxNode, AxValue};
use crate::model::{AppDescriptor, AppUsage};
use crate::platform::AppEnumerator;
use crate::process::{FdKind, OpenFile, ProcessProbe};
use crate::statedb::KvStateReader;

/// In-memory accessibility tree with recorded mutations.
///
/// Nodes are appended with [`FakeAx::add_node`] and wired with
/// [`FakeAx::add_child`]; per-application window lists are attached with
/// [`FakeAx::set_app_windows`].
pub struct FakeAx {
    trusted: bool,
    activate_result: bool,
    nodes: Vec<FakeNode>,
    app_roots: HashMap<u32, AxNode>,
    /// (node, action) pairs in invocation order.
    pub actions: RefCell<Vec<(AxNode, String)>>,
    /// (node, attribute, value) writes in invocation order.
    pub attribute_writes: RefCell<Vec<(AxNode, String, bool)>>,
    /// Pids passed to `activate_application`.
    pub activations: RefCell<Vec<u32>>,
}

#[derive(Default)]
struct FakeNode {
    attrs: HashMap<String, AxValue>,
    children: Vec<AxNode>,
}

impl FakeAx {
    pub fn trusted() -> FakeAx {
        FakeAx {
            trusted: true,
            activate_result: true,
            nodes: Vec::new(),
            app_roots: HashMap::new(),
            actions: RefCell::new(Vec::new()),
            attribute_writes: RefCell::new(Vec::new()),
            activations: RefCell::new(Vec::new()),
        }
    }

    pub fn untrusted() -> FakeAx {
        FakeAx {
            trusted: false,
            ..FakeAx::trusted()
        }
    }

    /// Subsequent `activate_application` calls report failure.
    pub fn refuse_activation(&mut self) {
        self.activate_result = false;
    }

    pub fn add_node(&mut self, attrs: &[(&str, AxValue)]) -> AxNode {
        let node = AxNode(self.nodes.len() as u64);
        self.nodes.push(FakeNode {
            attrs: attrs
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            children: Vec::new(),
        });
        node
    }

    pub fn add_child(&mut self, parent: AxNode, child: AxNode) {
        self.nodes[parent.0 as usize].children.push(child);
    }

    /// Attaches an application element for `pid` exposing `windows`.
    pub fn set_app_windows(&mut self, pid: u32, windows: &[AxNode]) {
        let app = self.add_node(&[(attr::WINDOWS, AxValue::Nodes(windows.to_vec()))]);
        self.app_roots.insert(pid, app);
    }

    /// A window whose current-document attribute carries `doc_url`;
    /// registration with `set_app_windows` is still the caller's job.
    pub fn add_window_with_document(&mut self, doc_url: &str) -> AxNode {
        self.add_node(&[(attr::DOCUMENT, AxValue::Str(doc_url.to_string()))])
    }

    /// A tab group under `window` with one plain radio button per
    /// `(title, selected)` pair; returns the tab nodes.
    pub fn tab_group(&mut self, window: AxNode, tabs: &[(&str, bool)]) -> Vec<AxNode> {
        let group = self.add_node(&[(attr::ROLE, AxValue::Str(role::TAB_GROUP.to_string()))]);
        self.add_child(window, group);

        tabs.iter()
            .map(|(title, selected)| {
                let tab = self.add_node(&[
                    (attr::ROLE, AxValue::Str(role::RADIO_BUTTON.to_string())),
                    (attr::TITLE, AxValue::Str((*title).to_string())),
                    (attr::VALUE, AxValue::Bool(*selected)),
                ]);
                self.add_child(group, tab);
                tab
            })
            .collect()
    }

    /// An editor-style tab button (radio with the tab-button subrole)
    /// directly under `window`.
    pub fn add_tab_button(&mut self, window: AxNode, label: &str, selected: bool) -> AxNode {
        let tab = self.add_node(&[
            (attr::ROLE, AxValue::Str(role::RADIO_BUTTON.to_string())),
            (
                attr::SUBROLE,
                AxValue::Str(role::TAB_BUTTON_SUBROLE.to_string()),
            ),
            (attr::DESCRIPTION, AxValue::Str(label.to_string())),
            (attr::VALUE, AxValue::Bool(selected)),
        ]);
        self.add_child(window, tab);
        tab
    }

    /// A static-text child whose value is `text`.
    pub fn add_text(&mut self, parent: AxNode, text: &str) -> AxNode {
        let node = self.add_node(&[(attr::VALUE, AxValue::Str(text.to_string()))]);
        self.add_child(parent, node);
        node
    }
}

impl AccessibilityBridge for FakeAx {
    fn is_trusted(&self) -> bool {
        self.trusted
    }

    fn application_element(&self, pid: u32) -> Option<AxNode> {
        self.app_roots.get(&pid).copied()
    }

    fn attribute(&self, node: AxNode, name: &str) -> Option<AxValue> {
        self.nodes
            .get(node.0 as usize)
            .and_then(|n| n.attrs.get(name))
            .cloned()
    }

    fn children(&self, node: AxNode) -> Vec<AxNode> {
        self.nodes
            .get(node.0 as usize)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn perform_action(&self, node: AxNode, name: &str) -> bool {
        self.actions.borrow_mut().push((node, name.to_string()));
        true
    }

    fn set_bool_attribute(&self, node: AxNode, name: &str, value: bool) -> bool {
        self.attribute_writes
            .borrow_mut()
            .push((node, name.to_string(), value));
        true
    }

    fn activate_application(&self, pid: u32) -> bool {
        if self.activate_result {
            self.activations.borrow_mut().push(pid);
        }
        self.activate_result
    }
}

/// In-memory process table.
#[derive(Default)]
pub struct FakeProbe {
    children: HashMap<u32, Vec<u32>>,
    open: HashMap<u32, Vec<OpenFile>>,
    cwds: HashMap<u32, PathBuf>,
    ttys: HashMap<u32, String>,
}

impl FakeProbe {
    pub fn add_child(&mut self, parent: u32, child: u32) {
        self.children.entry(parent).or_default().push(child);
    }

    pub fn add_open_file(&mut self, pid: u32, path: &Path) {
        self.open.entry(pid).or_default().push(OpenFile {
            kind: FdKind::File,
            path: path.to_path_buf(),
        });
    }

    pub fn add_open_other(&mut self, pid: u32, descriptor: &str) {
        self.open.entry(pid).or_default().push(OpenFile {
            kind: FdKind::Other,
            path: PathBuf::from(descriptor),
        });
    }

    pub fn set_cwd(&mut self, pid: u32, cwd: &Path) {
        self.cwds.insert(pid, cwd.to_path_buf());
    }

    pub fn set_tty(&mut self, pid: u32, tty: &str) {
        self.ttys.insert(pid, tty.to_string());
    }
}

impl ProcessProbe for FakeProbe {
    fn child_pids(&self, pid: u32) -> Vec<u32> {
        self.children.get(&pid).cloned().unwrap_or_default()
    }

    fn open_files(&self, pid: u32) -> Vec<OpenFile> {
        self.open.get(&pid).cloned().unwrap_or_default()
    }

    fn working_directory(&self, pid: u32) -> Option<PathBuf> {
        self.cwds.get(&pid).cloned()
    }

    fn controlling_terminal(&self, pid: u32) -> Option<String> {
        self.ttys.get(&pid).cloned()
    }
}

/// Fixed application list.
#[derive(Default)]
pub struct FakeApps {
    pub apps: Vec<AppDescriptor>,
    pub frontmost: Option<u32>,
}

impl AppEnumerator for FakeApps {
    fn running_applications(&self) -> Vec<AppDescriptor> {
        self.apps.clone()
    }

    fn frontmost_pid(&self) -> Option<u32> {
        self.frontmost
    }
}

/// Key/value map ignoring the database path.
#[derive(Default)]
pub struct FakeKv {
    values: HashMap<String, String>,
}

impl FakeKv {
    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl KvStateReader for FakeKv {
    fn string_value(&self, _db: &Path, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// An [`AppUsage`] with every verdict field cleared, for reveal tests.
pub fn usage_for(app: &AppDescriptor) -> AppUsage {
    AppUsage {
        bundle_id: app.bundle_id.clone(),
        pid: app.pid,
        name: app.name.clone(),
        is_frontmost: false,
        has_tabs: false,
        displays_file: true,
        is_tab_displaying_file_visible: false,
        debug: None,
    }
}
