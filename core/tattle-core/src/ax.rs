//! Accessibility collaborator interface.
//!
//! The engine never talks to a UI toolkit directly: it sees opaque element
//! handles and a small set of fallible queries, and never assumes handle
//! ownership or lifetime beyond one traversal. Any query failure means
//! "unknown", never "false".

/// Opaque handle to one UI element. Only meaningful to the bridge that
/// minted it, and only for the duration of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxNode(pub u64);

/// Attribute payloads the engine understands.
#[derive(Debug, Clone, PartialEq)]
pub enum AxValue {
    Str(String),
    Bool(bool),
    Nodes(Vec<AxNode>),
}

/// Attribute names, mirroring the host toolkit's.
pub mod attr {
    pub const ROLE: &str = "AXRole";
    pub const SUBROLE: &str = "AXSubrole";
    pub const TITLE: &str = "AXTitle";
    pub const DESCRIPTION: &str = "AXDescription";
    pub const HELP: &str = "AXHelp";
    pub const VALUE: &str = "AXValue";
    pub const DOCUMENT: &str = "AXDocument";
    pub const WINDOWS: &str = "AXWindows";
    pub const MAIN: &str = "AXMain";
}

pub mod role {
    pub const TAB_GROUP: &str = "AXTabGroup";
    pub const RADIO_BUTTON: &str = "AXRadioButton";
    pub const TAB_BUTTON_SUBROLE: &str = "AXTabButton";
}

pub mod action {
    pub const RAISE: &str = "AXRaise";
    pub const PRESS: &str = "AXPress";
}

pub trait AccessibilityBridge {
    /// Whether the host has granted assistive access to this process.
    fn is_trusted(&self) -> bool;

    fn application_element(&self, pid: u32) -> Option<AxNode>;

    fn attribute(&self, node: AxNode, name: &str) -> Option<AxValue>;

    /// Child elements, in the order the host reports them. Errors and
    /// childless elements both yield an empty list.
    fn children(&self, node: AxNode) -> Vec<AxNode>;

    fn perform_action(&self, node: AxNode, name: &str) -> bool;

    fn set_bool_attribute(&self, node: AxNode, name: &str, value: bool) -> bool;

    /// Brings the owning application to the foreground, all windows.
    fn activate_application(&self, pid: u32) -> bool;
}

pub fn string_attribute(ax: &dyn AccessibilityBridge, node: AxNode, name: &str) -> Option<String> {
    match ax.attribute(node, name)? {
        AxValue::Str(value) => Some(value),
        _ => None,
    }
}

pub fn bool_attribute(ax: &dyn AccessibilityBridge, node: AxNode, name: &str) -> Option<bool> {
    match ax.attribute(node, name)? {
        AxValue::Bool(value) => Some(value),
        _ => None,
    }
}

pub fn role_of(ax: &dyn AccessibilityBridge, node: AxNode) -> Option<String> {
    string_attribute(ax, node, attr::ROLE)
}

/// Title, falling back to description; empty values count as missing.
pub fn title_of(ax: &dyn AccessibilityBridge, node: AxNode) -> Option<String> {
    for name in [attr::TITLE, attr::DESCRIPTION] {
        if let Some(value) = string_attribute(ax, node, name) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// The application's window elements, or empty when anything fails.
pub fn windows(ax: &dyn AccessibilityBridge, pid: u32) -> Vec<AxNode> {
    let Some(app) = ax.application_element(pid) else {
        return Vec::new();
    };
    match ax.attribute(app, attr::WINDOWS) {
        Some(AxValue::Nodes(nodes)) => nodes,
        _ => Vec::new(),
    }
}
