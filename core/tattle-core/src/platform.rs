//! Collaborator wiring.
//!
//! Everything the engine needs from the host is threaded through one
//! [`Platform`] value built once at startup. There is no hidden global
//! state: the default heuristic registry is likewise constructed
//! explicitly (see [`crate::registry::HeuristicRegistry::standard`]).

use std::path::PathBuf;
use std::sync::Arc;

use crate::ax::AccessibilityBridge;
use crate::model::AppDescriptor;
use crate::process::ProcessProbe;
use crate::statedb::KvStateReader;

/// Enumerates running applications. External collaborator; the engine
/// keeps result order as the enumeration order.
pub trait AppEnumerator {
    /// All regular (non-background) running applications.
    fn running_applications(&self) -> Vec<AppDescriptor>;

    /// Pid of the frontmost application, if any.
    fn frontmost_pid(&self) -> Option<u32>;
}

/// Host collaborators for one resolution.
#[derive(Clone)]
pub struct Platform {
    pub ax: Arc<dyn AccessibilityBridge>,
    pub procs: Arc<dyn ProcessProbe>,
    pub apps: Arc<dyn AppEnumerator>,
    /// Read-only state-store reader; `None` disables the editor-family
    /// last-resort fallback.
    pub state_db: Option<Arc<dyn KvStateReader>>,
    /// Home directory used for `~`-relative tab-title matching.
    pub home_dir: Option<PathBuf>,
    /// Pid whose controlling terminal anchors the terminal heuristic's
    /// last-resort correlation; normally the invoking process.
    pub invoking_pid: u32,
}

impl Platform {
    /// Best-effort system wiring: a real process probe and state-db
    /// reader, with inert stubs for the surfaces that need a host-native
    /// bridge (UI accessibility, application enumeration).
    pub fn system() -> Platform {
        Platform {
            ax: Arc::new(stubs::UntrustedAccessibility),
            procs: Arc::new(crate::process::SysinfoProbe::new()),
            apps: Arc::new(stubs::NoApplications),
            state_db: Some(Arc::new(crate::statedb::SqliteStateReader)),
            home_dir: dirs::home_dir(),
            invoking_pid: std::process::id(),
        }
    }
}

pub mod stubs {
    //! Inert collaborator implementations for hosts without a native
    //! bridge. Heuristics see them as "permission unavailable" and abstain
    //! rather than reporting absence.

    use super::AppEnumerator;
    use crate::ax::{AccessibilityBridge, AxNode, AxValue};
    use crate::model::AppDescriptor;

    pub struct UntrustedAccessibility;

    impl AccessibilityBridge for UntrustedAccessibility {
        fn is_trusted(&self) -> bool {
            false
        }

        fn application_element(&self, _pid: u32) -> Option<AxNode> {
            None
        }

        fn attribute(&self, _node: AxNode, _name: &str) -> Option<AxValue> {
            None
        }

        fn children(&self, _node: AxNode) -> Vec<AxNode> {
            Vec::new()
        }

        fn perform_action(&self, _node: AxNode, _name: &str) -> bool {
            false
        }

        fn set_bool_attribute(&self, _node: AxNode, _name: &str, _value: bool) -> bool {
            false
        }

        fn activate_application(&self, _pid: u32) -> bool {
            false
        }
    }

    pub struct NoApplications;

    impl AppEnumerator for NoApplications {
        fn running_applications(&self) -> Vec<AppDescriptor> {
            Vec::new()
        }

        fn frontmost_pid(&self) -> Option<u32> {
            None
        }
    }
}
