//! Process-tree and file-handle introspection.
//!
//! Links a file handle to the process that holds it: descendant discovery
//! over the process-parent graph, open-descriptor matching, and working
//! directory / controlling terminal resolution. Every query tolerates
//! transient failure (process exited mid-query, permission denied) by
//! returning empty: a vanished process is evidence of absence, not an
//! error.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::path::{self, TargetFile};

/// Kind of object behind an open descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdKind {
    File,
    Other,
}

/// One open descriptor with its resolved backing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub kind: FdKind,
    pub path: PathBuf,
}

/// Host process primitives. All methods degrade to empty/`None` on failure.
pub trait ProcessProbe {
    fn child_pids(&self, pid: u32) -> Vec<u32>;
    fn open_files(&self, pid: u32) -> Vec<OpenFile>;
    fn working_directory(&self, pid: u32) -> Option<PathBuf>;
    /// Controlling terminal device path, e.g. `/dev/ttys003`.
    fn controlling_terminal(&self, pid: u32) -> Option<String>;
}

pub const DESCENDANT_LIMIT: usize = 4096;

/// All pids transitively spawned by `root`, breadth-first, capped at
/// `limit`. The seen-set tolerates reparenting races that would otherwise
/// revisit a pid.
pub fn descendant_pids(probe: &dyn ProcessProbe, root: u32, limit: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(64);
    let mut queue = VecDeque::from([root]);
    let mut seen = HashSet::from([root]);

    while let Some(current) = queue.pop_front() {
        if out.len() >= limit {
            break;
        }
        for child in probe.child_pids(current) {
            if child == 0 {
                continue;
            }
            if seen.insert(child) {
                out.push(child);
                queue.push_back(child);
            }
        }
    }

    out
}

/// True if `pid` holds an open file-backed descriptor whose resolved
/// backing path equals the target.
pub fn has_open_handle(probe: &dyn ProcessProbe, pid: u32, target: &TargetFile) -> bool {
    probe
        .open_files(pid)
        .into_iter()
        .filter(|file| file.kind == FdKind::File)
        .any(|file| path::normalize(&file.path).as_path() == target.as_path())
}

/// System probe backed by `sysinfo`, with `/proc` for descriptor and
/// terminal queries where available. The process snapshot is cached
/// briefly so a descendant BFS does not rescan the process table per node.
pub struct SysinfoProbe {
    system: std::cell::RefCell<sysinfo::System>,
    refreshed_at: std::cell::Cell<Option<std::time::Instant>>,
}

const SNAPSHOT_TTL: std::time::Duration = std::time::Duration::from_millis(500);

impl SysinfoProbe {
    pub fn new() -> SysinfoProbe {
        SysinfoProbe {
            system: std::cell::RefCell::new(sysinfo::System::new()),
            refreshed_at: std::cell::Cell::new(None),
        }
    }

    fn refresh_if_stale(&self) {
        let stale = self
            .refreshed_at
            .get()
            .map_or(true, |at| at.elapsed() > SNAPSHOT_TTL);
        if stale {
            self.system.borrow_mut().refresh_processes();
            self.refreshed_at.set(Some(std::time::Instant::now()));
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SysinfoProbe {
    fn child_pids(&self, pid: u32) -> Vec<u32> {
        self.refresh_if_stale();
        let system = self.system.borrow();
        system
            .processes()
            .iter()
            .filter(|(_, process)| process.parent().map(|p| p.as_u32()) == Some(pid))
            .map(|(child, _)| child.as_u32())
            .collect()
    }

    fn open_files(&self, pid: u32) -> Vec<OpenFile> {
        procfs::open_files(pid)
    }

    fn working_directory(&self, pid: u32) -> Option<PathBuf> {
        self.refresh_if_stale();
        let system = self.system.borrow();
        system
            .process(sysinfo::Pid::from_u32(pid))
            .and_then(|process| process.cwd().map(Path::to_path_buf))
    }

    fn controlling_terminal(&self, pid: u32) -> Option<String> {
        procfs::controlling_terminal(pid)
    }
}

#[cfg(target_os = "linux")]
mod procfs {
    use super::{FdKind, OpenFile};

    pub(super) fn open_files(pid: u32) -> Vec<OpenFile> {
        let Ok(entries) = std::fs::read_dir(format!("/proc/{pid}/fd")) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| std::fs::read_link(entry.path()).ok())
            .map(|link| {
                // Deleted-but-open files keep their last path plus a marker.
                let text = link.to_string_lossy();
                let cleaned = text.strip_suffix(" (deleted)").unwrap_or(&text);
                let kind = if cleaned.starts_with('/') {
                    FdKind::File
                } else {
                    // socket:[..], pipe:[..], anon_inode:[..]
                    FdKind::Other
                };
                OpenFile {
                    kind,
                    path: std::path::PathBuf::from(cleaned),
                }
            })
            .collect()
    }

    pub(super) fn controlling_terminal(pid: u32) -> Option<String> {
        for fd in 0..3u32 {
            if let Ok(link) = std::fs::read_link(format!("/proc/{pid}/fd/{fd}")) {
                let text = link.to_string_lossy();
                if text.starts_with("/dev/pts/") || text.starts_with("/dev/tty") {
                    return Some(text.into_owned());
                }
            }
        }
        None
    }
}

#[cfg(not(target_os = "linux"))]
mod procfs {
    //! Hosts without procfs wire their own [`super::ProcessProbe`].

    use super::OpenFile;

    pub(super) fn open_files(_pid: u32) -> Vec<OpenFile> {
        Vec::new()
    }

    pub(super) fn controlling_terminal(_pid: u32) -> Option<String> {
        None
    }
}
