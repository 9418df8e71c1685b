//! Resolver façade: fans the detector pipeline out over every running
//! application for one target file.

use crate::error::{Result, TattleError};
use crate::model::{AppUsage, DetectionOptions};
use crate::path::TargetFile;
use crate::pipeline;
use crate::platform::Platform;
use crate::registry::HeuristicRegistry;

/// The outcome of one resolution: the normalized target and every
/// application found displaying it, in enumeration order.
#[derive(Debug)]
pub struct FileUsageReport {
    pub target: TargetFile,
    pub apps: Vec<AppUsage>,
}

impl FileUsageReport {
    /// Resolves `path` against a snapshot of running applications.
    ///
    /// An unparseable path is an error, distinct from "valid target that no
    /// application uses" (an empty `apps` list).
    pub fn resolve(
        path: &str,
        platform: &Platform,
        registry: &HeuristicRegistry,
        options: &DetectionOptions,
    ) -> Result<FileUsageReport> {
        let target = TargetFile::from_input(path)
            .ok_or_else(|| TattleError::InvalidPath(path.to_string()))?;

        let running = platform.apps.running_applications();
        let frontmost = platform.apps.frontmost_pid();

        let mut apps = Vec::with_capacity(running.len());
        for app in running {
            let usage = pipeline::evaluate(
                &app,
                &target,
                Some(app.pid) == frontmost,
                registry,
                options,
            );
            if usage.displays_file || usage.is_tab_displaying_file_visible {
                apps.push(usage);
            }
        }

        tracing::debug!(
            path = %target,
            matches = apps.len(),
            "resolution complete"
        );

        Ok(FileUsageReport { target, apps })
    }
}
