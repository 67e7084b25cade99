//! Workspace file watcher
//!
//! Source and markdown changes under the workspace trigger a `quick_check`
//! workflow for the changed file once it has been quiet for
//! `watcher.debounce_ms`. Memory bank, VCS and dependency directories are
//! ignored.

use notify::{Event, EventKind, RecursiveMode, Watcher};
use sdk::core_tool::RouterHandle;
use sdk::errors::EngineError;
use sdk::protocol::ToolRequest;
use sdk::types::{WorkflowArgs, WorkflowResult, WorkflowType};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;

const IGNORED_DIRS: &[&str] = &["node_modules", ".git", ".intellicode", "target", "dist"];

/// Pending changes keyed by path, each with the time it last changed
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change; a repeated change restarts the quiet period
    pub fn note(&mut self, path: PathBuf, at: Instant) {
        self.pending.insert(path, at);
    }

    /// Remove and return paths quiet for at least `quiet`, sorted
    pub fn due(&mut self, now: Instant, quiet: Duration) -> Vec<PathBuf> {
        let mut ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, at)| now.duration_since(**at) >= quiet)
            .map(|(path, _)| path.clone())
            .collect();
        ready.sort();

        for path in &ready {
            self.pending.remove(path);
        }
        ready
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub struct FileWatcher {
    router: RouterHandle,
    workspace: PathBuf,
    memory_root: PathBuf,
    extensions: Vec<String>,
    debounce: Duration,
}

impl FileWatcher {
    pub fn new(router: RouterHandle, config: &Config) -> Self {
        Self {
            router,
            workspace: config.core.workspace.clone(),
            memory_root: config.core.memory_root.clone(),
            extensions: config.watcher.extensions.clone(),
            debounce: Duration::from_millis(config.watcher.debounce_ms),
        }
    }

    /// Whether a change to `path` should trigger a check
    pub fn should_check(&self, path: &Path) -> bool {
        if path.starts_with(&self.memory_root) {
            return false;
        }

        let relative = path.strip_prefix(&self.workspace).unwrap_or(path);
        let ignored = relative.components().any(|c| {
            c.as_os_str()
                .to_str()
                .map(|s| IGNORED_DIRS.contains(&s))
                .unwrap_or(false)
        });
        if ignored {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    }

    /// Workflow target for a changed path, relative to the workspace when possible
    fn target_for(&self, path: &Path) -> String {
        path.strip_prefix(&self.workspace)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    async fn check(&self, path: &Path) {
        let target = self.target_for(path);
        let request = ToolRequest::Workflow(WorkflowArgs::new(
            WorkflowType::QuickCheck,
            vec![target.clone()],
        ));

        match self.router.call(request).await.and_then(|r| r.into_workflow()) {
            Ok(WorkflowResult::QuickCheck(result)) => {
                if result.summary.needs_attention {
                    warn!(
                        "{}: {} issue(s) need attention",
                        target, result.summary.total_issues
                    );
                } else {
                    info!("{}: clean", target);
                }
            }
            Ok(_) => debug!("{}: unexpected workflow result", target),
            Err(e) => warn!("Quick check of {} failed: {}", target, e),
        }
    }

    /// Watch the workspace until the notify channel closes
    pub async fn run(self) -> Result<(), EngineError> {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(1000);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        for path in event.paths {
                            if let Err(e) = tx.try_send(path) {
                                debug!("File change dropped: {}", e);
                            }
                        }
                    }
                }
                Err(e) => warn!("File watcher notify error: {}", e),
            }
        })
        .map_err(|e| EngineError::capability("file watcher", e.to_string()))?;

        watcher
            .watch(&self.workspace, RecursiveMode::Recursive)
            .map_err(|e| EngineError::capability("file watcher", e.to_string()))?;
        info!("Watching {} for changes", self.workspace.display());

        let mut debouncer = Debouncer::new();
        loop {
            tokio::select! {
                changed = rx.recv() => {
                    match changed {
                        Some(path) if self.should_check(&path) => debouncer.note(path, Instant::now()),
                        Some(_) => {}
                        None => break,
                    }
                }
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    for path in debouncer.due(Instant::now(), self.debounce) {
                        self.check(&path).await;
                    }
                }
            }
        }

        info!("File watcher stopped");
        Ok(())
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                warn!("File watcher exited: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolRegistry, ToolRouter};

    fn watcher() -> FileWatcher {
        let mut config = Config::default();
        config.core.workspace = PathBuf::from("/work");
        config.core.memory_root = PathBuf::from("/work/.intellicode/memory");
        let router = ToolRouter::new(ToolRegistry::new(), 16);
        FileWatcher::new(router.handle(), &config)
    }

    #[test]
    fn test_should_check_filters_extensions_and_dirs() {
        let watcher = watcher();
        assert!(watcher.should_check(Path::new("/work/src/app.ts")));
        assert!(watcher.should_check(Path::new("/work/README.md")));
        assert!(!watcher.should_check(Path::new("/work/src/app.rs")));
        assert!(!watcher.should_check(Path::new("/work/node_modules/x/index.js")));
        assert!(!watcher.should_check(Path::new(
            "/work/.intellicode/memory/core/project-brief.md"
        )));
    }

    #[test]
    fn test_target_is_workspace_relative() {
        let watcher = watcher();
        assert_eq!(
            watcher.target_for(Path::new("/work/src/app.ts")),
            format!("src{}app.ts", std::path::MAIN_SEPARATOR)
        );
        assert_eq!(watcher.target_for(Path::new("/elsewhere/a.ts")), "/elsewhere/a.ts");
    }

    #[test]
    fn test_debouncer_waits_for_quiet_period() {
        let mut debouncer = Debouncer::new();
        let start = Instant::now();
        let quiet = Duration::from_millis(300);

        debouncer.note(PathBuf::from("a.ts"), start);
        debouncer.note(PathBuf::from("b.ts"), start + Duration::from_millis(200));
        assert!(debouncer.due(start + Duration::from_millis(100), quiet).is_empty());

        // Another change to a.ts restarts its quiet period
        debouncer.note(PathBuf::from("a.ts"), start + Duration::from_millis(250));
        assert!(debouncer.due(start + Duration::from_millis(400), quiet).is_empty());

        let ready = debouncer.due(start + Duration::from_millis(550), quiet);
        assert_eq!(ready, vec![PathBuf::from("a.ts"), PathBuf::from("b.ts")]);
        assert!(debouncer.is_empty());
    }
}
