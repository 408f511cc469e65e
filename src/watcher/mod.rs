//! Watch mode: re-run the snapshot on an interval and whenever an input file
//! changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::engine::{Aggregator, RunOutcome};
use crate::error::WatcherError;
use crate::event::RefreshEvent;
use crate::sink::Sink;

/// Result type for watcher operations
pub type WatcherResult<T> = Result<T, WatcherError>;

/// Quiet period used to coalesce bursts of file events into one refresh.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// Live watch: the event receiver plus the watcher that feeds it.
/// Dropping this stops file notifications.
pub struct Watch {
    pub rx: mpsc::Receiver<RefreshEvent>,
    _watcher: RecommendedWatcher,
}

/// Start watching `targets` and ticking every `interval`.
///
/// Each target's parent directory is watched (non-recursively) so that files
/// replaced by rename are still seen. Targets whose directory does not exist
/// are logged and skipped; the tick keeps running regardless.
pub fn start_watching(targets: &[PathBuf], interval: Duration) -> WatcherResult<Watch> {
    let (tx, rx) = mpsc::channel();

    let cwd = std::env::current_dir()?;
    let watched: Vec<PathBuf> = targets.iter().map(|t| resolve_target(t, &cwd)).collect();
    let dirs = watch_dirs(&watched);

    let tx_watcher = tx.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            handle_watch_event(res, &watched, &tx_watcher);
        },
        Config::default().with_poll_interval(DEBOUNCE),
    )?;

    for dir in &dirs {
        watch_dir(&mut watcher, dir)?;
    }

    std::thread::spawn(move || loop {
        std::thread::sleep(interval);
        if tx.send(RefreshEvent::Tick).is_err() {
            return;
        }
    });

    Ok(Watch {
        rx,
        _watcher: watcher,
    })
}

/// Absolute form of `target` against `cwd`, with its directory canonicalized
/// when it exists so it compares equal to the paths notify reports.
pub fn resolve_target(target: &Path, cwd: &Path) -> PathBuf {
    let absolute = if target.is_absolute() {
        target.to_path_buf()
    } else {
        cwd.join(target)
    };
    match (absolute.parent(), absolute.file_name()) {
        (Some(dir), Some(name)) => dir
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

/// Distinct parent directories of resolved targets. An empty parent means
/// the current directory.
pub fn watch_dirs(targets: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = targets
        .iter()
        .filter_map(|t| t.parent())
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                dir.to_path_buf()
            }
        })
        .collect();
    dirs.sort();
    dirs.dedup();
    dirs
}

fn watch_dir(watcher: &mut RecommendedWatcher, dir: &Path) -> WatcherResult<()> {
    if dir.is_dir() {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
    } else {
        tracing::warn!(path = %dir.display(), "watch directory does not exist, relying on interval");
    }
    Ok(())
}

fn handle_watch_event(
    res: Result<notify::Event, notify::Error>,
    targets: &[PathBuf],
    tx: &mpsc::Sender<RefreshEvent>,
) {
    match res {
        Ok(event) => {
            if let Some(path) = changed_target(&event, targets) {
                let _ = tx.send(RefreshEvent::InputChanged(path));
            }
        }
        Err(e) => {
            let _ = tx.send(RefreshEvent::Error(e.into()));
        }
    }
}

/// First watched target touched by a content-changing event.
/// Pure function: inspects the event only.
pub fn changed_target(event: &notify::Event, targets: &[PathBuf]) -> Option<PathBuf> {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }
    event
        .paths
        .iter()
        .find(|p| targets.iter().any(|t| t == *p))
        .cloned()
}

/// Run snapshots until the event channel closes.
///
/// Snapshots run one at a time on the calling thread. After an input change,
/// further events arriving within [`DEBOUNCE`] are folded into the same run.
/// `on_run` sees every outcome.
pub fn run_watch_loop(
    aggregator: &Aggregator,
    sink: &dyn Sink,
    rx: &mpsc::Receiver<RefreshEvent>,
    mut on_run: impl FnMut(&RunOutcome),
) {
    on_run(&aggregator.run(sink));

    while let Ok(event) = rx.recv() {
        match event {
            RefreshEvent::Tick => {
                tracing::debug!("refresh interval elapsed");
            }
            RefreshEvent::InputChanged(path) => {
                tracing::info!(path = %path.display(), "input changed");
                drain_burst(rx);
            }
            RefreshEvent::Error(e) => {
                tracing::warn!(error = %e, "file watcher error");
                continue;
            }
        }
        on_run(&aggregator.run(sink));
    }
}

fn drain_burst(rx: &mpsc::Receiver<RefreshEvent>) {
    while let Ok(event) = rx.recv_timeout(DEBOUNCE) {
        if let RefreshEvent::Error(e) = event {
            tracing::warn!(error = %e, "file watcher error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    use tempfile::TempDir;

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn modify_on_target_is_reported() {
        let targets = vec![PathBuf::from("/data/agent_registry.json")];
        let ev = event(EventKind::Modify(ModifyKind::Any), "/data/agent_registry.json");
        assert_eq!(
            changed_target(&ev, &targets),
            Some(PathBuf::from("/data/agent_registry.json"))
        );
    }

    #[test]
    fn sibling_files_are_ignored() {
        let targets = vec![PathBuf::from("/data/agent_registry.json")];
        let ev = event(EventKind::Create(CreateKind::File), "/data/other.json");
        assert_eq!(changed_target(&ev, &targets), None);
    }

    #[test]
    fn access_events_are_ignored() {
        let targets = vec![PathBuf::from("/data/agent_registry.json")];
        let ev = event(EventKind::Access(AccessKind::Any), "/data/agent_registry.json");
        assert_eq!(changed_target(&ev, &targets), None);
    }

    #[test]
    fn relative_target_resolves_against_cwd() {
        let tmpdir = TempDir::new().unwrap();
        let cwd = tmpdir.path().canonicalize().unwrap();

        let resolved = resolve_target(Path::new("agent_registry.json"), tmpdir.path());
        assert_eq!(resolved, cwd.join("agent_registry.json"));
        assert_eq!(watch_dirs(&[resolved.clone()]), vec![cwd.clone()]);

        // notify reports absolute paths; the resolved target matches them
        let reported = cwd.join("agent_registry.json");
        let ev = notify::Event::new(EventKind::Modify(ModifyKind::Any)).add_path(reported.clone());
        assert_eq!(changed_target(&ev, &[resolved]), Some(reported));
    }

    #[test]
    fn bare_filename_watches_current_dir() {
        assert_eq!(
            watch_dirs(&[PathBuf::from("agent_registry.json")]),
            vec![PathBuf::from(".")]
        );
    }
}
