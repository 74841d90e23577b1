//! Watch mode: full, non-incremental re-resolution on file-system change.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use crate::config::models::Configuration;
use crate::config::rt::ResolvedConfig;
use crate::debouncer::Debouncer;
use crate::theme::ThemeMap;

/// Path segments which are ignored by the watcher by default.
const BLACKLIST: [&str; 2] = [".git", "node_modules"];

/// A watch system driving configuration resolutions.
///
/// Change events are coalesced so at most one resolution runs at a time. Each
/// request is stamped with a generation counter; a result whose generation is
/// no longer the newest when it completes is discarded, never merged with a
/// later one. Every broadcast [`ResolvedConfig`] is therefore a fresh,
/// complete resolution.
pub struct WatchSystem {
    /// A channel of FS watch events.
    watch_rx: mpsc::Receiver<Event>,
    /// Keeps the watcher alive; dropping it stops watching.
    _watcher: RecommendedWatcher,
    /// Monotonic change counter stamping each resolution request.
    generation: Arc<AtomicU64>,
    /// Runs resolutions one at a time, newest request wins.
    resolver: Debouncer<u64>,
    /// The application shutdown channel.
    shutdown: BroadcastStream<()>,
}

impl WatchSystem {
    /// Create a new instance watching `working_directory` recursively.
    ///
    /// Completed resolutions are published on `resolutions`. Must be called
    /// within a tokio runtime.
    pub fn new(
        config: Arc<Configuration>,
        default_theme: Arc<ThemeMap>,
        working_directory: PathBuf,
        resolutions: broadcast::Sender<Arc<ResolvedConfig>>,
        shutdown: broadcast::Sender<()>,
    ) -> Result<Self> {
        let (watch_tx, watch_rx) = mpsc::channel(1);
        let _watcher = build_watcher(watch_tx, &working_directory)?;

        let generation = Arc::new(AtomicU64::new(0));
        let latest = generation.clone();
        let resolver = Debouncer::new(move |requested: u64| {
            let config = config.clone();
            let default_theme = default_theme.clone();
            let working_directory = working_directory.clone();
            let latest = latest.clone();
            let resolutions = resolutions.clone();
            async move {
                let result = tokio::task::spawn_blocking(move || {
                    ResolvedConfig::from_config(&config, &default_theme, &working_directory)
                })
                .await;

                match result {
                    Ok(result) => publish_resolution(&latest, requested, result, &resolutions),
                    Err(err) => tracing::error!(error = ?err, "resolution task failed"),
                }
            }
        });

        Ok(Self {
            watch_rx,
            _watcher,
            generation,
            resolver,
            shutdown: BroadcastStream::new(shutdown.subscribe()),
        })
    }

    /// Request a resolution without waiting for a change event, e.g. the
    /// initial one when entering watch mode.
    pub async fn trigger(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.resolver.push(generation).await;
    }

    /// Run the watch system, responding to events and triggering resolutions.
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.watch_rx.recv() => self.handle_watch_event(event).await,
                _ = self.shutdown.next() => break, // Any event, even a drop, will trigger shutdown.
            }
        }

        tracing::debug!("watch system has shut down");
    }

    #[tracing::instrument(level = "trace", skip(self, event))]
    async fn handle_watch_event(&mut self, event: Event) {
        if matches!(
            &event.kind,
            EventKind::Access(_) | EventKind::Any | EventKind::Other
        ) {
            return; // Nothing to do with these.
        }

        for path in &event.paths {
            // Check blacklisted paths.
            if path
                .components()
                .filter_map(|segment| segment.as_os_str().to_str())
                .any(|segment| BLACKLIST.contains(&segment))
            {
                continue; // Don't trigger a resolution as path is on the blacklist.
            }

            tracing::debug!("change detected in {:?}", path);
            self.trigger().await;
            return; // One relevant path is enough; the resolution is non-incremental anyway.
        }
    }
}

/// Publish a completed resolution, unless a newer change superseded it while
/// it was in flight.
///
/// A stale result is discarded whole, never merged with a newer one: if the
/// generation counter moved past `requested`, the resolution for the newest
/// generation is already queued and this one is dropped.
fn publish_resolution(
    latest: &AtomicU64,
    requested: u64,
    result: Result<ResolvedConfig>,
    resolutions: &broadcast::Sender<Arc<ResolvedConfig>>,
) {
    if latest.load(Ordering::SeqCst) != requested {
        tracing::debug!(requested, "resolution superseded by a newer change, discarding");
        return;
    }

    match result {
        Ok(resolved) => {
            tracing::debug!(files = resolved.files.len(), "resolution complete");
            let _ = resolutions.send(Arc::new(resolved));
        }
        Err(err) => tracing::error!("configuration resolution failed: {:#}", err),
    }
}

/// Build a FS watcher; when the watcher is dropped, it will stop watching for
/// events.
fn build_watcher(watch_tx: mpsc::Sender<Event>, path: &Path) -> Result<RecommendedWatcher> {
    let event_handler = move |event_res: notify::Result<Event>| match event_res {
        Ok(event) => {
            let _res = watch_tx.try_send(event);
        }
        Err(err) => {
            tracing::error!(error = ?err, "error from FS watcher");
        }
    };
    let mut watcher =
        recommended_watcher(event_handler).context("failed to build file system watcher")?;

    watcher
        .watch(path, RecursiveMode::Recursive)
        .context(format!("failed to watch {path:?} for file system changes"))?;

    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{Configuration, Content};
    use crate::theme::DEFAULT_THEME;
    use std::collections::BTreeMap;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::sync::broadcast::error::TryRecvError;

    fn resolved(working_directory: &std::path::Path) -> ResolvedConfig {
        ResolvedConfig {
            working_directory: working_directory.to_path_buf(),
            files: Default::default(),
            theme: Default::default(),
            plugins: Vec::new(),
            passthrough: BTreeMap::new(),
        }
    }

    #[test]
    fn stale_resolution_is_discarded_not_published() {
        let (resolutions_tx, mut resolutions_rx) = broadcast::channel(4);
        // A second change arrived while generation 1 was still resolving.
        let latest = AtomicU64::new(2);

        publish_resolution(
            &latest,
            1,
            Ok(resolved(std::path::Path::new("/"))),
            &resolutions_tx,
        );
        assert!(
            matches!(resolutions_rx.try_recv(), Err(TryRecvError::Empty)),
            "a superseded resolution must never be published"
        );

        publish_resolution(
            &latest,
            2,
            Ok(resolved(std::path::Path::new("/"))),
            &resolutions_tx,
        );
        resolutions_rx
            .try_recv()
            .expect("the newest resolution should be published");
    }

    #[tokio::test]
    async fn trigger_publishes_a_fresh_resolution() {
        let dir = tempdir().expect("should create temp directory");
        fs::create_dir_all(dir.path().join("src")).expect("should create src");
        fs::write(dir.path().join("src/main.rs"), "").expect("should write file");

        let config = Configuration {
            content: Content {
                patterns: vec!["src/**/*.rs".into()],
                exclude: Vec::new(),
            },
            ..Default::default()
        };

        let (resolutions_tx, mut resolutions_rx) = broadcast::channel(4);
        let (shutdown_tx, _) = broadcast::channel(1);
        let system = WatchSystem::new(
            Arc::new(config),
            Arc::new(DEFAULT_THEME.clone()),
            dir.path().to_path_buf(),
            resolutions_tx,
            shutdown_tx,
        )
        .expect("watch system should build");

        system.trigger().await;

        let resolved = tokio::time::timeout(Duration::from_secs(5), resolutions_rx.recv())
            .await
            .expect("resolution should arrive in time")
            .expect("channel should stay open");
        assert_eq!(resolved.files.len(), 1);
    }
}
