//! Configuration file watcher for hot reload.
//!
//! The watch sits on the directory holding the file, not on the file. Editors
//! save by writing a sibling and renaming it over the original, which replaces
//! the inode a file watch is attached to.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// Sends a freshly loaded [`GatewayConfig`] each time the file is saved.
pub struct ConfigWatcher {
    path: PathBuf,
    dir: PathBuf,
    file_name: OsString,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();

        (
            Self {
                path: path.to_path_buf(),
                dir,
                file_name,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            dir,
            file_name,
            update_tx,
        } = self;
        let config_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_config(&event, &file_name) => {
                    tracing::debug!(kind = ?event.kind, "Config file saved");
                    match load_config(&config_path) {
                        Ok(config) => {
                            tracing::info!(
                                block_status = %config.shield.block_status,
                                "Reloaded configuration file"
                            );
                            let _ = update_tx.send(config);
                        }
                        // Half-written saves land here too; the next event retries.
                        Err(e) => tracing::warn!(
                            error = %e,
                            "Ignoring unreadable configuration file"
                        ),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// True when `event` writes, creates or renames onto the watched file name.
fn touches_config(event: &Event, file_name: &OsStr) -> bool {
    let kind = &event.kind;
    if !(kind.is_modify() || kind.is_create()) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name))
}
