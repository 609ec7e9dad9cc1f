//! # Hot Reload Module
//!
//! Watches a route table file and swaps a freshly built router into a
//! [`SharedRouter`] whenever the file changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use treerouter::hot_reload::watch_route_table;
//! use treerouter::router::SharedRouter;
//! use treerouter::table::load_route_table;
//!
//! let table = load_route_table("routes.yaml")?;
//! let shared = SharedRouter::new(table.build_router(RouterConfig::from_env())?);
//!
//! // Keep the watcher alive for as long as reloads are wanted
//! let _watcher = watch_route_table("routes.yaml", shared.clone(), RouterConfig::from_env())?;
//! ```
//!
//! ## Error Handling
//!
//! If the new table fails to load or build:
//! - The error is logged
//! - The previous router remains active
//!
//! Readers holding the previous snapshot are never interrupted.

use std::path::{Path, PathBuf};

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info};

use crate::router::SharedRouter;
use crate::runtime_config::RouterConfig;
use crate::table::load_route_table;

/// Load `path` and swap the resulting router into `shared`
pub fn reload_route_table(
    path: &Path,
    shared: &SharedRouter<String>,
    config: RouterConfig,
) -> anyhow::Result<()> {
    let router = load_route_table(path)?.build_router(config)?;
    let route_count = router.inbound_entries().count() + router.outbound_entries().count();
    shared.store(router);
    info!(path = %path.display(), route_count, "hot-reload: route table applied");
    Ok(())
}

/// Watch a route table file and rebuild `shared` when it changes.
///
/// The returned watcher must be kept alive.
pub fn watch_route_table<P>(
    path: P,
    shared: SharedRouter<String>,
    config: RouterConfig,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
{
    let path: PathBuf = path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    if let Err(e) = reload_route_table(&watch_path, &shared, config) {
                        error!(
                            path = %watch_path.display(),
                            error = %format!("{e:#}"),
                            "hot-reload: keeping previous router"
                        );
                    }
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    info!(path = %path.display(), "hot-reload: watching route table");
    Ok(watcher)
}
