use crate::events::AppEvent;
use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

fn touches_record(event: &Event) -> bool {
    let meaningful = matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    );
    meaningful
        && event
            .paths
            .iter()
            .any(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
}

/// Reports changes to saved configurations, including ones made by other
/// processes such as the `wheelkit` tool.
pub async fn run_presets_watcher(presets_dir: PathBuf, tx: Sender<AppEvent>) {
    if let Err(e) = fs_err::create_dir_all(&presets_dir) {
        log::error!("Failed to create presets directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(Path::new(&presets_dir), RecursiveMode::NonRecursive) {
        log::error!("Failed to watch {}: {}", presets_dir.display(), e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                if touches_record(&event) && tx.send(AppEvent::PresetsChanged).await.is_err() {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
