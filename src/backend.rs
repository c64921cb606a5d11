use crate::infra::LinkOpener;
use crate::selection::NavigationAction;
use crate::settings::{ConfigDefaults, UserSettings};
use crate::store::{FAVORITES_KEY, FavoriteSet, FavoritesRepo, SETTINGS_KEY, SettingsRepo, StateStore};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone)]
pub enum BackendTask {
    Hydrate,
    SaveFavorites(Vec<String>),
    SaveSettings(Option<UserSettings>),
    Open(NavigationAction),
}

#[derive(Debug, Clone)]
pub enum BackendEvent {
    Hydrated {
        favorites: FavoriteSet,
        settings: Option<UserSettings>,
    },
    Saved {
        key: &'static str,
    },
    Opened {
        href: String,
    },
    Error {
        context: String,
        message: String,
    },
}

pub struct Worker {
    pub store: Arc<dyn StateStore>,
    pub opener: Arc<dyn LinkOpener>,
    pub defaults: ConfigDefaults,
}

pub(crate) async fn worker_loop(
    worker: Worker,
    mut task_rx: UnboundedReceiver<BackendTask>,
    event_tx: UnboundedSender<BackendEvent>,
) {
    while let Some(task) = task_rx.recv().await {
        let event = run_task(&worker, task).await;
        if event_tx.send(event).is_err() {
            break;
        }
    }
    tracing::debug!("worker loop finished");
}

async fn run_task(worker: &Worker, task: BackendTask) -> BackendEvent {
    match task {
        BackendTask::Hydrate => {
            let store = worker.store.clone();
            let defaults = worker.defaults.clone();
            let result = tokio::task::spawn_blocking(move || {
                let favorites = FavoritesRepo::new(store.clone()).get();
                let settings = SettingsRepo::new(store).get(&defaults);
                (favorites, settings)
            })
            .await;
            match result {
                Ok((favorites, settings)) => BackendEvent::Hydrated {
                    favorites,
                    settings,
                },
                Err(err) => error_event("hydrate", format!("join error: {err}")),
            }
        }
        BackendTask::SaveFavorites(hrefs) => {
            let store = worker.store.clone();
            let result =
                tokio::task::spawn_blocking(move || FavoritesRepo::new(store).set(&hrefs)).await;
            saved_or_error(FAVORITES_KEY, result)
        }
        BackendTask::SaveSettings(settings) => {
            let store = worker.store.clone();
            let result = tokio::task::spawn_blocking(move || {
                SettingsRepo::new(store).set(settings.as_ref())
            })
            .await;
            saved_or_error(SETTINGS_KEY, result)
        }
        BackendTask::Open(action) => {
            let opener = worker.opener.clone();
            let href = action.href.clone();
            let result = tokio::task::spawn_blocking(move || opener.open(&action)).await;
            match result {
                Ok(Ok(())) => BackendEvent::Opened { href },
                other => error_event("open", flatten_error(other)),
            }
        }
    }
}

fn saved_or_error<E>(
    key: &'static str,
    result: Result<Result<(), E>, tokio::task::JoinError>,
) -> BackendEvent
where
    E: Into<anyhow::Error>,
{
    match result {
        Ok(Ok(())) => BackendEvent::Saved { key },
        Ok(Err(err)) => error_event(key, format!("{:#}", err.into())),
        Err(err) => error_event(key, format!("join error: {err}")),
    }
}

fn error_event(context: &str, message: String) -> BackendEvent {
    tracing::warn!(context, %message, "background task failed");
    BackendEvent::Error {
        context: context.to_string(),
        message,
    }
}

fn flatten_error<T>(res: std::result::Result<anyhow::Result<T>, tokio::task::JoinError>) -> String {
    match res {
        Ok(Ok(_)) => "ok".to_string(),
        Ok(Err(err)) => format!("{err:#}"),
        Err(err) => format!("join error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardLayout, LinkTarget, SortingOption};
    use crate::infra::RecordingOpener;
    use crate::store::MemoryStore;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn worker(store: MemoryStore, opener: RecordingOpener) -> Worker {
        Worker {
            store: Arc::new(store),
            opener: Arc::new(opener),
            defaults: ConfigDefaults::default(),
        }
    }

    #[test]
    fn flatten_error_formats_all_cases() {
        let ok = flatten_error::<()>(Ok(Ok(())));
        assert_eq!(ok, "ok");

        let err = flatten_error::<()>(Ok(Err(anyhow::anyhow!("boom"))));
        assert!(err.contains("boom"));
    }

    #[tokio::test]
    async fn hydrate_reads_both_records() {
        let store = MemoryStore::default();
        store
            .save(FAVORITES_KEY, &json!(["https://a.example.com"]))
            .expect("seed favorites");
        store
            .save(SETTINGS_KEY, &json!({ "linkTarget": "same-tab" }))
            .expect("seed settings");

        let event = run_task(&worker(store, RecordingOpener::default()), BackendTask::Hydrate).await;
        let (favorites, settings) = match event {
            BackendEvent::Hydrated {
                favorites,
                settings,
            } => (favorites, settings),
            other => panic!("expected hydrated event, got {other:?}"),
        };
        assert!(favorites.contains("https://a.example.com"));
        assert_eq!(
            settings.map(|s| s.link_target),
            Some(LinkTarget::SameTab)
        );
    }

    #[tokio::test]
    async fn save_tasks_write_through_the_store() {
        let store = MemoryStore::default();
        let w = worker(store.clone(), RecordingOpener::default());

        let event = run_task(&w, BackendTask::SaveFavorites(vec!["x".to_string()])).await;
        assert!(matches!(event, BackendEvent::Saved { key: FAVORITES_KEY }));
        assert_eq!(store.get(FAVORITES_KEY), Some(json!(["x"])));

        let user = UserSettings {
            grid_columns: 2,
            card_layout: CardLayout::Default,
            link_target: LinkTarget::NewTab,
            link_sorting: SortingOption::Defined,
            category_sorting: SortingOption::Alphabetical,
        };
        run_task(&w, BackendTask::SaveSettings(Some(user))).await;
        assert_eq!(
            store.get(SETTINGS_KEY).and_then(|v| v.get("gridColumns").cloned()),
            Some(json!(2))
        );
        run_task(&w, BackendTask::SaveSettings(None)).await;
        assert_eq!(store.get(SETTINGS_KEY), Some(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn open_failures_become_error_events() {
        let opener = RecordingOpener::default();
        let w = worker(MemoryStore::default(), opener.clone());
        let event = run_task(
            &w,
            BackendTask::Open(NavigationAction {
                href: String::new(),
                target: LinkTarget::NewTab,
            }),
        )
        .await;
        assert!(matches!(event, BackendEvent::Error { ref context, .. } if context == "open"));
        assert!(opener.opened().is_empty());
    }

    #[tokio::test]
    async fn worker_loop_answers_each_task() {
        let opener = RecordingOpener::default();
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(worker_loop(
            worker(MemoryStore::default(), opener.clone()),
            task_rx,
            event_tx,
        ));

        task_tx
            .send(BackendTask::Open(NavigationAction {
                href: "https://a.example.com".to_string(),
                target: LinkTarget::NewWindow,
            }))
            .expect("send task");
        drop(task_tx);

        let event = event_rx.recv().await.expect("event");
        assert!(matches!(event, BackendEvent::Opened { ref href } if href == "https://a.example.com"));
        handle.await.expect("join worker");
        assert_eq!(opener.opened().len(), 1);
    }
}
