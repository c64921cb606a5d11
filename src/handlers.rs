use crate::app::{App, ModalState};
use crate::backend::{BackendEvent, BackendTask};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

const PAGE_STEP: usize = 10;

pub(crate) fn send_task(task_tx: &UnboundedSender<BackendTask>, task: BackendTask) -> Result<()> {
    tracing::trace!(?task, "dispatching task");
    task_tx
        .send(task)
        .map_err(|err| anyhow::anyhow!("failed to dispatch task: {err}"))
}

pub(crate) fn handle_backend_event(
    app: &mut App,
    task_tx: &UnboundedSender<BackendTask>,
    event: BackendEvent,
) -> Result<()> {
    match event {
        BackendEvent::Hydrated {
            favorites,
            settings,
        } => {
            for task in app.apply_hydration(favorites, settings) {
                send_task(task_tx, task)?;
            }
        }
        BackendEvent::Saved { key } => {
            tracing::debug!(key, "persisted");
        }
        BackendEvent::Opened { href } => {
            let label = app
                .catalog()
                .get(&href)
                .map_or(href.as_str(), |link| link.title.as_str());
            app.status = Some(format!("Opened {label}"));
        }
        BackendEvent::Error { context, message } => {
            app.status = Some(format!("error[{context}]: {message}"));
        }
    }

    Ok(())
}

pub(crate) fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    task_tx: &UnboundedSender<BackendTask>,
) -> Result<()> {
    if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    match app.modal {
        ModalState::None => handle_key_without_modal(app, key, task_tx),
        ModalState::Help => {
            handle_help_key(app, key);
            Ok(())
        }
        ModalState::Tags { .. } => {
            handle_tags_key(app, key);
            Ok(())
        }
        ModalState::Settings { .. } => handle_settings_key(app, key, task_tx),
    }
}

fn handle_key_without_modal(
    app: &mut App,
    key: KeyEvent,
    task_tx: &UnboundedSender<BackendTask>,
) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let searching = app.focus.is_focused();

    match key.code {
        KeyCode::Char('k') if ctrl => {
            let input = app.focus_search();
            tracing::debug!(?input, "search focused");
        }
        KeyCode::Char('f') if ctrl => toggle_favorite(app, task_tx)?,
        KeyCode::Esc => app.clear_selection(),
        KeyCode::Enter => {
            if app.navigation_enabled()
                && let Some(task) = app.activate()
            {
                send_task(task_tx, task)?;
            }
        }
        KeyCode::Down | KeyCode::Tab => {
            if app.navigation_enabled() {
                app.move_next();
            } else {
                app.scroll_page_down(1);
            }
        }
        KeyCode::Up | KeyCode::BackTab => {
            if app.navigation_enabled() {
                app.move_previous();
            } else {
                app.scroll_page_up(1);
            }
        }
        KeyCode::PageDown => app.scroll_page_down(PAGE_STEP),
        KeyCode::PageUp => app.scroll_page_up(PAGE_STEP),
        KeyCode::Backspace if searching => app.backspace(),
        KeyCode::Char(c) if searching && !ctrl => app.type_char(c),
        KeyCode::Char('/') => {
            app.focus_search();
        }
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('f') => toggle_favorite(app, task_tx)?,
        KeyCode::Char('t') => app.open_tags(),
        KeyCode::Char('x') => app.clear_tags(),
        KeyCode::Char('s') => app.open_settings(),
        KeyCode::Char('?') => app.open_help(),
        KeyCode::Char('j') => app.scroll_page_down(1),
        KeyCode::Char('k') => app.scroll_page_up(1),
        _ => {}
    }

    Ok(())
}

fn toggle_favorite(app: &mut App, task_tx: &UnboundedSender<BackendTask>) -> Result<()> {
    if let Some(task) = app.toggle_selected_favorite() {
        send_task(task_tx, task)?;
    }
    Ok(())
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    if matches!(
        key.code,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')
    ) {
        app.close_modal();
    }
}

fn handle_tags_key(app: &mut App, key: KeyEvent) {
    let ModalState::Tags { cursor } = app.modal else {
        return;
    };
    let len = app.all_tags().len();

    match key.code {
        KeyCode::Esc | KeyCode::Char('t') | KeyCode::Char('q') => app.close_modal(),
        KeyCode::Down | KeyCode::Char('j') if len > 0 => {
            app.modal = ModalState::Tags {
                cursor: (cursor + 1).min(len - 1),
            };
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.modal = ModalState::Tags {
                cursor: cursor.saturating_sub(1),
            };
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(tag) = app.all_tags().get(cursor).cloned() {
                app.toggle_tag(&tag);
            }
        }
        KeyCode::Char('x') => app.clear_tags(),
        _ => {}
    }
}

fn handle_settings_key(
    app: &mut App,
    key: KeyEvent,
    task_tx: &UnboundedSender<BackendTask>,
) -> Result<()> {
    let ModalState::Settings {
        mut draft,
        mut field,
    } = app.modal.clone()
    else {
        return Ok(());
    };

    match key.code {
        KeyCode::Esc => {
            app.close_modal();
            return Ok(());
        }
        KeyCode::Enter => {
            if let Some(task) = app.save_settings(&draft) {
                send_task(task_tx, task)?;
            }
            return Ok(());
        }
        KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => field = field.next(),
        KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => field = field.prev(),
        KeyCode::Right | KeyCode::Char('l') => draft.adjust(field, true),
        KeyCode::Left | KeyCode::Char('h') => draft.adjust(field, false),
        KeyCode::Char('r') => draft.reset_to_defaults(app.defaults()),
        _ => {}
    }

    app.modal = ModalState::Settings { draft, field };
    Ok(())
}
