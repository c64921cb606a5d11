use crate::domain::LinkTarget;
use crate::selection::NavigationAction;
use anyhow::{Context, Result, bail};
#[cfg(test)]
use std::sync::{Arc, Mutex};

pub trait LinkOpener: Send + Sync {
    fn open(&self, action: &NavigationAction) -> Result<()>;
}

/// Hands links to the desktop's URL handler.
///
/// A terminal has no tab of its own to replace, so every target goes through
/// the system browser; the target is still recorded in the log.
#[derive(Debug, Clone, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, action: &NavigationAction) -> Result<()> {
        validate_href(&action.href)?;
        tracing::info!(
            href = %action.href,
            target = action.target.as_str(),
            window = ?action.window_size(),
            "opening link"
        );
        let launched = match action.target {
            LinkTarget::SameTab => open::that(&action.href),
            LinkTarget::NewTab | LinkTarget::NewWindow => open::that_detached(&action.href),
        };
        launched.with_context(|| format!("failed to open {}", action.href))
    }
}

/// Keeps every requested action instead of launching anything.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Arc<Mutex<Vec<NavigationAction>>>,
}

#[cfg(test)]
impl RecordingOpener {
    pub fn opened(&self) -> Vec<NavigationAction> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl LinkOpener for RecordingOpener {
    fn open(&self, action: &NavigationAction) -> Result<()> {
        validate_href(&action.href)?;
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(action.clone());
        }
        Ok(())
    }
}

fn validate_href(href: &str) -> Result<()> {
    let href = href.trim();
    if href.is_empty() {
        bail!("link has an empty href");
    }
    if href.starts_with('-') {
        bail!("refusing to open href that looks like an option: {href}");
    }
    Ok(())
}
