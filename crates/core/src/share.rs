#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            title: "StockSense - AI Stock Analysis".to_string(),
            text: "Check out this AI-powered stock analysis tool!".to_string(),
            url: url.into(),
        }
    }
}

/// Host-provided share sheet.
pub trait ShareSheet {
    fn share(&mut self, payload: &SharePayload) -> anyhow::Result<()>;
}

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Failed(String),
}

impl ShareOutcome {
    /// Title and description for the transient notification, if any.
    pub fn notice(&self) -> Option<(&'static str, String)> {
        match self {
            Self::Shared => None,
            Self::Copied => Some((
                "Link copied!",
                "The link has been copied to your clipboard.".to_string(),
            )),
            Self::Failed(reason) => Some(("Could not copy link", reason.clone())),
        }
    }
}

/// Prefers the share sheet; falls back to copying the URL when the sheet is
/// missing or rejects the request.
pub fn share_link(
    sheet: Option<&mut dyn ShareSheet>,
    clipboard: &mut dyn ClipboardSink,
    payload: &SharePayload,
) -> ShareOutcome {
    if let Some(sheet) = sheet {
        match sheet.share(payload) {
            Ok(()) => return ShareOutcome::Shared,
            Err(err) => {
                tracing::debug!(error = %err, "share sheet failed; copying link instead");
            }
        }
    }

    match clipboard.set_text(&payload.url) {
        Ok(()) => {
            tracing::info!(url = %payload.url, "share link copied to clipboard");
            ShareOutcome::Copied
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to copy share link");
            ShareOutcome::Failed(format!("{err:#}"))
        }
    }
}
