use anyhow::Context;
use stocksense_core::share::ClipboardSink;

/// System clipboard, opened on first use and then kept alive so Wayland
/// compositors don't drop the selection.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().context("system clipboard unavailable")?);
        }
        let Some(clipboard) = self.inner.as_mut() else {
            anyhow::bail!("system clipboard unavailable");
        };
        clipboard
            .set_text(text.to_string())
            .context("failed to write to system clipboard")
    }
}
