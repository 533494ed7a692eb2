use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Transport,
    HttpStatus,
    HtmlInterstitial,
    JsonParse,
}

impl DispatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::HttpStatus => "http_status",
            Self::HtmlInterstitial => "html_interstitial",
            Self::JsonParse => "json_parse",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchError {
    pub stage: DispatchStage,
    pub detail: String,
    pub status: Option<u16>,
    pub raw_body: Option<String>,
}

impl DispatchError {
    pub fn new(stage: DispatchStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
            status: None,
            raw_body: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.raw_body = Some(body.into());
        self
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch error (stage={}): {}", self.stage.as_str(), self.detail)?;
        if let Some(status) = self.status {
            write!(f, " (status={status})")?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {}
