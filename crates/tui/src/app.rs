use crate::input::{self, Action, InputBuffer};
use crate::ui;
use crossterm::event::{self, Event, MouseButton, MouseEvent, MouseEventKind};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::time::{Duration, Instant};
use stocksense_core::dispatch::{Dispatcher, Settled};
use stocksense_core::session::ChatSession;
use stocksense_core::share::{self, ClipboardSink, SharePayload};
use tokio::sync::mpsc;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const ANIMATION_STEP: Duration = Duration::from_millis(300);
const NOTICE_TTL: Duration = Duration::from_secs(3);
const PAGE: usize = 5;
const WHEEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: &'static str,
    pub body: String,
    expires_at: Instant,
}

/// Distance from the newest line. Zero means the view follows new entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptScroll {
    offset_from_bottom: usize,
}

impl TranscriptScroll {
    pub fn follow_latest(&mut self) {
        self.offset_from_bottom = 0;
    }

    pub fn is_following(&self) -> bool {
        self.offset_from_bottom == 0
    }

    pub fn up(&mut self, lines: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_add(lines);
    }

    pub fn down(&mut self, lines: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(lines);
    }

    /// First visible line for `total` lines in a `height`-line viewport.
    pub fn top_line(&mut self, total: usize, height: usize) -> usize {
        let max_offset = total.saturating_sub(height);
        self.offset_from_bottom = self.offset_from_bottom.min(max_offset);
        max_offset - self.offset_from_bottom
    }
}

/// Clickable regions from the last drawn frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hitboxes {
    pub send: Rect,
    pub share: Rect,
}

fn hit(r: Rect, column: u16, row: u16) -> bool {
    column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
}

pub struct App {
    session: ChatSession,
    dispatcher: Dispatcher,
    settled_tx: mpsc::UnboundedSender<Settled>,
    settled_rx: mpsc::UnboundedReceiver<Settled>,
    pub input: InputBuffer,
    pub scroll: TranscriptScroll,
    pub hitboxes: Hitboxes,
    notice: Option<Notice>,
    share_url: String,
    clipboard: Box<dyn ClipboardSink>,
    frame: usize,
    last_step: Instant,
    should_quit: bool,
}

impl App {
    pub fn new(dispatcher: Dispatcher, share_url: String, clipboard: Box<dyn ClipboardSink>) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        Self {
            session: ChatSession::new(),
            dispatcher,
            settled_tx,
            settled_rx,
            input: InputBuffer::default(),
            scroll: TranscriptScroll::default(),
            hitboxes: Hitboxes::default(),
            notice: None,
            share_url,
            clipboard,
            frame: 0,
            last_step: Instant::now(),
            should_quit: false,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Animation frame for the typing indicator.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Sends the current input. Must be called inside a tokio runtime.
    pub fn submit(&mut self) {
        let Some(pending) = self.session.compose(self.input.text()) else {
            return;
        };
        self.input.take();
        self.scroll.follow_latest();
        tracing::info!(
            query_id = %pending.id,
            source = self.dispatcher.source_name(),
            in_flight = self.session.in_flight(),
            "query dispatched"
        );
        self.dispatcher.spawn(pending, self.settled_tx.clone());
    }

    /// Appends replies for every query that has settled since the last call.
    pub fn drain_settled(&mut self) -> usize {
        let mut n = 0;
        while let Ok(settled) = self.settled_rx.try_recv() {
            self.apply_settled(settled);
            n += 1;
        }
        n
    }

    fn apply_settled(&mut self, settled: Settled) {
        if let Err(err) = &settled.outcome {
            sentry_anyhow::capture_anyhow(err);
        }
        self.session.settle(settled);
        self.scroll.follow_latest();
    }

    pub fn share(&mut self, now: Instant) {
        let payload = SharePayload::for_url(self.share_url.clone());
        // Terminals have no share sheet.
        let outcome = share::share_link(None, self.clipboard.as_mut(), &payload);
        if let Some((title, body)) = outcome.notice() {
            let kind = match outcome {
                share::ShareOutcome::Failed(_) => NoticeKind::Error,
                _ => NoticeKind::Info,
            };
            self.notice = Some(Notice {
                kind,
                title,
                body,
                expires_at: now + NOTICE_TTL,
            });
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
        if now.duration_since(self.last_step) >= ANIMATION_STEP {
            self.frame = self.frame.wrapping_add(1);
            self.last_step = now;
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Submit => self.submit(),
            Action::Newline => self.input.insert('\n'),
            Action::Insert(c) => self.input.insert(c),
            Action::Backspace => self.input.backspace(),
            Action::Delete => self.input.delete(),
            Action::Left => self.input.left(),
            Action::Right => self.input.right(),
            Action::Home => self.input.home(),
            Action::End => self.input.end(),
            Action::ScrollUp => self.scroll.up(PAGE),
            Action::ScrollDown => self.scroll.down(PAGE),
            Action::ScrollToLatest => self.scroll.follow_latest(),
            Action::Share => self.share(Instant::now()),
            Action::Quit => self.should_quit = true,
            Action::Ignore => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll.up(WHEEL),
            MouseEventKind::ScrollDown => self.scroll.down(WHEEL),
            MouseEventKind::Down(MouseButton::Left) => {
                if hit(self.hitboxes.send, mouse.column, mouse.row) {
                    self.submit();
                } else if hit(self.hitboxes.share, mouse.column, mouse.row) {
                    self.share(Instant::now());
                }
            }
            _ => {}
        }
    }

    #[cfg(test)]
    async fn settle_next(&mut self) {
        if let Some(settled) = self.settled_rx.recv().await {
            self.apply_settled(settled);
        }
    }
}

pub fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    loop {
        app.drain_settled();
        app.on_tick(Instant::now());
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(action) = input::key_action(key) {
                        app.handle_action(action);
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Paste(text) => app.input.insert_str(&text),
                _ => {}
            }
        }

        if app.should_quit() {
            tracing::info!(
                messages = app.session().transcript().len(),
                "session closed"
            );
            return Ok(());
        }
    }
}
