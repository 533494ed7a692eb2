use crate::app::{App, NoticeKind};
use crate::input::PLACEHOLDER;
use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use stocksense_core::domain::message::{Author, Message};
use stocksense_core::present::{CardView, Metric, Tone, RECOMMENDATIONS_HEADING};

const SEND_LABEL: &str = "[ Send ]";
const SHARE_LABEL: &str = "[ Share ]";
const MAX_INPUT_ROWS: usize = 5;
const ACCENT: Color = Color::Cyan;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let input_rows = app.input.lines().len().clamp(1, MAX_INPUT_ROWS) as u16;
    let [header, body, input, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, app, header);
    draw_transcript(frame, app, body);
    draw_input(frame, app, input);
    draw_footer(frame, footer);
    draw_notice(frame, app, body);
}

fn draw_header(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::BOTTOM);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let share_width = SHARE_LABEL.chars().count() as u16;
    let [title_area, share_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(share_width)]).areas(inner);

    let title = Line::from(vec![
        Span::styled(" ▣ ", Style::new().fg(Color::Black).bg(ACCENT)),
        Span::styled(" StockSense", Style::new().add_modifier(Modifier::BOLD)),
        Span::styled("  AI Stock Analysis Assistant", Style::new().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);
    frame.render_widget(Paragraph::new(SHARE_LABEL), share_area);
    app.hitboxes.share = Rect {
        height: 1,
        ..share_area
    };
}

fn draw_transcript(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::bordered().border_style(Style::new().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines = Vec::new();
    for message in app.session().transcript().list() {
        lines.extend(message_lines(message, width));
        lines.push(Line::default());
    }
    if app.session().is_awaiting() {
        lines.push(typing_line(app.frame()));
    }

    let top = app.scroll.top_line(lines.len(), inner.height as usize);
    let top = u16::try_from(top).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).scroll((top, 0)), inner);
}

fn draw_input(frame: &mut Frame, app: &mut App, area: Rect) {
    let send_width = SEND_LABEL.chars().count() as u16 + 1;
    let [text_area, send_area] =
        Layout::horizontal([Constraint::Min(1), Constraint::Length(send_width)]).areas(area);

    let block = Block::bordered().border_style(Style::new().fg(ACCENT));
    let inner = block.inner(text_area);
    frame.render_widget(block, text_area);

    let rows = (inner.height as usize).max(1);
    let (cursor_row, cursor_col) = app.input.cursor_position();
    let first_row = (cursor_row + 1).saturating_sub(rows);

    if app.input.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(PLACEHOLDER, Style::new().fg(Color::DarkGray))),
            inner,
        );
    } else {
        let lines: Vec<Line> = app
            .input
            .lines()
            .into_iter()
            .skip(first_row)
            .map(|l| Line::raw(l.to_string()))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    let x = inner.x + (cursor_col as u16).min(inner.width.saturating_sub(1));
    let y = inner.y + cursor_row.saturating_sub(first_row) as u16;
    frame.set_cursor_position((x, y));

    let send_style = if app.input.can_send() {
        Style::new()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(Color::DarkGray)
    };
    let button = Rect {
        x: send_area.x + 1,
        y: send_area.y + send_area.height.saturating_sub(1) / 2,
        width: send_area.width.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(Paragraph::new(Span::styled(SEND_LABEL, send_style)), button);
    app.hitboxes.send = button;
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let hints = "Enter send · Shift+Enter newline · PgUp/PgDn scroll · Ctrl+Y share · Esc quit";
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::new().fg(Color::DarkGray))),
        area,
    );
}

fn draw_notice(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = app.notice() else {
        return;
    };
    let width = area.width.min(50);
    let popup = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: area.height.min(4),
    };
    let color = match notice.kind {
        NoticeKind::Info => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    let body = Paragraph::new(vec![
        Line::styled(notice.title, Style::new().add_modifier(Modifier::BOLD)),
        Line::raw(notice.body.clone()),
    ])
    .block(Block::bordered().border_style(Style::new().fg(color)));
    frame.render_widget(Clear, popup);
    frame.render_widget(body, popup);
}

fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let bubble_width = (width * 7 / 10).max(10);
    let (alignment, style) = match message.author {
        Author::User => (Alignment::Right, Style::new().fg(Color::White).bg(Color::Blue)),
        Author::Assistant => (Alignment::Left, Style::new()),
    };

    let mut lines: Vec<Line<'static>> = wrap(&message.text, bubble_width)
        .into_iter()
        .map(|l| Line::styled(l, style).alignment(alignment))
        .collect();

    let stamp = message
        .created_at
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string();
    lines.push(Line::styled(stamp, Style::new().fg(Color::DarkGray)).alignment(alignment));

    if let Some(analysis) = &message.analysis {
        lines.push(Line::default());
        lines.extend(card_lines(&CardView::from_analysis(analysis), width));
    }
    lines
}

fn typing_line(frame: usize) -> Line<'static> {
    let lit = frame % 3;
    let mut spans: Vec<Span<'static>> = (0..3)
        .map(|i| {
            let (dot, style) = if i == lit {
                ("● ", Style::new().fg(ACCENT))
            } else {
                ("○ ", Style::new().fg(Color::DarkGray))
            };
            Span::styled(dot, style)
        })
        .collect();
    spans.push(Span::styled("Analyzing...", Style::new().fg(Color::DarkGray)));
    Line::from(spans)
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Favorable => Color::Green,
        Tone::Unfavorable => Color::Red,
        Tone::Neutral => Color::Yellow,
    }
}

fn card_lines(card: &CardView, width: usize) -> Vec<Line<'static>> {
    let card_width = width.max(12);
    let inner = card_width - 2;
    let border = Style::new().fg(ACCENT);
    let label = Style::new().fg(Color::DarkGray);
    let bar = || Span::styled("│ ", border);

    let mut out = vec![Line::styled(
        format!("╭{}", "─".repeat(card_width - 1)),
        border,
    )];

    let sentiment = format!("{} {}", card.sentiment_icon, card.sentiment_label);
    let symbol = format!("▣ {}", card.symbol);
    let gap = inner.saturating_sub(symbol.chars().count() + sentiment.chars().count()).max(1);
    out.push(Line::from(vec![
        bar(),
        Span::styled(symbol, Style::new().add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
        Span::styled(
            sentiment,
            Style::new()
                .fg(tone_color(card.sentiment_tone))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    out.push(Line::from(bar()));

    let column = inner / 2;
    let grid_rows: [[&Metric; 2]; 3] = [
        [&card.primary[0], &card.primary[1]],
        [&card.primary[2], &card.primary[3]],
        [&card.secondary[0], &card.secondary[1]],
    ];
    for row in grid_rows {
        let mut labels = vec![bar()];
        let mut values = vec![bar()];
        for metric in row {
            labels.push(Span::styled(pad(metric.label, column), label));
            let style = match metric.tone {
                Some(tone) => Style::new().fg(tone_color(tone)),
                None => Style::new(),
            };
            values.push(Span::styled(
                pad(&metric.value, column),
                style.add_modifier(Modifier::BOLD),
            ));
        }
        out.push(Line::from(labels));
        out.push(Line::from(values));
    }

    out.push(Line::from(bar()));
    out.push(Line::from(vec![
        bar(),
        Span::styled(RECOMMENDATIONS_HEADING, Style::new().add_modifier(Modifier::BOLD)),
    ]));
    for (i, rec) in card.recommendations.iter().enumerate() {
        let marker = format!("{:>2}. ", i + 1);
        let indent = marker.chars().count();
        for (j, chunk) in wrap(rec, inner.saturating_sub(indent).max(1))
            .into_iter()
            .enumerate()
        {
            let lead = if j == 0 {
                marker.clone()
            } else {
                " ".repeat(indent)
            };
            out.push(Line::from(vec![
                bar(),
                Span::styled(lead, Style::new().fg(ACCENT)),
                Span::raw(chunk),
            ]));
        }
    }

    out.push(Line::styled(
        format!("╰{}", "─".repeat(card_width - 1)),
        border,
    ));
    out
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push(' ');
        out
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

/// Greedy word wrap on char counts; words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if line_len > 0 {
                    out.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(width);
                out.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width {
                out.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::demo_app;
    use crate::input::Action;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn wraps_words_and_splits_long_ones() {
        assert_eq!(wrap("hello big world", 9), vec!["hello big", "world"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("a\n\nb", 5), vec!["a", "", "b"]);
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn pads_and_truncates_cells() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 4), "abc ");
    }

    #[test]
    fn renders_greeting_placeholder_and_disabled_send() {
        let mut app = demo_app();
        let text = screen(&mut app, 100, 30);
        assert!(text.contains("StockSense"));
        assert!(text.contains("What stock would you like me to analyze today?"));
        assert!(text.contains("Ask me to analyze a stock"));
        assert!(text.contains(SEND_LABEL));
        assert!(text.contains(SHARE_LABEL));
        assert!(app.hitboxes.send.width > 0);
    }

    #[tokio::test]
    async fn renders_typing_indicator_then_card() {
        let mut app = demo_app();
        for c in "Analyze NVDA".chars() {
            app.handle_action(Action::Insert(c));
        }
        app.handle_action(Action::Submit);

        let pending = screen(&mut app, 100, 40);
        assert!(pending.contains("Analyzing..."));
        assert!(pending.contains("Analyze NVDA"));

        while app.drain_settled() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let done = screen(&mut app, 100, 60);
        assert!(!done.contains("Analyzing..."));
        assert!(done.contains("▣ NVDA"));
        assert!(done.contains("Current Price"));
        assert!(done.contains("Market Cap"));
        assert!(done.contains("Risk Level"));
        assert!(done.contains(RECOMMENDATIONS_HEADING));
        assert!(done.contains(" 1. Strong fundamentals"));
    }
}
