use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::api::{Approach, SearchResponse, SearchResultItem};
use crate::pagination::{ControlKind, PageControl, page_controls};

const TIMESTAMP_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

/// Request to show another page of the current result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIntent(pub u32);

/// `Found 1 result`, `Found 12 results · 8 ms`.
pub fn count_line(total: u64, query_time_ms: Option<u64>) -> String {
    let plural = if total == 1 { "" } else { "s" };
    match query_time_ms {
        Some(ms) => format!("Found {total} result{plural} · {ms} ms"),
        None => format!("Found {total} result{plural}"),
    }
}

/// Formats an ISO-8601 timestamp in the local time zone. Falls back to the raw
/// string when it cannot be parsed.
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

pub fn format_timestamp_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let raw = raw.trim();
    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        Some(dt.with_timezone(tz))
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
    {
        // No offset means wall-clock time in the viewer's zone.
        tz.from_local_datetime(&naive).earliest()
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        // Date-only strings are UTC midnight.
        date.and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(tz))
    } else {
        None
    };

    match parsed {
        Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Escapes control characters so message text reaches the terminal as plain
/// text. Newlines and tabs are kept, `\r\n` becomes `\n`.
pub fn escape_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        if c.is_control() && c != '\n' && c != '\t' {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

/// Cursor over the enabled pagination controls. Lives with the caller so the
/// renderer itself stays stateless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageFocus {
    index: Option<usize>,
}

impl PageFocus {
    pub fn reset(&mut self) {
        self.index = None;
    }

    /// Focused control index, defaulting to the current page.
    pub fn resolve(&self, controls: &[PageControl]) -> Option<usize> {
        match self.index {
            Some(i) if i < controls.len() => Some(i),
            _ => controls.iter().position(|c| c.current),
        }
    }

    fn step(&mut self, controls: &[PageControl], forward: bool) {
        let Some(start) = self.resolve(controls) else {
            return;
        };
        let mut i = start;
        loop {
            i = if forward {
                i + 1
            } else {
                match i.checked_sub(1) {
                    Some(i) => i,
                    None => return,
                }
            };
            match controls.get(i) {
                Some(control) if control.is_enabled() => {
                    self.index = Some(i);
                    return;
                }
                Some(_) => continue,
                None => return,
            }
        }
    }
}

/// Draws one result page and its pagination bar.
#[derive(Debug, Clone, Copy)]
pub struct ResultRenderer<'a> {
    pub response: &'a SearchResponse,
    pub query_time_ms: Option<u64>,
}

impl<'a> ResultRenderer<'a> {
    pub fn new(response: &'a SearchResponse, query_time_ms: Option<u64>) -> ResultRenderer<'a> {
        ResultRenderer {
            response,
            query_time_ms,
        }
    }

    pub fn count_line(&self) -> String {
        count_line(self.response.total, self.query_time_ms)
    }

    /// Empty when there is nothing to page through. A zero total never pages.
    pub fn controls(&self) -> Vec<PageControl> {
        if self.response.total == 0 {
            return Vec::new();
        }
        page_controls(self.response.page, self.response.total_pages)
    }

    /// Left/Right move between enabled controls, Enter activates the focused
    /// one, PageUp/PageDown jump straight to Previous/Next.
    pub fn handle_key(&self, key: KeyEvent, focus: &mut PageFocus) -> Option<PageIntent> {
        let controls = self.controls();
        match key.code {
            KeyCode::Left => {
                focus.step(&controls, false);
                None
            }
            KeyCode::Right => {
                focus.step(&controls, true);
                None
            }
            KeyCode::Enter => {
                let i = focus.resolve(&controls)?;
                controls[i].target.map(PageIntent)
            }
            KeyCode::PageUp => self.activate(&controls, ControlKind::Previous),
            KeyCode::PageDown => self.activate(&controls, ControlKind::Next),
            _ => None,
        }
    }

    fn activate(&self, controls: &[PageControl], kind: ControlKind) -> Option<PageIntent> {
        controls
            .iter()
            .find(|c| c.kind == kind)
            .and_then(|c| c.target)
            .map(PageIntent)
    }

    /// The pagination bar as one line of text, `« Previous 1 ... 3 [4] 5 ... 7 Next »`
    /// with disabled Previous/Next dropped.
    pub fn pagination_text(&self) -> Option<String> {
        let controls = self.controls();
        if controls.is_empty() {
            return None;
        }
        let parts: Vec<String> = controls
            .iter()
            .filter_map(|c| match c.kind {
                ControlKind::Previous => c.is_enabled().then(|| "« Previous".to_string()),
                ControlKind::Next => c.is_enabled().then(|| "Next »".to_string()),
                ControlKind::Page(_) if c.current => Some(format!("[{}]", c.label())),
                _ => Some(c.label()),
            })
            .collect();
        Some(parts.join(" "))
    }

    /// Plain-text rendering for non-interactive output.
    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.count_line());
        out.push('\n');
        for item in &self.response.items {
            out.push('\n');
            out.push_str(&format!(
                "{}  {}\n",
                escape_controls(&item.user_name),
                format_timestamp(&item.timestamp)
            ));
            for line in escape_controls(&item.message).lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        if let Some(bar) = self.pagination_text() {
            out.push('\n');
            out.push_str(&bar);
            out.push('\n');
        }
        out
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        focused: bool,
        focus: &PageFocus,
        scroll: u16,
    ) {
        let controls = self.controls();
        let bar_height = if controls.is_empty() { 0 } else { 1 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(bar_height),
            ])
            .split(area);

        let muted = Style::default().fg(Color::Gray);
        frame.render_widget(
            Paragraph::new(Span::styled(self.count_line(), muted)),
            chunks[0],
        );

        let approach_label = self
            .response
            .approach
            .parse::<Approach>()
            .map(|a| a.label().to_string())
            .unwrap_or_else(|_| self.response.approach.clone());
        let border_style = if focused {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let items = Paragraph::new(item_text(&self.response.items))
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(border_style)
                    .title(format!(" {approach_label} ")),
            )
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(items, chunks[1]);

        if !controls.is_empty() {
            let focused_index = focused.then(|| focus.resolve(&controls)).flatten();
            let bar = pagination_line(&controls, focused_index);
            frame.render_widget(Paragraph::new(bar).alignment(Alignment::Center), chunks[2]);
        }
    }
}

fn item_text(items: &[SearchResultItem]) -> Text<'static> {
    let mut lines = Vec::new();
    for item in items {
        lines.push(Line::from(vec![
            Span::styled(
                escape_controls(&item.user_name),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format_timestamp(&item.timestamp),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for line in escape_controls(&item.message).lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }
    Text::from(lines)
}

fn pagination_line(controls: &[PageControl], focused: Option<usize>) -> Line<'static> {
    let mut spans = Vec::with_capacity(controls.len() * 2);
    for (i, control) in controls.iter().enumerate() {
        let mut style = if !control.is_enabled() {
            Style::default().fg(Color::DarkGray)
        } else if control.current {
            Style::default()
                .fg(Color::White)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Magenta)
        };
        if focused == Some(i) {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!(" {} ", control.label()), style));
    }
    Line::from(spans)
}
