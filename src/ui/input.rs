use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use crate::api::Approach;
use crate::controller::UiState;

/// What the user asked the input row to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputIntent {
    QueryChanged(String),
    ApproachChanged(Approach),
    Submit,
}

/// Query box, approach selector and submit control. Holds nothing but borrowed
/// state; edits come back out as [`InputIntent`]s.
#[derive(Debug, Clone, Copy)]
pub struct InputSurface<'a> {
    pub query: &'a str,
    pub approach: Approach,
    pub locked: bool,
}

impl<'a> InputSurface<'a> {
    pub fn from_state(state: &'a UiState) -> InputSurface<'a> {
        InputSurface {
            query: &state.query,
            approach: state.approach,
            locked: state.inputs_locked(),
        }
    }

    pub fn text_enabled(&self) -> bool {
        !self.locked
    }

    pub fn submit_enabled(&self) -> bool {
        !self.locked && !self.query.trim().is_empty()
    }

    /// Up/Down cycle the selector, Enter submits, Ctrl+U clears the query.
    pub fn handle_key(&self, key: KeyEvent) -> Option<InputIntent> {
        if key.code == KeyCode::Enter {
            return self.submit_enabled().then_some(InputIntent::Submit);
        }
        if self.locked {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => Some(InputIntent::QueryChanged(String::new())),
            KeyCode::Char(_) if ctrl => None,
            KeyCode::Char(c) => {
                let mut query = self.query.to_string();
                query.push(c);
                Some(InputIntent::QueryChanged(query))
            }
            KeyCode::Backspace => {
                let mut query = self.query.to_string();
                query.pop()?;
                Some(InputIntent::QueryChanged(query))
            }
            KeyCode::Up | KeyCode::Down => {
                Some(InputIntent::ApproachChanged(self.approach.next()))
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, throbber: &ThrobberState) {
        let border_style = if focused && !self.locked {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Search Messages ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(22),
                Constraint::Length(16),
            ])
            .split(inner);

        let query_line = if self.query.is_empty() {
            Line::from(Span::styled(
                "Search messages...",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let style = if self.text_enabled() {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(self.query, style))
        };
        frame.render_widget(Paragraph::new(query_line), chunks[0]);
        if focused && self.text_enabled() {
            let width = self.query.chars().count() as u16;
            let x = chunks[0].x + width.min(chunks[0].width.saturating_sub(1));
            frame.set_cursor_position((x, chunks[0].y));
        }

        let selector_style = if self.locked {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        };
        let selector = Line::from(vec![
            Span::styled("▾ ", selector_style),
            Span::styled(self.approach.label(), selector_style),
        ]);
        frame.render_widget(Paragraph::new(selector), chunks[1]);

        let submit = if self.locked {
            let muted = Style::default().fg(Color::DarkGray);
            let mut line = Line::default();
            line.spans.push(
                Throbber::default()
                    .style(muted)
                    .throbber_style(muted)
                    .to_symbol_span(throbber),
            );
            line.spans.push(Span::styled("Searching...", muted));
            line
        } else if self.submit_enabled() {
            Line::from(Span::styled(
                "[ Search ]",
                Style::default().fg(Color::White).bg(Color::Magenta),
            ))
        } else {
            Line::from(Span::styled(
                "[ Search ]",
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(Paragraph::new(submit), chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn surface(query: &str, locked: bool) -> InputSurface<'_> {
        InputSurface {
            query,
            approach: Approach::TermFrequencyToken,
            locked,
        }
    }

    #[test]
    fn test_typing_forwards_full_text() {
        let input = surface("caf", false);
        assert_eq!(
            input.handle_key(press(KeyCode::Char('e'))),
            Some(InputIntent::QueryChanged("cafe".into()))
        );
        assert_eq!(
            input.handle_key(press(KeyCode::Backspace)),
            Some(InputIntent::QueryChanged("ca".into()))
        );
        assert_eq!(surface("", false).handle_key(press(KeyCode::Backspace)), None);
    }

    #[test]
    fn test_ctrl_u_clears() {
        let input = surface("coffee", false);
        let key = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_key(key), Some(InputIntent::QueryChanged(String::new())));
    }

    #[test]
    fn test_submit_disabled_for_blank_query() {
        let input = surface("   ", false);
        assert!(!input.submit_enabled());
        assert_eq!(input.handle_key(press(KeyCode::Enter)), None);

        let input = surface("coffee", false);
        assert!(input.submit_enabled());
        assert_eq!(input.handle_key(press(KeyCode::Enter)), Some(InputIntent::Submit));
    }

    #[test]
    fn test_locked_surface_emits_nothing() {
        let input = surface("coffee", true);
        assert!(!input.text_enabled());
        assert!(!input.submit_enabled());
        assert_eq!(input.handle_key(press(KeyCode::Enter)), None);
        assert_eq!(input.handle_key(press(KeyCode::Char('x'))), None);
        assert_eq!(input.handle_key(press(KeyCode::Down)), None);
    }

    #[test]
    fn test_selector_cycles() {
        let input = surface("", false);
        assert_eq!(
            input.handle_key(press(KeyCode::Down)),
            Some(InputIntent::ApproachChanged(Approach::SentenceEmbedding))
        );
    }

    #[test]
    fn test_lock_follows_state() {
        let mut state = UiState::default();
        assert!(InputSurface::from_state(&state).locked);
        state.data_ready = true;
        assert!(!InputSurface::from_state(&state).locked);
        state.loading = true;
        assert!(InputSurface::from_state(&state).locked);
    }
}
