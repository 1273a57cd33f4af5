use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use ratatui::{
    DefaultTerminal, Frame,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Alignment, Constraint, Direction, Layout, Margin},
    style::{Color, Style},
    text::Span,
    widgets::{Paragraph, Wrap},
};
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc;

use crate::api::{ApiError, SearchBackend};
use crate::controller::{QueryController, SearchCompletion, SearchTask};

pub mod input;
pub mod results;

use input::{InputIntent, InputSurface};
use results::{PageFocus, PageIntent, ResultRenderer};

/// Finished backend call, sent from a spawned task back to the event loop.
#[derive(Debug)]
pub enum Completion {
    Readiness(Result<String, ApiError>),
    Search(SearchCompletion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Results,
}

/// Terminal front end. The event loop is the only writer of the controller's
/// state; HTTP calls run on spawned tasks and report back through `done_tx`.
pub struct App<B: SearchBackend + ?Sized + 'static> {
    controller: QueryController<B>,
    done_tx: mpsc::UnboundedSender<Completion>,
    focus: Focus,
    page_focus: PageFocus,
    scroll: u16,
    throbber_state: ThrobberState,
}

impl<B: SearchBackend + ?Sized + 'static> App<B> {
    pub fn new(backend: Arc<B>, done_tx: mpsc::UnboundedSender<Completion>) -> App<B> {
        App {
            controller: QueryController::new(backend),
            done_tx,
            focus: Focus::Input,
            page_focus: PageFocus::default(),
            scroll: 0,
            throbber_state: ThrobberState::default(),
        }
    }

    pub fn controller(&self) -> &QueryController<B> {
        &self.controller
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Fires the readiness call. Inputs stay locked until it comes back.
    pub fn start(&mut self) {
        let task = self.controller.dispatch_readiness();
        let backend = self.controller.backend();
        let tx = self.done_tx.clone();
        tokio::spawn(async move {
            let outcome = task.run(&*backend).await;
            let _ = tx.send(Completion::Readiness(outcome));
        });
    }

    fn spawn_search(&self, task: SearchTask) {
        let backend = self.controller.backend();
        let tx = self.done_tx.clone();
        tokio::spawn(async move {
            let completion = task.run(&*backend).await;
            let _ = tx.send(Completion::Search(completion));
        });
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Readiness(outcome) => self.controller.apply_readiness(outcome),
            Completion::Search(completion) => {
                self.controller.apply_search(completion);
                self.page_focus.reset();
                self.scroll = 0;
                if self.controller.state().current_response.is_none() {
                    self.focus = Focus::Input;
                }
            }
        }
    }

    /// Returns true when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Tab => {
                self.toggle_focus();
                return false;
            }
            _ => {}
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Results => self.handle_results_key(key),
        }
        false
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.controller.state().current_response.is_some() => Focus::Results,
            _ => Focus::Input,
        };
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let intent = InputSurface::from_state(self.controller.state()).handle_key(key);
        match intent {
            Some(InputIntent::QueryChanged(query)) => self.controller.set_query(query),
            Some(InputIntent::ApproachChanged(approach)) => self.controller.set_approach(approach),
            Some(InputIntent::Submit) => {
                if let Some(task) = self.controller.dispatch_submit() {
                    self.spawn_search(task);
                }
            }
            None => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                return;
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                return;
            }
            KeyCode::Char(_) | KeyCode::Backspace => {
                self.focus = Focus::Input;
                self.handle_input_key(key);
                return;
            }
            _ => {}
        }

        let state = self.controller.state();
        if state.loading {
            return;
        }
        let Some(response) = state.current_response.as_ref() else {
            return;
        };
        let intent = ResultRenderer::new(response, state.query_time_ms)
            .handle_key(key, &mut self.page_focus);
        if let Some(PageIntent(page)) = intent
            && let Some(task) = self.controller.dispatch_page(page)
        {
            self.spawn_search(task);
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area().inner(Margin {
            vertical: 0,
            horizontal: 1,
        });
        let state = self.controller.state();
        let banner_height = if state.error.is_some() { 2 } else { 0 };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(banner_height),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        InputSurface::from_state(state).render(
            frame,
            layout[0],
            self.focus == Focus::Input,
            &self.throbber_state,
        );

        if let Some(error) = &state.error {
            let banner = Paragraph::new(Span::styled(
                results::escape_controls(error),
                Style::default().fg(Color::Red),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(banner, layout[1]);
        }

        if let Some(response) = &state.current_response {
            ResultRenderer::new(response, state.query_time_ms).render(
                frame,
                layout[2],
                self.focus == Focus::Results,
                &self.page_focus,
                self.scroll,
            );
        }

        let hint = match self.focus {
            Focus::Input => "enter search · ↑/↓ approach · tab results · esc quit",
            Focus::Results => "←/→ select page · enter open · pgup/pgdn prev/next · tab input · esc quit",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
            layout[3],
        );
    }

    async fn event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        events: &mut mpsc::UnboundedReceiver<Event>,
        done: &mut mpsc::UnboundedReceiver<Completion>,
    ) -> Result<()> {
        let mut tick = tokio::time::interval(Duration::from_millis(100));
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                event = events.recv() => match event {
                    Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Some(_) => {}
                    None => return Err(anyhow!("input event channel disconnected")),
                },
                Some(completion) = done.recv() => self.apply(completion),
                _ = tick.tick() => self.throbber_state.calc_next(),
            }
        }
    }
}

/// Runs the interactive search UI against `backend` until the user quits.
pub async fn run<B>(backend: Arc<B>) -> Result<()>
where
    B: SearchBackend + ?Sized + 'static,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut terminal = ratatui::init();

    let running = Arc::new(AtomicBool::new(true));
    let running_flag = Arc::clone(&running);
    let input_thread = thread::spawn(move || -> Result<()> {
        while running_flag.load(Ordering::Relaxed) {
            if event::poll(Duration::from_millis(50))? {
                let event = event::read()?;
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        }
        Ok(())
    });

    let mut app = App::new(backend, done_tx);
    app.start();
    let result = app
        .event_loop(&mut terminal, &mut event_rx, &mut done_rx)
        .await;

    ratatui::restore();

    running.store(false, Ordering::Relaxed);
    match input_thread.join() {
        Ok(join_result) => join_result?,
        Err(err) => std::panic::resume_unwind(err),
    }

    result
}
