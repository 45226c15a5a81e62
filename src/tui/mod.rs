//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the chat screen,
//! and translates keyboard events into core `Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Awaiting a reply**: draws every ~80ms so the "Thinking" indicator moves.
//! - **Idle**: sleeps up to 500ms and only redraws on input or when a
//!   background exchange reports back.

pub mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::layout::Position;
use tui_scrollview::ScrollViewState;

use crate::core::action::{Action, Effect, update};
use crate::core::exchange::Exchange;
use crate::core::state::{SUGGESTED_PROMPTS, Session, Status};
use crate::transport::ChatTransport;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// How the chat screen was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// The user wants to upload a different document.
    NewDocument,
}

/// TUI-specific presentation state (not part of the session)
pub struct TuiState {
    pub scroll_state: ScrollViewState,
    /// Follow new messages; cleared when the user scrolls up.
    pub stick_to_bottom: bool,
    pub viewport_height: u16,
    pub content_height: u16,
    pub show_pdf: bool,
    /// Size of the decoded PDF, if the payload decoded.
    pub pdf_bytes: Option<usize>,
    /// Highlighted suggested prompt.
    pub suggestion: Option<usize>,
    /// Why the last submission was refused, until the draft changes.
    pub notice: Option<String>,
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new(pdf_bytes: Option<usize>) -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            viewport_height: 0,
            content_height: 0,
            show_pdf: true,
            pdf_bytes,
            suggestion: None,
            notice: None,
            spinner_frame: 0,
        }
    }

    fn scroll(&mut self, event: &TuiEvent) {
        match event {
            TuiEvent::ScrollUp => self.scroll_state.scroll_up(),
            TuiEvent::ScrollDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
                return;
            }
            _ => return,
        }
        let max_offset = self.content_height.saturating_sub(self.viewport_height);
        let offset = self.scroll_state.offset();
        if offset.y >= max_offset {
            self.scroll_state.set_offset(Position {
                x: offset.x,
                y: max_offset,
            });
            self.stick_to_bottom = true;
        } else {
            self.stick_to_bottom = false;
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        info!("Terminal modes enabled (mouse, bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

/// Runs the chat screen for `session` until the user quits or goes back to
/// upload. The session is dropped on return; a reply still in flight is
/// discarded when it arrives.
pub fn run(
    mut session: Session,
    transport: Arc<dyn ChatTransport>,
    pdf_bytes: Option<usize>,
) -> std::io::Result<Exit> {
    let mut tui = TuiState::new(pdf_bytes);
    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => guard,
        Err(e) => {
            ratatui::restore();
            return Err(e);
        }
    };

    // Background exchanges report back through this channel.
    let (tx, rx) = mpsc::channel();
    let start_time = std::time::Instant::now();
    let mut needs_redraw = true;

    let exit = 'outer: loop {
        let awaiting = session.status() == Status::AwaitingResponse;
        if awaiting {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.spinner_frame = (start_time.elapsed().as_millis() / 300) as usize;
            if let Err(e) = terminal.draw(|f| ui::draw_ui(f, &session, &mut tui)) {
                ratatui::restore();
                return Err(e);
            }
            needs_redraw = false;
        }

        let timeout = if awaiting {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let action = match event {
                TuiEvent::Resize => continue,
                TuiEvent::TogglePdf => {
                    tui.show_pdf = !tui.show_pdf;
                    continue;
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown
                | TuiEvent::ScrollToBottom => {
                    tui.scroll(&event);
                    continue;
                }
                TuiEvent::Quit => Action::Quit,
                TuiEvent::Back => Action::Back,
                TuiEvent::Submit => Action::Submit,
                TuiEvent::NextSuggestion => {
                    if !session.show_suggested_prompts() {
                        continue;
                    }
                    let next = tui
                        .suggestion
                        .map_or(0, |i| (i + 1) % SUGGESTED_PROMPTS.len());
                    tui.suggestion = Some(next);
                    Action::PickSuggestion(next)
                }
                TuiEvent::InputChar(c) => {
                    let mut draft = session.draft().to_string();
                    draft.push(c);
                    Action::EditDraft(draft)
                }
                TuiEvent::Paste(text) => {
                    let mut draft = session.draft().to_string();
                    draft.push_str(&text.replace("\r\n", "\n"));
                    Action::EditDraft(draft)
                }
                TuiEvent::Backspace => {
                    let mut draft = session.draft().to_string();
                    draft.pop();
                    Action::EditDraft(draft)
                }
            };

            if matches!(action, Action::EditDraft(_)) {
                tui.notice = None;
            }

            match update(&mut session, action) {
                Effect::None => {}
                Effect::SpawnRequest(exchange) => {
                    tui.stick_to_bottom = true;
                    tui.suggestion = None;
                    tui.notice = None;
                    spawn_exchange(exchange, transport.clone(), tx.clone());
                }
                Effect::Rejected(reason) => {
                    tui.notice = Some(reason.to_string());
                }
                Effect::Back => break 'outer Exit::NewDocument,
                Effect::Quit => break 'outer Exit::Quit,
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if let Effect::SpawnRequest(exchange) = update(&mut session, action) {
                warn!("Unexpected follow-up exchange {}", exchange.id.0);
            }
        }
    };

    ratatui::restore();
    info!("Leaving chat for {} ({:?})", session.document().file_name, exit);
    Ok(exit)
}

/// Runs `exchange` in the background and reports its terminal action on `tx`.
/// A closed receiver means the session is gone; the result is dropped.
pub(crate) fn spawn_exchange(
    exchange: Exchange,
    transport: Arc<dyn ChatTransport>,
    tx: mpsc::Sender<Action>,
) -> tokio::task::JoinHandle<()> {
    let id = exchange.id;
    info!("Spawning exchange {}", id.0);
    tokio::spawn(async move {
        let action = exchange.run(transport.as_ref()).await;
        if tx.send(action).is_err() {
            debug!("Exchange {} finished after its session was closed", id.0);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedTransport, test_session};

    fn submitted(session: &mut Session) -> Exchange {
        update(session, Action::EditDraft("hello".into()));
        match update(session, Action::Submit) {
            Effect::SpawnRequest(exchange) => exchange,
            other => panic!("expected SpawnRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_spawned_exchange_reports_once() {
        let mut session = test_session();
        let exchange = submitted(&mut session);
        let (tx, rx) = mpsc::channel();

        spawn_exchange(exchange, Arc::new(ScriptedTransport::replying("hi")), tx)
            .await
            .unwrap();

        let actions: Vec<Action> = rx.try_iter().collect();
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::ResponseReceived { reply, .. } if reply.text == "hi"));
    }

    #[tokio::test]
    async fn test_late_result_for_closed_session_is_dropped() {
        let mut session = test_session();
        let exchange = submitted(&mut session);
        let (tx, rx) = mpsc::channel();
        assert_eq!(update(&mut session, Action::Back), Effect::Back);
        drop(session);
        drop(rx);

        let outcome = spawn_exchange(exchange, Arc::new(ScriptedTransport::default()), tx).await;
        assert!(outcome.is_ok(), "task should finish without panicking");
    }

    #[test]
    fn test_scrolling_up_unsticks_and_end_restores() {
        let mut tui = TuiState::new(None);
        tui.viewport_height = 10;
        tui.content_height = 40;
        tui.scroll_state.set_offset(Position { x: 0, y: 30 });

        tui.scroll(&TuiEvent::ScrollUp);
        assert!(!tui.stick_to_bottom);

        tui.scroll(&TuiEvent::ScrollToBottom);
        assert!(tui.stick_to_bottom);
    }

    #[test]
    fn test_scrolling_down_to_end_sticks_again() {
        let mut tui = TuiState::new(None);
        tui.viewport_height = 10;
        tui.content_height = 40;
        tui.stick_to_bottom = false;
        tui.scroll_state.set_offset(Position { x: 0, y: 29 });

        tui.scroll(&TuiEvent::ScrollDown);
        assert!(tui.stick_to_bottom);
        assert_eq!(tui.scroll_state.offset().y, 30);
    }
}
