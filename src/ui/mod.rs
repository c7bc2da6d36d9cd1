// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for xylo.
//!
//! Provides a ratatui-based screen with a row of note buttons, the live
//! transcript of the take in progress, and the list of saved records.
//! The UI loop runs as a task on the same `LocalSet` as playback, and
//! yields to it between frames.

mod buttons;
mod records;

pub use buttons::{bar_color, tint_color, ButtonsWidget, FLASH_DURATION, TINT_DURATION};
pub use records::{format_record_row, RecordsWidget};

use std::cell::RefCell;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::music::{transcript, Note};
use crate::session::{Presenter, Session, SessionState};
use crate::store::SavedRecord;

/// UI state shared between the presenter and the app
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Button labels
    pub notes: Vec<Note>,
    /// Live transcript (hidden until the first recording starts)
    pub transcript: Option<String>,
    /// Saved record rows, newest first
    pub records: Vec<String>,
    /// Highlighted row
    pub cursor: usize,
    /// Selected row
    pub selected: Option<usize>,
    /// Whether recording
    pub recording: bool,
    /// Name being typed (Some while the prompt is open)
    pub prompt: Option<String>,
    /// Most recently pressed button
    pub flash: Option<(usize, Instant)>,
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
}

impl UiState {
    /// Create state for a row of buttons
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes,
            ..Default::default()
        }
    }

    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Move the cursor, staying inside the list
    pub fn move_cursor(&mut self, delta: isize) {
        if self.records.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = self.records.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// Map a key press to an action
    pub fn key_action(&self, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        // The name prompt captures everything else
        if self.prompt.is_some() {
            return match code {
                KeyCode::Enter => KeyAction::PromptSubmit,
                KeyCode::Esc => KeyAction::PromptCancel,
                KeyCode::Backspace => KeyAction::PromptBackspace,
                KeyCode::Char(c) => KeyAction::PromptInput(c),
                _ => KeyAction::None,
            };
        }

        match code {
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                if index < self.notes.len() {
                    KeyAction::PressButton(index)
                } else {
                    KeyAction::None
                }
            }
            KeyCode::Char('r') => KeyAction::ToggleRecord,
            KeyCode::Up | KeyCode::Char('k') => KeyAction::CursorUp,
            KeyCode::Down | KeyCode::Char('j') => KeyAction::CursorDown,
            KeyCode::Enter => KeyAction::Select,
            KeyCode::Char('p') | KeyCode::Char(' ') => KeyAction::PlaySelected,
            KeyCode::Char('s') => KeyAction::StopPlayback,
            KeyCode::Char('d') | KeyCode::Delete => KeyAction::DeleteRow,
            KeyCode::Char('?') | KeyCode::Char('h') => KeyAction::ToggleHelp,
            _ => KeyAction::None,
        }
    }
}

/// Key event result
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Quit the application
    Quit,
    /// Press the note button at index
    PressButton(usize),
    /// Start or stop recording
    ToggleRecord,
    /// Move the list cursor up
    CursorUp,
    /// Move the list cursor down
    CursorDown,
    /// Select the row under the cursor
    Select,
    /// Play the selected record
    PlaySelected,
    /// Drop pending playback
    StopPlayback,
    /// Delete the row under the cursor
    DeleteRow,
    /// Type into the name prompt
    PromptInput(char),
    /// Erase in the name prompt
    PromptBackspace,
    /// Save under the typed name
    PromptSubmit,
    /// Close the prompt without saving
    PromptCancel,
    /// Toggle help
    ToggleHelp,
}

/// Presenter writing render requests into shared UI state
#[derive(Debug, Clone)]
pub struct UiPresenter {
    state: Rc<RefCell<UiState>>,
}

impl UiPresenter {
    /// Create a presenter over shared state
    pub fn new(state: Rc<RefCell<UiState>>) -> Self {
        Self { state }
    }

    /// Get shared state handle
    pub fn state(&self) -> Rc<RefCell<UiState>> {
        Rc::clone(&self.state)
    }
}

impl Presenter for UiPresenter {
    fn show_live_transcript(&mut self, sequence: &[Note]) {
        self.state.borrow_mut().transcript = Some(transcript(sequence));
    }

    fn reload_list(&mut self, records: &[SavedRecord]) {
        let mut state = self.state.borrow_mut();
        state.records = records.iter().map(format_record_row).collect();
        state.move_cursor(0);
    }

    fn prompt_for_name(&mut self) {
        self.state.borrow_mut().prompt = Some(String::new());
    }
}

/// Apply an action to the session. Returns false when the app should quit.
pub fn dispatch(session: &mut Session<UiPresenter>, action: KeyAction) -> bool {
    let state = session.presenter().state();

    match action {
        KeyAction::None => {}
        KeyAction::Quit => return false,
        KeyAction::PressButton(index) => {
            let note = {
                let mut ui = state.borrow_mut();
                ui.flash = Some((index, Instant::now()));
                ui.notes.get(index).cloned()
            };
            if let Some(note) = note {
                session.button_pressed(&note);
            }
        }
        KeyAction::ToggleRecord => session.toggle_recording(),
        KeyAction::CursorUp => state.borrow_mut().move_cursor(-1),
        KeyAction::CursorDown => state.borrow_mut().move_cursor(1),
        KeyAction::Select => {
            let cursor = state.borrow().cursor;
            session.row_selected(cursor);
        }
        KeyAction::PlaySelected => {
            if session.selected().is_none() {
                state.borrow_mut().set_status("No record selected");
            }
            session.play_selected();
        }
        KeyAction::StopPlayback => session.stop_playback(),
        KeyAction::DeleteRow => {
            let (cursor, empty) = {
                let ui = state.borrow();
                (ui.cursor, ui.records.is_empty())
            };
            if !empty {
                if let Err(e) = session.row_deleted(cursor) {
                    state.borrow_mut().set_status(format!("Delete failed: {}", e));
                }
            }
        }
        KeyAction::PromptInput(c) => {
            if let Some(ref mut name) = state.borrow_mut().prompt {
                name.push(c);
            }
        }
        KeyAction::PromptBackspace => {
            if let Some(ref mut name) = state.borrow_mut().prompt {
                name.pop();
            }
        }
        KeyAction::PromptSubmit => {
            let name = state.borrow_mut().prompt.take();
            session.name_entered(name);
        }
        KeyAction::PromptCancel => {
            state.borrow_mut().prompt = None;
            session.name_entered(None);
        }
        KeyAction::ToggleHelp => {
            let mut ui = state.borrow_mut();
            ui.show_help = !ui.show_help;
        }
    }

    let mut ui = state.borrow_mut();
    ui.selected = session.selected();
    ui.recording = session.state() == SessionState::Recording;
    true
}

/// Terminal UI application
pub struct App {
    /// Shared UI state
    state: Rc<RefCell<UiState>>,
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
}

impl App {
    /// Create a new app with shared state
    pub fn new(state: Rc<RefCell<UiState>>) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            state,
            terminal,
            frame_rate: 30,
            running: true,
        })
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Run until the user quits, yielding to playback between frames
    pub async fn run(&mut self, session: &mut Session<UiPresenter>) -> io::Result<()> {
        let frame_interval = Duration::from_millis(1000 / self.frame_rate as u64);

        while self.running {
            self.state.borrow_mut().clear_expired_status();
            self.draw()?;

            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let action = self.state.borrow().key_action(key.code, key.modifiers);
                    if !dispatch(session, action) {
                        self.quit();
                        break;
                    }
                }
            }

            tokio::time::sleep(frame_interval).await;
        }

        Ok(())
    }

    /// Draw the UI
    pub fn draw(&mut self) -> io::Result<()> {
        let state = self.state.borrow().clone();

        self.terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: buttons, transcript, records, status
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5), // Buttons
                    Constraint::Length(3), // Transcript
                    Constraint::Min(5),    // Records
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            frame.render_widget(
                ButtonsWidget::new(&state.notes).flash(state.flash),
                chunks[0],
            );

            render_transcript(frame, chunks[1], &state);

            let records = RecordsWidget::new(&state.records)
                .cursor(state.cursor)
                .selected(state.selected)
                .block(Block::default().borders(Borders::ALL).title(" Records "));
            frame.render_widget(records, chunks[2]);

            render_status_bar(frame, chunks[3], &state);

            if let Some(ref name) = state.prompt {
                render_name_prompt(frame, area, name);
            }

            if state.show_help {
                render_help_overlay(frame, area);
            }
        })?;

        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render live transcript
fn render_transcript(frame: &mut Frame, area: Rect, state: &UiState) {
    let title = if state.recording {
        Span::styled(
            " ● REC ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw(" Take ")
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let text = state.transcript.clone().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(text)
            .style(transcript_style(state))
            .block(block),
        area,
    );
}

/// Take panel tinted with the color of the button just pressed
fn transcript_style(state: &UiState) -> Style {
    match tint_color(state.flash) {
        Some(color) => Style::default().fg(Color::Black).bg(color),
        None => Style::default(),
    }
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg, Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " 1-9: Notes | r: Record | Enter: Select | p: Play | d: Delete | h: Help | q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Centered rectangle of at most `width` x `height`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

/// Render the save prompt
fn render_name_prompt(frame: &mut Frame, area: Rect, name: &str) {
    let prompt_area = centered(area, 48, 6);
    frame.render_widget(Clear, prompt_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Save ")
        .style(Style::default().bg(Color::Black));

    let input = if name.is_empty() {
        Span::styled("Enter name here", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(name, Style::default().fg(Color::White))
    };

    let lines = vec![
        Line::from("Please enter a name for this record."),
        Line::from(""),
        Line::from(vec![Span::raw("> "), input]),
        Line::from(Span::styled(
            "Enter: Save  Esc: Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), prompt_area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 44, 14);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_text = vec![
        Line::from(Span::styled("Playing", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  1-9         Press note button"),
        Line::from("  r           Start/stop recording"),
        Line::from(""),
        Line::from(Span::styled("Records", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Up/Down     Move cursor"),
        Line::from("  Enter       Select record"),
        Line::from("  p/Space     Play selected"),
        Line::from("  s           Stop playback"),
        Line::from("  d/Del       Delete record"),
        Line::from(""),
        Line::from("  h/?         Toggle help"),
        Line::from("  q/Ctrl+c    Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
