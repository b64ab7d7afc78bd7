//! Terminal UI for the text enhancer.
//!
//! Renders an input line, the three action controls and the result box. The
//! UI only reads controller snapshots and emits two events back: draft edits
//! and action invocations.

use crate::action::Action;
use crate::config::UiConfig;
use crate::controller::{Controller, Outcome, RequestState, Snapshot};
use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use tui_input::backend::crossterm::EventHandler;
use tui_input::{Input, InputRequest};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const RESULT_SCROLL_STEP: u16 = 5;
const EMPTY_RESULT_HINT: &str =
    "Enhanced text will appear here after you run one of the actions above";

/// Presentation-only state that is not part of the controller session.
#[derive(Debug, Clone)]
struct ViewState {
    /// Control highlighted for Enter.
    selected: Action,
    spinner_frame: usize,
    show_prompt: bool,
    /// First visible line of the result box.
    result_scroll: u16,
}

impl ViewState {
    fn new(show_prompt: bool) -> Self {
        Self {
            selected: Action::FixGrammar,
            spinner_frame: 0,
            show_prompt,
            result_scroll: 0,
        }
    }

    fn scroll_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(RESULT_SCROLL_STEP);
    }

    fn scroll_down(&mut self) {
        // Clamped against the rendered height in draw_result.
        self.result_scroll = self.result_scroll.saturating_add(RESULT_SCROLL_STEP);
    }

    fn select_next(&mut self) {
        let idx = Action::ALL.iter().position(|a| *a == self.selected).unwrap_or(0);
        self.selected = Action::ALL[(idx + 1) % Action::ALL.len()];
    }

    fn select_prev(&mut self) {
        let idx = Action::ALL.iter().position(|a| *a == self.selected).unwrap_or(0);
        self.selected = Action::ALL[(idx + Action::ALL.len() - 1) % Action::ALL.len()];
    }
}

/// What the event loop should do after an event.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the TUI until the user quits.
pub async fn run_tui(controller: Controller, initial_text: Option<String>, ui: &UiConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(&mut terminal, controller, initial_text, ui).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// The main event loop.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: Controller,
    initial_text: Option<String>,
    ui: &UiConfig,
) -> Result<()> {
    let mut input = Input::default();
    if let Some(text) = initial_text {
        input = input.with_value(text);
    }
    controller.set_draft(input.value());

    let mut view = ViewState::new(ui.show_prompt);
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(ui.tick_rate_ms.max(10)));

    loop {
        let snapshot = controller.snapshot();
        terminal.draw(|frame| draw_ui(frame, &input, &snapshot, &mut view))?;

        tokio::select! {
            _ = ticker.tick() => {
                // Only animate while something is in flight.
                if !snapshot.state.is_idle() {
                    view.spinner_frame = view.spinner_frame.wrapping_add(1);
                }
            }
            event = events.next() => {
                let Some(event) = event else {
                    return Ok(());
                };
                if handle_event(event?, &mut input, &controller, &mut view) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}

/// Route a terminal event; pastes go straight into the draft.
fn handle_event(event: Event, input: &mut Input, controller: &Controller, view: &mut ViewState) -> Flow {
    match event {
        Event::Key(key) => handle_key(key, input, controller, view),
        Event::Paste(text) => {
            paste(input, &text);
            controller.set_draft(input.value());
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

/// Insert pasted text at the cursor, normalising line endings.
fn paste(input: &mut Input, text: &str) {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    for c in text.chars() {
        input.handle(InputRequest::InsertChar(c));
    }
}

/// Apply one key press to the input, the view and the controller.
fn handle_key(key: KeyEvent, input: &mut Input, controller: &Controller, view: &mut ViewState) -> Flow {
    // Only handle key press events (not release)
    if key.kind != KeyEventKind::Press {
        return Flow::Continue;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let hotkey = match key.code {
        KeyCode::Char(c) if ctrl => Action::from_hotkey(c),
        _ => None,
    };
    if let Some(action) = hotkey {
        view.selected = action;
        if dispatch(controller, action).is_some() {
            view.result_scroll = 0;
        }
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('c') if ctrl => return Flow::Quit,
        KeyCode::Tab => view.select_next(),
        KeyCode::BackTab => view.select_prev(),
        KeyCode::PageUp => view.scroll_up(),
        KeyCode::PageDown => view.scroll_down(),
        KeyCode::Enter if alt => {
            input.handle(InputRequest::InsertChar('\n'));
            controller.set_draft(input.value());
        }
        KeyCode::Enter => {
            if dispatch(controller, view.selected).is_some() {
                view.result_scroll = 0;
            }
        }
        _ => {
            input.handle_event(&Event::Key(key));
            controller.set_draft(input.value());
        }
    }
    Flow::Continue
}

/// Start an enhancement in the background if the controls are live.
///
/// The controller is already pending when this returns `Some`.
fn dispatch(controller: &Controller, action: Action) -> Option<JoinHandle<Outcome>> {
    match controller.start(action) {
        Ok(work) => Some(tokio::spawn(work)),
        Err(reason) => {
            debug!(%action, ?reason, "Ignoring action while controls are disabled");
            None
        }
    }
}

/// Draw the TUI.
fn draw_ui(frame: &mut Frame, input: &Input, snapshot: &Snapshot, view: &mut ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Length(3), // action controls
            Constraint::Length(if view.show_prompt { 2 } else { 0 }),
            Constraint::Min(3),    // result
            Constraint::Length(1), // key help
        ])
        .split(frame.area());

    draw_input(frame, chunks[0], input);
    draw_actions(frame, chunks[1], snapshot, view);
    if view.show_prompt {
        let prompt = Paragraph::new(Line::from(Span::styled(
            view.selected.prompt(),
            Style::default().fg(Color::DarkGray),
        )))
        .wrap(Wrap { trim: true });
        frame.render_widget(prompt, chunks[2]);
    }
    draw_result(frame, chunks[3], snapshot, &mut view.result_scroll);

    let help = Paragraph::new(Line::from(Span::styled(
        " Ctrl+G/T/E run · Tab select · Enter run selected · Alt+Enter newline · PgUp/PgDn scroll · Esc quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, chunks[4]);
}

fn draw_input(frame: &mut Frame, area: Rect, input: &Input) {
    let block = Block::default()
        .title(" Input Text ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    // Scroll the input if cursor is beyond visible area. One column per
    // char, with line breaks drawn as a single marker.
    let input_width = inner_area.width as usize;
    let cursor_pos = input.cursor();
    let scroll = input_scroll(cursor_pos, input_width);

    let line = if input.value().is_empty() {
        Line::from(Span::styled(
            "Enter your text here to enhance it...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_value: String = input
            .value()
            .chars()
            .map(|c| if c == '\n' { '⏎' } else { c })
            .skip(scroll)
            .take(input_width)
            .collect();
        Line::from(Span::styled(visible_value, Style::default().fg(Color::White)))
    };
    frame.render_widget(Paragraph::new(line), inner_area);

    let cursor_x = inner_area.x + (cursor_pos - scroll) as u16;
    frame.set_cursor_position((cursor_x, inner_area.y));
}

/// Horizontal scroll that keeps the cursor inside a field of `width` columns.
fn input_scroll(cursor_pos: usize, width: usize) -> usize {
    if width > 0 && cursor_pos >= width {
        cursor_pos - width + 1
    } else {
        0
    }
}

fn draw_actions(frame: &mut Frame, area: Rect, snapshot: &Snapshot, view: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (action, column) in Action::ALL.into_iter().zip(columns.iter()) {
        let (text, style) = button(action, snapshot, view);
        let border_style = if action == view.selected && snapshot.enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let widget = Paragraph::new(Line::from(Span::styled(text, style)))
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(widget, *column);
    }
}

/// Caption and style for one action control.
fn button(action: Action, snapshot: &Snapshot, view: &ViewState) -> (String, Style) {
    let hotkey = action.hotkey().to_ascii_uppercase();
    match snapshot.state {
        RequestState::Pending(pending) if pending == action => {
            let spinner = SPINNER[view.spinner_frame % SPINNER.len()];
            (
                format!("{} {}", spinner, action.label()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        }
        _ if !snapshot.enabled => (
            format!("^{} {}", hotkey, action.label()),
            Style::default().fg(Color::DarkGray),
        ),
        _ => (
            format!("^{} {}", hotkey, action.label()),
            Style::default().fg(Color::White),
        ),
    }
}

fn draw_result(frame: &mut Frame, area: Rect, snapshot: &Snapshot, scroll: &mut u16) {
    let (title, body, content) = match &snapshot.result {
        Some(text) => (
            " Enhanced Text ",
            Text::styled(text.as_str(), Style::default().fg(Color::White)),
            text.as_str(),
        ),
        None => (
            "",
            Text::styled(EMPTY_RESULT_HINT, Style::default().fg(Color::DarkGray)),
            EMPTY_RESULT_HINT,
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    let max_scroll = wrapped_height(content, inner.width).saturating_sub(inner.height);
    *scroll = (*scroll).min(max_scroll);

    let paragraph = Paragraph::new(body)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((*scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Rows `text` occupies when word-wrapped to `width` columns.
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = text
        .split('\n')
        .map(|line| {
            let mut rows = 1;
            let mut col = 0;
            for word in line.split(' ') {
                let len = word.chars().count();
                let needed = if col == 0 { len } else { col + 1 + len };
                if needed <= width {
                    col = needed;
                } else {
                    // Word moves to a fresh row, and is broken if still too long.
                    if col > 0 {
                        rows += 1;
                    }
                    rows += len.saturating_sub(1) / width;
                    col = (len.saturating_sub(1) % width) + 1;
                }
            }
            rows
        })
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}
