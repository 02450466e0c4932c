use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use thiserror::Error;
use tokio::runtime::Runtime;

use sqlboard_core::api::PanelApi;
use sqlboard_core::controller::FormController;
use sqlboard_core::operation::{FieldKind, Operation, ALL_OPERATIONS};
use sqlboard_core::result_view::ResultView;

const TICK_RATE: Duration = Duration::from_millis(120);

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// One focusable position in the rendered form. The slot list is rebuilt
/// from the controller on every pass, so slots appear and disappear as
/// selections load schema columns or attribute rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Operation,
    DatabaseSelect,
    TableSelect,
    RowSelect,
    ColumnInput(usize),
    DatabaseName,
    TableName,
    AttributeName(usize),
    AttributeType(usize),
    AddAttribute,
    RawQuery,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Msg {
    Quit,
    NextSlot,
    PrevSlot,
    CycleLeft,
    CycleRight,
    Activate,
    Input(char),
    Backspace,
}

struct TuiApp<A: PanelApi> {
    controller: FormController<A>,
    focus: usize,
    should_quit: bool,
    status_line: String,
}

impl<A: PanelApi> TuiApp<A> {
    fn new(controller: FormController<A>) -> Self {
        Self {
            controller,
            focus: 0,
            should_quit: false,
            status_line: "Left/Right on Operation picks a form".to_string(),
        }
    }

    /// Flattens the current form into focusable slots, operation first and
    /// the submit button last.
    fn slots(&self) -> Vec<Slot> {
        let mut slots = vec![Slot::Operation];
        let Some(operation) = self.controller.operation() else {
            return slots;
        };

        for field in operation.form_fields() {
            match field {
                FieldKind::DatabaseSelect => slots.push(Slot::DatabaseSelect),
                FieldKind::TableSelect => slots.push(Slot::TableSelect),
                FieldKind::RowSelect => slots.push(Slot::RowSelect),
                FieldKind::ColumnInputs => {
                    for index in 0..self.controller.inputs().len() {
                        slots.push(Slot::ColumnInput(index));
                    }
                }
                FieldKind::DatabaseName => slots.push(Slot::DatabaseName),
                FieldKind::TableName => slots.push(Slot::TableName),
                FieldKind::AttributeRows => {
                    for index in 0..self.controller.attributes().len() {
                        slots.push(Slot::AttributeName(index));
                        slots.push(Slot::AttributeType(index));
                    }
                    slots.push(Slot::AddAttribute);
                }
                FieldKind::RawQuery => slots.push(Slot::RawQuery),
            }
        }

        slots.push(Slot::Submit);
        slots
    }

    fn current_slot(&self) -> Slot {
        let slots = self.slots();
        slots[self.focus.min(slots.len() - 1)]
    }

    fn handle(&mut self, msg: Msg, runtime: &Runtime) {
        match msg {
            Msg::Quit => self.should_quit = true,
            Msg::NextSlot => {
                let count = self.slots().len();
                self.focus = (self.focus + 1) % count;
            }
            Msg::PrevSlot => {
                let count = self.slots().len();
                self.focus = (self.focus + count - 1) % count;
            }
            Msg::CycleLeft => self.cycle(-1, runtime),
            Msg::CycleRight => self.cycle(1, runtime),
            Msg::Activate => self.activate(runtime),
            Msg::Input(character) => self.input(character),
            Msg::Backspace => self.backspace(),
        }
    }

    fn cycle(&mut self, step: isize, runtime: &Runtime) {
        match self.current_slot() {
            Slot::Operation => {
                let next = cycled_operation(self.controller.operation(), step);
                runtime.block_on(self.controller.select_operation(next));
                self.focus = 0;
                self.status_line = format!("Operation: {}", next.label());
            }
            Slot::DatabaseSelect => {
                let next = cycled_option(
                    self.controller.database_options(),
                    self.controller.cascade().database(),
                    step,
                );
                runtime.block_on(self.controller.set_database(next));
                self.clamp_focus();
            }
            Slot::TableSelect => {
                let next = cycled_option(
                    self.controller.table_options(),
                    self.controller.cascade().table(),
                    step,
                );
                runtime.block_on(self.controller.set_table(next));
                self.clamp_focus();
            }
            Slot::RowSelect => {
                let next = cycled_option(
                    self.controller.row_options(),
                    self.controller.cascade().row_id(),
                    step,
                );
                runtime.block_on(self.controller.set_row(next));
                self.clamp_focus();
            }
            Slot::AttributeType(index) => self.controller.cycle_attribute_type(index),
            _ => {}
        }
    }

    fn activate(&mut self, runtime: &Runtime) {
        match self.current_slot() {
            Slot::Operation => {}
            Slot::AddAttribute => {
                self.controller.add_attribute();
                self.status_line = "Attribute row added".to_string();
            }
            _ => {
                runtime.block_on(self.controller.submit());
                self.status_line = "Submitted".to_string();
            }
        }
    }

    fn input(&mut self, character: char) {
        match self.current_slot() {
            Slot::ColumnInput(index) => {
                let mut value = self.controller.inputs()[index].value.clone();
                value.push(character);
                self.controller.set_input_value(index, value);
            }
            Slot::DatabaseName => {
                let mut value = self.controller.database_name().to_string();
                value.push(character);
                self.controller.set_database_name(value);
            }
            Slot::TableName => {
                let mut value = self.controller.table_name().to_string();
                value.push(character);
                self.controller.set_table_name(value);
            }
            Slot::AttributeName(index) => {
                let mut value = self.controller.attributes()[index].name.clone();
                value.push(character);
                self.controller.set_attribute_name(index, value);
            }
            Slot::RawQuery => {
                let mut value = self.controller.raw_query().to_string();
                value.push(character);
                self.controller.set_raw_query(value);
            }
            _ => {
                if character == 'q' {
                    self.should_quit = true;
                }
            }
        }
    }

    fn backspace(&mut self) {
        match self.current_slot() {
            Slot::ColumnInput(index) => {
                let mut value = self.controller.inputs()[index].value.clone();
                value.pop();
                self.controller.set_input_value(index, value);
            }
            Slot::DatabaseName => {
                let mut value = self.controller.database_name().to_string();
                value.pop();
                self.controller.set_database_name(value);
            }
            Slot::TableName => {
                let mut value = self.controller.table_name().to_string();
                value.pop();
                self.controller.set_table_name(value);
            }
            Slot::AttributeName(index) => {
                let mut value = self.controller.attributes()[index].name.clone();
                value.pop();
                self.controller.set_attribute_name(index, value);
            }
            Slot::RawQuery => {
                let mut value = self.controller.raw_query().to_string();
                value.pop();
                self.controller.set_raw_query(value);
            }
            _ => {}
        }
    }

    fn clamp_focus(&mut self) {
        let count = self.slots().len();
        if self.focus >= count {
            self.focus = count - 1;
        }
    }

    fn slot_line(&self, slot: Slot, focused: bool) -> Line<'static> {
        let marker = if focused { ">" } else { " " };
        let text = match slot {
            Slot::Operation => format!(
                "{marker} Operation: < {} >",
                self.controller
                    .operation()
                    .map_or("-", Operation::label)
            ),
            Slot::DatabaseSelect => format!(
                "{marker} Database: < {} >",
                self.controller.cascade().database().unwrap_or("-")
            ),
            Slot::TableSelect => format!(
                "{marker} Table: < {} >",
                self.controller.cascade().table().unwrap_or("-")
            ),
            Slot::RowSelect => format!(
                "{marker} Row ID: < {} >",
                self.controller.cascade().row_id().unwrap_or("-")
            ),
            Slot::ColumnInput(index) => {
                let input = &self.controller.inputs()[index];
                format!(
                    "{marker} {} ({}): {}",
                    input.name, input.column_type, input.value
                )
            }
            Slot::DatabaseName => {
                format!("{marker} Database name: {}", self.controller.database_name())
            }
            Slot::TableName => format!("{marker} Table name: {}", self.controller.table_name()),
            Slot::AttributeName(index) => {
                let attribute = &self.controller.attributes()[index];
                format!("{marker} Attribute name: {}", attribute.name)
            }
            Slot::AttributeType(index) => {
                let attribute = &self.controller.attributes()[index];
                format!(
                    "{marker} Attribute type: < {} >",
                    attribute.attribute_type.as_sql()
                )
            }
            Slot::AddAttribute => format!("{marker} [ Add attribute ]"),
            Slot::RawQuery => format!("{marker} Query: {}", self.controller.raw_query()),
            Slot::Submit => format!("{marker} [ Submit ]"),
        };
        Line::from(text)
    }

    fn result_lines(&self) -> Vec<Line<'static>> {
        match self.controller.result() {
            None => vec![Line::from("No result yet")],
            Some(ResultView::Message(message)) => vec![Line::from(message.clone())],
            Some(ResultView::Table { headers, rows }) => {
                let mut lines = vec![
                    Line::from(headers.join(" | ")),
                    Line::from("-".repeat(headers.join(" | ").len().min(120))),
                ];
                for row in rows {
                    lines.push(Line::from(row.join(" | ")));
                }
                lines
            }
        }
    }
}

/// Cycles the operation picker through every form in declaration order.
fn cycled_operation(current: Option<Operation>, step: isize) -> Operation {
    let count = ALL_OPERATIONS.len() as isize;
    let index = match current {
        Some(operation) => {
            let position = ALL_OPERATIONS
                .iter()
                .position(|candidate| *candidate == operation)
                .unwrap_or(0) as isize;
            (position + step).rem_euclid(count)
        }
        None => {
            if step >= 0 {
                0
            } else {
                count - 1
            }
        }
    };
    ALL_OPERATIONS[index as usize]
}

/// Cycles a dropdown through placeholder plus options; `None` is the
/// placeholder position.
fn cycled_option(options: &[String], current: Option<&str>, step: isize) -> Option<String> {
    let count = options.len() as isize + 1;
    let position = match current {
        None => 0,
        Some(value) => options
            .iter()
            .position(|candidate| candidate == value)
            .map_or(0, |index| index as isize + 1),
    };
    let next = (position + step).rem_euclid(count);
    if next == 0 {
        None
    } else {
        Some(options[(next - 1) as usize].clone())
    }
}

#[must_use]
pub fn ui_name() -> &'static str {
    "sqlboard-tui"
}

pub fn run<A: PanelApi>(controller: FormController<A>) -> Result<(), TuiError> {
    let runtime = Runtime::new()?;
    let mut terminal = setup_terminal()?;
    let run_result = run_loop(&mut terminal, &runtime, controller);
    let restore_result = restore_terminal(&mut terminal);

    if let Err(error) = run_result {
        restore_result?;
        return Err(error);
    }

    restore_result?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), TuiError> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<A: PanelApi>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    runtime: &Runtime,
    controller: FormController<A>,
) -> Result<(), TuiError> {
    let mut app = TuiApp::new(controller);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, &app))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(message) = map_key_event(key) {
                        app.handle(message, runtime);
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render<A: PanelApi>(frame: &mut Frame<'_>, app: &TuiApp<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " SQL Admin Panel ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(format!("Role: {}", app.controller.role().label())),
        Span::raw(" | "),
        Span::raw(format!(
            "Operation: {}",
            app.controller.operation().map_or("-", Operation::label)
        )),
    ]))
    .block(Block::default().borders(Borders::ALL).title("sqlboard"));
    frame.render_widget(header, chunks[0]);

    let slots = app.slots();
    let focus = app.focus.min(slots.len() - 1);
    let form_lines: Vec<Line<'_>> = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| app.slot_line(*slot, index == focus))
        .collect();
    let form = Paragraph::new(form_lines)
        .block(Block::default().borders(Borders::ALL).title("Form"))
        .alignment(Alignment::Left);
    frame.render_widget(form, chunks[1]);

    let result = Paragraph::new(app.result_lines())
        .block(Block::default().borders(Borders::ALL).title("Result"))
        .alignment(Alignment::Left);
    frame.render_widget(result, chunks[2]);

    let footer = Paragraph::new(vec![
        Line::from(
            "Tab/Down next | Shift-Tab/Up previous | Left/Right cycle | Enter submit | Esc quit",
        ),
        Line::from(format!("Status: {}", app.status_line)),
    ])
    .block(Block::default().borders(Borders::ALL).title("Keys"));
    frame.render_widget(footer, chunks[3]);
}

fn map_key_event(key: KeyEvent) -> Option<Msg> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Msg::Quit),
        (_, KeyCode::Esc) => Some(Msg::Quit),
        (_, KeyCode::Tab | KeyCode::Down) => Some(Msg::NextSlot),
        (_, KeyCode::BackTab | KeyCode::Up) => Some(Msg::PrevSlot),
        (_, KeyCode::Left) => Some(Msg::CycleLeft),
        (_, KeyCode::Right) => Some(Msg::CycleRight),
        (_, KeyCode::Enter) => Some(Msg::Activate),
        (_, KeyCode::Backspace) => Some(Msg::Backspace),
        (_, KeyCode::Char(character)) => Some(Msg::Input(character)),
        _ => None,
    }
}
