// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use nexora_app::{
    Activity, ActivityCommand, ActivityController, ActivityEvent, ActivityStatus, ActivityStorage,
    BookingInput, ClientFormInput, DeleteTarget, PortalState, format_date, parse_date,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::{Date, OffsetDateTime};
use tracing::debug;

const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Intake,
    Booking,
}

impl FormKind {
    const fn title(self) -> &'static str {
        match self {
            Self::Intake => "fill the form",
            Self::Booking => "book a call",
        }
    }

    const fn fields(self) -> &'static [FormField] {
        match self {
            Self::Intake => &[
                FormField::Name,
                FormField::Email,
                FormField::Phone,
                FormField::Description,
                FormField::AgreePhone,
                FormField::AgreeEmail,
            ],
            Self::Booking => &[FormField::Name, FormField::Phone, FormField::Date],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Email,
    Phone,
    Description,
    AgreePhone,
    AgreeEmail,
    Date,
}

impl FormField {
    const fn label(self) -> &'static str {
        match self {
            Self::Name => "first and last name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Description => "description",
            Self::AgreePhone => "ok to contact by phone",
            Self::AgreeEmail => "ok to contact by email",
            Self::Date => "date (YYYY-MM-DD, empty = today)",
        }
    }

    const fn is_checkbox(self) -> bool {
        matches!(self, Self::AgreePhone | Self::AgreeEmail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormUiState {
    kind: FormKind,
    field_index: usize,
}

impl FormUiState {
    fn field(self) -> FormField {
        let fields = self.kind.fields();
        fields[self.field_index.min(fields.len() - 1)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor: usize,
    form: Option<FormUiState>,
    draft: ClientFormInput,
    booking_date: String,
    help_visible: bool,
    status_line: Option<String>,
    status_token: u64,
}

pub fn run_app<S: ActivityStorage>(controller: &mut ActivityController<S>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    let result = execute!(stdout, terminal::EnterAlternateScreen)
        .context("enter alternate screen")
        .and_then(|()| Terminal::new(CrosstermBackend::new(stdout)).context("create terminal"))
        .and_then(|mut terminal| event_loop(&mut terminal, controller, poll_event));

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn poll_event() -> Result<Option<Event>> {
    if event::poll(Duration::from_millis(120)).context("poll event")? {
        event::read().map(Some).context("read event")
    } else {
        Ok(None)
    }
}

/// Draws and handles input until a quit key or the first terminal error.
fn event_loop<B, S, F>(
    terminal: &mut Terminal<B>,
    controller: &mut ActivityController<S>,
    mut next_event: F,
) -> Result<()>
where
    B: Backend,
    S: ActivityStorage,
    F: FnMut() -> Result<Option<Event>>,
{
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    loop {
        process_internal_events(&mut view_data, &internal_rx);
        terminal
            .draw(|frame| render(frame, controller.state(), &view_data))
            .context("draw frame")?;

        if let Some(Event::Key(key)) = next_event()?
            && handle_key_event(controller, &mut view_data, &internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn dispatch<S: ActivityStorage>(
    controller: &mut ActivityController<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: ActivityCommand,
) -> Vec<ActivityEvent> {
    debug!(?command, "dispatch");
    let events = controller.dispatch(command);
    let page_len = controller.state().page_activities().len();
    view_data.cursor = view_data.cursor.min(page_len.saturating_sub(1));
    if let Some(status) = status_for_events(&events) {
        emit_status(view_data, internal_tx, status);
    }
    events
}

/// Picks the most important message; lower rank wins.
fn status_for_events(events: &[ActivityEvent]) -> Option<String> {
    events
        .iter()
        .filter_map(|event| {
            let (rank, message) = match event {
                ActivityEvent::PersistFailed(message) => (0, format!("save failed: {message}")),
                ActivityEvent::ActivityAdded(id) => (1, format!("added {id}")),
                ActivityEvent::SubmissionRejected(reason) => (1, reason.clone()),
                ActivityEvent::ActivitiesRemoved(ids) if ids.len() == 1 => {
                    (1, format!("deleted {}", ids[0]))
                }
                ActivityEvent::ActivitiesRemoved(ids) => {
                    (1, format!("deleted {} records", ids.len()))
                }
                ActivityEvent::DeleteRequested(_) => (2, "confirm delete: y/n".to_owned()),
                ActivityEvent::DeleteCancelled => (2, "delete canceled".to_owned()),
                ActivityEvent::SelectionChanged(count) => (3, format!("{count} selected")),
                _ => return None,
            };
            Some((rank, message))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, message)| message)
}

fn handle_key_event<S: ActivityStorage>(
    controller: &mut ActivityController<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if controller.state().pending_deletion().is_some() {
        handle_confirm_key(controller, view_data, internal_tx, key);
        return false;
    }

    if view_data.form.is_some() {
        handle_form_key(controller, view_data, internal_tx, key);
        return false;
    }

    handle_table_key(controller, view_data, internal_tx, key)
}

fn handle_confirm_key<S: ActivityStorage>(
    controller: &mut ActivityController<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Char('y') | KeyCode::Enter => ActivityCommand::ConfirmDelete,
        KeyCode::Char('n') | KeyCode::Esc => ActivityCommand::CancelDelete,
        _ => return,
    };
    dispatch(controller, view_data, internal_tx, command);
}

fn handle_table_key<S: ActivityStorage>(
    controller: &mut ActivityController<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let state = controller.state();
    let page = state.current_page();
    let page_len = state.page_activities().len();
    let cursor_id = state
        .page_activities()
        .get(view_data.cursor)
        .map(|activity| activity.id.clone());

    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if view_data.cursor + 1 < page_len {
                view_data.cursor += 1;
            }
            return false;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.cursor = view_data.cursor.saturating_sub(1);
            return false;
        }
        KeyCode::Char('i') => {
            open_form(view_data, FormKind::Intake);
            return false;
        }
        KeyCode::Char('b') => {
            open_form(view_data, FormKind::Booking);
            return false;
        }
        KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
            ActivityCommand::SetPage(page + 1)
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
            ActivityCommand::SetPage(page.saturating_sub(1))
        }
        KeyCode::Char('g') => ActivityCommand::SetPage(1),
        KeyCode::Char('G') => ActivityCommand::SetPage(state.total_pages()),
        KeyCode::Char('a') => ActivityCommand::ToggleSelectAll,
        KeyCode::Char(' ') => match cursor_id {
            Some(id) => ActivityCommand::ToggleSelect(id),
            None => return false,
        },
        KeyCode::Enter => match cursor_id {
            Some(id) => ActivityCommand::OpenDetail(id),
            None => return false,
        },
        KeyCode::Esc => ActivityCommand::CloseDetail,
        KeyCode::Char('D') => ActivityCommand::RequestDelete(DeleteTarget::Bulk),
        KeyCode::Char('d') => match delete_target(state, cursor_id) {
            Some(target) => ActivityCommand::RequestDelete(target),
            None => return false,
        },
        _ => return false,
    };

    let events = dispatch(controller, view_data, internal_tx, command);
    if events
        .iter()
        .any(|event| matches!(event, ActivityEvent::PageChanged(_)))
    {
        view_data.cursor = 0;
    }
    false
}

/// Drawer row first, then the selection, then the row under the cursor.
fn delete_target(
    state: &PortalState,
    cursor_id: Option<nexora_app::ActivityId>,
) -> Option<DeleteTarget> {
    if let Some(id) = state.detail_id() {
        return Some(DeleteTarget::Single(id.clone()));
    }
    if !state.selection().is_empty() {
        return Some(DeleteTarget::Bulk);
    }
    cursor_id.map(DeleteTarget::Single)
}

fn open_form(view_data: &mut ViewData, kind: FormKind) {
    view_data.form = Some(FormUiState {
        kind,
        field_index: 0,
    });
}

fn handle_form_key<S: ActivityStorage>(
    controller: &mut ActivityController<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(form) = view_data.form else {
        return;
    };
    let field_count = form.kind.fields().len();

    match key.code {
        KeyCode::Esc => {
            view_data.form = None;
            emit_status(view_data, internal_tx, "form canceled");
        }
        KeyCode::Tab | KeyCode::Down => {
            view_data.form = Some(FormUiState {
                field_index: (form.field_index + 1) % field_count,
                ..form
            });
        }
        KeyCode::BackTab | KeyCode::Up => {
            view_data.form = Some(FormUiState {
                field_index: (form.field_index + field_count - 1) % field_count,
                ..form
            });
        }
        KeyCode::Enter => submit_form(controller, view_data, internal_tx, form.kind),
        KeyCode::Backspace => {
            if let Some(text) = text_field_mut(view_data, form.field()) {
                text.pop();
            }
        }
        KeyCode::Char(' ') if form.field().is_checkbox() => {
            match form.field() {
                FormField::AgreePhone => view_data.draft.agree_phone = !view_data.draft.agree_phone,
                FormField::AgreeEmail => view_data.draft.agree_email = !view_data.draft.agree_email,
                _ => {}
            }
        }
        KeyCode::Char(ch) => {
            if let Some(text) = text_field_mut(view_data, form.field()) {
                text.push(ch);
            }
        }
        _ => {}
    }
}

fn text_field_mut(view_data: &mut ViewData, field: FormField) -> Option<&mut String> {
    match field {
        FormField::Name => Some(&mut view_data.draft.name),
        FormField::Email => Some(&mut view_data.draft.email),
        FormField::Phone => Some(&mut view_data.draft.phone),
        FormField::Description => Some(&mut view_data.draft.description),
        FormField::Date => Some(&mut view_data.booking_date),
        FormField::AgreePhone | FormField::AgreeEmail => None,
    }
}

fn submit_form<S: ActivityStorage>(
    controller: &mut ActivityController<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    kind: FormKind,
) {
    let command = match kind {
        FormKind::Intake => ActivityCommand::SubmitIntake {
            form: view_data.draft.clone(),
            today: today(),
        },
        FormKind::Booking => {
            let date = if view_data.booking_date.trim().is_empty() {
                None
            } else {
                match parse_date(&view_data.booking_date) {
                    Some(date) => Some(date),
                    None => {
                        emit_status(
                            view_data,
                            internal_tx,
                            "booking date must look like 2024-05-20 -- fix the date and retry",
                        );
                        return;
                    }
                }
            };
            ActivityCommand::SubmitBooking {
                booking: BookingInput {
                    name: view_data.draft.name.clone(),
                    phone: view_data.draft.phone.clone(),
                    date,
                },
                today: today(),
            }
        }
    };

    let events = dispatch(controller, view_data, internal_tx, command);
    if events
        .iter()
        .any(|event| matches!(event, ActivityEvent::ActivityAdded(_)))
    {
        view_data.form = None;
        if kind == FormKind::Intake {
            view_data.draft = ClientFormInput::blank();
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &PortalState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new("client portal | recent activity")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().title("nexora").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    match state.detail() {
        Some(activity) => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
                .split(layout[1]);
            render_table(frame, body[0], state, view_data);
            let drawer = Paragraph::new(render_detail_text(activity))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title("client details")
                        .borders(Borders::ALL),
                );
            frame.render_widget(drawer, body[1]);
        }
        None => render_table(frame, layout[1], state, view_data),
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(form) = view_data.form {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(form.kind.title())
            .borders(Borders::ALL);
        let text = render_form_text(form, view_data);
        let panel = Paragraph::new(text).block(block);
        frame.render_widget(panel, area);
    }

    if let Some(message) = state.confirmation_message() {
        let area = centered_rect(50, 24, frame.area());
        frame.render_widget(Clear, area);
        let dialog = Paragraph::new(format!("{message}\n\ny delete | n cancel"))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("delete")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(dialog, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &PortalState,
    view_data: &ViewData,
) {
    let header_check = if state.all_selected() { CHECKED } else { UNCHECKED };
    let header = Row::new(
        [header_check, "id", "date", "client", "company", "phone", "status"]
            .into_iter()
            .map(|label| {
                Cell::from(label).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            }),
    );

    let rows = state
        .page_activities()
        .iter()
        .enumerate()
        .map(|(index, activity)| {
            let selected = state.is_selected(&activity.id);
            let mut style = Style::default();
            if selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            if index == view_data.cursor {
                style = style.bg(Color::DarkGray);
            }
            Row::new(vec![
                Cell::from(if selected { CHECKED } else { UNCHECKED }),
                Cell::from(activity.id.to_string()),
                Cell::from(format_date(activity.date)),
                Cell::from(activity.client_name.clone()),
                Cell::from(activity.company.clone()),
                Cell::from(activity.phone.clone()),
                Cell::from(activity.status.as_str())
                    .style(Style::default().fg(status_color(activity.status))),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(14),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn table_title(state: &PortalState) -> String {
    let selected = state.selection().len();
    if selected == 0 {
        "activity".to_owned()
    } else {
        format!("activity | {selected} selected")
    }
}

const fn status_color(status: ActivityStatus) -> Color {
    match status {
        ActivityStatus::Completed => Color::Green,
        ActivityStatus::Pending => Color::Yellow,
        ActivityStatus::CallScheduled => Color::Magenta,
        ActivityStatus::InProgress => Color::Blue,
    }
}

fn status_text(state: &PortalState, view_data: &ViewData) -> String {
    let footer = format!(
        "{} | page {} of {} | ? help | ctrl+q quit",
        state.page_summary(),
        state.current_page(),
        state.total_pages()
    );
    match &view_data.status_line {
        Some(status) => format!("{status} | {footer}"),
        None => footer,
    }
}

fn render_detail_text(activity: &Activity) -> String {
    let initial = activity.initial().map(String::from).unwrap_or_default();
    [
        format!("({initial}) {}", activity.client_name),
        activity.company.clone(),
        activity.status.as_str().to_owned(),
        String::new(),
        format!("activity id  {}", activity.id),
        format!("date         {}", format_date(activity.date)),
        format!("phone        {}", activity.phone),
        String::new(),
        "d delete | esc close".to_owned(),
    ]
    .join("\n")
}

fn render_form_text(form: FormUiState, view_data: &ViewData) -> String {
    let mut lines = form
        .kind
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let marker = if index == form.field_index { ">" } else { " " };
            let value = match field {
                FormField::Name => view_data.draft.name.clone(),
                FormField::Email => view_data.draft.email.clone(),
                FormField::Phone => view_data.draft.phone.clone(),
                FormField::Description => view_data.draft.description.clone(),
                FormField::AgreePhone => checkbox(view_data.draft.agree_phone).to_owned(),
                FormField::AgreeEmail => checkbox(view_data.draft.agree_email).to_owned(),
                FormField::Date => view_data.booking_date.clone(),
            };
            format!("{marker} {}: {value}", field.label())
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push("tab next field | enter submit | esc cancel".to_owned());
    lines.join("\n")
}

const fn checkbox(checked: bool) -> &'static str {
    if checked { CHECKED } else { UNCHECKED }
}

fn help_overlay_text() -> &'static str {
    "table: j/k row | h/l page | g/G first/last page | space select | a select all\n\
table: enter details | esc close details | d delete | D delete selected\n\
table: i intake form | b book a call | q quit | ? help\n\
confirm: y/enter delete | n/esc cancel\n\
form: tab/shift+tab field | type to edit | space toggle checkbox | enter submit | esc cancel\n\
global: ctrl+q quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
