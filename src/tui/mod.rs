//! Ratatui-based terminal UI.
//!
//! The TUI lets the user pick a category and a conversion, type a value and
//! convert it. Guests see how many conversions they have left; signed-in users
//! see their history next to the converter.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::ConversionService;
use crate::domain::{ConversionOutcome, ConversionRequest, RejectReason, StoredRecord};
use crate::error::AppError;
use crate::gate::SessionCell;
use crate::report::fmt_value;
use crate::store::SqliteStore;

const EXPORT_PATH: &str = "uconv_export.json";

/// Start the TUI.
pub fn run(service: ConversionService<SqliteStore>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(service);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Category,
    Direction,
    Value,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Category => Focus::Direction,
            Focus::Direction => Focus::Value,
            Focus::Value => Focus::Category,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Category => Focus::Value,
            Focus::Direction => Focus::Category,
            Focus::Value => Focus::Direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    Login,
    Signup,
}

#[derive(Debug, Clone)]
struct AuthForm {
    kind: FormKind,
    username: String,
    password: String,
    on_password: bool,
}

impl AuthForm {
    fn new(kind: FormKind) -> Self {
        Self {
            kind,
            username: String::new(),
            password: String::new(),
            on_password: false,
        }
    }
}

struct App {
    service: ConversionService<SqliteStore>,
    session: SessionCell,
    categories: Vec<&'static str>,
    directions: Vec<&'static str>,
    category_idx: usize,
    direction_idx: usize,
    value_input: String,
    focus: Focus,
    form: Option<AuthForm>,
    last_result: Option<String>,
    history: Vec<StoredRecord>,
    show_history: bool,
    status: String,
}

impl App {
    fn new(service: ConversionService<SqliteStore>) -> Self {
        let categories: Vec<&'static str> = service.gate().table().categories().collect();
        let mut app = Self {
            service,
            session: SessionCell::default(),
            categories,
            directions: Vec::new(),
            category_idx: 0,
            direction_idx: 0,
            value_input: String::new(),
            focus: Focus::Category,
            form: None,
            last_result: None,
            history: Vec::new(),
            show_history: true,
            status: "Select a category, enter a value, and press Enter to convert.".to_string(),
        };
        app.reload_directions();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.form.is_some() {
            self.handle_form_key(code);
            return false;
        }

        if self.focus == Focus::Value {
            match code {
                KeyCode::Char(c) if is_value_char(c) => {
                    self.value_input.push(c);
                    return false;
                }
                KeyCode::Backspace => {
                    self.value_input.pop();
                    return false;
                }
                _ => {}
            }
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => self.convert(),
            KeyCode::Char('l') => self.open_form(FormKind::Login),
            KeyCode::Char('s') => self.open_form(FormKind::Signup),
            KeyCode::Char('o') => self.logout(),
            KeyCode::Char('h') => self.show_history = !self.show_history,
            KeyCode::Char('x') => self.export(),
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        match code {
            KeyCode::Esc => {
                self.form = None;
                self.status = "Canceled.".to_string();
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.on_password = !form.on_password;
            }
            KeyCode::Enter if !form.on_password => form.on_password = true,
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => {
                if form.on_password {
                    form.password.pop();
                } else {
                    form.username.pop();
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                if form.on_password {
                    form.password.push(c);
                } else {
                    form.username.push(c);
                }
            }
            _ => {}
        }
    }

    fn open_form(&mut self, kind: FormKind) {
        if self.session.snapshot().is_authenticated() {
            self.status = "Already logged in. Press o to log out first.".to_string();
            return;
        }
        self.form = Some(AuthForm::new(kind));
        self.status = "Tab switches field, Enter submits, Esc cancels.".to_string();
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };

        match form.kind {
            FormKind::Login => match self.service.login_in(&self.session, &form.username, &form.password) {
                Ok(()) => {
                    self.status = format!("Welcome, {}!", form.username.trim());
                    self.show_history = true;
                    self.refresh_history();
                }
                Err(err) => {
                    self.status = format!("⚠ {err}");
                    self.form = Some(AuthForm {
                        password: String::new(),
                        ..form
                    });
                }
            },
            FormKind::Signup => match self.service.register(&form.username, &form.password) {
                Ok(()) => {
                    self.status = "Account created! Please log in.".to_string();
                    self.form = Some(AuthForm {
                        kind: FormKind::Login,
                        password: String::new(),
                        on_password: true,
                        ..form
                    });
                }
                Err(err) => {
                    self.status = format!("⚠ {err}");
                    self.form = Some(AuthForm {
                        password: String::new(),
                        ..form
                    });
                }
            },
        }
    }

    fn logout(&mut self) {
        let snapshot = self.session.snapshot();
        let Some(username) = snapshot.username() else {
            self.status = "Not logged in.".to_string();
            return;
        };
        let username = username.to_string();
        self.session.logout();
        self.history.clear();
        self.last_result = None;
        self.status = format!("Goodbye, {username}.");
    }

    fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::Category => {
                let next = step(self.category_idx, delta, self.categories.len());
                if next != self.category_idx {
                    self.category_idx = next;
                    self.reload_directions();
                }
            }
            Focus::Direction => {
                self.direction_idx = step(self.direction_idx, delta, self.directions.len());
            }
            Focus::Value => {}
        }
    }

    fn reload_directions(&mut self) {
        let table = *self.service.gate().table();
        self.directions = self
            .selected_category()
            .and_then(|c| table.directions(c).ok())
            .map(|it| it.collect::<Vec<_>>())
            .unwrap_or_default();
        self.direction_idx = 0;
    }

    fn selected_category(&self) -> Option<&'static str> {
        self.categories.get(self.category_idx).copied()
    }

    fn selected_direction(&self) -> Option<&'static str> {
        self.directions.get(self.direction_idx).copied()
    }

    fn convert(&mut self) {
        let (Some(category), Some(direction)) = (self.selected_category(), self.selected_direction()) else {
            self.status = "Pick a category and a conversion first.".to_string();
            return;
        };

        let value = match self.value_input.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            Ok(_) | Err(_) => {
                self.status = format!("'{}' is not a number.", self.value_input.trim());
                self.focus = Focus::Value;
                return;
            }
        };

        let request = ConversionRequest::new(category, direction, value);
        match self.service.convert_in(&self.session, &request) {
            ConversionOutcome::Allowed(result) => {
                let text = format!("{} {direction} = {}", fmt_value(value), fmt_value(result));
                self.status = format!("Converted Value: {}", fmt_value(result));
                self.last_result = Some(text);
                self.refresh_history();
            }
            ConversionOutcome::Rejected(RejectReason::QuotaExceeded) => {
                self.status = "⚠ You have reached the guest limit! Sign up (s) or log in (l) to keep converting and save your history.".to_string();
            }
            ConversionOutcome::Rejected(reason) => {
                self.status = format!("⚠ {reason}");
            }
        }
    }

    fn refresh_history(&mut self) {
        match self.service.history(&self.session.snapshot()) {
            Ok(records) => self.history = records,
            Err(err) => self.status = format!("⚠ Failed to load history: {err}"),
        }
    }

    fn export(&mut self) {
        let path = PathBuf::from(EXPORT_PATH);
        match crate::store::export_json(self.service.store(), &path) {
            Ok(bundle) => {
                self.status = format!(
                    "Exported {} user(s), {} row(s) to {}",
                    bundle.users.len(),
                    bundle.history.len(),
                    path.display()
                );
            }
            Err(err) => self.status = format!("⚠ Export failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if let Some(form) = &self.form {
            draw_form(frame, size, form);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let session = self.session.snapshot();
        let who = match (session.username(), self.service.gate().remaining(&session)) {
            (Some(username), _) => format!("Signed in as {username} | history is saved"),
            (None, Some(left)) => format!(
                "Guest | {left} of {} conversions left | s sign up, l log in",
                self.service.gate().guest_limit()
            ),
            (None, None) => "Guest".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("uconv", Style::default().fg(Color::Cyan)),
                Span::raw(" | unit converter"),
            ]),
            Line::from(Span::styled(who, Style::default().fg(Color::Gray))),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(22),
                Constraint::Percentage(38),
                Constraint::Percentage(40),
            ])
            .split(area);

        self.draw_list(
            frame,
            columns[0],
            "Category",
            &self.categories,
            self.category_idx,
            self.focus == Focus::Category,
        );
        self.draw_list(
            frame,
            columns[1],
            "Conversion",
            &self.directions,
            self.direction_idx,
            self.focus == Focus::Direction,
        );

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
            .split(columns[2]);

        self.draw_value(frame, right[0]);
        self.draw_result(frame, right[1]);
        self.draw_history(frame, right[2]);
    }

    fn draw_list(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        items: &[&str],
        selected: usize,
        focused: bool,
    ) {
        let items: Vec<ListItem> = items.iter().map(|s| ListItem::new(*s)).collect();
        let list = List::new(items)
            .block(panel(title, focused))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_value(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Value;
        let mut text = self.value_input.clone();
        if focused {
            text.push('▏');
        }
        let p = Paragraph::new(text).block(panel("Value", focused));
        frame.render_widget(p, area);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (text, style) = match &self.last_result {
            Some(result) => (result.clone(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            None => ("-".to_string(), Style::default().fg(Color::Gray)),
        };
        let p = Paragraph::new(text).style(style).block(panel("Result", false));
        frame.render_widget(p, area);
    }

    fn draw_history(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = panel("Your Conversion History", false);

        if !self.session.snapshot().is_authenticated() {
            let p = Paragraph::new("Log in to keep a history of your conversions.")
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        if !self.show_history {
            let p = Paragraph::new("Hidden (h to show).")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        if self.history.is_empty() {
            let p = Paragraph::new("No history found.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        // Newest first.
        let items: Vec<ListItem> = self
            .history
            .iter()
            .rev()
            .map(|r| {
                ListItem::new(format!(
                    "{}: {} -> {}",
                    r.record.direction,
                    fmt_value(r.record.input),
                    fmt_value(r.record.output)
                ))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab focus  ↑/↓ select  Enter convert  l login  s signup  o logout  h history  x export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_form(frame: &mut ratatui::Frame<'_>, area: Rect, form: &AuthForm) {
    let title = match form.kind {
        FormKind::Login => "Log in",
        FormKind::Signup => "Sign up",
    };
    let rect = centered_rect(area, 44, 6);
    frame.render_widget(Clear, rect);

    let field = |label: &str, value: String, active: bool| {
        let style = if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![Span::styled(format!("{label:<10}"), style), Span::raw(value)])
    };

    let lines = vec![
        field("Username", form.username.clone(), !form.on_password),
        field("Password", "*".repeat(form.password.chars().count()), form.on_password),
        Line::from(""),
        Line::from(Span::styled("Enter submit  Esc cancel", Style::default().fg(Color::Gray))),
    ];
    let p = Paragraph::new(Text::from(lines)).block(panel(title, true));
    frame.render_widget(p, rect);
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(style)
}

fn is_value_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

/// Clamp `current + delta` to `0..len`.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
