//! Ratatui interface for patentdesk.
//!
//! The TUI owns no domain state of its own: every edit is forwarded to the
//! [`PortfolioController`] as a [`UiEvent`] and every frame is drawn from its [`ViewModel`].

use std::cmp::Ordering;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rapidfuzz::fuzz;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;
use thiserror::Error;
use tracing::warn;

use crate::icons::icon_glyph;
use crate::patentdesk_core::{
    ActionId, AuthMode, ControllerError, DraftField, FieldId, FormState, PatentRecord,
    PatentStatus, PortfolioController, UiEvent, ViewModel, MAX_RELEVANCE,
};

/// Key handling modes for the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Company,
    Relevance,
    Picker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Catalog,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerItemId {
    Company(String),
    AllCompanies,
}

#[derive(Debug, Clone)]
pub struct PickerItem {
    pub label: String,
    pub id: PickerItemId,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct PickerState {
    pub query: InputState,
    pub items: Vec<PickerItem>,
    pub filtered: Vec<usize>,
    pub selected: usize,
}

impl PickerState {
    pub fn new(items: Vec<PickerItem>) -> Self {
        let mut picker =
            Self { query: InputState::default(), items, filtered: Vec::new(), selected: 0 };
        picker.recompute();
        picker
    }

    fn recompute(&mut self) {
        let query = self.query.buffer.trim();
        if query.is_empty() {
            self.filtered = (0..self.items.len()).collect();
        } else {
            self.filtered = fuzzy_rank_items(&self.items, query);
        }
        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }

    fn move_selection(&mut self, delta: i32) {
        self.selected = step_index(self.selected, delta, self.filtered.len());
    }

    fn selected_item(&self) -> Option<&PickerItem> {
        let idx = *self.filtered.get(self.selected)?;
        self.items.get(idx)
    }
}

/// Input buffer with a cursor.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub buffer: String,
    pub cursor: usize,
}

impl InputState {
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn insert_str(&mut self, value: &str) {
        if self.cursor >= self.buffer.len() {
            self.buffer.push_str(value);
            self.cursor = self.buffer.len();
            return;
        }
        self.buffer.insert_str(self.cursor, value);
        self.cursor += value.len();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 || self.buffer.is_empty() {
            return;
        }
        let prev = self.buffer[..self.cursor].chars().next_back().map_or(0, char::len_utf8);
        self.cursor -= prev;
        self.buffer.remove(self.cursor);
    }
}

/// TUI options resolved by the CLI.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    pub max_input_len: usize,
    pub relevance_step: u8,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { max_input_len: 265, relevance_step: 5 }
    }
}

/// View-only state: selection, focus and input modes.
#[derive(Debug, Clone)]
pub struct TuiState {
    pub mode: Mode,
    pub focus: FocusPane,
    pub selected: usize,
    pub log_selected: usize,
    pub auth_field: AuthField,
    pub form_field: DraftField,
    pub picker: Option<PickerState>,
    pub show_help: bool,
    pub notice: Option<String>,
    pub last_yank: Option<String>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            focus: FocusPane::Catalog,
            selected: 0,
            log_selected: 0,
            auth_field: AuthField::Username,
            form_field: DraftField::Title,
            picker: None,
            show_help: false,
            notice: None,
            last_yank: None,
        }
    }
}

/// Clipboard abstraction for yank support.
pub trait Clipboard: Send {
    fn set(&mut self, contents: &str) -> Result<(), TuiError>;
}

/// System clipboard using arboard.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn ensure(&mut self) -> Result<&mut arboard::Clipboard, TuiError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        Ok(self.inner.insert(clipboard))
    }
}

impl Clipboard for SystemClipboard {
    fn set(&mut self, contents: &str) -> Result<(), TuiError> {
        let clipboard = self.ensure()?;
        clipboard.set_text(contents.to_string()).map_err(TuiError::Clipboard)
    }
}

/// Actions the runtime has to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
}

/// Errors raised by the TUI.
#[derive(Debug, Error)]
pub enum TuiError {
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("no selected entry")]
    NoSelection,
}

/// Main TUI container.
pub struct Tui {
    pub config: TuiConfig,
    pub state: TuiState,
    controller: PortfolioController,
    clipboard: Box<dyn Clipboard>,
    catalog_area: Option<Rect>,
    catalog_offset: usize,
}

impl Tui {
    pub fn new(config: TuiConfig, controller: PortfolioController) -> Self {
        Self::with_clipboard(config, controller, Box::new(SystemClipboard::new()))
    }

    pub fn with_clipboard(
        config: TuiConfig,
        controller: PortfolioController,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        Self {
            config,
            state: TuiState::default(),
            controller,
            clipboard,
            catalog_area: None,
            catalog_offset: 0,
        }
    }

    pub fn controller(&self) -> &PortfolioController {
        &self.controller
    }

    fn stack_panes_vertically(&self, area: Rect) -> bool {
        area.width < 100
    }

    fn dispatch(&mut self, event: UiEvent) {
        if let Err(error) = self.controller.dispatch(event) {
            self.report(error);
        }
        self.clamp_selection();
    }

    fn report(&mut self, error: ControllerError) {
        match error {
            // Shown by the auth screen and the entry form themselves.
            ControllerError::Auth(_) | ControllerError::Log(_) => {}
            other => {
                warn!(error = %other, "ui event rejected");
                self.state.notice = Some(other.to_string());
            }
        }
    }

    fn quit(&self) -> Action {
        Action::Quit
    }

    pub fn selected_record(&self) -> Option<&PatentRecord> {
        self.controller.visible_records().get(self.state.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.visible_records().len();
        if len == 0 {
            self.state.selected = 0;
        } else if self.state.selected >= len {
            self.state.selected = len - 1;
        }
        let log_len = self.controller.log().len();
        if log_len == 0 {
            self.state.log_selected = 0;
        } else if self.state.log_selected >= log_len {
            self.state.log_selected = log_len - 1;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') | KeyCode::Char('C') = key.code {
                return self.quit();
            }
        }

        if self.controller.is_locked() {
            return self.handle_auth(key);
        }
        if self.controller.log().form().is_open() {
            return self.handle_form(key);
        }
        if self.controller.detail().selected_id().is_some() {
            return self.handle_detail(key);
        }
        if self.state.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.state.show_help = false;
            }
            return Action::None;
        }

        match self.state.mode {
            Mode::Normal => self.handle_normal(key),
            Mode::Search => self.handle_text_mode(key, FieldId::SearchQuery),
            Mode::Company => self.handle_text_mode(key, FieldId::CompanyFilter),
            Mode::Relevance => self.handle_text_mode(key, FieldId::MinRelevance),
            Mode::Picker => self.handle_picker(key),
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) -> Action {
        if self.controller.is_locked()
            || self.controller.log().form().is_open()
            || self.state.picker.is_some()
        {
            return Action::None;
        }
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return Action::None;
        }
        let Some(area) = self.catalog_area else {
            return Action::None;
        };
        // Border plus header row.
        let first_row = area.y.saturating_add(2);
        let last_row = area.y.saturating_add(area.height).saturating_sub(1);
        if event.column <= area.x
            || event.column >= area.x.saturating_add(area.width).saturating_sub(1)
            || event.row < first_row
            || event.row >= last_row
        {
            return Action::None;
        }

        let idx = self.catalog_offset + usize::from(event.row - first_row);
        let Some(id) = self.controller.visible_records().get(idx).map(|record| record.id.clone())
        else {
            return Action::None;
        };
        self.state.focus = FocusPane::Catalog;
        self.state.selected = idx;
        self.dispatch(UiEvent::RowClicked(id));
        Action::None
    }

    fn handle_auth(&mut self, key: KeyEvent) -> Action {
        let field_id = match self.state.auth_field {
            AuthField::Username => FieldId::Username,
            AuthField::Password => FieldId::Password,
        };
        match key {
            KeyEvent { code: KeyCode::Esc, .. } => return self.quit(),
            KeyEvent { code: KeyCode::Char('r'), modifiers, .. }
                if modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.dispatch(UiEvent::ButtonClicked(ActionId::SwitchAuthMode));
            }
            KeyEvent { code: KeyCode::F(2), .. } => {
                self.dispatch(UiEvent::ButtonClicked(ActionId::SwitchAuthMode));
            }
            KeyEvent { code: KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down, .. } => {
                self.state.auth_field = match self.state.auth_field {
                    AuthField::Username => AuthField::Password,
                    AuthField::Password => AuthField::Username,
                };
            }
            KeyEvent { code: KeyCode::Enter, .. } => {
                let action = match self.controller.session().mode() {
                    AuthMode::Login => ActionId::Login,
                    AuthMode::Register => ActionId::Register,
                };
                self.dispatch(UiEvent::ButtonClicked(action));
                self.state.auth_field = if self.controller.credentials().username.is_empty() {
                    AuthField::Username
                } else {
                    AuthField::Password
                };
                if !self.controller.is_locked() {
                    self.state = TuiState::default();
                }
            }
            _ => {
                let credentials = self.controller.credentials();
                let current = match field_id {
                    FieldId::Username => credentials.username.as_str(),
                    _ => credentials.password.as_str(),
                };
                if let Some(next) = edit_text(current, key, self.config.max_input_len) {
                    self.dispatch(UiEvent::TextChanged(field_id, next));
                }
            }
        }
        Action::None
    }

    fn handle_form(&mut self, key: KeyEvent) -> Action {
        let field = self.state.form_field;
        match key {
            KeyEvent { code: KeyCode::Esc, .. } => {
                self.dispatch(UiEvent::ButtonClicked(ActionId::CancelForm));
                self.state.form_field = DraftField::Title;
            }
            KeyEvent { code: KeyCode::Tab | KeyCode::Down, .. } => {
                self.state.form_field = field.next();
            }
            KeyEvent { code: KeyCode::BackTab | KeyCode::Up, .. } => {
                self.state.form_field = field.prev();
            }
            KeyEvent { code: KeyCode::Enter, .. } => {
                self.dispatch(UiEvent::ButtonClicked(ActionId::SubmitForm));
                if !self.controller.log().form().is_open() {
                    self.state.form_field = DraftField::Title;
                    if let Some(entry) = self.controller.log().list_all().last() {
                        self.state.notice = Some(format!("Logged {}", entry.record.id));
                    }
                    self.state.log_selected = self.controller.log().len().saturating_sub(1);
                }
            }
            _ => {
                let current = self
                    .controller
                    .log()
                    .form()
                    .draft()
                    .map(|draft| draft.get(field))
                    .unwrap_or_default();
                if let Some(next) = edit_text(current, key, self.config.max_input_len) {
                    self.dispatch(UiEvent::TextChanged(FieldId::Draft(field), next));
                }
            }
        }
        Action::None
    }

    fn handle_detail(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                self.dispatch(UiEvent::ButtonClicked(ActionId::CloseDetail));
            }
            KeyCode::Char('y') => self.yank_and_report(),
            _ => {}
        }
        Action::None
    }

    fn handle_normal(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::None;
        }
        self.state.notice = None;
        match key.code {
            KeyCode::Char('q') => return self.quit(),
            KeyCode::Char('?') => self.state.show_help = true,
            KeyCode::Char('/') => self.state.mode = Mode::Search,
            KeyCode::Char('c') => self.state.mode = Mode::Company,
            KeyCode::Char('C') => self.open_company_picker(),
            KeyCode::Char('m') => self.state.mode = Mode::Relevance,
            KeyCode::Char('a') => {
                let checked = !self.controller.filters().active_only;
                self.dispatch(UiEvent::CheckboxToggled(FieldId::ActiveOnly, checked));
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.bump_relevance(1),
            KeyCode::Char('-') => self.bump_relevance(-1),
            KeyCode::Char('u') => self.dispatch(UiEvent::ButtonClicked(ActionId::ResetFilters)),
            KeyCode::Char('i') => self.dispatch(UiEvent::ButtonClicked(ActionId::ToggleInsights)),
            KeyCode::Char('n') => {
                self.state.form_field = DraftField::Title;
                self.dispatch(UiEvent::ButtonClicked(ActionId::OpenForm));
            }
            KeyCode::Char('L') => {
                self.dispatch(UiEvent::ButtonClicked(ActionId::Logout));
                self.state = TuiState::default();
            }
            KeyCode::Char('y') => self.yank_and_report(),
            KeyCode::Tab => {
                self.state.focus = match self.state.focus {
                    FocusPane::Catalog => FocusPane::Log,
                    FocusPane::Log => FocusPane::Catalog,
                };
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.move_selection(i32::MIN),
            KeyCode::Char('G') | KeyCode::End => self.move_selection(i32::MAX),
            KeyCode::Enter => {
                if self.state.focus == FocusPane::Catalog {
                    if let Some(id) = self.selected_record().map(|record| record.id.clone()) {
                        self.dispatch(UiEvent::RowClicked(id));
                    }
                }
            }
            _ => {}
        }
        Action::None
    }

    fn handle_text_mode(&mut self, key: KeyEvent, field: FieldId) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.state.mode = Mode::Normal;
            }
            _ => {
                let filters = self.controller.filters();
                let current = match field {
                    FieldId::SearchQuery => filters.query.as_str(),
                    FieldId::CompanyFilter => filters.company_filter.as_str(),
                    _ => filters.min_relevance.raw(),
                };
                if let Some(next) = edit_text(current, key, self.config.max_input_len) {
                    self.dispatch(UiEvent::TextChanged(field, next));
                }
            }
        }
        Action::None
    }

    fn handle_picker(&mut self, key: KeyEvent) -> Action {
        let mut chosen = None;
        let mut close = false;
        {
            let Some(picker) = self.state.picker.as_mut() else {
                self.state.mode = Mode::Normal;
                return Action::None;
            };

            match key {
                KeyEvent { code: KeyCode::Esc, .. } => close = true,
                KeyEvent { code: KeyCode::Enter, .. } => {
                    chosen = picker.selected_item().map(|item| item.id.clone());
                    close = true;
                }
                KeyEvent { code: KeyCode::Down, .. } => picker.move_selection(1),
                KeyEvent { code: KeyCode::Up, .. } => picker.move_selection(-1),
                KeyEvent { code: KeyCode::Backspace, .. } => {
                    picker.query.backspace();
                    picker.recompute();
                }
                KeyEvent { code: KeyCode::Char(c), modifiers, .. }
                    if !modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    if picker.query.buffer.len() < self.config.max_input_len {
                        picker.query.insert_str(&c.to_string());
                    }
                    picker.recompute();
                }
                _ => {}
            }
        }

        if let Some(item) = chosen {
            let company = match item {
                PickerItemId::Company(name) => name,
                PickerItemId::AllCompanies => String::new(),
            };
            self.dispatch(UiEvent::TextChanged(FieldId::CompanyFilter, company));
        }
        if close {
            self.state.picker = None;
            self.state.mode = Mode::Normal;
        }
        Action::None
    }

    fn open_company_picker(&mut self) {
        let current = self.controller.filters().company_filter.clone();
        let mut items = vec![PickerItem {
            label: "All Companies".to_string(),
            id: PickerItemId::AllCompanies,
            active: current.is_empty(),
        }];
        items.extend(self.controller.catalog().companies().into_iter().map(|company| {
            PickerItem {
                label: company.to_string(),
                id: PickerItemId::Company(company.to_string()),
                active: company == current,
            }
        }));
        self.state.picker = Some(PickerState::new(items));
        self.state.mode = Mode::Picker;
    }

    fn bump_relevance(&mut self, direction: i32) {
        let step = f64::from(self.config.relevance_step) * f64::from(direction.signum());
        let current = self.controller.filters().min_relevance.threshold();
        let next = (current + step).clamp(0.0, f64::from(MAX_RELEVANCE)).round();
        self.dispatch(UiEvent::NumberChanged(FieldId::MinRelevance, next));
    }

    fn move_selection(&mut self, delta: i32) {
        match self.state.focus {
            FocusPane::Catalog => {
                let len = self.controller.visible_records().len();
                self.state.selected = step_index(self.state.selected, delta, len);
            }
            FocusPane::Log => {
                let len = self.controller.log().len();
                self.state.log_selected = step_index(self.state.log_selected, delta, len);
            }
        }
    }

    fn yank_and_report(&mut self) {
        match self.yank_selected() {
            Ok(()) => {
                self.state.notice = self.state.last_yank.as_ref().map(|text| format!("Copied {text}"));
            }
            Err(error) => {
                warn!(error = %error, "yank failed");
                self.state.notice = Some(error.to_string());
            }
        }
    }

    fn yank_selected(&mut self) -> Result<(), TuiError> {
        let contents = match self.state.focus {
            FocusPane::Catalog => {
                let record = self
                    .controller
                    .detail()
                    .selected_id()
                    .and_then(|id| self.controller.catalog().get(id))
                    .or_else(|| self.selected_record())
                    .ok_or(TuiError::NoSelection)?;
                record_summary(record)
            }
            FocusPane::Log => {
                let entry = self
                    .controller
                    .log()
                    .list_all()
                    .get(self.state.log_selected)
                    .ok_or(TuiError::NoSelection)?;
                record_summary(&entry.record)
            }
        };
        self.clipboard.set(&contents)?;
        self.state.last_yank = Some(contents);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        if self.controller.is_locked() {
            self.catalog_area = None;
            self.render_auth(frame);
            return;
        }

        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(2)])
            .split(size);

        self.render_top_bar(frame, chunks[0]);
        self.render_main(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);

        let view = self.controller.view();
        if let FormState::Open(_) = view.form {
            self.render_form(frame, &view);
        } else if let Some(record) = view.selected {
            self.render_detail(frame, record);
        } else if self.state.picker.is_some() {
            self.render_picker(frame);
        } else if self.state.show_help {
            self.render_help(frame);
        }
    }

    fn modal_open(&self) -> bool {
        self.state.picker.is_some()
            || self.state.show_help
            || self.controller.log().form().is_open()
            || self.controller.detail().selected_id().is_some()
    }

    fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    fn panel_title_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        }
    }

    fn key_style(&self) -> Style {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }

    fn dimmed_style(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    fn render_auth(&self, frame: &mut Frame<'_>) {
        let view = self.controller.view();
        let area = centered_rect(50, 40, frame.area());
        frame.render_widget(Clear, area);

        let title = format!("─ {} Patent Portfolio · {} ─", icon("shield"), view.auth_mode.label());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(self.panel_border_style(true))
            .title_style(self.panel_title_style(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let field_line = |label: &str, value: String, active: bool| {
            let style = if active {
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default()
            };
            let display = if value.is_empty() { " ".to_string() } else { value };
            Line::from(vec![Span::raw(format!("{label:<10}")), Span::styled(display, style)])
        };

        let mut text = vec![
            Line::from(""),
            field_line(
                &format!("{} User", icon("user")),
                view.credentials.username.clone(),
                self.state.auth_field == AuthField::Username,
            ),
            field_line(
                "  Password",
                "•".repeat(view.credentials.password.chars().count()),
                self.state.auth_field == AuthField::Password,
            ),
            Line::from(""),
        ];
        if let Some(error) = &view.auth_error {
            text.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
            text.push(Line::from(""));
        }
        let other_mode = match view.auth_mode {
            AuthMode::Login => "register",
            AuthMode::Register => "log in",
        };
        text.push(Line::from(vec![
            Span::styled("Enter", self.key_style()),
            Span::styled(format!(": {}  ", view.auth_mode.label().to_lowercase()), self.dimmed_style()),
            Span::styled("Tab", self.key_style()),
            Span::styled(": field  ", self.dimmed_style()),
            Span::styled("Ctrl-R", self.key_style()),
            Span::styled(format!(": {other_mode}  "), self.dimmed_style()),
            Span::styled("Esc", self.key_style()),
            Span::styled(": quit", self.dimmed_style()),
        ]));

        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
    }

    fn render_top_bar(&self, frame: &mut Frame<'_>, area: Rect) {
        let focused =
            matches!(self.state.mode, Mode::Search | Mode::Company | Mode::Relevance) && !self.modal_open();
        let filters = self.controller.filters();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("───── {} Patent Search ", icon("search")))
            .border_style(self.panel_border_style(focused))
            .title_style(self.panel_title_style(focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let active_style = Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD);
        let field_style = |mode: Mode| {
            if self.state.mode == mode {
                active_style
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            }
        };
        let company = if filters.company_filter.is_empty() {
            "All Companies"
        } else {
            filters.company_filter.as_str()
        };
        let mut spans = vec![
            Span::styled(format!(" {} ", filters.query), field_style(Mode::Search)),
            Span::raw("  "),
            Span::styled(format!("{} ", icon("filter")), self.dimmed_style()),
            Span::styled(format!(" {company} "), field_style(Mode::Company)),
            Span::raw("  "),
            Span::raw(if filters.active_only { "[x] Active only" } else { "[ ] Active only" }),
            Span::raw("  "),
            Span::styled(format!("{} Min ", icon("trend")), self.dimmed_style()),
            Span::styled(format!(" {} ", filters.min_relevance.raw()), field_style(Mode::Relevance)),
        ];
        if !filters.min_relevance.is_numeric() {
            spans.push(Span::styled(" (treated as 0)", Style::default().fg(Color::Yellow)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Left), inner);
    }

    fn render_main(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let direction = if self.stack_panes_vertically(area) {
            Direction::Vertical
        } else {
            Direction::Horizontal
        };
        let chunks = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        self.render_catalog(frame, chunks[0]);

        let view = self.controller.view();
        if let Some(insights) = &view.insights {
            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(8), Constraint::Min(0)])
                .split(chunks[1]);
            let lines = vec![
                Line::from(format!("Visible      {}", insights.total)),
                Line::from(format!(
                    "Active {} · Pending {} · Inactive {}",
                    insights.active, insights.pending, insights.inactive
                )),
                Line::from(format!(
                    "Mean score   {}",
                    insights.mean_relevance.map_or("-".to_string(), |mean| format!("{mean:.1}%"))
                )),
                Line::from(format!(
                    "Top company  {}",
                    insights
                        .top_company
                        .as_ref()
                        .map_or("-".to_string(), |(name, count)| format!("{name} ({count})"))
                )),
            ];
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("─ {} Insights ", icon("trend")))
                .border_style(self.panel_border_style(false))
                .title_style(self.panel_title_style(false));
            frame.render_widget(Paragraph::new(lines).block(block), right[0]);
            self.render_log(frame, right[1], &view);
        } else {
            self.render_log(frame, chunks[1], &view);
        }
    }

    fn render_catalog(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let focused = self.state.mode == Mode::Normal
            && self.state.focus == FocusPane::Catalog
            && !self.modal_open();
        let view = self.controller.view();
        let total = view.visible.len();
        let pos = if total == 0 { 0 } else { self.state.selected.saturating_add(1).min(total) };

        let header = Row::new(["Patent ID", "Title", "Company", "Filing Date", "Status", "Relevance"])
            .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Blue));
        let rows: Vec<Row> = view
            .visible
            .iter()
            .map(|record| {
                Row::new(vec![
                    Cell::from(record.id.clone()),
                    Cell::from(record.title.clone()),
                    Cell::from(record.company.clone()),
                    Cell::from(record.filing_date.clone()),
                    Cell::from(Span::styled(record.status.as_str(), status_style(record.status))),
                    Cell::from(format!("{}%", record.relevance_score)),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(9),
            Constraint::Min(20),
            Constraint::Min(12),
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Length(9),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("─ {} Catalog ", icon("document")))
            .title_bottom(Line::from(format!("─ {pos} of {total} (catalog {}) ─", view.catalog_len)).right_aligned())
            .border_style(self.panel_border_style(focused))
            .title_style(self.panel_title_style(focused));
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default().fg(Color::Black).bg(Color::Gray).add_modifier(Modifier::BOLD),
            );

        let mut table_state = TableState::default().with_offset(self.catalog_offset);
        if total > 0 {
            table_state.select(Some(self.state.selected));
        }
        drop(view);
        frame.render_stateful_widget(table, area, &mut table_state);
        self.catalog_offset = table_state.offset();
        self.catalog_area = Some(area);
    }

    fn render_log(&self, frame: &mut Frame<'_>, area: Rect, view: &ViewModel<'_>) {
        let focused = self.state.mode == Mode::Normal
            && self.state.focus == FocusPane::Log
            && !self.modal_open();
        let items: Vec<ListItem> = view
            .log
            .iter()
            .map(|entry| {
                let by = entry
                    .submitted_by
                    .as_ref()
                    .map(|user| format!(" · {user}"))
                    .unwrap_or_default();
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(entry.record.id.clone(), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(" "),
                        Span::raw(entry.record.title.clone()),
                    ]),
                    Line::from(Span::styled(
                        format!(
                            "  {} · {} · {}% · {}{by}",
                            entry.record.company,
                            entry.inventor,
                            entry.record.relevance_score,
                            entry.record.filing_date
                        ),
                        self.dimmed_style(),
                    )),
                ])
            })
            .collect();
        let empty = items.is_empty();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("─ {} Session Log ({}) ", icon("list"), view.log.len()))
            .border_style(self.panel_border_style(focused))
            .title_style(self.panel_title_style(focused));

        if empty {
            let hint = Paragraph::new(Line::from(vec![
                Span::styled("n", self.key_style()),
                Span::styled(": log a new patent", self.dimmed_style()),
            ]))
            .block(block);
            frame.render_widget(hint, area);
            return;
        }

        let mut state = ListState::default();
        state.select(Some(self.state.log_selected));
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame<'_>, area: Rect) {
        let view = self.controller.view();
        let key_style = self.key_style();
        let dim = self.dimmed_style();
        let hints: &[(&str, &str)] = match self.state.mode {
            Mode::Normal => &[
                ("/", "search"),
                ("c/C", "company"),
                ("a", "active"),
                ("+/-/m", "relevance"),
                ("n", "new"),
                ("i", "insights"),
                ("?", "help"),
                ("q", "quit"),
            ],
            Mode::Search | Mode::Company | Mode::Relevance => &[("Enter/Esc", "done")],
            Mode::Picker => &[("Enter", "select"), ("Esc", "close")],
        };
        let mut spans = Vec::new();
        for (key, label) in hints {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::styled(format!(" {label}  "), dim));
        }
        if let Some(user) = view.current_user {
            spans.push(Span::raw(format!("{} {user}", icon("user"))));
        }
        let mut lines = vec![Line::from(spans)];
        if let Some(notice) = &self.state.notice {
            lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Yellow))));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_detail(&self, frame: &mut Frame<'_>, record: &PatentRecord) {
        let area = centered_rect(60, 45, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("─ Patent Details ─")
            .border_style(self.panel_border_style(true))
            .title_style(self.panel_title_style(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let row = |label: &'static str, value: Span<'static>| {
            Line::from(vec![Span::styled(format!("{label:<17}"), bold), value])
        };
        let text = vec![
            row("ID:", Span::raw(record.id.clone())),
            row("Title:", Span::raw(record.title.clone())),
            row("Company:", Span::raw(record.company.clone())),
            row("Filing Date:", Span::raw(record.filing_date.clone())),
            row("Status:", Span::styled(record.status.as_str(), status_style(record.status))),
            row("Relevance Score:", Span::raw(format!("{}%", record.relevance_score))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Esc", self.key_style()),
                Span::styled(": close  ", self.dimmed_style()),
                Span::styled("y", self.key_style()),
                Span::styled(": copy", self.dimmed_style()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
    }

    fn render_form(&self, frame: &mut Frame<'_>, view: &ViewModel<'_>) {
        let Some(draft) = view.form.draft() else {
            return;
        };
        let area = centered_rect(64, 55, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("─ {} Log New Patent ─", icon("document")))
            .border_style(self.panel_border_style(true))
            .title_style(self.panel_title_style(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut text = Vec::new();
        for field in DraftField::ALL {
            let value = draft.get(field);
            let active = field == self.state.form_field;
            let style = if active {
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if field.is_required() { "*" } else { " " };
            let display = if value.is_empty() && field == DraftField::FilingDate && !active {
                Span::styled("today", self.dimmed_style())
            } else if value.is_empty() {
                Span::styled(" ", style)
            } else {
                Span::styled(value.to_string(), style)
            };
            text.push(Line::from(vec![Span::raw(format!("{marker}{:<12}", field.label())), display]));
        }
        text.push(Line::from(""));
        if let Some(error) = &view.form_error {
            text.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
            text.push(Line::from(""));
        }
        text.push(Line::from(vec![
            Span::styled("Enter", self.key_style()),
            Span::styled(": submit  ", self.dimmed_style()),
            Span::styled("Tab", self.key_style()),
            Span::styled(": next field  ", self.dimmed_style()),
            Span::styled("Esc", self.key_style()),
            Span::styled(": cancel", self.dimmed_style()),
        ]));
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
    }

    fn render_picker(&self, frame: &mut Frame<'_>) {
        let Some(picker) = &self.state.picker else {
            return;
        };
        let area = centered_rect(50, 50, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("─ {} Company ─", icon("filter")))
            .border_style(self.panel_border_style(true))
            .title_style(self.panel_title_style(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        let query = if picker.query.buffer.is_empty() { " " } else { picker.query.buffer.as_str() };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("› ", self.dimmed_style()),
                Span::styled(query.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            ])),
            chunks[0],
        );

        let items: Vec<ListItem> = picker
            .filtered
            .iter()
            .filter_map(|idx| picker.items.get(*idx))
            .map(|item| {
                let marker = if item.active { "● " } else { "  " };
                ListItem::new(format!("{marker}{}", item.label))
            })
            .collect();
        let mut state = ListState::default();
        if !picker.filtered.is_empty() {
            state.select(Some(picker.selected));
        }
        let list = List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn render_help(&self, frame: &mut Frame<'_>) {
        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("─ Keybindings ─")
            .border_style(self.panel_border_style(true))
            .title_style(self.panel_title_style(true));
        let bindings = [
            ("/", "search titles"),
            ("c", "type a company filter"),
            ("C", "pick a company"),
            ("a", "toggle active only"),
            ("+ / -", "raise / lower min relevance"),
            ("m", "type min relevance"),
            ("u", "reset search and filters"),
            ("j / k", "move selection"),
            ("Enter", "open patent details"),
            ("Tab", "switch catalog / log"),
            ("n", "log a new patent"),
            ("i", "toggle insights"),
            ("y", "copy selected patent"),
            ("L", "log out"),
            ("q", "quit"),
        ];
        let lines: Vec<Line> = bindings
            .iter()
            .map(|(key, label)| {
                Line::from(vec![
                    Span::styled(format!("{key:<8}"), self.key_style()),
                    Span::raw(*label),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn icon(name: &str) -> &'static str {
    icon_glyph(name).unwrap_or("•")
}

fn status_style(status: PatentStatus) -> Style {
    match status {
        PatentStatus::Active => Style::default().fg(Color::Green),
        PatentStatus::Pending => Style::default().fg(Color::Yellow),
        PatentStatus::Inactive => Style::default().fg(Color::DarkGray),
    }
}

fn record_summary(record: &PatentRecord) -> String {
    format!("{} {} ({})", record.id, record.title, record.company)
}

/// Applies an editing key to `current`, returning the new text if it changed.
fn edit_text(current: &str, key: KeyEvent, max_len: usize) -> Option<String> {
    match key {
        KeyEvent { code: KeyCode::Backspace, .. } => {
            let mut next = current.to_string();
            next.pop()?;
            Some(next)
        }
        KeyEvent { code: KeyCode::Char(c), modifiers, .. }
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if current.len() + c.len_utf8() > max_len {
                return None;
            }
            let mut next = current.to_string();
            next.push(c);
            Some(next)
        }
        _ => None,
    }
}

fn step_index(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + i64::from(delta);
    next.clamp(0, len as i64 - 1) as usize
}

pub fn fuzzy_rank_items(items: &[PickerItem], query: &str) -> Vec<usize> {
    let query_lower = query.to_lowercase();
    let threshold = if query_lower.len() <= 2 { 0.2 } else { 0.35 };

    let mut scored: Vec<(usize, f64)> = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let candidate = item.label.to_lowercase();
            if candidate.contains(&query_lower) {
                return Some((idx, 1.0));
            }
            let score = fuzz::ratio(query_lower.chars(), candidate.chars());
            (score >= threshold).then_some((idx, score))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });

    scored.into_iter().map(|(idx, _)| idx).collect()
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

impl fmt::Debug for Tui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tui").field("state", &self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patentdesk_core::{Catalog, ControllerOptions};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockClipboard {
        value: Arc<Mutex<String>>,
    }

    impl Clipboard for MockClipboard {
        fn set(&mut self, contents: &str) -> Result<(), TuiError> {
            *self.value.lock().expect("lock clipboard") = contents.to_string();
            Ok(())
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent { code, modifiers, kind: KeyEventKind::Press, state: KeyEventState::empty() }
    }

    fn press(tui: &mut Tui, code: KeyCode) -> Action {
        tui.handle_key(key(code, KeyModifiers::NONE))
    }

    fn type_str(tui: &mut Tui, text: &str) {
        for c in text.chars() {
            press(tui, KeyCode::Char(c));
        }
    }

    fn make_tui() -> (Tui, Arc<Mutex<String>>) {
        let value = Arc::new(Mutex::new(String::new()));
        let clipboard = MockClipboard { value: value.clone() };
        let options = ControllerOptions { require_login: true, score_seed: Some(3) };
        let controller = PortfolioController::new(Catalog::builtin(), options);
        let tui = Tui::with_clipboard(TuiConfig::default(), controller, Box::new(clipboard));
        (tui, value)
    }

    fn logged_in_tui() -> (Tui, Arc<Mutex<String>>) {
        let (mut tui, clipboard) = make_tui();
        tui.controller.register("alice", "p1").expect("register");
        tui.controller.login("alice", "p1").expect("login");
        (tui, clipboard)
    }

    fn render_once(tui: &mut Tui) {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| tui.render(frame)).expect("draw");
    }

    fn rendered_text(tui: &mut Tui) -> String {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| tui.render(frame)).expect("draw");
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    fn visible_ids(tui: &Tui) -> Vec<String> {
        tui.controller().visible_records().iter().map(|r| r.id.clone()).collect()
    }

    #[rstest]
    fn register_then_login_with_keys() {
        let (mut tui, _) = make_tui();
        render_once(&mut tui);
        type_str(&mut tui, "alice");
        press(&mut tui, KeyCode::Tab);
        type_str(&mut tui, "p1");
        tui.handle_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(tui.controller().session().mode(), AuthMode::Register);
        press(&mut tui, KeyCode::Enter);

        assert_eq!(tui.controller().session().identity_count(), 1);
        assert_eq!(tui.controller().session().mode(), AuthMode::Login);
        assert!(tui.controller().is_locked());
        assert_eq!(tui.state.auth_field, AuthField::Password);

        type_str(&mut tui, "p1");
        press(&mut tui, KeyCode::Enter);
        assert!(!tui.controller().is_locked());
        render_once(&mut tui);
    }

    #[rstest]
    fn wrong_password_keeps_auth_screen() {
        let (mut tui, _) = make_tui();
        tui.controller.register("alice", "p1").unwrap();
        type_str(&mut tui, "alice");
        press(&mut tui, KeyCode::Tab);
        type_str(&mut tui, "nope");
        press(&mut tui, KeyCode::Enter);
        assert!(tui.controller().is_locked());
        assert_eq!(
            tui.controller().view().auth_error.as_deref(),
            Some("invalid username or password")
        );
        render_once(&mut tui);
    }

    #[rstest]
    fn panel_titles_resolve_icons_by_name() {
        let (mut tui, _) = make_tui();
        let auth = rendered_text(&mut tui);
        assert!(auth.contains(icon_glyph("shield").expect("shield")));

        tui.controller.register("alice", "p1").expect("register");
        tui.controller.login("alice", "p1").expect("login");
        let main = rendered_text(&mut tui);
        for name in ["search", "filter", "document", "list", "user"] {
            let glyph = icon_glyph(name).expect("known icon");
            assert!(main.contains(glyph), "{name} glyph missing from main screen");
        }
        assert_eq!(icon("rocket"), "•");
    }

    #[rstest]
    fn esc_on_auth_screen_quits() {
        let (mut tui, _) = make_tui();
        assert_eq!(press(&mut tui, KeyCode::Esc), Action::Quit);
    }

    #[rstest]
    fn search_mode_filters_catalog() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('/'));
        assert_eq!(tui.state.mode, Mode::Search);
        type_str(&mut tui, "NICOTINE");
        assert_eq!(visible_ids(&tui), vec!["P002"]);
        press(&mut tui, KeyCode::Backspace);
        assert_eq!(tui.controller().filters().query, "NICOTIN");
        press(&mut tui, KeyCode::Enter);
        assert_eq!(tui.state.mode, Mode::Normal);
        render_once(&mut tui);
    }

    #[rstest]
    fn a_toggles_active_only_and_clamps_selection() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('G'));
        assert_eq!(tui.state.selected, 2);
        press(&mut tui, KeyCode::Char('a'));
        assert!(tui.controller().filters().active_only);
        assert_eq!(visible_ids(&tui), vec!["P001", "P003"]);
        assert_eq!(tui.state.selected, 1);
    }

    #[rstest]
    fn plus_and_minus_step_relevance_within_bounds() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('-'));
        assert_eq!(tui.controller().filters().min_relevance.raw(), "0");
        for _ in 0..15 {
            press(&mut tui, KeyCode::Char('+'));
        }
        assert_eq!(tui.controller().filters().min_relevance.raw(), "75");
        assert_eq!(visible_ids(&tui), vec!["P001"]);
        for _ in 0..10 {
            press(&mut tui, KeyCode::Char('+'));
        }
        assert_eq!(tui.controller().filters().min_relevance.raw(), "100");
        assert!(visible_ids(&tui).is_empty());
    }

    #[rstest]
    fn typed_relevance_accepts_free_text() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('m'));
        type_str(&mut tui, "7x");
        assert_eq!(tui.controller().filters().min_relevance.raw(), "7x");
        assert_eq!(visible_ids(&tui).len(), 3);
        render_once(&mut tui);
    }

    #[rstest]
    fn company_picker_selects_company() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('C'));
        assert_eq!(tui.state.mode, Mode::Picker);
        render_once(&mut tui);
        type_str(&mut tui, "smart");
        press(&mut tui, KeyCode::Enter);
        assert_eq!(tui.controller().filters().company_filter, "SmartSmoke Technologies");
        assert_eq!(visible_ids(&tui), vec!["P003"]);
        assert!(tui.state.picker.is_none());

        press(&mut tui, KeyCode::Char('C'));
        press(&mut tui, KeyCode::Enter);
        assert!(tui.controller().filters().company_filter.is_empty());
    }

    #[rstest]
    fn enter_opens_detail_and_esc_closes() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('j'));
        press(&mut tui, KeyCode::Enter);
        assert_eq!(tui.controller().detail().selected_id(), Some("P002"));
        render_once(&mut tui);
        press(&mut tui, KeyCode::Esc);
        assert_eq!(tui.controller().detail().selected_id(), None);
    }

    #[rstest]
    fn mouse_click_selects_catalog_row() {
        let (mut tui, _) = logged_in_tui();
        render_once(&mut tui);
        let area = tui.catalog_area.expect("catalog rendered");
        let event = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: area.x + 3,
            row: area.y + 3,
            modifiers: KeyModifiers::NONE,
        };
        tui.handle_mouse(event);
        assert_eq!(tui.state.selected, 1);
        assert_eq!(tui.controller().detail().selected_id(), Some("P002"));
    }

    #[rstest]
    fn form_rejects_blank_fields_then_submits() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('n'));
        assert!(tui.controller().log().form().is_open());
        type_str(&mut tui, "Foldable Drone Arm");
        press(&mut tui, KeyCode::Enter);
        assert!(tui.controller().log().form().is_open());
        assert_eq!(
            tui.controller().view().form_error.as_deref(),
            Some("missing required field: Company")
        );
        render_once(&mut tui);

        press(&mut tui, KeyCode::Tab);
        type_str(&mut tui, "Aerial Co");
        press(&mut tui, KeyCode::Tab);
        type_str(&mut tui, "J. Doe");
        press(&mut tui, KeyCode::Tab);
        type_str(&mut tui, "Folds away");
        press(&mut tui, KeyCode::Enter);

        assert!(!tui.controller().log().form().is_open());
        let log = tui.controller().log().list_all();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].record.title, "Foldable Drone Arm");
        assert_eq!(log[0].record.status, PatentStatus::Pending);
        assert_eq!(tui.state.notice.as_deref(), Some("Logged U001"));
        render_once(&mut tui);
    }

    #[rstest]
    fn esc_cancels_form_without_logging() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('n'));
        type_str(&mut tui, "Draft");
        press(&mut tui, KeyCode::Esc);
        assert!(!tui.controller().log().form().is_open());
        assert!(tui.controller().log().is_empty());
    }

    #[rstest]
    fn y_copies_selected_record() {
        let (mut tui, clipboard) = logged_in_tui();
        press(&mut tui, KeyCode::Char('y'));
        let copied = clipboard.lock().expect("lock").clone();
        assert_eq!(copied, "P001 Vaping Device with Removable Pouch (TechVape Inc.)");
        assert_eq!(tui.state.last_yank.as_deref(), Some(copied.as_str()));
    }

    #[rstest]
    fn yank_on_empty_log_reports_no_selection() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Tab);
        press(&mut tui, KeyCode::Char('y'));
        assert_eq!(tui.state.notice.as_deref(), Some("no selected entry"));
    }

    #[rstest]
    fn insights_and_help_render() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('i'));
        assert!(tui.controller().view().insights.is_some());
        render_once(&mut tui);
        press(&mut tui, KeyCode::Char('?'));
        assert!(tui.state.show_help);
        render_once(&mut tui);
        press(&mut tui, KeyCode::Esc);
        assert!(!tui.state.show_help);
    }

    #[rstest]
    fn u_resets_search_and_filters() {
        let (mut tui, _) = logged_in_tui();
        press(&mut tui, KeyCode::Char('a'));
        press(&mut tui, KeyCode::Char('/'));
        type_str(&mut tui, "zzz");
        press(&mut tui, KeyCode::Esc);
        assert!(visible_ids(&tui).is_empty());
        press(&mut tui, KeyCode::Char('u'));
        assert!(tui.controller().filters().is_default());
        assert_eq!(visible_ids(&tui).len(), 3);
    }

    #[rstest]
    fn shift_l_logs_out() {
        let (mut tui, _) = logged_in_tui();
        tui.handle_key(key(KeyCode::Char('L'), KeyModifiers::SHIFT));
        assert!(tui.controller().is_locked());
        render_once(&mut tui);
    }

    #[rstest]
    fn q_quits() {
        let (mut tui, _) = logged_in_tui();
        assert_eq!(press(&mut tui, KeyCode::Char('q')), Action::Quit);
    }

    #[rstest]
    fn ctrl_c_quits() {
        let (mut tui, _) = make_tui();
        let action = tui.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, Action::Quit);
    }

    #[test]
    fn input_state_backspace_handles_multibyte() {
        let mut input = InputState::default();
        input.insert_str("añ");
        input.backspace();
        assert_eq!(input.buffer, "a");
        assert_eq!(input.cursor, 1);
    }

    #[test]
    fn fuzzy_rank_items_prefers_contains() {
        let items: Vec<PickerItem> = ["TechVape Inc.", "InnoNictech", "SmartSmoke Technologies"]
            .iter()
            .map(|label| PickerItem {
                label: label.to_string(),
                id: PickerItemId::Company(label.to_string()),
                active: false,
            })
            .collect();
        let ranked = fuzzy_rank_items(&items, "tech");
        assert_eq!(ranked[..3], [0, 1, 2]);
        let ranked = fuzzy_rank_items(&items, "smrtsmoke");
        assert_eq!(ranked.first(), Some(&2));
    }

    #[test]
    fn edit_text_respects_max_len() {
        let k = key(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(edit_text("ab", k, 3).as_deref(), Some("abx"));
        assert_eq!(edit_text("abc", k, 3), None);
        assert_eq!(edit_text("", key(KeyCode::Backspace, KeyModifiers::NONE), 3), None);
    }
}
