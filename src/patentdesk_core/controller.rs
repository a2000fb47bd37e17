//! Single owner of session, catalog filter and log state.
//!
//! Front ends feed [`UiEvent`]s in and render the [`ViewModel`] that comes out. Every event is
//! handled to completion before the next one, so there is no interleaving to guard against.

use thiserror::Error;
use tracing::debug;

use super::catalog::Catalog;
use super::filters::{visible_records, CatalogInsights, DetailView, FilterSpec};
use super::log::{DraftField, FormState, LogEntry, LogError, LogMutator, PatentDraft};
use super::session::{AuthError, AuthMode, SessionManager};
use super::types::{Identity, PatentRecord, Username};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldId {
    SearchQuery,
    CompanyFilter,
    ActiveOnly,
    MinRelevance,
    Username,
    Password,
    Draft(DraftField),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionId {
    Login,
    Register,
    SwitchAuthMode,
    Logout,
    OpenForm,
    SubmitForm,
    CancelForm,
    CloseDetail,
    ToggleInsights,
    ResetFilters,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    TextChanged(FieldId, String),
    CheckboxToggled(FieldId, bool),
    NumberChanged(FieldId, f64),
    RowClicked(String),
    ButtonClicked(ActionId),
}

impl UiEvent {
    /// Events that stay available while logged out.
    fn is_auth_event(&self) -> bool {
        match self {
            Self::TextChanged(FieldId::Username | FieldId::Password, _) => true,
            Self::ButtonClicked(
                ActionId::Login | ActionId::Register | ActionId::SwitchAuthMode | ActionId::Logout,
            ) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error("log in to continue")]
    NotAuthenticated,
    #[error("unknown patent id `{id}`")]
    UnknownRecord { id: String },
    #[error("unsupported event: {0}")]
    UnsupportedEvent(String),
}

#[derive(Clone, Debug)]
pub struct ControllerOptions {
    pub require_login: bool,
    pub score_seed: Option<u64>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self { require_login: true, score_seed: None }
    }
}

/// Username/password text as currently typed into the auth form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct PortfolioController {
    options: ControllerOptions,
    session: SessionManager,
    credentials: Credentials,
    catalog: Catalog,
    filters: FilterSpec,
    detail: DetailView,
    log: LogMutator,
    form_error: Option<LogError>,
    insights_open: bool,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug)]
pub struct ViewModel<'a> {
    pub current_user: Option<&'a Username>,
    pub auth_mode: AuthMode,
    pub auth_error: Option<String>,
    pub credentials: &'a Credentials,
    pub filters: &'a FilterSpec,
    pub visible: Vec<&'a PatentRecord>,
    pub catalog_len: usize,
    pub selected: Option<&'a PatentRecord>,
    pub log: &'a [LogEntry],
    pub form: &'a FormState,
    pub form_error: Option<String>,
    pub insights: Option<CatalogInsights>,
    pub locked: bool,
}

impl PortfolioController {
    pub fn new(catalog: Catalog, options: ControllerOptions) -> Self {
        let log = match options.score_seed {
            Some(seed) => LogMutator::with_seed(seed),
            None => LogMutator::new(),
        };
        Self::with_log(catalog, options, log)
    }

    pub fn with_log(catalog: Catalog, options: ControllerOptions, log: LogMutator) -> Self {
        Self {
            options,
            session: SessionManager::new(),
            credentials: Credentials::default(),
            catalog,
            filters: FilterSpec::default(),
            detail: DetailView::Hidden,
            log,
            form_error: None,
            insights_open: false,
        }
    }

    /// Starts the session with filters already applied.
    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Result<(), ControllerError> {
        match &event {
            UiEvent::TextChanged(FieldId::Password, _) => debug!("dispatch password edit"),
            other => debug!(event = ?other, "dispatch"),
        }
        if !event.is_auth_event() {
            self.ensure_unlocked()?;
        }

        match event {
            UiEvent::TextChanged(field, value) => self.apply_text(field, value),
            UiEvent::CheckboxToggled(FieldId::ActiveOnly, checked) => {
                self.filters.set_active_only(checked);
                Ok(())
            }
            UiEvent::NumberChanged(FieldId::MinRelevance, value) => {
                self.filters.set_min_relevance(value);
                Ok(())
            }
            UiEvent::RowClicked(id) => self.select_record(&id),
            UiEvent::ButtonClicked(action) => self.apply_action(action),
            other => Err(ControllerError::UnsupportedEvent(format!("{other:?}"))),
        }
    }

    fn apply_text(&mut self, field: FieldId, value: String) -> Result<(), ControllerError> {
        match field {
            FieldId::SearchQuery => self.filters.set_query(value),
            FieldId::CompanyFilter => self.filters.set_company_filter(value),
            FieldId::MinRelevance => self.filters.set_min_relevance_input(value),
            FieldId::Username => self.credentials.username = value,
            FieldId::Password => self.credentials.password = value,
            FieldId::Draft(draft_field) => self.log.set_draft_field(draft_field, value)?,
            FieldId::ActiveOnly => {
                return Err(ControllerError::UnsupportedEvent(
                    "active-only is a checkbox".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn apply_action(&mut self, action: ActionId) -> Result<(), ControllerError> {
        match action {
            ActionId::Login => {
                let Credentials { username, password } = self.credentials.clone();
                self.login(&username, &password)?;
            }
            ActionId::Register => {
                let Credentials { username, password } = self.credentials.clone();
                self.register(&username, &password)?;
            }
            ActionId::SwitchAuthMode => self.session.switch_mode(),
            ActionId::Logout => self.logout(),
            ActionId::OpenForm => self.open_form(),
            ActionId::SubmitForm => {
                self.submit_form()?;
            }
            ActionId::CancelForm => self.cancel_form(),
            ActionId::CloseDetail => self.clear_selection(),
            ActionId::ToggleInsights => self.insights_open = !self.insights_open,
            ActionId::ResetFilters => self.filters.reset(),
        }
        Ok(())
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<Identity, ControllerError> {
        let identity = self.session.register(username, password)?;
        self.credentials.password.clear();
        Ok(identity)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<Identity, ControllerError> {
        let identity = self.session.login(username, password)?;
        self.credentials = Credentials::default();
        Ok(identity)
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.log.cancel();
        self.form_error = None;
        self.detail = DetailView::Hidden;
        self.insights_open = false;
    }

    pub fn select_record(&mut self, id: &str) -> Result<(), ControllerError> {
        self.ensure_unlocked()?;
        if self.catalog.get(id).is_none() {
            return Err(ControllerError::UnknownRecord { id: id.to_string() });
        }
        self.detail = DetailView::Showing(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.detail = DetailView::Hidden;
    }

    pub fn open_form(&mut self) {
        self.form_error = None;
        self.log.open_form();
    }

    pub fn cancel_form(&mut self) {
        self.form_error = None;
        self.log.cancel();
    }

    pub fn submit_form(&mut self) -> Result<LogEntry, ControllerError> {
        self.ensure_unlocked()?;
        let submitted_by = self.session.current_user().cloned();
        match self.log.submit(submitted_by) {
            Ok(entry) => {
                self.form_error = None;
                Ok(entry)
            }
            Err(error) => {
                self.form_error = Some(error.clone());
                Err(error.into())
            }
        }
    }

    pub fn submit_new(&mut self, draft: PatentDraft) -> Result<LogEntry, ControllerError> {
        self.ensure_unlocked()?;
        let submitted_by = self.session.current_user().cloned();
        Ok(self.log.submit_new(draft, submitted_by)?)
    }

    pub fn visible_records(&self) -> Vec<&PatentRecord> {
        visible_records(self.catalog.records(), &self.filters)
    }

    pub fn is_locked(&self) -> bool {
        self.options.require_login && !self.session.is_authenticated()
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    pub fn log(&self) -> &LogMutator {
        &self.log
    }

    pub fn view(&self) -> ViewModel<'_> {
        let visible = self.visible_records();
        let insights = self.insights_open.then(|| CatalogInsights::from_records(&visible));
        let selected = self.detail.selected_id().and_then(|id| self.catalog.get(id));
        ViewModel {
            current_user: self.session.current_user(),
            auth_mode: self.session.mode(),
            auth_error: self.session.error_message(),
            credentials: &self.credentials,
            filters: &self.filters,
            visible,
            catalog_len: self.catalog.len(),
            selected,
            log: self.log.list_all(),
            form: self.log.form(),
            form_error: self.form_error.as_ref().map(ToString::to_string),
            insights,
            locked: self.is_locked(),
        }
    }

    fn ensure_unlocked(&self) -> Result<(), ControllerError> {
        if self.is_locked() {
            return Err(ControllerError::NotAuthenticated);
        }
        Ok(())
    }
}
