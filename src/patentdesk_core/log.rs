//! Session-local, append-only log of user-submitted patent entries.

use std::fmt;

use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;

use super::types::{PatentRecord, PatentStatus, Username, MAX_RELEVANCE};

pub const LOG_ID_PREFIX: &str = "U";
const FILING_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Company,
    Inventor,
    Summary,
    FilingDate,
}

impl DraftField {
    /// Form order.
    pub const ALL: [DraftField; 5] =
        [Self::Title, Self::Company, Self::Inventor, Self::Summary, Self::FilingDate];

    pub const REQUIRED: [DraftField; 4] = [Self::Title, Self::Company, Self::Inventor, Self::Summary];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Company => "Company",
            Self::Inventor => "Inventor",
            Self::Summary => "Summary",
            Self::FilingDate => "Filing date",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|field| *field == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|field| *field == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatentDraft {
    pub title: String,
    pub company: String,
    pub inventor: String,
    pub summary: String,
    /// Blank means "today".
    pub filing_date: String,
}

impl PatentDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Title => &self.title,
            DraftField::Company => &self.company,
            DraftField::Inventor => &self.inventor,
            DraftField::Summary => &self.summary,
            DraftField::FilingDate => &self.filing_date,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Title => self.title = value,
            DraftField::Company => self.company = value,
            DraftField::Inventor => self.inventor = value,
            DraftField::Summary => self.summary = value,
            DraftField::FilingDate => self.filing_date = value,
        }
    }

    pub fn first_missing(&self) -> Option<DraftField> {
        DraftField::REQUIRED.into_iter().find(|field| self.get(*field).trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Closed,
    Open(PatentDraft),
}

impl FormState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn draft(&self) -> Option<&PatentDraft> {
        match self {
            Self::Closed => None,
            Self::Open(draft) => Some(draft),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LogError {
    #[error("missing required field: {0}")]
    MissingRequiredField(DraftField),
    #[error("invalid filing date `{value}` (expected YYYY-MM-DD)")]
    InvalidFilingDate { value: String },
    #[error("no entry form is open")]
    FormClosed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub record: PatentRecord,
    pub inventor: String,
    pub summary: String,
    pub submitted_by: Option<Username>,
}

pub struct LogMutator {
    entries: Vec<LogEntry>,
    next_seq: u64,
    form: FormState,
    rng: StdRng,
    today: fn() -> NaiveDate,
}

impl LogMutator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), local_today)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), local_today)
    }

    pub fn with_rng(rng: StdRng, today: fn() -> NaiveDate) -> Self {
        Self { entries: Vec::new(), next_seq: 1, form: FormState::Closed, rng, today }
    }

    /// Validates `draft` and appends a new pending record.
    ///
    /// The relevance score is drawn uniformly from `0..=100`; it is placeholder data, not a
    /// computed rating.
    pub fn submit_new(
        &mut self,
        draft: PatentDraft,
        submitted_by: Option<Username>,
    ) -> Result<LogEntry, LogError> {
        if let Some(field) = draft.first_missing() {
            return Err(LogError::MissingRequiredField(field));
        }

        let filing_date = match draft.filing_date.trim() {
            "" => (self.today)().format(FILING_DATE_FORMAT).to_string(),
            value => NaiveDate::parse_from_str(value, FILING_DATE_FORMAT)
                .map(|date| date.format(FILING_DATE_FORMAT).to_string())
                .map_err(|_| LogError::InvalidFilingDate { value: value.to_string() })?,
        };

        let id = format!("{LOG_ID_PREFIX}{:03}", self.next_seq);
        self.next_seq += 1;

        let record = PatentRecord::new(
            id,
            draft.title.trim(),
            draft.company.trim(),
            filing_date,
            PatentStatus::Pending,
            self.rng.gen_range(0..=MAX_RELEVANCE),
        );
        let entry = LogEntry {
            record,
            inventor: draft.inventor.trim().to_string(),
            summary: draft.summary.trim().to_string(),
            submitted_by,
        };

        info!(
            id = %entry.record.id,
            relevance = entry.record.relevance_score,
            submitted_by = ?entry.submitted_by.as_ref().map(Username::as_str),
            "logged patent entry"
        );
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn list_all(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &PatentRecord> {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn open_form(&mut self) {
        if !self.form.is_open() {
            self.form = FormState::Open(PatentDraft::default());
        }
    }

    pub fn set_draft_field(&mut self, field: DraftField, value: impl Into<String>) -> Result<(), LogError> {
        match &mut self.form {
            FormState::Open(draft) => {
                draft.set(field, value);
                Ok(())
            }
            FormState::Closed => Err(LogError::FormClosed),
        }
    }

    /// Submits the open draft. On failure the form stays open with the draft intact.
    pub fn submit(&mut self, submitted_by: Option<Username>) -> Result<LogEntry, LogError> {
        let draft = match &self.form {
            FormState::Open(draft) => draft.clone(),
            FormState::Closed => return Err(LogError::FormClosed),
        };
        let entry = self.submit_new(draft, submitted_by)?;
        self.form = FormState::Closed;
        Ok(entry)
    }

    pub fn cancel(&mut self) {
        self.form = FormState::Closed;
    }
}

impl Default for LogMutator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogMutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogMutator")
            .field("entries", &self.entries.len())
            .field("next_seq", &self.next_seq)
            .field("form", &self.form)
            .finish()
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
