use super::types::{PatentRecord, PatentStatus};

/// Minimum relevance threshold as typed by the user.
///
/// The raw input is kept so the control can echo it back verbatim. Blank, non-numeric and
/// non-finite input all count as a threshold of `0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MinRelevance {
    raw: String,
}

impl MinRelevance {
    pub fn from_input(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn from_value(value: f64) -> Self {
        Self { raw: format_threshold(value) }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn threshold(&self) -> f64 {
        self.raw.trim().parse::<f64>().ok().filter(|value| value.is_finite()).unwrap_or(0.0)
    }

    pub fn is_numeric(&self) -> bool {
        let trimmed = self.raw.trim();
        trimmed.is_empty() || trimmed.parse::<f64>().is_ok_and(f64::is_finite)
    }
}

fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSpec {
    pub query: String,
    pub company_filter: String,
    pub active_only: bool,
    pub min_relevance: MinRelevance,
}

impl FilterSpec {
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn set_company_filter(&mut self, text: impl Into<String>) {
        self.company_filter = text.into();
    }

    pub fn set_active_only(&mut self, active_only: bool) {
        self.active_only = active_only;
    }

    pub fn set_min_relevance(&mut self, value: f64) {
        self.min_relevance = MinRelevance::from_value(value);
    }

    pub fn set_min_relevance_input(&mut self, raw: impl Into<String>) {
        self.min_relevance = MinRelevance::from_input(raw);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        self.query.is_empty()
            && self.company_filter.is_empty()
            && !self.active_only
            && self.min_relevance.threshold() == 0.0
    }

    pub fn matches(&self, record: &PatentRecord) -> bool {
        self.matches_with_query(record, &self.query.to_lowercase())
    }

    /// Projects `records` onto the ones matching every criterion, keeping input order.
    pub fn apply<'a>(
        &self,
        records: impl IntoIterator<Item = &'a PatentRecord>,
    ) -> Vec<&'a PatentRecord> {
        let query = self.query.to_lowercase();
        records.into_iter().filter(|record| self.matches_with_query(record, &query)).collect()
    }

    fn matches_with_query(&self, record: &PatentRecord, query_lower: &str) -> bool {
        if !record.title.to_lowercase().contains(query_lower) {
            return false;
        }

        if self.active_only && record.status != PatentStatus::Active {
            return false;
        }

        // Company match is case-sensitive substring.
        if !self.company_filter.is_empty() && !record.company.contains(&self.company_filter) {
            return false;
        }

        f64::from(record.relevance_score) >= self.min_relevance.threshold()
    }
}

pub fn visible_records<'a>(catalog: &'a [PatentRecord], spec: &FilterSpec) -> Vec<&'a PatentRecord> {
    spec.apply(catalog)
}

/// Detail modal state for the catalog table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DetailView {
    #[default]
    Hidden,
    Showing(String),
}

impl DetailView {
    pub fn selected_id(&self) -> Option<&str> {
        match self {
            Self::Hidden => None,
            Self::Showing(id) => Some(id),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogInsights {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub inactive: usize,
    pub mean_relevance: Option<f64>,
    pub top_company: Option<(String, usize)>,
}

impl CatalogInsights {
    pub fn from_records(records: &[&PatentRecord]) -> Self {
        let count = |status: PatentStatus| records.iter().filter(|r| r.status == status).count();
        let mean_relevance = if records.is_empty() {
            None
        } else {
            let sum: u32 = records.iter().map(|r| u32::from(r.relevance_score)).sum();
            Some(f64::from(sum) / records.len() as f64)
        };

        let mut companies: Vec<(String, usize)> = Vec::new();
        for record in records {
            match companies.iter_mut().find(|(name, _)| name == &record.company) {
                Some((_, count)) => *count += 1,
                None => companies.push((record.company.clone(), 1)),
            }
        }
        let top_company = companies.into_iter().fold(None, |best: Option<(String, usize)>, item| {
            match best {
                Some((name, count)) if count >= item.1 => Some((name, count)),
                _ => Some(item),
            }
        });

        Self {
            total: records.len(),
            active: count(PatentStatus::Active),
            pending: count(PatentStatus::Pending),
            inactive: count(PatentStatus::Inactive),
            mean_relevance,
            top_company,
        }
    }
}
