use std::fmt;

use serde::Deserialize;

pub const MAX_RELEVANCE: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum PatentStatus {
    Active,
    Pending,
    Inactive,
}

impl PatentStatus {
    pub const ALL: [PatentStatus; 3] = [Self::Active, Self::Pending, Self::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Pending => "Pending",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for PatentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single patent row, either from the reference catalog or the session log.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PatentRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(alias = "filingDate")]
    pub filing_date: String,
    pub status: PatentStatus,
    #[serde(alias = "relevanceScore")]
    pub relevance_score: u8,
}

impl PatentRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
        filing_date: impl Into<String>,
        status: PatentStatus,
        relevance_score: u8,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: company.into(),
            filing_date: filing_date.into(),
            status,
            relevance_score,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PatentStatus::Active
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(pub String);

impl Username {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered username/password pair. Passwords are compared verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: Username,
    password: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: Username::new(username), password: password.into() }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username.as_str() == username && self.password == password
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
