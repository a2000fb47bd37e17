//! Semantic icon names used throughout patentdesk.
//!
//! Panels refer to icons by meaning (`search`, `filter`, `document`, `trend`, `shield`, `list`,
//! `user`) and this table turns them into terminal glyphs. Incoming names are normalized to
//! lowercase; a few common aliases map onto the official set. Unknown names return `None`.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Search,
    Filter,
    Document,
    Trend,
    Shield,
    List,
    User,
}

impl Icon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Search => "⌕",
            Self::Filter => "⏷",
            Self::Document => "▤",
            Self::Trend => "↗",
            Self::Shield => "⛨",
            Self::List => "☰",
            Self::User => "☺",
        }
    }
}

/// Convert an incoming icon name into an [`Icon`].
pub fn canonical_icon(value: &str) -> Option<Icon> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "search" | "magnifier" => Some(Icon::Search),
        "filter" | "funnel" => Some(Icon::Filter),
        "document" | "file" | "filetext" | "file-text" => Some(Icon::Document),
        "trend" | "trendingup" | "trending-up" | "insights" => Some(Icon::Trend),
        "shield" => Some(Icon::Shield),
        "list" => Some(Icon::List),
        "user" | "account" => Some(Icon::User),
        _ => None,
    }
}

pub fn icon_glyph(name: &str) -> Option<&'static str> {
    canonical_icon(name).map(Icon::glyph)
}
