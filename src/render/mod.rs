pub mod export;
pub mod normal;

use chrono::NaiveDateTime;
use itertools::Itertools;

use crate::source::Record;

/// Which template a request is rendered with. Chosen once per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Normal,
    Export,
}

impl ViewMode {
    pub fn from_export_param(value: Option<&str>) -> Self {
        match value {
            Some("pdf") => Self::Export,
            _ => Self::Normal,
        }
    }
}

/// Page texts and the stylesheet link. All of it is escaped on output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSettings {
    pub title: String,
    pub subtitle: String,
    pub stylesheet_href: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            title: "Student roster".to_string(),
            subtitle: "Student records".to_string(),
            stylesheet_href: "style.css".to_string(),
        }
    }
}

pub struct PageContext<'a> {
    pub records: &'a [Record],
    pub query: &'a str,
    pub generated_at: NaiveDateTime,
    pub settings: &'a ViewSettings,
}

impl PageContext<'_> {
    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn stats(&self) -> PageStats {
        PageStats::of(self.records)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageStats {
    pub total: usize,
    pub distinct_groups: usize,
}

impl PageStats {
    pub fn of(records: &[Record]) -> Self {
        Self {
            total: records.len(),
            distinct_groups: records
                .iter()
                .filter_map(|r| r.group.as_deref())
                .unique()
                .count(),
        }
    }
}

pub fn render_page(mode: ViewMode, ctx: &PageContext<'_>) -> String {
    match mode {
        ViewMode::Normal => normal::render(ctx),
        ViewMode::Export => export::render(ctx),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// First letter of every whitespace-separated part, uppercased. `?` when there are none.
pub fn initials(fio: Option<&str>) -> String {
    let letters: String = fio
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

// Shared by both templates; only the cells differ.
fn table_cells(record: &Record) -> [String; 3] {
    [
        escape_html(record.group_or_empty()),
        escape_html(record.index_or_empty()),
        escape_html(record.fio_or_empty()),
    ]
}
