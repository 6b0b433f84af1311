//! Catalog row model and the tabular parser that produces it.
//!
//! The header row is an external contract: the parser locates the
//! `Component`, `File`, `Tags` and `Link` columns by name (case-insensitive,
//! surrounding whitespace ignored) and fails the whole table when one is
//! missing. Individual rows that lack a value are dropped silently.

use csv::{ReaderBuilder, StringRecord, Trim};
use granat_core::{normalize_text, split_normalized_list};

use crate::catalog_error::CatalogError;

/// Header of the column holding the component display name.
pub const COMPONENT_COLUMN: &str = "Component";
/// Header of the column holding the containing file (the component group).
pub const FILE_COLUMN: &str = "File";
/// Header of the column holding the comma-delimited tag list.
pub const TAGS_COLUMN: &str = "Tags";
/// Header of the column holding the reference link.
pub const LINK_COLUMN: &str = "Link";
/// Group name that marks a component as part of the mobile family.
pub const MOBILE_COMPONENT_GROUP: &str = "App Components";

const TAG_DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
/// One validated catalog row.
///
/// `tags` are stored already normalized (trimmed, case-folded, whitespace
/// collapsed) so searches can compare them without re-normalizing.
pub struct CatalogRecord {
    pub name: String,
    pub group: String,
    pub tags: Vec<String>,
    pub link: String,
}

impl CatalogRecord {
    /// Builds a record from raw cell values, normalizing the tag list.
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        raw_tags: &str,
        link: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            group: group.into().trim().to_string(),
            tags: normalize_tags(raw_tags),
            link: link.into().trim().to_string(),
        }
    }

    /// True when the record belongs to the mobile component family.
    pub fn is_mobile_component(&self) -> bool {
        self.group == MOBILE_COMPONENT_GROUP
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Category partition applied on top of tag search.
pub enum CategoryScope {
    Mobile,
    Web,
    Any,
}

impl CategoryScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Web => "web",
            Self::Any => "any",
        }
    }

    /// Returns true when `record` falls inside this scope.
    pub fn admits(self, record: &CatalogRecord) -> bool {
        match self {
            Self::Mobile => record.is_mobile_component(),
            Self::Web => !record.is_mobile_component(),
            Self::Any => true,
        }
    }
}

/// Splits a comma-delimited tag cell into normalized tags.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    split_normalized_list(raw, TAG_DELIMITER)
}

#[derive(Debug, Clone, Copy)]
struct CatalogColumns {
    component: usize,
    file: usize,
    tags: usize,
    link: usize,
}

impl CatalogColumns {
    fn resolve(headers: &StringRecord) -> Result<Self, CatalogError> {
        let find = |column: &'static str| {
            let wanted = normalize_text(column);
            headers
                .iter()
                .position(|header| normalize_text(header) == wanted)
                .ok_or(CatalogError::MissingColumn { column })
        };
        Ok(Self {
            component: find(COMPONENT_COLUMN)?,
            file: find(FILE_COLUMN)?,
            tags: find(TAGS_COLUMN)?,
            link: find(LINK_COLUMN)?,
        })
    }

    fn build_record(&self, row: &StringRecord) -> Option<CatalogRecord> {
        let required = |index: usize| row.get(index).map(str::trim).filter(|cell| !cell.is_empty());
        let name = required(self.component)?;
        let group = required(self.file)?;
        let link = required(self.link)?;
        // An empty tag cell is a present field with no tags; a short row is not.
        let raw_tags = row.get(self.tags)?;
        Some(CatalogRecord::new(name, group, raw_tags, link))
    }
}

/// Parses delimited catalog text into records, preserving source row order.
pub fn parse_catalog_table(raw: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
    let raw = raw.strip_prefix('\u{FEFF}').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Err(CatalogError::MalformedTable {
            message: "table text is empty".to_string(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes());
    let headers = reader
        .headers()
        .map_err(|error| CatalogError::MalformedTable {
            message: format!("failed to read header row: {error}"),
        })?
        .clone();
    let columns = CatalogColumns::resolve(&headers)?;

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                tracing::debug!(%error, "skipping unreadable catalog row");
                skipped_rows = skipped_rows.saturating_add(1);
                continue;
            }
        };
        match columns.build_record(&row) {
            Some(record) => records.push(record),
            None => skipped_rows = skipped_rows.saturating_add(1),
        }
    }
    if skipped_rows > 0 {
        tracing::debug!(
            parsed = records.len(),
            skipped = skipped_rows,
            "catalog rows failed validation"
        );
    }
    Ok(records)
}
