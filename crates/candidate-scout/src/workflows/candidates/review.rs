use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::domain::{Candidate, CandidateId, CandidateRowView};
use super::store::{AcceptanceStore, KeyValueSlot, StorageSubscription, StoreError};

/// Column a saved-candidates table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Login,
    Location,
    Company,
    Id,
}

impl SortField {
    pub const COLUMNS: [SortField; 4] = [
        SortField::Name,
        SortField::Login,
        SortField::Location,
        SortField::Company,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Login => "login",
            SortField::Location => "location",
            SortField::Company => "company",
            SortField::Id => "id",
        }
    }

    pub fn header_label(self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Login => "Username",
            SortField::Location => "Location",
            SortField::Company => "Company",
            SortField::Id => "Id",
        }
    }

    fn value(self, candidate: &Candidate) -> SortValue<'_> {
        match self {
            SortField::Name => SortValue::text(&candidate.name),
            SortField::Login => SortValue::Text(&candidate.login),
            SortField::Location => SortValue::text(&candidate.location),
            SortField::Company => SortValue::text(&candidate.company),
            SortField::Id => SortValue::Number(candidate.id.0),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort field '{0}'")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "login" | "username" => Ok(SortField::Login),
            "location" => Ok(SortField::Location),
            "company" => Ok(SortField::Company),
            "id" => Ok(SortField::Id),
            _ => Err(UnknownSortField(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Active sort column (if any) and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(field: SortField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }

    /// Column-header click: flip the active column, or switch to a new one ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == Some(field) {
            self.direction = self.direction.flipped();
        } else {
            self.field = Some(field);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn indicator(&self, field: SortField) -> Option<&'static str> {
        (self.field == Some(field)).then(|| self.direction.arrow())
    }

    pub fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        match self.field {
            Some(field) => compare_values(field.value(a), field.value(b), self.direction),
            None => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SortValue<'a> {
    Text(&'a str),
    Number(u64),
    Missing,
}

impl<'a> SortValue<'a> {
    fn text(value: &'a Option<String>) -> Self {
        match value {
            Some(value) => SortValue::Text(value),
            None => SortValue::Missing,
        }
    }
}

/// Missing values go last when ascending and first when descending.
fn compare_values(a: SortValue<'_>, b: SortValue<'_>, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (SortValue::Missing, SortValue::Missing) => return Ordering::Equal,
        (SortValue::Missing, _) => return missing_first(direction).reverse(),
        (_, SortValue::Missing) => return missing_first(direction),
        (SortValue::Text(a), SortValue::Text(b)) => locale_compare(a, b),
        (SortValue::Number(a), SortValue::Number(b)) => a.cmp(&b),
        _ => return Ordering::Equal,
    };

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Ordering of a present value against a missing one.
fn missing_first(direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => Ordering::Less,
        SortDirection::Descending => Ordering::Greater,
    }
}

/// Collation in three levels: base letters ignoring accents and case, then accents
/// (unaccented first), then case (lowercase first).
fn locale_compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Lowercased canonical decomposition with combining marks removed.
fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `needle` occurs, ignoring case, in the name, login, location or company.
pub fn matches_filter(candidate: &Candidate, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let needle = needle.to_lowercase();
    let contains = |value: &str| value.to_lowercase().contains(&needle);

    candidate.name.as_deref().is_some_and(contains)
        || contains(candidate.login.as_str())
        || candidate.location.as_deref().is_some_and(contains)
        || candidate.company.as_deref().is_some_and(contains)
}

/// Filter, then stable-sort, without touching the input.
pub fn derive_rows<'a>(
    candidates: &'a [Candidate],
    needle: &str,
    sort: &SortSpec,
) -> Vec<&'a Candidate> {
    let mut rows: Vec<&Candidate> = candidates
        .iter()
        .filter(|candidate| matches_filter(candidate, needle))
        .collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}

/// Header cell of the review table.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnHeader {
    pub field: SortField,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<&'static str>,
}

/// Everything a client needs to draw the review table.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub filter: String,
    pub sort: SortSpec,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<CandidateRowView>,
    pub total_saved: usize,
}

/// Saved-candidates table with its own filter and sort state.
///
/// Works from a snapshot of the store. The snapshot is refreshed on `sync` only after the
/// store's change feed reported a write, or on an explicit `reload`.
pub struct ReviewTable<S> {
    store: Arc<AcceptanceStore<S>>,
    subscription: StorageSubscription,
    snapshot: Vec<Candidate>,
    filter: String,
    sort: SortSpec,
}

impl<S> ReviewTable<S>
where
    S: KeyValueSlot,
{
    pub fn open(store: Arc<AcceptanceStore<S>>) -> Result<Self, StoreError> {
        let subscription = store.subscribe();
        let snapshot = store.load_all()?;
        Ok(Self {
            store,
            subscription,
            snapshot,
            filter: String::new(),
            sort: SortSpec::default(),
        })
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn snapshot(&self) -> &[Candidate] {
        &self.snapshot
    }

    pub fn set_filter(&mut self, needle: impl Into<String>) {
        self.filter = needle.into();
    }

    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    /// Reload the snapshot if a storage change was published since the last check.
    pub fn sync(&mut self) -> Result<bool, StoreError> {
        if !self.subscription.take_pending() {
            return Ok(false);
        }
        self.snapshot = self.store.load_all()?;
        debug!(total = self.snapshot.len(), "review snapshot reloaded");
        Ok(true)
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.subscription.take_pending();
        self.snapshot = self.store.load_all()?;
        Ok(())
    }

    /// Remove a saved candidate from the store and from the snapshot.
    pub fn remove(&mut self, id: CandidateId) -> Result<bool, StoreError> {
        let removed = self.store.remove(id)?;
        self.snapshot.retain(|candidate| candidate.id != id);
        Ok(removed)
    }

    pub fn rows(&self) -> Vec<&Candidate> {
        derive_rows(&self.snapshot, &self.filter, &self.sort)
    }

    pub fn view(&self) -> ReviewView {
        ReviewView {
            filter: self.filter.clone(),
            sort: self.sort,
            columns: SortField::COLUMNS
                .iter()
                .map(|&field| ColumnHeader {
                    field,
                    label: field.header_label(),
                    indicator: self.sort.indicator(field),
                })
                .collect(),
            rows: self.rows().into_iter().map(Candidate::row_view).collect(),
            total_saved: self.snapshot.len(),
        }
    }
}
