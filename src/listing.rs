use crate::calculator::CalculatorRecord;
use crate::error::{FilterError, StoreError};
use crate::store::{CalculatorStore, fetch_all};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Flag filter offered by the list view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFilter {
    #[default]
    All,
    Popular,
    Recent,
}

impl ListFilter {
    pub fn label(&self) -> &'static str {
        match self {
            ListFilter::All => "All",
            ListFilter::Popular => "Popular",
            ListFilter::Recent => "Recently Added",
        }
    }

    pub fn matches(&self, record: &CalculatorRecord) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Popular => record.form.category.popular,
            ListFilter::Recent => record.form.category.recently_added,
        }
    }
}

impl FromStr for ListFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "all" => Ok(ListFilter::All),
            "popular" => Ok(ListFilter::Popular),
            "recent" => Ok(ListFilter::Recent),
            other => Err(FilterError::Unknown(other.to_string())),
        }
    }
}

/// Case-insensitive substring match on name or short description.
pub fn matches_search(record: &CalculatorRecord, term: &str) -> bool {
    let term = term.to_lowercase();
    record.form.name.to_lowercase().contains(&term)
        || record.form.short_description.to_lowercase().contains(&term)
}

/// Records matching both the search text and the flag filter, in snapshot
/// order.
pub fn filter_calculators<'a>(
    records: &'a [CalculatorRecord],
    search: &str,
    filter: ListFilter,
) -> Vec<&'a CalculatorRecord> {
    records
        .iter()
        .filter(|record| matches_search(record, search) && filter.matches(record))
        .collect()
}

/// What a list card shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorSummary {
    pub id: String,
    pub name: String,
    pub short_description: String,
    pub popular: bool,
    pub recently_added: bool,
    pub speciality_tags: Vec<String>,
}

impl From<&CalculatorRecord> for CalculatorSummary {
    fn from(record: &CalculatorRecord) -> Self {
        CalculatorSummary {
            id: record.id.clone(),
            name: record.form.name.clone(),
            short_description: record.form.short_description.clone(),
            popular: record.form.category.popular,
            recently_added: record.form.category.recently_added,
            speciality_tags: record.form.speciality_tags.clone(),
        }
    }
}

/// A snapshot of the collection fetched once when the view is opened.
///
/// It does not follow later changes made elsewhere; only deletes issued
/// through [`ListView::delete`] are reflected.
#[derive(Clone, Debug, Default)]
pub struct ListView {
    pub records: Vec<CalculatorRecord>,
}

impl ListView {
    pub async fn load(store: &dyn CalculatorStore) -> Result<Self, StoreError> {
        let records = fetch_all(store).await.inspect_err(|e| {
            log::error!("Error fetching calculators: {}", e);
        })?;
        Ok(ListView { records })
    }

    pub fn visible(&self, search: &str, filter: ListFilter) -> Vec<CalculatorSummary> {
        filter_calculators(&self.records, search, filter)
            .into_iter()
            .map(CalculatorSummary::from)
            .collect()
    }

    /// Delete from the store, then drop the record from the snapshot. On
    /// failure the snapshot is left as it was.
    pub async fn delete(&mut self, store: &dyn CalculatorStore, id: &str) -> Result<(), StoreError> {
        store.delete(id).await.inspect_err(|e| {
            log::error!("Error deleting calculator {}: {}", id, e);
        })?;
        self.records.retain(|record| record.id != id);
        log::info!("Deleted calculator {}", id);
        Ok(())
    }
}
