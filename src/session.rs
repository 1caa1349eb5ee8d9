use crate::aggregate::{CategoryCounts, ChartField, Summary, category_counts, summarize};
use crate::dataset::Dataset;
use crate::dates::DateParser;
use crate::error::{DashboardError, Result};
use crate::filter::{FilterCriteria, SearchInput, search};
use crate::record::Record;
use serde::Serialize;

/// The sorted subset produced by one search
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilteredResult {
    pub records: Vec<Record>,
    pub summary: Summary,
}

impl FilteredResult {
    pub fn new(records: Vec<Record>) -> Self {
        let summary = summarize(&records);
        FilteredResult { records, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn counts(&self, field: ChartField) -> CategoryCounts {
        category_counts(&self.records, field.field_index())
    }
}

/// Working state of one dashboard: the raw dataset, the last criteria and the last
/// result. Only the search and load paths replace the result; it is never edited.
#[derive(Clone, Debug, Default)]
pub struct Session {
    parser: DateParser,
    dataset: Dataset,
    criteria: FilterCriteria,
    result: FilteredResult,
}

impl Session {
    pub fn new(parser: DateParser) -> Self {
        Session {
            parser,
            ..Default::default()
        }
    }

    pub fn parser(&self) -> &DateParser {
        &self.parser
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn result(&self) -> &FilteredResult {
        &self.result
    }

    /// Replace the dataset wholesale. The previous result belongs to the old data and
    /// is discarded.
    pub fn load(&mut self, dataset: Dataset) {
        log::info!("loaded {} rows into session", dataset.len());
        self.dataset = dataset;
        self.result = FilteredResult::default();
    }

    /// Parse the input, run filter + sort and keep the new result
    pub fn search(&mut self, input: &SearchInput) -> Result<&FilteredResult> {
        let criteria = FilterCriteria::from_input(input, &self.parser)?;
        Ok(self.apply(criteria))
    }

    pub fn apply(&mut self, criteria: FilterCriteria) -> &FilteredResult {
        let records = search(self.dataset.rows(), &criteria, &self.parser);
        log::debug!(
            "search matched {} of {} rows",
            records.len(),
            self.dataset.len()
        );
        self.criteria = criteria;
        self.result = FilteredResult::new(records);
        &self.result
    }

    /// Forget the criteria. The last result stays visible until the next search.
    pub fn clear_criteria(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    pub fn record(&self, index: usize) -> Result<&Record> {
        self.result
            .records
            .get(index)
            .ok_or(DashboardError::RecordNotFound(index))
    }
}
