use crate::source::{Dataset, Record};

/// Keeps records whose `fio` or `group` contains `query`, ignoring case.
/// An empty query keeps everything. Order is preserved.
pub fn filter_records<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            contains_folded(r.fio_or_empty(), &needle)
                || contains_folded(r.group_or_empty(), &needle)
        })
        .collect()
}

impl Dataset {
    pub fn filtered(&self, query: Option<&str>) -> Dataset {
        let query = query.unwrap_or_default();
        Dataset::new(
            filter_records(self.records(), query)
                .into_iter()
                .cloned()
                .collect(),
        )
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(folded_needle)
}
