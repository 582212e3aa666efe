use catalog_models::{BackupResult, BackupType};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Backup counts for one category (a movie library, or the grand total).
///
/// `counts_by_type` counts an item once per matched type, so its sum can
/// exceed `backed_items` when items carry several backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub name: String,
    pub total_items: u64,
    pub backed_items: u64,
    pub counts_by_type: BTreeMap<BackupType, u64>,
}

impl CategoryStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_items: 0,
            backed_items: 0,
            counts_by_type: BackupType::ALL.into_iter().map(|t| (t, 0)).collect(),
        }
    }

    pub fn record(&mut self, result: &BackupResult) {
        self.total_items += 1;
        if result.is_backed() {
            self.backed_items += 1;
        }
        for backup_type in result.matched_types() {
            *self.counts_by_type.entry(*backup_type).or_insert(0) += 1;
        }
    }

    pub fn count(&self, backup_type: BackupType) -> u64 {
        self.counts_by_type.get(&backup_type).copied().unwrap_or(0)
    }

    pub fn type_count_sum(&self) -> u64 {
        self.counts_by_type.values().sum()
    }

    pub fn percent_backed_up(&self) -> f64 {
        percent(self.backed_items, self.total_items)
    }

    /// Sum every field across categories. The percentage is recomputed
    /// from the summed counts, never averaged.
    pub fn grand_total(name: impl Into<String>, categories: &[CategoryStats]) -> Self {
        let mut total = Self::new(name);
        for category in categories {
            total.total_items += category.total_items;
            total.backed_items += category.backed_items;
            for (backup_type, count) in &category.counts_by_type {
                *total.counts_by_type.entry(*backup_type).or_insert(0) += count;
            }
        }
        total
    }
}

/// Fold classification results into a category.
pub fn aggregate<'a>(
    name: impl Into<String>,
    results: impl IntoIterator<Item = &'a BackupResult>,
) -> CategoryStats {
    let mut stats = CategoryStats::new(name);
    for result in results {
        stats.record(result);
    }
    stats
}

/// `100 * part / whole` rounded to one decimal; 0 when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

/// Per-show episode backup counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowSummary {
    pub show_title: String,
    pub total_episodes: u64,
    pub backed_episodes: u64,
}

impl ShowSummary {
    pub fn new(show_title: impl Into<String>) -> Self {
        Self {
            show_title: show_title.into(),
            total_episodes: 0,
            backed_episodes: 0,
        }
    }

    pub fn percent(&self) -> f64 {
        percent(self.backed_episodes, self.total_episodes)
    }

    pub fn total(summaries: &[ShowSummary]) -> Self {
        let mut total = Self::new("Total");
        for summary in summaries {
            total.total_episodes += summary.total_episodes;
            total.backed_episodes += summary.backed_episodes;
        }
        total
    }
}

/// Fold episodes into per-show summaries, in order of first appearance.
pub fn summarize_shows<'a>(
    episodes: impl IntoIterator<Item = (&'a str, &'a BackupResult)>,
) -> Vec<ShowSummary> {
    let mut summaries: Vec<ShowSummary> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (show_title, result) in episodes {
        let index = *positions.entry(show_title).or_insert_with(|| {
            summaries.push(ShowSummary::new(show_title));
            summaries.len() - 1
        });
        let summary = &mut summaries[index];
        summary.total_episodes += 1;
        if result.is_backed() {
            summary.backed_episodes += 1;
        }
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn result(types: &[BackupType]) -> BackupResult {
        BackupResult::new(types.iter().copied().collect::<BTreeSet<_>>())
    }

    fn category(name: &str, backed: u64, total: u64) -> CategoryStats {
        let mut results = vec![result(&[BackupType::Dvd]); backed as usize];
        results.extend(vec![BackupResult::not_backed(); (total - backed) as usize]);
        aggregate(name, &results)
    }

    #[test]
    fn test_aggregate_counts() {
        let results = vec![
            result(&[BackupType::Dvd]),
            result(&[BackupType::Iso]),
            BackupResult::not_backed(),
        ];
        let stats = aggregate("Movies", &results);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.backed_items, 2);
        assert_eq!(stats.count(BackupType::Dvd), 1);
        assert_eq!(stats.count(BackupType::Iso), 1);
        assert_eq!(stats.count(BackupType::Ripped), 0);
        assert_eq!(stats.percent_backed_up(), 66.7);
    }

    #[test]
    fn test_empty_category() {
        let stats = aggregate("Empty", std::iter::empty());
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.percent_backed_up(), 0.0);
        assert_eq!(stats.counts_by_type.len(), 4);
    }

    #[test]
    fn test_type_sum_bounds_backed_count() {
        let overlapping = vec![
            result(&[BackupType::Dvd, BackupType::Ripped]),
            result(&[BackupType::Iso]),
            BackupResult::not_backed(),
        ];
        let stats = aggregate("Overlap", &overlapping);
        assert!(stats.type_count_sum() > stats.backed_items);

        let disjoint = vec![result(&[BackupType::Dvd]), result(&[BackupType::BlueRay])];
        let stats = aggregate("Disjoint", &disjoint);
        assert_eq!(stats.type_count_sum(), stats.backed_items);
    }

    #[test]
    fn test_grand_total_does_not_average_percentages() {
        let categories = vec![category("A", 1, 1), category("B", 1, 99)];
        let total = CategoryStats::grand_total("Total", &categories);
        assert_eq!(total.total_items, 100);
        assert_eq!(total.backed_items, 2);
        assert_eq!(total.count(BackupType::Dvd), 2);
        assert_eq!(total.percent_backed_up(), 2.0);
    }

    #[test]
    fn test_grand_total_of_nothing() {
        let total = CategoryStats::grand_total("Total", &[]);
        assert_eq!(total.total_items, 0);
        assert_eq!(total.percent_backed_up(), 0.0);
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(1, 8), 12.5);
        assert_eq!(percent(5, 5), 100.0);
    }

    #[test]
    fn test_summarize_shows_first_appearance_order() {
        let backed = result(&[BackupType::Ripped]);
        let missing = BackupResult::not_backed();
        let episodes = vec![
            ("Seinfeld", &backed),
            ("Andor", &missing),
            ("Seinfeld", &missing),
        ];
        let summaries = summarize_shows(episodes);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].show_title, "Seinfeld");
        assert_eq!(summaries[0].total_episodes, 2);
        assert_eq!(summaries[0].backed_episodes, 1);
        assert_eq!(summaries[0].percent(), 50.0);
        assert_eq!(summaries[1].show_title, "Andor");
        assert_eq!(summaries[1].percent(), 0.0);

        let total = ShowSummary::total(&summaries);
        assert_eq!(total.total_episodes, 3);
        assert_eq!(total.backed_episodes, 1);
        assert_eq!(total.percent(), 33.3);
    }
}
