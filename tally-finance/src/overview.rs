//! Per-category grouping of predictions and amount totals

use serde::Serialize;
use std::collections::HashMap;
use tally_core::Prediction;

/// Corpus items predicted into one category, in corpus order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<usize>,
}

/// One line of the overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total_amount: f64,
    pub item_count: usize,
}

/// Group item ids by predicted category. Groups come out in order of
/// first appearance in the corpus.
pub fn group_by_category(predictions: &[Prediction]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for (item, pred) in predictions.iter().enumerate() {
        let i = *position.entry(pred.category.as_str()).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: pred.category.clone(),
                items: Vec::new(),
            });
            groups.len() - 1
        });
        groups[i].items.push(item);
    }
    groups
}

/// Totals per group sorted ascending by amount. The sort is stable, so
/// equal totals keep first-appearance order.
pub fn summarize(groups: &[CategoryGroup], amounts: &[f64]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = groups
        .iter()
        .map(|g| CategoryTotal {
            category: g.category.clone(),
            total_amount: g.items.iter().map(|&i| amounts[i]).sum(),
            item_count: g.items.len(),
        })
        .collect();

    totals.sort_by(|a, b| a.total_amount.total_cmp(&b.total_amount));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pred(category: &str) -> Prediction {
        Prediction {
            category: category.to_string(),
            log_score: -1.0,
            posterior: 1.0,
            prior_only: false,
        }
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let preds = vec![pred("food"), pred("rent"), pred("food"), pred("bank")];
        let groups = group_by_category(&preds);
        let names: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, vec!["food", "rent", "bank"]);
        assert_eq!(groups[0].items, vec![0, 2]);
    }

    #[test]
    fn test_summarize_sorted_by_total() {
        let preds = vec![pred("food"), pred("rent"), pred("food"), pred("salary")];
        let amounts = [-12.5, -800.0, -30.0, 2100.0];
        let totals = summarize(&group_by_category(&preds), &amounts);

        assert_eq!(totals[0].category, "rent");
        assert_eq!(totals[1].category, "food");
        assert_eq!(totals[1].item_count, 2);
        assert!((totals[1].total_amount + 42.5).abs() < 1e-9);
        assert_eq!(totals[2].category, "salary");
    }

    #[test]
    fn test_equal_totals_keep_first_appearance() {
        let preds = vec![pred("zeta"), pred("alpha"), pred("mid")];
        let amounts = [10.0, 10.0, 5.0];
        let totals = summarize(&group_by_category(&preds), &amounts);
        let names: Vec<_> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, vec!["mid", "zeta", "alpha"]);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(group_by_category(&[]).is_empty());
        assert!(summarize(&[], &[]).is_empty());
    }
}
