use crate::error::{DemoError, Result};
use crate::queries::month_labels;
use itertools::Itertools;
use polars::prelude::DataFrame;

/// The month dropdown.
///
/// Options are always the labels found in the orders it filters, so a
/// selection is either one of them or rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSelector {
    options: Vec<String>,
}

impl MonthSelector {
    pub fn from_orders(orders: &DataFrame) -> Result<Self> {
        Ok(Self {
            options: month_labels(orders)?,
        })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// First option in sorted order
    pub fn default_month(&self) -> Option<&str> {
        self.options.first().map(String::as_str)
    }

    /// Resolve a requested month, falling back to the default when none is given
    pub fn select(&self, requested: Option<&str>) -> Result<&str> {
        match requested.map(str::trim).filter(|m| !m.is_empty()) {
            None => self.default_month().ok_or(DemoError::EmptyDataset),
            Some(month) => self
                .options
                .iter()
                .find(|option| option.as_str() == month)
                .map(String::as_str)
                .ok_or_else(|| DemoError::UnknownMonth {
                    month: month.to_string(),
                    available: self.options.iter().join(", "),
                }),
        }
    }

    /// Resolve a terminal answer: a 1-based option number or a label
    pub fn select_by_answer(&self, answer: &str) -> Result<&str> {
        let answer = answer.trim();
        if let Ok(n) = answer.parse::<usize>() {
            if let Some(option) = n.checked_sub(1).and_then(|i| self.options.get(i)) {
                return Ok(option.as_str());
            }
        }
        self.select(Some(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn selector() -> MonthSelector {
        MonthSelector::from_orders(Dataset::sample().unwrap().orders()).unwrap()
    }

    #[test]
    fn test_default_is_first_sorted() {
        let selector = selector();
        assert_eq!(selector.default_month(), Some("2024-01"));
        assert_eq!(selector.select(None).unwrap(), "2024-01");
        assert_eq!(selector.select(Some("  ")).unwrap(), "2024-01");
    }

    #[test]
    fn test_unknown_month_rejected() {
        let err = selector().select(Some("2023-12")).unwrap_err();
        match err {
            DemoError::UnknownMonth { month, available } => {
                assert_eq!(month, "2023-12");
                assert_eq!(available, "2024-01, 2024-02, 2024-03");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_by_answer() {
        let selector = selector();
        assert_eq!(selector.select_by_answer("2").unwrap(), "2024-02");
        assert_eq!(selector.select_by_answer("2024-03").unwrap(), "2024-03");
        assert!(selector.select_by_answer("0").is_err());
        assert!(selector.select_by_answer("4").is_err());
    }

    #[test]
    fn test_empty_orders_have_no_default() {
        let dataset = Dataset::from_orders(Vec::new()).unwrap();
        let selector = MonthSelector::from_orders(dataset.orders()).unwrap();
        assert!(selector.options().is_empty());
        assert!(matches!(selector.select(None), Err(DemoError::EmptyDataset)));
    }
}
