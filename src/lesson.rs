//! Lesson - the page model
//!
//! Static teaching content plus every value derived from the dataset for
//! the current month selection. `Lesson::build` is the whole derivation
//! chain; front ends call it again on every interaction.

use crate::dataset::{Dataset, Order};
use crate::error::Result;
use crate::queries::{self, CountryRevenue};
use crate::selector::MonthSelector;
use serde::Serialize;
use tracing::debug;

pub const TITLE: &str = "SQL for Humans: Online Store";

pub const INTRO: &str = "This mini app shows how basic **SQL ideas** (and a bit of code) \
can answer simple business questions for an online store.";

/// A block of the page. Numbered sections carry an SQL idea and snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub number: Option<u8>,
    pub heading: &'static str,
    pub idea: Option<&'static str>,
    /// Shown for reading only; never run against the data
    pub sql: Option<&'static str>,
    pub body: &'static [&'static str],
}

pub const DATA_MODEL: Section = Section {
    number: None,
    heading: "Our simple data model",
    idea: None,
    sql: None,
    body: &[
        "We imagine 3 tables in our online store:",
        "- `customers`: one row per customer",
        "- `products`: one row per product",
        "- `orders`: one row per order (customer, date, total_amount)",
        "Here we only simulate **customers** and **orders**.",
    ],
};

pub const CUSTOMERS: Section = Section {
    number: Some(1),
    heading: "How many customers do we have?",
    idea: Some("SQL idea: **count rows** in the `customers` table."),
    sql: Some("SELECT COUNT(*) AS total_customers\nFROM customers;"),
    body: &["In words: we count how many unique customers we have in our store."],
};

pub const ORDERS_BY_MONTH: Section = Section {
    number: Some(2),
    heading: "How many orders did we receive last month?",
    idea: Some("SQL idea: **filter by date** with `WHERE`, then **count**."),
    sql: Some(
        "SELECT COUNT(*) AS orders_last_month\nFROM orders\nWHERE order_date >= '2024-01-01'\n  AND order_date <  '2024-02-01';",
    ),
    body: &[
        "In words: we take only the orders in the selected month and count how many there are.",
    ],
};

pub const REVENUE: Section = Section {
    number: Some(3),
    heading: "Which country brings the most revenue?",
    idea: Some("SQL idea: `GROUP BY country` and `SUM(total_amount)`."),
    sql: Some(
        "SELECT country,\n       SUM(total_amount) AS revenue\nFROM orders\nGROUP BY country\nORDER BY revenue DESC;",
    ),
    body: &[
        "In words: we put all orders from the same country together, add up the money in each group, and compare countries.",
        "These numbers are just **example data**, but the logic is the same you would use with real sales.",
    ],
};

pub const RECAP: Section = Section {
    number: Some(4),
    heading: "Recap",
    idea: None,
    sql: None,
    body: &[
        "With just three SQL patterns:",
        "- **COUNT** rows",
        "- **WHERE** to filter",
        "- **GROUP BY** + **SUM** to aggregate",
        "we can already answer key questions about customers, orders and revenue in a simple online store.",
    ],
};

/// Every section in page order
pub const SECTIONS: [&Section; 5] = [&DATA_MODEL, &CUSTOMERS, &ORDERS_BY_MONTH, &REVENUE, &RECAP];

/// Everything a front end needs to draw the page for one selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonView {
    pub title: &'static str,
    pub intro: &'static str,
    pub sections: Vec<Section>,
    pub total_customers: usize,
    pub month_options: Vec<String>,
    pub selected_month: String,
    pub orders_in_month: Vec<Order>,
    pub orders_in_month_count: usize,
    pub revenue_by_country: Vec<CountryRevenue>,
    pub total_revenue: i64,
}

impl LessonView {
    pub fn orders_metric_label(&self) -> String {
        format!("Orders in {}", self.selected_month)
    }

    pub fn max_revenue(&self) -> i64 {
        self.revenue_by_country
            .iter()
            .map(|r| r.revenue)
            .max()
            .unwrap_or(0)
    }
}

pub struct Lesson;

impl Lesson {
    /// Run the full derivation chain for `month` (the first month when `None`)
    pub fn build(dataset: &Dataset, month: Option<&str>) -> Result<LessonView> {
        let total_customers = queries::count_customers(dataset.customers())?;

        let selector = MonthSelector::from_orders(dataset.orders())?;
        let selected_month = selector.select(month)?.to_string();
        let in_month = queries::orders_in_month(dataset.orders(), &selected_month)?;
        let orders_in_month = dataset.rows_by_id(&queries::order_ids(&in_month)?);

        let revenue = queries::revenue_by_country(dataset.orders())?;
        let revenue_by_country = queries::country_revenues(&revenue)?;
        let total_revenue = queries::total_revenue(dataset.orders())?;

        debug!(
            "Lesson built for {}: {} orders in month, {} countries",
            selected_month,
            in_month.height(),
            revenue_by_country.len()
        );

        Ok(LessonView {
            title: TITLE,
            intro: INTRO,
            sections: SECTIONS.iter().map(|s| (*s).clone()).collect(),
            total_customers,
            month_options: selector.options().to_vec(),
            selected_month,
            orders_in_month_count: in_month.height(),
            orders_in_month,
            revenue_by_country,
            total_revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_month() {
        let dataset = Dataset::sample().unwrap();
        let view = Lesson::build(&dataset, None).unwrap();

        assert_eq!(view.total_customers, 5);
        assert_eq!(view.selected_month, "2024-01");
        assert_eq!(view.orders_in_month_count, 3);
        assert_eq!(view.orders_metric_label(), "Orders in 2024-01");
        assert_eq!(view.total_revenue, 640);
        assert_eq!(view.max_revenue(), 330);
        assert_eq!(view.sections.len(), 5);
    }

    #[test]
    fn test_build_is_idempotent() {
        let dataset = Dataset::sample().unwrap();
        let first = Lesson::build(&dataset, Some("2024-02")).unwrap();
        let second = Lesson::build(&dataset, Some("2024-02")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_orders_in_month_rows() {
        let dataset = Dataset::sample().unwrap();
        let view = Lesson::build(&dataset, Some("2024-03")).unwrap();
        let amounts: Vec<i64> = view.orders_in_month.iter().map(|o| o.total_amount).collect();
        assert_eq!(amounts, vec![55, 100, 150]);
    }

    #[test]
    fn test_only_numbered_sections_have_sql() {
        for section in SECTIONS {
            if section.sql.is_some() {
                assert!(section.number.is_some());
                assert!(section.idea.is_some());
            }
        }
    }
}
