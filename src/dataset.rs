//! Sample Dataset - the fixed order table and the customers derived from it

use crate::error::{DemoError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Days between 0001-01-01 (CE) and 1970-01-01, polars' date epoch
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// order_id, customer_id, country, order_date, total_amount
pub const SAMPLE_ORDERS: [(i64, i64, &str, &str, i64); 8] = [
    (1, 1, "USA", "2024-01-05", 120),
    (2, 1, "Spain", "2024-01-20", 45),
    (3, 2, "Germany", "2024-01-15", 30),
    (4, 3, "Italy", "2024-02-10", 80),
    (5, 4, "USA", "2024-02-25", 60),
    (6, 2, "Spain", "2024-03-03", 55),
    (7, 3, "Germany", "2024-03-12", 100),
    (8, 5, "USA", "2024-03-20", 150),
];

/// A single purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub country: String,
    pub order_date: NaiveDate,
    pub total_amount: i64,
}

impl Order {
    /// Build an order from literal fields, parsing the ISO date
    pub fn from_literal(
        order_id: i64,
        customer_id: i64,
        country: &str,
        order_date: &str,
        total_amount: i64,
    ) -> Result<Self> {
        let order_date = NaiveDate::parse_from_str(order_date, "%Y-%m-%d").map_err(|e| {
            DemoError::InvalidDate {
                literal: order_date.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            order_id,
            customer_id,
            country: country.to_string(),
            order_date,
            total_amount,
        })
    }
}

/// The in-memory tables every derivation reads from.
///
/// Built once and never mutated; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Order>,
    orders: DataFrame,
    customers: DataFrame,
}

impl Dataset {
    /// The eight hard-coded store orders
    pub fn sample() -> Result<Self> {
        let rows = SAMPLE_ORDERS
            .iter()
            .map(|&(id, customer, country, date, amount)| {
                Order::from_literal(id, customer, country, date, amount)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_orders(rows)
    }

    pub fn from_orders(rows: Vec<Order>) -> Result<Self> {
        let orders = orders_frame(&rows)?;
        let customers = customers_frame(&orders)?;

        debug!(
            "Dataset ready: {} orders, {} customers",
            orders.height(),
            customers.height()
        );

        Ok(Self {
            rows,
            orders,
            customers,
        })
    }

    pub fn orders(&self) -> &DataFrame {
        &self.orders
    }

    pub fn customers(&self) -> &DataFrame {
        &self.customers
    }

    pub fn rows(&self) -> &[Order] {
        &self.rows
    }

    /// Look up literal rows by id, keeping the order of `ids`
    pub fn rows_by_id(&self, ids: &[i64]) -> Vec<Order> {
        ids.iter()
            .filter_map(|id| self.rows.iter().find(|o| o.order_id == *id))
            .cloned()
            .collect()
    }
}

fn orders_frame(rows: &[Order]) -> Result<DataFrame> {
    let order_ids: Vec<i64> = rows.iter().map(|o| o.order_id).collect();
    let customer_ids: Vec<i64> = rows.iter().map(|o| o.customer_id).collect();
    let countries: Vec<&str> = rows.iter().map(|o| o.country.as_str()).collect();
    let days: Vec<i32> = rows
        .iter()
        .map(|o| o.order_date.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
        .collect();
    let amounts: Vec<i64> = rows.iter().map(|o| o.total_amount).collect();

    let order_date = Series::new("order_date", days).cast(&DataType::Date)?;

    let df = DataFrame::new(vec![
        Series::new("order_id", order_ids),
        Series::new("customer_id", customer_ids),
        Series::new("country", countries),
        order_date,
        Series::new("total_amount", amounts),
    ])?;

    Ok(df)
}

/// Distinct (customer_id, country) pairs, in first-seen order
fn customers_frame(orders: &DataFrame) -> Result<DataFrame> {
    let df = orders
        .clone()
        .lazy()
        .select([col("customer_id"), col("country")])
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_shapes() {
        let dataset = Dataset::sample().unwrap();
        assert_eq!(dataset.orders().height(), 8);
        // customers 1, 2 and 3 each ordered from two countries
        assert_eq!(dataset.customers().height(), 8);
        assert_eq!(
            dataset.orders().column("order_date").unwrap().dtype(),
            &DataType::Date
        );
    }

    #[test]
    fn test_customers_are_distinct_pairs() {
        let dataset = Dataset::sample().unwrap();
        let customers = dataset.customers();
        let ids = customers.column("customer_id").unwrap().i64().unwrap();
        let countries = customers.column("country").unwrap().str().unwrap();

        let pairs: Vec<(i64, &str)> = ids
            .into_iter()
            .zip(countries.into_iter())
            .filter_map(|(id, country)| Some((id?, country?)))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (1, "USA"),
                (1, "Spain"),
                (2, "Germany"),
                (3, "Italy"),
                (4, "USA"),
                (2, "Spain"),
                (3, "Germany"),
                (5, "USA"),
            ]
        );
    }

    #[test]
    fn test_malformed_date_fails_fast() {
        let err = Order::from_literal(9, 6, "France", "2024-13-01", 10).unwrap_err();
        assert!(matches!(err, DemoError::InvalidDate { .. }));
    }

    #[test]
    fn test_rows_by_id_preserves_order() {
        let dataset = Dataset::sample().unwrap();
        let rows = dataset.rows_by_id(&[8, 6, 42]);
        let ids: Vec<i64> = rows.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![8, 6]);
    }
}
