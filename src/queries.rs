//! The three classroom queries, as dataframe one-liners
//!
//! * COUNT      - distinct customers
//! * WHERE      - orders falling in a calendar month
//! * GROUP BY   - revenue summed per country

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const MONTH_COLUMN: &str = "month";
pub const REVENUE_COLUMN: &str = "revenue";

/// `YYYY-MM` label of an order date
fn month_label_expr() -> Expr {
    col("order_date").dt().to_string("%Y-%m")
}

/// SELECT COUNT(DISTINCT customer_id) FROM customers
pub fn count_customers(customers: &DataFrame) -> Result<usize> {
    if customers.height() == 0 {
        return Ok(0);
    }
    Ok(customers.column("customer_id")?.n_unique()?)
}

/// Distinct year-month labels present in the orders, sorted (ISO labels sort chronologically)
pub fn month_labels(orders: &DataFrame) -> Result<Vec<String>> {
    let df = orders
        .clone()
        .lazy()
        .select([month_label_expr().alias(MONTH_COLUMN)])
        .unique(None, UniqueKeepStrategy::Any)
        .sort([MONTH_COLUMN], SortMultipleOptions::default())
        .collect()?;

    let labels = df
        .column(MONTH_COLUMN)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    Ok(labels)
}

/// SELECT * FROM orders WHERE order_date falls in `month`
pub fn orders_in_month(orders: &DataFrame, month: &str) -> Result<DataFrame> {
    let df = orders
        .clone()
        .lazy()
        .filter(month_label_expr().eq(lit(month)))
        .collect()?;

    Ok(df)
}

/// SELECT country, SUM(total_amount) AS revenue FROM orders GROUP BY country
///
/// Rows come back ordered by country, the order the chart draws its axis in.
pub fn revenue_by_country(orders: &DataFrame) -> Result<DataFrame> {
    let df = orders
        .clone()
        .lazy()
        .group_by([col("country")])
        .agg([col("total_amount").sum().alias(REVENUE_COLUMN)])
        .sort(["country"], SortMultipleOptions::default())
        .collect()?;

    Ok(df)
}

pub fn total_revenue(orders: &DataFrame) -> Result<i64> {
    if orders.height() == 0 {
        return Ok(0);
    }
    Ok(orders.column("total_amount")?.sum::<i64>()?)
}

/// One bar of the revenue chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRevenue {
    pub country: String,
    pub revenue: i64,
}

/// Pull the `(country, revenue)` rows out of a `revenue_by_country` frame
pub fn country_revenues(revenue: &DataFrame) -> Result<Vec<CountryRevenue>> {
    let countries = revenue.column("country")?.str()?;
    let totals = revenue.column(REVENUE_COLUMN)?.cast(&DataType::Int64)?;
    let totals = totals.i64()?;

    let rows = countries
        .into_iter()
        .zip(totals.into_iter())
        .filter_map(|(country, total)| {
            Some(CountryRevenue {
                country: country?.to_string(),
                revenue: total.unwrap_or(0),
            })
        })
        .collect();

    Ok(rows)
}

/// The order ids of a frame, in row order
pub fn order_ids(orders: &DataFrame) -> Result<Vec<i64>> {
    Ok(orders
        .column("order_id")?
        .i64()?
        .into_iter()
        .flatten()
        .collect())
}
