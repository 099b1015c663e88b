use super::{bar_len, spans, Span};
use crate::lesson::{LessonView, Section};
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

/// Terminal rendering of the whole page
pub fn render(view: &LessonView, chart_width: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, " {}", view.title);
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{}\n", plain(view.intro));

    for section in &view.sections {
        write_heading(&mut out, section);

        if let Some(idea) = section.idea {
            let _ = writeln!(out, "{}\n", plain(idea));
        }
        if let Some(sql) = section.sql {
            for line in sql.lines() {
                let _ = writeln!(out, "    {}", line);
            }
            out.push('\n');
        }

        match section.number {
            Some(1) => write_metric(&mut out, "Total customers", view.total_customers),
            Some(2) => {
                write_dropdown(&mut out, view);
                write_metric(&mut out, &view.orders_metric_label(), view.orders_in_month_count);
                write_month_orders(&mut out, view);
            }
            Some(3) => write_chart(&mut out, view, chart_width),
            _ => {}
        }

        for line in section.body {
            let _ = writeln!(out, "{}", plain(line));
        }
        out.push('\n');
    }

    out
}

/// Prose with inline markers removed
pub fn plain(text: &str) -> String {
    spans(text)
        .into_iter()
        .map(|span| match span {
            Span::Plain(s) | Span::Strong(s) | Span::Code(s) => s,
        })
        .collect()
}

fn write_heading(out: &mut String, section: &Section) {
    let heading = match section.number {
        Some(n) => format!("{}. {}", n, section.heading),
        None => section.heading.to_string(),
    };
    let _ = writeln!(out, "{}", heading);
    let _ = writeln!(out, "{}", "-".repeat(heading.chars().count()));
}

fn write_metric(out: &mut String, label: &str, value: usize) {
    let _ = writeln!(out, "  {}: {}\n", label, value);
}

fn write_dropdown(out: &mut String, view: &LessonView) {
    let _ = writeln!(out, "Choose a month:");
    for (i, option) in view.month_options.iter().enumerate() {
        let marker = if *option == view.selected_month { '*' } else { ' ' };
        let _ = writeln!(out, "  [{}] {}. {}", marker, i + 1, option);
    }
    out.push('\n');
}

fn write_month_orders(out: &mut String, view: &LessonView) {
    if view.orders_in_month.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "  {:>8}  {:>11}  {:<8}  {:<10}  {:>6}",
        "order_id", "customer_id", "country", "order_date", "amount"
    );
    for order in &view.orders_in_month {
        let _ = writeln!(
            out,
            "  {:>8}  {:>11}  {:<8}  {:<10}  {:>6}",
            order.order_id,
            order.customer_id,
            order.country,
            order.order_date.format("%Y-%m-%d"),
            order.total_amount
        );
    }
    out.push('\n');
}

fn write_chart(out: &mut String, view: &LessonView, width: usize) {
    let max = view.max_revenue();
    let label_width = view
        .revenue_by_country
        .iter()
        .map(|r| r.country.chars().count())
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "Revenue by country:");
    for row in &view.revenue_by_country {
        let _ = writeln!(
            out,
            "  {:<label_width$} | {} {}",
            row.country,
            "█".repeat(bar_len(row.revenue, max, width)),
            row.revenue,
        );
    }
    let _ = writeln!(out, "  {:<label_width$} | total {}\n", "", view.total_revenue);
}
