use super::{spans, Span};
use crate::lesson::{LessonView, Section};
use std::fmt::Write;

/// Chart plot height in pixels
const CHART_HEIGHT: i64 = 220;

const STYLE: &str = "body{font-family:sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem;color:#262730}\
pre{background:#f0f2f6;padding:.8rem;border-radius:.4rem}\
code{background:#f0f2f6;padding:0 .2rem}\
.metric{margin:1rem 0}.metric .label{font-size:.9rem;color:#555}.metric .value{font-size:2.2rem}\
.chart{display:flex;align-items:flex-end;gap:1rem;height:260px;border-bottom:1px solid #999;padding-top:1rem}\
.bar{flex:1;display:flex;flex-direction:column;justify-content:flex-end;align-items:center}\
.bar .fill{width:100%;background:#1f77b4}.bar .country{margin-top:.3rem}\
table{border-collapse:collapse}td,th{padding:.2rem .6rem;border-bottom:1px solid #ddd}";

/// The whole page as one self-contained HTML document
pub fn render(view: &LessonView) -> String {
    let mut out = String::new();

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape(view.title),
        STYLE
    );
    let _ = writeln!(out, "<h1>{}</h1>", escape(view.title));
    let _ = writeln!(out, "<p>{}</p>", inline(view.intro));

    for section in &view.sections {
        write_section(&mut out, view, section);
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Prose with inline markers turned into `<strong>` and `<code>`
fn inline(text: &str) -> String {
    spans(text)
        .into_iter()
        .map(|span| match span {
            Span::Plain(s) => escape(s),
            Span::Strong(s) => format!("<strong>{}</strong>", escape(s)),
            Span::Code(s) => format!("<code>{}</code>", escape(s)),
        })
        .collect()
}

fn write_section(out: &mut String, view: &LessonView, section: &Section) {
    match section.number {
        Some(n) => {
            let _ = writeln!(out, "<h2>{}. {}</h2>", n, escape(section.heading));
        }
        None => {
            let _ = writeln!(out, "<h3>{}</h3>", escape(section.heading));
        }
    }

    if let Some(idea) = section.idea {
        let _ = writeln!(out, "<p>{}</p>", inline(idea));
    }
    if let Some(sql) = section.sql {
        let _ = writeln!(out, "<pre><code class=\"language-sql\">{}</code></pre>", escape(sql));
    }

    match section.number {
        Some(1) => write_metric(out, "Total customers", view.total_customers),
        Some(2) => {
            write_dropdown(out, view);
            write_metric(out, &view.orders_metric_label(), view.orders_in_month_count);
            write_month_orders(out, view);
        }
        Some(3) => write_chart(out, view),
        _ => {}
    }

    write_body(out, section.body);
}

/// Body lines; consecutive `- ` lines become one list
fn write_body(out: &mut String, lines: &[&str]) {
    let mut in_list = false;
    for line in lines {
        match line.strip_prefix("- ") {
            Some(item) => {
                if !in_list {
                    out.push_str("<ul>\n");
                    in_list = true;
                }
                let _ = writeln!(out, "<li>{}</li>", inline(item));
            }
            None => {
                if in_list {
                    out.push_str("</ul>\n");
                    in_list = false;
                }
                let _ = writeln!(out, "<p>{}</p>", inline(line));
            }
        }
    }
    if in_list {
        out.push_str("</ul>\n");
    }
}

fn write_metric(out: &mut String, label: &str, value: usize) {
    let _ = writeln!(
        out,
        "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        escape(label),
        value
    );
}

fn write_dropdown(out: &mut String, view: &LessonView) {
    out.push_str("<form method=\"get\" action=\"/\">\n<label for=\"month\">Choose a month:</label>\n");
    out.push_str("<select id=\"month\" name=\"month\" onchange=\"this.form.submit()\">\n");
    for option in &view.month_options {
        let selected = if *option == view.selected_month { " selected" } else { "" };
        let _ = writeln!(
            out,
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(option),
            selected
        );
    }
    out.push_str("</select>\n<noscript><button type=\"submit\">Show</button></noscript>\n</form>\n");
}

fn write_month_orders(out: &mut String, view: &LessonView) {
    if view.orders_in_month.is_empty() {
        return;
    }
    out.push_str("<table>\n<tr><th>order_id</th><th>customer_id</th><th>country</th><th>order_date</th><th>total_amount</th></tr>\n");
    for order in &view.orders_in_month {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            order.order_id,
            order.customer_id,
            escape(&order.country),
            order.order_date.format("%Y-%m-%d"),
            order.total_amount
        );
    }
    out.push_str("</table>\n");
}

fn write_chart(out: &mut String, view: &LessonView) {
    let max = view.max_revenue();
    out.push_str("<div class=\"chart\" role=\"img\" aria-label=\"Revenue by country\">\n");
    for row in &view.revenue_by_country {
        let height = if max > 0 { row.revenue * CHART_HEIGHT / max } else { 0 };
        let _ = writeln!(
            out,
            "<div class=\"bar\" title=\"{0}: {1}\"><span>{1}</span><div class=\"fill\" style=\"height:{2}px\"></div><span class=\"country\">{0}</span></div>",
            escape(&row.country),
            row.revenue,
            height
        );
    }
    out.push_str("</div>\n");
}
