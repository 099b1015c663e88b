use sql_for_humans::config::{self, DemoConfig};
use sql_for_humans::render::text;
use sql_for_humans::server::LessonServer;
use sql_for_humans::{logging, Dataset, Lesson, MonthSelector};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sql-for-humans")]
#[command(about = "SQL for Humans: COUNT, WHERE and GROUP BY on a tiny online store")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the lesson page once
    Show {
        /// Month to filter orders by (YYYY-MM, default: first month in the data)
        #[arg(short, long)]
        month: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Width of the longest chart bar (or set SQL_DEMO_CHART_WIDTH)
        #[arg(short, long)]
        width: Option<String>,
    },
    /// Print the page, then redraw it for every month you pick
    Interactive {
        /// Width of the longest chart bar (or set SQL_DEMO_CHART_WIDTH)
        #[arg(short, long)]
        width: Option<String>,
    },
    /// List the months the dropdown offers
    Months,
    /// Serve the page over HTTP
    Serve {
        /// Address to listen on (or set SQL_DEMO_ADDR)
        #[arg(short, long)]
        addr: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();
    let mut config = DemoConfig::from_env()?;
    let dataset = Arc::new(Dataset::sample()?);

    match args.command {
        Commands::Show { month, format, width } => {
            if let Some(width) = width {
                config.chart_width = config::parse_chart_width(&width)?;
            }
            show(&dataset, month.as_deref(), format, config.chart_width)
        }
        Commands::Interactive { width } => {
            if let Some(width) = width {
                config.chart_width = config::parse_chart_width(&width)?;
            }
            interactive(&dataset, config.chart_width)
        }
        Commands::Months => {
            let selector = MonthSelector::from_orders(dataset.orders())?;
            println!("{}", selector.options().iter().join("\n"));
            Ok(())
        }
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.addr = config::parse_addr(&addr)?;
            }
            LessonServer::new(dataset).run(config.addr).await?;
            Ok(())
        }
    }
}

fn show(dataset: &Dataset, month: Option<&str>, format: Format, chart_width: usize) -> Result<()> {
    let view = Lesson::build(dataset, month)?;
    match format {
        Format::Text => print!("{}", text::render(&view, chart_width)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&view)?),
    }
    Ok(())
}

/// Redraw the whole page after every pick; empty input or `q` quits
fn interactive(dataset: &Dataset, chart_width: usize) -> Result<()> {
    let selector = MonthSelector::from_orders(dataset.orders())?;
    let mut month = selector.select(None)?.to_string();
    let stdin = io::stdin();

    loop {
        let view = Lesson::build(dataset, Some(&month))?;
        print!("{}", text::render(&view, chart_width));
        print!("Choose a month (1-{}, or YYYY-MM; Enter to quit): ", selector.options().len());
        io::stdout().flush()?;

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer)? == 0 {
            break;
        }
        let answer = answer.trim();
        if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
            break;
        }

        match selector.select_by_answer(answer) {
            Ok(selected) => {
                info!("Month selected: {}", selected);
                month = selected.to_string();
            }
            Err(e) => println!("\n{}\n", e),
        }
    }

    Ok(())
}
