use lme_datahub::analysis::{charts, report, summary};
use lme_datahub::config::Config;
use lme_datahub::data_provider::PriceDataProvider;
use lme_datahub::errors::LmeHubError;
use lme_datahub::models::record::PriceRecord;
use lme_datahub::scrapers::base::PriceScraper;
use lme_datahub::scrapers::westmetall::WestmetallScraper;
use lme_datahub::services::collector::CollectorService;

use clap::{App, Arg, SubCommand};
use log::info;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

/// Rolling window for the volatility analysis, in trading days
const VOLATILITY_WINDOW: usize = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let app = App::new("LmeDataHub")
        .version("0.1.0")
        .author("LmeDataHub Team")
        .about("LME copper market data collection and analysis");

    #[cfg(debug_assertions)]
    let app = app
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Enable debug mode")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("debug-limit")
                .long("debug-limit")
                .help("Limit the number of pages to fetch in debug mode")
                .takes_value(true)
                .default_value("5"),
        );

    let app = app
        .subcommand(
            SubCommand::with_name("scrape")
                .about("Scrape LME copper data from Westmetall")
                .arg(
                    Arg::with_name("start-year")
                        .short('y')
                        .long("start-year")
                        .value_name("YEAR")
                        .help("First year to collect data for")
                        .takes_value(true)
                        .default_value("2010"),
                )
                .arg(
                    Arg::with_name("delay-ms")
                        .long("delay-ms")
                        .value_name("MILLIS")
                        .help("Politeness delay between page requests")
                        .takes_value(true)
                        .default_value("1000"),
                )
                .arg(
                    Arg::with_name("data-dir")
                        .short('d')
                        .long("data-dir")
                        .value_name("DIR")
                        .help("Directory for the exported CSV file")
                        .takes_value(true)
                        .default_value("data"),
                ),
        )
        .subcommand(
            SubCommand::with_name("analyze")
                .about("Interactive analysis of previously scraped data")
                .arg(
                    Arg::with_name("data-dir")
                        .short('d')
                        .long("data-dir")
                        .value_name("DIR")
                        .help("Directory containing the scraped CSV file")
                        .takes_value(true)
                        .default_value("data"),
                ),
        );

    let matches = app.get_matches();

    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_page_limit = matches
        .value_of("debug-limit")
        .unwrap_or("5")
        .parse::<usize>()
        .unwrap_or(5);
    #[cfg(not(debug_assertions))]
    let debug_page_limit = usize::MAX;

    if let Some(matches) = matches.subcommand_matches("scrape") {
        let start_year = matches
            .value_of("start-year")
            .unwrap_or("2010")
            .parse::<i32>()?;
        let delay_ms = matches
            .value_of("delay-ms")
            .unwrap_or("1000")
            .parse::<u64>()?;
        let data_dir = matches.value_of("data-dir").unwrap_or("data");

        let config = Config::new()
            .with_debug_mode(debug_mode)
            .with_debug_page_limit(debug_page_limit)
            .with_start_year(start_year)
            .with_request_delay_ms(delay_ms)
            .with_data_dir(data_dir);

        run_scrape(config).await?;
    } else if let Some(matches) = matches.subcommand_matches("analyze") {
        let data_dir = matches.value_of("data-dir").unwrap_or("data");
        run_analyze(data_dir)?;
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

async fn run_scrape(config: Config) -> Result<(), Box<dyn Error>> {
    let scraper: Arc<dyn PriceScraper + Send + Sync> = Arc::new(WestmetallScraper::new(
        config.request_timeout_secs,
        config.request_delay_ms,
    )?);

    let service = CollectorService::new(config, scraper);
    let records = service.collect().await?;

    if records.is_empty() {
        println!("No data was scraped");
        return Ok(());
    }

    let path = service.save_to_csv(&records)?;

    println!("Data saved to {}", path.display());
    println!("Total records: {}", records.len());

    println!("\nSample data:");
    print_records(&records[..records.len().min(10)]);

    Ok(())
}

fn run_analyze(data_dir: &str) -> Result<(), Box<dyn Error>> {
    println!("LME Copper Data Analysis Tool");
    println!("{}", "=".repeat(40));

    let csv_path = Path::new(data_dir).join("lme_copper_historical_data.csv");
    let provider = match PriceDataProvider::load_from_file(csv_path.to_str().unwrap_or_default()) {
        Ok(provider) => provider,
        Err(LmeHubError::DataFileMissing(path)) => {
            println!("Data file not found: {}", path);
            println!("Please run the scraper first: lme_datahub scrape");
            return Ok(());
        }
        Err(e) => {
            println!("Error loading data: {}", e);
            return Ok(());
        }
    };

    if provider.is_empty() {
        println!("Data file is empty. Please run the scraper first: lme_datahub scrape");
        return Ok(());
    }

    if let Some((first, last)) = provider.date_range() {
        println!(
            "Loaded {} records from {} to {}",
            provider.len(),
            first,
            last
        );
    }

    run_menu(provider.records(), Path::new(data_dir));
    Ok(())
}

fn run_menu(records: &[PriceRecord], out_dir: &Path) {
    let stdin = io::stdin();

    loop {
        println!("\nAvailable Analysis Options:");
        println!("1. Display Summary Statistics");
        println!("2. Plot Price Trends");
        println!("3. Plot Price Distribution");
        println!("4. Plot Volatility Analysis");
        println!("5. Show Correlation Matrix");
        println!("6. Display Yearly Summary");
        println!("7. Export Full Analysis Report");
        println!("8. Generate All Charts");
        println!("9. Exit");
        print!("\nSelect an option (1-9): ");
        let _ = io::stdout().flush();

        let mut choice = String::new();
        if stdin.lock().read_line(&mut choice).is_err() {
            break;
        }

        match choice.trim() {
            "1" => show_summary(records),
            "2" => {
                println!("Generating price trends chart...");
                report_outcome(charts::plot_price_trends(records, out_dir));
            }
            "3" => {
                println!("Generating price distribution charts...");
                report_outcome(charts::plot_price_distribution(records, out_dir));
            }
            "4" => {
                println!("Generating volatility analysis...");
                report_outcome(charts::plot_volatility(records, VOLATILITY_WINDOW, out_dir));
            }
            "5" => {
                println!("Generating correlation matrix...");
                show_correlation(records);
                report_outcome(charts::plot_correlation_matrix(records, out_dir));
            }
            "6" => show_yearly(records),
            "7" => {
                println!("Exporting full analysis report...");
                report_outcome(report::export_report(records, out_dir));
            }
            "8" => {
                println!("Generating all charts...");
                report_outcome(charts::plot_price_trends(records, out_dir));
                report_outcome(charts::plot_price_distribution(records, out_dir));
                report_outcome(charts::plot_volatility(records, VOLATILITY_WINDOW, out_dir));
                report_outcome(charts::plot_correlation_matrix(records, out_dir));
                report_outcome(report::export_report(records, out_dir));
                println!("All analysis complete!");
            }
            "9" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid option. Please select 1-9."),
        }
    }
}

fn report_outcome<T>(result: lme_datahub::Result<T>) {
    if let Err(e) = result {
        println!("Analysis failed: {}", e);
    }
}

fn show_summary(records: &[PriceRecord]) {
    match summary::summary(records) {
        Some(summary) => {
            println!("\n=== SUMMARY STATISTICS ===\n");
            print!("{}", report::render_summary_text(&summary));
        }
        None => println!("No data available for analysis."),
    }
}

fn show_yearly(records: &[PriceRecord]) {
    println!("\n=== YEARLY SUMMARY ===\n");
    print!(
        "{}",
        report::render_yearly_text(&summary::yearly_summary(records))
    );
}

fn show_correlation(records: &[PriceRecord]) {
    let matrix = summary::correlation_matrix(records);

    println!();
    for (i, label) in summary::CORRELATION_LABELS.iter().enumerate() {
        let row: Vec<String> = matrix[i]
            .iter()
            .map(|v| {
                if v.is_nan() {
                    "   n/a".to_string()
                } else {
                    format!("{:>6.3}", v)
                }
            })
            .collect();
        println!("{:<28} {}", label, row.join("  "));
    }
}

fn print_records(records: &[PriceRecord]) {
    println!(
        "{:<12} {:>16} {:>12} {:>12}",
        "date", "cash_settlement", "3_month", "stock"
    );
    for record in records {
        println!(
            "{:<12} {:>16} {:>12} {:>12}",
            record.date,
            record
                .cash_settlement
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
            record
                .three_month
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
            record
                .stock
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}
