mod app;
mod config;
mod report;
mod sampling;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use report::Report;
use sampling::{ConfidenceLevel, MarginOfError, PopulationSize, SizingRequest};
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "billsample")]
#[command(version)]
#[command(about = "How many records must you check to trust a bill?")]
struct Args {
    /// Total number of records on the bill
    #[arg(short, long, value_name = "N")]
    population: Option<PopulationSize>,

    /// Confidence level in percent (90, 95 or 99)
    #[arg(short, long, value_name = "LEVEL")]
    confidence: Option<ConfidenceLevel>,

    /// Margin of error in percent (1-100; the slider offers 1-10)
    #[arg(short, long, value_name = "PCT")]
    margin: Option<MarginOfError>,

    /// Config file (default: ~/.config/billsample/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the result as a sentence and exit
    #[arg(short, long, conflicts_with_all = ["json", "curve"])]
    report: bool,

    /// Print the estimate as JSON and exit
    #[arg(short, long, conflicts_with = "curve")]
    json: bool,

    /// Stream the sample size for every population 1..=N as JSON lines and exit
    #[arg(long)]
    curve: bool,
}

impl Args {
    /// Command-line values layered over the config defaults
    fn request(&self, config: &AppConfig) -> SizingRequest {
        let defaults = &config.defaults;
        SizingRequest::new(
            self.population.unwrap_or(defaults.population),
            self.confidence.unwrap_or(defaults.confidence),
            self.margin.unwrap_or(defaults.margin),
        )
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    let request = args.request(&config);
    if !request.margin.within_slider() {
        tracing::warn!(
            "Margin {} is outside the usual {}-{}% range",
            request.margin,
            MarginOfError::SLIDER_RANGE.start(),
            MarginOfError::SLIDER_RANGE.end()
        );
    }

    // Handle CLI-only commands
    if args.report {
        return print_report(&request);
    }

    if args.json {
        return print_json(&request);
    }

    if args.curve {
        return print_curve(&request);
    }

    // Run TUI
    let mut config = config;
    config.defaults.population = request.population;
    config.defaults.confidence = request.confidence;
    config.defaults.margin = request.margin;
    run_tui(&config)
}

fn print_report(request: &SizingRequest) -> Result<()> {
    let estimate = sampling::estimate(request);
    println!("{}", Report::new(&estimate).to_text());
    Ok(())
}

fn print_json(request: &SizingRequest) -> Result<()> {
    let estimate = sampling::estimate(request);
    let output = serde_json::json!({
        "estimate": estimate,
        "headline": Report::new(&estimate).headline(),
        "sentence": Report::new(&estimate).to_string(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_curve(request: &SizingRequest) -> Result<()> {
    let curve = sampling::sensitivity_curve(request.population, request.confidence, request.margin);
    tracing::info!("Streaming {} curve points", curve.max_population());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for point in curve {
        serde_json::to_writer(&mut out, &point)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn run_tui(config: &AppConfig) -> Result<()> {
    ui::init_theme(Theme::from_config(&config.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Invalid input is shown on screen instead of ending the session
                            if let Err(e) = app.handle_key(key) {
                                tracing::debug!("Rejected input: {}", e);
                            }
                        }
                    }
                }
            }
        }

        app.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config_defaults() {
        let args = Args::try_parse_from(["billsample", "-p", "1000", "-c", "90", "-m", "10"]).unwrap();
        let request = args.request(&AppConfig::default());

        assert_eq!(request, SizingRequest::from_raw(1000, 90, 10).unwrap());
        assert_eq!(sampling::estimate(&request).sample_size, 64);
    }

    #[test]
    fn test_cli_falls_back_to_config() {
        let args = Args::try_parse_from(["billsample", "--json"]).unwrap();
        let request = args.request(&AppConfig::default());

        assert!(args.json);
        assert_eq!(request, SizingRequest::default());
    }

    #[test]
    fn test_cli_rejects_invalid_inputs() {
        assert!(Args::try_parse_from(["billsample", "-c", "80"]).is_err());
        assert!(Args::try_parse_from(["billsample", "-p", "0"]).is_err());
        assert!(Args::try_parse_from(["billsample", "-m", "101"]).is_err());
        assert!(Args::try_parse_from(["billsample", "--report", "--curve"]).is_err());
    }
}
