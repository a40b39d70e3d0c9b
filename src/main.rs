mod app;
mod calc;
mod chart;
mod config;
mod sequence;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use calc::RawInputs;
use config::AppConfig;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "interes")]
#[command(version = "0.1.0")]
#[command(about = "A terminal compound-interest calculator with yearly balance charts")]
struct Args {
    /// Initial balance (any form value runs without the TUI)
    #[arg(short = 'b', long, allow_hyphen_values = true)]
    initial_balance: Option<String>,

    /// Deposit added every capitalization period
    #[arg(short, long, allow_hyphen_values = true)]
    deposit: Option<String>,

    /// Annual interest rate in percent
    #[arg(short, long, allow_hyphen_values = true)]
    rate: Option<String>,

    /// Capitalization periods per year
    #[arg(short, long, allow_hyphen_values = true)]
    capitalization: Option<String>,

    /// Duration in years
    #[arg(short = 'y', long, allow_hyphen_values = true)]
    duration: Option<String>,

    /// Print inputs and every yearly balance as JSON
    #[arg(long)]
    json: bool,

    /// Show the whole screen at once instead of playing the intro
    #[arg(long)]
    no_animation: bool,
}

impl Args {
    fn is_headless(&self) -> bool {
        self.json
            || self.initial_balance.is_some()
            || self.deposit.is_some()
            || self.rate.is_some()
            || self.capitalization.is_some()
            || self.duration.is_some()
    }

    /// Form values from the flags, falling back to the configured defaults
    fn raw_inputs(&self, defaults: &RawInputs) -> RawInputs {
        let pick = |flag: &Option<String>, default: &String| flag.clone().unwrap_or_else(|| default.clone());
        RawInputs {
            initial_balance: pick(&self.initial_balance, &defaults.initial_balance),
            deposit: pick(&self.deposit, &defaults.deposit),
            interest_rate: pick(&self.rate, &defaults.interest_rate),
            capitalization: pick(&self.capitalization, &defaults.capitalization),
            duration: pick(&self.duration, &defaults.duration),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();

    if args.is_headless() {
        return print_result(&args, &config);
    }

    // Run TUI
    run_tui(config, !args.no_animation).await
}

fn print_result(args: &Args, config: &AppConfig) -> Result<()> {
    let raw = args.raw_inputs(&config.defaults);
    let inputs = calc::validate(&raw)?;
    let series = calc::balance_series(&inputs)?;

    if args.json {
        let output = serde_json::json!({
            "inputs": inputs,
            "balances": series,
            "final_balance": series.final_balance(),
            "overflowed": !series.is_finite(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", app::final_balance_message(&inputs, &series, &config.currency_symbol));
    }
    Ok(())
}

async fn run_tui(config: AppConfig, animate: bool) -> Result<()> {
    ui::init_theme(Theme::with_overrides(&config.theme));
    let animate = animate && config.animate;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, animate);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc if app.popup == Popup::None && app.reveal.is_complete() => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Let the reveal task run between frames
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_select_headless_mode() {
        let args = Args::parse_from(["interes"]);
        assert!(!args.is_headless());

        let args = Args::parse_from(["interes", "--json"]);
        assert!(args.is_headless());

        let args = Args::parse_from(["interes", "-b", "1000", "-r", "5", "-y", "10"]);
        assert!(args.is_headless());
    }

    #[test]
    fn test_flags_override_config_defaults() {
        let mut defaults = RawInputs::default();
        defaults.deposit = "25".to_string();
        defaults.capitalization = "12".to_string();

        let args = Args::parse_from(["interes", "-b", "1000", "-c", "4", "--duration", "-3"]);
        let raw = args.raw_inputs(&defaults);

        assert_eq!(raw.initial_balance, "1000");
        assert_eq!(raw.deposit, "25");
        assert_eq!(raw.capitalization, "4");
        assert_eq!(raw.duration, "-3");
        assert_eq!(calc::validate(&raw), Err(calc::ValidationError::InterestRate));
    }

    #[test]
    fn test_headless_rejects_oversized_duration() {
        let args = Args::parse_from(["interes", "-b", "1000", "-d", "0", "-r", "5", "-y", "4000000000", "--json"]);
        let err = print_result(&args, &AppConfig::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "A duration of 4000000000 years is too long, the chart covers at most 10000 years."
        );
    }
}
