use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::calc::{self, BalanceSeries, FormInputs, RawInputs, ValidationError};
use crate::chart::{ChartHandle, ChartRenderer};
use crate::config::AppConfig;
use crate::sequence::{self, Reveal, Target};

/// Inputs of the investment form, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    InitialBalance,
    Deposit,
    InterestRate,
    Capitalization,
    Duration,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::InitialBalance,
        Field::Deposit,
        Field::InterestRate,
        Field::Capitalization,
        Field::Duration,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The field a validation rule checks
    pub fn of_error(error: ValidationError) -> Self {
        match error {
            ValidationError::InitialBalance => Field::InitialBalance,
            ValidationError::Deposit => Field::Deposit,
            ValidationError::InterestRate => Field::InterestRate,
            ValidationError::Capitalization => Field::Capitalization,
            ValidationError::Duration => Field::Duration,
        }
    }

    /// Element id on the investment form
    pub fn id(self) -> &'static str {
        match self {
            Field::InitialBalance => "initialBalance",
            Field::Deposit => "deposit",
            Field::InterestRate => "interestRate",
            Field::Capitalization => "capitalization",
            Field::Duration => "duration",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::InitialBalance => "Initial balance",
            Field::Deposit => "Deposit per period",
            Field::InterestRate => "Annual interest rate (%)",
            Field::Capitalization => "Capitalization frequency",
            Field::Duration => "Duration (years)",
        }
    }

    /// Form element index of this field's label; the input follows it
    pub fn label_element(self) -> usize {
        self.index() * 2
    }

    pub fn input_element(self) -> usize {
        self.index() * 2 + 1
    }
}

/// Labels and inputs of every field, then the submit button
pub const FORM_ELEMENTS: usize = Field::ALL.len() * 2 + 1;

/// Form element index of the submit button
pub const SUBMIT_ELEMENT: usize = FORM_ELEMENTS - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Submit,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Field(Field::Duration) => Focus::Submit,
            Focus::Field(f) => Focus::Field(Field::ALL[f.index() + 1]),
            Focus::Submit => Focus::Field(Field::InitialBalance),
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Field(Field::InitialBalance) => Focus::Submit,
            Focus::Field(f) => Focus::Field(Field::ALL[f.index() - 1]),
            Focus::Submit => Focus::Field(Field::Duration),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Text shown in the result area
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub message: String,
    pub is_error: bool,
}

pub struct App {
    pub config: AppConfig,
    pub popup: Popup,
    pub focus: Focus,

    // Form values; `raw.capitalization` mirrors the select
    pub raw: RawInputs,
    pub capitalization_index: usize,

    // Result area, stays visible once shown
    pub result: Option<ResultView>,
    pub result_visible: bool,

    // Chart on screen, replaced on every successful submit
    pub chart: Option<ChartHandle>,
    renderer: ChartRenderer,

    pub reveal: Reveal,
}

impl App {
    /// Build the app. With `animate` the reveal sequence starts right away,
    /// which needs a running tokio runtime.
    pub fn new(config: AppConfig, animate: bool) -> Self {
        let steps = sequence::reveal_steps(&config.timing, FORM_ELEMENTS);
        let reveal = if animate {
            Reveal::start(steps)
        } else {
            Reveal::immediate(&steps)
        };

        let capitalization_index = config.default_capitalization_index();
        let mut app = Self {
            popup: Popup::None,
            focus: Focus::Field(Field::InitialBalance),
            raw: config.defaults.clone(),
            capitalization_index,
            result: None,
            result_visible: false,
            chart: None,
            renderer: ChartRenderer::new(),
            reveal,
            config,
        };
        app.sync_capitalization();
        app
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::InitialBalance => &self.raw.initial_balance,
            Field::Deposit => &self.raw.deposit,
            Field::InterestRate => &self.raw.interest_rate,
            Field::Capitalization => &self.raw.capitalization,
            Field::Duration => &self.raw.duration,
        }
    }

    /// Editable text of a field; the capitalization select is not typed into
    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::InitialBalance => Some(&mut self.raw.initial_balance),
            Field::Deposit => Some(&mut self.raw.deposit),
            Field::InterestRate => Some(&mut self.raw.interest_rate),
            Field::Capitalization => None,
            Field::Duration => Some(&mut self.raw.duration),
        }
    }

    /// Label of the selected capitalization option
    pub fn capitalization_label(&self) -> &str {
        self.config
            .capitalization_options
            .get(self.capitalization_index)
            .map(|o| o.label.as_str())
            .unwrap_or("-")
    }

    fn sync_capitalization(&mut self) {
        self.raw.capitalization = self
            .config
            .capitalization_options
            .get(self.capitalization_index)
            .map(|o| o.periods.to_string())
            .unwrap_or_default();
    }

    fn cycle_capitalization(&mut self, forward: bool) {
        let count = self.config.capitalization_options.len();
        if count == 0 {
            return;
        }
        self.capitalization_index = if forward {
            (self.capitalization_index + 1) % count
        } else {
            (self.capitalization_index + count - 1) % count
        };
        self.sync_capitalization();
    }

    pub fn is_visible(&self, target: Target) -> bool {
        self.reveal.is_visible(target)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // A key press during the intro shows everything at once
        if !self.reveal.is_complete() {
            self.reveal.finish();
            return;
        }

        if self.popup != Popup::None {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::F(1)) {
                self.popup = Popup::None;
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Enter => self.submit(),
            KeyCode::F(1) => self.popup = Popup::Help,

            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                if self.focus == Focus::Field(Field::Capitalization) {
                    self.cycle_capitalization(forward);
                } else if let Some(chart) = self.chart.as_mut() {
                    if forward {
                        chart.select_next();
                    } else {
                        chart.select_previous();
                    }
                }
            }
            KeyCode::Home => {
                if let Some(chart) = self.chart.as_mut() {
                    chart.select_first();
                }
            }
            KeyCode::End => {
                if let Some(chart) = self.chart.as_mut() {
                    chart.select_last();
                }
            }

            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match self.focus {
                    Focus::Submit if c == ' ' => self.submit(),
                    Focus::Field(Field::Capitalization) if c == ' ' => self.cycle_capitalization(true),
                    Focus::Field(field) => {
                        if let Some(text) = self.text_mut(field) {
                            text.push(c);
                        }
                    }
                    Focus::Submit => {}
                }
            }
            KeyCode::Backspace => {
                if let Focus::Field(field) = self.focus {
                    if let Some(text) = self.text_mut(field) {
                        text.pop();
                    }
                }
            }
            KeyCode::Delete => {
                if let Focus::Field(field) = self.focus {
                    if let Some(text) = self.text_mut(field) {
                        text.clear();
                    }
                }
            }
            _ => {}
        }
    }

    /// Validate the form and either chart the balances or show the error
    pub fn submit(&mut self) {
        let inputs = match calc::validate(&self.raw) {
            Ok(inputs) => inputs,
            Err(e) => {
                tracing::info!(field = Field::of_error(e).id(), "Form rejected: {}", e);
                self.show_error(e.to_string());
                return;
            }
        };

        let series = match calc::balance_series(&inputs) {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(years = inputs.years, "Balances not computed: {}", e);
                self.show_error(e.to_string());
                return;
            }
        };
        let message = final_balance_message(&inputs, &series, &self.config.currency_symbol);
        tracing::info!(years = inputs.years, final_balance = series.final_balance(), "Balances computed");

        let chart = self.renderer.render(
            self.chart.take(),
            &series,
            inputs.years,
            &self.config.currency_symbol,
        );
        tracing::debug!(chart = chart.id(), live = self.renderer.live(), "Chart replaced");
        self.chart = Some(chart);
        self.result = Some(ResultView {
            message,
            is_error: false,
        });
        self.result_visible = true;
    }

    /// Replace the result text with `message` and show the result area.
    /// A chart from an earlier submit stays on screen.
    pub fn show_error(&mut self, message: String) {
        self.result = Some(ResultView {
            message,
            is_error: true,
        });
        self.result_visible = true;
    }

    pub fn tick(&mut self) {
        self.reveal.poll();
    }

    #[cfg(test)]
    fn live_charts(&self) -> usize {
        self.renderer.live()
    }
}

/// Result line for a successful calculation
pub fn final_balance_message(inputs: &FormInputs, series: &BalanceSeries, currency: &str) -> String {
    let mut message = format!(
        "The final balance after {} years will be {}{:.2}.",
        inputs.years,
        currency,
        series.final_balance()
    );
    if !series.is_finite() {
        message.push_str(" (the calculation overflowed)");
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app() -> App {
        App::new(AppConfig::default(), false)
    }

    /// Fill the text fields in order, leaving the select untouched
    fn fill(app: &mut App, initial: &str, deposit: &str, rate: &str, years: &str) {
        app.focus = Focus::Field(Field::InitialBalance);
        type_text(app, initial);
        app.handle_key(key(KeyCode::Tab));
        type_text(app, deposit);
        app.handle_key(key(KeyCode::Tab));
        type_text(app, rate);
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        type_text(app, years);
    }

    #[test]
    fn test_form_element_indices() {
        assert_eq!(FORM_ELEMENTS, 11);
        assert_eq!(Field::InitialBalance.label_element(), 0);
        assert_eq!(Field::Duration.input_element(), 9);
        assert_eq!(SUBMIT_ELEMENT, 10);
    }

    #[test]
    fn test_errors_map_to_fields() {
        assert_eq!(Field::of_error(ValidationError::Deposit).id(), "deposit");
        assert_eq!(Field::of_error(ValidationError::Capitalization).id(), "capitalization");
        assert_eq!(Field::of_error(ValidationError::Duration).id(), "duration");
    }

    #[test]
    fn test_focus_cycles_through_form() {
        let mut app = app();
        for field in &Field::ALL[1..] {
            app.handle_key(key(KeyCode::Tab));
            assert_eq!(app.focus, Focus::Field(*field));
        }
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Submit);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Field(Field::InitialBalance));
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.focus, Focus::Submit);
    }

    #[test]
    fn test_submit_renders_chart() {
        let mut app = app();
        fill(&mut app, "1000", "0", "5", "1");
        app.handle_key(key(KeyCode::Enter));

        let result = app.result.as_ref().unwrap();
        assert!(!result.is_error);
        assert_eq!(result.message, "The final balance after 1 years will be €1050.00.");
        assert!(app.result_visible);
        assert_eq!(app.chart.as_ref().unwrap().labels(), &["0", "1"]);
    }

    #[test]
    fn test_resubmit_replaces_chart() {
        let mut app = app();
        fill(&mut app, "1000", "0", "5", "1");
        app.submit();
        let first_id = app.chart.as_ref().unwrap().id();

        app.submit();
        assert_ne!(app.chart.as_ref().unwrap().id(), first_id);
        assert_eq!(app.live_charts(), 1);
    }

    #[test]
    fn test_validation_error_is_shown() {
        let mut app = app();
        fill(&mut app, "0", "0", "5", "1");
        app.submit();

        let result = app.result.as_ref().unwrap();
        assert!(result.is_error);
        assert_eq!(result.message, "Initial balance must be a positive number.");
        assert!(app.result_visible);
        assert!(app.chart.is_none());
    }

    #[test]
    fn test_oversized_duration_is_reported() {
        let mut app = app();
        fill(&mut app, "1000", "0", "5", "4000000000");
        app.submit();

        let result = app.result.as_ref().unwrap();
        assert!(result.is_error);
        assert_eq!(
            result.message,
            "A duration of 4000000000 years is too long, the chart covers at most 10000 years."
        );
        assert!(app.chart.is_none());
        assert_eq!(app.live_charts(), 0);
    }

    #[test]
    fn test_error_keeps_previous_chart() {
        let mut app = app();
        fill(&mut app, "1000", "0", "5", "1");
        app.submit();

        app.focus = Focus::Field(Field::Duration);
        app.handle_key(key(KeyCode::Delete));
        app.submit();

        assert_eq!(
            app.result.as_ref().unwrap().message,
            "Duration must be a positive number greater than 0."
        );
        assert!(app.chart.is_some());
    }

    #[test]
    fn test_capitalization_select() {
        let mut app = app();
        assert_eq!(app.field_value(Field::Capitalization), "1");

        app.focus = Focus::Field(Field::Capitalization);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.field_value(Field::Capitalization), "12");
        assert_eq!(app.capitalization_label(), "Monthly");

        // Typing does not edit the select
        type_text(&mut app, "9");
        assert_eq!(app.field_value(Field::Capitalization), "12");

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.field_value(Field::Capitalization), "4");
    }

    #[test]
    fn test_monthly_deposits_scenario() {
        let mut app = app();
        fill(&mut app, "1000", "100", "12", "1");
        app.focus = Focus::Field(Field::Capitalization);
        for _ in 0..3 {
            app.handle_key(key(KeyCode::Right));
        }
        app.submit();

        assert_eq!(
            app.result.as_ref().unwrap().message,
            "The final balance after 1 years will be €2395.08."
        );
    }

    #[test]
    fn test_backspace_edits_field() {
        let mut app = app();
        type_text(&mut app, "123");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.field_value(Field::InitialBalance), "12");
    }

    #[test]
    fn test_control_chars_are_not_typed() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(app.field_value(Field::InitialBalance), "");
    }

    #[test]
    fn test_arrows_move_tooltip() {
        let mut app = app();
        fill(&mut app, "1000", "0", "5", "3");
        app.submit();
        assert_eq!(app.chart.as_ref().unwrap().selected(), 3);

        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.chart.as_ref().unwrap().selected(), 1);

        app.handle_key(key(KeyCode::Home));
        assert_eq!(app.chart.as_ref().unwrap().selected(), 0);
        app.handle_key(key(KeyCode::End));
        assert_eq!(app.chart.as_ref().unwrap().selected(), 3);
    }

    #[test]
    fn test_help_popup() {
        let mut app = app();
        app.handle_key(key(KeyCode::F(1)));
        assert_eq!(app.popup, Popup::Help);

        // Keys do not reach the form while help is open
        type_text(&mut app, "5");
        assert_eq!(app.field_value(Field::InitialBalance), "");

        app.handle_key(KeyEvent::new_with_kind(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press));
        assert_eq!(app.popup, Popup::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_skips_intro() {
        let mut app = App::new(AppConfig::default(), true);
        app.tick();
        assert!(!app.is_visible(Target::FormElement(SUBMIT_ELEMENT)));

        type_text(&mut app, "7");
        assert!(app.reveal.is_complete());
        // The skipping key is swallowed
        assert_eq!(app.field_value(Field::InitialBalance), "");
    }
}
