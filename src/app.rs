use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;

use crate::config::AppConfig;
use crate::sampling::{
    self, ConfidenceLevel, Estimate, MarginOfError, PopulationSize, SampleSizeError,
    SizingRequest,
};

/// Seconds a status message stays on the info line
const STATUS_TIMEOUT_SECS: u64 = 3;

/// Longest population the form will accept, in digits
const MAX_POPULATION_DIGITS: usize = 12;

/// Population step for PageUp/PageDown
const POPULATION_PAGE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Population,
    Confidence,
    Margin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub field: Field,
    pub popup: Popup,

    // Form inputs; the population buffer may hold an invalid value while typing
    pub population_input: String,
    pub confidence: ConfidenceLevel,
    pub margin: MarginOfError,

    // Last valid computation
    pub estimate: Estimate,
    pub chart_points: Vec<(f64, f64)>,
    pub chart_max_points: usize,

    // Set while the population buffer does not parse
    pub input_error: Option<String>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let request = config.defaults.request();

        let mut app = Self {
            field: Field::Population,
            popup: Popup::None,

            population_input: request.population.to_string(),
            confidence: request.confidence,
            margin: request.margin,

            estimate: sampling::estimate(&request),
            chart_points: Vec::new(),
            chart_max_points: config.chart.max_points,

            input_error: None,

            status_message: None,
            status_message_time: None,
        };
        app.apply(request);
        app
    }

    /// Set a status message (auto-clears after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Current request, or the reason the form cannot produce one
    pub fn request(&self) -> Result<SizingRequest, SampleSizeError> {
        let population: PopulationSize = self.population_input.parse()?;
        Ok(SizingRequest::new(population, self.confidence, self.margin))
    }

    /// Rebuild the request from the form and recompute.
    /// On invalid input the previous estimate stays on screen.
    pub fn recalculate(&mut self) -> Result<()> {
        match self.request() {
            Ok(request) => {
                self.input_error = None;
                self.apply(request);
                Ok(())
            }
            Err(e) => {
                self.input_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn apply(&mut self, request: SizingRequest) {
        self.estimate = sampling::estimate(&request);
        self.chart_points =
            sampling::sensitivity_curve(request.population, request.confidence, request.margin)
                .downsample(self.chart_max_points)
                .into_iter()
                .map(|p| (p.population as f64, p.sample_size as f64))
                .collect();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Navigation between fields (Population → Confidence → Margin)
            KeyCode::Tab => {
                self.field = match self.field {
                    Field::Population => Field::Confidence,
                    Field::Confidence => Field::Margin,
                    Field::Margin => Field::Population,
                };
            }
            KeyCode::BackTab => {
                self.field = match self.field {
                    Field::Population => Field::Margin,
                    Field::Confidence => Field::Population,
                    Field::Margin => Field::Confidence,
                };
            }

            // Help (? or h)
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => match self.field {
                Field::Population => self.handle_population_key(key)?,
                Field::Confidence => self.handle_confidence_key(key)?,
                Field::Margin => self.handle_margin_key(key)?,
            },
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        if let Popup::Help = self.popup {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
        }
        Ok(())
    }

    fn handle_population_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.population_input.len() >= MAX_POPULATION_DIGITS {
                    self.set_status(format!("Population is limited to {} digits", MAX_POPULATION_DIGITS));
                    return Ok(());
                }
                // Replace a lone leading zero rather than growing "0" into "05"
                if self.population_input == "0" {
                    self.population_input.clear();
                }
                self.population_input.push(c);
            }
            KeyCode::Backspace | KeyCode::Delete => {
                self.population_input.pop();
            }
            KeyCode::Up | KeyCode::Char('k') => self.nudge_population(1),
            KeyCode::Down | KeyCode::Char('j') => self.nudge_population(-1),
            KeyCode::PageUp => self.nudge_population(POPULATION_PAGE as i64),
            KeyCode::PageDown => self.nudge_population(-(POPULATION_PAGE as i64)),
            _ => return Ok(()),
        }
        self.recalculate()
    }

    /// Step the population from its last valid value, never below 1
    fn nudge_population(&mut self, delta: i64) {
        let current = self.estimate.request.population.get();
        let next = if delta >= 0 {
            current.saturating_add(delta as u64)
        } else {
            current.saturating_sub(delta.unsigned_abs()).max(1)
        };
        let next = next.min(10u64.pow(MAX_POPULATION_DIGITS as u32) - 1);
        self.population_input = next.to_string();
    }

    fn handle_confidence_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Up | KeyCode::Right | KeyCode::Char('k') | KeyCode::Char('l') | KeyCode::Char(' ') => {
                self.confidence = self.confidence.next();
            }
            KeyCode::Down | KeyCode::Left | KeyCode::Char('j') => {
                self.confidence = self.confidence.prev();
            }
            _ => return Ok(()),
        }
        self.recalculate()
    }

    fn handle_margin_key(&mut self, key: KeyEvent) -> Result<()> {
        let before = self.margin;
        match key.code {
            KeyCode::Up | KeyCode::Right | KeyCode::Char('k') | KeyCode::Char('l') => {
                self.margin = self.margin.step(1);
            }
            KeyCode::Down | KeyCode::Left | KeyCode::Char('j') => {
                self.margin = self.margin.step(-1);
            }
            _ => return Ok(()),
        }
        if self.margin == before {
            self.set_status(format!(
                "Margin of error ranges from {}% to {}%",
                MarginOfError::SLIDER_RANGE.start(),
                MarginOfError::SLIDER_RANGE.end()
            ));
            return Ok(());
        }
        self.recalculate()
    }

    pub fn tick(&mut self) {
        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}
