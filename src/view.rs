use chrono::DateTime;

use crate::models::{PredictionRequest, SearchResultItem};

/// Page sections. Exactly one is visible at any time; the tag below doubles
/// as the view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Home,
    ProductInput,
    PriceResults,
}

/// Side effects a view transition triggers on whatever surface hosts the
/// form (a page binding, a terminal, a test recorder). Pure view-model
/// state lives in [`ViewModel`]; only the non-stateful effects go through
/// this trait.
pub trait ViewEffects: Send {
    fn section_hidden(&mut self, section: ViewState);
    fn section_shown(&mut self, section: ViewState);
    fn scrolled_to(&mut self, section: ViewState);
    /// Blocking alert shown for validation failures.
    fn alert(&mut self, message: &str);
}

/// Effects sink that discards everything.
pub struct NullEffects;

impl ViewEffects for NullEffects {
    fn section_hidden(&mut self, _section: ViewState) {}
    fn section_shown(&mut self, _section: ViewState) {}
    fn scrolled_to(&mut self, _section: ViewState) {}
    fn alert(&mut self, _message: &str) {}
}

/// Contents of the results section. Holding the three display lines in a
/// tagged enum makes "price or error, never both" structural rather than
/// a convention over text fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsDisplay {
    #[default]
    Empty,
    Priced {
        optimal: String,
        range: String,
        confidence: String,
    },
    Error(String),
}

impl ResultsDisplay {
    pub fn priced(prediction: f64, low: f64, high: f64, confidence: &str) -> Self {
        ResultsDisplay::Priced {
            optimal: format!("Optimal Price: {}", format_price(prediction)),
            range: format!(
                "Market Price Range: {} - {}",
                format_price(low),
                format_price(high)
            ),
            confidence: format!("Confidence Level: {}", confidence),
        }
    }

    /// Text of the headline element: the price line, the error line, or
    /// blank before any submission.
    pub fn headline(&self) -> &str {
        match self {
            ResultsDisplay::Empty => "",
            ResultsDisplay::Priced { optimal, .. } => optimal,
            ResultsDisplay::Error(message) => message,
        }
    }

    /// The numeric companion lines; cleared whenever an error is shown.
    pub fn range_text(&self) -> &str {
        match self {
            ResultsDisplay::Priced { range, .. } => range,
            _ => "",
        }
    }

    pub fn confidence_text(&self) -> &str {
        match self {
            ResultsDisplay::Priced { confidence, .. } => confidence,
            _ => "",
        }
    }
}

pub fn format_price(value: f64) -> String {
    format!("KSh {value:.2}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOption {
    pub label: String,
    pub value: String,
}

impl CategoryOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self { label: label.to_string(), value: value.to_string() }
    }
}

/// The fixed selector the form ships with.
pub fn default_categories() -> Vec<CategoryOption> {
    vec![
        CategoryOption::new("Electronics", "electronics"),
        CategoryOption::new("Furniture", "furniture"),
        CategoryOption::new("Clothing", "clothing"),
        CategoryOption::new("Vehicles", "vehicles"),
        CategoryOption::new("Home Appliances", "appliances"),
    ]
}

/// One rendered card in the latest-predictions panel. Timestamps start
/// hidden and toggle per card.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestCard {
    pub input: PredictionRequest,
    pub prediction: f64,
    pub timestamp: Option<String>,
    pub timestamp_visible: bool,
}

impl LatestCard {
    /// Timestamp line as shown once revealed. RFC 3339 values get a short
    /// human form; anything else is echoed raw rather than dropped.
    pub fn timestamp_text(&self) -> String {
        match &self.timestamp {
            None => String::new(),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|_| raw.clone()),
        }
    }
}

/// Everything the form page knows, built once at startup and handed by
/// reference to each event handler.
pub struct ViewModel {
    state: ViewState,
    pub effects: Box<dyn ViewEffects>,

    // bound form fields
    pub product_name: String,
    pub price_input: String,
    pub categories: Vec<CategoryOption>,
    pub selected_category: String,
    pub condition_value: String,
    pub condition_visible: bool,

    pub results: ResultsDisplay,
    pub suggestions: Vec<SearchResultItem>,
    pub latest: Vec<LatestCard>,
}

impl ViewModel {
    pub fn new(effects: Box<dyn ViewEffects>) -> Self {
        let categories = default_categories();
        let selected_category = categories[0].value.clone();
        Self {
            state: ViewState::Home,
            effects,
            product_name: String::new(),
            price_input: String::new(),
            categories,
            selected_category,
            condition_value: String::new(),
            condition_visible: false,
            results: ResultsDisplay::Empty,
            suggestions: Vec::new(),
            latest: Vec::new(),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// The single transition function: updates the tag, hides the old
    /// section, shows the new one and scrolls it into view.
    pub fn transition(&mut self, next: ViewState) {
        if self.state == next {
            return;
        }
        let previous = self.state;
        self.state = next;
        self.effects.section_hidden(previous);
        self.effects.section_shown(next);
        self.effects.scrolled_to(next);
    }

    pub fn alert(&mut self, message: &str) {
        self.effects.alert(message);
    }

    /// Case-insensitive match of a suggestion's category text against the
    /// selector's labels and values. Returns the option value to select,
    /// or None to leave the selector untouched.
    pub fn match_category(&self, text: &str) -> Option<String> {
        self.categories
            .iter()
            .find(|option| {
                option.label.eq_ignore_ascii_case(text) || option.value.eq_ignore_ascii_case(text)
            })
            .map(|option| option.value.clone())
    }

    /// Reveals or hides one card's timestamp without touching the others.
    pub fn toggle_card_timestamp(&mut self, index: usize) {
        if let Some(card) = self.latest.get_mut(index) {
            card.timestamp_visible = !card.timestamp_visible;
        }
    }
}
