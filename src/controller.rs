use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::api::ProductApi;
use crate::config::{Config, ConditionResetPolicy};
use crate::models::{Condition, PredictionRequest, PredictionResponse, ProductData};
use crate::view::{format_price, LatestCard, ResultsDisplay, ViewEffects, ViewModel, ViewState};

/// Queries shorter than this clear the suggestion list without hitting the
/// search endpoint.
const MIN_QUERY_CHARS: usize = 2;

/// How many cards the latest-predictions panel renders.
const LATEST_LIMIT: usize = 4;

/// The one category that carries a condition radio group.
const CONDITION_CATEGORY: &str = "electronics";

/// Accepted price band relative to the looked-up current price.
const PRICE_BAND_LOW: f64 = 0.5;
const PRICE_BAND_HIGH: f64 = 1.5;

/// Mediates between the three page sections and the backend: section
/// transitions, submit, autocomplete, the latest-predictions panel and the
/// category-conditional condition control.
pub struct Controller {
    api: Arc<dyn ProductApi>,
    view: Mutex<ViewModel>,
    config: Config,
    /// Monotonic autocomplete sequence. Each keystroke takes a fresh token;
    /// a response is applied only while its token is still the newest, so a
    /// slow earlier request can never overwrite later suggestions.
    query_seq: AtomicU64,
}

impl Controller {
    pub fn new(api: Arc<dyn ProductApi>, effects: Box<dyn ViewEffects>, config: Config) -> Self {
        Self {
            api,
            view: Mutex::new(ViewModel::new(effects)),
            config,
            query_seq: AtomicU64::new(0),
        }
    }

    pub fn view(&self) -> MutexGuard<'_, ViewModel> {
        self.view.lock()
    }

    pub fn open_form(&self) {
        self.view.lock().transition(ViewState::ProductInput);
    }

    /// Close from the input form: back home, nothing sent.
    pub fn close_form(&self) {
        self.view.lock().transition(ViewState::Home);
    }

    pub fn go_back(&self) {
        self.view.lock().transition(ViewState::Home);
    }

    pub fn set_price_input(&self, text: &str) {
        self.view.lock().price_input = text.to_string();
    }

    pub fn set_condition(&self, value: &str) {
        self.view.lock().condition_value = value.to_string();
    }

    /// Category selector changed: only the condition-bearing category shows
    /// the condition control. What happens to an already-checked condition
    /// on hide is a policy choice.
    pub fn category_changed(&self, value: &str) {
        let mut view = self.view.lock();
        view.selected_category = value.to_string();
        let show = value.eq_ignore_ascii_case(CONDITION_CATEGORY);
        if !show
            && view.condition_visible
            && self.config.condition_reset == ConditionResetPolicy::Reset
        {
            view.condition_value.clear();
        }
        view.condition_visible = show;
    }

    /// Handles the form submission. Validation failures alert and leave the
    /// view on the input form; once a prediction request goes out, the view
    /// always lands on the results section, whatever the outcome.
    pub async fn submit(&self) {
        let (name, price_raw, category, condition) = {
            let view = self.view.lock();
            (
                view.product_name.trim().to_string(),
                view.price_input.trim().to_string(),
                view.selected_category.clone(),
                Condition::from_value(&view.condition_value),
            )
        };

        if name.is_empty() {
            self.view.lock().alert("Enter a product name before requesting a price.");
            return;
        }

        let original_price = match price_raw.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                self.view.lock().alert("Enter a valid numeric price.");
                return;
            }
        };

        if self.config.live_validation && !self.check_against_market(&name, original_price).await {
            return;
        }

        let request = PredictionRequest {
            product_name: name,
            original_price,
            main_category: category,
            condition,
        };

        let outcome = self.api.predict(&request).await;

        let mut view = self.view.lock();
        view.results = match outcome {
            Ok(PredictionResponse::Priced { prediction, price_range, confidence }) => {
                info!(prediction, "Prediction rendered");
                ResultsDisplay::priced(prediction, price_range.low, price_range.high, &confidence)
            }
            Ok(PredictionResponse::Failed { error }) => {
                warn!(%error, "Prediction service reported an error");
                ResultsDisplay::Error(format!("Error: {error}"))
            }
            Err(e) => {
                warn!(error = %e, "Prediction request failed");
                ResultsDisplay::Error(format!("Request failed: {e}"))
            }
        };
        view.transition(ViewState::PriceResults);
    }

    /// Pre-submit market lookup. Returns false when submission must abort:
    /// unknown product, lookup failure, or a price outside the accepted
    /// band around the current market price.
    async fn check_against_market(&self, name: &str, entered_price: f64) -> bool {
        match self.api.product_data(name).await {
            Ok(ProductData::Known { current_price, .. }) => {
                let low = PRICE_BAND_LOW * current_price;
                let high = PRICE_BAND_HIGH * current_price;
                if entered_price < low || entered_price > high {
                    self.view.lock().alert(&format!(
                        "Price must be between {} and {}.",
                        format_price(low),
                        format_price(high)
                    ));
                    return false;
                }
                true
            }
            Ok(ProductData::Missing { error }) => {
                self.view.lock().alert(&format!("Product lookup failed: {error}"));
                false
            }
            Err(e) => {
                warn!(error = %e, "Product data lookup failed");
                self.view.lock().alert("Product lookup failed. Try again.");
                false
            }
        }
    }

    /// One keystroke in the product-name field. Waits out the debounce quiet
    /// period, then queries the search endpoint; both the quiet period and
    /// the response are abandoned if a newer keystroke has arrived.
    pub async fn query_input(&self, text: &str) {
        let token = self.query_seq.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut view = self.view.lock();
            view.product_name = text.to_string();
            if text.chars().count() < MIN_QUERY_CHARS {
                view.suggestions.clear();
                return;
            }
        }

        tokio::time::sleep(self.config.debounce).await;
        if self.query_seq.load(Ordering::SeqCst) != token {
            return;
        }

        let result = self.api.search(text).await;
        if self.query_seq.load(Ordering::SeqCst) != token {
            return;
        }

        match result {
            Ok(items) => self.view.lock().suggestions = items,
            // Autocomplete is best-effort: a failed lookup just leaves the
            // list as it was.
            Err(e) => warn!(error = %e, "Suggestion lookup failed"),
        }
    }

    /// A suggestion was picked: copy its name into the input, drop the list,
    /// and best-effort align the category selector with the item's category.
    pub fn select_suggestion(&self, index: usize) {
        let mut view = self.view.lock();
        let Some(item) = view.suggestions.get(index).cloned() else {
            return;
        };
        view.product_name = item.product_name;
        view.suggestions.clear();
        if let Some(value) = view.match_category(&item.main_category) {
            view.selected_category = value;
        }
    }

    /// Fills the latest-predictions panel once at startup. Failures are
    /// logged and swallowed; the panel just stays empty.
    pub async fn load_latest(&self) {
        match self.api.latest_predictions().await {
            Ok(items) => {
                let cards: Vec<LatestCard> = items
                    .into_iter()
                    .filter_map(|item| match (item.input_data, item.prediction) {
                        (Some(input), Some(prediction)) => Some(LatestCard {
                            input,
                            prediction,
                            timestamp: item.timestamp,
                            timestamp_visible: false,
                        }),
                        _ => None,
                    })
                    .take(LATEST_LIMIT)
                    .collect();
                info!(count = cards.len(), "Loaded latest predictions");
                self.view.lock().latest = cards;
            }
            Err(e) => warn!(error = %e, "Latest predictions fetch failed"),
        }
    }

    pub fn toggle_timestamp(&self, index: usize) {
        self.view.lock().toggle_card_timestamp(index);
    }
}
