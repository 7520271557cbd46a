use std::env;
use std::time::Duration;

/// What happens to a checked condition when its control is hidden by a
/// category change: keep it (and submit it) or reset it to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionResetPolicy {
    #[default]
    Keep,
    Reset,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub debounce: Duration,
    pub live_validation: bool,
    pub condition_reset: ConditionResetPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8080".to_string(),
            debounce: Duration::from_millis(180),
            live_validation: true,
            condition_reset: ConditionResetPolicy::Keep,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let api_base = env::var("API_BASE").unwrap_or(defaults.api_base);

        let debounce = env::var("DEBOUNCE_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce);

        let live_validation = env::var("LIVE_VALIDATION")
            .ok()
            .and_then(|value| value.parse::<bool>().ok())
            .unwrap_or(defaults.live_validation);

        let condition_reset = match env::var("CONDITION_RESET").ok().as_deref() {
            Some("reset") => ConditionResetPolicy::Reset,
            _ => ConditionResetPolicy::Keep,
        };

        Self { api_base, debounce, live_validation, condition_reset }
    }
}
