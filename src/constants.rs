pub const HISTORY_LIMIT: usize = 50;
pub const HISTORY_KEY: &str = "searchHistory";

pub const UNRECOGNIZED_DELAY_MS: u64 = 800;

pub const FILTER_MIN_CHARS: usize = 3;
pub const FILTER_REPEAT_RUN: usize = 4;
pub const FILTER_MAX_VOWELLESS_CONSONANTS: usize = 3;
pub const FILTER_SYMBOL_RATIO: f64 = 0.4;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/check-grammar/";
pub const DEFAULT_LANGUAGE: &str = "en";

pub const LOADER_ANALYZING: &str = "Analyzing verb tenses...";
pub const LOADER_TRANSLATING: &str = "Translating explanations...";
