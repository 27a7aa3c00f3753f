//! Network URL constants and configuration keys.

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.example.com";

/// Default request timeout for the retrieval client, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "MARKET_DATA_API_URL";

/// Environment variable holding the optional bearer API key.
pub const ENV_API_KEY: &str = "MARKET_DATA_API_KEY";

/// Environment variable holding the request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "MARKET_DATA_TIMEOUT_MS";

/// Market data endpoint path.
pub const MARKET_DATA_PATH: &str = "/market-data";

/// Instrument listing endpoint path.
pub const INSTRUMENTS_PATH: &str = "/instruments";
