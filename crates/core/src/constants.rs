/// Constants used throughout the voketag codebase
// Default service endpoints
pub const DEFAULT_ADMIN_API: &str = "http://127.0.0.1:8082";
pub const DEFAULT_FACTORY_API: &str = "http://localhost:8081/v1";
pub const DEFAULT_SCAN_API: &str = "http://localhost:8080";
pub const DEFAULT_VERIFY_URL: &str = "https://verify.voketag.com.br";

// Environment variable names
pub const VOKETAG_ADMIN_API_VAR: &str = "VOKETAG_ADMIN_API";
pub const VOKETAG_FACTORY_API_VAR: &str = "VOKETAG_FACTORY_API";
pub const VOKETAG_SCAN_API_VAR: &str = "VOKETAG_SCAN_API";
pub const VOKETAG_VERIFY_URL_VAR: &str = "VOKETAG_VERIFY_URL";
pub const VOKETAG_POLL_INTERVAL_MS_VAR: &str = "VOKETAG_POLL_INTERVAL_MS";
pub const VOKETAG_POLL_MAX_ATTEMPTS_VAR: &str = "VOKETAG_POLL_MAX_ATTEMPTS";
pub const VOKETAG_HTTP_TIMEOUT_MS_VAR: &str = "VOKETAG_HTTP_TIMEOUT_MS";
pub const VOKETAG_SESSION_FILE_VAR: &str = "VOKETAG_SESSION_FILE";
pub const VOKETAG_LOG_VAR: &str = "VOKETAG_LOG";

// Double-submit CSRF
pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const CSRF_COOKIE: &str = "csrf_token";

// Scan request headers
pub const FINGERPRINT_HEADER: &str = "X-Device-Fingerprint";
pub const LATITUDE_HEADER: &str = "X-Latitude";
pub const LONGITUDE_HEADER: &str = "X-Longitude";

// Batch polling
pub const POLL_INTERVAL_MS: u64 = 3_000;
pub const POLL_ERROR_BACKOFF_MS: u64 = 5_000;
pub const POLL_MAX_ATTEMPTS: u32 = 120;

// Scan call
pub const SCAN_TIMEOUT_MS: u64 = 15_000;
pub const SCAN_RETRY_DELAY_MS: u64 = 500;

// JWT validity grace window
pub const JWT_GRACE_SECONDS: i64 = 60;

// Config and session file names under the user config dir
pub const CONFIG_DIR_NAME: &str = "voketag";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const SESSION_FILE_NAME: &str = "session.json";
