use std::env;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use e5_client::E5Config;
use lfp_common::Secret;
use lfp_pay_engine::SettlementOrdering;
use log::*;

use crate::maintenance::MaintenanceConfig;

const DEFAULT_LFP_HOST: &str = "127.0.0.1";
const DEFAULT_LFP_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/lfp_pay.db";
const DEFAULT_COMPANY_CODE: &str = "LP";
const DEFAULT_PAYMENTS_API_URL: &str = "http://localhost:4001";
const DEFAULT_CHS_URL: &str = "http://chs.local";
const WEEK_FROM_SUNDAY: [Weekday; 7] =
    [Weekday::Sun, Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat];

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub e5: E5Config,
    /// The E5 company code that penalties are held under. Always `LP` for late filing penalties.
    pub company_code: String,
    pub payments: PaymentsApiConfig,
    /// Location of the TOML table of E5 (type, sub-type) pairs that are penalties. The built-in table is used if this
    /// is `None`.
    pub penalty_types_path: Option<String>,
    /// If set, confirmation e-mails are POSTed here. Otherwise they are only logged.
    pub email_send_url: Option<String>,
    /// Base URL of the public website. Used to build links in the confirmation e-mail.
    pub chs_url: String,
    pub settlement_ordering: SettlementOrdering,
    pub maintenance: MaintenanceConfig,
}

#[derive(Clone, Debug, Default)]
pub struct PaymentsApiConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LFP_HOST.to_string(),
            port: DEFAULT_LFP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            e5: E5Config::default(),
            company_code: DEFAULT_COMPANY_CODE.to_string(),
            payments: PaymentsApiConfig::default(),
            penalty_types_path: None,
            email_send_url: None,
            chs_url: DEFAULT_CHS_URL.to_string(),
            settlement_ordering: SettlementOrdering::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LFP_HOST").ok().unwrap_or_else(|| DEFAULT_LFP_HOST.into());
        let port = env::var("LFP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for LFP_PORT. {e} Using the default, {DEFAULT_LFP_PORT}, instead."
                    );
                    DEFAULT_LFP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_LFP_PORT);
        let database_url = env::var("LFP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LFP_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let e5 = E5Config::new_from_env_or_default();
        let company_code = env::var("LFP_E5_COMPANY_CODE").ok().unwrap_or_else(|| DEFAULT_COMPANY_CODE.into());
        let payments = PaymentsApiConfig::from_env_or_default();
        let penalty_types_path = env::var("LFP_PENALTY_TYPES_PATH").ok().filter(|s| !s.is_empty());
        if penalty_types_path.is_none() {
            info!("🪛️ LFP_PENALTY_TYPES_PATH is not set. The built-in penalty type table will be used.");
        }
        let email_send_url = env::var("LFP_EMAIL_SEND_URL").ok().filter(|s| !s.is_empty());
        if email_send_url.is_none() {
            warn!("🪛️ LFP_EMAIL_SEND_URL is not set. Payment confirmation e-mails will be logged, but not sent.");
        }
        let chs_url = env::var("LFP_CHS_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LFP_CHS_URL is not set. Using {DEFAULT_CHS_URL}");
            DEFAULT_CHS_URL.to_string()
        });
        let settlement_ordering = env::var("LFP_SETTLEMENT_ORDERING")
            .map(|s| {
                s.parse::<SettlementOrdering>().unwrap_or_else(|e| {
                    error!("🪛️ {e}. Using the default settlement ordering instead.");
                    SettlementOrdering::default()
                })
            })
            .unwrap_or_default();
        let maintenance = MaintenanceConfig::from_env();
        Self {
            host,
            port,
            database_url,
            e5,
            company_code,
            payments,
            penalty_types_path,
            email_send_url,
            chs_url,
            settlement_ordering,
            maintenance,
        }
    }
}

impl PaymentsApiConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), api_key: Secret::new(api_key.to_string()) }
    }

    pub fn from_env_or_default() -> Self {
        let base_url = env::var("LFP_PAYMENTS_API_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LFP_PAYMENTS_API_URL is not set. Using {DEFAULT_PAYMENTS_API_URL}");
            DEFAULT_PAYMENTS_API_URL.to_string()
        });
        let api_key = env::var("LFP_PAYMENTS_API_KEY").ok().unwrap_or_else(|| {
            error!("🪛️ LFP_PAYMENTS_API_KEY is not set. Calls to the payments API will be rejected.");
            String::default()
        });
        Self::new(&base_url, &api_key)
    }
}

impl MaintenanceConfig {
    pub fn from_env() -> Self {
        let weekly_day = env::var("LFP_WEEKLY_MAINTENANCE_DAY").ok().and_then(|s| parse_weekday(&s));
        let weekly_start = env::var("LFP_WEEKLY_MAINTENANCE_START_TIME").ok().and_then(|s| parse_hhmm(&s));
        let weekly_end = env::var("LFP_WEEKLY_MAINTENANCE_END_TIME").ok().and_then(|s| parse_hhmm(&s));
        let planned_start = env::var("LFP_PLANNED_MAINTENANCE_START_TIME").ok().map(|s| parse_timestamp(&s));
        let planned_end = env::var("LFP_PLANNED_MAINTENANCE_END_TIME").ok().map(|s| parse_timestamp(&s));
        Self { weekly_day, weekly_start, weekly_end, planned_start, planned_end }
    }
}

/// Accepts `0`-`6` (0 is Sunday) or a day name.
fn parse_weekday(s: &str) -> Option<Weekday> {
    let s = s.trim();
    let result = match s.parse::<u8>() {
        Ok(n) => WEEK_FROM_SUNDAY.get(n as usize).copied(),
        Err(_) => s.parse::<Weekday>().ok(),
    };
    if result.is_none() {
        warn!("🪛️ {s} is not a valid value for LFP_WEEKLY_MAINTENANCE_DAY. Weekly maintenance is disabled.");
    }
    result
}

/// `HHMM`, e.g. `1900`.
fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    let result = NaiveTime::parse_from_str(s.trim(), "%H%M").ok();
    if result.is_none() {
        warn!("🪛️ {s} is not a valid HHMM maintenance time. Weekly maintenance is disabled.");
    }
    result
}

/// Planned maintenance timestamps are kept as the parse result, so that a bad value is reported by the health check
/// rather than silently ignored.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim()).map(|t| t.with_timezone(&Utc)).map_err(|e| {
        error!("🪛️ {s} is not a valid RFC 3339 timestamp for planned maintenance. {e}");
        format!("invalid maintenance time {s}: {e}")
    })
}
