//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "LOKATANI_TESTER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Base URL from LOKATANI_TESTER_BASE_URL
    pub base_url: Option<String>,
    /// API key from LOKATANI_TESTER_API_KEY
    pub api_key: Option<String>,
    /// Bearer token from LOKATANI_TESTER_TOKEN
    pub token: Option<String>,
    /// Telemetry auth mode from LOKATANI_TESTER_TELEMETRY_AUTH
    pub telemetry_auth: Option<String>,
    /// Timeout from LOKATANI_TESTER_TIMEOUT
    pub timeout: Option<u64>,
    /// Settings file from LOKATANI_TESTER_CONFIG
    pub config_file: Option<String>,
    /// Identity web API key from LOKATANI_TESTER_IDENTITY_API_KEY
    pub identity_api_key: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            base_url: get_env("BASE_URL"),
            api_key: get_env("API_KEY"),
            token: get_env("TOKEN"),
            telemetry_auth: get_env("TELEMETRY_AUTH"),
            timeout: get_env_parse("TIMEOUT"),
            config_file: get_env("CONFIG"),
            identity_api_key: get_env("IDENTITY_API_KEY"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.api_key.is_some()
            || self.token.is_some()
            || self.telemetry_auth.is_some()
            || self.timeout.is_some()
            || self.config_file.is_some()
            || self.identity_api_key.is_some()
    }

    /// Print current environment configuration, secrets reduced to presence
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_BASE_URL:         {:?}", ENV_PREFIX, self.base_url);
        println!("  {}_API_KEY:          {}", ENV_PREFIX, presence(&self.api_key));
        println!("  {}_TOKEN:            {}", ENV_PREFIX, presence(&self.token));
        println!("  {}_TELEMETRY_AUTH:   {:?}", ENV_PREFIX, self.telemetry_auth);
        println!("  {}_TIMEOUT:          {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_CONFIG:           {:?}", ENV_PREFIX, self.config_file);
        println!(
            "  {}_IDENTITY_API_KEY: {}",
            ENV_PREFIX,
            presence(&self.identity_api_key)
        );
    }
}

fn presence(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "(set)"
    } else {
        "(unset)"
    }
}

/// Get environment variable with prefix; blank values count as unset
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Builder for setting environment variables in tests
#[cfg(test)]
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
        self
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        for (key, value) in self.vars {
            env::set_var(key, value);
        }

        EnvGuard { previous }
    }
}

/// Guard that restores environment variables on drop
#[cfg(test)]
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all LOKATANI_TESTER environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_BASE_URL          Backend base URL");
    println!("  {ENV_PREFIX}_API_KEY           API key sent as X-API-Key");
    println!("  {ENV_PREFIX}_TOKEN             Firebase ID token sent as Bearer");
    println!("  {ENV_PREFIX}_TELEMETRY_AUTH    Auth for weight/active-session (none, bearer, api-key)");
    println!("  {ENV_PREFIX}_TIMEOUT           Request timeout in seconds");
    println!("  {ENV_PREFIX}_CONFIG            Path to settings file");
    println!("  {ENV_PREFIX}_IDENTITY_API_KEY  Web API key for `login`");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_BASE_URL=https://api.lokatani.test");
    println!("  lokatani-tester health");
}
