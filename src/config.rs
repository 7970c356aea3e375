use clap::{Args, ValueEnum};

#[derive(Clone, Debug, Args)]
pub struct ChannelConfig {
    /// Maximum number of tokens in a single multicast request (minimum 1)
    #[arg(long, env = "FCM_MAX_TOKENS_PER_REQUEST", default_value_t = 500, value_parser = batch_size)]
    pub max_tokens_per_request: usize,

    /// How to handle provider transport failures during a dispatch
    #[arg(long, env = "FCM_TRANSPORT_ERROR_POLICY", value_enum, default_value_t = TransportErrorPolicy::RecordFailure)]
    pub transport_error_policy: TransportErrorPolicy,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_tokens_per_request: 500,
            transport_error_policy: TransportErrorPolicy::RecordFailure,
        }
    }
}

fn batch_size(value: &str) -> Result<usize, String> {
    let size: usize = value.parse().map_err(|e| format!("{e}"))?;
    if size == 0 {
        return Err("batch size must be at least 1".to_string());
    }
    Ok(size)
}

/// What happens to the statistics record when the provider itself fails,
/// as opposed to rejecting individual tokens.
///
/// A transport failure says nothing about token validity, so neither policy
/// touches device registrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportErrorPolicy {
    /// Count the tokens of the failing request as failed deliveries
    RecordFailure,
    /// Log the failure and leave the statistics record untouched
    LogOnly,
}

impl std::fmt::Display for TransportErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RecordFailure => "record-failure",
            Self::LogOnly => "log-only",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "FCM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { log_format: LogFormat::Text }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}
