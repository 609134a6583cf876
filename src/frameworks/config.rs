use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::domain::{ConfigError, RouteType};
use crate::interface_adapters::connection_string::ConnectionString;

// Runtime settings, read once at startup and injected into the app state.

pub const CONNECTION_STRING_VAR: &str = "ICE_CONNECTION_STRING";
// Azure Functions custom handlers are told which port to listen on through this variable.
pub const PORT_VAR: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const BIND_ADDR_VAR: &str = "ICE_BIND_ADDR";
pub const UPSTREAM_TIMEOUT_VAR: &str = "ICE_UPSTREAM_TIMEOUT_MS";
pub const SHORT_LIVED_TOKEN_MINUTES_VAR: &str = "ICE_SHORT_LIVED_TOKEN_MINUTES";
pub const RELAY_ROUTE_TYPE_VAR: &str = "ICE_RELAY_ROUTE_TYPE";
pub const ENABLE_REVOKE_ROUTE_VAR: &str = "ICE_ENABLE_REVOKE_ROUTE";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 5000;
const DEFAULT_SHORT_LIVED_TOKEN_MINUTES: u64 = 60;
// Token lifetimes the identity backend accepts.
const MIN_TOKEN_MINUTES: u64 = 60;
const MAX_TOKEN_MINUTES: u64 = 24 * 60;

#[derive(Debug)]
pub struct Settings {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub upstream_timeout: Duration,
    pub short_lived_token_ttl: Duration,
    pub relay_route_type: Option<RouteType>,
    // Off unless explicitly set; the route trusts any caller.
    pub revoke_route_enabled: bool,
    // Kept as a Result so the server can start and answer 500 when it is missing.
    pub connection: Result<ConnectionString, ConfigError>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let connection = match lookup(CONNECTION_STRING_VAR) {
            Some(raw) if !raw.trim().is_empty() => ConnectionString::parse(&raw),
            _ => Err(ConfigError::MissingConnectionString),
        };

        let bind_addr = parse_or(&lookup, BIND_ADDR_VAR, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = parse_or(&lookup, PORT_VAR, DEFAULT_PORT);
        let upstream_timeout = Duration::from_millis(parse_or(
            &lookup,
            UPSTREAM_TIMEOUT_VAR,
            DEFAULT_UPSTREAM_TIMEOUT_MS,
        ));

        let minutes = parse_or(
            &lookup,
            SHORT_LIVED_TOKEN_MINUTES_VAR,
            DEFAULT_SHORT_LIVED_TOKEN_MINUTES,
        );
        let clamped = minutes.clamp(MIN_TOKEN_MINUTES, MAX_TOKEN_MINUTES);
        if clamped != minutes {
            tracing::warn!(
                requested = minutes,
                used = clamped,
                "short-lived token lifetime out of range; clamped."
            );
        }

        let relay_route_type = lookup(RELAY_ROUTE_TYPE_VAR).and_then(|raw| {
            let parsed = RouteType::parse(&raw);
            if parsed.is_none() {
                tracing::warn!(value = %raw, "unknown relay route type; letting backend choose.");
            }
            parsed
        });

        let revoke_route_enabled = parse_or(&lookup, ENABLE_REVOKE_ROUTE_VAR, false);
        if revoke_route_enabled {
            tracing::warn!("revoke route enabled; it performs no caller authentication.");
        }

        Self {
            bind_addr,
            port,
            upstream_timeout,
            short_lived_token_ttl: Duration::from_secs(clamped * 60),
            relay_route_type,
            revoke_route_enabled,
            connection,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "invalid setting; using default.");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn when_nothing_is_set_then_defaults_apply_and_connection_is_missing() {
        let settings = settings(&[]);

        assert_eq!(settings.socket_addr(), "0.0.0.0:3000".parse().unwrap());
        assert_eq!(settings.upstream_timeout, Duration::from_millis(5000));
        assert_eq!(settings.short_lived_token_ttl, Duration::from_secs(3600));
        assert_eq!(settings.relay_route_type, None);
        assert!(!settings.revoke_route_enabled);
        assert!(matches!(
            settings.connection,
            Err(ConfigError::MissingConnectionString)
        ));
    }

    #[test]
    fn when_connection_string_is_blank_then_it_counts_as_missing() {
        let settings = settings(&[(CONNECTION_STRING_VAR, "  ")]);

        assert!(matches!(
            settings.connection,
            Err(ConfigError::MissingConnectionString)
        ));
    }

    #[test]
    fn when_all_values_are_set_then_they_are_used() {
        let settings = settings(&[
            (
                CONNECTION_STRING_VAR,
                "endpoint=https://contoso.example/;accesskey=dGVzdC1hY2Nlc3Mta2V5",
            ),
            (PORT_VAR, "7071"),
            (BIND_ADDR_VAR, "127.0.0.1"),
            (UPSTREAM_TIMEOUT_VAR, "2500"),
            (SHORT_LIVED_TOKEN_MINUTES_VAR, "120"),
            (RELAY_ROUTE_TYPE_VAR, "nearest"),
            (ENABLE_REVOKE_ROUTE_VAR, "true"),
        ]);

        assert_eq!(settings.socket_addr(), "127.0.0.1:7071".parse().unwrap());
        assert_eq!(settings.upstream_timeout, Duration::from_millis(2500));
        assert_eq!(settings.short_lived_token_ttl, Duration::from_secs(7200));
        assert_eq!(settings.relay_route_type, Some(RouteType::Nearest));
        assert!(settings.revoke_route_enabled);
        assert!(settings.connection.is_ok());
    }

    #[test]
    fn when_numbers_are_invalid_then_defaults_apply() {
        let settings = settings(&[(PORT_VAR, "http"), (UPSTREAM_TIMEOUT_VAR, "-1")]);

        assert_eq!(settings.port, 3000);
        assert_eq!(settings.upstream_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn when_revoke_flag_is_not_a_bool_then_route_stays_disabled() {
        let settings = settings(&[(ENABLE_REVOKE_ROUTE_VAR, "yes")]);

        assert!(!settings.revoke_route_enabled);
    }

    #[test]
    fn when_short_lived_lifetime_is_out_of_range_then_it_is_clamped() {
        let too_short = settings(&[(SHORT_LIVED_TOKEN_MINUTES_VAR, "5")]);
        let too_long = settings(&[(SHORT_LIVED_TOKEN_MINUTES_VAR, "10000")]);

        assert_eq!(too_short.short_lived_token_ttl, Duration::from_secs(3600));
        assert_eq!(too_long.short_lived_token_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn when_connection_string_is_malformed_then_error_is_kept_for_startup() {
        let settings = settings(&[(CONNECTION_STRING_VAR, "endpoint=https://contoso.example/")]);

        assert!(matches!(
            settings.connection,
            Err(ConfigError::MalformedConnectionString(_))
        ));
    }
}
