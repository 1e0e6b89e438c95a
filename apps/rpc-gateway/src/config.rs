// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; any invalid value aborts startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `127.0.0.1` |
//! | `PORT` | Server bind port | `8546` |
//! | `BROWSER_PLATFORM` | `chrome`, `firefox`, `edge`, `opera` or `brave` | `chrome` |
//! | `EXTENSION_ID` | This extension's runtime id | Required |
//! | `BLOCKED_PORT_NAMES` | Comma list of reserved port names | `trezor-connect` |
//! | `RUNTIME_APIS` | Comma list of API surfaces the background exposes | empty |
//! | `INJECTION_DENYLIST` | Comma list of denylist URLs (replaces built-in list) | built-in |
//! | `REQUEST_ACCOUNT_BINDING_CAPACITY` | Max origins in the binding store | `4096` |
//! | `SESSION_DIR` | Directory for file-backed session storage | in-memory |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::connection::bindings::DEFAULT_BINDING_CAPACITY;
use crate::connection::classifier::DEFAULT_BLOCKED_PORT_NAMES;
use crate::connection::Platform;
use crate::injection::{Denylist, DenylistError};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const PLATFORM_ENV: &str = "BROWSER_PLATFORM";
pub const EXTENSION_ID_ENV: &str = "EXTENSION_ID";
pub const BLOCKED_PORT_NAMES_ENV: &str = "BLOCKED_PORT_NAMES";
pub const RUNTIME_APIS_ENV: &str = "RUNTIME_APIS";
pub const INJECTION_DENYLIST_ENV: &str = "INJECTION_DENYLIST";
pub const BINDING_CAPACITY_ENV: &str = "REQUEST_ACCOUNT_BINDING_CAPACITY";

/// Environment variable name for the session storage directory.
///
/// When unset, the UI snapshot is kept in memory and lost on restart.
pub const SESSION_DIR_ENV: &str = "SESSION_DIR";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PORT: u16 = 8546;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: `{value}`")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Denylist(#[from] DenylistError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Option<LogFormat> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "text" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub platform: Platform,
    pub extension_id: String,
    pub blocked_port_names: Vec<String>,
    pub runtime_apis: Vec<String>,
    pub denylist: Denylist,
    pub binding_capacity: usize,
    pub session_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            platform: Platform::default(),
            extension_id: String::new(),
            blocked_port_names: DEFAULT_BLOCKED_PORT_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            runtime_apis: Vec::new(),
            denylist: Denylist::builtin(),
            binding_capacity: DEFAULT_BINDING_CAPACITY,
            session_dir: None,
            log_format: LogFormat::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host: IpAddr = match var(HOST_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                value: raw,
            })?,
            None => defaults.bind_addr.ip(),
        };

        let port: u16 = match var(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let platform = match var(PLATFORM_ENV) {
            Some(raw) => Platform::from_str(&raw).ok_or(ConfigError::Invalid {
                name: PLATFORM_ENV,
                value: raw,
            })?,
            None => defaults.platform,
        };

        let extension_id = var(EXTENSION_ID_ENV)
            .map(|id| id.trim().to_string())
            .ok_or(ConfigError::Missing(EXTENSION_ID_ENV))?;

        let blocked_port_names = var(BLOCKED_PORT_NAMES_ENV)
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.blocked_port_names);

        let runtime_apis = var(RUNTIME_APIS_ENV)
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        let denylist = match var(INJECTION_DENYLIST_ENV) {
            Some(raw) => Denylist::parse(split_list(&raw))?,
            None => defaults.denylist,
        };

        let binding_capacity = match var(BINDING_CAPACITY_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: BINDING_CAPACITY_ENV,
                    value: raw,
                })?,
            None => DEFAULT_BINDING_CAPACITY,
        };

        let log_format = match var(LOG_FORMAT_ENV) {
            Some(raw) => LogFormat::from_str(&raw).ok_or(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                value: raw,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            platform,
            extension_id,
            blocked_port_names,
            runtime_apis,
            denylist,
            binding_capacity,
            session_dir: var(SESSION_DIR_ENV).map(PathBuf::from),
            log_format,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_extension_id_is_set() {
        let config = load(&[(EXTENSION_ID_ENV, "abc")]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8546");
        assert_eq!(config.platform, Platform::Chrome);
        assert_eq!(config.blocked_port_names, vec!["trezor-connect"]);
        assert_eq!(config.denylist, Denylist::builtin());
        assert!(config.session_dir.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn extension_id_is_required() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing(EXTENSION_ID_ENV))
        ));
    }

    #[test]
    fn lists_are_split_and_trimmed() {
        let config = load(&[
            (EXTENSION_ID_ENV, "abc"),
            (BLOCKED_PORT_NAMES_ENV, "trezor-connect, ledger-bridge ,"),
            (RUNTIME_APIS_ENV, "ServiceWorkerGlobalScope"),
            (INJECTION_DENYLIST_ENV, "https://a.example/, b.example/checkout"),
            (PLATFORM_ENV, "Firefox"),
        ])
        .unwrap();
        assert_eq!(config.blocked_port_names, vec!["trezor-connect", "ledger-bridge"]);
        assert_eq!(config.runtime_apis, vec!["ServiceWorkerGlobalScope"]);
        assert_eq!(config.denylist.len(), 2);
        assert_eq!(config.platform, Platform::Firefox);
    }

    #[test]
    fn invalid_denylist_entry_aborts_startup() {
        let err = load(&[
            (EXTENSION_ID_ENV, "abc"),
            (INJECTION_DENYLIST_ENV, "https://a.example/?q=1#frag"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Denylist(_)));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(load(&[(EXTENSION_ID_ENV, "abc"), (PORT_ENV, "http")]).is_err());
        assert!(load(&[(EXTENSION_ID_ENV, "abc"), (BINDING_CAPACITY_ENV, "0")]).is_err());
        assert!(load(&[(EXTENSION_ID_ENV, "abc"), (PLATFORM_ENV, "safari")]).is_err());
    }
}
