//! Diagnostic logging for the public message routes.
//!
//! [`Diagnostics`] is built once from configuration and carried in the app
//! state. It gates the optional debug/performance lines per module. The
//! [`timed`] layer is applied route-by-route and always logs elapsed time.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, info};

use crate::state::AppState;

pub const LOG_PREFIX: &str = "-- PUBLIC MESSAGE --";

/// Bitmask of application areas whose gated diagnostics are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceModules(u64);

impl TraceModules {
    pub const NONE: Self = Self(0);
    pub const PUBLIC_MESSAGES: Self = Self(1);
    pub const STORE: Self = Self(1 << 1);
    pub const ALL: Self = Self(u64::MAX);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True when any bit of `module` is traced.
    pub const fn traces(self, module: TraceModules) -> bool {
        self.0 & module.0 != 0
    }
}

impl BitOr for TraceModules {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiagnosticsParseError {
    #[error("unknown trace module '{0}' (expected public_messages, store, all, none or a number)")]
    UnknownModule(String),
    #[error("unknown trace type '{0}' (expected debug, performance or both)")]
    UnknownLogType(String),
}

impl FromStr for TraceModules {
    type Err = DiagnosticsParseError;

    /// Accepts a raw bitmask (`3`, `0x3`) or a comma list of module names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(bits) = s.parse::<u64>() {
            return Ok(Self::from_bits(bits));
        }
        if let Some(hex) = s.strip_prefix("0x") {
            return u64::from_str_radix(hex, 16)
                .map(Self::from_bits)
                .map_err(|_| DiagnosticsParseError::UnknownModule(s.to_string()));
        }

        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(Self::NONE, |acc, name| {
                let module = match name.to_ascii_lowercase().as_str() {
                    "none" => Self::NONE,
                    "public_messages" | "public_message" => Self::PUBLIC_MESSAGES,
                    "store" => Self::STORE,
                    "all" => Self::ALL,
                    _ => return Err(DiagnosticsParseError::UnknownModule(name.to_string())),
                };
                Ok(acc | module)
            })
    }
}

/// Which gated categories a traced module emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogType {
    Debug,
    Performance,
    #[default]
    Both,
}

impl FromStr for LogType {
    type Err = DiagnosticsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "performance" | "perf" => Ok(Self::Performance),
            "both" => Ok(Self::Both),
            other => Err(DiagnosticsParseError::UnknownLogType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub modules: TraceModules,
    pub log_type: LogType,
}

impl Diagnostics {
    pub fn new(modules: TraceModules, log_type: LogType) -> Self {
        Self { modules, log_type }
    }

    pub fn debug_enabled(&self, module: TraceModules) -> bool {
        self.modules.traces(module) && matches!(self.log_type, LogType::Debug | LogType::Both)
    }

    pub fn performance_enabled(&self, module: TraceModules) -> bool {
        self.modules.traces(module)
            && matches!(self.log_type, LogType::Performance | LogType::Both)
    }

    pub fn debug(&self, module: TraceModules, message: impl fmt::Display) {
        if self.debug_enabled(module) {
            debug!(module = module.bits(), "{} {}", LOG_PREFIX, message);
        }
    }

    pub fn performance(&self, module: TraceModules, message: impl fmt::Display) {
        if self.performance_enabled(module) {
            info!(module = module.bits(), "{} [perf] {}", LOG_PREFIX, message);
        }
    }
}

/// Timing decorator: header, elapsed milliseconds and footer around the
/// wrapped route, whatever status the route ends with.
pub async fn timed(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let label = format!("{} {}", request.method(), route);

    info!("{} -------- {} --------", LOG_PREFIX, label);
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(
        status = response.status().as_u16(),
        "{} Public Message Controller. Elapsed : {:.3}",
        LOG_PREFIX,
        elapsed_ms
    );
    state.diagnostics.performance(
        TraceModules::PUBLIC_MESSAGES,
        format_args!("{} took {:.3} ms", label, elapsed_ms),
    );
    info!("{} -------- {} --------", LOG_PREFIX, label);

    response
}
