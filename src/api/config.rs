use crate::{
    common::util::{normalize_path, read_env, DiagnosticSink},
    Error,
};
use std::{fmt, sync::Arc};

/// Settings for a pact session's mock endpoint.
///
/// **Example**:
/// ```
/// use pactmock::prelude::*;
///
/// let config = PactConfig::new()
///     .base_path("/api")
///     .print_access_log(true)
///     .diagnostic_sink(|line| println!("{}", line));
///
/// assert_eq!(config.get_base_path(), Some("/api"));
/// ```
#[derive(Clone, Default)]
pub struct PactConfig {
    base_path: Option<String>,
    port: Option<u16>,
    print_access_log: bool,
    diagnostic_sink: Option<DiagnosticSink>,
}

impl PactConfig {
    /// Creates a configuration with default settings: no base path, an ephemeral port, no
    /// access log and no diagnostic sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the configuration from the environment variables `PACTMOCK_BASE_PATH`,
    /// `PACTMOCK_PORT` and `PACTMOCK_PRINT_ACCESS_LOG`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, Error> {
        let base_path = Some(read_env("PACTMOCK_BASE_PATH", "")).filter(|p| !p.is_empty());

        let port = match read_env("PACTMOCK_PORT", "").as_str() {
            "" => None,
            value => Some(value.parse::<u16>().map_err(|err| {
                Error::Construction(format!(
                    "cannot parse environment variable PACTMOCK_PORT to a port number: {}",
                    err
                ))
            })?),
        };

        let print_access_log = match read_env("PACTMOCK_PRINT_ACCESS_LOG", "false")
            .to_lowercase()
            .as_str()
        {
            "true" | "1" => true,
            "false" | "0" | "" => false,
            other => {
                return Err(Error::Construction(format!(
                    "cannot parse environment variable PACTMOCK_PRINT_ACCESS_LOG to a boolean: {:?}",
                    other
                )))
            }
        };

        Ok(Self::new()
            .base_path_option(base_path)
            .port_option(port)
            .print_access_log(print_access_log))
    }

    /// Sets a path prefix (e.g. `/api`) that is prepended to every interaction path that does
    /// not already start with it. The client's base URL includes it as well.
    pub fn base_path<IntoString: Into<String>>(mut self, base_path: IntoString) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn base_path_option<IntoString: Into<String>>(
        mut self,
        base_path: Option<IntoString>,
    ) -> Self {
        self.base_path = base_path.map(|p| p.into());
        self
    }

    /// Binds the mock endpoint to a fixed port instead of an ephemeral one.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn port_option(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Logs one line per served request at info level.
    pub fn print_access_log(mut self, enabled: bool) -> Self {
        self.print_access_log = enabled;
        self
    }

    /// Receives a human-readable line for every matching step of the mock endpoint, e.g. to
    /// forward it to a test framework's output.
    pub fn diagnostic_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.diagnostic_sink = Some(Arc::new(sink));
        self
    }

    pub fn get_base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn get_port(&self) -> Option<u16> {
        self.port
    }

    pub fn get_print_access_log(&self) -> bool {
        self.print_access_log
    }

    /// The base path in normalized form, or `None` if no (or only the root) path is set.
    pub(crate) fn normalized_base_path(&self) -> Option<String> {
        self.base_path
            .as_deref()
            .map(normalize_path)
            .filter(|p| p != "/")
    }

    pub(crate) fn sink(&self) -> Option<DiagnosticSink> {
        self.diagnostic_sink.clone()
    }
}

impl fmt::Debug for PactConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PactConfig")
            .field("base_path", &self.base_path)
            .field("port", &self.port)
            .field("print_access_log", &self.print_access_log)
            .field(
                "diagnostic_sink",
                &self.diagnostic_sink.as_ref().map(|_| "Fn(&str)"),
            )
            .finish()
    }
}
