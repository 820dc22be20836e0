use std::{
    fmt,
    future::Future,
    sync::Arc,
    task::{Context, Poll},
};

/// Extension trait for efficiently blocking on a future.
use crossbeam_utils::sync::{Parker, Unparker};
use futures_util::{pin_mut, task::ArcWake};

// ===============================================================================================
// Environment
// ===============================================================================================
#[doc(hidden)]
pub(crate) fn read_env(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) => value,
        Err(_) => default.to_string(),
    }
}

// ===============================================================================================
// Futures
// ===============================================================================================
#[doc(hidden)]
pub trait Join: Future {
    fn join(self) -> <Self as Future>::Output;
}

impl<F: Future> Join for F {
    fn join(self) -> <Self as Future>::Output {
        struct ThreadWaker(Unparker);

        impl ArcWake for ThreadWaker {
            fn wake_by_ref(arc_self: &Arc<Self>) {
                arc_self.0.unpark();
            }
        }

        let parker = Parker::new();
        let waker = futures_util::task::waker(Arc::new(ThreadWaker(parker.unparker().clone())));
        let mut context = Context::from_waker(&waker);

        let future = self;
        pin_mut!(future);

        loop {
            match future.as_mut().poll(&mut context) {
                Poll::Ready(output) => return output,
                Poll::Pending => parker.park(),
            }
        }
    }
}

// ===============================================================================================
// Paths and queries
// ===============================================================================================

/// Brings a path into the form used for matching: exactly one leading slash and no trailing
/// slash (except for the root path itself).
pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    format!("/{}", trimmed)
}

/// Percent-decodes a received request path. Byte sequences that are not valid UTF-8 after
/// decoding are replaced rather than rejected.
pub(crate) fn decode_path(path: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(path.as_bytes())).into_owned()
}

/// Applies a base path prefix to a registered path. Paths that already start with the base path
/// (on a segment boundary) are kept as they are.
pub(crate) fn apply_base_path(base_path: Option<&str>, path: &str) -> String {
    let path = normalize_path(path);

    let base = match base_path.map(normalize_path) {
        Some(base) if base != "/" => base,
        _ => return path,
    };

    if path == base || path.starts_with(&format!("{}/", base)) {
        return path;
    }

    if path == "/" {
        return base;
    }

    format!("{}{}", base, path)
}

/// Parses a query string into its (key, value) pairs, sorted so that two queries with the same
/// pairs in a different order compare equal.
pub(crate) fn sorted_query_pairs(query: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    pairs
}

// ===============================================================================================
// Diagnostics
// ===============================================================================================

/// A single-argument logging function receiving human-readable trace lines during matching.
pub type DiagnosticSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Writes matching trace lines to `tracing` and, if configured, to the user's diagnostic sink.
#[derive(Clone, Default)]
pub(crate) struct Diagnostics {
    sink: Option<DiagnosticSink>,
}

impl Diagnostics {
    pub(crate) fn new(sink: Option<DiagnosticSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn emit(&self, line: &str) {
        tracing::debug!("{}", line);
        if let Some(sink) = &self.sink {
            sink(line);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("sink", &self.sink.as_ref().map(|_| "Fn(&str)"))
            .finish()
    }
}
