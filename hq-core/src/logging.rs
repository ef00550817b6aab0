//! ``src/logging.rs``
//! ============================================================================
//! # Logger: sequenced file logging
//!
//! The terminal UI owns stdout/stderr while running, so events only go to a
//! daily rolling file under the configured log directory. Each line is
//! prefixed with a monotonically increasing sequence number.

use std::{
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use tracing::Metadata;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    prelude::*,
};

use crate::{config::LoggingConfig, error::AppError};

pub struct Logger;

impl Logger {
    /// Call **once** near the start of `main`. Keep the returned guard alive
    /// for the lifetime of the process or buffered lines are lost.
    pub fn init_tracing(cfg: &LoggingConfig) -> Result<WorkerGuard, AppError> {
        let log_dir: &Path = &cfg.dir;
        std::fs::create_dir_all(log_dir).map_err(|e| AppError::file_io(log_dir, e))?;

        // daily rolling file appender -> <dir>/hq.YYYY-MM-DD
        let (writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, "hq"));

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&cfg.level))
            .map_err(|e| AppError::InvalidConfig(format!("logging.level: {e}")))?;

        let file_layer = fmt::layer()
            .event_format(SeqFileMod)
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(file_layer)
            .try_init()
            .map_err(|e| AppError::Other(format!("tracing already initialised: {e}")))?;

        Ok(guard)
    }
}

static SEQ: AtomicUsize = AtomicUsize::new(1);

/// Custom formatter: `[SEQ] LEVEL [file:line mod::path] message`
struct SeqFileMod;

impl<S, N> FormatEvent<S, N> for SeqFileMod
where
    S: tracing::Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        ev: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let seq: usize = SEQ.fetch_add(1, Ordering::Relaxed);

        let meta: &'static Metadata<'static> = ev.metadata();
        write!(
            w,
            "{seq:06} {:5} [{}:{} {}] ",
            meta.level(),
            meta.file().unwrap_or("??"),
            meta.line().unwrap_or(0),
            meta.module_path().unwrap_or("???"),
        )?;

        ctx.field_format().format_fields(w.by_ref(), ev)?;
        writeln!(w)
    }
}
