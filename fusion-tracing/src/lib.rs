//! Logging setup shared by the fusion crates.
//!
//! User facing output goes through `tracing` as well, so `--silent` and
//! `RUST_LOG` apply to everything the tools print.

use ansi_term::Colour;
use std::{env, io};
use tracing::{Level, Metadata};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::MakeWriter,
};

pub fn println_green(txt: &str) {
    println_std_out(txt, Colour::Green);
}

pub fn println_red_err(txt: &str) {
    println_std_err(txt, Colour::Red);
}

pub fn println_yellow_err(txt: &str) {
    println_std_err(txt, Colour::Yellow);
}

fn println_std_out(txt: &str, color: Colour) {
    tracing::info!("{}", color.paint(txt));
}

fn println_std_err(txt: &str, color: Colour) {
    tracing::error!("{}", color.paint(txt));
}

const LOG_FILTER: &str = "RUST_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

// ERROR and WARN go to stderr, everything else to stdout.
struct StdioTracingWriter {
    writer_mode: TracingWriterMode,
}

impl<'a> MakeWriter<'a> for StdioTracingWriter {
    type Writer = Box<dyn io::Write>;

    fn make_writer(&'a self) -> Self::Writer {
        match self.writer_mode {
            TracingWriterMode::Stderr => Box::new(io::stderr()),
            // No metadata to go by, stdout is the default.
            _ => Box::new(io::stdout()),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        if self.writer_mode == TracingWriterMode::Stderr
            || (self.writer_mode == TracingWriterMode::Stdio && meta.level() <= &Level::WARN)
        {
            return Box::new(io::stderr());
        }
        Box::new(io::stdout())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TracingWriterMode {
    /// Write ERROR and WARN to stderr and everything else to stdout.
    #[default]
    Stdio,
    /// Write everything to stdout.
    Stdout,
    /// Write everything to stderr.
    Stderr,
}

#[derive(Debug, Default)]
pub struct TracingSubscriberOptions {
    pub verbosity: Option<u8>,
    pub silent: Option<bool>,
    pub log_level: Option<LevelFilter>,
    pub writer_mode: Option<TracingWriterMode>,
}

impl TracingSubscriberOptions {
    /// The level forced by the options, if any. An explicit level wins over
    /// verbosity, which wins over silence.
    fn level_filter(&self) -> Option<LevelFilter> {
        self.log_level
            .or_else(|| match self.verbosity {
                Some(1) => Some(LevelFilter::DEBUG),
                Some(2..) => Some(LevelFilter::TRACE),
                _ => None,
            })
            .or_else(|| self.silent.filter(|silent| *silent).map(|_| LevelFilter::OFF))
    }
}

/// Installs a plain `fmt` subscriber, formatted so that log lines read like
/// ordinary program output.
///
/// `RUST_LOG` picks the minimum level and defaults to `info`. A level derived
/// from the options overrides it. Installing a second subscriber is a no-op.
pub fn init_tracing_subscriber(options: TracingSubscriberOptions) {
    let env_filter = match env::var_os(LOG_FILTER) {
        Some(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        None => EnvFilter::new(DEFAULT_LOG_FILTER),
    };

    let builder = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_level(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .with_target(false)
        .with_writer(StdioTracingWriter {
            writer_mode: options.writer_mode.unwrap_or_default(),
        });

    let res = match options.level_filter() {
        Some(level_filter) => builder.with_max_level(level_filter).try_init(),
        None => builder.try_init(),
    };
    if let Err(err) = res {
        tracing::debug!("keeping the installed tracing subscriber: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn level_precedence() {
        let opts = TracingSubscriberOptions {
            verbosity: Some(2),
            silent: Some(true),
            ..Default::default()
        };
        assert_eq!(opts.level_filter(), Some(LevelFilter::TRACE));

        let opts = TracingSubscriberOptions {
            log_level: Some(LevelFilter::WARN),
            verbosity: Some(1),
            ..Default::default()
        };
        assert_eq!(opts.level_filter(), Some(LevelFilter::WARN));

        let opts = TracingSubscriberOptions {
            silent: Some(true),
            ..Default::default()
        };
        assert_eq!(opts.level_filter(), Some(LevelFilter::OFF));
        assert_eq!(TracingSubscriberOptions::default().level_filter(), None);
    }

    #[traced_test]
    #[test]
    fn coloured_output_is_logged() {
        println_yellow_err("found unusable configuration");
        println_green("parsed Root.fusion");
        assert!(logs_contain("found unusable configuration"));
        assert!(logs_contain("parsed Root.fusion"));
    }

    #[traced_test]
    #[test]
    fn initializing_twice_keeps_the_first_subscriber() {
        init_tracing_subscriber(TracingSubscriberOptions::default());
        init_tracing_subscriber(TracingSubscriberOptions::default());
        assert!(logs_contain("keeping the installed tracing subscriber"));
    }
}
