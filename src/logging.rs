//! Logging setup for the `inscribe` binary and tests.
//!
//! The library only uses the `log` macros:
//!
//! - `info!` - project-level progress (config file, documents found)
//! - `debug!` - one line per section and element translated
//! - `trace!` - every statement appended to a generated method
//! - `warn!` - input that translates but probably not as intended
//!
//! `RUST_LOG` overrides the CLI verbosity when set, e.g.
//! `RUST_LOG=inscribe_compiler::nodes=trace inscribe check`.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Only the first call installs the logger.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        let mut builder = Builder::new();
        builder.filter_level(level);
        if std::env::var_os("RUST_LOG").is_some() {
            builder.parse_env(Env::default());
        }
        builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

/// Verbosity flag count to a level: none = warn, `-v` = debug, `-vv` = trace.
pub fn level_for_verbosity(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_test() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .is_test(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test();
        init_test();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(1), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(5), LevelFilter::Trace);
    }
}
