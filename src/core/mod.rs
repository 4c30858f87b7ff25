//! Core XML parsing primitives
//!
//! This module contains the building blocks of the in-place parser:
//! - Scanner: memchr-backed cursor that can splice terminators into the buffer
//! - Prolog: declaration, DOCTYPE and comment skipping
//! - Parser: recursive-descent element parser
//! - Error: error and severity model

/// Emit a log record if the parse's own level filter allows it
macro_rules! xml_log {
    ($opts:expr, $lvl:ident, $($arg:tt)+) => {
        if $opts.logs(log::Level::$lvl) {
            log::log!(target: $opts.log_target, log::Level::$lvl, $($arg)+);
        }
    };
}

pub mod error;
pub mod parser;
pub mod prolog;
pub mod scanner;
