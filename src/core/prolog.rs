//! Prolog, comment and declaration skipping
//!
//! Nothing here creates nodes: declarations, DOCTYPE blocks, processing
//! instructions and comments are stepped over. A malformed comment is fatal.

use super::error::ParseError;
use super::scanner::Scanner;
use crate::options::ParseOptions;

/// Advance past everything that precedes the root element.
///
/// On success the scanner sits on the first byte of the root tag name, one
/// past its `<`.
pub fn skip_prolog(scanner: &mut Scanner<'_>, options: &ParseOptions) -> Result<(), ParseError> {
    loop {
        let lt = scanner.find_byte(b'<').ok_or(ParseError::NoRootElement)?;
        scanner.set_position(lt + 1);

        match scanner.peek() {
            Some(b'?') => {
                if !skip_processing_instruction(scanner) {
                    return Err(ParseError::NoRootElement);
                }
                xml_log!(options, Debug, "skipped declaration ending at byte {}", scanner.position());
            }
            Some(b'!') if scanner.starts_with(b"!--") => skip_comment(scanner, options)?,
            Some(b'!') => {
                if !skip_declaration(scanner) {
                    return Err(ParseError::NoRootElement);
                }
                xml_log!(options, Debug, "skipped markup declaration ending at byte {}", scanner.position());
            }
            Some(_) => return Ok(()),
            None => return Err(ParseError::NoRootElement),
        }
    }
}

/// Skip a comment. The scanner must sit on the `!` following `<`.
///
/// Afterwards it sits one past the closing `-->`.
pub fn skip_comment(scanner: &mut Scanner<'_>, options: &ParseOptions) -> Result<(), ParseError> {
    let position = scanner.position().saturating_sub(1);
    if !scanner.starts_with(b"!--") {
        xml_log!(options, Error, "malformed comment at byte {}", position);
        return Err(ParseError::MalformedComment { position });
    }
    scanner.advance(3);

    let body_start = scanner.position();
    let Some(end) = scanner.find_seq(b"-->") else {
        xml_log!(options, Error, "unterminated comment at byte {}", position);
        return Err(ParseError::MalformedComment { position });
    };

    // "--" may not appear inside a comment body
    if options.strict && memchr::memmem::find(scanner.slice(body_start, end), b"--").is_some() {
        return Err(ParseError::MalformedComment { position });
    }

    scanner.set_position(end + 3);
    Ok(())
}

/// Skip `<?target ...?>`. The scanner must sit on the `?`.
///
/// Returns false when the closing `?>` is missing.
pub fn skip_processing_instruction(scanner: &mut Scanner<'_>) -> bool {
    match scanner.find_seq(b"?>") {
        Some(end) => {
            scanner.set_position(end + 2);
            true
        }
        None => false,
    }
}

/// Skip `<!DOCTYPE ...>` including a bracketed internal subset.
///
/// The scanner must sit on the `!`. Returns false when unterminated.
pub fn skip_declaration(scanner: &mut Scanner<'_>) -> bool {
    let Some(stop) = scanner.find_byte2(b'[', b'>') else {
        return false;
    };
    scanner.set_position(stop);
    if scanner.peek() == Some(b'[') {
        let Some(close) = scanner.find_byte(b']') else {
            return false;
        };
        scanner.set_position(close);
    }
    match scanner.find_byte(b'>') {
        Some(gt) => {
            scanner.set_position(gt + 1);
            true
        }
        None => false,
    }
}

/// Skip whitespace, comments and processing instructions after the root.
///
/// Returns the position of the first other byte, or None when only
/// ignorable content remains. A NUL byte ends the document.
pub fn skip_misc(scanner: &mut Scanner<'_>, options: &ParseOptions) -> Result<Option<usize>, ParseError> {
    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            None | Some(0) => return Ok(None),
            Some(b'<') if scanner.starts_with(b"<!--") => {
                scanner.advance(1);
                skip_comment(scanner, options)?;
            }
            Some(b'<') if scanner.starts_with(b"<?") => {
                let position = scanner.position();
                scanner.advance(1);
                if !skip_processing_instruction(scanner) {
                    return Ok(Some(position));
                }
            }
            Some(_) => return Ok(Some(scanner.position())),
        }
    }
}
