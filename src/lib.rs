//! InsituXml - in-place, zero-copy XML parsing for configuration documents
//!
//! The parser splices NUL terminators into the input and records every tag,
//! attribute and text run as a span over that buffer. The result is a
//! read-only element tree that can be queried from many threads.
//!
//! Layers:
//! - core: scanner, prolog skipping, recursive-descent parser, errors
//! - dom: buffer ownership, element arena, navigation
//! - query: bounded paths, path cache, parallel lookups
//! - NIFs: `Elixir.InsituXml.Native`
//!
//! ```
//! use insitu_xml::Document;
//!
//! let doc = Document::parse(b"<cfg><slave addr=\"7\"><name>io</name></slave></cfg>").unwrap();
//! let slave = doc.find_by_path(doc.root(), "cfg/slave").unwrap();
//! assert_eq!(doc.get_attribute(slave, "addr"), Some("7"));
//! assert_eq!(doc.child_text(slave, "name"), Some("io"));
//! ```

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

#[macro_use]
pub mod core;
pub mod dom;
pub mod options;
pub mod query;
mod resource;
mod term;

pub use crate::core::error::{Allocation, ParseError, Severity};
pub use dom::{free_document, parse_document, Buffer, Document, Element, NodeId};
pub use options::ParseOptions;
pub use query::{CompiledPath, PathCache, PathError};

use resource::{DocumentRef, DocumentResource};
use term::{diagnostics_to_term, element_to_term, error_to_term, optional_element, optional_str};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Parsing
// ============================================================================

/// Parse a copy of the input leniently (returns ResourceArc or {:error, reason})
#[rustler::nif]
fn parse<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match DocumentResource::parse(input.as_slice(), &ParseOptions::default()) {
        Ok(resource) => Ok(ResourceArc::new(resource).encode(env)),
        Err(err) => Ok(error_to_term(env, &err)),
    }
}

/// Parse in strict mode (returns {:ok, doc} or {:error, reason})
#[rustler::nif]
fn parse_strict<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match DocumentResource::parse(input.as_slice(), &ParseOptions::strict()) {
        Ok(resource) => Ok((term::ok(), ResourceArc::new(resource)).encode(env)),
        Err(err) => Ok(error_to_term(env, &err)),
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Top-level element as a nested term
#[rustler::nif]
fn root<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    let doc = doc_ref.doc();
    Ok(element_to_term(env, doc, doc.root_element()))
}

/// Element at `path` below the top-level element, or nil
#[rustler::nif]
fn find<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    match doc_ref.find(path) {
        Ok(id) => Ok(optional_element(env, doc_ref.doc(), id)),
        Err(err) => Ok(error_to_term(env, &err)),
    }
}

/// Attribute `name` of the element at `path`, or nil
#[rustler::nif]
fn attribute<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str, name: &str) -> NifResult<Term<'a>> {
    match doc_ref.find(path) {
        Ok(id) => {
            let value = id.and_then(|id| doc_ref.doc().get_attribute(id, name));
            Ok(optional_str(env, value))
        }
        Err(err) => Ok(error_to_term(env, &err)),
    }
}

/// Text of the element at `path`, or nil
#[rustler::nif]
fn text<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    match doc_ref.find(path) {
        Ok(id) => Ok(optional_str(env, id.and_then(|id| doc_ref.doc().text(id)))),
        Err(err) => Ok(error_to_term(env, &err)),
    }
}

/// Resolve many paths at once
#[rustler::nif(schedule = "DirtyCpu")]
fn find_parallel<'a>(env: Env<'a>, doc_ref: DocumentRef, paths: Vec<&str>) -> NifResult<Term<'a>> {
    let doc = doc_ref.doc();
    let results = query::parallel::find_parallel_cached(doc, doc.root_element(), &paths, doc_ref.paths());

    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        let term = match result {
            Ok(id) => optional_element(env, doc, id),
            Err(err) => error_to_term(env, &err),
        };
        list = list.list_prepend(term);
    }
    Ok(list)
}

/// Recoverable errors recorded during a lenient parse
#[rustler::nif]
fn diagnostics<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    Ok(diagnostics_to_term(env, doc_ref.doc().diagnostics()))
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.InsituXml.Native");
