//! Elixir Term Conversion Utilities
//!
//! Converts parsed elements to Elixir terms.

use crate::core::error::ParseError;
use crate::dom::{Document, NodeId};
use rustler::{Encoder, Env, NewBinary, Term};

rustler::atoms! {
    ok,
    error,
    element,
}

/// Convert an element subtree to `{:element, tag, attrs, text | nil, children}`
pub fn element_to_term<'a>(env: Env<'a>, doc: &Document<'_>, id: NodeId) -> Term<'a> {
    if doc.element(id).is_none() {
        return rustler::types::atom::nil().encode(env);
    }

    let tag = bytes_to_binary(env, doc.tag_bytes(id));

    // Lists are built back to front with prepend
    let pairs: Vec<_> = doc.attributes(id).collect();
    let mut attrs = Term::list_new_empty(env);
    for (name, value) in pairs.into_iter().rev() {
        attrs = attrs.list_prepend((str_to_binary(env, name), str_to_binary(env, value)).encode(env));
    }

    let text = match doc.text(id) {
        Some(text) => str_to_binary(env, text),
        None => rustler::types::atom::nil().encode(env),
    };

    let child_ids: Vec<_> = doc.children(id).collect();
    let mut children = Term::list_new_empty(env);
    for &child in child_ids.iter().rev() {
        children = children.list_prepend(element_to_term(env, doc, child));
    }

    (element(), tag, attrs, text, children).encode(env)
}

/// `nil` or the element term
pub fn optional_element<'a>(env: Env<'a>, doc: &Document<'_>, id: Option<NodeId>) -> Term<'a> {
    match id {
        Some(id) => element_to_term(env, doc, id),
        None => rustler::types::atom::nil().encode(env),
    }
}

/// `nil` or a binary
pub fn optional_str<'a>(env: Env<'a>, s: Option<&str>) -> Term<'a> {
    match s {
        Some(s) => str_to_binary(env, s),
        None => rustler::types::atom::nil().encode(env),
    }
}

/// `{:error, message}`
pub fn error_to_term<'a>(env: Env<'a>, err: &impl std::fmt::Display) -> Term<'a> {
    (error(), err.to_string()).encode(env)
}

/// Diagnostics as a list of message strings
pub fn diagnostics_to_term<'a>(env: Env<'a>, diagnostics: &[ParseError]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for diag in diagnostics.iter().rev() {
        list = list.list_prepend(diag.to_string().encode(env));
    }
    list
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    bytes_to_binary(env, s.as_bytes())
}

#[inline]
fn bytes_to_binary<'a>(env: Env<'a>, bytes: &[u8]) -> Term<'a> {
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
