//! crates/posix1e/src/text.rs
//!
//! The textual ACL grammar: parsing `<kind>:[<qualifier>]:<rwx>` entries and
//! rendering the canonical one-line-per-entry form.
//!
//! Entries are separated by newlines or commas; `#` starts a comment that
//! runs to the end of the line. Kinds may be abbreviated (`u`, `g`, `o`, `m`)
//! or spelled out. Qualifiers are numeric user/group ids; resolving names to
//! ids is an OS concern and not part of the grammar handled here.

use std::io;

use crate::error::{AclError, AclResult};
use crate::perm::{Perm, render_bits};
use crate::repr::AclRepr;
use crate::tag::Tag;

fn parse_error(message: String) -> AclError {
    AclError::backend("parse ACL text", io::Error::new(io::ErrorKind::InvalidInput, message))
}

/// Parses a textual ACL description into a record store.
pub(crate) fn parse(text: &str) -> AclResult<AclRepr> {
    let mut parts = Vec::new();

    for segment in text.split(['\n', ',']) {
        let segment = segment.split('#').next().unwrap_or("").trim();
        if segment.is_empty() {
            continue;
        }
        parts.push(parse_entry(segment)?);
    }

    Ok(AclRepr::from_parts(parts))
}

fn parse_entry(segment: &str) -> AclResult<(Tag, Option<u32>, u8)> {
    let fields: Vec<&str> = segment.split(':').collect();
    let [kind, qualifier, perms] = fields.as_slice() else {
        return Err(parse_error(format!("malformed ACL entry '{segment}'")));
    };

    let qualifier = if qualifier.is_empty() {
        None
    } else {
        Some(
            qualifier
                .parse::<u32>()
                .map_err(|_| parse_error(format!("qualifier '{qualifier}' is not a numeric id")))?,
        )
    };

    let tag = match (kind.trim(), qualifier.is_some()) {
        ("u" | "user", false) => Tag::UserObj,
        ("u" | "user", true) => Tag::User,
        ("g" | "group", false) => Tag::GroupObj,
        ("g" | "group", true) => Tag::Group,
        ("o" | "other", false) => Tag::Other,
        ("m" | "mask", false) => Tag::Mask,
        ("o" | "other" | "m" | "mask", true) => {
            return Err(parse_error(format!("'{kind}' entries take no qualifier")));
        }
        _ => return Err(parse_error(format!("unknown entry kind '{kind}'"))),
    };

    Ok((tag, qualifier, parse_perms(perms)?))
}

fn parse_perms(perms: &str) -> AclResult<u8> {
    let mut bits = 0u8;
    for ch in perms.trim().chars() {
        let bit = match ch {
            'r' => Perm::Read.bit(),
            'w' => Perm::Write.bit(),
            'x' => Perm::Execute.bit(),
            '-' => continue,
            other => return Err(parse_error(format!("invalid permission character '{other}'"))),
        };
        if bits & bit != 0 {
            return Err(parse_error(format!("duplicate permission character '{ch}'")));
        }
        bits |= bit;
    }
    Ok(bits)
}

/// Renders a record store as canonical ACL text, one entry per line with a
/// trailing newline per line.
///
/// Rendering fails when a record cannot be expressed in the grammar: an
/// undefined tag type, or a named entry without a qualifier.
pub(crate) fn render(repr: &AclRepr) -> AclResult<String> {
    let mut out = String::new();

    for record in repr.iter() {
        if record.tag == Tag::Undefined {
            return Err(AclError::backend(
                "render ACL text",
                io::Error::new(io::ErrorKind::InvalidInput, "entry has an undefined tag type"),
            ));
        }
        let qualifier = match (record.tag.is_named(), record.qualifier) {
            (true, Some(id)) => id.to_string(),
            (true, None) => {
                return Err(AclError::backend(
                    "render ACL text",
                    io::Error::new(io::ErrorKind::InvalidInput, "named entry has no qualifier"),
                ));
            }
            (false, _) => String::new(),
        };
        out.push_str(&format!(
            "{}:{}:{}\n",
            record.tag.keyword(),
            qualifier,
            render_bits(record.perms)
        ));
    }

    Ok(out)
}
