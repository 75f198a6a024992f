//! crates/posix1e/src/state.rs
//!
//! Opaque export/import of an ACL's full internal representation.
//!
//! The buffer layout is internal and versioned; callers must treat it as a
//! black box. The only contract is the round trip: importing an exported
//! buffer reconstructs an ACL that renders to identical text. The export is
//! sized up front and copied out in one pass, so the buffer length always
//! equals the computed size.

use std::io;

use crate::repr::AclRepr;
use crate::tag::Tag;

const MAGIC: &[u8; 4] = b"P1EA";
const VERSION: u8 = 1;

/// magic + version + record count.
const HEADER_SIZE: usize = 4 + 1 + 4;
/// tag + qualifier flag + qualifier + permission bits.
const RECORD_SIZE: usize = 1 + 1 + 4 + 1;

/// Exact size in bytes of the exported form of `repr`.
pub(crate) fn exported_size(repr: &AclRepr) -> usize {
    HEADER_SIZE + repr.len() * RECORD_SIZE
}

/// Serializes the record store into its opaque external form.
pub(crate) fn export(repr: &AclRepr) -> Vec<u8> {
    let mut out = Vec::with_capacity(exported_size(repr));

    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&u32::try_from(repr.len()).unwrap_or(u32::MAX).to_be_bytes());

    for record in repr.iter() {
        // Tag discriminants fit in one byte (largest is 0x20).
        out.push(record.tag.as_raw() as u8);
        out.push(u8::from(record.qualifier.is_some()));
        out.extend_from_slice(&record.qualifier.unwrap_or(0).to_be_bytes());
        out.push(record.perms);
    }

    debug_assert_eq!(out.len(), exported_size(repr));
    out
}

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_owned())
}

/// Reconstructs a record store from a buffer produced by [`export`].
pub(crate) fn import(data: &[u8]) -> io::Result<AclRepr> {
    if data.len() < HEADER_SIZE {
        return Err(invalid("truncated ACL state header"));
    }
    if &data[..4] != MAGIC {
        return Err(invalid("not an exported ACL state"));
    }
    if data[4] != VERSION {
        return Err(invalid("unsupported ACL state version"));
    }

    let count = u32::from_be_bytes(data[5..9].try_into().expect("4-byte slice")) as usize;
    let body = &data[HEADER_SIZE..];
    if body.len() != count * RECORD_SIZE {
        return Err(invalid("ACL state length does not match its record count"));
    }

    let mut parts = Vec::with_capacity(count);
    for chunk in body.chunks_exact(RECORD_SIZE) {
        let tag = Tag::from_raw(i32::from(chunk[0]))
            .ok_or_else(|| invalid("unknown tag type in ACL state"))?;
        let qualifier = match chunk[1] {
            0 => None,
            1 => Some(u32::from_be_bytes(chunk[2..6].try_into().expect("4-byte slice"))),
            _ => return Err(invalid("corrupt qualifier flag in ACL state")),
        };
        let perms = chunk[6];
        if perms & !crate::perm::PERM_ALL != 0 {
            return Err(invalid("corrupt permission bits in ACL state"));
        }
        parts.push((tag, qualifier, perms));
    }

    Ok(AclRepr::from_parts(parts))
}
