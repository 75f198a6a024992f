//! crates/posix1e/src/validity.rs
//!
//! The POSIX.1e structural validity rules.
//!
//! A valid ACL contains exactly one entry each of the owner, owning-group,
//! and other tag types. Named user and group entries may appear any number of
//! times, but their qualifiers must be unique within their tag type, and
//! their presence makes a single mask entry mandatory. Without named entries
//! the mask is optional; more than one mask is never allowed.
//!
//! The check reports a single boolean, mirroring `acl_valid(3)`, which
//! documents only one errno for every class of invalidity. It deliberately
//! does not say which rule failed.

use crate::repr::AclRepr;
use crate::tag::Tag;

/// Returns `true` iff the record store forms a structurally valid ACL.
pub(crate) fn check(repr: &AclRepr) -> bool {
    let mut user_obj = 0usize;
    let mut group_obj = 0usize;
    let mut other = 0usize;
    let mut mask = 0usize;
    let mut user_ids = Vec::new();
    let mut group_ids = Vec::new();

    for record in repr.iter() {
        match record.tag {
            Tag::Undefined => return false,
            Tag::UserObj => user_obj += 1,
            Tag::GroupObj => group_obj += 1,
            Tag::Other => other += 1,
            Tag::Mask => mask += 1,
            Tag::User => {
                let Some(id) = record.qualifier else {
                    return false;
                };
                if user_ids.contains(&id) {
                    return false;
                }
                user_ids.push(id);
            }
            Tag::Group => {
                let Some(id) = record.qualifier else {
                    return false;
                };
                if group_ids.contains(&id) {
                    return false;
                }
                group_ids.push(id);
            }
        }
    }

    if user_obj != 1 || group_obj != 1 || other != 1 {
        return false;
    }
    if user_ids.is_empty() && group_ids.is_empty() {
        mask <= 1
    } else {
        mask == 1
    }
}
