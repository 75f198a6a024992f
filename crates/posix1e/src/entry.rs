//! crates/posix1e/src/entry.rs
//!
//! Entry views: one ACL record seen through a handle that keeps the owning
//! ACL alive.

use std::fmt;

use crate::acl::Acl;
use crate::error::{AclError, AclResult};
use crate::permset::Permset;
use crate::repr::{Record, RecordId};
use crate::tag::Tag;

/// One record in an ACL: a tag type, an optional numeric qualifier, and a
/// permission set.
///
/// An `Entry` is a view, not a value: it holds a strong reference to its
/// owning [`Acl`] and addresses one record inside it, so mutating the entry
/// mutates the ACL in place and two views of the same record observe each
/// other's changes immediately. Entries are obtained either from
/// [`Entry::new`] (which appends a blank record) or by iterating the ACL.
///
/// Deleting the record — through [`Acl::delete_entry`] or by replacing the
/// ACL's state wholesale — leaves the view stale; its accessors then fail
/// with [`AclError::Uninitialized`].
#[derive(Debug)]
pub struct Entry {
    acl: Acl,
    id: RecordId,
}

impl Entry {
    /// Appends a new, blank record to `parent` and returns a view bound to
    /// it. The new record has an undefined tag type, no qualifier, and no
    /// permissions.
    #[must_use]
    pub fn new(parent: &Acl) -> Self {
        let id = parent.state.borrow_mut().repr.create();
        Self {
            acl: parent.alias(),
            id,
        }
    }

    pub(crate) fn from_parts(acl: Acl, id: RecordId) -> Self {
        Self { acl, id }
    }

    /// A second view of the same record, for internal upward references.
    pub(crate) fn alias(&self) -> Self {
        Self {
            acl: self.acl.alias(),
            id: self.id,
        }
    }

    pub(crate) fn record_id(&self) -> RecordId {
        self.id
    }

    pub(crate) fn belongs_to(&self, acl: &Acl) -> bool {
        std::rc::Rc::ptr_eq(&self.acl.state, &acl.state)
    }

    fn read<R>(&self, f: impl FnOnce(&Record) -> R) -> AclResult<R> {
        let state = self.acl.state.borrow();
        state.repr.get(self.id).map(f).ok_or(AclError::Uninitialized)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Record) -> R) -> AclResult<R> {
        let mut state = self.acl.state.borrow_mut();
        state.repr.get_mut(self.id).map(f).ok_or(AclError::Uninitialized)
    }

    pub(crate) fn read_bits(&self) -> AclResult<u8> {
        self.read(|record| record.perms)
    }

    pub(crate) fn update_bits(&self, f: impl FnOnce(u8) -> u8) -> AclResult<()> {
        self.write(|record| record.perms = f(record.perms))
    }

    /// Returns `true` while this view still addresses a live record.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.acl.state.borrow().repr.get(self.id).is_some()
    }

    /// The tag type of this entry.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`] when the record is gone.
    pub fn tag_type(&self) -> AclResult<Tag> {
        self.read(|record| record.tag)
    }

    /// Sets the tag type of this entry.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`] when the record is gone.
    pub fn set_tag_type(&self, tag: Tag) -> AclResult<()> {
        self.write(|record| record.tag = tag)
    }

    /// The numeric qualifier (user or group id) of this entry.
    ///
    /// Meaningful only for named-user and named-group entries.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Backend`] when no qualifier has been set, and
    /// [`AclError::Uninitialized`] when the record is gone.
    pub fn qualifier(&self) -> AclResult<u32> {
        self.read(|record| record.qualifier)?.ok_or_else(|| {
            AclError::backend(
                "read entry qualifier",
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "entry has no qualifier"),
            )
        })
    }

    /// Sets the numeric qualifier of this entry.
    ///
    /// Any id is accepted regardless of the current tag type; validity
    /// checking decides later whether it makes sense.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`] when the record is gone.
    pub fn set_qualifier(&self, id: u32) -> AclResult<()> {
        self.write(|record| record.qualifier = Some(id))
    }

    /// Returns a fresh [`Permset`] view over this entry's permission bits.
    ///
    /// Every call yields a new view object bound to the same underlying
    /// bits: mutations through any of them are observable through all.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`] when the record is gone.
    pub fn permset(&self) -> AclResult<Permset> {
        Permset::new(self)
    }

    /// Copies all permission bits from `permset` into this entry.
    ///
    /// The source permset may belong to an entry of a different ACL.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`] when either record is gone.
    pub fn set_permset(&self, permset: &Permset) -> AclResult<()> {
        let bits = permset.bits()?;
        self.write(|record| record.perms = bits)
    }

    /// The owning ACL of this entry.
    ///
    /// The returned handle aliases the same underlying ACL; it is not a
    /// copy.
    #[must_use]
    pub fn parent(&self) -> Acl {
        self.acl.alias()
    }

    /// Copies tag type, qualifier, and permission bits from `other`,
    /// which may belong to a different ACL.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`] when either record is gone.
    pub fn copy_from(&self, other: &Entry) -> AclResult<()> {
        let (tag, qualifier, perms) =
            other.read(|record| (record.tag, record.qualifier, record.perms))?;
        self.write(|record| {
            record.tag = tag;
            record.qualifier = qualifier;
            record.perms = perms;
        })
    }
}

impl fmt::Display for Entry {
    /// One-line description naming the principal the entry applies to.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok((tag, qualifier)) = self.read(|record| (record.tag, record.qualifier)) else {
            return f.write_str("ACL entry (stale)");
        };
        match (tag, qualifier) {
            (Tag::Undefined, _) => f.write_str("ACL entry for undefined type"),
            (Tag::UserObj, _) => f.write_str("ACL entry for the owner"),
            (Tag::GroupObj, _) => f.write_str("ACL entry for the group"),
            (Tag::Other, _) => f.write_str("ACL entry for the others"),
            (Tag::Mask, _) => f.write_str("ACL entry for the mask"),
            (Tag::User, Some(id)) => write!(f, "ACL entry for user with uid {id}"),
            (Tag::User, None) => f.write_str("ACL entry for user with unset uid"),
            (Tag::Group, Some(id)) => write!(f, "ACL entry for group with gid {id}"),
            (Tag::Group, None) => f.write_str("ACL entry for group with unset gid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_blank() {
        let acl = Acl::new();
        let entry = Entry::new(&acl);

        assert_eq!(entry.tag_type().unwrap(), Tag::Undefined);
        assert!(entry.qualifier().is_err());
        assert_eq!(entry.permset().unwrap().to_string(), "---");
    }

    #[test]
    fn mutations_are_visible_through_the_owning_acl() {
        let acl = Acl::from_text("u::rwx,g::r-x,o::r--").unwrap();
        let entry = acl.entries().nth(1).unwrap();

        entry.set_tag_type(Tag::Group).unwrap();
        entry.set_qualifier(12).unwrap();

        assert!(acl.to_text().unwrap().contains("group:12:r-x"));
    }

    #[test]
    fn two_views_of_one_record_share_state() {
        let acl = Acl::from_text("u::rwx,g::r-x,o::r--").unwrap();
        let first = acl.entries().next().unwrap();
        let second = acl.entries().next().unwrap();

        first.set_qualifier(77).unwrap();
        assert_eq!(second.qualifier().unwrap(), 77);
    }

    #[test]
    fn parent_aliases_the_owning_acl() {
        let acl = Acl::from_text("u::rwx,g::r-x,o::r--").unwrap();
        let entry = acl.entries().next().unwrap();

        let parent = entry.parent();
        entry.set_tag_type(Tag::Mask).unwrap();

        assert!(parent.to_text().unwrap().starts_with("mask::rwx"));
    }

    #[test]
    fn copy_from_works_across_acls() {
        let source = Acl::from_text("u:500:rw-").unwrap();
        let target = Acl::new();
        let src_entry = source.entries().next().unwrap();
        let dst_entry = Entry::new(&target);

        dst_entry.copy_from(&src_entry).unwrap();

        assert_eq!(dst_entry.tag_type().unwrap(), Tag::User);
        assert_eq!(dst_entry.qualifier().unwrap(), 500);
        assert_eq!(dst_entry.permset().unwrap().to_string(), "rw-");
    }

    #[test]
    fn display_names_the_principal() {
        let acl = Acl::from_text("u::rwx,u:500:r--,g:8:r--,m::rwx,o::r--").unwrap();
        let texts: Vec<String> = acl.entries().map(|e| e.to_string()).collect();

        assert_eq!(texts[0], "ACL entry for the owner");
        assert_eq!(texts[1], "ACL entry for user with uid 500");
        assert_eq!(texts[2], "ACL entry for group with gid 8");
        assert_eq!(texts[3], "ACL entry for the mask");
        assert_eq!(texts[4], "ACL entry for the others");
    }

    #[test]
    fn stale_entry_fails_accessors() {
        let acl = Acl::from_text("u::rwx,g::r-x,o::r--").unwrap();
        let entry = acl.entries().next().unwrap();

        acl.delete_entry(&entry).unwrap();

        assert!(!entry.is_live());
        assert!(matches!(entry.tag_type(), Err(AclError::Uninitialized)));
        assert!(matches!(entry.set_qualifier(1), Err(AclError::Uninitialized)));
        assert_eq!(entry.to_string(), "ACL entry (stale)");
    }
}
