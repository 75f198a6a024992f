//! crates/posix1e/src/permset.rs
//!
//! Permission-set views: the read/write/execute bit triplet of one entry.

use std::fmt;

use crate::entry::Entry;
use crate::error::AclResult;
use crate::perm::{Perm, render_bits};

/// The three-bit permission vector of one [`Entry`].
///
/// A `Permset` is a view into its entry's permission bits, holding a strong
/// reference to the entry (and through it the owning ACL). Obtaining the
/// permset of an entry twice yields two distinct view objects bound to the
/// same bits: mutations through either are observable through the other.
///
/// A permset whose entry record has been deleted is stale; its accessors
/// fail with [`AclError::Uninitialized`](crate::AclError::Uninitialized).
#[derive(Debug)]
pub struct Permset {
    entry: Entry,
}

impl Permset {
    /// Binds a new view to `parent`'s current permission bits.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`](crate::AclError::Uninitialized)
    /// when `parent` no longer addresses a live record.
    pub fn new(parent: &Entry) -> AclResult<Self> {
        // Fails early if the record is already gone, like looking up the
        // permset of an invalid entry would.
        parent.tag_type()?;
        Ok(Self {
            entry: parent.alias(),
        })
    }

    pub(crate) fn bits(&self) -> AclResult<u8> {
        self.entry.read_bits()
    }

    /// Whether `perm` is present in the set.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`](crate::AclError::Uninitialized)
    /// when the record is gone.
    pub fn get(&self, perm: Perm) -> AclResult<bool> {
        Ok(self.bits()? & perm.bit() != 0)
    }

    /// Adds `perm` when `value` is `true`, removes it otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`](crate::AclError::Uninitialized)
    /// when the record is gone.
    pub fn set(&self, perm: Perm, value: bool) -> AclResult<()> {
        self.entry.update_bits(|bits| {
            if value {
                bits | perm.bit()
            } else {
                bits & !perm.bit()
            }
        })
    }

    /// Removes all permissions from the set.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Uninitialized`](crate::AclError::Uninitialized)
    /// when the record is gone.
    pub fn clear(&self) -> AclResult<()> {
        self.entry.update_bits(|_| 0)
    }

    /// The entry this permset belongs to.
    #[must_use]
    pub fn parent(&self) -> &Entry {
        &self.entry
    }
}

impl fmt::Display for Permset {
    /// Fixed-order `rwx` triple with `-` for absent bits; a stale view
    /// renders as `???`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bits() {
            Ok(bits) => f.write_str(&render_bits(bits)),
            Err(_) => f.write_str("???"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::Acl;
    use crate::error::AclError;

    fn single_entry_acl() -> Acl {
        Acl::from_text("u::rw-").unwrap()
    }

    #[test]
    fn get_and_set_individual_bits() {
        let acl = single_entry_acl();
        let entry = acl.entries().next().unwrap();
        let perms = entry.permset().unwrap();

        assert!(perms.get(Perm::Read).unwrap());
        assert!(perms.get(Perm::Write).unwrap());
        assert!(!perms.get(Perm::Execute).unwrap());

        perms.set(Perm::Execute, true).unwrap();
        perms.set(Perm::Write, false).unwrap();

        assert_eq!(perms.to_string(), "r-x");
        assert!(acl.to_text().unwrap().starts_with("user::r-x"));
    }

    #[test]
    fn clear_zeroes_all_bits() {
        let acl = single_entry_acl();
        let entry = acl.entries().next().unwrap();
        let perms = entry.permset().unwrap();

        perms.clear().unwrap();

        assert_eq!(perms.to_string(), "---");
        assert!(!perms.get(Perm::Read).unwrap());
    }

    #[test]
    fn two_views_share_the_same_bits() {
        let acl = single_entry_acl();
        let entry = acl.entries().next().unwrap();
        let first = entry.permset().unwrap();
        let second = entry.permset().unwrap();

        first.set(Perm::Execute, true).unwrap();
        assert!(second.get(Perm::Execute).unwrap());

        second.clear().unwrap();
        assert_eq!(first.to_string(), "---");
    }

    #[test]
    fn explicit_constructor_matches_accessor() {
        let acl = single_entry_acl();
        let entry = acl.entries().next().unwrap();
        let perms = Permset::new(&entry).unwrap();

        perms.set(Perm::Execute, true).unwrap();
        assert!(entry.permset().unwrap().get(Perm::Execute).unwrap());
    }

    #[test]
    fn setting_an_already_set_bit_is_idempotent() {
        let acl = single_entry_acl();
        let perms = acl.entries().next().unwrap().permset().unwrap();

        perms.set(Perm::Read, true).unwrap();
        perms.set(Perm::Read, true).unwrap();
        assert_eq!(perms.to_string(), "rw-");

        perms.set(Perm::Execute, false).unwrap();
        assert_eq!(perms.to_string(), "rw-");
    }

    #[test]
    fn stale_permset_fails_and_renders_placeholder() {
        let acl = single_entry_acl();
        let entry = acl.entries().next().unwrap();
        let perms = entry.permset().unwrap();

        acl.delete_entry(&entry).unwrap();

        assert!(matches!(perms.get(Perm::Read), Err(AclError::Uninitialized)));
        assert!(matches!(perms.clear(), Err(AclError::Uninitialized)));
        assert_eq!(perms.to_string(), "???");
    }
}
