//! crates/posix1e/src/tag.rs
//!
//! Entry tag types and their stable integer identifiers.

use std::fmt;

/// Classification of an ACL entry.
///
/// The discriminants are the POSIX.1e `acl_tag_t` values exported by the
/// system headers, so they are stable across the API and can be exchanged
/// with code that works on the raw constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Tag {
    /// No tag type has been assigned yet.
    #[default]
    Undefined = 0x00,
    /// The owner of the filesystem object.
    UserObj = 0x01,
    /// A named user; the qualifier carries the user id.
    User = 0x02,
    /// The owning group of the filesystem object.
    GroupObj = 0x04,
    /// A named group; the qualifier carries the group id.
    Group = 0x08,
    /// The mask capping the effective rights of all named entries.
    Mask = 0x10,
    /// Everyone not covered by another entry.
    Other = 0x20,
}

impl Tag {
    /// Returns the raw `acl_tag_t` identifier.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Converts a raw `acl_tag_t` identifier back into a tag type.
    ///
    /// Returns `None` when the value is not one of the recognised tags.
    #[must_use]
    pub const fn from_raw(value: i32) -> Option<Self> {
        match value {
            0x00 => Some(Self::Undefined),
            0x01 => Some(Self::UserObj),
            0x02 => Some(Self::User),
            0x04 => Some(Self::GroupObj),
            0x08 => Some(Self::Group),
            0x10 => Some(Self::Mask),
            0x20 => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns `true` for the tag types that take a qualifier.
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Self::User | Self::Group)
    }

    /// The keyword used for this tag in the textual ACL grammar.
    ///
    /// Owner and named-user entries share the `user` keyword; the presence of
    /// a qualifier distinguishes them, not the keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::UserObj | Self::User => "user",
            Self::GroupObj | Self::Group => "group",
            Self::Mask => "mask",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
