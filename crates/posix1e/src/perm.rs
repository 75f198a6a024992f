//! crates/posix1e/src/perm.rs
//!
//! Permission bits and the fixed-order `rwx` rendering used throughout the
//! textual grammar.

/// One of the three POSIX.1e permissions.
///
/// The discriminants are the `acl_perm_t` values from the system headers
/// (`ACL_READ`, `ACL_WRITE`, `ACL_EXECUTE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Perm {
    /// Read permission.
    Read = 0x04,
    /// Write permission.
    Write = 0x02,
    /// Execute permission.
    Execute = 0x01,
}

impl Perm {
    /// Returns the raw `acl_perm_t` identifier.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Converts a raw `acl_perm_t` identifier back into a permission.
    #[must_use]
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0x04 => Some(Self::Read),
            0x02 => Some(Self::Write),
            0x01 => Some(Self::Execute),
            _ => None,
        }
    }

    /// The bit this permission occupies in a record's permission byte.
    pub(crate) const fn bit(self) -> u8 {
        self as u8
    }
}

/// All three permission bits set.
pub(crate) const PERM_ALL: u8 = 0x07;

/// Renders a permission byte as the fixed-order `rwx` triple, with `-` for
/// each absent bit.
pub(crate) fn render_bits(bits: u8) -> String {
    let mut out = String::with_capacity(3);
    out.push(if bits & Perm::Read.bit() != 0 { 'r' } else { '-' });
    out.push(if bits & Perm::Write.bit() != 0 { 'w' } else { '-' });
    out.push(if bits & Perm::Execute.bit() != 0 { 'x' } else { '-' });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_match_system_constants() {
        assert_eq!(Perm::Read.as_raw(), 0x04);
        assert_eq!(Perm::Write.as_raw(), 0x02);
        assert_eq!(Perm::Execute.as_raw(), 0x01);
    }

    #[test]
    fn raw_roundtrip() {
        for perm in [Perm::Read, Perm::Write, Perm::Execute] {
            assert_eq!(Perm::from_raw(perm.as_raw()), Some(perm));
        }
        assert_eq!(Perm::from_raw(0x08), None);
        assert_eq!(Perm::from_raw(0), None);
    }

    #[test]
    fn rendering_is_fixed_order() {
        assert_eq!(render_bits(0), "---");
        assert_eq!(render_bits(PERM_ALL), "rwx");
        assert_eq!(render_bits(Perm::Read.bit()), "r--");
        assert_eq!(render_bits(Perm::Write.bit()), "-w-");
        assert_eq!(render_bits(Perm::Execute.bit()), "--x");
        assert_eq!(render_bits(Perm::Read.bit() | Perm::Execute.bit()), "r-x");
    }
}
