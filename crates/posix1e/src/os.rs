//! crates/posix1e/src/os.rs
//!
//! OS-facing ACL primitives: loading an ACL from a filesystem object,
//! applying one, and deleting a directory's default ACL.
//!
//! With the `native` feature enabled on Linux, macOS, or FreeBSD these calls
//! go through `exacl` (plus one raw libacl call `exacl` does not surface).
//! Everywhere else a stub reports the operation as unsupported, with a
//! one-time warning the first time ACL support is requested.
//!
//! macOS has no default ACLs on directories; default-ACL operations report
//! unsupported there even with the `native` feature on.

use std::path::Path;

#[cfg(unix)]
use std::os::fd::RawFd;

use crate::acl::AclKind;
use crate::error::AclResult;
use crate::repr::AclRepr;

pub(crate) fn read_access(path: &Path) -> AclResult<AclRepr> {
    imp::read_access(path)
}

pub(crate) fn read_default(path: &Path) -> AclResult<AclRepr> {
    imp::read_default(path)
}

#[cfg(unix)]
pub(crate) fn read_fd(fd: RawFd) -> AclResult<AclRepr> {
    imp::read_fd(fd)
}

pub(crate) fn apply_path(path: &Path, kind: AclKind, repr: &AclRepr) -> AclResult<()> {
    imp::apply_path(path, kind, repr)
}

#[cfg(unix)]
pub(crate) fn apply_fd(fd: RawFd, repr: &AclRepr) -> AclResult<()> {
    imp::apply_fd(fd, repr)
}

/// Deletes the default ACL from a directory.
///
/// This removes the default ACL entirely, which is distinct from applying an
/// empty default ACL: afterwards new children inherit permissions from the
/// creation mode alone.
///
/// # Errors
///
/// Returns [`AclError::Backend`](crate::AclError::Backend) when the OS
/// rejects the operation or default ACLs are unsupported on this platform.
pub fn delete_default_acl(path: impl AsRef<Path>) -> AclResult<()> {
    imp::delete_default(path.as_ref())
}

#[cfg(all(
    feature = "native",
    any(target_os = "linux", target_os = "macos", target_os = "freebsd")
))]
mod imp {
    use std::io;
    use std::os::fd::RawFd;
    use std::path::Path;

    use exacl::{AclEntry, AclEntryKind, AclOption, getfacl, setfacl};
    use tracing::debug;

    use crate::acl::AclKind;
    use crate::error::{AclError, AclResult};
    use crate::perm::Perm;
    use crate::repr::AclRepr;
    use crate::tag::Tag;

    fn convert_error(message: String) -> AclError {
        AclError::backend(
            "convert ACL entry",
            io::Error::new(io::ErrorKind::InvalidData, message),
        )
    }

    /// Maps `exacl` entries onto the record store. Deny entries and
    /// platform-specific principals have no POSIX.1e counterpart and are
    /// rejected rather than silently dropped.
    fn from_sys(entries: Vec<AclEntry>) -> AclResult<AclRepr> {
        let mut parts = Vec::with_capacity(entries.len());

        for entry in entries {
            if !entry.allow {
                return Err(convert_error("deny entries have no POSIX.1e equivalent".to_owned()));
            }
            let (tag, qualifier) = match entry.kind {
                AclEntryKind::User if entry.name.is_empty() => (Tag::UserObj, None),
                AclEntryKind::User => (Tag::User, Some(parse_qualifier(&entry.name)?)),
                AclEntryKind::Group if entry.name.is_empty() => (Tag::GroupObj, None),
                AclEntryKind::Group => (Tag::Group, Some(parse_qualifier(&entry.name)?)),
                #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                AclEntryKind::Mask => (Tag::Mask, None),
                #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                AclEntryKind::Other => (Tag::Other, None),
                other => {
                    return Err(convert_error(format!("unsupported entry kind '{other:?}'")));
                }
            };
            let mut bits = 0u8;
            if entry.perms.contains(exacl::Perm::READ) {
                bits |= Perm::Read.bit();
            }
            if entry.perms.contains(exacl::Perm::WRITE) {
                bits |= Perm::Write.bit();
            }
            if entry.perms.contains(exacl::Perm::EXECUTE) {
                bits |= Perm::Execute.bit();
            }
            parts.push((tag, qualifier, bits));
        }

        Ok(AclRepr::from_parts(parts))
    }

    /// Qualifiers come back from `exacl` as strings; only numeric ids are
    /// accepted here, name resolution being out of scope for this crate.
    fn parse_qualifier(name: &str) -> AclResult<u32> {
        name.parse::<u32>()
            .map_err(|_| convert_error(format!("qualifier '{name}' is not a numeric id")))
    }

    fn to_sys(repr: &AclRepr) -> AclResult<Vec<AclEntry>> {
        let mut entries = Vec::with_capacity(repr.len());

        for record in repr.iter() {
            let (kind, name) = match (record.tag, record.qualifier) {
                (Tag::UserObj, _) => (AclEntryKind::User, String::new()),
                (Tag::User, Some(id)) => (AclEntryKind::User, id.to_string()),
                (Tag::GroupObj, _) => (AclEntryKind::Group, String::new()),
                (Tag::Group, Some(id)) => (AclEntryKind::Group, id.to_string()),
                #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                (Tag::Mask, _) => (AclEntryKind::Mask, String::new()),
                #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                (Tag::Other, _) => (AclEntryKind::Other, String::new()),
                #[cfg(target_os = "macos")]
                (Tag::Mask | Tag::Other, _) => {
                    return Err(convert_error(
                        "mask and other entries are not supported on this platform".to_owned(),
                    ));
                }
                (Tag::User | Tag::Group, None) => {
                    return Err(convert_error("named entry has no qualifier".to_owned()));
                }
                (Tag::Undefined, _) => {
                    return Err(convert_error("entry has an undefined tag type".to_owned()));
                }
            };
            let mut perms = exacl::Perm::empty();
            if record.perms & Perm::Read.bit() != 0 {
                perms |= exacl::Perm::READ;
            }
            if record.perms & Perm::Write.bit() != 0 {
                perms |= exacl::Perm::WRITE;
            }
            if record.perms & Perm::Execute.bit() != 0 {
                perms |= exacl::Perm::EXECUTE;
            }
            entries.push(AclEntry {
                kind,
                name,
                perms,
                flags: exacl::Flag::empty(),
                allow: true,
            });
        }

        Ok(entries)
    }

    pub(super) fn read_access(path: &Path) -> AclResult<AclRepr> {
        debug!(path = %path.display(), "reading access ACL");
        let entries =
            getfacl(path, AclOption::empty()).map_err(|e| AclError::backend("read access ACL", e))?;
        // Without options, Linux reports access and default entries
        // together; only the access ones belong here.
        #[cfg(any(target_os = "linux", target_os = "freebsd"))]
        let entries: Vec<AclEntry> = entries
            .into_iter()
            .filter(|entry| !entry.flags.contains(exacl::Flag::DEFAULT))
            .collect();
        from_sys(entries)
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub(super) fn read_default(path: &Path) -> AclResult<AclRepr> {
        debug!(path = %path.display(), "reading default ACL");
        let mut entries = getfacl(path, AclOption::DEFAULT_ACL)
            .map_err(|e| AclError::backend("read default ACL", e))?;
        for entry in &mut entries {
            entry.flags.remove(exacl::Flag::DEFAULT);
        }
        from_sys(entries)
    }

    #[cfg(target_os = "macos")]
    pub(super) fn read_default(_path: &Path) -> AclResult<AclRepr> {
        Err(default_unsupported("read default ACL"))
    }

    #[cfg(target_os = "linux")]
    pub(super) fn read_fd(fd: RawFd) -> AclResult<AclRepr> {
        read_access(&fd_path(fd)?)
    }

    #[cfg(not(target_os = "linux"))]
    pub(super) fn read_fd(_fd: RawFd) -> AclResult<AclRepr> {
        Err(AclError::backend(
            "read ACL from file descriptor",
            io::Error::new(
                io::ErrorKind::Unsupported,
                "descriptor-based ACL access is only available on Linux",
            ),
        ))
    }

    pub(super) fn apply_path(path: &Path, kind: AclKind, repr: &AclRepr) -> AclResult<()> {
        debug!(path = %path.display(), ?kind, "applying ACL");
        let entries = to_sys(repr)?;
        let options = match kind {
            AclKind::Access => AclOption::empty(),
            AclKind::Default => default_option()?,
        };
        setfacl(&[path], &entries, options).map_err(|e| AclError::backend("apply ACL", e))
    }

    #[cfg(target_os = "linux")]
    pub(super) fn apply_fd(fd: RawFd, repr: &AclRepr) -> AclResult<()> {
        apply_path(&fd_path(fd)?, AclKind::Access, repr)
    }

    #[cfg(not(target_os = "linux"))]
    pub(super) fn apply_fd(_fd: RawFd, _repr: &AclRepr) -> AclResult<()> {
        Err(AclError::backend(
            "apply ACL to file descriptor",
            io::Error::new(
                io::ErrorKind::Unsupported,
                "descriptor-based ACL access is only available on Linux",
            ),
        ))
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    fn default_option() -> AclResult<AclOption> {
        Ok(AclOption::DEFAULT_ACL)
    }

    #[cfg(target_os = "macos")]
    fn default_option() -> AclResult<AclOption> {
        Err(default_unsupported("apply default ACL"))
    }

    #[cfg(target_os = "macos")]
    fn default_unsupported(op: &'static str) -> AclError {
        AclError::backend(
            op,
            io::Error::new(
                io::ErrorKind::Unsupported,
                "default ACLs are not supported on this platform",
            ),
        )
    }

    #[cfg(target_os = "linux")]
    fn fd_path(fd: RawFd) -> AclResult<std::path::PathBuf> {
        if fd < 0 {
            return Err(AclError::InvalidArgument(format!("invalid file descriptor {fd}")));
        }
        Ok(std::path::PathBuf::from(format!("/proc/self/fd/{fd}")))
    }

    // `acl_delete_def_file` has no exacl wrapper; call libacl directly, the
    // same library exacl already links.
    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    #[allow(unsafe_code)]
    mod sys {
        use libc::{c_char, c_int};

        unsafe extern "C" {
            pub fn acl_delete_def_file(path_p: *const c_char) -> c_int;
        }
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    #[allow(unsafe_code)]
    pub(super) fn delete_default(path: &Path) -> AclResult<()> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        debug!(path = %path.display(), "deleting default ACL");
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| AclError::backend("delete default ACL", io::Error::from(e)))?;
        // Safety: the pointer remains valid for the duration of the call.
        let result = unsafe { sys::acl_delete_def_file(c_path.as_ptr()) };
        if result == 0 {
            Ok(())
        } else {
            Err(AclError::backend("delete default ACL", io::Error::last_os_error()))
        }
    }

    #[cfg(target_os = "macos")]
    pub(super) fn delete_default(_path: &Path) -> AclResult<()> {
        Err(default_unsupported("delete default ACL"))
    }

}

#[cfg(not(all(
    feature = "native",
    any(target_os = "linux", target_os = "macos", target_os = "freebsd")
)))]
mod imp {
    use std::io;
    use std::path::Path;
    use std::sync::Once;

    use crate::acl::AclKind;
    use crate::error::{AclError, AclResult};
    use crate::repr::AclRepr;

    /// Warns once that OS-backed ACL operations are unavailable; every call
    /// still fails, the warning just avoids repeating itself.
    fn warn_unsupported() {
        static WARN_ONCE: Once = Once::new();
        WARN_ONCE.call_once(|| {
            tracing::warn!(
                "OS-backed ACL operations are unavailable; \
                 enable the `native` feature on a supported platform"
            );
        });
    }

    fn unsupported(op: &'static str) -> AclError {
        warn_unsupported();
        AclError::backend(
            op,
            io::Error::new(
                io::ErrorKind::Unsupported,
                "ACL support is not compiled in or not available on this platform",
            ),
        )
    }

    pub(super) fn read_access(_path: &Path) -> AclResult<AclRepr> {
        Err(unsupported("read access ACL"))
    }

    pub(super) fn read_default(_path: &Path) -> AclResult<AclRepr> {
        Err(unsupported("read default ACL"))
    }

    #[cfg(unix)]
    pub(super) fn read_fd(_fd: std::os::fd::RawFd) -> AclResult<AclRepr> {
        Err(unsupported("read ACL from file descriptor"))
    }

    pub(super) fn apply_path(_path: &Path, _kind: AclKind, _repr: &AclRepr) -> AclResult<()> {
        Err(unsupported("apply ACL"))
    }

    #[cfg(unix)]
    pub(super) fn apply_fd(_fd: std::os::fd::RawFd, _repr: &AclRepr) -> AclResult<()> {
        Err(unsupported("apply ACL to file descriptor"))
    }

    pub(super) fn delete_default(_path: &Path) -> AclResult<()> {
        Err(unsupported("delete default ACL"))
    }
}
