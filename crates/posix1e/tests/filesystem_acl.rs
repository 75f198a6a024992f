//! Integration tests for the filesystem-facing operations.
//!
//! The OS-backed tests only run with the `native` feature on Linux, and they
//! tolerate filesystems that do not support POSIX.1e ACLs (the temp dir may
//! sit on tmpfs without ACL support in some environments). The stub tests
//! assert the documented failure mode when the feature is off.

use posix1e::{Acl, AclError, AclKind};

/// Whether `err` means the filesystem or platform cannot do ACLs at all.
#[cfg(all(feature = "native", target_os = "linux"))]
fn acl_unsupported(err: &AclError) -> bool {
    matches!(err.os_error(), Some(code) if code == libc::ENOTSUP || code == libc::EINVAL)
}

#[cfg(all(feature = "native", target_os = "linux"))]
mod native_linux {
    use super::*;
    use posix1e::{AclSource, delete_default_acl};
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn plain_file_yields_a_valid_base_acl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain");
        File::create(&path).unwrap();

        match Acl::from_file(&path) {
            Ok(acl) => {
                assert!(acl.is_valid());
                assert_eq!(acl.entries().count(), 3);
            }
            Err(err) => assert!(acl_unsupported(&err), "unexpected error: {err}"),
        }
    }

    #[test]
    fn applied_access_acl_reads_back_identically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("target");
        File::create(&path).unwrap();

        let acl = Acl::from_text("u::rw-,u:0:r--,g::r--,m::r--,o::---").unwrap();
        match acl.apply_to(path.as_path(), AclKind::Access) {
            Ok(()) => {
                let read_back = Acl::from_file(&path).unwrap();
                assert_eq!(read_back.to_text().unwrap(), acl.to_text().unwrap());
            }
            Err(err) => assert!(acl_unsupported(&err), "unexpected error: {err}"),
        }
    }

    #[test]
    fn file_descriptor_targets_work_for_access_acls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("by-fd");
        let file = File::create(&path).unwrap();

        let acl = Acl::from_text("u::rw-,g::---,o::---").unwrap();
        match acl.apply_to(&file, AclKind::Access) {
            Ok(()) => {
                let read_back = AclSource::new().file(&path).load().unwrap();
                assert!(read_back.to_text().unwrap().starts_with("user::rw-"));
            }
            Err(err) => assert!(acl_unsupported(&err), "unexpected error: {err}"),
        }
    }

    #[test]
    fn default_acl_round_trips_and_can_be_deleted() {
        let dir = tempdir().unwrap();
        let acl = Acl::from_text("u::rwx,g::r-x,o::r-x").unwrap();

        match acl.apply_to(dir.path(), AclKind::Default) {
            Ok(()) => {
                let read_back = Acl::default_of(dir.path()).unwrap();
                assert_eq!(read_back.entries().count(), 3);

                delete_default_acl(dir.path()).unwrap();
                assert_eq!(Acl::default_of(dir.path()).unwrap().entries().count(), 0);
            }
            Err(err) => assert!(acl_unsupported(&err), "unexpected error: {err}"),
        }
    }

    #[test]
    fn missing_files_surface_the_os_error() {
        let dir = tempdir().unwrap();
        let err = Acl::from_file(dir.path().join("nonexistent")).unwrap_err();

        assert!(matches!(err, AclError::Backend { .. }));
        assert_eq!(err.os_error(), Some(libc::ENOENT));
    }
}

#[cfg(not(feature = "native"))]
mod stub {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn filesystem_operations_report_unsupported() {
        let err = Acl::from_file("/tmp/anything").unwrap_err();
        assert!(matches!(
            &err,
            AclError::Backend { source, .. } if source.kind() == ErrorKind::Unsupported
        ));

        let acl = Acl::from_text("u::rwx,g::r-x,o::r--").unwrap();
        let err = acl.apply_to("/tmp/anything", AclKind::Access).unwrap_err();
        assert!(matches!(
            &err,
            AclError::Backend { source, .. } if source.kind() == ErrorKind::Unsupported
        ));
    }

    #[test]
    fn in_memory_operations_keep_working() {
        let acl = Acl::from_text("u::rwx,g::r-x,o::r--").unwrap();
        assert!(acl.is_valid());

        let restored = Acl::new();
        restored.import_state(&acl.export_state()).unwrap();
        assert_eq!(restored.to_text().unwrap(), acl.to_text().unwrap());
    }
}
