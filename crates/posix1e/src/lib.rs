//! crates/posix1e/src/lib.rs
//!
//! POSIX.1e access control lists as a safe object graph.
//!
//! # Overview
//!
//! An [`Acl`] is an ordered set of entries, each granting read, write, and
//! execute permissions to one principal: the owner, the owning group, the
//! others, a named user or group, or the mask that caps the named entries.
//! ACLs can be built entry by entry, parsed from the short text form
//! (`u::rwx,g:12:r-x,o::---`), loaded from a file or directory, applied back
//! to the filesystem, and snapshotted into an opaque byte buffer.
//!
//! # Design
//!
//! [`Entry`] and [`Permset`] are views, not values. Each holds a strong
//! reference upward: a permset keeps its entry alive and an entry keeps its
//! ACL alive, so a view never outlives the object graph it points into.
//! Mutation through any view is immediately visible through every other view
//! of the same record, and through the ACL itself. Because the graph sits
//! behind shared interior mutability, the whole API takes `&self`; none of
//! the types are `Sync` or `Send`.
//!
//! Deleting an entry (or replacing an ACL's state via
//! [`Acl::import_state`]) does not invalidate outstanding views at the type
//! level; they become *stale* and their accessors return
//! [`AclError::Uninitialized`] from then on.
//!
//! Iteration follows the POSIX.1e single-cursor model: the cursor lives in
//! the ACL, [`Acl::entries`] rewinds it, and every iterator obtained from
//! the same ACL advances that one cursor.
//!
//! # Validity
//!
//! [`Acl::is_valid`] checks the structural rules: exactly one owner, owning
//! group, and other entry; qualifiers present on (and unique among) named
//! entries; a mask entry required when named entries exist and never
//! duplicated. The check is a bare boolean, matching the single failure
//! indicator of the underlying primitive.
//!
//! # Errors
//!
//! Fallible operations return [`AclResult`]. [`AclError::InvalidArgument`]
//! flags misuse the type system cannot rule out, [`AclError::Backend`] wraps
//! OS and parsing failures with the failed operation named, and
//! [`AclError::Uninitialized`] marks access through a stale view.
//!
//! # Native backend
//!
//! Filesystem operations ([`Acl::from_file`], [`Acl::apply_to`],
//! [`delete_default_acl`], ...) need the `native` cargo feature and a
//! platform with POSIX.1e support (Linux, macOS, FreeBSD). Without it they
//! fail with an [`AclError::Backend`] carrying
//! [`std::io::ErrorKind::Unsupported`]; everything in-memory keeps working.
//!
//! # Examples
//!
//! ```
//! use posix1e::{Acl, Perm, Tag};
//!
//! let acl = Acl::from_text("u::rw-,g::r--,o::---")?;
//! assert!(acl.is_valid());
//!
//! for entry in acl.entries() {
//!     if entry.tag_type()? == Tag::UserObj {
//!         entry.permset()?.set(Perm::Execute, true)?;
//!     }
//! }
//!
//! assert_eq!(acl.to_text()?, "user::rwx\ngroup::r--\nother::---\n");
//! # Ok::<(), posix1e::AclError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod acl;
mod entry;
mod error;
mod os;
mod perm;
mod permset;
mod repr;
mod state;
mod tag;
mod text;
mod validity;

pub use acl::{Acl, AclKind, AclSource, ApplyTarget, Entries};
pub use entry::Entry;
pub use error::{AclError, AclResult};
pub use os::delete_default_acl;
pub use perm::Perm;
pub use permset::Permset;
pub use tag::Tag;
