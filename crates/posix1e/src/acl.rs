//! crates/posix1e/src/acl.rs
//!
//! The ACL root object: exclusive owner of the backing record store, holder
//! of the single iteration cursor, and entry point for text rendering,
//! validity checking, application to filesystem objects, and opaque state
//! export/import.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[cfg(unix)]
use std::os::fd::{AsRawFd, RawFd};

use crate::entry::Entry;
use crate::error::{AclError, AclResult};
use crate::os;
use crate::repr::AclRepr;
use crate::{state, text, validity};

/// Which of a filesystem object's two ACLs an operation targets.
///
/// The discriminants are the `acl_type_t` values from the system headers
/// (`ACL_TYPE_ACCESS`, `ACL_TYPE_DEFAULT`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum AclKind {
    /// The ACL enforced on the object itself.
    #[default]
    Access = 0x8000,
    /// The ACL new children of a directory inherit.
    Default = 0x4000,
}

impl AclKind {
    /// Returns the raw `acl_type_t` identifier.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Converts a raw `acl_type_t` identifier back into a kind.
    #[must_use]
    pub const fn from_raw(value: i32) -> Option<Self> {
        match value {
            0x8000 => Some(Self::Access),
            0x4000 => Some(Self::Default),
            _ => None,
        }
    }
}

/// Shared mutable state behind one ACL: the record store plus the iteration
/// cursor. Entry and permset views keep this alive through their own handles.
#[derive(Debug)]
pub(crate) struct AclState {
    pub(crate) repr: AclRepr,
    cursor: usize,
}

/// An ordered set of permission entries for one filesystem object.
///
/// An `Acl` exclusively owns its backing record store. [`Entry`] and
/// [`Permset`](crate::Permset) values are views into that store, holding
/// strong upward references that keep it alive; mutating a view mutates the
/// ACL in place. Because the store sits behind shared interior mutability,
/// all operations take `&self`.
///
/// `Acl` is deliberately not `Clone`: [`Acl::duplicate`] makes an
/// independent deep copy, while [`Entry::parent`] returns an aliasing handle
/// to the same underlying ACL.
#[derive(Debug)]
pub struct Acl {
    pub(crate) state: Rc<RefCell<AclState>>,
}

impl Acl {
    /// Creates an empty ACL.
    ///
    /// An empty ACL fails [`Acl::is_valid`] until the three base entries are
    /// added.
    #[must_use]
    pub fn new() -> Self {
        Self::from_repr(AclRepr::new())
    }

    pub(crate) fn from_repr(repr: AclRepr) -> Self {
        Self {
            state: Rc::new(RefCell::new(AclState { repr, cursor: 0 })),
        }
    }

    /// A second handle to the same underlying ACL state.
    pub(crate) fn alias(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }

    /// Parses an ACL from its textual description.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Backend`] when the text does not follow the
    /// `<kind>:[<qualifier>]:<rwx>` grammar.
    pub fn from_text(text: &str) -> AclResult<Self> {
        text::parse(text).map(Self::from_repr)
    }

    /// Loads the access ACL of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Backend`] when the OS cannot produce the ACL
    /// (missing file, unsupported filesystem, or OS support compiled out).
    pub fn from_file(path: impl AsRef<Path>) -> AclResult<Self> {
        os::read_access(path.as_ref()).map(Self::from_repr)
    }

    /// Loads the default ACL of the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Backend`] on OS failure.
    pub fn default_of(path: impl AsRef<Path>) -> AclResult<Self> {
        os::read_default(path.as_ref()).map(Self::from_repr)
    }

    /// Loads the access ACL of an open file descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Backend`] on OS failure.
    #[cfg(unix)]
    pub fn from_fd(fd: RawFd) -> AclResult<Self> {
        os::read_fd(fd).map(Self::from_repr)
    }

    /// Creates an independent deep copy of this ACL.
    ///
    /// The copy has its own record store and cursor; entries of the original
    /// do not observe mutations of the copy, or vice versa.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self::from_repr(self.state.borrow().repr.clone())
    }

    /// Renders every entry as canonical text, one line per entry, in the
    /// order the backend stores them.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Backend`] when an entry cannot be expressed in
    /// the grammar (undefined tag type, named entry without a qualifier).
    pub fn to_text(&self) -> AclResult<String> {
        text::render(&self.state.borrow().repr)
    }

    /// Tests the ACL for structural validity.
    ///
    /// Returns a bare boolean: the underlying validity primitive reports
    /// only a single failure indicator, so classes of invalidity cannot be
    /// distinguished. See [`crate`] docs for the rules.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        validity::check(&self.state.borrow().repr)
    }

    /// Applies this ACL to a filesystem object.
    ///
    /// `target` may be a path or (on Unix) an open file descriptor or
    /// [`std::fs::File`]. `kind` selects the access or default ACL; the
    /// default ACL can only be applied to a directory path.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::InvalidArgument`] for a default-ACL apply aimed
    /// at a file descriptor, and [`AclError::Backend`] when the OS rejects
    /// the operation (invalid ACL, insufficient permission, unsupported
    /// filesystem).
    pub fn apply_to<'a>(&self, target: impl Into<ApplyTarget<'a>>, kind: AclKind) -> AclResult<()> {
        let repr = self.state.borrow().repr.clone();
        match target.into() {
            ApplyTarget::Path(path) => os::apply_path(path, kind, &repr),
            #[cfg(unix)]
            ApplyTarget::Fd(fd) => {
                if kind == AclKind::Default {
                    return Err(AclError::InvalidArgument(
                        "a default ACL can only be applied to a directory path".to_owned(),
                    ));
                }
                os::apply_fd(fd, &repr)
            }
        }
    }

    /// Starts a traversal over the entries of this ACL.
    ///
    /// The traversal is destructive in the POSIX.1e sense: the cursor lives
    /// in the ACL itself, not in the returned iterator. Calling `entries`
    /// again (even while a previous iterator is still alive) resets the
    /// shared cursor to the first entry; two iterators obtained from the
    /// same ACL advance the same cursor. Entries are yielded in backend
    /// storage order. Deleting entries mid-traversal leaves the remainder of
    /// that traversal unspecified.
    pub fn entries(&self) -> Entries {
        self.state.borrow_mut().cursor = 0;
        Entries { acl: self.alias() }
    }

    /// Appends a new, blank entry to this ACL and returns a view of it.
    ///
    /// Equivalent to [`Entry::new`].
    pub fn create_entry(&self) -> Entry {
        Entry::new(self)
    }

    /// Removes `entry`'s record from this ACL.
    ///
    /// After success the passed view (and any permset obtained from it) is
    /// stale: further accessors fail with [`AclError::Uninitialized`].
    ///
    /// # Errors
    ///
    /// Returns [`AclError::InvalidArgument`] when `entry` belongs to a
    /// different ACL, and [`AclError::Uninitialized`] when its record was
    /// already removed.
    pub fn delete_entry(&self, entry: &Entry) -> AclResult<()> {
        if !entry.belongs_to(self) {
            return Err(AclError::InvalidArgument(
                "entry does not belong to this ACL".to_owned(),
            ));
        }
        if self.state.borrow_mut().repr.delete(entry.record_id()) {
            Ok(())
        } else {
            Err(AclError::Uninitialized)
        }
    }

    /// Captures the full internal representation as an opaque byte buffer.
    ///
    /// The buffer has no cross-version or cross-platform stability
    /// guarantee; the only contract is that [`Acl::import_state`] restores
    /// an ACL with identical text rendering. The buffer is sized via the
    /// store's size query before the copy-out, so its length is exact.
    #[must_use]
    pub fn export_state(&self) -> Vec<u8> {
        let state = self.state.borrow();
        state::export(&state.repr)
    }

    /// Replaces this ACL's record store with one reconstructed from an
    /// exported buffer.
    ///
    /// The previous store is released first; entry views created before the
    /// import become stale. The iteration cursor is reset.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Backend`] when the buffer is not a valid
    /// exported state.
    pub fn import_state(&self, data: &[u8]) -> AclResult<()> {
        let repr = state::import(data).map_err(|e| AclError::backend("import ACL state", e))?;
        let mut state = self.state.borrow_mut();
        state.repr = repr;
        state.cursor = 0;
        Ok(())
    }
}

impl Default for Acl {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Acl {
    /// Renders the ACL as its canonical text; entries that cannot be
    /// rendered produce a bracketed placeholder instead of failing the
    /// formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("<unrepresentable ACL>"),
        }
    }
}

/// The filesystem object an [`Acl::apply_to`] call targets.
#[derive(Debug, Clone, Copy)]
pub enum ApplyTarget<'a> {
    /// A filesystem path.
    Path(&'a Path),
    /// An open file descriptor.
    #[cfg(unix)]
    Fd(RawFd),
}

impl<'a> From<&'a Path> for ApplyTarget<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a str> for ApplyTarget<'a> {
    fn from(path: &'a str) -> Self {
        Self::Path(Path::new(path))
    }
}

#[cfg(unix)]
impl From<RawFd> for ApplyTarget<'_> {
    fn from(fd: RawFd) -> Self {
        Self::Fd(fd)
    }
}

#[cfg(unix)]
impl<'a> From<&'a std::fs::File> for ApplyTarget<'a> {
    fn from(file: &'a std::fs::File) -> Self {
        Self::Fd(file.as_raw_fd())
    }
}

/// The mutually-exclusive parameter set for constructing an [`Acl`].
///
/// At most one source may be supplied; [`AclSource::load`] with no source
/// yields an empty ACL. This mirrors the construction surface of the
/// underlying ACL library: file, file descriptor, text, existing ACL, or a
/// directory's default ACL.
///
/// ```
/// use posix1e::AclSource;
///
/// let acl = AclSource::new().text("u::rwx,g::r-x,o::r--").load()?;
/// assert!(acl.is_valid());
/// # Ok::<(), posix1e::AclError>(())
/// ```
#[derive(Debug, Default)]
pub struct AclSource {
    file: Option<PathBuf>,
    #[cfg(unix)]
    fd: Option<RawFd>,
    text: Option<String>,
    acl: Option<AclRepr>,
    default_dir: Option<PathBuf>,
}

impl AclSource {
    /// Creates a selector with no source set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the access ACL of the file at `path`.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Load the access ACL of an open file descriptor.
    #[cfg(unix)]
    #[must_use]
    pub fn fd(mut self, fd: RawFd) -> Self {
        self.fd = Some(fd);
        self
    }

    /// Parse the ACL from a textual description.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Duplicate an existing in-memory ACL.
    #[must_use]
    pub fn acl(mut self, source: &Acl) -> Self {
        self.acl = Some(source.state.borrow().repr.clone());
        self
    }

    /// Load the default ACL of the directory at `path`.
    #[must_use]
    pub fn default_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_dir = Some(path.into());
        self
    }

    /// Constructs the ACL from the selected source.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::InvalidArgument`] when more than one source was
    /// supplied, and [`AclError::Backend`] when the selected source cannot
    /// produce an ACL.
    pub fn load(self) -> AclResult<Acl> {
        let mut supplied = [
            self.file.is_some(),
            self.text.is_some(),
            self.acl.is_some(),
            self.default_dir.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count();
        #[cfg(unix)]
        {
            supplied += usize::from(self.fd.is_some());
        }
        if supplied > 1 {
            return Err(AclError::InvalidArgument(
                "at most one ACL source may be supplied".to_owned(),
            ));
        }

        if let Some(path) = self.file {
            return Acl::from_file(path);
        }
        if let Some(text) = self.text {
            return Acl::from_text(&text);
        }
        if let Some(repr) = self.acl {
            return Ok(Acl::from_repr(repr));
        }
        if let Some(path) = self.default_dir {
            return Acl::default_of(path);
        }
        #[cfg(unix)]
        if let Some(fd) = self.fd {
            return Acl::from_fd(fd);
        }
        Ok(Acl::new())
    }
}

/// A traversal over an ACL's entries, advancing the cursor owned by the ACL.
///
/// Obtained from [`Acl::entries`]; see there for the single-cursor contract.
#[derive(Debug)]
pub struct Entries {
    acl: Acl,
}

impl Iterator for Entries {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let id = {
            let mut state = self.acl.state.borrow_mut();
            let id = state.repr.id_at(state.cursor)?;
            state.cursor += 1;
            id
        };
        Some(Entry::from_parts(self.acl.alias(), id))
    }
}
