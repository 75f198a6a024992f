//! crates/posix1e/src/repr.rs
//!
//! The record store an [`Acl`](crate::Acl) exclusively owns.
//!
//! Each record carries a stable id that is never reused within the same
//! store. Entry and permset views address records by id, so a view whose
//! record was deleted (or whose store was replaced wholesale by a state
//! import) resolves to nothing instead of to freed or recycled memory.

use crate::tag::Tag;

/// Stable identifier of one record within its store.
pub(crate) type RecordId = u64;

/// One ACL record: tag type, optional qualifier, permission bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub(crate) id: RecordId,
    pub(crate) tag: Tag,
    pub(crate) qualifier: Option<u32>,
    pub(crate) perms: u8,
}

/// The ordered record store backing one ACL.
#[derive(Debug, Clone, Default)]
pub(crate) struct AclRepr {
    records: Vec<Record>,
    next_id: RecordId,
}

impl AclRepr {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds a store from parsed or imported record data, in order.
    pub(crate) fn from_parts(parts: impl IntoIterator<Item = (Tag, Option<u32>, u8)>) -> Self {
        let mut repr = Self::new();
        for (tag, qualifier, perms) in parts {
            let id = repr.create();
            let record = repr.get_mut(id).expect("freshly created record");
            record.tag = tag;
            record.qualifier = qualifier;
            record.perms = perms;
        }
        repr
    }

    /// Appends a blank record and returns its id.
    pub(crate) fn create(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(Record {
            id,
            tag: Tag::Undefined,
            qualifier: None,
            perms: 0,
        });
        id
    }

    /// Removes the record with the given id. Returns `false` if no such
    /// record is live.
    pub(crate) fn delete(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Id of the record at `position` in storage order.
    pub(crate) fn id_at(&self, position: usize) -> Option<RecordId> {
        self.records.get(position).map(|record| record.id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_yields_blank_records_with_distinct_ids() {
        let mut repr = AclRepr::new();
        let a = repr.create();
        let b = repr.create();

        assert_ne!(a, b);
        assert_eq!(repr.len(), 2);
        let record = repr.get(a).unwrap();
        assert_eq!(record.tag, Tag::Undefined);
        assert_eq!(record.qualifier, None);
        assert_eq!(record.perms, 0);
    }

    #[test]
    fn delete_removes_only_the_named_record() {
        let mut repr = AclRepr::new();
        let a = repr.create();
        let b = repr.create();

        assert!(repr.delete(a));
        assert!(!repr.delete(a));
        assert_eq!(repr.len(), 1);
        assert!(repr.get(a).is_none());
        assert!(repr.get(b).is_some());
    }

    #[test]
    fn ids_are_not_reused_after_deletion() {
        let mut repr = AclRepr::new();
        let a = repr.create();
        repr.delete(a);
        let b = repr.create();

        assert_ne!(a, b);
    }

    #[test]
    fn storage_order_is_insertion_order() {
        let mut repr = AclRepr::new();
        let a = repr.create();
        let b = repr.create();
        let c = repr.create();
        repr.delete(b);

        assert_eq!(repr.id_at(0), Some(a));
        assert_eq!(repr.id_at(1), Some(c));
        assert_eq!(repr.id_at(2), None);
    }

    #[test]
    fn from_parts_preserves_order_and_content() {
        let repr = AclRepr::from_parts([
            (Tag::UserObj, None, 0x07),
            (Tag::User, Some(500), 0x04),
        ]);

        let records: Vec<_> = repr.iter().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tag, Tag::UserObj);
        assert_eq!(records[1].qualifier, Some(500));
    }
}
