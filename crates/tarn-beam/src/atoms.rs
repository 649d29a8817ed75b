//! Atom interning.
//!
//! Atoms get 1-based integer identities in strict first-use order; identities
//! are dense and never reassigned. The emitted atom chunk follows identity
//! order, which is why the table is backed by an insertion-ordered set.

use indexmap::IndexSet;

/// Identity of an interned atom (1-based, dense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(u32);

impl AtomId {
    /// Raw 1-based value, as written into table entries and operands.
    pub const fn get(self) -> u32 {
        self.0
    }

    pub(crate) const fn from_raw(v: u32) -> Self {
        Self(v)
    }
}

/// The atom table.
///
/// Interning is total and idempotent: identical sequences of intern calls
/// always yield identical identity assignments, and re-interning an existing
/// name returns its identity with no side effect. There is no removal.
#[derive(Debug, Clone, Default)]
pub struct AtomTable {
    names: IndexSet<String>,
}

impl AtomTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning its identity.
    pub fn intern(&mut self, name: &str) -> AtomId {
        if let Some(ix) = self.names.get_index_of(name) {
            return AtomId(ix as u32 + 1);
        }
        let (ix, _) = self.names.insert_full(name.to_owned());
        AtomId(ix as u32 + 1)
    }

    /// Look up an existing identity without interning.
    pub fn lookup(&self, name: &str) -> Option<AtomId> {
        self.names.get_index_of(name).map(|ix| AtomId(ix as u32 + 1))
    }

    /// Name of a previously issued identity.
    pub fn resolve(&self, id: AtomId) -> Option<&str> {
        id.0
            .checked_sub(1)
            .and_then(|ix| self.names.get_index(ix as usize))
            .map(String::as_str)
    }

    /// Whether `id` was issued by this table.
    pub fn contains(&self, id: AtomId) -> bool {
        id.0 >= 1 && (id.0 as usize) <= self.names.len()
    }

    /// Number of interned atoms.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_use_order_with_dedup() {
        let mut table = AtomTable::new();
        let foo = table.intern("foo");
        let bar = table.intern("bar");
        let again = table.intern("foo");

        assert_eq!(foo.get(), 1);
        assert_eq!(bar.get(), 2);
        assert_eq!(again, foo);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn lookup_and_resolve() {
        let mut table = AtomTable::new();
        let id = table.intern("module");
        assert_eq!(table.lookup("module"), Some(id));
        assert_eq!(table.lookup("missing"), None);
        assert_eq!(table.resolve(id), Some("module"));
        assert_eq!(table.resolve(AtomId::from_raw(0)), None);
        assert_eq!(table.resolve(AtomId::from_raw(2)), None);
    }

    #[test]
    fn contains_tracks_issued_range() {
        let mut table = AtomTable::new();
        assert!(!table.contains(AtomId::from_raw(1)));
        table.intern("a");
        assert!(table.contains(AtomId::from_raw(1)));
        assert!(!table.contains(AtomId::from_raw(0)));
        assert!(!table.contains(AtomId::from_raw(2)));
    }

    #[test]
    fn iter_follows_identity_order() {
        let mut table = AtomTable::new();
        table.intern("zeta");
        table.intern("alpha");
        table.intern("zeta");
        let names: Vec<&str> = table.iter().collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    proptest! {
        #[test]
        fn identities_are_dense_and_stable(names in proptest::collection::vec("[a-z]{1,8}", 1..24)) {
            let mut table = AtomTable::new();
            let first: Vec<AtomId> = names.iter().map(|n| table.intern(n)).collect();
            let second: Vec<AtomId> = names.iter().map(|n| table.intern(n)).collect();
            prop_assert_eq!(&first, &second);

            let mut ids: Vec<u32> = first.iter().map(|id| id.get()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids, (1..=table.len() as u32).collect::<Vec<_>>());
        }
    }
}
