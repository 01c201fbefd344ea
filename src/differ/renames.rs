use crate::naming::QualifiedName;
use crate::operation::{RenameColumn, RenameIndex, RenameSequence, RenameTable};

pub const TEMP_NAME_PREFIX: &str = "__mig_tmp__";

/// A rename operation whose source and target can be compared.
pub(crate) trait Rename: Clone {
    type Key: PartialEq;

    fn old_key(&self) -> Self::Key;

    fn new_key(&self) -> Self::Key;

    /// Same source, renamed to `name` instead.
    fn to_name(&self, name: &str) -> Self;

    /// Renamed from `name` to the original target.
    fn from_name(&self, name: &str) -> Self;
}

/// Hands out `__mig_tmp__<n>` names, unique within one diff.
#[derive(Debug, Default)]
pub(crate) struct TempNames {
    next: usize,
}

impl TempNames {
    pub fn next_name(&mut self) -> String {
        let name = format!("{}{}", TEMP_NAME_PREFIX, self.next);
        self.next += 1;
        name
    }
}

/// Redirects any rename whose target is still the source of a later rename
/// through a temporary name, finishing the detour after all direct renames.
pub(crate) fn handle_transitive_renames<R: Rename>(
    renames: Vec<R>,
    temps: &mut TempNames,
) -> Vec<R> {
    let mut direct = Vec::with_capacity(renames.len());
    let mut deferred = Vec::new();

    for (index, rename) in renames.iter().enumerate() {
        let new_key = rename.new_key();
        let collides = renames[index + 1..]
            .iter()
            .any(|later| later.old_key() == new_key);

        if collides {
            let temp = temps.next_name();
            direct.push(rename.to_name(&temp));
            deferred.push(rename.from_name(&temp));
        } else {
            direct.push(rename.clone());
        }
    }

    direct.extend(deferred);
    direct
}

impl Rename for RenameTable {
    type Key = QualifiedName;

    fn old_key(&self) -> QualifiedName {
        self.name.clone()
    }

    fn new_key(&self) -> QualifiedName {
        self.name.renamed(self.new_name.clone())
    }

    fn to_name(&self, name: &str) -> Self {
        RenameTable::new(self.name.clone(), name)
    }

    fn from_name(&self, name: &str) -> Self {
        RenameTable::new(self.name.renamed(name), self.new_name.clone())
    }
}

impl Rename for RenameSequence {
    type Key = QualifiedName;

    fn old_key(&self) -> QualifiedName {
        self.name.clone()
    }

    fn new_key(&self) -> QualifiedName {
        self.name.renamed(self.new_name.clone())
    }

    fn to_name(&self, name: &str) -> Self {
        RenameSequence::new(self.name.clone(), name)
    }

    fn from_name(&self, name: &str) -> Self {
        RenameSequence::new(self.name.renamed(name), self.new_name.clone())
    }
}

impl Rename for RenameColumn {
    type Key = (QualifiedName, String);

    fn old_key(&self) -> Self::Key {
        (self.table.clone(), self.name.clone())
    }

    fn new_key(&self) -> Self::Key {
        (self.table.clone(), self.new_name.clone())
    }

    fn to_name(&self, name: &str) -> Self {
        RenameColumn::new(self.table.clone(), self.name.clone(), name)
    }

    fn from_name(&self, name: &str) -> Self {
        RenameColumn::new(self.table.clone(), name, self.new_name.clone())
    }
}

impl Rename for RenameIndex {
    type Key = (QualifiedName, String);

    fn old_key(&self) -> Self::Key {
        (self.table.clone(), self.name.clone())
    }

    fn new_key(&self) -> Self::Key {
        (self.table.clone(), self.new_name.clone())
    }

    fn to_name(&self, name: &str) -> Self {
        RenameIndex::new(self.table.clone(), self.name.clone(), name)
    }

    fn from_name(&self, name: &str) -> Self {
        RenameIndex::new(self.table.clone(), name, self.new_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Replays renames over a set of live names, failing on any collision.
    fn replay(live: &[&str], renames: &[RenameColumn]) -> Result<HashSet<String>, String> {
        let mut names: HashSet<String> = live.iter().map(|s| s.to_string()).collect();
        for rename in renames {
            if !names.remove(&rename.name) {
                return Err(format!("{} does not exist", rename.name));
            }
            if !names.insert(rename.new_name.clone()) {
                return Err(format!("{} is still in use", rename.new_name));
            }
        }
        Ok(names)
    }

    #[test]
    fn cycle_goes_through_temporary_name() {
        let renames = vec![
            RenameColumn::new("A", "C0", "C1"),
            RenameColumn::new("A", "C1", "C0"),
        ];
        let result = handle_transitive_renames(renames, &mut TempNames::default());

        assert_eq!(
            result,
            vec![
                RenameColumn::new("A", "C0", "__mig_tmp__0"),
                RenameColumn::new("A", "C1", "C0"),
                RenameColumn::new("A", "__mig_tmp__0", "C1"),
            ]
        );
        assert!(replay(&["C0", "C1"], &result).is_ok());
    }

    #[test]
    fn chain_is_made_safe() {
        let renames = vec![
            RenameColumn::new("A", "A", "B"),
            RenameColumn::new("A", "B", "C"),
        ];
        let result = handle_transitive_renames(renames, &mut TempNames::default());

        let names = replay(&["A", "B"], &result).unwrap();
        assert_eq!(names, ["B", "C"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn independent_renames_untouched() {
        let renames = vec![
            RenameColumn::new("A", "X", "Y"),
            RenameColumn::new("B", "Y", "X"),
        ];
        let result = handle_transitive_renames(renames.clone(), &mut TempNames::default());
        assert_eq!(result, renames);
    }

    #[test]
    fn three_way_rotation() {
        let renames = vec![
            RenameColumn::new("T", "A", "B"),
            RenameColumn::new("T", "B", "C"),
            RenameColumn::new("T", "C", "A"),
        ];
        let result = handle_transitive_renames(renames, &mut TempNames::default());

        let names = replay(&["A", "B", "C"], &result).unwrap();
        assert_eq!(names.len(), 3);
        assert!(result.iter().any(|r| r.new_name == "__mig_tmp__0"));
        assert!(result.iter().any(|r| r.new_name == "__mig_tmp__1"));
    }

    #[test]
    fn table_temp_rename_keeps_schema() {
        let renames = vec![
            RenameTable::new(QualifiedName::with_schema("dbo", "T0"), "T1"),
            RenameTable::new(QualifiedName::with_schema("dbo", "T1"), "T0"),
        ];
        let result = handle_transitive_renames(renames, &mut TempNames::default());

        assert_eq!(result[0].name.to_string(), "dbo.T0");
        assert_eq!(result[0].new_name, "__mig_tmp__0");
        assert_eq!(result[1].name.to_string(), "dbo.T1");
        assert_eq!(result[1].new_name, "T0");
        assert_eq!(result[2].name.to_string(), "dbo.__mig_tmp__0");
        assert_eq!(result[2].new_name, "T1");
    }
}
