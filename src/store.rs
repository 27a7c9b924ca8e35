use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::schemas::{Expense, Group};

/// Groups live in memory only and are gone once the process exits.
#[derive(Default)]
pub struct GroupStore {
    groups: RwLock<HashMap<String, Group>>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ApiResult<RwLockReadGuard<'_, HashMap<String, Group>>> {
        self.groups
            .read()
            .map_err(|_| ApiError::Internal("group store lock poisoned".to_string()))
    }

    fn write(&self) -> ApiResult<RwLockWriteGuard<'_, HashMap<String, Group>>> {
        self.groups
            .write()
            .map_err(|_| ApiError::Internal("group store lock poisoned".to_string()))
    }

    pub fn insert(&self, group: Group) -> ApiResult<()> {
        let mut groups = self.write()?;
        if groups.contains_key(&group.id) {
            return Err(ApiError::GroupExists(group.id));
        }
        info!(group = %group.id, members = group.members.len(), "group created");
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    /// A copy of the group, so balances are computed outside the lock.
    pub fn snapshot(&self, id: &str) -> ApiResult<Group> {
        self.read()?
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::GroupNotFound(id.to_string()))
    }

    pub fn list(&self) -> ApiResult<Vec<Group>> {
        let mut groups: Vec<Group> = self.read()?.values().cloned().collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(groups)
    }

    /// Appends an expense built from the current member list. `build` runs
    /// under the write lock so validation sees the same members the expense
    /// is stored against.
    pub fn add_expense<F>(&self, id: &str, build: F) -> ApiResult<Expense>
    where
        F: FnOnce(&Group) -> ApiResult<Expense>,
    {
        let mut groups = self.write()?;
        let group = groups
            .get_mut(id)
            .ok_or_else(|| ApiError::GroupNotFound(id.to_string()))?;
        let expense = build(group)?;
        group.expenses.push(expense.clone());
        info!(group = %id, payer = %expense.payer, amount = expense.amount, "expense added");
        Ok(expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str) -> Group {
        Group {
            id: id.to_string(),
            name: "Trip".to_string(),
            members: vec!["Alice".to_string(), "Bob".to_string()],
            expenses: vec![],
        }
    }

    #[test]
    fn insert_then_snapshot() {
        let store = GroupStore::new();
        store.insert(group("trip")).unwrap();

        assert_eq!(store.snapshot("trip").unwrap(), group("trip"));
        assert!(matches!(
            store.snapshot("other"),
            Err(ApiError::GroupNotFound(id)) if id == "other"
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let store = GroupStore::new();
        store.insert(group("trip")).unwrap();

        assert!(matches!(
            store.insert(group("trip")),
            Err(ApiError::GroupExists(_))
        ));
    }

    #[test]
    fn expenses_keep_insertion_order() {
        let store = GroupStore::new();
        store.insert(group("trip")).unwrap();

        store
            .add_expense("trip", |_| Ok(Expense::new("Alice", 1.0, "first")))
            .unwrap();
        store
            .add_expense("trip", |_| Ok(Expense::new("Bob", 2.0, "second")))
            .unwrap();

        let notes: Vec<String> = store
            .snapshot("trip")
            .unwrap()
            .expenses
            .into_iter()
            .map(|e| e.note)
            .collect();
        assert_eq!(notes, vec!["first", "second"]);
    }

    #[test]
    fn failed_build_leaves_group_untouched() {
        let store = GroupStore::new();
        store.insert(group("trip")).unwrap();

        let result = store.add_expense("trip", |_| Err(ApiError::Internal("nope".into())));

        assert!(result.is_err());
        assert!(store.snapshot("trip").unwrap().expenses.is_empty());
    }

    #[test]
    fn list_is_sorted_by_id() {
        let store = GroupStore::new();
        store.insert(group("b")).unwrap();
        store.insert(group("a")).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
