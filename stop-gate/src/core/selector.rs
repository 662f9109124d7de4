//! Backlog selection rule.

use crate::core::types::BacklogItem;

/// Return the first item whose status is `TODO`, in stored order.
///
/// First match, not best match: no priority or dependency resolution.
pub fn first_todo(items: &[BacklogItem]) -> Option<&BacklogItem> {
    items.iter().find(|item| item.is_todo())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ItemStatus;

    fn item(id: &str, status: ItemStatus) -> BacklogItem {
        BacklogItem {
            id: id.to_string(),
            title: format!("{id} title"),
            status,
        }
    }

    #[test]
    fn picks_first_todo_in_stored_order() {
        let items = vec![
            item("S1", ItemStatus::Done),
            item("S3", ItemStatus::Todo),
            item("S2", ItemStatus::Todo),
        ];
        assert_eq!(first_todo(&items).map(|i| i.id.as_str()), Some("S3"));
    }

    #[test]
    fn none_when_everything_is_done_or_unknown() {
        let items = vec![
            item("S1", ItemStatus::Done),
            item("S2", ItemStatus::Other("BLOCKED".to_string())),
        ];
        assert!(first_todo(&items).is_none());
        assert!(first_todo(&[]).is_none());
    }
}
