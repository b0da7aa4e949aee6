//! In-process `MapStore` for local runs (`--store memory`) and tests.
//!
//! Mirrors the Postgres store's observable behavior: ids start at 1 and
//! increase, listing is ordered by id, and name lookups use `ILIKE`
//! semantics (`%` and `_` wildcards, `\` escape, ASCII case folding).

use crate::{
    models::map_record::{MapPayloadUpdate, MapRecord, NewMapRecord},
    services::map_store::{MapStore, StoreResult, expect_single},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryMapStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, MapRecord>,
}

impl MemoryMapStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MapStore for MemoryMapStore {
    async fn list(&self) -> StoreResult<Vec<MapRecord>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<MapRecord> {
        let inner = self.inner.read().await;
        expect_single(inner.rows.get(&id).cloned().into_iter().collect())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<MapRecord> {
        let pattern = format!("%{}%", name);
        let inner = self.inner.read().await;
        let matches = inner
            .rows
            .values()
            .filter(|row| ilike(&row.name, &pattern))
            .take(2)
            .cloned()
            .collect();
        expect_single(matches)
    }

    async fn insert(&self, record: NewMapRecord) -> StoreResult<MapRecord> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let row = MapRecord {
            id: inner.next_id,
            name: record.name,
            description: record.description,
            map: record.map,
            uri: record.uri,
            creator: record.creator,
            object_id: record.object_id,
            created_at: Utc::now(),
        };
        inner.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_payload(&self, id: i64, update: MapPayloadUpdate) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(map) = update.map {
            row.map = map;
        }
        if let Some(uri) = update.uri {
            row.uri = uri;
        }
        Ok(1)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Case-insensitive SQL `LIKE` match of `text` against `pattern`.
fn ilike(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    like_match(&text, &pattern)
}

#[derive(Clone, Copy, PartialEq)]
enum LikeToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn like_tokens(pattern: &[char]) -> Vec<LikeToken> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.iter().copied();
    while let Some(c) = chars.next() {
        let token = match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyOne,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            other => LikeToken::Literal(other),
        };
        // consecutive `%` match the same set as one
        if token == LikeToken::AnyRun && tokens.last() == Some(&LikeToken::AnyRun) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

/// O(text * pattern) dynamic programme over pattern tokens. `matched[j]`
/// holds whether the tokens seen so far match the first `j` chars of `text`.
fn like_match(text: &[char], pattern: &[char]) -> bool {
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;

    for token in like_tokens(pattern) {
        let mut next = vec![false; text.len() + 1];
        match token {
            LikeToken::AnyRun => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= matched[j];
                    next[j] = seen;
                }
            }
            LikeToken::AnyOne => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1];
                }
            }
            LikeToken::Literal(c) => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1] && text[j - 1] == c;
                }
            }
        }
        matched = next;
    }
    matched[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::map_store::StoreError;

    fn new_map(name: &str) -> NewMapRecord {
        NewMapRecord {
            name: name.into(),
            description: Some("a map".into()),
            map: Some("[[0,1],[1,0]]".into()),
            uri: Some("ipfs://map".into()),
            creator: "0xcreator".into(),
            object_id: "0x0011223344556677".into(),
        }
    }

    #[test]
    fn ilike_handles_wildcards_and_case() {
        assert!(ilike("Forest Map", "%forest%"));
        assert!(ilike("Forest Map", "%MAP"));
        assert!(ilike("cave", "c_ve"));
        assert!(!ilike("cave", "c_e"));
        assert!(ilike("100%", "%0\\%"));
        assert!(!ilike("1000", "%0\\%"));
    }

    #[test]
    fn ilike_with_many_wildcards_stays_linear() {
        let name = "abcdefghijklmnopqrstuvwxyz".repeat(40);
        let pattern = format!("{}9", "%".repeat(200));
        assert!(!ilike(&name, &pattern));

        let pattern = "%a%b%c%d%e%f%g%h%i%j%k%l%m%n%o%p%z".repeat(10);
        assert!(!ilike(&name, &format!("{pattern}9")));
        assert!(ilike(&name, "%a%z%y%z%"));
    }

    #[tokio::test]
    async fn wildcard_heavy_name_lookup_returns_not_found() {
        let store = MemoryMapStore::new();
        store
            .insert(new_map("abcdefghijklmnopqrstuvwxyzabcdefgh"))
            .await
            .unwrap();
        let pattern = format!("{}9", "%".repeat(12));
        let lookup = store.find_by_name(&pattern);
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), lookup)
            .await
            .expect("lookup finished");
        assert!(matches!(result, Err(StoreError::NotSingleRow(0))));
    }

    #[tokio::test]
    async fn update_writes_null_when_requested() {
        let store = MemoryMapStore::new();
        let row = store.insert(new_map("Forest")).await.unwrap();
        store
            .update_payload(
                row.id,
                MapPayloadUpdate {
                    map: Some(None),
                    uri: None,
                },
            )
            .await
            .unwrap();

        let updated = store.find_by_id(row.id).await.unwrap();
        assert_eq!(updated.map, None);
        assert_eq!(updated.uri, row.uri);
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order() {
        let store = MemoryMapStore::new();
        let a = store.insert(new_map("a")).await.unwrap();
        let b = store.insert(new_map("b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let all = store.list().await.unwrap();
        assert_eq!(all, vec![a, b]);
    }

    #[tokio::test]
    async fn name_lookup_requires_a_single_match() {
        let store = MemoryMapStore::new();
        store.insert(new_map("Forest")).await.unwrap();
        store.insert(new_map("Deep Forest")).await.unwrap();
        store.insert(new_map("Cave")).await.unwrap();

        assert_eq!(store.find_by_name("cAvE").await.unwrap().name, "Cave");
        assert!(matches!(
            store.find_by_name("forest").await,
            Err(StoreError::NotSingleRow(2))
        ));
        assert!(matches!(
            store.find_by_name("swamp").await,
            Err(StoreError::NotSingleRow(0))
        ));
    }

    #[tokio::test]
    async fn update_of_missing_row_affects_nothing() {
        let store = MemoryMapStore::new();
        let affected = store
            .update_payload(99, MapPayloadUpdate::default())
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn update_leaves_omitted_fields_alone() {
        let store = MemoryMapStore::new();
        let row = store.insert(new_map("Forest")).await.unwrap();
        store
            .update_payload(
                row.id,
                MapPayloadUpdate {
                    map: Some(Some("[[1]]".into())),
                    uri: None,
                },
            )
            .await
            .unwrap();

        let updated = store.find_by_id(row.id).await.unwrap();
        assert_eq!(updated.map.as_deref(), Some("[[1]]"));
        assert_eq!(updated.uri, row.uri);
    }
}
