//! First-seen detection against the durable store.
//!
//! Each record costs one existence query and, when it is new, one write. The
//! first failing round trip aborts the batch; entities written before it stay
//! written.

use chrono::Utc;

use crate::error::Result;
use crate::models::{ListingRecord, StoredEntity};
use crate::storage::RepoStore;

/// Registers records that the store has never seen.
pub struct NoveltyFilter<'a> {
    store: &'a dyn RepoStore,
}

impl<'a> NoveltyFilter<'a> {
    pub fn new(store: &'a dyn RepoStore) -> Self {
        Self { store }
    }

    /// Persist and return the first-seen records, in input order.
    pub async fn filter_new(&self, records: &[ListingRecord]) -> Result<Vec<ListingRecord>> {
        let mut first_seen = Vec::new();

        for record in records {
            let existing = self.store.count_by_source_url(&record.source_url).await?;
            if existing > 0 {
                log::debug!("{} already known ({} stored)", record.source_url, existing);
                continue;
            }

            log::info!("{} is new", record.title);
            self.store
                .put(&StoredEntity::first_seen(record, Utc::now()))
                .await?;
            first_seen.push(record.clone());
        }

        Ok(first_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store that can fail the n-th write or every query.
    #[derive(Default)]
    struct MemoryStore {
        entities: Mutex<Vec<StoredEntity>>,
        fail_put_at: Option<usize>,
        fail_queries: bool,
        puts: Mutex<usize>,
    }

    impl MemoryStore {
        fn stored_urls(&self) -> Vec<String> {
            self.entities
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.source_url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl RepoStore for MemoryStore {
        async fn count_by_source_url(&self, source_url: &str) -> Result<usize> {
            if self.fail_queries {
                return Err(AppError::store_query("unavailable"));
            }
            Ok(self
                .entities
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.source_url == source_url)
                .count())
        }

        async fn put(&self, entity: &StoredEntity) -> Result<()> {
            let mut puts = self.puts.lock().unwrap();
            *puts += 1;
            if self.fail_put_at == Some(*puts) {
                return Err(AppError::store_write("throttled"));
            }
            self.entities.lock().unwrap().push(entity.clone());
            Ok(())
        }
    }

    fn record(name: &str) -> ListingRecord {
        ListingRecord {
            title: name.to_string(),
            source_url: format!("https://github.com/a/{name}"),
            description: "d".to_string(),
            category: "python".to_string(),
        }
    }

    fn records(names: &[&str]) -> Vec<ListingRecord> {
        names.iter().map(|n| record(n)).collect()
    }

    #[tokio::test]
    async fn test_first_seen_record_is_persisted_and_returned() {
        let store = MemoryStore::default();
        let input = vec![record("foo")];

        let new = NoveltyFilter::new(&store).filter_new(&input).await.unwrap();

        assert_eq!(new, input);
        assert_eq!(store.stored_urls(), vec!["https://github.com/a/foo"]);
    }

    #[tokio::test]
    async fn test_second_run_finds_nothing_new() {
        let store = MemoryStore::default();
        let input = records(&["foo", "bar", "baz"]);
        let filter = NoveltyFilter::new(&store);

        let first = filter.filter_new(&input).await.unwrap();
        let second = filter.filter_new(&input).await.unwrap();

        assert_eq!(first.len(), 3);
        assert!(second.is_empty());
        assert_eq!(store.stored_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_output_keeps_input_order() {
        let store = MemoryStore::default();
        let filter = NoveltyFilter::new(&store);
        filter.filter_new(&records(&["b", "d"])).await.unwrap();

        let new = filter
            .filter_new(&records(&["a", "b", "c", "d", "e"]))
            .await
            .unwrap();

        let titles: Vec<_> = new.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c", "e"]);
    }

    #[tokio::test]
    async fn test_duplicate_within_batch_reported_once() {
        let store = MemoryStore::default();
        let new = NoveltyFilter::new(&store)
            .filter_new(&records(&["foo", "foo"]))
            .await
            .unwrap();
        assert_eq!(new.len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_earlier_writes() {
        let store = MemoryStore {
            fail_put_at: Some(3),
            ..MemoryStore::default()
        };

        let err = NoveltyFilter::new(&store)
            .filter_new(&records(&["r1", "r2", "r3", "r4", "r5"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreWrite(_)));
        assert_eq!(
            store.stored_urls(),
            vec!["https://github.com/a/r1", "https://github.com/a/r2"]
        );
    }

    #[tokio::test]
    async fn test_query_failure_aborts() {
        let store = MemoryStore {
            fail_queries: true,
            ..MemoryStore::default()
        };

        let err = NoveltyFilter::new(&store)
            .filter_new(&records(&["foo"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreQuery(_)));
        assert!(store.stored_urls().is_empty());
    }
}
