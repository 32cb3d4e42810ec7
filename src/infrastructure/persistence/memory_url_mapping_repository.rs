//! In-process implementation of the url mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{AnalyticsSummary, NewUrlMapping, UrlMapping};
use crate::domain::repositories::{ListOrder, ListQuery, UrlMappingRepository};
use crate::error::AppError;

/// Url mappings held in a concurrent map keyed by short key.
///
/// Insert-if-absent goes through the map's entry API, so the key check and
/// the write happen under the same shard lock. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryUrlMappingRepository {
    mappings: DashMap<String, UrlMapping>,
    next_id: AtomicI64,
}

impl MemoryUrlMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[async_trait]
impl UrlMappingRepository for MemoryUrlMappingRepository {
    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        match self.mappings.entry(new_mapping.short_key.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateKey(new_mapping.short_key)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let mapping = new_mapping.into_mapping(id);
                slot.insert(mapping.clone());
                Ok(mapping)
            }
        }
    }

    async fn find_by_short_key(&self, short_key: &str) -> Result<Option<UrlMapping>, AppError> {
        Ok(self.mappings.get(short_key).map(|m| m.value().clone()))
    }

    async fn increment_click_count(&self, short_key: &str) -> Result<bool, AppError> {
        match self.mappings.get_mut(short_key) {
            Some(mut mapping) => {
                mapping.click_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, short_key: &str) -> Result<bool, AppError> {
        Ok(self.mappings.remove(short_key).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let expired: Vec<String> = self
            .mappings
            .iter()
            .filter(|m| m.expires_at < now)
            .map(|m| m.key().clone())
            .collect();

        Ok(expired
            .into_iter()
            .filter(|key| {
                self.mappings
                    .remove_if(key, |_, m| m.expires_at < now)
                    .is_some()
            })
            .collect())
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<UrlMapping>, AppError> {
        let mut all: Vec<UrlMapping> = self.mappings.iter().map(|m| m.value().clone()).collect();

        match query.order {
            ListOrder::CreatedAt => all.sort_by_key(|m| m.id),
            ListOrder::ClickCountDesc => {
                all.sort_by(|a, b| b.click_count.cmp(&a.click_count).then(a.id.cmp(&b.id)))
            }
        }

        Ok(all
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn summary(&self) -> Result<AnalyticsSummary, AppError> {
        let (total_urls, total_clicks) = self
            .mappings
            .iter()
            .fold((0i64, 0i64), |(urls, clicks), m| (urls + 1, clicks + m.click_count));

        Ok(AnalyticsSummary {
            total_urls,
            total_clicks,
        })
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
