//! List page controller: fetch, filter, paginate, and mutate one collection.

use tracing::{info, warn};

use crate::client::ApiError;
use crate::form::Payload;
use crate::optimistic::{Optimistic, Settled, SyncStatus, Ticket};
use crate::resource::{Resource, ResourceApi};

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Typed confirmation required before a delete is sent.
pub const DELETE_WORD: &str = "DELETE";

/// Case-insensitive, untrimmed: `"delete"` passes, `"Delete "` does not.
pub fn confirm_delete(input: &str) -> bool { input.to_uppercase() == DELETE_WORD }

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 { 0 } else { len.div_ceil(page_size) }
}

/// 1-indexed page slice. Page 0 and pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub domain_id: Option<i64>,
    pub course_id: Option<i64>,
    pub active: Option<bool>,
    pub sort: SortOrder,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            domain_id: None,
            course_id: None,
            active: None,
            sort: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    fn matches<T: Resource>(&self, item: &T) -> bool {
        if self.domain_id.is_some_and(|d| item.domain_id() != d) {
            return false;
        }
        if self.course_id.is_some_and(|c| item.course_id() != c) {
            return false;
        }
        if self.active.is_some_and(|a| item.is_active() != a) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                item.search_text().iter().any(|h| h.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

#[derive(Debug)]
pub struct Page<'a, T> {
    pub items: Vec<&'a T>,
    pub page: usize,
    pub total_pages: usize,
    /// Matches across all pages.
    pub total_items: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// A status toggle that has been applied locally but not yet sent.
#[derive(Debug)]
pub struct PendingToggle<T> {
    id: i64,
    ticket: Ticket<T>,
    payload: Payload,
}

impl<T> PendingToggle<T> {
    pub fn id(&self) -> i64 { self.id }
    pub fn payload(&self) -> &Payload { &self.payload }
}

pub struct ListController<T: Resource, A: ResourceApi<T>> {
    api: A,
    items: Vec<Optimistic<T>>,
    toasts: Vec<Toast>,
}

impl<T: Resource, A: ResourceApi<T>> ListController<T, A> {
    pub fn new(api: A) -> Self { Self { api, items: Vec::new(), toasts: Vec::new() } }

    pub fn api(&self) -> &A { &self.api }

    /// Displayed records in server order.
    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().map(Optimistic::value)
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn get(&self, id: i64) -> Option<&T> { self.slot(id).map(Optimistic::value) }

    pub fn status(&self, id: i64) -> Option<SyncStatus> { self.slot(id).map(Optimistic::status) }

    pub fn take_toasts(&mut self) -> Vec<Toast> { std::mem::take(&mut self.toasts) }

    fn slot(&self, id: i64) -> Option<&Optimistic<T>> {
        self.items.iter().find(|o| o.value().id() == id)
    }

    fn slot_mut(&mut self, id: i64) -> Option<&mut Optimistic<T>> {
        self.items.iter_mut().find(|o| o.value().id() == id)
    }

    fn success(&mut self, message: String) {
        info!("{}", message);
        self.toasts.push(Toast { level: ToastLevel::Success, message });
    }

    fn failure(&mut self, action: &str, err: &ApiError) {
        warn!(resource = T::PATH, "{} failed: {}", action, err);
        self.toasts.push(Toast { level: ToastLevel::Error, message: err.user_message() });
    }

    /// Replace the local collection with the server's. Records that were
    /// already listed keep their ticket counters, so toggles still in flight
    /// settle as stale instead of reusing sequence numbers.
    pub async fn refresh(&mut self) -> Result<usize, ApiError> {
        match self.api.list().await {
            Ok(records) => {
                let mut previous = std::mem::take(&mut self.items);
                let mut next = Vec::with_capacity(records.len());
                for record in records {
                    let kept = previous.iter().position(|o| o.value().id() == record.id());
                    match kept {
                        Some(i) => {
                            let mut slot = previous.swap_remove(i);
                            slot.reset(record);
                            next.push(slot);
                        }
                        None => next.push(Optimistic::new(record)),
                    }
                }
                self.items = next;
                Ok(self.items.len())
            }
            Err(e) => {
                self.failure("load", &e);
                Err(e)
            }
        }
    }

    pub fn view(&self, query: &ListQuery) -> Page<'_, T> {
        let mut matched: Vec<&T> = self.items().filter(|item| query.matches(*item)).collect();
        match query.sort {
            SortOrder::NewestFirst => matched.sort_by(|a, b| b.id().cmp(&a.id())),
            SortOrder::OldestFirst => matched.sort_by_key(|r| r.id()),
        }
        Page {
            items: paginate(&matched, query.page, query.page_size).to_vec(),
            page: query.page,
            total_pages: total_pages(matched.len(), query.page_size),
            total_items: matched.len(),
        }
    }

    /// `Ok` once the server accepts the record, even if the follow-up reload fails.
    pub async fn create(&mut self, payload: Payload) -> Result<(), ApiError> {
        let echoed = match self.api.create(payload).await {
            Ok(echoed) => echoed,
            Err(e) => {
                self.failure("create", &e);
                return Err(e);
            }
        };
        self.success(format!("{} created", T::LABEL));
        match echoed {
            Some(record) => self.items.push(Optimistic::new(record)),
            None => self.reload_after_write().await,
        }
        Ok(())
    }

    /// `Ok` once the server accepts the change, even if the follow-up reload fails.
    pub async fn update(&mut self, id: i64, payload: Payload) -> Result<(), ApiError> {
        let echoed = match self.api.update(id, payload).await {
            Ok(echoed) => echoed,
            Err(e) => {
                self.failure("update", &e);
                return Err(e);
            }
        };
        self.success(format!("{} updated", T::LABEL));
        match echoed {
            Some(record) => match self.slot_mut(id) {
                Some(slot) => slot.reset(record),
                None => self.items.push(Optimistic::new(record)),
            },
            None => self.reload_after_write().await,
        }
        Ok(())
    }

    // The write already went through; a failed reload only leaves the list stale.
    async fn reload_after_write(&mut self) {
        if self.refresh().await.is_err() {
            warn!(resource = T::PATH, "saved, but the list could not be reloaded");
        }
    }

    /// Flip `isActive` locally and prepare the one request that persists it.
    pub fn begin_toggle(&mut self, id: i64) -> Option<PendingToggle<T>> {
        let slot = self.slot_mut(id)?;
        let mut next = slot.value().clone();
        next.set_active(!next.is_active());
        let payload = next.status_payload();
        let ticket = slot.begin(next);
        Some(PendingToggle { id, ticket, payload })
    }

    pub fn settle_toggle(
        &mut self,
        pending: PendingToggle<T>,
        result: Result<Option<T>, &ApiError>,
    ) -> Settled {
        let PendingToggle { id, ticket, .. } = pending;
        let active = ticket.value().is_active();
        let Some(slot) = self.slot_mut(id) else {
            return Settled::Stale;
        };
        match result {
            Ok(_) => {
                let outcome = slot.commit(ticket);
                if outcome == Settled::Committed {
                    let state = if active { "activated" } else { "deactivated" };
                    self.success(format!("{} {}", T::LABEL, state));
                }
                outcome
            }
            Err(e) => {
                let outcome = slot.rollback(ticket);
                self.failure("status update", e);
                outcome
            }
        }
    }

    /// Optimistic toggle with exactly one update request. `Ok(None)` if no
    /// record has that id.
    pub async fn toggle_active(&mut self, id: i64) -> Result<Option<bool>, ApiError> {
        let Some(pending) = self.begin_toggle(id) else {
            return Ok(None);
        };
        match self.api.update(id, pending.payload.clone()).await {
            Ok(echo) => {
                self.settle_toggle(pending, Ok(echo));
                Ok(self.get(id).map(Resource::is_active))
            }
            Err(e) => {
                self.settle_toggle(pending, Err(&e));
                Err(e)
            }
        }
    }

    /// Sends the delete only when `confirmation` passes [`confirm_delete`].
    pub async fn delete(&mut self, id: i64, confirmation: &str) -> Result<bool, ApiError> {
        if !confirm_delete(confirmation) {
            warn!(resource = T::PATH, id, "delete not confirmed");
            return Ok(false);
        }
        if let Err(e) = self.api.delete(id).await {
            self.failure("delete", &e);
            return Err(e);
        }
        self.items.retain(|o| o.value().id() != id);
        self.success(format!("{} deleted", T::LABEL));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::entities::Notice;

    fn notice(id: i64, title: &str, domain: i64, active: bool) -> Notice {
        serde_json::from_value(serde_json::json!({
            "id": id, "title": title, "content": "body", "domainId": domain, "isActive": active
        }))
        .unwrap()
    }

    #[derive(Default)]
    struct FakeApi {
        records: Vec<Notice>,
        fail_list: bool,
        fail_writes: bool,
        echo: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }
        fn log(&self, call: String) { self.calls.lock().unwrap().push(call); }
        fn rejected() -> ApiError {
            ApiError::Status { status: 500, message: "Database unavailable".into() }
        }
    }

    #[async_trait]
    impl ResourceApi<Notice> for FakeApi {
        async fn list(&self) -> Result<Vec<Notice>, ApiError> {
            self.log("list".into());
            if self.fail_list {
                return Err(ApiError::Status { status: 503, message: "Try again later".into() });
            }
            Ok(self.records.clone())
        }
        async fn create(&self, _payload: Payload) -> Result<Option<Notice>, ApiError> {
            self.log("create".into());
            if self.fail_writes {
                return Err(Self::rejected());
            }
            Ok(self.echo.then(|| notice(99, "fresh", 0, true)))
        }
        async fn update(&self, id: i64, payload: Payload) -> Result<Option<Notice>, ApiError> {
            self.log(format!("update {id} {payload:?}"));
            if self.fail_writes {
                return Err(Self::rejected());
            }
            Ok(None)
        }
        async fn delete(&self, id: i64) -> Result<(), ApiError> {
            self.log(format!("delete {id}"));
            if self.fail_writes {
                return Err(Self::rejected());
            }
            Ok(())
        }
    }

    async fn loaded(api: FakeApi) -> ListController<Notice, FakeApi> {
        let mut ctl = ListController::new(api);
        ctl.refresh().await.unwrap();
        ctl
    }

    fn seeded() -> FakeApi {
        FakeApi {
            records: vec![
                notice(1, "Exam dates", 0, true),
                notice(2, "Solar lab", 3, false),
                notice(3, "EV batch", 3, true),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn delete_confirmation_is_case_insensitive_but_untrimmed() {
        assert!(confirm_delete("DELETE"));
        assert!(confirm_delete("delete"));
        assert!(confirm_delete("DeLeTe"));
        assert!(!confirm_delete("Delete "));
        assert!(!confirm_delete(" delete"));
        assert!(!confirm_delete(""));
    }

    #[test]
    fn pagination_slices_and_bounds() {
        let items: Vec<u32> = (0..12).collect();
        assert_eq!(paginate(&items, 1, 5), &[0, 1, 2, 3, 4]);
        assert_eq!(paginate(&items, 2, 5), &[5, 6, 7, 8, 9]);
        assert_eq!(paginate(&items, 3, 5), &[10, 11]);
        assert!(paginate(&items, 4, 5).is_empty());
        assert!(paginate(&items, 0, 5).is_empty());
        assert!(paginate(&items, usize::MAX, 5).is_empty());
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(0, 5), 0);
        let empty: [u32; 0] = [];
        assert!(paginate(&empty, 1, 5).is_empty());
    }

    #[tokio::test]
    async fn failed_toggle_rolls_back_with_one_call() {
        let mut api = seeded();
        api.fail_writes = true;
        let mut ctl = loaded(api).await;

        let err = ctl.toggle_active(1).await.unwrap_err();
        assert_eq!(err.user_message(), "Database unavailable");
        assert!(ctl.get(1).unwrap().is_active);
        assert_eq!(ctl.status(1), Some(SyncStatus::Synced));

        let calls = ctl.api().calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("update")).count(), 1);
        let expected = Toast { level: ToastLevel::Error, message: "Database unavailable".into() };
        assert_eq!(ctl.take_toasts(), vec![expected]);
    }

    #[tokio::test]
    async fn successful_toggle_keeps_new_value_without_refetch() {
        let mut ctl = loaded(seeded()).await;
        assert_eq!(ctl.toggle_active(2).await.unwrap(), Some(true));
        assert!(ctl.get(2).unwrap().is_active);
        let sent = Payload::Json(serde_json::json!({"isActive": true}));
        assert_eq!(ctl.api().calls(), vec!["list".to_string(), format!("update 2 {sent:?}")]);
        assert_eq!(ctl.take_toasts()[0].level, ToastLevel::Success);
        assert_eq!(ctl.toggle_active(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn late_failure_of_superseded_toggle_is_ignored() {
        let mut ctl = loaded(seeded()).await;
        let first = ctl.begin_toggle(1).unwrap();
        assert!(!ctl.get(1).unwrap().is_active);
        let second = ctl.begin_toggle(1).unwrap();
        assert!(ctl.get(1).unwrap().is_active);

        assert_eq!(ctl.settle_toggle(second, Ok(None)), Settled::Committed);
        assert_eq!(ctl.settle_toggle(first, Err(&FakeApi::rejected())), Settled::Stale);
        assert!(ctl.get(1).unwrap().is_active);
        assert_eq!(ctl.status(1), Some(SyncStatus::Synced));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut ctl = loaded(seeded()).await;
        assert!(!ctl.delete(3, "Delete ").await.unwrap());
        assert_eq!(ctl.api().calls(), vec!["list"]);
        assert_eq!(ctl.len(), 3);

        assert!(ctl.delete(3, "delete").await.unwrap());
        assert_eq!(ctl.api().calls(), vec!["list", "delete 3"]);
        assert!(ctl.get(3).is_none());
    }

    #[tokio::test]
    async fn failed_delete_keeps_record_and_reports() {
        let mut api = seeded();
        api.fail_writes = true;
        let mut ctl = loaded(api).await;
        assert!(ctl.delete(1, "DELETE").await.is_err());
        assert!(ctl.get(1).is_some());
        assert_eq!(ctl.take_toasts()[0].level, ToastLevel::Error);
    }

    #[tokio::test]
    async fn view_filters_sorts_and_pages() {
        let mut ctl = loaded(seeded()).await;
        let page = ctl.view(&ListQuery::default());
        assert_eq!(page.items.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(page.total_pages, 1);

        let q = ListQuery { domain_id: Some(3), active: Some(true), ..Default::default() };
        assert_eq!(ctl.view(&q).items.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3]);

        let q = ListQuery { search: Some("SOLAR".into()), ..Default::default() };
        assert_eq!(ctl.view(&q).total_items, 1);

        let q = ListQuery {
            sort: SortOrder::OldestFirst,
            page_size: 2,
            page: 2,
            ..Default::default()
        };
        let page = ctl.view(&q);
        assert_eq!(page.items.iter().map(|n| n.id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(page.total_pages, 2);

        ctl.take_toasts();
        ctl.create(Payload::Json(serde_json::json!({}))).await.unwrap();
        assert_eq!(ctl.api().calls().last().map(String::as_str), Some("list"));
    }

    #[tokio::test]
    async fn create_appends_echoed_record() {
        let mut api = seeded();
        api.echo = true;
        let mut ctl = loaded(api).await;
        ctl.create(Payload::Json(serde_json::json!({"title": "fresh"}))).await.unwrap();
        assert_eq!(ctl.len(), 4);
        assert_eq!(ctl.get(99).map(|n| n.title.as_str()), Some("fresh"));
        assert_eq!(ctl.api().calls(), vec!["list", "create"]);
    }

    #[tokio::test]
    async fn reload_keeps_ticket_order_for_inflight_toggles() {
        let mut ctl = loaded(seeded()).await;
        let first = ctl.begin_toggle(2).unwrap();
        assert!(ctl.get(2).unwrap().is_active);

        // server still reports the old value; it wins and the old ticket goes stale
        ctl.refresh().await.unwrap();
        assert!(!ctl.get(2).unwrap().is_active);
        assert_eq!(ctl.settle_toggle(first, Ok(None)), Settled::Stale);
        assert_eq!(ctl.status(2), Some(SyncStatus::Synced));

        let before = ctl.get(2).unwrap().is_active;
        let second = ctl.begin_toggle(2).unwrap();
        assert_eq!(ctl.settle_toggle(second, Err(&FakeApi::rejected())), Settled::RolledBack);
        assert_eq!(ctl.get(2).unwrap().is_active, before);
        assert_eq!(ctl.status(2), Some(SyncStatus::Synced));
    }

    #[tokio::test]
    async fn accepted_create_is_reported_even_when_reload_fails() {
        let api = FakeApi { fail_list: true, ..seeded() };
        let mut ctl = ListController::new(api);

        ctl.create(Payload::Json(serde_json::json!({"title": "fresh"}))).await.unwrap();
        assert_eq!(ctl.api().calls(), vec!["create", "list"]);
        let toasts = ctl.take_toasts();
        let created = Toast { level: ToastLevel::Success, message: "Notice created".into() };
        assert_eq!(toasts[0], created);
        assert_eq!(toasts[1].level, ToastLevel::Error);

        ctl.update(1, Payload::Json(serde_json::json!({"title": "edited"}))).await.unwrap();
        assert_eq!(ctl.take_toasts()[0].level, ToastLevel::Success);
    }
}
