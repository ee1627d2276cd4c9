//! services/console/tests/resource_store.rs
//!
//! The generic collection store discipline, exercised through the student
//! collection against a scripted transport: fail-fast authorization,
//! fail-empty refresh, patch-on-success mutations, and the untouched
//! cache after a failed mutation.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use console_lib::adapters::vault::MemoryVault;
use console_lib::stores::{SessionStore, StudentStore};
use school_console_core::domain::{
    LoginCredentials, NewStudent, PersistedSession, Role, Student, StudentFilters, StudentPatch,
};
use school_console_core::ports::{AuthApi, CollectionApi, PortError, PortResult};

use common::{far_future, make_token};

//=========================================================================================
// Scripted transport
//=========================================================================================

#[derive(Default)]
struct ScriptedStudents {
    lists: Mutex<Vec<PortResult<Vec<Student>>>>,
    creates: Mutex<Vec<PortResult<Student>>>,
    updates: Mutex<Vec<PortResult<Student>>>,
    deletes: Mutex<Vec<PortResult<()>>>,
    calls: AtomicUsize,
}

impl ScriptedStudents {
    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionApi<Student> for ScriptedStudents {
    async fn list(&self, _token: &str, _filters: &StudentFilters) -> PortResult<Vec<Student>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lists.lock().remove(0)
    }

    async fn create(&self, _token: &str, _data: &NewStudent) -> PortResult<Student> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.creates.lock().remove(0)
    }

    async fn update(&self, _token: &str, _id: &i64, _data: &StudentPatch) -> PortResult<Student> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().remove(0)
    }

    async fn delete(&self, _token: &str, _id: &i64) -> PortResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.deletes.lock().remove(0)
    }
}

/// A transport whose first list call blocks until the test releases it;
/// later calls answer immediately.
struct GatedStudents {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait]
impl CollectionApi<Student> for GatedStudents {
    async fn list(&self, _token: &str, _filters: &StudentFilters) -> PortResult<Vec<Student>> {
        let held = self.gate.lock().take();
        if let Some(gate) = held {
            let _ = gate.await;
        }
        Ok(Vec::new())
    }

    async fn create(&self, _token: &str, _data: &NewStudent) -> PortResult<Student> {
        Err(PortError::Unexpected("create not scripted".to_string()))
    }

    async fn update(&self, _token: &str, _id: &i64, _data: &StudentPatch) -> PortResult<Student> {
        Err(PortError::Unexpected("update not scripted".to_string()))
    }

    async fn delete(&self, _token: &str, _id: &i64) -> PortResult<()> {
        Err(PortError::Unexpected("delete not scripted".to_string()))
    }
}

/// An auth port that must never be reached by these tests.
struct NoAuth;

#[async_trait]
impl AuthApi for NoAuth {
    async fn login(&self, _credentials: &LoginCredentials) -> PortResult<String> {
        Err(PortError::Unexpected("login not scripted".to_string()))
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

fn student(id: i64, full_name: &str, class_id: i64) -> Student {
    Student {
        id,
        full_name: full_name.to_string(),
        class_id,
        address: None,
        birth_date: None,
        gender: None,
        note: None,
        phone: None,
        school_id: None,
        created_at: None,
    }
}

fn logged_in_session() -> Arc<SessionStore> {
    let vault = Arc::new(MemoryVault::seeded(PersistedSession {
        token: make_token(far_future(), "school", 7, None),
        role: Role::School,
        school_name: None,
    }));
    let session = Arc::new(SessionStore::new(Arc::new(NoAuth), vault));
    session.restore();
    assert!(session.is_authenticated());
    session
}

fn logged_out_session() -> Arc<SessionStore> {
    Arc::new(SessionStore::new(Arc::new(NoAuth), Arc::new(MemoryVault::new())))
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn operations_without_a_session_never_reach_the_transport() {
    let api = Arc::new(ScriptedStudents::default());
    let store = StudentStore::new(api.clone(), logged_out_session());

    let created = store.create(NewStudent::default()).await;
    assert!(matches!(created, Err(PortError::Unauthenticated)));

    let refreshed = store.refresh().await;
    assert!(matches!(refreshed, Err(PortError::Unauthenticated)));

    assert_eq!(api.call_count(), 0);
    assert!(store.error().is_some());
    assert!(store.is_empty());
}

#[tokio::test]
async fn refresh_replaces_the_whole_cache() {
    let api = Arc::new(ScriptedStudents::default());
    api.lists.lock().push(Ok(vec![
        student(1, "Айгүл Серікова", 7),
        student(2, "Мария Ким", 7),
    ]));
    let store = StudentStore::new(api.clone(), logged_in_session());

    store.refresh().await.unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&1).unwrap().full_name, "Айгүл Серікова");
    assert_eq!(store.error(), None);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn a_failed_refresh_empties_the_cache_and_records_the_error() {
    let api = Arc::new(ScriptedStudents::default());
    {
        let mut lists = api.lists.lock();
        lists.push(Ok(vec![student(1, "Айгүл Серікова", 7)]));
        lists.push(Err(PortError::Remote { status: 500 }));
    }
    let store = StudentStore::new(api.clone(), logged_in_session());

    store.refresh().await.unwrap();
    assert_eq!(store.len(), 1);

    let result = store.refresh().await;
    assert!(matches!(result, Err(PortError::Remote { status: 500 })));
    assert!(store.is_empty());
    assert!(store.error().unwrap().contains("500"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn refresh_remembers_the_applied_filters() {
    let api = Arc::new(ScriptedStudents::default());
    api.lists.lock().push(Ok(vec![student(2, "Мария Ким", 7)]));
    let store = StudentStore::new(api, logged_in_session());

    let filters = StudentFilters {
        gender: Some("female".to_string()),
        class_id: Some(7),
        ..Default::default()
    };
    store.refresh_filtered(filters.clone()).await.unwrap();

    assert_eq!(store.last_filters(), filters);
}

#[tokio::test]
async fn create_appends_the_server_record() {
    let api = Arc::new(ScriptedStudents::default());
    api.lists.lock().push(Ok(vec![student(1, "Айгүл Серікова", 7)]));
    api.creates.lock().push(Ok(student(10, "Дамир Ахметов", 7)));
    let store = StudentStore::new(api, logged_in_session());

    store.refresh().await.unwrap();
    let created = store
        .create(NewStudent {
            full_name: "Дамир Ахметов".to_string(),
            class_id: 7,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.id, 10);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&10).unwrap().full_name, "Дамир Ахметов");
}

#[tokio::test]
async fn a_failed_update_leaves_the_cache_untouched() {
    let api = Arc::new(ScriptedStudents::default());
    api.lists.lock().push(Ok(vec![student(1, "Айгүл Серікова", 7)]));
    api.updates.lock().push(Err(PortError::Remote { status: 404 }));
    let store = StudentStore::new(api, logged_in_session());

    store.refresh().await.unwrap();
    let result = store
        .update(
            1,
            StudentPatch {
                full_name: Some("Айгүл С.".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(PortError::Remote { status: 404 })));
    assert_eq!(store.get(&1).unwrap().full_name, "Айгүл Серікова");
    assert!(store.error().is_some());
}

#[tokio::test]
async fn a_successful_update_stores_the_full_server_representation() {
    let api = Arc::new(ScriptedStudents::default());
    api.lists.lock().push(Ok(vec![student(1, "Айгүл Серікова", 7)]));
    api.updates.lock().push(Ok(student(1, "Айгүл Серікова", 8)));
    let store = StudentStore::new(api, logged_in_session());

    store.refresh().await.unwrap();
    store
        .update(
            1,
            StudentPatch {
                class_id: Some(8),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(store.get(&1).unwrap().class_id, 8);
    assert_eq!(store.len(), 1);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn remove_drops_the_entity_and_a_stale_remove_changes_nothing() {
    let api = Arc::new(ScriptedStudents::default());
    api.lists.lock().push(Ok(vec![
        student(1, "Айгүл Серікова", 7),
        student(2, "Мария Ким", 7),
    ]));
    {
        let mut deletes = api.deletes.lock();
        deletes.push(Ok(()));
        deletes.push(Err(PortError::Remote { status: 404 }));
    }
    let store = StudentStore::new(api, logged_in_session());

    store.refresh().await.unwrap();
    store.remove(2).await.unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.get(&2).is_none());

    // Deleting an id the server no longer knows fails cleanly: the cache
    // keeps its current contents and the error is surfaced.
    let stale = store.remove(3).await;
    assert!(matches!(stale, Err(PortError::Remote { status: 404 })));
    assert_eq!(store.len(), 1);
    assert!(store.error().unwrap().contains("404"));
}

#[tokio::test]
async fn subscribers_are_notified_and_can_leave() {
    let api = Arc::new(ScriptedStudents::default());
    {
        let mut lists = api.lists.lock();
        lists.push(Ok(vec![student(1, "Айгүл Серікова", 7)]));
        lists.push(Ok(Vec::new()));
    }
    let store = StudentStore::new(api, logged_in_session());

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let id = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.refresh().await.unwrap();
    // Start and finish of the fetch are separate notifications.
    assert!(seen.load(Ordering::SeqCst) >= 2);

    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    let after = seen.load(Ordering::SeqCst);
    store.refresh().await.unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), after);
}

#[tokio::test]
async fn a_fetch_that_never_ran_does_not_record_its_filters() {
    let api = Arc::new(ScriptedStudents::default());
    let store = StudentStore::new(api, logged_out_session());

    let filters = StudentFilters {
        class_id: Some(7),
        ..Default::default()
    };
    let result = store.refresh_filtered(filters).await;

    assert!(matches!(result, Err(PortError::Unauthenticated)));
    assert_eq!(store.last_filters(), StudentFilters::default());
}

#[tokio::test]
async fn one_completed_fetch_cannot_mask_another_still_in_flight() {
    let (release, gate) = oneshot::channel();
    let api = Arc::new(GatedStudents {
        gate: Mutex::new(Some(gate)),
    });
    let store = Arc::new(StudentStore::new(api, logged_in_session()));

    let held = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.refresh().await }
    });
    // Wait until the held fetch has actually started.
    while !store.is_loading() {
        tokio::task::yield_now().await;
    }

    // A second fetch starts and finishes while the first is still open;
    // the store must still report loading.
    store.refresh().await.unwrap();
    assert!(store.is_loading());

    release.send(()).unwrap();
    held.await.unwrap().unwrap();
    assert!(!store.is_loading());
}

#[tokio::test]
async fn clear_error_resets_only_the_error_field() {
    let api = Arc::new(ScriptedStudents::default());
    api.lists.lock().push(Err(PortError::Remote { status: 502 }));
    let store = StudentStore::new(api, logged_in_session());

    let _ = store.refresh().await;
    assert!(store.error().is_some());

    store.clear_error();
    assert_eq!(store.error(), None);
}
