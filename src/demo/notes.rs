//! Notes: a plural resource backed by an in-memory store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::actions::ActionName;
use crate::controller::{ActionFuture, ActionSet, Controller};
use crate::error::{BoxError, HttpError};
use crate::filters::{Filter, FilterFuture, FilterList};
use crate::http::Exchange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct NoteInput {
    title: String,
    #[serde(default)]
    body: String,
}

/// Shared note storage.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Arc<RwLock<BTreeMap<u64, Note>>>,
    next_id: Arc<AtomicU64>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Note> {
        self.notes.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: u64) -> Option<Note> {
        self.notes.read().await.get(&id).cloned()
    }

    pub async fn insert(&self, title: String, body: String) -> Note {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let note = Note { id, title, body };
        self.notes.write().await.insert(id, note.clone());
        note
    }

    pub async fn update(&self, id: u64, title: String, body: String) -> Option<Note> {
        let mut notes = self.notes.write().await;
        let note = notes.get_mut(&id)?;
        note.title = title;
        note.body = body;
        Some(note.clone())
    }

    pub async fn remove(&self, id: u64) -> Option<Note> {
        self.notes.write().await.remove(&id)
    }
}

pub struct NotesController {
    store: NoteStore,
    note: Option<Note>,
}

impl NotesController {
    fn index<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            ex.response.send_json(&self.store.list().await)?;
            Ok(())
        })
    }

    fn show<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            ex.response.send_json(&self.note)?;
            Ok(())
        })
    }

    fn create<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            let input = parse_input(ex)?;
            let note = self.store.insert(input.title, input.body).await;
            ex.response.status(StatusCode::CREATED).send_json(&note)?;
            Ok(())
        })
    }

    fn update<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            let input = parse_input(ex)?;
            let id = self.note.as_ref().map(|n| n.id).unwrap_or_default();
            let note = self
                .store
                .update(id, input.title, input.body)
                .await
                .ok_or_else(|| HttpError::not_found(format!("no note {id}")))?;
            ex.response.send_json(&note)?;
            Ok(())
        })
    }

    fn destroy<'a>(&'a mut self, ex: &'a mut Exchange) -> ActionFuture<'a> {
        Box::pin(async move {
            if let Some(note) = &self.note {
                self.store.remove(note.id).await;
            }
            ex.response.status(StatusCode::NO_CONTENT).end();
            Ok(())
        })
    }

    /// Resolve `:id` into the note it names, or answer 400/404.
    fn load_note<'a>(&'a mut self, ex: &'a mut Exchange) -> FilterFuture<'a> {
        Box::pin(async move {
            let raw = ex.request.id().unwrap_or_default();
            let id: u64 = raw
                .parse()
                .map_err(|_| HttpError::bad_request(format!("invalid note id `{raw}`")))?;
            let note = self
                .store
                .get(id)
                .await
                .ok_or_else(|| HttpError::not_found(format!("no note {id}")))?;
            self.note = Some(note);
            Ok(())
        })
    }

    /// Number of stored notes before the action runs.
    fn count_header<'a>(&'a mut self, ex: &'a mut Exchange) -> FilterFuture<'a> {
        Box::pin(async move {
            let count = self.store.notes.read().await.len();
            ex.response
                .header("x-note-count".parse()?, count.to_string().parse()?);
            Ok(())
        })
    }
}

fn parse_input(ex: &Exchange) -> Result<NoteInput, HttpError> {
    if !ex.request.is_json() {
        return Err(HttpError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected application/json",
        ));
    }
    ex.request
        .json()
        .map_err(|e| HttpError::bad_request(format!("invalid note: {e}")))
}

impl Controller for NotesController {
    const NAME: &'static str = "NotesController";

    async fn init(exchange: &mut Exchange) -> Result<Self, BoxError> {
        let store = exchange
            .request
            .extensions
            .get::<NoteStore>()
            .cloned()
            .ok_or_else(|| HttpError::internal("note store is not installed"))?;
        Ok(NotesController { store, note: None })
    }

    fn actions(&self) -> ActionSet<Self> {
        ActionSet::new()
            .with(ActionName::Index, Self::index)
            .with(ActionName::Create, Self::create)
            .with(ActionName::Show, Self::show)
            .with(ActionName::Update, Self::update)
            .with(ActionName::Destroy, Self::destroy)
    }

    fn before_action(&self) -> FilterList<Self> {
        vec![
            Filter::direct(Self::count_header).into(),
            Filter::direct(Self::load_note).only([
                ActionName::Show,
                ActionName::Update,
                ActionName::Destroy,
            ]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Verb;
    use crate::dispatch::dispatch;
    use crate::error::DispatchError;
    use crate::http::RequestData;
    use axum::http::{Method, Uri};
    use std::collections::HashMap;

    fn exchange(store: &NoteStore, method: Method, id: Option<&str>, body: &str) -> Exchange {
        let mut request = RequestData::from_parts(method, Uri::from_static("/notes"), body.to_string());
        request.extensions.insert(store.clone());
        request
            .headers
            .insert("content-type", "application/json".parse().unwrap());
        if let Some(id) = id {
            request.params = HashMap::from([("id".to_string(), id.to_string())]);
        }
        Exchange::new(request)
    }

    #[tokio::test]
    async fn test_create_then_show() {
        let store = NoteStore::new();
        let ex = dispatch::<NotesController>(
            ActionName::Create,
            Verb::Post,
            exchange(&store, Method::POST, None, r#"{"title":"groceries"}"#),
        )
        .await
        .unwrap();
        assert_eq!(ex.response.status_code(), StatusCode::CREATED);
        assert_eq!(ex.response.headers()["x-note-count"], "0");

        let ex = dispatch::<NotesController>(
            ActionName::Show,
            Verb::Get,
            exchange(&store, Method::GET, Some("1"), ""),
        )
        .await
        .unwrap();
        assert_eq!(ex.response.headers()["x-note-count"], "1");
        let note: Note = serde_json::from_slice(ex.response.body()).unwrap();
        assert_eq!(note.title, "groceries");
    }

    #[tokio::test]
    async fn test_unknown_note_is_not_found() {
        let store = NoteStore::new();
        let err = dispatch::<NotesController>(
            ActionName::Destroy,
            Verb::Delete,
            exchange(&store, Method::DELETE, Some("9"), ""),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DispatchError::FilterAborted(_)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = dispatch::<NotesController>(
            ActionName::Show,
            Verb::Get,
            exchange(&store, Method::GET, Some("abc"), ""),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_store_fails_init() {
        let err = dispatch::<NotesController>(ActionName::Index, Verb::Get, Exchange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Init(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_edit_is_not_exposed() {
        let store = NoteStore::new();
        let err = dispatch::<NotesController>(
            ActionName::Edit,
            Verb::Get,
            exchange(&store, Method::GET, Some("1"), ""),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Method Not Allowed: get");
    }
}
