//! HTTP routes for the question/answer API.
//!
//! The semantic outcome travels as a `code` field in the JSON body; the
//! HTTP status itself is always 200, matching the envelope the service
//! has always produced.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::server::SharedState;
use crate::store::StoreError;

const UNKNOWN_REPLY: &str = "Sorry, I don't know that yet. Please teach me!";

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/simsimi", get(ask))
        .route("/teach", get(teach))
        .route("/delete", get(delete))
        .route("/edit", get(edit))
        .route("/list", get(list))
}

#[derive(Debug, Serialize)]
struct MessageBody {
    code: u16,
    message: String,
}

#[derive(Debug, Serialize)]
struct ReplyBody {
    code: u16,
    response: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListBody {
    code: u16,
    total_questions: usize,
    total_replies: usize,
    message: String,
}

fn message(code: u16, text: impl Into<String>) -> Response {
    Json(MessageBody {
        code,
        message: text.into(),
    })
    .into_response()
}

/// Map a store outcome to its body code.
fn store_error(err: StoreError) -> Response {
    let code = match &err {
        StoreError::MissingParameter(_) => 400,
        StoreError::QuestionNotFound
        | StoreError::ReplyNotFound
        | StoreError::OldReplyNotFound => 404,
        StoreError::AlreadyExists => 409,
        StoreError::Persist(_) => {
            error!("mutation not persisted: {}", err);
            500
        }
    };
    message(code, err.to_string())
}

fn unknown_question() -> Response {
    Json(ReplyBody {
        code: 404,
        response: vec![UNKNOWN_REPLY.to_string()],
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct AskParams {
    #[serde(default)]
    text: String,
}

/// GET /simsimi?text=... — one uniformly random reply per call
async fn ask(State(state): State<SharedState>, Query(params): Query<AskParams>) -> Response {
    let store = state.store.read().await;
    match store.lookup(&params.text) {
        Ok(answers) => match answers.choose(&mut rand::rng()) {
            Some(reply) => Json(ReplyBody {
                code: 200,
                response: vec![reply.clone()],
            })
            .into_response(),
            None => unknown_question(),
        },
        Err(StoreError::QuestionNotFound) => unknown_question(),
        Err(err) => store_error(err),
    }
}

#[derive(Debug, Deserialize)]
struct ReplyParams {
    #[serde(default)]
    ask: String,
    #[serde(default)]
    ans: String,
}

/// GET /teach?ask=...&ans=...
async fn teach(State(state): State<SharedState>, Query(params): Query<ReplyParams>) -> Response {
    let mut store = state.store.write().await;
    match store.teach(&params.ask, &params.ans) {
        Ok(()) => message(200, "Reply added successfully!"),
        Err(err) => store_error(err),
    }
}

/// GET /delete?ask=...&ans=...
async fn delete(State(state): State<SharedState>, Query(params): Query<ReplyParams>) -> Response {
    let mut store = state.store.write().await;
    match store.delete(&params.ask, &params.ans) {
        Ok(()) => message(200, "Reply deleted successfully."),
        Err(err) => store_error(err),
    }
}

#[derive(Debug, Deserialize)]
struct EditParams {
    #[serde(default)]
    ask: String,
    #[serde(default)]
    old: String,
    #[serde(default)]
    new: String,
}

/// GET /edit?ask=...&old=...&new=...
async fn edit(State(state): State<SharedState>, Query(params): Query<EditParams>) -> Response {
    let mut store = state.store.write().await;
    match store.edit(&params.ask, &params.old, &params.new) {
        Ok(()) => message(200, "Reply edited successfully."),
        Err(err) => store_error(err),
    }
}

/// GET /list — aggregate counts over the whole store
async fn list(State(state): State<SharedState>) -> Json<ListBody> {
    let stats = state.store.read().await.stats();
    Json(ListBody {
        code: 200,
        total_questions: stats.question_count,
        total_replies: stats.total_answer_count,
        message: "List fetched successfully.".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::JsonFile;
    use crate::server::AppState;
    use crate::store::AnswerStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(dir: &tempfile::TempDir) -> Router {
        let sink = JsonFile::new(dir.path().join("data.json"));
        let store = AnswerStore::open(Box::new(sink));
        router().with_state(Arc::new(AppState::new(store)))
    }

    async fn get_json(app: &Router, uri: &str) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        // The envelope carries the semantic code; transport is always 200
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_teach_then_ask() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let body = get_json(&app, "/teach?ask=Hello&ans=hi%20there").await;
        assert_eq!(body["code"], 200);

        // Lookup normalizes the question before matching
        let body = get_json(&app, "/simsimi?text=%20HELLO%20").await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["response"][0], "hi there");
    }

    #[tokio::test]
    async fn test_ask_unknown_question_gets_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let body = get_json(&app, "/simsimi?text=anyone").await;
        assert_eq!(body["code"], 404);
        assert_eq!(body["response"][0], UNKNOWN_REPLY);
    }

    #[tokio::test]
    async fn test_ask_without_text_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let body = get_json(&app, "/simsimi").await;
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_duplicate_teach_is_409() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        let body = get_json(&app, "/teach?ask=hi&ans=yo").await;
        assert_eq!(body["code"], 200);
        let body = get_json(&app, "/teach?ask=hi&ans=yo").await;
        assert_eq!(body["code"], 409);
    }

    #[tokio::test]
    async fn test_delete_then_edit_missing_targets() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        get_json(&app, "/teach?ask=q&ans=a").await;

        let body = get_json(&app, "/delete?ask=q&ans=a").await;
        assert_eq!(body["code"], 200);

        // Question is gone entirely once its last reply is deleted
        let body = get_json(&app, "/edit?ask=q&old=a&new=b").await;
        assert_eq!(body["code"], 404);
        let body = get_json(&app, "/delete?ask=q&ans=a").await;
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_list_counts() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);

        get_json(&app, "/teach?ask=q1&ans=a").await;
        get_json(&app, "/teach?ask=q1&ans=b").await;
        get_json(&app, "/teach?ask=q2&ans=c").await;

        let body = get_json(&app, "/list").await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["totalQuestions"], 2);
        assert_eq!(body["totalReplies"], 3);
    }
}
