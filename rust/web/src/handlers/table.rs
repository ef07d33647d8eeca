//! RPC-shaped handlers for the persistent multi-table harness. Table
//! creation itself is not exposed here (§1 scopes it to an external
//! collaborator) — only `join`/`leave`/`deal`/`action`/`timeout`/`state`/
//! `reset`, matching the wire surface named in §6.

use std::sync::Arc;

use holdem_engine::player::PlayerAction;
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

use crate::errors::IntoErrorResponse;
use crate::table::{TableError, TableManager};

#[derive(Debug, Deserialize)]
pub struct JoinTableRequest {
    pub player_id: u64,
    pub seat: usize,
    pub buy_in: u32,
}

#[derive(Debug, Deserialize)]
pub struct LeaveTableRequest {
    pub player_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct PlayerActionRequest {
    pub player_id: u64,
    pub action: PlayerAction,
    pub action_id: String,
}

#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

pub async fn join_table(
    tables: Arc<TableManager>,
    table_id: u64,
    request: JoinTableRequest,
) -> Response {
    match tables.join_table(table_id, request.player_id, request.seat, request.buy_in) {
        Ok(()) => success(StatusCode::CREATED, EmptyResponse {}),
        Err(err) => table_error(err),
    }
}

pub async fn leave_table(
    tables: Arc<TableManager>,
    table_id: u64,
    request: LeaveTableRequest,
) -> Response {
    match tables.leave_table(table_id, request.player_id) {
        Ok(()) => reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(err) => table_error(err),
    }
}

pub async fn deal_hand(tables: Arc<TableManager>, table_id: u64) -> Response {
    match tables.deal(table_id, now_ms()) {
        Ok(view) => success(StatusCode::CREATED, view),
        Err(err) => table_error(err),
    }
}

pub async fn player_action(
    tables: Arc<TableManager>,
    table_id: u64,
    request: PlayerActionRequest,
) -> Response {
    match tables.action(
        table_id,
        request.player_id,
        request.action,
        &request.action_id,
        now_ms(),
    ) {
        Ok(view) => success(StatusCode::ACCEPTED, view),
        Err(err) => table_error(err),
    }
}

pub async fn claim_timeout(tables: Arc<TableManager>, table_id: u64) -> Response {
    match tables.claim_timeout(table_id, now_ms()) {
        Ok(view) => success(StatusCode::ACCEPTED, view),
        Err(err) => table_error(err),
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub async fn get_table_state(
    tables: Arc<TableManager>,
    table_id: u64,
    viewer: Option<u64>,
) -> Response {
    match tables.get_state(table_id, viewer) {
        Ok(view) => success(StatusCode::OK, view),
        Err(err) => table_error(err),
    }
}

pub async fn reset_table(tables: Arc<TableManager>, table_id: u64) -> Response {
    match tables.reset(table_id) {
        Ok(()) => reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(err) => table_error(err),
    }
}

fn success<T: Serialize>(status: StatusCode, body: T) -> Response {
    reply::with_status(reply::json(&body), status).into_response()
}

fn table_error(err: TableError) -> Response {
    err.into_http_response()
}
