use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::scope::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::lists::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::navigator::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::pages::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::insights::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
