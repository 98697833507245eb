//! Item handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use primer_api_types::NewItemRequest;
use uuid::Uuid;

use crate::application::fingerprint::Fingerprint;
use crate::application::items::{CreateItemCommand, UpdateItemCommand};
use crate::application::pagination::PageRequest;

use super::ItemListQuery;
use crate::infra::http::api::conditional::{if_match, respond_conditionally};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{collection_model, item_location, item_model};
use crate::infra::http::api::state::ApiState;

pub async fn list_items(
    State(state): State<ApiState>,
    headers: HeaderMap,
    query: Result<Query<ItemListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let request = PageRequest::from_query(query.page, query.size, query.sort.as_deref())
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let page = state.items.find_all(&request).await?;
    let fingerprint =
        Fingerprint::of_page(&page).map_err(|err| ApiError::internal(err.to_string()))?;

    Ok(respond_conditionally(
        &headers,
        &fingerprint,
        state.http_cache,
        || collection_model(&page, &request),
    ))
}

pub async fn get_item(
    State(state): State<ApiState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(id)?;
    let item = state.items.get_by_id(id).await?;
    let fingerprint = Fingerprint::of_item(&item);

    Ok(respond_conditionally(
        &headers,
        &fingerprint,
        state.http_cache,
        || item_model(&item),
    ))
}

pub async fn create_item(
    State(state): State<ApiState>,
    payload: Result<Json<NewItemRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|err| ApiError::bad_request(err.body_text()))?;

    let item = state
        .items
        .create(CreateItemCommand {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    let location = HeaderValue::from_str(&item_location(item.id))
        .map_err(|err| ApiError::internal(err.to_string()))?;
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

pub async fn update_item(
    State(state): State<ApiState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<NewItemRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(id)?;
    let Json(payload) = payload.map_err(|err| ApiError::bad_request(err.body_text()))?;

    let expected_version = match if_match(&headers) {
        Some(tag) => {
            let current = state.items.get_by_id(id).await?;
            if !Fingerprint::of_item(&current).matches(Some(tag)) {
                return Err(ApiError::precondition_failed());
            }
            Some(current.version)
        }
        None => None,
    };

    state
        .items
        .update(
            id,
            UpdateItemCommand {
                name: payload.name,
                description: payload.description,
                expected_version,
            },
        )
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete_item(
    State(state): State<ApiState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(id)?;
    state.items.delete(id).await?;
    Ok(StatusCode::OK)
}

fn parse_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|err| ApiError::bad_request(err.body_text()))
}
