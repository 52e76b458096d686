// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Expense CRUD endpoints. Every route requires a bearer token and only ever
//! touches the caller's own records.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::{Auth, AuthenticatedUser},
    error::ApiError,
    models::{
        is_valid_amount, parse_expense_date, CreateExpenseRequest, DeletedExpense,
        UpdateExpenseRequest,
    },
    state::AppState,
    storage::{ExpenseRepository, OwnershipCheck, StoredExpense, DEFAULT_CATEGORY},
};

const MISSING_FIELDS: &str = "Please add all required fields";
const INVALID_AMOUNT: &str = "Amount must be greater than 0";
const INVALID_DATE: &str = "Please add a valid date";

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's expenses, newest first", body = [StoredExpense]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_expenses(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredExpense>>, ApiError> {
    let storage = state.storage.read().await;
    let expenses = ExpenseRepository::new(&storage).list_by_owner(&user.user_id)?;
    tracing::debug!(user_id = %user.user_id, count = expenses.len(), "listed expenses");
    Ok(Json(expenses))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = CreateExpenseRequest,
    tag = "Expenses",
    security(("bearer" = [])),
    responses(
        (status = 201, body = StoredExpense),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_expense(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<StoredExpense>), ApiError> {
    let expense = new_expense(&user, request)?;

    let storage = state.storage.write().await;
    ExpenseRepository::new(&storage).create(&expense)?;
    tracing::debug!(user_id = %user.user_id, expense_id = %expense.id, "created expense");

    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    params(("id" = String, Path, description = "Identifier of the expense to update")),
    request_body = UpdateExpenseRequest,
    tag = "Expenses",
    security(("bearer" = [])),
    responses(
        (status = 200, body = StoredExpense),
        (status = 400, description = "Invalid field value"),
        (status = 401, description = "Not authorized or not the owner"),
        (status = 404, description = "Expense not found")
    )
)]
pub async fn update_expense(
    Auth(user): Auth,
    Path(expense_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Result<Json<StoredExpense>, ApiError> {
    let storage = state.storage.write().await;
    let repo = ExpenseRepository::new(&storage);

    let mut expense = repo.get(&expense_id).verify_owner(&user)?;
    apply_update(&mut expense, request)?;
    repo.update(&expense)?;

    Ok(Json(expense))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    params(("id" = String, Path, description = "Identifier of the expense to delete")),
    tag = "Expenses",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DeletedExpense),
        (status = 401, description = "Not authorized or not the owner"),
        (status = 404, description = "Expense not found")
    )
)]
pub async fn delete_expense(
    Auth(user): Auth,
    Path(expense_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeletedExpense>, ApiError> {
    let storage = state.storage.write().await;
    let repo = ExpenseRepository::new(&storage);

    repo.get(&expense_id).verify_owner(&user)?;
    repo.delete(&expense_id)?;

    Ok(Json(DeletedExpense { id: expense_id }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn new_expense(
    user: &AuthenticatedUser,
    request: CreateExpenseRequest,
) -> Result<StoredExpense, ApiError> {
    let (Some(title), Some(amount), Some(raw_date)) =
        (non_blank(request.title), request.amount, request.date)
    else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    if !is_valid_amount(amount) {
        return Err(ApiError::bad_request(INVALID_AMOUNT));
    }
    let date = parse_expense_date(&raw_date).ok_or_else(|| ApiError::bad_request(INVALID_DATE))?;

    let now = Utc::now();
    Ok(StoredExpense {
        id: Uuid::new_v4().simple().to_string(),
        user: user.user_id.clone(),
        title,
        amount,
        category: non_blank(request.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        date,
        notes: request.notes.unwrap_or_default(),
        receipt: request.receipt.filter(|r| !r.is_empty()),
        created_at: now,
        updated_at: now,
    })
}

fn apply_update(expense: &mut StoredExpense, request: UpdateExpenseRequest) -> Result<(), ApiError> {
    if let Some(title) = request.title {
        expense.title = non_blank(Some(title)).ok_or_else(|| ApiError::bad_request("Please add a title"))?;
    }
    if let Some(amount) = request.amount {
        if !is_valid_amount(amount) {
            return Err(ApiError::bad_request(INVALID_AMOUNT));
        }
        expense.amount = amount;
    }
    if let Some(category) = request.category {
        expense.category = non_blank(Some(category)).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    }
    if let Some(raw_date) = request.date {
        expense.date = parse_expense_date(&raw_date).ok_or_else(|| ApiError::bad_request(INVALID_DATE))?;
    }
    if let Some(notes) = request.notes {
        expense.notes = notes;
    }
    if let Some(receipt) = request.receipt {
        expense.receipt = receipt.filter(|r| !r.is_empty());
    }
    expense.updated_at = Utc::now();
    Ok(())
}
