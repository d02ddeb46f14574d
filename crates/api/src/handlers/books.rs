//! Book catalog handlers
//!
//! Public list/detail only ever see APPROVED books; creation and editing
//! are admin operations and books always start PENDING.

use crate::extract::AdminUser;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use maktaba_common::{
    db::models::Book,
    db::repository::{BookFilters, BookInput, BookSummary},
    errors::{AppError, Result},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub rating: Option<f64>,
    pub category: Option<Uuid>,
    pub subgenre: Option<Uuid>,
    pub tag: Option<Uuid>,
    pub publisher: Option<String>,
    pub translator: Option<String>,
    pub year: Option<i32>,
    pub book_length: Option<String>,
    pub original_language: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Serialize)]
pub struct ListBooksResponse {
    pub books: Vec<BookSummary>,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(min = 1, max = 200))]
    pub author: String,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    pub publisher: Option<String>,
    pub translator: Option<String>,
    pub original_language: Option<String>,
    pub published_year: Option<i32>,

    #[validate(range(min = 1, max = 20000))]
    pub page_count: Option<i32>,

    pub cover_url: Option<String>,
    pub category_id: Option<Uuid>,

    #[serde(default)]
    pub subgenre_ids: Vec<Uuid>,

    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

impl From<BookRequest> for BookInput {
    fn from(r: BookRequest) -> Self {
        BookInput {
            title: r.title,
            author: r.author,
            description: r.description,
            publisher: r.publisher,
            translator: r.translator,
            original_language: r.original_language,
            published_year: r.published_year,
            page_count: r.page_count,
            cover_url: r.cover_url,
            category_id: r.category_id,
            subgenre_ids: r.subgenre_ids,
            tag_ids: r.tag_ids,
        }
    }
}

#[derive(Serialize)]
pub struct BookDetailResponse {
    #[serde(flatten)]
    pub book: Book,
    pub category_name_ar: Option<String>,
    pub category_name_en: Option<String>,
    pub subgenres: Vec<NamedRef>,
    pub tags: Vec<NamedRef>,
    pub avg_rating: f64,
    pub review_count: i64,
}

#[derive(Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

/// Public book listing with catalog filters
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<ListBooksResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let filters = BookFilters {
        q: query.q,
        sort: query.sort,
        min_rating: query.rating,
        category: query.category,
        subgenre: query.subgenre,
        tag: query.tag,
        publisher: query.publisher,
        translator: query.translator,
        year: query.year,
        book_length: query.book_length,
        original_language: query.original_language,
        limit,
        offset,
    };

    let books = state.repo.list_public_books(&filters).await?;

    Ok(Json(ListBooksResponse {
        books,
        limit,
        offset,
    }))
}

/// Public book detail; 404 unless the book is APPROVED
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookDetailResponse>> {
    let book = state
        .repo
        .find_public_book(book_id)
        .await?
        .ok_or_else(|| AppError::BookNotFound {
            id: book_id.to_string(),
        })?;

    let category = match book.category_id {
        Some(id) => state.repo.find_category(id).await?,
        None => None,
    };

    let subgenres = state
        .repo
        .subgenres_for_book(book_id)
        .await?
        .into_iter()
        // Bilingual lookup rows; the client picks by preferred language,
        // the English name doubles as the canonical one here
        .map(|s| NamedRef {
            id: s.id,
            name: s.name_en,
        })
        .collect();

    let tags = state
        .repo
        .tags_for_book(book_id)
        .await?
        .into_iter()
        .map(|t| NamedRef {
            id: t.id,
            name: t.name,
        })
        .collect();

    let (avg_rating, review_count) = state.repo.rating_summary(book_id).await?;

    Ok(Json(BookDetailResponse {
        book,
        category_name_ar: category.as_ref().map(|c| c.name_ar.clone()),
        category_name_en: category.map(|c| c.name_en),
        subgenres,
        tags,
        avg_rating,
        review_count,
    }))
}

/// Create a PENDING book with its subgenre/tag junctions (admin)
pub async fn create_book(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<BookRequest>,
) -> Result<(StatusCode, Json<Book>)> {
    request.validate()?;

    let book = state.repo.create_book(request.into(), admin.id).await?;

    tracing::info!(book_id = %book.id, title = %book.title, "Book submitted");

    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book's fields and junctions (admin)
pub async fn update_book(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(book_id): Path<Uuid>,
    Json(request): Json<BookRequest>,
) -> Result<Json<Book>> {
    request.validate()?;

    let book = state.repo.update_book(book_id, request.into()).await?;

    Ok(Json(book))
}

/// Hard-delete a book and its dependents (admin)
pub async fn delete_book(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(book_id): Path<Uuid>,
) -> Result<StatusCode> {
    let deleted = state.repo.delete_book_cascade(book_id).await?;
    if !deleted {
        return Err(AppError::BookNotFound {
            id: book_id.to_string(),
        });
    }

    tracing::info!(book_id = %book_id, admin_id = %admin.id, "Book deleted");

    Ok(StatusCode::NO_CONTENT)
}
