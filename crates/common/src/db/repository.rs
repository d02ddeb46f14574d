//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::moderation::{BookStatus, ModerationStamp};
use crate::reviews::{ReplyRow, ReviewRow};
use crate::text;
use crate::IS_LIKED_ANONYMOUS;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, Statement,
    TransactionTrait, Value,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newest-first scan window for suggestion candidates
const SUGGEST_CANDIDATE_CAP: u64 = 2000;

/// Filters accepted by the public book listing
#[derive(Debug, Clone, Default)]
pub struct BookFilters {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub min_rating: Option<f64>,
    pub category: Option<Uuid>,
    pub subgenre: Option<Uuid>,
    pub tag: Option<Uuid>,
    pub publisher: Option<String>,
    pub translator: Option<String>,
    pub year: Option<i32>,
    pub book_length: Option<String>,
    pub original_language: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// A book row from the public listing query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub published_year: Option<i32>,
    pub page_count: Option<i32>,
    pub category_id: Option<Uuid>,
    pub avg_rating: f64,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A highlight row annotated with like state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightRow {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub text_content: Option<String>,
    pub image_url: Option<String>,
    pub like_count: i64,
    /// -1 anonymous caller, 0 not liked, 1 liked
    pub is_liked: i8,
    pub created_at: DateTime<Utc>,
}

/// A shelf row joined with its (approved) book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfRow {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

/// A user reference for follower/following lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// An autocomplete suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
}

/// Fields accepted when creating or updating a book
#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub translator: Option<String>,
    pub original_language: Option<String>,
    pub published_year: Option<i32>,
    pub page_count: Option<i32>,
    pub cover_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub subgenre_ids: Vec<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a new user account
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        password_hash: String,
        preferred_language: String,
    ) -> Result<User> {
        let existing = UserEntity::find()
            .filter(
                UserColumn::Username
                    .eq(username.clone())
                    .or(UserColumn::Email.eq(email.clone())),
            )
            .one(self.write_conn())
            .await?;

        if existing.is_some() {
            return Err(AppError::DuplicateUser);
        }

        let now = chrono::Utc::now();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            bio: Set(None),
            avatar_url: Set(None),
            preferred_language: Set(preferred_language),
            role: Set(UserRole::User.as_str().to_string()),
            created_at: Set(now.into()),
        };

        user.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by username or email (login identifier)
    pub async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(
                UserColumn::Username
                    .eq(identifier)
                    .or(UserColumn::Email.eq(identifier)),
            )
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Book Operations
    // ========================================================================

    /// Create a book (PENDING) with its junction rows in one transaction
    pub async fn create_book(&self, input: BookInput, submitted_by: Uuid) -> Result<Book> {
        let book_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let txn = self.write_conn().begin().await?;

        let book = BookActiveModel {
            id: Set(book_id),
            title: Set(input.title),
            author: Set(input.author),
            description: Set(input.description),
            publisher: Set(input.publisher),
            translator: Set(input.translator),
            original_language: Set(input.original_language),
            published_year: Set(input.published_year),
            page_count: Set(input.page_count),
            cover_url: Set(input.cover_url),
            category_id: Set(input.category_id),
            status: Set(BookStatus::Pending.as_str().to_string()),
            rejection_reason: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            submitted_by: Set(submitted_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let book = book.insert(&txn).await?;

        Self::insert_junctions(&txn, book_id, &input.subgenre_ids, &input.tag_ids).await?;

        txn.commit().await?;
        Ok(book)
    }

    /// Update a book's fields and rewrite its junction rows in one transaction
    pub async fn update_book(&self, book_id: Uuid, input: BookInput) -> Result<Book> {
        let now = chrono::Utc::now();

        let txn = self.write_conn().begin().await?;

        let mut book: BookActiveModel = BookEntity::find_by_id(book_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::BookNotFound {
                id: book_id.to_string(),
            })?
            .into();

        book.title = Set(input.title);
        book.author = Set(input.author);
        book.description = Set(input.description);
        book.publisher = Set(input.publisher);
        book.translator = Set(input.translator);
        book.original_language = Set(input.original_language);
        book.published_year = Set(input.published_year);
        book.page_count = Set(input.page_count);
        book.cover_url = Set(input.cover_url);
        book.category_id = Set(input.category_id);
        book.updated_at = Set(now.into());

        let book = book.update(&txn).await?;

        BookSubgenreEntity::delete_many()
            .filter(BookSubgenreColumn::BookId.eq(book_id))
            .exec(&txn)
            .await?;
        BookTagEntity::delete_many()
            .filter(BookTagColumn::BookId.eq(book_id))
            .exec(&txn)
            .await?;

        Self::insert_junctions(&txn, book_id, &input.subgenre_ids, &input.tag_ids).await?;

        txn.commit().await?;
        Ok(book)
    }

    async fn insert_junctions<C: ConnectionTrait>(
        conn: &C,
        book_id: Uuid,
        subgenre_ids: &[Uuid],
        tag_ids: &[Uuid],
    ) -> Result<()> {
        for &subgenre_id in subgenre_ids {
            let row = BookSubgenreActiveModel {
                book_id: Set(book_id),
                subgenre_id: Set(subgenre_id),
            };
            row.insert(conn).await?;
        }

        for &tag_id in tag_ids {
            let row = BookTagActiveModel {
                book_id: Set(book_id),
                tag_id: Set(tag_id),
            };
            row.insert(conn).await?;
        }

        Ok(())
    }

    /// Hard-delete a book and everything hanging off it, in one transaction
    pub async fn delete_book_cascade(&self, book_id: Uuid) -> Result<bool> {
        let txn = self.write_conn().begin().await?;

        let exists = BookEntity::find_by_id(book_id).one(&txn).await?.is_some();
        if !exists {
            return Ok(false);
        }

        // Dependents first; review likes and replies hang off reviews
        let statements = [
            "DELETE FROM review_likes WHERE review_id IN (SELECT id FROM reviews WHERE book_id = $1)",
            "DELETE FROM review_replies WHERE review_id IN (SELECT id FROM reviews WHERE book_id = $1)",
            "DELETE FROM reviews WHERE book_id = $1",
            "DELETE FROM highlight_likes WHERE highlight_id IN (SELECT id FROM highlights WHERE book_id = $1)",
            "DELETE FROM highlights WHERE book_id = $1",
            "DELETE FROM book_subgenres WHERE book_id = $1",
            "DELETE FROM book_tags WHERE book_id = $1",
            "DELETE FROM shelves WHERE book_id = $1",
            "DELETE FROM books WHERE id = $1",
        ];

        for sql in statements {
            let stmt =
                Statement::from_sql_and_values(DbBackend::Postgres, sql, vec![book_id.into()]);
            txn.execute(stmt).await?;
        }

        txn.commit().await?;
        Ok(true)
    }

    /// Find book by ID, regardless of status (admin surface)
    pub async fn find_book_by_id(&self, id: Uuid) -> Result<Option<Book>> {
        BookEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a book through the public gate: APPROVED only
    pub async fn find_public_book(&self, id: Uuid) -> Result<Option<Book>> {
        let book = self.find_book_by_id(id).await?;
        Ok(book.filter(|b| b.is_public()))
    }

    /// Public listing with filters; only APPROVED books are visible
    pub async fn list_public_books(&self, filters: &BookFilters) -> Result<Vec<BookSummary>> {
        let mut values: Vec<Value> = Vec::new();
        let mut conditions = String::new();

        let push = |values: &mut Vec<Value>, v: Value| -> String {
            values.push(v);
            format!("${}", values.len())
        };

        if let Some(ref q) = filters.q {
            let pattern = format!("%{}%", q);
            let p = push(&mut values, pattern.into());
            conditions.push_str(&format!(
                " AND (b.title ILIKE {p} OR b.author ILIKE {p})",
                p = p
            ));
        }

        if let Some(category) = filters.category {
            let p = push(&mut values, category.into());
            conditions.push_str(&format!(" AND b.category_id = {}", p));
        }

        if let Some(subgenre) = filters.subgenre {
            let p = push(&mut values, subgenre.into());
            conditions.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM book_subgenres bs WHERE bs.book_id = b.id AND bs.subgenre_id = {})",
                p
            ));
        }

        if let Some(tag) = filters.tag {
            let p = push(&mut values, tag.into());
            conditions.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM book_tags bt WHERE bt.book_id = b.id AND bt.tag_id = {})",
                p
            ));
        }

        if let Some(ref publisher) = filters.publisher {
            let p = push(&mut values, publisher.clone().into());
            conditions.push_str(&format!(" AND b.publisher = {}", p));
        }

        if let Some(ref translator) = filters.translator {
            let p = push(&mut values, translator.clone().into());
            conditions.push_str(&format!(" AND b.translator = {}", p));
        }

        if let Some(year) = filters.year {
            let p = push(&mut values, year.into());
            conditions.push_str(&format!(" AND b.published_year = {}", p));
        }

        if let Some(ref language) = filters.original_language {
            let p = push(&mut values, language.clone().into());
            conditions.push_str(&format!(" AND b.original_language = {}", p));
        }

        // Page-count bands: short < 200, medium 200-500, long > 500
        match filters.book_length.as_deref() {
            Some("short") => conditions.push_str(" AND b.page_count < 200"),
            Some("medium") => conditions.push_str(" AND b.page_count BETWEEN 200 AND 500"),
            Some("long") => conditions.push_str(" AND b.page_count > 500"),
            _ => {}
        }

        if let Some(min_rating) = filters.min_rating {
            let p = push(&mut values, min_rating.into());
            conditions.push_str(&format!(" AND COALESCE(agg.avg_rating, 0) >= {}", p));
        }

        let order = match filters.sort.as_deref() {
            Some("rating") => "COALESCE(agg.avg_rating, 0) DESC, b.created_at DESC",
            Some("title") => "b.title ASC",
            _ => "b.created_at DESC",
        };

        let limit = push(&mut values, (filters.limit as i64).into());
        let offset = push(&mut values, (filters.offset as i64).into());

        let sql = format!(
            r#"
            SELECT
                b.id,
                b.title,
                b.author,
                b.cover_url,
                b.published_year,
                b.page_count,
                b.category_id,
                COALESCE(agg.avg_rating, 0)::float8 AS avg_rating,
                COALESCE(agg.review_count, 0) AS review_count,
                b.created_at
            FROM books b
            LEFT JOIN (
                SELECT book_id, AVG(rating)::float8 AS avg_rating, COUNT(*) AS review_count
                FROM reviews
                WHERE is_deleted = FALSE
                GROUP BY book_id
            ) agg ON agg.book_id = b.id
            WHERE b.status = 'APPROVED'
            {}
            ORDER BY {}
            LIMIT {} OFFSET {}
            "#,
            conditions, order, limit, offset
        );

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, &sql, values);

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(BookSummary {
                    id: row.try_get_by_index::<Uuid>(0).ok()?,
                    title: row.try_get_by_index::<String>(1).ok()?,
                    author: row.try_get_by_index::<String>(2).ok()?,
                    cover_url: row.try_get_by_index::<Option<String>>(3).ok()?,
                    published_year: row.try_get_by_index::<Option<i32>>(4).ok()?,
                    page_count: row.try_get_by_index::<Option<i32>>(5).ok()?,
                    category_id: row.try_get_by_index::<Option<Uuid>>(6).ok()?,
                    avg_rating: row.try_get_by_index::<f64>(7).ok()?,
                    review_count: row.try_get_by_index::<i64>(8).ok()?,
                    created_at: row.try_get_by_index::<DateTime<Utc>>(9).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    /// Admin moderation queue, filtered by status; `offset` is a row
    /// offset, not a page index
    pub async fn list_books_by_status(
        &self,
        status: BookStatus,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Book>, u64)> {
        let total = BookEntity::find()
            .filter(BookColumn::Status.eq(status.as_str()))
            .count(self.read_conn())
            .await?;

        let books = Self::moderation_queue_query(status, limit, offset)
            .all(self.read_conn())
            .await?;

        Ok((books, total))
    }

    fn moderation_queue_query(status: BookStatus, limit: u64, offset: u64) -> Select<BookEntity> {
        BookEntity::find()
            .filter(BookColumn::Status.eq(status.as_str()))
            .order_by_desc(BookColumn::CreatedAt)
            .limit(limit)
            .offset(offset)
    }

    /// Apply a moderation decision to a book row
    pub async fn apply_moderation(&self, book_id: Uuid, stamp: ModerationStamp) -> Result<Book> {
        let now = chrono::Utc::now();

        let mut book: BookActiveModel = BookEntity::find_by_id(book_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::BookNotFound {
                id: book_id.to_string(),
            })?
            .into();

        book.status = Set(stamp.status.as_str().to_string());
        book.approved_by = Set(stamp.approved_by);
        book.approved_at = Set(stamp.approved_at.map(Into::into));
        book.rejection_reason = Set(stamp.rejection_reason);
        book.updated_at = Set(now.into());

        book.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Rating summary for a book detail view
    pub async fn rating_summary(&self, book_id: Uuid) -> Result<(f64, i64)> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT COALESCE(AVG(rating), 0)::float8, COUNT(*)
            FROM reviews
            WHERE book_id = $1 AND is_deleted = FALSE
            "#,
            vec![book_id.into()],
        );

        let row = self.read_conn().query_one(stmt).await?;
        match row {
            Some(row) => Ok((
                row.try_get_by_index::<f64>(0).unwrap_or(0.0),
                row.try_get_by_index::<i64>(1).unwrap_or(0),
            )),
            None => Ok((0.0, 0)),
        }
    }

    /// Subgenres attached to a book
    pub async fn subgenres_for_book(&self, book_id: Uuid) -> Result<Vec<Subgenre>> {
        let junctions = BookSubgenreEntity::find()
            .filter(BookSubgenreColumn::BookId.eq(book_id))
            .all(self.read_conn())
            .await?;

        let ids: Vec<Uuid> = junctions.iter().map(|j| j.subgenre_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        SubgenreEntity::find()
            .filter(SubgenreColumn::Id.is_in(ids))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Tags attached to a book
    pub async fn tags_for_book(&self, book_id: Uuid) -> Result<Vec<Tag>> {
        let junctions = BookTagEntity::find()
            .filter(BookTagColumn::BookId.eq(book_id))
            .all(self.read_conn())
            .await?;

        let ids: Vec<Uuid> = junctions.iter().map(|j| j.tag_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        TagEntity::find()
            .filter(TagColumn::Id.is_in(ids))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find the category for a book detail view
    pub async fn find_category(&self, id: Uuid) -> Result<Option<Category>> {
        CategoryEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Arabic-aware title/author suggestions over approved books.
    ///
    /// LIKE cannot see through tashkeel or hamza variants, so id/title/author
    /// tuples are fetched and matched against the normalized query in
    /// process. Only the newest `SUGGEST_CANDIDATE_CAP` approved rows are
    /// scanned; entries older than the cap are never suggested.
    pub async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let candidates: Vec<(Uuid, String, String)> = Self::suggest_candidates_query()
            .into_tuple()
            .all(self.read_conn())
            .await?;

        let suggestions = candidates
            .into_iter()
            .filter(|(_, title, author)| {
                text::matches_suggestion(title, query) || text::matches_suggestion(author, query)
            })
            .take(limit)
            .map(|(book_id, title, author)| Suggestion {
                book_id,
                title,
                author,
            })
            .collect();

        Ok(suggestions)
    }

    fn suggest_candidates_query() -> Select<BookEntity> {
        BookEntity::find()
            .select_only()
            .column(BookColumn::Id)
            .column(BookColumn::Title)
            .column(BookColumn::Author)
            .filter(BookColumn::Status.eq(BookStatus::Approved.as_str()))
            .order_by_desc(BookColumn::CreatedAt)
            .limit(SUGGEST_CANDIDATE_CAP)
    }

    // ========================================================================
    // Review Operations
    // ========================================================================

    /// Create a review; at most one non-deleted review per (user, book)
    pub async fn create_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> Result<Review> {
        let existing = ReviewEntity::find()
            .filter(ReviewColumn::BookId.eq(book_id))
            .filter(ReviewColumn::UserId.eq(user_id))
            .filter(ReviewColumn::IsDeleted.eq(false))
            .one(self.write_conn())
            .await?;

        if existing.is_some() {
            return Err(AppError::DuplicateReview);
        }

        let now = chrono::Utc::now();
        let review = ReviewActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book_id),
            user_id: Set(user_id),
            rating: Set(rating),
            comment: Set(comment),
            is_deleted: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        review.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find review by ID
    pub async fn find_review_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        ReviewEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Update a review's rating and comment (ownership checked upstream)
    pub async fn update_review(
        &self,
        review_id: Uuid,
        rating: i16,
        comment: Option<String>,
    ) -> Result<Review> {
        let now = chrono::Utc::now();

        let mut review: ReviewActiveModel = ReviewEntity::find_by_id(review_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ReviewNotFound {
                id: review_id.to_string(),
            })?
            .into();

        review.rating = Set(rating);
        review.comment = Set(comment);
        review.updated_at = Set(now.into());

        review.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Soft-delete a review
    pub async fn soft_delete_review(&self, review_id: Uuid) -> Result<Review> {
        let now = chrono::Utc::now();

        let mut review: ReviewActiveModel = ReviewEntity::find_by_id(review_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ReviewNotFound {
                id: review_id.to_string(),
            })?
            .into();

        review.is_deleted = Set(true);
        review.updated_at = Set(now.into());

        review.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Non-deleted reviews for a book, author joined, like-annotated,
    /// newest first. Unknown book ids simply produce an empty list.
    pub async fn reviews_for_book(
        &self,
        book_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Vec<ReviewRow>> {
        let is_liked_expr = match viewer {
            Some(_) => {
                "CASE WHEN EXISTS (SELECT 1 FROM review_likes l2 \
                 WHERE l2.review_id = r.id AND l2.user_id = $2) THEN 1 ELSE 0 END"
            }
            None => "-1",
        };

        let sql = format!(
            r#"
            SELECT
                r.id,
                r.book_id,
                r.user_id,
                u.username,
                u.avatar_url,
                r.rating,
                r.comment,
                (SELECT COUNT(*) FROM review_likes l WHERE l.review_id = r.id) AS like_count,
                {} AS is_liked,
                r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.book_id = $1 AND r.is_deleted = FALSE
            ORDER BY r.created_at DESC
            "#,
            is_liked_expr
        );

        let mut values: Vec<Value> = vec![book_id.into()];
        if let Some(viewer_id) = viewer {
            values.push(viewer_id.into());
        }

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, &sql, values);

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                let is_liked = match viewer {
                    Some(_) => row.try_get_by_index::<i32>(8).ok()? as i8,
                    None => IS_LIKED_ANONYMOUS,
                };
                Some(ReviewRow {
                    id: row.try_get_by_index::<Uuid>(0).ok()?,
                    book_id: row.try_get_by_index::<Uuid>(1).ok()?,
                    user_id: row.try_get_by_index::<Uuid>(2).ok()?,
                    username: row.try_get_by_index::<String>(3).ok()?,
                    avatar_url: row.try_get_by_index::<Option<String>>(4).ok()?,
                    rating: row.try_get_by_index::<i16>(5).ok()?,
                    comment: row.try_get_by_index::<Option<String>>(6).ok()?,
                    like_count: row.try_get_by_index::<i64>(7).ok()?,
                    is_liked,
                    created_at: row.try_get_by_index::<DateTime<Utc>>(9).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    /// Non-deleted replies for all non-deleted reviews of a book, author
    /// joined, oldest first
    pub async fn replies_for_book(&self, book_id: Uuid) -> Result<Vec<ReplyRow>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT
                p.id,
                p.review_id,
                p.user_id,
                u.username,
                u.avatar_url,
                p.parent_reply_id,
                p.comment,
                p.created_at
            FROM review_replies p
            JOIN users u ON u.id = p.user_id
            WHERE p.is_deleted = FALSE
              AND p.review_id IN (
                  SELECT id FROM reviews WHERE book_id = $1 AND is_deleted = FALSE
              )
            ORDER BY p.created_at ASC
            "#,
            vec![book_id.into()],
        );

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(ReplyRow {
                    id: row.try_get_by_index::<Uuid>(0).ok()?,
                    review_id: row.try_get_by_index::<Uuid>(1).ok()?,
                    user_id: row.try_get_by_index::<Uuid>(2).ok()?,
                    username: row.try_get_by_index::<String>(3).ok()?,
                    avatar_url: row.try_get_by_index::<Option<String>>(4).ok()?,
                    parent_reply_id: row.try_get_by_index::<Option<Uuid>>(5).ok()?,
                    comment: row.try_get_by_index::<String>(6).ok()?,
                    created_at: row.try_get_by_index::<DateTime<Utc>>(7).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    /// Create a reply, optionally nested under a parent of the same review
    pub async fn create_reply(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        parent_reply_id: Option<Uuid>,
        comment: String,
    ) -> Result<ReviewReply> {
        let review = ReviewEntity::find_by_id(review_id)
            .filter(ReviewColumn::IsDeleted.eq(false))
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ReviewNotFound {
                id: review_id.to_string(),
            })?;

        if let Some(parent_id) = parent_reply_id {
            let parent = ReviewReplyEntity::find_by_id(parent_id)
                .one(self.write_conn())
                .await?
                .ok_or_else(|| AppError::ReplyNotFound {
                    id: parent_id.to_string(),
                })?;

            // Forest invariant: a parent must belong to the same review
            if parent.review_id != review.id {
                return Err(AppError::Validation {
                    message: "Parent reply belongs to a different review".to_string(),
                    field: Some("parent_reply_id".to_string()),
                });
            }
        }

        let now = chrono::Utc::now();
        let reply = ReviewReplyActiveModel {
            id: Set(Uuid::new_v4()),
            review_id: Set(review_id),
            user_id: Set(user_id),
            parent_reply_id: Set(parent_reply_id),
            comment: Set(comment),
            is_deleted: Set(false),
            created_at: Set(now.into()),
        };

        reply.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find reply by ID
    pub async fn find_reply_by_id(&self, id: Uuid) -> Result<Option<ReviewReply>> {
        ReviewReplyEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Soft-delete a reply
    pub async fn soft_delete_reply(&self, reply_id: Uuid) -> Result<ReviewReply> {
        let mut reply: ReviewReplyActiveModel = ReviewReplyEntity::find_by_id(reply_id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ReplyNotFound {
                id: reply_id.to_string(),
            })?
            .into();

        reply.is_deleted = Set(true);

        reply.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Toggle the caller's like on a review; returns (liked, like_count)
    pub async fn toggle_review_like(&self, review_id: Uuid, user_id: Uuid) -> Result<(bool, i64)> {
        let review = ReviewEntity::find_by_id(review_id)
            .filter(ReviewColumn::IsDeleted.eq(false))
            .one(self.write_conn())
            .await?;

        if review.is_none() {
            return Err(AppError::ReviewNotFound {
                id: review_id.to_string(),
            });
        }

        let existing = ReviewLikeEntity::find_by_id((review_id, user_id))
            .one(self.write_conn())
            .await?;

        let liked = match existing {
            Some(like) => {
                let like: ReviewLikeActiveModel = like.into();
                like.delete(self.write_conn()).await?;
                false
            }
            None => {
                let like = ReviewLikeActiveModel {
                    review_id: Set(review_id),
                    user_id: Set(user_id),
                    created_at: Set(chrono::Utc::now().into()),
                };
                like.insert(self.write_conn()).await?;
                true
            }
        };

        let count = ReviewLikeEntity::find()
            .filter(ReviewLikeColumn::ReviewId.eq(review_id))
            .count(self.write_conn())
            .await?;

        Ok((liked, count as i64))
    }

    // ========================================================================
    // Highlight Operations
    // ========================================================================

    /// Create a highlight for a book
    pub async fn create_highlight(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        text_content: Option<String>,
        image_url: Option<String>,
    ) -> Result<Highlight> {
        let highlight = HighlightActiveModel {
            id: Set(Uuid::new_v4()),
            book_id: Set(book_id),
            user_id: Set(user_id),
            text_content: Set(text_content),
            image_url: Set(image_url),
            created_at: Set(chrono::Utc::now().into()),
        };

        highlight.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Like-annotated highlights for a book, newest first
    pub async fn highlights_for_book(
        &self,
        book_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Vec<HighlightRow>> {
        let is_liked_expr = match viewer {
            Some(_) => {
                "CASE WHEN EXISTS (SELECT 1 FROM highlight_likes l2 \
                 WHERE l2.highlight_id = h.id AND l2.user_id = $2) THEN 1 ELSE 0 END"
            }
            None => "-1",
        };

        let sql = format!(
            r#"
            SELECT
                h.id,
                h.book_id,
                h.user_id,
                u.username,
                h.text_content,
                h.image_url,
                (SELECT COUNT(*) FROM highlight_likes l WHERE l.highlight_id = h.id) AS like_count,
                {} AS is_liked,
                h.created_at
            FROM highlights h
            JOIN users u ON u.id = h.user_id
            WHERE h.book_id = $1
            ORDER BY h.created_at DESC
            "#,
            is_liked_expr
        );

        let mut values: Vec<Value> = vec![book_id.into()];
        if let Some(viewer_id) = viewer {
            values.push(viewer_id.into());
        }

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, &sql, values);

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                let is_liked = match viewer {
                    Some(_) => row.try_get_by_index::<i32>(7).ok()? as i8,
                    None => IS_LIKED_ANONYMOUS,
                };
                Some(HighlightRow {
                    id: row.try_get_by_index::<Uuid>(0).ok()?,
                    book_id: row.try_get_by_index::<Uuid>(1).ok()?,
                    user_id: row.try_get_by_index::<Uuid>(2).ok()?,
                    username: row.try_get_by_index::<String>(3).ok()?,
                    text_content: row.try_get_by_index::<Option<String>>(4).ok()?,
                    image_url: row.try_get_by_index::<Option<String>>(5).ok()?,
                    like_count: row.try_get_by_index::<i64>(6).ok()?,
                    is_liked,
                    created_at: row.try_get_by_index::<DateTime<Utc>>(8).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    /// Toggle the caller's like on a highlight; returns (liked, like_count)
    pub async fn toggle_highlight_like(
        &self,
        highlight_id: Uuid,
        user_id: Uuid,
    ) -> Result<(bool, i64)> {
        let highlight = HighlightEntity::find_by_id(highlight_id)
            .one(self.write_conn())
            .await?;

        if highlight.is_none() {
            return Err(AppError::HighlightNotFound {
                id: highlight_id.to_string(),
            });
        }

        let existing = HighlightLikeEntity::find_by_id((highlight_id, user_id))
            .one(self.write_conn())
            .await?;

        let liked = match existing {
            Some(like) => {
                let like: HighlightLikeActiveModel = like.into();
                like.delete(self.write_conn()).await?;
                false
            }
            None => {
                let like = HighlightLikeActiveModel {
                    highlight_id: Set(highlight_id),
                    user_id: Set(user_id),
                    created_at: Set(chrono::Utc::now().into()),
                };
                like.insert(self.write_conn()).await?;
                true
            }
        };

        let count = HighlightLikeEntity::find()
            .filter(HighlightLikeColumn::HighlightId.eq(highlight_id))
            .count(self.write_conn())
            .await?;

        Ok((liked, count as i64))
    }

    // ========================================================================
    // Shelf Operations
    // ========================================================================

    /// Upsert a shelf row for (user, book)
    pub async fn upsert_shelf(
        &self,
        user_id: Uuid,
        book_id: Uuid,
        status: ShelfStatus,
    ) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO shelves (user_id, book_id, status, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, book_id) DO UPDATE SET
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
            vec![
                user_id.into(),
                book_id.into(),
                status.as_str().into(),
                chrono::Utc::now().into(),
            ],
        );

        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    /// Remove the shelf row for (user, book); setting status "none"
    pub async fn remove_shelf(&self, user_id: Uuid, book_id: Uuid) -> Result<()> {
        ShelfEntity::delete_many()
            .filter(ShelfColumn::UserId.eq(user_id))
            .filter(ShelfColumn::BookId.eq(book_id))
            .exec(self.write_conn())
            .await?;
        Ok(())
    }

    /// A user's shelf joined with its approved books
    pub async fn shelves_for_user(&self, user_id: Uuid) -> Result<Vec<ShelfRow>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT s.book_id, b.title, b.author, b.cover_url, s.status, s.updated_at
            FROM shelves s
            JOIN books b ON b.id = s.book_id
            WHERE s.user_id = $1 AND b.status = 'APPROVED'
            ORDER BY s.updated_at DESC
            "#,
            vec![user_id.into()],
        );

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(ShelfRow {
                    book_id: row.try_get_by_index::<Uuid>(0).ok()?,
                    title: row.try_get_by_index::<String>(1).ok()?,
                    author: row.try_get_by_index::<String>(2).ok()?,
                    cover_url: row.try_get_by_index::<Option<String>>(3).ok()?,
                    status: row.try_get_by_index::<String>(4).ok()?,
                    updated_at: row.try_get_by_index::<DateTime<Utc>>(5).ok()?,
                })
            })
            .collect();

        Ok(results)
    }

    // ========================================================================
    // Follow Operations
    // ========================================================================

    /// Follow a user; self-follow is 400, duplicate is 409
    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Follow> {
        if follower_id == following_id {
            return Err(AppError::SelfFollow);
        }

        let target = self.find_user_by_id(following_id).await?;
        if target.is_none() {
            return Err(AppError::UserNotFound {
                id: following_id.to_string(),
            });
        }

        let existing = FollowEntity::find_by_id((follower_id, following_id))
            .one(self.write_conn())
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateFollow);
        }

        let follow = FollowActiveModel {
            follower_id: Set(follower_id),
            following_id: Set(following_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        follow.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Remove a follow edge; Ok(false) when it did not exist
    pub async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let result = FollowEntity::delete_by_id((follower_id, following_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Whether `follower_id` follows `following_id`
    pub async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let existing = FollowEntity::find_by_id((follower_id, following_id))
            .one(self.read_conn())
            .await?;
        Ok(existing.is_some())
    }

    /// Follower and following counts for a profile
    pub async fn follow_counts(&self, user_id: Uuid) -> Result<(u64, u64)> {
        let followers = FollowEntity::find()
            .filter(FollowColumn::FollowingId.eq(user_id))
            .count(self.read_conn())
            .await?;

        let following = FollowEntity::find()
            .filter(FollowColumn::FollowerId.eq(user_id))
            .count(self.read_conn())
            .await?;

        Ok((followers, following))
    }

    /// Users following `user_id`
    pub async fn followers_of(&self, user_id: Uuid) -> Result<Vec<UserSummary>> {
        self.follow_edge_users(user_id, true).await
    }

    /// Users that `user_id` follows
    pub async fn following_of(&self, user_id: Uuid) -> Result<Vec<UserSummary>> {
        self.follow_edge_users(user_id, false).await
    }

    async fn follow_edge_users(&self, user_id: Uuid, followers: bool) -> Result<Vec<UserSummary>> {
        let sql = if followers {
            r#"
            SELECT u.id, u.username, u.avatar_url
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.following_id = $1
            ORDER BY f.created_at DESC
            "#
        } else {
            r#"
            SELECT u.id, u.username, u.avatar_url
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            "#
        };

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, vec![user_id.into()]);

        let results = self
            .read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(UserSummary {
                    id: row.try_get_by_index::<Uuid>(0).ok()?,
                    username: row.try_get_by_index::<String>(1).ok()?,
                    avatar_url: row.try_get_by_index::<Option<String>>(2).ok()?,
                })
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QueryTrait;

    #[test]
    fn test_moderation_queue_uses_row_offset() {
        // offset=30 must become OFFSET 30, not get rounded to a page index
        let sql = Repository::moderation_queue_query(BookStatus::Pending, 20, 30)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("LIMIT 20"), "{sql}");
        assert!(sql.contains("OFFSET 30"), "{sql}");
    }

    #[test]
    fn test_moderation_queue_filters_and_orders() {
        let sql = Repository::moderation_queue_query(BookStatus::Rejected, 10, 0)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("'REJECTED'"), "{sql}");
        assert!(sql.contains("ORDER BY \"books\".\"created_at\" DESC"), "{sql}");
    }

    #[test]
    fn test_suggest_candidates_fetch_three_columns() {
        let sql = Repository::suggest_candidates_query()
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("\"books\".\"id\""), "{sql}");
        assert!(sql.contains("\"books\".\"title\""), "{sql}");
        assert!(sql.contains("\"books\".\"author\""), "{sql}");
        assert!(!sql.contains("description"), "{sql}");
        assert!(sql.contains("'APPROVED'"), "{sql}");
    }
}
