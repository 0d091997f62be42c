//! Repository for the `requests` table.
//!
//! Status changes are single conditional `UPDATE`s guarded on the current
//! status (and, where relevant, the acting party). A transition that loses a
//! race matches zero rows and returns `None`; the caller re-reads the row to
//! decide between "not found" and "wrong state".

use errand_core::lifecycle::{rule_for, RequestAction, RequestStatus, CATEGORY_OTHER};
use errand_core::types::DbId;
use sqlx::postgres::PgExecutor;

use crate::models::request::{CreateRequest, OpenRequestFilter, Request};

/// Column list for `requests` queries.
const COLUMNS: &str = "\
    id, requester_id, fulfiller_id, cancelled_fulfiller_id, \
    item_name, description, quantity, expected_price, deadline, \
    delivery_location, is_urgent, category, status_id, \
    completed_at, cancelled_at, created_at, updated_at";

/// Default page size for the open-request board.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for the open-request board.
const MAX_LIMIT: i64 = 100;

/// Persistence for delivery requests and their status transitions.
pub struct RequestRepo;

impl RequestRepo {
    // -----------------------------------------------------------------------
    // Create / read
    // -----------------------------------------------------------------------

    /// Insert a new request in `pending` status.
    pub async fn create<'e, E>(
        executor: E,
        requester_id: DbId,
        input: &CreateRequest,
    ) -> Result<Request, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO requests (\
                requester_id, item_name, description, quantity, expected_price, \
                deadline, delivery_location, is_urgent, category, status_id\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(requester_id)
            .bind(&input.item_name)
            .bind(input.description.as_deref())
            .bind(input.quantity.unwrap_or(1))
            .bind(input.expected_price)
            .bind(input.deadline)
            .bind(&input.delivery_location)
            .bind(input.is_urgent.unwrap_or(false))
            .bind(input.category.as_deref().unwrap_or(CATEGORY_OTHER))
            .bind(RequestStatus::Pending.id())
            .fetch_one(executor)
            .await
    }

    /// Find a request by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Requests that are not yet terminal, urgent first then newest first.
    pub async fn list_open<'e, E>(
        executor: E,
        filter: &OpenRequestFilter,
    ) -> Result<Vec<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = filter.offset.unwrap_or(0).max(0);

        let mut conditions = vec!["status_id NOT IN ($1, $2)".to_string()];
        let mut bind_idx = 3u32;

        if filter.category.is_some() {
            conditions.push(format!("category = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.urgent_only == Some(true) {
            conditions.push("is_urgent".to_string());
        }
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));
        if search.is_some() {
            conditions.push(format!(
                "(item_name ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE {} \
             ORDER BY is_urgent DESC, created_at DESC, id DESC \
             LIMIT ${} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx,
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Request>(&query)
            .bind(RequestStatus::Completed.id())
            .bind(RequestStatus::Cancelled.id());
        if let Some(category) = &filter.category {
            q = q.bind(category);
        }
        if let Some(pattern) = &search {
            q = q.bind(pattern);
        }
        q.bind(limit).bind(offset).fetch_all(executor).await
    }

    /// Requests created by `requester_id`, newest first.
    pub async fn list_for_requester<'e, E>(
        executor: E,
        requester_id: DbId,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE requester_id = $1 AND ($2::SMALLINT IS NULL OR status_id = $2) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(requester_id)
            .bind(status.map(RequestStatus::id))
            .fetch_all(executor)
            .await
    }

    /// Requests currently or previously fulfilled by `fulfiller_id`, newest first.
    pub async fn list_for_fulfiller<'e, E>(
        executor: E,
        fulfiller_id: DbId,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM requests \
             WHERE (fulfiller_id = $1 OR cancelled_fulfiller_id = $1) \
               AND ($2::SMALLINT IS NULL OR status_id = $2) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(fulfiller_id)
            .bind(status.map(RequestStatus::id))
            .fetch_all(executor)
            .await
    }

    // -----------------------------------------------------------------------
    // Guarded transitions
    // -----------------------------------------------------------------------

    /// Claim a pending request for `fulfiller_id`.
    ///
    /// Exactly one of any number of concurrent claims matches the row.
    pub async fn claim<'e, E>(
        executor: E,
        id: DbId,
        fulfiller_id: DbId,
    ) -> Result<Option<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rule = rule_for(RequestAction::Accept);
        let query = format!(
            "UPDATE requests \
             SET status_id = $3, fulfiller_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($4) AND fulfiller_id IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(fulfiller_id)
            .bind(rule.to.id())
            .bind(rule.from_ids())
            .fetch_optional(executor)
            .await
    }

    /// Mark an accepted request delivered by its assigned fulfiller.
    pub async fn complete<'e, E>(
        executor: E,
        id: DbId,
        fulfiller_id: DbId,
    ) -> Result<Option<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rule = rule_for(RequestAction::Deliver);
        let query = format!(
            "UPDATE requests \
             SET status_id = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND fulfiller_id = $2 AND status_id = ANY($4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(fulfiller_id)
            .bind(rule.to.id())
            .bind(rule.from_ids())
            .fetch_optional(executor)
            .await
    }

    /// Cancel a request on behalf of its requester.
    ///
    /// An assigned fulfiller is moved to `cancelled_fulfiller_id`.
    pub async fn cancel_by_requester<'e, E>(
        executor: E,
        id: DbId,
        requester_id: DbId,
    ) -> Result<Option<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rule = rule_for(RequestAction::Cancel);
        Self::cancel_guarded(executor, id, "requester_id", requester_id, rule.to, &rule.from_ids())
            .await
    }

    /// Withdraw the assigned fulfiller from an accepted request.
    pub async fn release_by_fulfiller<'e, E>(
        executor: E,
        id: DbId,
        fulfiller_id: DbId,
    ) -> Result<Option<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rule = rule_for(RequestAction::CancelDelivery);
        Self::cancel_guarded(executor, id, "fulfiller_id", fulfiller_id, rule.to, &rule.from_ids())
            .await
    }

    async fn cancel_guarded<'e, E>(
        executor: E,
        id: DbId,
        party_column: &'static str,
        party_id: DbId,
        to: RequestStatus,
        from: &[i16],
    ) -> Result<Option<Request>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE requests \
             SET status_id = $3, \
                 cancelled_fulfiller_id = fulfiller_id, \
                 fulfiller_id = NULL, \
                 cancelled_at = NOW(), \
                 updated_at = NOW() \
             WHERE id = $1 AND {party_column} = $2 AND status_id = ANY($4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(party_id)
            .bind(to.id())
            .bind(from)
            .fetch_optional(executor)
            .await
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
