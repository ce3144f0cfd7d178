//! Repository for the `lots` table.

use lotmap_core::filter::LotFilter;
use lotmap_core::lot::{LotChanges, NewLot};
use lotmap_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::lot::LotRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, map_id, number, status, price, square_feet, bedrooms, bathrooms, \
     description, amenities, x, y, width, height, outline, created_at, updated_at";

/// Provides CRUD, search and filter queries for lots.
pub struct LotRepo;

impl LotRepo {
    /// Insert a new lot, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewLot) -> Result<LotRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO lots (map_id, number, status, price, square_feet, bedrooms, bathrooms,
                               description, amenities, x, y, width, height, outline)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        let bounds = input.geometry.bounds();
        sqlx::query_as::<_, LotRow>(&query)
            .bind(input.map_id)
            .bind(&input.number)
            .bind(input.status.as_str())
            .bind(input.price)
            .bind(input.square_feet)
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(&input.description)
            .bind(&input.amenities)
            .bind(bounds.x)
            .bind(bounds.y)
            .bind(bounds.width)
            .bind(bounds.height)
            .bind(input.geometry.outline_path())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LotRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lots WHERE id = $1");
        sqlx::query_as::<_, LotRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List lots in insertion order, optionally scoped to one map.
    pub async fn list(pool: &PgPool, map_id: Option<DbId>) -> Result<Vec<LotRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lots
             WHERE ($1::BIGINT IS NULL OR map_id = $1)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, LotRow>(&query)
            .bind(map_id)
            .fetch_all(pool)
            .await
    }

    /// Case-insensitive substring search over number and description.
    ///
    /// `%` and `_` in the query match literally.
    pub async fn search(pool: &PgPool, query_str: &str) -> Result<Vec<LotRow>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(query_str.trim()));
        let query = format!(
            "SELECT {COLUMNS} FROM lots
             WHERE number ILIKE $1 OR description ILIKE $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, LotRow>(&query)
            .bind(&pattern)
            .fetch_all(pool)
            .await
    }

    /// Lots matching every supplied criterion. Bounds are inclusive.
    pub async fn filter(pool: &PgPool, filter: &LotFilter) -> Result<Vec<LotRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lots
             WHERE ($1::BIGINT IS NULL OR map_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::BIGINT IS NULL OR price >= $3)
               AND ($4::BIGINT IS NULL OR price <= $4)
               AND ($5::BIGINT IS NULL OR square_feet >= $5)
               AND ($6::BIGINT IS NULL OR square_feet <= $6)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, LotRow>(&query)
            .bind(filter.map_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.min_sqft)
            .bind(filter.max_sqft)
            .fetch_all(pool)
            .await
    }

    /// Update a lot. Only non-`None` fields in `input` are applied; geometry
    /// is replaced as a whole, clearing `outline` when a rectangle replaces
    /// a polygon.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &LotChanges,
    ) -> Result<Option<LotRow>, sqlx::Error> {
        let query = format!(
            "UPDATE lots SET
                number = COALESCE($2, number),
                status = COALESCE($3, status),
                price = COALESCE($4, price),
                square_feet = COALESCE($5, square_feet),
                bedrooms = COALESCE($6, bedrooms),
                bathrooms = COALESCE($7, bathrooms),
                description = COALESCE($8, description),
                amenities = COALESCE($9, amenities),
                x = COALESCE($10, x),
                y = COALESCE($11, y),
                width = COALESCE($12, width),
                height = COALESCE($13, height),
                outline = CASE WHEN $15 THEN $14 ELSE outline END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let bounds = input.geometry.as_ref().map(|g| g.bounds());
        sqlx::query_as::<_, LotRow>(&query)
            .bind(id)
            .bind(&input.number)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.price)
            .bind(input.square_feet)
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(&input.description)
            .bind(&input.amenities)
            .bind(bounds.map(|b| b.x))
            .bind(bounds.map(|b| b.y))
            .bind(bounds.map(|b| b.width))
            .bind(bounds.map(|b| b.height))
            .bind(input.geometry.as_ref().and_then(|g| g.outline_path()))
            .bind(input.geometry.is_some())
            .fetch_optional(pool)
            .await
    }

    /// Delete a lot by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lots WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every lot of a map. Returns the number of rows removed.
    pub async fn delete_by_map<'e, E>(executor: E, map_id: DbId) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM lots WHERE map_id = $1")
            .bind(map_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Escape `LIKE` wildcards using PostgreSQL's default escape character.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("A-12"), "A-12");
    }
}
