//! Visitor Repositories

mod entries;
mod tokens;

pub(crate) use entries::PgVisitorEntriesRepository;
pub(crate) use tokens::PgVisitorTokensRepository;

fn try_get_u32(row: &sqlx::postgres::PgRow, col: &str) -> Result<u32, sqlx::Error> {
    use sqlx::Row;

    let value: i32 = row.try_get(col)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

fn to_i32(value: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
