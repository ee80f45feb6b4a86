//! Query descriptions and cardinality-checked execution
//!
//! A [`Query`] is statement text plus positional values. The functions in
//! this module run a query on a connection and map rows with a caller
//! supplied mapper; they only add cardinality rules on top of the driver.

use crate::errors::{OrmError, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Statement text with positional bound values
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    values: Vec<Value>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            values: Vec::new(),
        }
    }

    /// Bind the next positional value.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::new(text)
    }
}

/// Every row, mapped.
///
/// # Errors
///
/// Returns the driver error unchanged.
pub fn fetch<T, F>(conn: &Connection, query: &Query, mapper: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    tracing::debug!(sql = query.text(), "fetch");
    let mut stmt = conn.prepare(query.text())?;
    let rows = stmt
        .query_map(params_from_iter(query.values()), mapper)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// At most one row.
///
/// # Errors
///
/// Returns [`OrmError::TooManyRows`] when a second row exists.
pub fn fetch_optional<T, F>(conn: &Connection, query: &Query, mapper: F) -> Result<Option<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    tracing::debug!(sql = query.text(), "fetch_optional");
    let mut stmt = conn.prepare(query.text())?;
    let mut rows = stmt.query_map(params_from_iter(query.values()), mapper)?;
    let first = rows.next().transpose()?;
    if rows.next().is_some() {
        return Err(OrmError::TooManyRows);
    }
    Ok(first)
}

/// Exactly one row.
///
/// # Errors
///
/// Returns [`OrmError::NoDataFound`] for an empty result and
/// [`OrmError::TooManyRows`] when a second row exists.
pub fn fetch_single<T, F>(conn: &Connection, query: &Query, mapper: F) -> Result<T>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    fetch_optional(conn, query, mapper)?.ok_or(OrmError::NoDataFound)
}

/// Whether the query yields at least one row.
///
/// # Errors
///
/// Returns the driver error unchanged.
pub fn exists(conn: &Connection, query: &Query) -> Result<bool> {
    tracing::debug!(sql = query.text(), "exists");
    let mut stmt = conn.prepare(query.text())?;
    Ok(stmt.exists(params_from_iter(query.values()))?)
}

/// One branch of a union: a query and the mapper lifting its rows into `T`
pub struct SubQuery<'a, T> {
    run: Box<dyn FnOnce(&Connection) -> Result<Vec<T>> + 'a>,
}

impl<'a, T: 'a> SubQuery<'a, T> {
    /// Rows of `query` mapped to `S` and converted into the union type.
    pub fn new<S, F>(query: Query, mut mapper: F) -> Self
    where
        S: Into<T>,
        F: FnMut(&Row<'_>) -> rusqlite::Result<S> + 'a,
    {
        Self {
            run: Box::new(move |conn: &Connection| {
                let rows = fetch(conn, &query, |row: &Row<'_>| mapper(row))?;
                Ok(rows.into_iter().map(Into::into).collect())
            }),
        }
    }

    /// # Errors
    ///
    /// Returns the driver error unchanged.
    pub fn run(self, conn: &Connection) -> Result<Vec<T>> {
        (self.run)(conn)
    }
}

/// Concatenate the results of every branch, in branch order.
///
/// # Errors
///
/// Returns the first failing branch's error.
pub fn union_all<T>(conn: &Connection, queries: Vec<SubQuery<'_, T>>) -> Result<Vec<T>> {
    let mut models = Vec::new();
    for query in queries {
        models.extend(query.run(conn)?);
    }
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(count: i64) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE numbers (n INTEGER NOT NULL)")
            .unwrap();
        for n in 0..count {
            conn.execute("INSERT INTO numbers (n) VALUES (?1)", [n])
                .unwrap();
        }
        conn
    }

    #[test]
    fn test_bind_keeps_positional_order() {
        let query = Query::new("SELECT ?1, ?2").bind(1_i64).bind("a".to_string());
        assert_eq!(
            query.values(),
            &[Value::Integer(1), Value::Text("a".to_string())]
        );
    }

    #[test]
    fn test_fetch_optional_rejects_second_row() {
        let conn = numbers(2);
        let result = fetch_optional(&conn, &Query::new("SELECT n FROM numbers"), |row| {
            row.get::<_, i64>(0)
        });
        assert!(matches!(result, Err(OrmError::TooManyRows)));
    }

    #[test]
    fn test_fetch_single_on_empty_result() {
        let conn = numbers(0);
        let result = fetch_single(&conn, &Query::new("SELECT n FROM numbers"), |row| {
            row.get::<_, i64>(0)
        });
        assert!(matches!(result, Err(OrmError::NoDataFound)));
    }

    #[test]
    fn test_exists_with_bound_value() {
        let conn = numbers(3);
        let query = |n: i64| Query::new("SELECT 1 FROM numbers WHERE n = ?1").bind(n);
        assert!(exists(&conn, &query(2)).unwrap());
        assert!(!exists(&conn, &query(7)).unwrap());
    }

    #[test]
    fn test_union_all_concatenates_in_branch_order() {
        let conn = numbers(4);
        let even = SubQuery::new(
            Query::new("SELECT n FROM numbers WHERE n % 2 = 0 ORDER BY n"),
            |row: &Row<'_>| row.get::<_, i64>(0),
        );
        let odd = SubQuery::new(
            Query::new("SELECT n FROM numbers WHERE n % 2 = 1 ORDER BY n"),
            |row: &Row<'_>| row.get::<_, i64>(0),
        );
        let all: Vec<i64> = union_all(&conn, vec![even, odd]).unwrap();
        assert_eq!(all, vec![0, 2, 1, 3]);
    }
}
