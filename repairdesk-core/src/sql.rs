//! Declarative statement builders.
//!
//! Statements are rendered with backtick-quoted identifiers and `?`
//! placeholders, a dialect both MySQL and SQLite accept. Values never appear
//! in the SQL text; they travel in [`Statement::params`] in placeholder
//! order.

use crate::models::Table;
use crate::value::{FieldValues, Value};
use crate::Result;

/// Quotes an identifier with backticks, doubling embedded backticks.
///
/// # Example
/// ```rust
/// use repairdesk_core::sql::quote_ident;
///
/// assert_eq!(quote_ident("Cliente"), "`Cliente`");
/// assert_eq!(quote_ident("a`b"), "`a``b`");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// SQL text plus the values for its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Rendered SQL with `?` placeholders
    pub sql: String,
    /// Values for the placeholders, in order
    pub params: Vec<Value>,
}

impl Statement {
    /// Creates a statement from raw SQL and parameters.
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Leading keyword of the statement, e.g. `INSERT`.
    pub fn verb(&self) -> &str {
        self.sql.split_whitespace().next().unwrap_or("")
    }
}

/// A table-qualified column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    /// References `column` of `table` after checking the table has it.
    pub fn resolve(table: &Table, column: &str) -> Result<Self> {
        let column = table.require_column(column)?;
        Ok(Self {
            table: table.name.clone(),
            column: column.name.clone(),
        })
    }

    fn render(&self) -> String {
        format!("{}.{}", quote_ident(&self.table), quote_ident(&self.column))
    }
}

/// A `WHERE` predicate. Multiple predicates are joined with `AND`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = ?`
    Equals(ColumnRef, Value),
    /// `left = right`, used for correlated subqueries
    ColumnsEqual(ColumnRef, ColumnRef),
    /// `EXISTS (subquery)`
    Exists(Box<Select>),
}

impl Condition {
    fn render(&self, params: &mut Vec<Value>) -> String {
        match self {
            Condition::Equals(column, value) => {
                params.push(value.clone());
                format!("{} = ?", column.render())
            }
            Condition::ColumnsEqual(left, right) => {
                format!("{} = {}", left.render(), right.render())
            }
            Condition::Exists(subquery) => format!("EXISTS ({})", subquery.render(params)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Projection {
    Column(ColumnRef),
    Literal(i64),
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    table: String,
    left: ColumnRef,
    right: ColumnRef,
}

/// A `SELECT` over inner joins.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    from: String,
    projections: Vec<Projection>,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    order_by: Vec<ColumnRef>,
}

impl Select {
    /// Starts a query over `table`.
    pub fn from(table: &Table) -> Self {
        Self {
            from: table.name.clone(),
            projections: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Adds one output column.
    pub fn column(mut self, column: ColumnRef) -> Self {
        self.projections.push(Projection::Column(column));
        self
    }

    /// Adds every column of `table`, in declaration order.
    pub fn all_columns(mut self, table: &Table) -> Self {
        for column in &table.columns {
            self.projections.push(Projection::Column(ColumnRef {
                table: table.name.clone(),
                column: column.name.clone(),
            }));
        }
        self
    }

    /// Adds a constant output column, as in `SELECT 1`.
    pub fn literal(mut self, value: i64) -> Self {
        self.projections.push(Projection::Literal(value));
        self
    }

    /// Inner-joins `table` on `left = right`.
    pub fn join(mut self, table: &Table, left: ColumnRef, right: ColumnRef) -> Self {
        self.joins.push(Join {
            table: table.name.clone(),
            left,
            right,
        });
        self
    }

    /// Adds a predicate.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds an ascending sort key.
    pub fn order_by(mut self, column: ColumnRef) -> Self {
        self.order_by.push(column);
        self
    }

    /// Renders the query.
    pub fn to_statement(&self) -> Statement {
        let mut params = Vec::new();
        let sql = self.render(&mut params);
        Statement { sql, params }
    }

    fn render(&self, params: &mut Vec<Value>) -> String {
        let projections = if self.projections.is_empty() {
            "*".to_string()
        } else {
            self.projections
                .iter()
                .map(|p| match p {
                    Projection::Column(column) => column.render(),
                    Projection::Literal(value) => value.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", projections, quote_ident(&self.from));

        for join in &self.joins {
            sql.push_str(&format!(
                " INNER JOIN {} ON {} = {}",
                quote_ident(&join.table),
                join.left.render(),
                join.right.render()
            ));
        }

        push_where(&mut sql, &self.conditions, params);

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|column| format!("{} ASC", column.render()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        sql
    }
}

fn push_where(sql: &mut String, conditions: &[Condition], params: &mut Vec<Value>) {
    if conditions.is_empty() {
        return;
    }
    let rendered: Vec<String> = conditions.iter().map(|c| c.render(params)).collect();
    sql.push_str(" WHERE ");
    sql.push_str(&rendered.join(" AND "));
}

/// A single-table `UPDATE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: String,
    assignments: Vec<(String, Value)>,
    conditions: Vec<Condition>,
}

impl Update {
    /// Starts an update of `table`.
    pub fn table(table: &Table) -> Self {
        Self {
            table: table.name.clone(),
            assignments: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Adds `column = value` to the `SET` list.
    pub fn set(mut self, column: ColumnRef, value: impl Into<Value>) -> Self {
        self.assignments.push((column.column, value.into()));
        self
    }

    /// Adds a predicate.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Renders the statement.
    pub fn to_statement(&self) -> Statement {
        let mut params = Vec::new();
        let assignments: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| {
                params.push(value.clone());
                format!("{} = ?", quote_ident(column))
            })
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_ident(&self.table),
            assignments.join(", ")
        );
        push_where(&mut sql, &self.conditions, &mut params);
        Statement { sql, params }
    }
}

/// A single-table `DELETE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: String,
    conditions: Vec<Condition>,
}

impl Delete {
    /// Starts a delete from `table`.
    pub fn from(table: &Table) -> Self {
        Self {
            table: table.name.clone(),
            conditions: Vec::new(),
        }
    }

    /// Adds a predicate.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Renders the statement.
    pub fn to_statement(&self) -> Statement {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", quote_ident(&self.table));
        push_where(&mut sql, &self.conditions, &mut params);
        Statement { sql, params }
    }
}

/// `INSERT INTO table (columns...) VALUES (?, ...)` for the given values.
pub fn insert(table: &Table, values: &FieldValues) -> Statement {
    let mut columns = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len());
    for (column, value) in values.iter() {
        columns.push(quote_ident(column));
        params.push(value.clone());
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&table.name),
            columns.join(", "),
            placeholders
        ),
        params,
    }
}

/// `SELECT COALESCE(MAX(column), 0) + 1 FROM table`.
pub fn next_key(table: &Table, column: &str) -> Statement {
    Statement {
        sql: format!(
            "SELECT COALESCE(MAX({}), 0) + 1 FROM {}",
            quote_ident(column),
            quote_ident(&table.name)
        ),
        params: Vec::new(),
    }
}
