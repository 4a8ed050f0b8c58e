use rusqlite::types::Value;

/// ANDed WHERE predicate with positional bind values.
///
/// Starts from `1=1` so an empty filter is still a valid predicate. Clauses and
/// their values are appended in call order; `None` values are skipped.
#[derive(Debug, Clone)]
pub struct Filter {
    sql: String,
    binds: Vec<Value>,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    pub fn new() -> Self {
        Self {
            sql: String::from("1=1"),
            binds: Vec::new(),
        }
    }

    fn next_placeholder(&self) -> String {
        format!("?{}", self.binds.len() + 1)
    }

    fn push(mut self, column: &str, op: &str, value: Option<Value>) -> Self {
        if let Some(value) = value {
            let placeholder = self.next_placeholder();
            self.sql
                .push_str(&format!(" AND {column} {op} {placeholder}"));
            self.binds.push(value);
        }
        self
    }

    pub fn eq(self, column: &str, value: Option<&str>) -> Self {
        self.push(column, "=", value.map(text))
    }

    pub fn gte(self, column: &str, value: Option<&str>) -> Self {
        self.push(column, ">=", value.map(text))
    }

    pub fn lte(self, column: &str, value: Option<&str>) -> Self {
        self.push(column, "<=", value.map(text))
    }

    /// `(c1 LIKE ?n OR c2 LIKE ?n+1 ...)` matching `%term%`. Empty terms are skipped.
    pub fn like_any(mut self, columns: &[&str], term: Option<&str>) -> Self {
        let Some(term) = term.filter(|t| !t.is_empty()) else {
            return self;
        };
        if columns.is_empty() {
            return self;
        }
        let pattern = format!("%{term}%");
        let mut parts = Vec::with_capacity(columns.len());
        for column in columns {
            parts.push(format!("{column} LIKE {}", self.next_placeholder()));
            self.binds.push(Value::Text(pattern.clone()));
        }
        self.sql.push_str(&format!(" AND ({})", parts.join(" OR ")));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn binds(&self) -> &[Value] {
        &self.binds
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_owned())
}
