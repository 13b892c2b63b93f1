use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// `value` is an array of accepted values.
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn one_of<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            column: column.into(),
            op: FilterOp::In,
            value: Value::Array(values.into_iter().map(Into::into).collect()),
        }
    }

    /// PostgREST operator form, e.g. `eq.3f9c...` or `in.(a,b)`.
    pub fn to_param(&self) -> (String, String) {
        let param = match (self.op, &self.value) {
            (FilterOp::Eq, Value::Null) => "is.null".to_string(),
            (FilterOp::Eq, value) => format!("eq.{}", render(value)),
            (FilterOp::In, Value::Array(values)) => {
                let quoted: Vec<String> = values
                    .iter()
                    .map(|v| format!("\"{}\"", render(v).replace('"', "\\\"")))
                    .collect();
                format!("in.({})", quoted.join(","))
            }
            (FilterOp::In, value) => format!("in.(\"{}\")", render(value)),
        };
        (self.column.clone(), param)
    }

    pub fn matches(&self, row: &Value) -> bool {
        let actual = row.get(&self.column).unwrap_or(&Value::Null);
        match (self.op, &self.value) {
            (FilterOp::Eq, expected) => actual == expected,
            (FilterOp::In, Value::Array(values)) => values.contains(actual),
            (FilterOp::In, expected) => actual == expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Foreign-key expansion. `alias` is the key the related row appears under,
/// `fk` the referencing column on the parent row.
#[derive(Debug, Clone, PartialEq)]
pub struct Expand {
    pub alias: String,
    pub table: String,
    pub fk: String,
    pub columns: Vec<String>,
    pub nested: Vec<Expand>,
}

impl Expand {
    pub fn new(alias: impl Into<String>, table: impl Into<String>, fk: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            table: table.into(),
            fk: fk.into(),
            columns: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn nest(mut self, inner: Expand) -> Self {
        self.nested.push(inner);
        self
    }

    fn render(&self) -> String {
        let mut parts: Vec<String> = self.columns.clone();
        parts.extend(self.nested.iter().map(Expand::render));
        if parts.is_empty() {
            parts.push("*".to_string());
        }
        format!("{}:{}({})", self.alias, self.fk, parts.join(","))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    pub expand: Vec<Expand>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
            expand: Vec::new(),
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn expand(mut self, expand: Expand) -> Self {
        self.expand.push(expand);
        self
    }

    /// The `select=` parameter: plain columns followed by embedded resources.
    pub fn select_param(&self) -> String {
        let mut parts: Vec<String> = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };
        parts.extend(self.expand.iter().map(Expand::render));
        parts.join(",")
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select_param())];
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}
