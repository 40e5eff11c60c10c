use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};

/// The business entities of the café, one table each.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Entity {
    Category,
    Customer,
    Employee,
    Inventory,
    MenuItem,
    Order,
    OrderItem,
    Payment,
    Supplier,
    Table,
}

/// How a request value is checked and bound to the insert statement.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FieldSpec {
    pub column: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Alternative body keys accepted for this column.
    pub aliases: &'static [&'static str],
}

/// Everything needed to create a row of one entity kind.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct EntitySpec {
    pub table: &'static str,
    pub create_path: &'static str,
    pub fields: &'static [FieldSpec],
    /// Column set to `CURRENT_TIMESTAMP` on insert.
    pub timestamp_column: Option<&'static str>,
    /// Error message for a missing required field.
    pub missing_message: &'static str,
}

const fn required(column: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        column,
        kind,
        required: true,
        aliases: &[],
    }
}

const fn optional(column: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        column,
        kind,
        required: false,
        aliases: &[],
    }
}

const fn aliased(
    column: &'static str,
    kind: FieldKind,
    aliases: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        column,
        kind,
        required: true,
        aliases,
    }
}

const ALL_FIELDS_REQUIRED: &str = "All fields required";

static CATEGORY: EntitySpec = EntitySpec {
    table: "categories",
    create_path: "/addCategory",
    fields: &[
        required("name", FieldKind::Text),
        optional("description", FieldKind::Text),
    ],
    timestamp_column: None,
    missing_message: "Name is required",
};

static CUSTOMER: EntitySpec = EntitySpec {
    table: "customers",
    create_path: "/addCustomer",
    fields: &[
        required("name", FieldKind::Text),
        required("phone", FieldKind::Text),
        optional("email", FieldKind::Text),
    ],
    timestamp_column: None,
    missing_message: "Name and phone are required",
};

static EMPLOYEE: EntitySpec = EntitySpec {
    table: "employees",
    create_path: "/addEmployee",
    fields: &[
        required("name", FieldKind::Text),
        required("role", FieldKind::Text),
        required("salary", FieldKind::Decimal),
    ],
    timestamp_column: None,
    missing_message: ALL_FIELDS_REQUIRED,
};

static INVENTORY: EntitySpec = EntitySpec {
    table: "inventory",
    create_path: "/addInventory",
    fields: &[
        required("item_name", FieldKind::Text),
        required("quantity", FieldKind::Integer),
        required("supplier_id", FieldKind::Integer),
    ],
    timestamp_column: None,
    missing_message: ALL_FIELDS_REQUIRED,
};

static MENU_ITEM: EntitySpec = EntitySpec {
    table: "menu_items",
    create_path: "/addMenuItem",
    fields: &[
        required("name", FieldKind::Text),
        required("price", FieldKind::Decimal),
        required("category_id", FieldKind::Integer),
    ],
    timestamp_column: None,
    missing_message: ALL_FIELDS_REQUIRED,
};

static ORDER: EntitySpec = EntitySpec {
    table: "orders",
    create_path: "/addOrder",
    fields: &[
        required("customer_id", FieldKind::Integer),
        optional("table_id", FieldKind::Integer),
        optional("total_amount", FieldKind::Decimal),
    ],
    timestamp_column: Some("created_at"),
    missing_message: "Customer ID is required",
};

static ORDER_ITEM: EntitySpec = EntitySpec {
    table: "order_items",
    create_path: "/addOrderItem",
    fields: &[
        required("order_id", FieldKind::Integer),
        required("menu_item_id", FieldKind::Integer),
        required("quantity", FieldKind::Integer),
        optional("price_at_purchase", FieldKind::Decimal),
    ],
    timestamp_column: None,
    missing_message: ALL_FIELDS_REQUIRED,
};

static PAYMENT: EntitySpec = EntitySpec {
    table: "payments",
    create_path: "/addPayment",
    fields: &[
        required("order_id", FieldKind::Integer),
        aliased("amount", FieldKind::Decimal, &["amount_paid"]),
        aliased("method", FieldKind::Text, &["payment_method"]),
    ],
    timestamp_column: Some("paid_at"),
    missing_message: ALL_FIELDS_REQUIRED,
};

static SUPPLIER: EntitySpec = EntitySpec {
    table: "suppliers",
    create_path: "/addSupplier",
    fields: &[
        required("name", FieldKind::Text),
        aliased("contact", FieldKind::Text, &["contact_info"]),
    ],
    timestamp_column: None,
    missing_message: ALL_FIELDS_REQUIRED,
};

static TABLE: EntitySpec = EntitySpec {
    table: "tables",
    create_path: "/addTable",
    fields: &[
        required("table_number", FieldKind::Integer),
        optional("capacity", FieldKind::Integer),
    ],
    timestamp_column: None,
    missing_message: "Table number is required",
};

impl Entity {
    pub const ALL: [Entity; 10] = [
        Entity::Category,
        Entity::Customer,
        Entity::Employee,
        Entity::Inventory,
        Entity::MenuItem,
        Entity::Order,
        Entity::OrderItem,
        Entity::Payment,
        Entity::Supplier,
        Entity::Table,
    ];

    pub fn spec(self) -> &'static EntitySpec {
        match self {
            Entity::Category => &CATEGORY,
            Entity::Customer => &CUSTOMER,
            Entity::Employee => &EMPLOYEE,
            Entity::Inventory => &INVENTORY,
            Entity::MenuItem => &MENU_ITEM,
            Entity::Order => &ORDER,
            Entity::OrderItem => &ORDER_ITEM,
            Entity::Payment => &PAYMENT,
            Entity::Supplier => &SUPPLIER,
            Entity::Table => &TABLE,
        }
    }

    pub fn table(self) -> &'static str {
        self.spec().table
    }

    /// Resolve a table name against the known tables.
    pub fn from_table_name(name: &str) -> Option<Entity> {
        Entity::ALL
            .into_iter()
            .find(|entity| entity.table() == name)
    }

    /// Query returning every row of the table as a JSON object, ordered by id.
    pub fn select_all_sql(self) -> String {
        format!(
            "SELECT row_to_json(t) FROM {table} t ORDER BY t.id",
            table = self.table()
        )
    }
}

/// A validated request value, ready to be bound to a statement.
#[derive(Debug, PartialEq, Clone)]
pub enum BoundValue {
    Text(String),
    Integer(i32),
    /// Decimal text, cast to `numeric` by the statement.
    Decimal(String),
}

#[derive(Debug, PartialEq, Clone)]
pub struct InsertStatement {
    pub sql: String,
    pub values: Vec<BoundValue>,
}

impl EntitySpec {
    /// Validate a request body and build the parameterized insert for it.
    ///
    /// Keys that are not columns of the entity, such as `id`, are ignored.
    pub fn insert_statement(&self, body: &Map<String, Value>) -> ServiceResult<InsertStatement> {
        let mut columns = Vec::<&'static str>::new();
        let mut placeholders = Vec::<String>::new();
        let mut values = Vec::<BoundValue>::new();

        for field in self.fields {
            let raw = field.lookup(body);

            let Some(raw) = raw else {
                if field.required {
                    return Err(ServiceError::BadRequest(self.missing_message.to_owned()));
                }
                continue;
            };

            let value = field.convert(raw)?;
            if let BoundValue::Text(text) = &value {
                if text.trim().is_empty() {
                    if field.required {
                        return Err(ServiceError::BadRequest(self.missing_message.to_owned()));
                    }
                    continue;
                }
            }

            let index = values.len() + 1;
            placeholders.push(match field.kind {
                FieldKind::Decimal => format!("${index}::numeric"),
                FieldKind::Text | FieldKind::Integer => format!("${index}"),
            });
            columns.push(field.column);
            values.push(value);
        }

        if let Some(timestamp_column) = self.timestamp_column {
            columns.push(timestamp_column);
            placeholders.push("CURRENT_TIMESTAMP".to_owned());
        }

        let sql = format!(
            "WITH inserted AS (INSERT INTO {table} ({columns}) VALUES ({placeholders}) RETURNING *) \
             SELECT row_to_json(inserted) FROM inserted",
            table = self.table,
            columns = columns.join(", "),
            placeholders = placeholders.join(", "),
        );

        Ok(InsertStatement { sql, values })
    }
}

impl FieldSpec {
    /// The body value for this field, `None` if absent or null.
    fn lookup<'a>(&self, body: &'a Map<String, Value>) -> Option<&'a Value> {
        std::iter::once(&self.column)
            .chain(self.aliases.iter())
            .filter_map(|key| body.get(*key))
            .find(|value| !value.is_null())
    }

    fn convert(&self, raw: &Value) -> ServiceResult<BoundValue> {
        let converted = match self.kind {
            FieldKind::Text => match raw {
                Value::String(text) => Some(BoundValue::Text(text.to_owned())),
                Value::Number(number) => Some(BoundValue::Text(number.to_string())),
                _ => None,
            },
            FieldKind::Integer => match raw {
                Value::Number(number) => number
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .map(BoundValue::Integer),
                Value::String(text) => text.trim().parse::<i32>().ok().map(BoundValue::Integer),
                _ => None,
            },
            FieldKind::Decimal => match raw {
                Value::Number(number) => Some(BoundValue::Decimal(number.to_string())),
                Value::String(text) => {
                    let text = text.trim();
                    match text.parse::<f64>() {
                        Ok(parsed) if parsed.is_finite() => {
                            Some(BoundValue::Decimal(text.to_owned()))
                        }
                        _ => None,
                    }
                }
                _ => None,
            },
        };

        converted.ok_or_else(|| {
            let expected = match self.kind {
                FieldKind::Text => "a string",
                FieldKind::Integer => "an integer",
                FieldKind::Decimal => "a number",
            };
            ServiceError::BadRequest(format!("Field '{}' must be {}", self.column, expected))
        })
    }
}
