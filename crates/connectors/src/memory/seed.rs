use serde::Deserialize;
use serde_json::{Map, Value};

/// Initial content of an in-memory account, usually read from a JSON file.
///
/// ```json
/// {
///   "databases": [
///     { "id": "db1",
///       "collections": [ { "id": "c1", "documents": [ { "id": "d1" } ] } ],
///       "users": [ { "id": "alice", "permissions": [] } ] }
///   ],
///   "offers": []
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountSeed {
    pub databases: Vec<DatabaseSeed>,
    pub offers: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSeed {
    pub id: String,

    #[serde(default)]
    pub collections: Vec<CollectionSeed>,

    #[serde(default)]
    pub users: Vec<UserSeed>,

    /// Any other property is kept on the database resource.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSeed {
    pub id: String,

    #[serde(default, alias = "docs")]
    pub documents: Vec<Value>,

    #[serde(default, alias = "sprocs")]
    pub stored_procedures: Vec<Value>,

    #[serde(default)]
    pub triggers: Vec<Value>,

    #[serde(default, alias = "udfs")]
    pub user_defined_functions: Vec<Value>,

    #[serde(default)]
    pub conflicts: Vec<Value>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    pub id: String,

    #[serde(default)]
    pub permissions: Vec<Value>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// Builds a resource body from its id and extra properties.
pub(crate) fn resource_body(id: &str, properties: &Map<String, Value>) -> Value {
    let mut body = properties.clone();
    body.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(body)
}

impl AccountSeed {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
