#![allow(dead_code)]

use model::pagination::page::PageResult;
use serde_json::Value;

/// Account used by the scenario tests.
///
/// `orders` holds ten documents, `o1`..`o10`, alternating between
/// `"open"` (odd) and `"closed"` (even) status.
pub const ACCOUNT_SEED: &str = r#"{
    "databases": [
        {
            "id": "shop",
            "collections": [
                {
                    "id": "orders",
                    "documents": [
                        { "id": "o1",  "status": "open",   "total": 10,  "customer": { "tier": "gold" } },
                        { "id": "o2",  "status": "closed", "total": 20,  "customer": { "tier": "silver" } },
                        { "id": "o3",  "status": "open",   "total": 30,  "customer": { "tier": "gold" } },
                        { "id": "o4",  "status": "closed", "total": 40,  "customer": { "tier": "silver" } },
                        { "id": "o5",  "status": "open",   "total": 50,  "customer": { "tier": "silver" } },
                        { "id": "o6",  "status": "closed", "total": 60,  "customer": { "tier": "gold" } },
                        { "id": "o7",  "status": "open",   "total": 70,  "customer": { "tier": "silver" } },
                        { "id": "o8",  "status": "closed", "total": 80,  "customer": { "tier": "silver" } },
                        { "id": "o9",  "status": "open",   "total": 90,  "customer": { "tier": "gold" } },
                        { "id": "o10", "status": "closed", "total": 100, "customer": { "tier": "silver" } }
                    ],
                    "sprocs": [ { "id": "archive", "body": "function () {}" } ],
                    "triggers": [ { "id": "stamp", "triggerType": "Pre", "triggerOperation": "Create" } ],
                    "udfs": [ { "id": "tax", "body": "function (x) { return x * 0.2; }" } ]
                },
                { "id": "empty" }
            ],
            "users": [
                { "id": "alice", "permissions": [ { "id": "read-orders", "permissionMode": "Read" } ] }
            ]
        }
    ],
    "offers": [ { "id": "offer1", "offerType": "S1" } ]
}"#;

/// Ids of the items of `page`, in order.
pub fn page_ids(page: &PageResult) -> Vec<String> {
    page.items
        .iter()
        .filter_map(|item| item.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// A result summary without its timing suffix.
pub fn strip_timing(summary: &str) -> &str {
    summary.split(" in ").next().unwrap_or(summary)
}
