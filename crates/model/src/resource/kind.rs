use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown resource type: {0}")]
pub struct UnknownResourceType(pub String);

/// Kinds of backend resources the explorer can address.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Database,
    DocumentCollection,
    Document,
    User,
    StoredProcedure,
    UserDefinedFunction,
    Trigger,
    Permission,
    Attachment,
    Conflict,
    Offer,
}

impl ResourceType {
    pub const ALL: [ResourceType; 11] = [
        ResourceType::Database,
        ResourceType::DocumentCollection,
        ResourceType::Document,
        ResourceType::User,
        ResourceType::StoredProcedure,
        ResourceType::UserDefinedFunction,
        ResourceType::Trigger,
        ResourceType::Permission,
        ResourceType::Attachment,
        ResourceType::Conflict,
        ResourceType::Offer,
    ];

    /// Path segment of the feed holding resources of this type.
    pub fn feed_segment(&self) -> &'static str {
        match self {
            ResourceType::Database => "dbs",
            ResourceType::DocumentCollection => "colls",
            ResourceType::Document => "docs",
            ResourceType::User => "users",
            ResourceType::StoredProcedure => "sprocs",
            ResourceType::UserDefinedFunction => "udfs",
            ResourceType::Trigger => "triggers",
            ResourceType::Permission => "permissions",
            ResourceType::Attachment => "attachments",
            ResourceType::Conflict => "conflicts",
            ResourceType::Offer => "offers",
        }
    }

    pub fn from_feed_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.feed_segment() == segment)
    }

    /// Lower-case noun used in result summaries.
    pub fn noun(&self, plural: bool) -> &'static str {
        match (self, plural) {
            (ResourceType::Database, false) => "database",
            (ResourceType::Database, true) => "databases",
            (ResourceType::DocumentCollection, false) => "collection",
            (ResourceType::DocumentCollection, true) => "collections",
            (ResourceType::Document, false) => "document",
            (ResourceType::Document, true) => "documents",
            (ResourceType::User, false) => "user",
            (ResourceType::User, true) => "users",
            (ResourceType::StoredProcedure, false) => "stored procedure",
            (ResourceType::StoredProcedure, true) => "stored procedures",
            (ResourceType::UserDefinedFunction, false) => "user defined function",
            (ResourceType::UserDefinedFunction, true) => "user defined functions",
            (ResourceType::Trigger, false) => "trigger",
            (ResourceType::Trigger, true) => "triggers",
            (ResourceType::Permission, false) => "permission",
            (ResourceType::Permission, true) => "permissions",
            (ResourceType::Attachment, false) => "attachment",
            (ResourceType::Attachment, true) => "attachments",
            (ResourceType::Conflict, false) => "conflict",
            (ResourceType::Conflict, true) => "conflicts",
            (ResourceType::Offer, false) => "offer",
            (ResourceType::Offer, true) => "offers",
        }
    }

    /// Label of the tree node grouping a feed of this type.
    pub fn feed_label(&self) -> &'static str {
        match self {
            ResourceType::Database => "Databases",
            ResourceType::DocumentCollection => "DocumentCollections",
            ResourceType::Document => "Documents",
            ResourceType::User => "Users",
            ResourceType::StoredProcedure => "StoredProcedures",
            ResourceType::UserDefinedFunction => "UDFs",
            ResourceType::Trigger => "Triggers",
            ResourceType::Permission => "Permissions",
            ResourceType::Attachment => "Attachments",
            ResourceType::Conflict => "Conflicts",
            ResourceType::Offer => "Offers",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::Database => "Database",
            ResourceType::DocumentCollection => "DocumentCollection",
            ResourceType::Document => "Document",
            ResourceType::User => "User",
            ResourceType::StoredProcedure => "StoredProcedure",
            ResourceType::UserDefinedFunction => "UserDefinedFunction",
            ResourceType::Trigger => "Trigger",
            ResourceType::Permission => "Permission",
            ResourceType::Attachment => "Attachment",
            ResourceType::Conflict => "Conflict",
            ResourceType::Offer => "Offer",
        };
        f.write_str(name)
    }
}

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.to_string().eq_ignore_ascii_case(s) || kind.feed_segment() == s
            })
            .ok_or_else(|| UnknownResourceType(s.to_string()))
    }
}
