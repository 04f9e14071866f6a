use model::resource::{kind::ResourceType, link::ResourceLink, node::ResourceNode};
use serde::Serialize;
use serde_json::{Value, json};

/// Query text pre-filled by every "Query ..." action.
pub const DEFAULT_QUERY: &str = "select * from c";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MenuAction {
    Create(ResourceType),
    CreateFromFile(ResourceType),
    CreateManyFromFolder(ResourceType),
    RefreshFeed(ResourceType),
    Query(ResourceType),
    Read,
    Replace,
    Delete,
    ExecuteStoredProcedure,
    RemoveSetting,
    ChangeSetting,
}

impl MenuAction {
    /// Query text to start with, for actions that open a query.
    pub fn default_query(&self) -> Option<&'static str> {
        match self {
            MenuAction::Query(_) => Some(DEFAULT_QUERY),
            _ => None,
        }
    }

    /// Feed the action works on, when it targets a feed rather than `node` itself.
    pub fn target_feed(&self, node: &ResourceNode) -> Option<ResourceLink> {
        match self {
            MenuAction::Create(kind)
            | MenuAction::CreateFromFile(kind)
            | MenuAction::CreateManyFromFolder(kind)
            | MenuAction::RefreshFeed(kind)
            | MenuAction::Query(kind) => feed_for(node, *kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub action: MenuAction,
    pub label: String,
}

impl MenuItem {
    fn new(action: MenuAction, label: impl Into<String>) -> Self {
        MenuItem {
            action,
            label: label.into(),
        }
    }
}

/// Body offered when creating a new resource of `kind`.
pub fn create_template(kind: ResourceType) -> Value {
    json!({ "id": format!("Here is your {kind} Id") })
}

/// Link of the `kind` feed reachable from `node`.
pub fn feed_for(node: &ResourceNode, kind: ResourceType) -> Option<ResourceLink> {
    match node {
        ResourceNode::Account { .. } => match kind {
            ResourceType::Database => Some(ResourceLink::databases()),
            ResourceType::Offer => Some(ResourceLink::offers()),
            _ => None,
        },
        ResourceNode::Feed { kind: own, link } => (*own == kind).then(|| link.clone()),
        ResourceNode::Database { link, .. }
        | ResourceNode::Collection { link, .. }
        | ResourceNode::Item { link, .. } => Some(link.feed(kind)),
    }
}

pub fn menu_for(node: &ResourceNode) -> Vec<MenuItem> {
    use MenuAction::*;
    use ResourceType as T;

    match node {
        ResourceNode::Account { .. } => vec![
            MenuItem::new(Create(T::Database), "Create Database"),
            MenuItem::new(RefreshFeed(T::Database), "Refresh Databases feed"),
            MenuItem::new(Query(T::Database), "Query Database"),
            MenuItem::new(RemoveSetting, "Remove setting"),
            MenuItem::new(ChangeSetting, "Change setting"),
        ],
        ResourceNode::Database { .. } => vec![
            MenuItem::new(Read, "Read Database"),
            MenuItem::new(Delete, "Delete Database"),
            MenuItem::new(Create(T::DocumentCollection), "Create DocumentCollection"),
            MenuItem::new(
                RefreshFeed(T::DocumentCollection),
                "Refresh DocumentCollections Feed",
            ),
        ],
        ResourceNode::Collection { .. } => vec![
            MenuItem::new(Read, "Read DocumentCollection"),
            MenuItem::new(Replace, "Replace DocumentCollection"),
            MenuItem::new(Delete, "Delete DocumentCollection"),
            MenuItem::new(Create(T::Document), "Create Document"),
            MenuItem::new(CreateFromFile(T::Document), "Create Document From File"),
            MenuItem::new(
                CreateManyFromFolder(T::Document),
                "Create Multiple Documents From Folder",
            ),
            MenuItem::new(RefreshFeed(T::Document), "Refresh Documents feed"),
            MenuItem::new(Query(T::Document), "Query Documents"),
        ],
        ResourceNode::Feed { kind, .. } => feed_menu(*kind),
        ResourceNode::Item { kind, .. } => item_menu(*kind),
    }
}

fn feed_menu(kind: ResourceType) -> Vec<MenuItem> {
    use MenuAction::*;
    use ResourceType as T;

    match kind {
        T::User => vec![
            MenuItem::new(Create(kind), "Create User"),
            MenuItem::new(RefreshFeed(kind), "Refresh Users feed"),
        ],
        T::Permission => vec![
            MenuItem::new(Create(kind), "Create Permission"),
            MenuItem::new(RefreshFeed(kind), "Refresh Permissions feed"),
        ],
        T::StoredProcedure => vec![
            MenuItem::new(Create(kind), "Create StoredProcedure"),
            MenuItem::new(CreateFromFile(kind), "Create StoredProcedure From File"),
            MenuItem::new(RefreshFeed(kind), "Refresh StoredProcedures feed"),
        ],
        T::Trigger => vec![
            MenuItem::new(Create(kind), "Create Trigger"),
            MenuItem::new(CreateFromFile(kind), "Create Trigger from file"),
            MenuItem::new(RefreshFeed(kind), "Refresh Triggers feed"),
        ],
        T::UserDefinedFunction => vec![
            MenuItem::new(Create(kind), "Create UserDefinedFunction"),
            MenuItem::new(CreateFromFile(kind), "Create UserDefinedFunction from File"),
            MenuItem::new(RefreshFeed(kind), "Refresh UserDefinedFunction feed"),
        ],
        T::Conflict => vec![
            MenuItem::new(RefreshFeed(kind), "Refresh Conflict feed"),
            MenuItem::new(Query(kind), "Query Conflict feed"),
        ],
        T::Offer => vec![MenuItem::new(RefreshFeed(kind), "Refresh Offer feed")],
        _ => vec![MenuItem::new(
            RefreshFeed(kind),
            format!("Refresh {} feed", kind.feed_label()),
        )],
    }
}

fn item_menu(kind: ResourceType) -> Vec<MenuItem> {
    use MenuAction::*;

    let mut items = vec![MenuItem::new(Read, format!("Read {kind}"))];
    if !matches!(kind, ResourceType::Conflict | ResourceType::Offer) {
        items.push(MenuItem::new(Replace, format!("Replace {kind}")));
    }
    if kind != ResourceType::Offer {
        items.push(MenuItem::new(Delete, format!("Delete {kind}")));
    }

    match kind {
        ResourceType::StoredProcedure => {
            items.push(MenuItem::new(ExecuteStoredProcedure, "Execute StoredProcedure"));
        }
        ResourceType::Document => {
            items.push(MenuItem::new(
                Create(ResourceType::Attachment),
                "Create attachment",
            ));
            items.push(MenuItem::new(
                CreateFromFile(ResourceType::Attachment),
                "Create attachment from file",
            ));
        }
        _ => {}
    }
    items
}
