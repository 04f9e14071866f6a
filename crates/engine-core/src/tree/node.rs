use crate::{
    error::ControllerError,
    render::ResultView,
    tree::menu::{MenuAction, MenuItem, menu_for},
};
use async_trait::async_trait;
use connectors::feed::{client::FeedClient, response::ResponseHeaders};
use futures::future::{BoxFuture, FutureExt};
use model::{
    options::feed::FeedOptions,
    pagination::continuation::ContinuationToken,
    resource::{kind::ResourceType, link::ResourceLink, node::ResourceNode},
};
use serde_json::Value;
use tracing::{debug, warn};

/// What every node of the explorer tree can do.
#[async_trait]
pub trait NodeCapabilities {
    /// Loads the node's children. Already loaded nodes are only reloaded when
    /// `force` is set; returns whether anything was loaded.
    async fn refresh(
        &mut self,
        client: &dyn FeedClient,
        force: bool,
    ) -> Result<bool, ControllerError>;

    fn context_menu(&self) -> Vec<MenuItem>;
}

/// A [`ResourceNode`] with lazily loaded children.
#[derive(Debug, Clone)]
pub struct ExplorerNode {
    node: ResourceNode,
    children: Vec<ExplorerNode>,
    loaded: bool,
}

impl ExplorerNode {
    pub fn new(node: ResourceNode) -> Self {
        ExplorerNode {
            node,
            children: Vec::new(),
            loaded: false,
        }
    }

    pub fn account(endpoint: impl Into<String>) -> Self {
        Self::new(ResourceNode::Account {
            endpoint: endpoint.into(),
        })
    }

    pub fn node(&self) -> &ResourceNode {
        &self.node
    }

    pub fn children(&self) -> &[ExplorerNode] {
        &self.children
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, link: &ResourceLink) -> Option<&ExplorerNode> {
        if self.node.link() == Some(link) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(link))
    }

    pub fn find_mut(&mut self, link: &ResourceLink) -> Option<&mut ExplorerNode> {
        if self.node.link() == Some(link) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(link))
    }

    /// Feed the node's "Query ..." action runs against, if it has one.
    pub fn query_target(&self) -> Option<ResourceLink> {
        self.context_menu().iter().find_map(|item| match item.action {
            MenuAction::Query(_) => item.action.target_feed(&self.node),
            _ => None,
        })
    }

    /// What selecting the node shows: the resource body, or the feed label.
    pub fn view(&self) -> Result<ResultView, ControllerError> {
        let headers = ResponseHeaders::new();
        match self.node.body() {
            Some(body) => Ok(ResultView::resource(body, &headers)?),
            None => Ok(ResultView::text(self.node.label(), &headers)),
        }
    }

    /// Refreshes this node and its descendants down to `depth` levels.
    /// Returns the number of nodes that were loaded.
    pub fn refresh_depth<'a>(
        &'a mut self,
        client: &'a dyn FeedClient,
        depth: usize,
    ) -> BoxFuture<'a, Result<usize, ControllerError>> {
        async move {
            if depth == 0 {
                return Ok(0);
            }
            let mut loaded = usize::from(self.refresh(client, false).await?);
            for child in &mut self.children {
                loaded += child.refresh_depth(client, depth - 1).await?;
            }
            Ok(loaded)
        }
        .boxed()
    }

    /// Indented outline of the loaded part of the tree. Nodes whose children
    /// were never loaded are marked with `+`.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(0, &mut lines);
        lines
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let marker = if self.loaded { '-' } else { '+' };
        lines.push(format!("{}{marker} {}", "  ".repeat(depth), self.node.label()));
        for child in &self.children {
            child.render_into(depth + 1, lines);
        }
    }

    /// Feed nodes shown under this node without asking the backend.
    fn static_feeds(&self) -> Vec<ResourceNode> {
        let nested = |link: &ResourceLink, kinds: &[ResourceType]| -> Vec<ResourceNode> {
            kinds
                .iter()
                .map(|kind| ResourceNode::feed(link, *kind))
                .collect()
        };

        match &self.node {
            ResourceNode::Account { .. } => vec![ResourceNode::Feed {
                kind: ResourceType::Offer,
                link: ResourceLink::offers(),
            }],
            ResourceNode::Database { link, .. } => nested(link, &[ResourceType::User]),
            ResourceNode::Collection { link, .. } => nested(
                link,
                &[
                    ResourceType::StoredProcedure,
                    ResourceType::UserDefinedFunction,
                    ResourceType::Trigger,
                    ResourceType::Conflict,
                ],
            ),
            ResourceNode::Item {
                kind: ResourceType::User,
                link,
                ..
            } => nested(link, &[ResourceType::Permission]),
            ResourceNode::Item {
                kind: ResourceType::Document,
                link,
                ..
            } => nested(link, &[ResourceType::Attachment]),
            ResourceNode::Feed { .. } | ResourceNode::Item { .. } => Vec::new(),
        }
    }

    /// Feed whose items become children on refresh.
    fn item_feed(&self) -> Option<ResourceLink> {
        match &self.node {
            ResourceNode::Account { .. } => Some(ResourceLink::databases()),
            ResourceNode::Database { link, .. } => {
                Some(link.feed(ResourceType::DocumentCollection))
            }
            ResourceNode::Collection { link, .. } => Some(link.feed(ResourceType::Document)),
            ResourceNode::Feed { link, .. } => Some(link.clone()),
            ResourceNode::Item { .. } => None,
        }
    }
}

#[async_trait]
impl NodeCapabilities for ExplorerNode {
    async fn refresh(
        &mut self,
        client: &dyn FeedClient,
        force: bool,
    ) -> Result<bool, ControllerError> {
        if self.loaded && !force {
            return Ok(false);
        }

        let mut children: Vec<ExplorerNode> =
            self.static_feeds().into_iter().map(ExplorerNode::new).collect();

        if let Some(feed) = self.item_feed() {
            for body in read_all(client, &feed).await? {
                match ResourceNode::from_resource(&feed, body) {
                    Some(node) => children.push(ExplorerNode::new(node)),
                    None => warn!(feed = %feed, "Skipping resource without an id"),
                }
            }
        }

        debug!(node = %self.node.label(), children = children.len(), "Node refreshed");
        self.children = children;
        self.loaded = true;
        Ok(true)
    }

    fn context_menu(&self) -> Vec<MenuItem> {
        menu_for(&self.node)
    }
}

/// Reads every page of `feed`.
async fn read_all(
    client: &dyn FeedClient,
    feed: &ResourceLink,
) -> Result<Vec<Value>, ControllerError> {
    let mut options = FeedOptions::default();
    let mut items = Vec::new();

    loop {
        let response = client.read_feed(feed, &options).await?;
        items.extend(response.items);

        match ContinuationToken::from_response(response.continuation) {
            Some(token) => options.request_continuation = Some(token),
            None => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::{error::FeedError, memory::client::MemoryFeedClient};

    const SEED: &str = r#"{
        "databases": [
            { "id": "db1",
              "collections": [ { "id": "c1",
                  "documents": [ { "id": "a" }, { "id": "b" } ],
                  "triggers": [ { "id": "t1" } ] } ],
              "users": [ { "id": "u1", "permissions": [ { "id": "p1" } ] } ] },
            { "id": "db2" }
        ],
        "offers": [ { "id": "o1" } ]
    }"#;

    fn client() -> MemoryFeedClient {
        MemoryFeedClient::from_seed_json(SEED).unwrap()
    }

    fn labels(node: &ExplorerNode) -> Vec<String> {
        node.children().iter().map(|c| c.node().label()).collect()
    }

    #[tokio::test]
    async fn account_refresh_lists_offers_and_databases() {
        let client = client();
        let mut root = ExplorerNode::account("https://localhost:8081");

        assert!(root.refresh(&client, false).await.unwrap());
        assert_eq!(labels(&root), vec!["Offers", "db1", "db2"]);

        // Second refresh is a no-op unless forced.
        let requests = client.request_count();
        assert!(!root.refresh(&client, false).await.unwrap());
        assert_eq!(client.request_count(), requests);
        assert!(root.refresh(&client, true).await.unwrap());
    }

    #[tokio::test]
    async fn collection_children_include_nested_feeds() {
        let client = client();
        let mut root = ExplorerNode::account("local");
        root.refresh_depth(&client, 3).await.unwrap();

        let c1 = root.find(&"dbs/db1/colls/c1".parse().unwrap()).unwrap();
        assert_eq!(
            labels(c1),
            vec!["StoredProcedures", "UDFs", "Triggers", "Conflicts", "a", "b"]
        );
        assert_eq!(
            c1.query_target().unwrap().as_str(),
            "dbs/db1/colls/c1/docs"
        );

        let db1 = root.find(&ResourceLink::database("db1")).unwrap();
        assert_eq!(labels(db1), vec!["Users", "c1"]);
    }

    #[tokio::test]
    async fn feed_nodes_load_their_items() {
        let client = client();
        let mut root = ExplorerNode::account("local");
        root.refresh_depth(&client, 4).await.unwrap();

        let users = root
            .find_mut(&"dbs/db1/users".parse().unwrap())
            .unwrap();
        assert_eq!(labels(users), vec!["u1"]);

        let u1 = users.find_mut(&"dbs/db1/users/u1".parse().unwrap()).unwrap();
        u1.refresh(&client, false).await.unwrap();
        let permissions = &u1.children()[0];
        assert_eq!(permissions.node().label(), "Permissions");
        assert_eq!(
            u1.query_target(),
            None,
            "users have no query action"
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_children() {
        let client = client();
        let mut root = ExplorerNode::account("local");
        root.refresh(&client, false).await.unwrap();

        client
            .fail_next(FeedError::Transport("connection refused".into()))
            .await;
        assert!(root.refresh(&client, true).await.is_err());
        assert_eq!(labels(&root), vec!["Offers", "db1", "db2"]);
    }

    #[tokio::test]
    async fn render_lines_marks_unloaded_nodes() {
        let client = client();
        let mut root = ExplorerNode::account("local");
        root.refresh(&client, false).await.unwrap();

        assert_eq!(
            root.render_lines(),
            vec!["- local", "  + Offers", "  + db1", "  + db2"]
        );
    }

    #[test]
    fn view_shows_body_or_label() {
        let doc = ExplorerNode::new(ResourceNode::Item {
            kind: ResourceType::Document,
            link: "dbs/d/colls/c/docs/a".parse().unwrap(),
            body: serde_json::json!({"id": "a"}),
        });
        assert!(doc.view().unwrap().json.unwrap().contains("\"id\": \"a\""));

        let feed = ExplorerNode::new(ResourceNode::feed(
            &ResourceLink::database("d"),
            ResourceType::User,
        ));
        assert_eq!(feed.view().unwrap().text.as_deref(), Some("Users"));
    }
}
