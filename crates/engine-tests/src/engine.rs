#[cfg(test)]
mod tests {
    use crate::{ORDERS_FEED, memory_client, utils::page_ids};
    use connectors::error::FeedError;
    use engine_config::settings::{ExplorerSettings, account::AccountSettings};
    use engine_core::{
        commands::ResourceCommands,
        error::ControllerError,
        pagination::controller::PaginationController,
        render::ResultFormat,
        sink::RecordingSink,
        tree::{
            menu::{MenuAction, create_template},
            node::{ExplorerNode, NodeCapabilities},
        },
    };
    use model::{
        options::request::{ConsistencyLevel, IndexingDirective},
        resource::{kind::ResourceType, link::ResourceLink},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    // Scenario: load the tree three levels deep and query from a collection menu.
    // Expected Outcome: the collection's "Query Documents" action targets its
    // documents feed and the default query drains it.
    #[traced_test]
    #[tokio::test]
    async fn tree_query_action_drives_controller() {
        let client = memory_client();
        let mut root = ExplorerNode::account("https://localhost:8081");
        root.refresh_depth(client.as_ref(), 3).await.unwrap();

        let orders: ResourceLink = "dbs/shop/colls/orders".parse().unwrap();
        let node = root.find(&orders).unwrap();
        let query = node
            .context_menu()
            .into_iter()
            .find(|item| item.label == "Query Documents")
            .unwrap();
        let MenuAction::Query(ResourceType::Document) = query.action else {
            panic!("unexpected action {:?}", query.action);
        };

        let feed = node.query_target().unwrap();
        assert_eq!(feed.as_str(), ORDERS_FEED);

        let sink = Arc::new(RecordingSink::new());
        let controller = PaginationController::new(client.clone(), sink.clone(), feed).unwrap();
        let text = query.action.default_query().unwrap();
        let mut ctx = controller.start_query(text);
        let page = controller.fetch_next_page(text, &mut ctx, None).await.unwrap();

        assert_eq!(page.item_count, 10);
        assert!(!controller.can_fetch_next(&ctx));
        assert!(
            root.render_lines()
                .contains(&"    - orders".to_string())
        );
    }

    // Scenario: create, replace and delete a document, refreshing the tree in between.
    // Expected Outcome: every change is visible after a forced refresh.
    #[traced_test]
    #[tokio::test]
    async fn crud_round_trip_is_visible_in_tree() {
        let client = memory_client();
        let sink = Arc::new(RecordingSink::new());
        let commands = ResourceCommands::new(client.clone(), sink.clone());
        let feed: ResourceLink = ORDERS_FEED.parse().unwrap();

        let mut collection = ExplorerNode::account("local");
        collection.refresh_depth(client.as_ref(), 2).await.unwrap();
        let orders = collection
            .find_mut(&"dbs/shop/colls/orders".parse().unwrap())
            .unwrap();
        orders.refresh(client.as_ref(), false).await.unwrap();
        let before = orders.children().len();

        let template = create_template(ResourceType::Document);
        let created = commands.create(&feed, template).await.unwrap();
        let id = created.response.resource["id"].as_str().unwrap().to_string();
        assert_eq!(id, "Here is your Document Id");

        let link = feed.child(&id);
        let mut body = created.response.resource.clone();
        body["status"] = json!("open");
        commands.replace(&link, body).await.unwrap();
        let read = commands.read(&link).await.unwrap();
        assert_eq!(read.response.resource["status"], "open");

        orders.refresh(client.as_ref(), true).await.unwrap();
        assert_eq!(orders.children().len(), before + 1);
        assert!(orders.find(&link).is_some());

        let deleted = commands.delete(&link).await.unwrap();
        assert!(deleted.context.is_delete());
        orders.refresh(client.as_ref(), true).await.unwrap();
        assert_eq!(orders.children().len(), before);

        assert_eq!(
            sink.views().last().unwrap().text.as_deref(),
            Some("Delete Document succeed!")
        );
        assert!(sink.errors().is_empty());
    }

    // Scenario: pick "Execute StoredProcedure" on a stored procedure in the tree.
    // Expected Outcome: the procedure runs with the given parameters and the
    // result is rendered with its response headers.
    #[traced_test]
    #[tokio::test]
    async fn tree_execute_action_runs_stored_procedure() {
        let client = memory_client();
        let mut root = ExplorerNode::account("local");
        root.refresh_depth(client.as_ref(), 5).await.unwrap();

        let archive: ResourceLink = "dbs/shop/colls/orders/sprocs/archive".parse().unwrap();
        let node = root.find(&archive).unwrap();
        assert!(
            node.context_menu()
                .iter()
                .any(|item| item.action == MenuAction::ExecuteStoredProcedure)
        );

        let sink = Arc::new(RecordingSink::new());
        let commands = ResourceCommands::new(client.clone(), sink.clone());
        let outcome = commands
            .execute_stored_procedure_from_text(&archive, "\"2024-01-01\"\n10\n")
            .await
            .unwrap();

        assert_eq!(outcome.response.resource, json!(["2024-01-01", 10]));
        let view = sink.views().pop().unwrap();
        assert_eq!(view.text.as_deref(), Some(r#"["2024-01-01",10]"#));
        assert!(view.headers.contains("x-ms-activity-id: "));
        assert!(logs_contain("Command completed"));
    }

    // Scenario: deleting a collection while a query over it is half-way.
    // Expected Outcome: the next page fails with 404 and the context keeps its token.
    #[traced_test]
    #[tokio::test]
    async fn deleting_collection_mid_query() {
        let client = memory_client();
        let sink = Arc::new(RecordingSink::new());
        let controller =
            PaginationController::new(client.clone(), sink.clone(), ORDERS_FEED.parse().unwrap())
                .unwrap();
        let commands = ResourceCommands::new(client.clone(), sink.clone());

        let mut ctx = controller.start_query("select * from c");
        let page = controller
            .fetch_next_page("select * from c", &mut ctx, Some(4))
            .await
            .unwrap();
        assert_eq!(page_ids(&page), vec!["o1", "o2", "o3", "o4"]);

        commands
            .delete(&"dbs/shop/colls/orders".parse().unwrap())
            .await
            .unwrap();

        let err = controller
            .fetch_next_page("select * from c", &mut ctx, Some(4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Feed(FeedError::Status { code: 404, .. })
        ));
        assert!(ctx.has_continuation());
    }

    // Scenario: settings drive page size, result format and request options.
    // Expected Outcome: a saved and reloaded settings file configures the
    // controller and commands the same way.
    #[traced_test]
    #[tokio::test]
    async fn settings_configure_controller_and_commands() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = ExplorerSettings::default();
        settings
            .add_account(AccountSettings::new("https://localhost:8081", "key"))
            .unwrap();
        settings.feed.max_item_count = 6;
        settings.result_format = ResultFormat::Legacy;
        settings.request.offer_type = Some("S2".into());
        settings.save(&path).await.unwrap();

        let settings = ExplorerSettings::load(&path).await.unwrap();
        let client = memory_client();
        let sink = Arc::new(RecordingSink::new());
        let controller =
            PaginationController::new(client.clone(), sink.clone(), ORDERS_FEED.parse().unwrap())
                .unwrap()
                .with_defaults(settings.feed_options())
                .with_format(settings.result_format);

        let mut ctx = controller.start_query("select * from c");
        let page = controller
            .fetch_next_page("select * from c", &mut ctx, None)
            .await
            .unwrap();
        assert_eq!(page.item_count, 6);
        assert!(sink.views()[0].json.as_deref().unwrap().contains(",\r\n"));

        let commands = ResourceCommands::new(client, sink.clone())
            .with_defaults(settings.request_options());
        let report = commands
            .create_many(
                &"dbs/shop/colls/orders/docs".parse().unwrap(),
                vec![
                    ("o11.json".into(), json!({"id": "o11"})),
                    ("o1.json".into(), json!({"id": "o1"})),
                ],
            )
            .await
            .unwrap();
        assert_eq!(report.succeeded, 1);
        assert!(report.text.contains("Failed adding o1.json, statusCode=409"));
        assert!(logs_contain("Bulk create finished"));
    }

    // Scenario: request and feed settings flow through to the backend.
    // Expected Outcome: the backend logs the trigger lists, indexing directive,
    // consistency level and scan hint it received.
    #[traced_test]
    #[tokio::test]
    async fn settings_options_reach_the_backend() {
        let mut settings = ExplorerSettings::default();
        settings.request.pre_triggers = "stamp;audit".into();
        settings.request.indexing_directive = IndexingDirective::Exclude;
        settings.feed.enable_scan_in_query = true;
        settings.feed.consistency_level = Some(ConsistencyLevel::Eventual);

        let client = memory_client();
        let sink = Arc::new(RecordingSink::new());
        let feed: ResourceLink = ORDERS_FEED.parse().unwrap();

        ResourceCommands::new(client.clone(), sink.clone())
            .with_defaults(settings.request_options())
            .create(&feed, json!({"id": "o42"}))
            .await
            .unwrap();
        assert!(logs_contain("Resource request options"));
        assert!(logs_contain(r#"pre_triggers=["stamp", "audit"]"#));
        assert!(logs_contain("indexing_directive=Exclude"));

        let controller = PaginationController::new(client, sink, feed)
            .unwrap()
            .with_defaults(settings.feed_options());
        let mut ctx = controller.start_query("select * from c");
        controller
            .fetch_next_page("select * from c", &mut ctx, Some(2))
            .await
            .unwrap();
        assert!(logs_contain("Feed request options"));
        assert!(logs_contain("enable_scan_in_query=Some(true)"));
        assert!(logs_contain("consistency_level=Some(Eventual)"));
    }
}
