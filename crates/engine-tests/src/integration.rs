#[cfg(test)]
mod tests {
    use crate::{
        ORDERS_FEED, controller_for,
        utils::{ACCOUNT_SEED, page_ids, strip_timing},
    };
    use connectors::{error::FeedError, memory::client::MemoryFeedClient};
    use engine_core::{
        error::ControllerError,
        pagination::controller::PaginationController,
        render::{EMPTY_JSON, ResultFormat},
        sink::{RecordingSink, SinkEvent},
    };
    use model::pagination::context::FeedState;
    use std::{sync::Arc, time::Duration};
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    const ALL: &str = "select * from c";

    // Scenario: drain a ten-document feed three items at a time.
    // Expected Outcome:
    // - pages of 3, 3, 3 and 1 items, in insertion order
    // - the feed is exhausted after the page without a token
    // - a further fetch is rejected without reaching the backend
    #[traced_test]
    #[tokio::test]
    async fn tc01_drain_feed_in_pages() {
        let (controller, client, sink) = controller_for(ORDERS_FEED);
        let mut ctx = controller.start_query(ALL);

        let mut pages = Vec::new();
        while controller.can_fetch_next(&ctx) {
            let page = controller
                .fetch_next_page(ALL, &mut ctx, Some(3))
                .await
                .unwrap();
            pages.push(page_ids(&page));
        }

        assert_eq!(
            pages,
            vec![
                vec!["o1", "o2", "o3"],
                vec!["o4", "o5", "o6"],
                vec!["o7", "o8", "o9"],
                vec!["o10"],
            ]
        );
        assert_eq!(ctx.state(), FeedState::Exhausted);
        assert_eq!(sink.next_page_enabled(), Some(false));
        assert_eq!(client.request_count(), 4);

        let err = controller
            .fetch_next_page(ALL, &mut ctx, Some(3))
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::FeedExhausted));
        assert_eq!(client.request_count(), 4);

        assert!(logs_contain("Fetched page"));
        assert!(logs_contain("Fetching page failed"));
    }

    // Scenario: a filtered query whose third page scans records but matches none.
    // Expected Outcome: the empty page still carries a token, so the feed goes on.
    #[traced_test]
    #[tokio::test]
    async fn tc02_empty_page_with_token_keeps_feed_open() {
        let query = "SELECT * FROM c WHERE c.customer.tier = 'gold'";
        let (controller, _client, sink) = controller_for(ORDERS_FEED);
        let mut ctx = controller.start_query(query);

        let mut seen = Vec::new();
        let mut empty_pages_with_token = 0;
        while controller.can_fetch_next(&ctx) {
            let page = controller
                .fetch_next_page(query, &mut ctx, Some(2))
                .await
                .unwrap();
            if page.item_count == 0 && page.continuation_token.is_some() {
                empty_pages_with_token += 1;
                assert!(controller.can_fetch_next(&ctx));
            }
            seen.extend(page_ids(&page));
        }

        assert_eq!(seen, vec!["o1", "o3", "o6", "o9"]);
        assert_eq!(empty_pages_with_token, 1);

        let summaries: Vec<String> = sink
            .views()
            .iter()
            .filter_map(|view| view.text.as_deref().map(strip_timing).map(str::to_string))
            .collect();
        assert_eq!(
            summaries,
            vec![
                "Returned 1 document",
                "Returned 1 document",
                "Returned 1 document",
                "Returned 0 document",
                "Returned 1 document",
            ]
        );
    }

    // Scenario: an empty collection, rendered in the legacy format.
    // Expected Outcome: one empty page, no token, placeholder JSON.
    #[traced_test]
    #[tokio::test]
    async fn tc03_empty_collection_legacy_format() {
        let client = Arc::new(MemoryFeedClient::from_seed_json(ACCOUNT_SEED).unwrap());
        let sink = Arc::new(RecordingSink::new());
        let controller = PaginationController::new(
            client,
            sink.clone(),
            "dbs/shop/colls/empty/docs".parse().unwrap(),
        )
        .unwrap()
        .with_format(ResultFormat::Legacy);

        let mut ctx = controller.start_query(ALL);
        let page = controller.fetch_next_page(ALL, &mut ctx, None).await.unwrap();

        assert!(page.reached_end());
        assert!(!controller.can_fetch_next(&ctx));
        let view = &sink.views()[0];
        assert_eq!(view.json.as_deref(), Some(EMPTY_JSON));
        assert!(view.headers.contains("x-ms-item-count: 0\r\n"));
    }

    // Scenario: the backend fails the first request, then recovers.
    // Expected Outcome: the context is untouched by the failure, the error is
    // surfaced verbatim, and the retry starts from the beginning of the feed.
    #[traced_test]
    #[tokio::test]
    async fn tc04_failed_first_fetch_then_retry() {
        let (controller, client, sink) = controller_for(ORDERS_FEED);
        client
            .fail_next(FeedError::Transport("connection refused".into()))
            .await;

        let mut ctx = controller.start_query(ALL);
        let before = ctx.clone();
        let err = controller
            .fetch_next_page(ALL, &mut ctx, Some(5))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert_eq!(ctx, before);
        assert_eq!(ctx.state(), FeedState::NotStarted);
        assert_eq!(sink.errors(), vec!["Transport error: connection refused"]);
        assert_eq!(sink.next_page_enabled(), Some(true));

        let page = controller
            .fetch_next_page(ALL, &mut ctx, Some(5))
            .await
            .unwrap();
        assert_eq!(page_ids(&page), vec!["o1", "o2", "o3", "o4", "o5"]);
        assert_eq!(ctx.state(), FeedState::HasMore);
    }

    // Scenario: the same unchanged context is fetched twice through clones.
    // Expected Outcome: identical items and summaries, apart from timing.
    #[traced_test]
    #[tokio::test]
    async fn tc05_repeatable_fetch_from_same_context() {
        let (controller, _client, sink) = controller_for(ORDERS_FEED);
        let ctx = controller.start_query(ALL);

        let mut first = ctx.clone();
        let mut second = ctx.clone();
        let a = controller.fetch_next_page(ALL, &mut first, Some(4)).await.unwrap();
        let b = controller.fetch_next_page(ALL, &mut second, Some(4)).await.unwrap();

        assert_eq!(a.items, b.items);
        assert_eq!(a.continuation_token, b.continuation_token);
        assert_eq!(first, second);

        let views = sink.views();
        assert_eq!(
            strip_timing(views[0].text.as_deref().unwrap()),
            strip_timing(views[1].text.as_deref().unwrap())
        );
        assert_eq!(views[0].json, views[1].json);
    }

    // Scenario: a malformed query.
    // Expected Outcome: the backend's 400 is surfaced and the query can be retried.
    #[traced_test]
    #[tokio::test]
    async fn tc06_bad_query_is_reported() {
        let (controller, _client, sink) = controller_for(ORDERS_FEED);
        let bad = "select * from c where c.status";
        let mut ctx = controller.start_query(bad);

        let err = controller.fetch_next_page(bad, &mut ctx, None).await.unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Feed(FeedError::Status { code: 400, .. })
        ));
        assert!(controller.can_fetch_next(&ctx));
        assert_eq!(sink.errors().len(), 1);
    }

    // Scenario: a slow backend and a cancelled request.
    // Expected Outcome: the fetch returns `Cancelled` without waiting for the
    // backend and the context can still fetch its first page.
    #[traced_test]
    #[tokio::test]
    async fn tc07_cancel_in_flight_fetch() {
        let client = Arc::new(
            MemoryFeedClient::from_seed_json(ACCOUNT_SEED)
                .unwrap()
                .with_latency(Duration::from_secs(30)),
        );
        let sink = Arc::new(RecordingSink::new());
        let controller =
            PaginationController::new(client, sink.clone(), ORDERS_FEED.parse().unwrap()).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let mut ctx = controller.start_query(ALL);
        let err = tokio::time::timeout(
            Duration::from_secs(5),
            controller.fetch_next_page_with_cancel(ALL, &mut ctx, None, &cancel),
        )
        .await
        .expect("cancellation should end the fetch")
        .unwrap_err();

        assert!(matches!(err, ControllerError::Cancelled));
        assert_eq!(ctx.state(), FeedState::NotStarted);
        assert!(sink.events().contains(&SinkEvent::Error(
            "The request was cancelled".to_string()
        )));
    }
}
