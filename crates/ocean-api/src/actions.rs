//! Actions endpoints.

use ocean_actions::{Action, ActionId, ActionService};
use ocean_http::Transport;
use serde::Deserialize;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

/// Page size requested when listing.
pub const PER_PAGE: u32 = 200;

#[derive(Debug, Deserialize)]
struct ActionRoot {
    action: Action,
}

#[derive(Debug, Deserialize)]
struct ActionsPage {
    #[serde(default)]
    actions: Vec<Action>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    pages: Pages,
}

#[derive(Debug, Default, Deserialize)]
struct Pages {
    #[serde(default)]
    next: Option<String>,
}

/// `/v2/actions` bound to a client.
#[derive(Debug)]
pub struct ActionsApi<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T> ActionsApi<'a, T> {
    pub(crate) const fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }
}

impl<T> Clone for ActionsApi<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ActionsApi<'_, T> {}

impl<T: Transport> ActionService for ActionsApi<'_, T> {
    type Error = ApiError;

    /// Walks every page until the API stops returning a `next` link.
    async fn list(&self) -> Result<Vec<Action>> {
        let mut all = Vec::new();
        let mut page = 1_u32;
        loop {
            let body: ActionsPage = self
                .client
                .get_json(&format!("v2/actions?page={page}&per_page={PER_PAGE}"))
                .await?;
            let fetched = body.actions.len();
            all.extend(body.actions);
            debug!(page, fetched, total = all.len(), "fetched actions page");

            if body.links.pages.next.is_none() || fetched == 0 {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    async fn get(&self, id: ActionId) -> Result<Action> {
        let root: ActionRoot = self.client.get_json(&format!("v2/actions/{id}")).await?;
        Ok(root.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client, Routes};
    use ocean_actions::{
        ActionWaiter, FilterCriteria, RetryPolicy, WaitError, WaitPolicy, query_actions,
    };
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn action_json(id: u64, status: &str, completed_at: Option<&str>) -> String {
        let completed = completed_at.map_or_else(|| "null".to_string(), |ts| format!("\"{ts}\""));
        format!(
            r#"{{"id":{id},"status":"{status}","type":"create","started_at":"2024-05-01T10:00:00Z","completed_at":{completed},"resource_id":42,"resource_type":"droplet","region_slug":"nyc3"}}"#
        )
    }

    fn page(actions: &[String], next: Option<&str>) -> String {
        let links = next.map_or_else(
            || r#"{"pages":{}}"#.to_string(),
            |n| format!(r#"{{"pages":{{"next":"{n}"}}}}"#),
        );
        format!(
            r#"{{"actions":[{}],"links":{links},"meta":{{"total":3}}}}"#,
            actions.join(",")
        )
    }

    fn first_page() -> &'static str {
        "/v2/actions?page=1&per_page=200"
    }

    #[tokio::test]
    async fn list_follows_next_links_until_the_last_page() {
        let routes = Routes::default()
            .on(
                first_page(),
                200,
                page(
                    &[
                        action_json(1, "completed", Some("2024-05-01T10:05:00Z")),
                        action_json(2, "completed", Some("2024-05-01T10:01:00Z")),
                    ],
                    Some("https://api.example.com/v2/actions?page=2&per_page=200"),
                ),
            )
            .on(
                "/v2/actions?page=2&per_page=200",
                200,
                page(&[action_json(3, "in-progress", None)], None),
            );
        let api = client(routes);

        let actions = api.actions().list().await.expect("list");

        let ids: Vec<u64> = actions.iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            api_targets(&api),
            vec![first_page(), "/v2/actions?page=2&per_page=200"]
        );
    }

    fn api_targets(api: &ApiClient<Routes>) -> Vec<String> {
        api.transport().targets()
    }

    #[tokio::test]
    async fn list_of_an_empty_account_is_empty() {
        let api = client(Routes::default().on(first_page(), 200, r#"{"actions":[],"links":{}}"#));

        let actions = api.actions().list().await.expect("list");
        assert!(actions.is_empty());
    }

    #[tokio::test]
    async fn list_stops_on_an_empty_page_even_with_a_next_link() {
        let api = client(Routes::default().on(
            first_page(),
            200,
            page(&[], Some("https://api.example.com/v2/actions?page=2")),
        ));

        let actions = api.actions().list().await.expect("list");
        assert!(actions.is_empty());
        assert_eq!(api_targets(&api).len(), 1);
    }

    #[tokio::test]
    async fn list_error_on_a_later_page_is_returned() {
        let routes = Routes::default()
            .on(
                first_page(),
                200,
                page(
                    &[action_json(1, "completed", Some("2024-05-01T10:05:00Z"))],
                    Some("next"),
                ),
            )
            .on("/v2/actions?page=2&per_page=200", 500, "");
        let api = client(routes);

        let err = api.actions().list().await.expect_err("should fail");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn listing_feeds_the_query_engine() {
        let api = client(Routes::default().on(
            first_page(),
            200,
            page(
                &[
                    action_json(1, "completed", Some("2024-05-01T10:05:00Z")),
                    action_json(2, "in-progress", None),
                    action_json(3, "completed", Some("2024-05-01T10:01:00Z")),
                ],
                None,
            ),
        ));

        let actions = api.actions().list().await.expect("list");
        let criteria = FilterCriteria::builder()
            .resource_type("droplet")
            .build()
            .expect("criteria");
        let ids: Vec<u64> = query_actions(&actions, &criteria)
            .iter()
            .map(|a| a.id.0)
            .collect();

        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn get_unwraps_the_action_envelope() {
        let api = client(Routes::default().on(
            "/v2/actions/36804636",
            200,
            format!(
                r#"{{"action":{}}}"#,
                action_json(36_804_636, "completed", Some("2024-05-01T10:05:00Z"))
            ),
        ));

        let action = api.actions().get(ActionId(36_804_636)).await.expect("get");
        assert_eq!(action.id, ActionId(36_804_636));
        assert_eq!(action.status, "completed");
        assert_eq!(action.resource_type, "droplet");
        assert_eq!(action.region_slug, "nyc3");
    }

    #[tokio::test]
    async fn get_of_unknown_action_is_a_status_error() {
        let api = client(Routes::default().on(
            "/v2/actions/9",
            404,
            r#"{"id":"not_found","message":"The resource you were accessing could not be found."}"#,
        ));

        let err = api.actions().get(ActionId(9)).await.expect_err("should fail");
        assert!(matches!(err, ApiError::Status { ref id, .. } if id == "not_found"));
        assert!(!err.is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_polls_the_api_until_completion() {
        let envelope = |status: &str, completed_at: Option<&str>| {
            format!(r#"{{"action":{}}}"#, action_json(5, status, completed_at))
        };
        let routes = Routes::default()
            .on("/v2/actions/5", 200, envelope("in-progress", None))
            .on("/v2/actions/5", 503, "")
            .on("/v2/actions/5", 200, envelope("in-progress", None))
            .on("/v2/actions/5", 200, envelope("completed", Some("2024-05-01T10:05:00Z")));
        let api = client(routes);

        let policy = WaitPolicy::from_poll_seconds(1)
            .expect("policy")
            .with_retry(RetryPolicy {
                max_retries: 2,
                initial_backoff: Duration::from_millis(100),
                max_backoff: Duration::from_secs(1),
            });
        let waiter = ActionWaiter::new(api.actions(), policy);

        let action = waiter
            .wait_for_completion(ActionId(5), &CancellationToken::new())
            .await
            .expect("wait");

        assert_eq!(action.status, "completed");
        assert_eq!(api_targets(&api).len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_gives_up_on_a_permanent_api_error() {
        let api = client(Routes::default().on(
            "/v2/actions/5",
            403,
            r#"{"id":"forbidden","message":"no"}"#,
        ));
        let waiter = ActionWaiter::new(api.actions(), WaitPolicy::default());

        let err = waiter
            .wait_for_completion(ActionId(5), &CancellationToken::new())
            .await
            .expect_err("should fail");

        assert!(matches!(err, WaitError::Fetch(ApiError::Status { .. })));
    }
}
