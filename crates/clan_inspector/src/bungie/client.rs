//! Bungie.net API client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::convert::{to_activity_detail, to_activity_summary, to_clan_member, to_roster_character};
use super::error::BungieError;
use super::types::{
    ActivityHistory, BungieEnvelope, ERROR_CODE_SUCCESS, GroupMembers, PostGameCarnageReport,
    ProfileResponse,
};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport};
use crate::platform::{
    self, ActivityDetail, ActivitySource, ActivitySummary, ClanMember, RosterCharacter,
    RosterSource,
};

/// Default platform root.
pub const DEFAULT_BASE_URL: &str = "https://www.bungie.net/Platform";

/// Default number of activities requested per history page (the API maximum).
pub const DEFAULT_ACTIVITY_BATCH_SIZE: u32 = 250;

/// Profile component id for character summaries.
const CHARACTERS_COMPONENT: &str = "200";

/// Bungie.net platform API client.
///
/// Holds no global state: the API key, membership type and transport are all
/// supplied at construction.
#[derive(Clone)]
pub struct BungieClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    membership_type: i32,
    clan_id: Option<String>,
    activity_batch_size: u32,
}

impl BungieClient {
    /// Create a client against the public API with a 30 second timeout.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = BungieClient::new("api-key", 3)?.with_clan_id("1234567");
    /// ```
    pub fn new(api_key: &str, membership_type: i32) -> Result<Self, BungieError> {
        Self::with_timeout(api_key, membership_type, StdDuration::from_secs(30))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        api_key: &str,
        membership_type: i32,
        timeout: StdDuration,
    ) -> Result<Self, BungieError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| BungieError::Config(e.to_string()))?;

        Ok(Self::new_with_transport(
            DEFAULT_BASE_URL,
            api_key,
            membership_type,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        base_url: &str,
        api_key: &str,
        membership_type: i32,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            membership_type,
            clan_id: None,
            activity_batch_size: DEFAULT_ACTIVITY_BATCH_SIZE,
        }
    }

    /// Set the clan (group) id used by roster calls.
    #[must_use]
    pub fn with_clan_id(mut self, clan_id: impl Into<String>) -> Self {
        self.clan_id = Some(clan_id.into());
        self
    }

    /// Set the history page size. Clamped to 1..=250.
    #[must_use]
    pub fn with_activity_batch_size(mut self, size: u32) -> Self {
        self.activity_batch_size = size.clamp(1, DEFAULT_ACTIVITY_BATCH_SIZE);
        self
    }

    /// Point the client at a different platform root (proxies, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn membership_type(&self) -> i32 {
        self.membership_type
    }

    pub fn activity_batch_size(&self) -> u32 {
        self.activity_batch_size
    }

    /// Build an endpoint URL from path segments and query pairs.
    ///
    /// Segments are percent-encoded and the path always ends with `/`, which
    /// the platform requires.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, BungieError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BungieError::Config(format!("invalid base URL {}: {}", self.base_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| BungieError::Config(format!("base URL cannot be a base: {}", self.base_url)))?;
            path.pop_if_empty().extend(segments).push("");
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET an endpoint and unwrap the platform envelope.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, BungieError> {
        let endpoint = url.path().to_string();
        tracing::debug!(url = %url, "GET");

        let request = HttpRequest::get(url.as_str())
            .header("Accept", "application/json")
            .header("User-Agent", "clan-inspector")
            .header("X-API-Key", self.api_key.as_str());

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| BungieError::Http(e.to_string()))?;

        // Error responses usually still carry an envelope with a useful
        // error code, so try that before falling back to the HTTP status.
        let envelope: BungieEnvelope<T> = match serde_json::from_slice(&response.body) {
            Ok(envelope) => envelope,
            Err(_) if !response.is_success() => {
                return Err(BungieError::Status {
                    status: response.status,
                    message: String::from_utf8_lossy(&response.body).to_string(),
                });
            }
            Err(e) => return Err(BungieError::Json(e)),
        };

        if envelope.error_code != ERROR_CODE_SUCCESS {
            return Err(BungieError::Api {
                error_code: envelope.error_code,
                error_status: envelope.error_status,
                message: envelope.message,
                throttle_seconds: envelope.throttle_seconds,
            });
        }

        envelope
            .response
            .ok_or(BungieError::EmptyResponse { endpoint })
    }

    /// List one page of a character's activity history.
    pub async fn get_activity_history(
        &self,
        membership_id: &str,
        character_id: &str,
        page: u32,
    ) -> Result<ActivityHistory, BungieError> {
        let membership_type = self.membership_type.to_string();
        let url = self.endpoint(
            &[
                "Destiny2",
                &membership_type,
                "Account",
                membership_id,
                "Character",
                character_id,
                "Stats",
                "Activities",
            ],
            &[
                ("count", self.activity_batch_size.to_string()),
                ("page", page.to_string()),
            ],
        )?;
        self.get(url).await
    }

    /// Fetch a post-game carnage report.
    pub async fn get_pgcr(&self, instance_id: &str) -> Result<PostGameCarnageReport, BungieError> {
        let url = self.endpoint(
            &["Destiny2", "Stats", "PostGameCarnageReport", instance_id],
            &[],
        )?;
        self.get(url).await
    }

    /// Fetch every page of the clan member list.
    pub async fn get_clan_members(&self) -> Result<Vec<super::types::GroupMember>, BungieError> {
        let clan_id = self
            .clan_id
            .as_deref()
            .ok_or_else(|| BungieError::Config("clan id is not configured".to_string()))?;

        let mut members = Vec::new();
        let mut page = 1u32;
        loop {
            let url = self.endpoint(
                &["GroupV2", clan_id, "Members"],
                &[("currentPage", page.to_string())],
            )?;
            let batch: GroupMembers = self.get(url).await?;
            let has_more = batch.has_more && !batch.results.is_empty();
            members.extend(batch.results);
            if !has_more {
                break;
            }
            page += 1;
        }
        Ok(members)
    }

    /// Fetch the character summaries on a member's profile.
    pub async fn get_profile_characters(
        &self,
        membership_type: i32,
        membership_id: &str,
    ) -> Result<Vec<super::types::ProfileCharacter>, BungieError> {
        let membership_type = membership_type.to_string();
        let url = self.endpoint(
            &["Destiny2", &membership_type, "Profile", membership_id],
            &[("components", CHARACTERS_COMPONENT.to_string())],
        )?;
        let profile: ProfileResponse = self.get(url).await?;

        let mut characters: Vec<_> = profile
            .characters
            .map(|c| c.data.into_values().collect())
            .unwrap_or_default();
        characters.sort_by(|a, b| a.character_id.cmp(&b.character_id));
        Ok(characters)
    }
}

#[async_trait]
impl ActivitySource for BungieClient {
    async fn list_activity_summaries(
        &self,
        membership_id: &str,
        character_id: &str,
        page: u32,
    ) -> platform::Result<Vec<ActivitySummary>> {
        let history = self
            .get_activity_history(membership_id, character_id, page)
            .await?;
        Ok(history.activities.iter().map(to_activity_summary).collect())
    }

    async fn fetch_activity_detail(&self, instance_id: &str) -> platform::Result<ActivityDetail> {
        let report = self.get_pgcr(instance_id).await?;
        Ok(to_activity_detail(&report))
    }
}

#[async_trait]
impl RosterSource for BungieClient {
    async fn list_clan_members(&self) -> platform::Result<Vec<ClanMember>> {
        let members = self.get_clan_members().await?;
        Ok(members.iter().map(to_clan_member).collect())
    }

    async fn list_member_characters(
        &self,
        member: &ClanMember,
    ) -> platform::Result<Vec<RosterCharacter>> {
        let characters = self
            .get_profile_characters(member.membership_type, &member.membership_id)
            .await?;
        Ok(characters.iter().map(to_roster_character).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockTransport, header_get};
    use crate::platform::PlatformError;

    const BASE: &str = "https://bungie.test/Platform";

    fn client(transport: &MockTransport) -> BungieClient {
        BungieClient::new_with_transport(BASE, "key-123", 3, Arc::new(transport.clone()))
            .with_clan_id("42")
    }

    fn ok(response: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "Response": response,
            "ErrorCode": 1,
            "ThrottleSeconds": 0,
            "ErrorStatus": "Success",
            "Message": "Ok",
            "MessageData": {}
        })
    }

    fn history_url(page: u32) -> String {
        format!("{BASE}/Destiny2/3/Account/m1/Character/c1/Stats/Activities/?count=250&page={page}")
    }

    #[test]
    fn test_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<BungieClient>();
    }

    #[test]
    fn test_new_normalizes_base_url_and_clamps_batch_size() {
        let transport = MockTransport::new();
        let client = BungieClient::new_with_transport(
            "https://bungie.test/Platform//",
            "key",
            1,
            Arc::new(transport),
        )
        .with_activity_batch_size(1000);
        assert_eq!(client.base_url(), "https://bungie.test/Platform");
        assert_eq!(client.activity_batch_size(), 250);
        assert_eq!(client.membership_type(), 1);
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let transport = MockTransport::new();
        let url = client(&transport)
            .endpoint(&["Destiny2", "Stats", "PostGameCarnageReport", "a b/c"], &[])
            .expect("url");
        assert_eq!(
            url.as_str(),
            format!("{BASE}/Destiny2/Stats/PostGameCarnageReport/a%20b%2Fc/")
        );
    }

    #[tokio::test]
    async fn test_list_activity_summaries_sends_key_and_decodes_page() {
        let transport = MockTransport::new();
        transport.push_json(
            history_url(0),
            &ok(serde_json::json!({
                "activities": [
                    {"period": "2024-03-02T20:00:00Z", "activityDetails": {"instanceId": "A3", "mode": 4, "directorActivityHash": 10}},
                    {"period": "2024-03-01T20:00:00Z", "activityDetails": {"instanceId": "A2", "mode": 5, "directorActivityHash": 11}}
                ]
            })),
        );

        let page = client(&transport)
            .list_activity_summaries("m1", "c1", 0)
            .await
            .expect("page");

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].instance_id, "A3");
        assert_eq!(page[1].mode, 5);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(header_get(&requests[0].headers, "x-api-key"), Some("key-123"));
    }

    #[tokio::test]
    async fn test_empty_history_page_is_end_of_history() {
        let transport = MockTransport::new();
        transport.push_json(history_url(3), &ok(serde_json::json!({})));

        let page = client(&transport)
            .list_activity_summaries("m1", "c1", 3)
            .await
            .expect("page");
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_error_code_is_remote_error() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/Destiny2/Stats/PostGameCarnageReport/999/"),
            &serde_json::json!({
                "ErrorCode": 1653,
                "ThrottleSeconds": 0,
                "ErrorStatus": "DestinyPGCRNotFound",
                "Message": "The activity you requested was not found.",
                "MessageData": {}
            }),
        );

        let err = client(&transport)
            .fetch_activity_detail("999")
            .await
            .expect_err("should fail");
        match err {
            PlatformError::Remote { code, message, .. } => {
                assert_eq!(code, 1653);
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_without_envelope_maps_status() {
        let transport = MockTransport::new();
        transport.push_response(
            format!("{BASE}/Destiny2/Stats/PostGameCarnageReport/1/"),
            HttpResponse {
                status: 503,
                headers: Vec::new(),
                body: b"<html>maintenance</html>".to_vec(),
            },
        );

        let err = client(&transport)
            .get_pgcr("1")
            .await
            .expect_err("should fail");
        assert!(matches!(err, BungieError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/Destiny2/Stats/PostGameCarnageReport/5/"),
            &ok(serde_json::json!({"activityDetails": {"instanceId": "5"}})),
        );

        let err = client(&transport)
            .fetch_activity_detail("5")
            .await
            .expect_err("missing period should fail");
        assert!(matches!(err, PlatformError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .fetch_activity_detail("nothing-registered")
            .await
            .expect_err("should fail");
        assert!(matches!(err, PlatformError::Network { .. }));
    }

    #[tokio::test]
    async fn test_list_clan_members_follows_has_more() {
        let transport = MockTransport::new();
        let member = |id: &str| {
            serde_json::json!({
                "destinyUserInfo": {"membershipId": id, "membershipType": 3, "displayName": format!("p{id}")}
            })
        };
        transport.push_json(
            format!("{BASE}/GroupV2/42/Members/?currentPage=1"),
            &ok(serde_json::json!({"results": [member("1"), member("2")], "hasMore": true})),
        );
        transport.push_json(
            format!("{BASE}/GroupV2/42/Members/?currentPage=2"),
            &ok(serde_json::json!({"results": [member("3")], "hasMore": false})),
        );

        let members = client(&transport).list_clan_members().await.expect("members");
        let ids: Vec<_> = members.iter().map(|m| m.membership_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(members[2].display_name, "p3");
    }

    #[tokio::test]
    async fn test_list_clan_members_requires_clan_id() {
        let transport = MockTransport::new();
        let client = BungieClient::new_with_transport(BASE, "k", 3, Arc::new(transport));
        let err = client.list_clan_members().await.expect_err("no clan id");
        assert!(matches!(err, PlatformError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_list_member_characters_sorted_by_id() {
        let transport = MockTransport::new();
        let character = |id: &str| {
            serde_json::json!({
                "membershipId": "m1",
                "characterId": id,
                "dateLastPlayed": "2024-03-05T10:00:00Z",
                "raceType": 0,
                "genderType": 0,
                "classType": 1
            })
        };
        transport.push_json(
            format!("{BASE}/Destiny2/2/Profile/m1/?components=200"),
            &ok(serde_json::json!({
                "characters": {"data": {"c2": character("c2"), "c1": character("c1")}}
            })),
        );

        let member = ClanMember {
            membership_id: "m1".to_string(),
            membership_type: 2,
            display_name: "p".to_string(),
            icon_path: None,
        };
        let characters = client(&transport)
            .list_member_characters(&member)
            .await
            .expect("characters");
        let ids: Vec<_> = characters.iter().map(|c| c.character_id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }
}
