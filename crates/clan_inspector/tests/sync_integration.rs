//! End-to-end tests: Bungie client over a canned transport, roster refresh
//! and activity sync into a migrated in-memory SQLite database.

#![cfg(all(feature = "sqlite", feature = "migrate", feature = "bungie"))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};

use clan_inspector::bungie::BungieClient;
use clan_inspector::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use clan_inspector::roster::refresh_roster;
use clan_inspector::sync::{
    ActivityStore, CharacterSyncDriver, CharacterSyncOutcome, DbActivityStore, SyncOptions,
    SyncWatermark,
};
use clan_inspector::{connect_and_migrate, repository};

const BASE: &str = "https://bungie.test/Platform";

/// Serves the same response for a URL every time it is requested.
#[derive(Clone, Default)]
struct CannedTransport {
    routes: Arc<Mutex<HashMap<String, Value>>>,
    hits: Arc<Mutex<Vec<String>>>,
}

impl CannedTransport {
    fn set(&self, url: String, response: Value) {
        let envelope = json!({
            "Response": response,
            "ErrorCode": 1,
            "ThrottleSeconds": 0,
            "ErrorStatus": "Success",
            "Message": "Ok"
        });
        self.routes.lock().unwrap().insert(url, envelope);
    }

    fn hits_matching(&self, needle: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains(needle))
            .count()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.hits.lock().unwrap().push(request.url.clone());
        let body = self
            .routes
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .ok_or(HttpError::NoMockResponse { url: request.url })?;
        Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string().into_bytes(),
        })
    }
}

fn hour(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(n)
}

fn history_url(membership_id: &str, character_id: &str, page: u32) -> String {
    format!(
        "{BASE}/Destiny2/3/Account/{membership_id}/Character/{character_id}/Stats/Activities/?count=250&page={page}"
    )
}

fn summary(instance_id: &str, period: DateTime<Utc>) -> Value {
    json!({
        "period": period.to_rfc3339(),
        "activityDetails": {"instanceId": instance_id, "mode": 5, "directorActivityHash": 7}
    })
}

fn pgcr(instance_id: &str, period: DateTime<Utc>, players: &[(&str, &str)]) -> Value {
    let entries: Vec<Value> = players
        .iter()
        .map(|(membership_id, character_id)| {
            json!({
                "standing": 0,
                "score": {"basic": {"value": 12.0, "displayValue": "12"}},
                "player": {
                    "destinyUserInfo": {"membershipId": membership_id, "membershipType": 3, "displayName": membership_id},
                    "characterClass": "Hunter",
                    "classHash": 671679327,
                    "lightLevel": 1810
                },
                "characterId": character_id,
                "values": {"timePlayedSeconds": {"basic": {"value": 900.0, "displayValue": "15m"}}}
            })
        })
        .collect();
    json!({
        "period": period.to_rfc3339(),
        "activityDetails": {"instanceId": instance_id, "referenceId": 1, "directorActivityHash": 7, "mode": 5, "modes": [5]},
        "entries": entries
    })
}

fn profile_character(membership_id: &str, character_id: &str, last_played: DateTime<Utc>) -> Value {
    json!({
        "membershipId": membership_id,
        "characterId": character_id,
        "dateLastPlayed": last_played.to_rfc3339(),
        "raceType": 2,
        "genderType": 1,
        "classType": 1
    })
}

/// Two members who played two activities together; m1 also played one solo.
fn seed(transport: &CannedTransport, last_played: DateTime<Utc>) {
    transport.set(
        format!("{BASE}/GroupV2/99/Members/?currentPage=1"),
        json!({
            "results": [
                {"destinyUserInfo": {"membershipId": "m1", "membershipType": 3, "displayName": "Ikora"}},
                {"destinyUserInfo": {"membershipId": "m2", "membershipType": 3, "displayName": "Cayde"}}
            ],
            "hasMore": false
        }),
    );
    for (m, c) in [("m1", "c1"), ("m2", "c2")] {
        transport.set(
            format!("{BASE}/Destiny2/3/Profile/{m}/?components=200"),
            json!({"characters": {"data": {c: profile_character(m, c, last_played)}}}),
        );
    }

    transport.set(
        history_url("m1", "c1", 0),
        json!({"activities": [summary("A3", hour(3)), summary("A2", hour(2)), summary("A1", hour(1))]}),
    );
    transport.set(history_url("m1", "c1", 1), json!({}));
    transport.set(
        history_url("m2", "c2", 0),
        json!({"activities": [summary("A3", hour(3)), summary("A2", hour(2))]}),
    );
    transport.set(history_url("m2", "c2", 1), json!({}));

    let together = [("m1", "c1"), ("m2", "c2")];
    transport.set(
        format!("{BASE}/Destiny2/Stats/PostGameCarnageReport/A3/"),
        pgcr("A3", hour(3), &together),
    );
    transport.set(
        format!("{BASE}/Destiny2/Stats/PostGameCarnageReport/A2/"),
        pgcr("A2", hour(2), &together),
    );
    transport.set(
        format!("{BASE}/Destiny2/Stats/PostGameCarnageReport/A1/"),
        pgcr("A1", hour(1), &[("m1", "c1")]),
    );
}

fn client(transport: &CannedTransport) -> BungieClient {
    BungieClient::new_with_transport(BASE, "test-key", 3, Arc::new(transport.clone()))
        .with_clan_id("99")
}

#[tokio::test]
async fn test_roster_then_sync_stores_each_activity_once() {
    let db = connect_and_migrate("sqlite::memory:").await.unwrap();
    let transport = CannedTransport::default();
    seed(&transport, hour(4));
    let client = client(&transport);

    let roster = refresh_roster(&client, &db, None).await.expect("roster");
    assert_eq!(roster.members, 2);
    assert_eq!(roster.characters, 2);

    let store = DbActivityStore::new(db);
    let db = store.connection();
    let options = SyncOptions::default();
    let characters = store.list_tracked_characters().await.unwrap();
    let summary = CharacterSyncDriver::new(&client, &store, &options)
        .run(characters)
        .await;

    assert_eq!(summary.synced(), 2);
    assert_eq!(summary.failed(), 0);
    // c2's two activities were already stored while syncing c1.
    match &summary.results[1].outcome {
        CharacterSyncOutcome::Synced(report) => {
            assert_eq!(report.inserted, 0);
            assert_eq!(report.duplicates, 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(repository::activity::count(db).await.unwrap(), 3);

    assert_eq!(
        store.load_watermark("c1").await.unwrap(),
        SyncWatermark::new("A3", hour(3))
    );
    assert_eq!(
        store.load_watermark("c2").await.unwrap(),
        SyncWatermark::new("A3", hour(3))
    );

    let a3 = repository::activity::find_by_instance_id(db, "A3")
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(a3.entry_count, 2);
    assert!(a3.has_participant("m2"));
}

#[tokio::test]
async fn test_second_run_skips_characters_without_new_play() {
    let db = connect_and_migrate("sqlite::memory:").await.unwrap();
    let transport = CannedTransport::default();
    // Last played within the cutoff of the newest activity.
    seed(&transport, hour(3) + Duration::minutes(30));
    let client = client(&transport);
    refresh_roster(&client, &db, None).await.unwrap();

    let store = DbActivityStore::new(db);
    let db = store.connection();
    let options = SyncOptions::default();
    let driver = CharacterSyncDriver::new(&client, &store, &options);

    driver
        .run(store.list_tracked_characters().await.unwrap())
        .await;
    let pgcr_fetches = transport.hits_matching("PostGameCarnageReport");

    let second = driver
        .run(store.list_tracked_characters().await.unwrap())
        .await;

    assert_eq!(second.skipped(), 2);
    assert_eq!(transport.hits_matching("PostGameCarnageReport"), pgcr_fetches);
    assert_eq!(repository::activity::count(db).await.unwrap(), 3);
}

#[tokio::test]
async fn test_missing_report_fails_only_that_character() {
    let db = connect_and_migrate("sqlite::memory:").await.unwrap();
    let transport = CannedTransport::default();
    seed(&transport, hour(4));
    // c1 sees an activity whose report the API cannot serve.
    transport.set(
        history_url("m1", "c1", 0),
        json!({"activities": [summary("A9", hour(9)), summary("A1", hour(1))]}),
    );
    let client = client(&transport);
    refresh_roster(&client, &db, None).await.unwrap();

    let store = DbActivityStore::new(db);
    let options = SyncOptions::default();
    let summary = CharacterSyncDriver::new(&client, &store, &options)
        .run(store.list_tracked_characters().await.unwrap())
        .await;

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.errors()[0].0, "c1");
    assert_eq!(store.load_watermark("c1").await.unwrap(), SyncWatermark::never_synced());
    assert_eq!(
        store.load_watermark("c2").await.unwrap(),
        SyncWatermark::new("A3", hour(3))
    );
}
