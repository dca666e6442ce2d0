//! Integration tests for `PlacesClient` using wiremock HTTP mocks.

use rv_places::{PlacesClient, PlacesError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url(Some("test-key"), 8, 10, base_url)
        .expect("client construction should not fail")
        .with_retry_policy(0, 0)
}

#[tokio::test]
async fn find_place_returns_top_candidate() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "candidates": [
            { "place_id": "ChIJfirst" },
            { "place_id": "ChIJsecond" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/findplacefromtext/json"))
        .and(query_param("input", "Blue Bottle Plumbing Springfield"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let place_id = client
        .find_place("Blue Bottle Plumbing Springfield")
        .await
        .expect("should resolve query");

    assert_eq!(place_id, "ChIJfirst");
}

#[tokio::test]
async fn find_place_zero_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/findplacefromtext/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ZERO_RESULTS",
            "candidates": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.find_place("nonexistent shop").await.unwrap_err();

    assert!(
        matches!(err, PlacesError::NotFound { ref query } if query == "nonexistent shop"),
        "expected NotFound carrying the query, got: {err:?}"
    );
}

#[tokio::test]
async fn place_details_returns_profile_and_reviews() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "result": {
            "place_id": "ChIJdetails",
            "name": "Harbor Dental",
            "formatted_address": "9 Pier Ave",
            "formatted_phone_number": "+1 555 0188",
            "website": "https://harbordental.example",
            "rating": 4.8,
            "user_ratings_total": 412,
            "reviews": [
                { "author_name": "Sam", "rating": 5, "text": "Gentle and fast.", "time": 1754000000i64 },
                { "author_name": "Rita", "rating": 4, "text": "Friendly staff.", "time": 1753000000i64 }
            ],
            "types": ["dentist", "health"]
        }
    });

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "ChIJdetails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let details = client
        .place_details("ChIJdetails")
        .await
        .expect("should parse details");

    assert_eq!(details.name, "Harbor Dental");
    assert_eq!(details.user_ratings_total, Some(412));
    assert_eq!(details.reviews.len(), 2);
    assert_eq!(details.reviews[0].author_name, "Sam");
}

#[tokio::test]
async fn request_denied_maps_to_access_denied() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.place_details("ChIJdenied").await.unwrap_err();
    assert!(matches!(err, PlacesError::AccessDenied), "got: {err:?}");
}

#[tokio::test]
async fn bare_403_maps_to_blocked() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.place_details("ChIJblocked").await.unwrap_err();
    assert!(matches!(err, PlacesError::Blocked), "got: {err:?}");
}

#[tokio::test]
async fn unmapped_status_is_generic_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OVER_QUERY_LIMIT",
            "error_message": "Daily quota exceeded"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.place_details("ChIJquota").await.unwrap_err();
    assert!(
        matches!(err, PlacesError::Api(ref msg) if msg.contains("OVER_QUERY_LIMIT")),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn server_error_retries_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "result": { "place_id": "ChIJretry", "name": "Retry Cafe" }
        })))
        .mount(&server)
        .await;

    let client = PlacesClient::with_base_url(Some("test-key"), 8, 10, &server.uri())
        .expect("client")
        .with_retry_policy(2, 0);

    let details = client
        .place_details("ChIJretry")
        .await
        .expect("should succeed after retry");
    assert_eq!(details.name, "Retry Cafe");
}
