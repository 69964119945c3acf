//! Integration tests for `ApiClient` using wiremock HTTP mocks.

use civmap_client::{ApiClient, ClientError};
use civmap_core::{FacilityId, FacilityProvider, FacilityType, ReviewProvider};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, None, 30).expect("client construction should not fail")
}

#[tokio::test]
async fn get_facilities_returns_mapped_records() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "success": true,
        "error": null,
        "result": {
            "totalCount": 3,
            "items": [
                {
                    "id": 1,
                    "name": "Old Bazaar Grill",
                    "type": "Restaurant",
                    "latitude": 42.0007,
                    "longitude": 21.4375,
                    "phoneNumber": "+389 2 111 222"
                },
                {
                    "id": 2,
                    "name": "Broken Pin",
                    "type": "Shop",
                    "latitude": 123.0,
                    "longitude": 21.4
                },
                {
                    "id": 3,
                    "name": "Hotel Centar",
                    "type": "hotel",
                    "latitude": 41.9961,
                    "longitude": 21.4316,
                    "address": "Macedonia Square 1"
                }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/services/app/Facility/GetAll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let facilities = client.get_facilities().await.expect("should parse facilities");

    // The record with an impossible latitude is dropped.
    assert_eq!(facilities.len(), 2);
    assert_eq!(facilities[0].id, FacilityId(1));
    assert_eq!(facilities[0].facility_type, FacilityType::Restaurant);
    assert_eq!(
        facilities[0].contact.phone.as_deref(),
        Some("+389 2 111 222")
    );
    assert_eq!(facilities[1].facility_type, FacilityType::Hotel);
    assert_eq!(facilities[1].address.as_deref(), Some("Macedonia Square 1"));
}

#[tokio::test]
async fn get_reviews_passes_facility_id() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "success": true,
        "result": {
            "items": [
                {
                    "reviewerName": "Marija",
                    "rating": 5,
                    "text": "Best tavče gravče in town",
                    "creationTime": "2024-06-02T18:30:00",
                    "likeCount": 4,
                    "replyCount": 1
                },
                {
                    "reviewerName": "Petar",
                    "rating": 3,
                    "text": "ok",
                    "creationTime": "not a date"
                }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/services/app/Review/GetByFacility"))
        .and(query_param("facilityId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let reviews = client
        .get_reviews(FacilityId(7))
        .await
        .expect("should parse reviews");

    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].reviewer, "Marija");
    assert_eq!(reviews[0].like_count, 4);
    assert!(reviews[0].is_valid_rating());
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/services/app/Facility/GetAll"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": { "items": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri(), Some("secret-token"), 30).unwrap();
    let facilities = client.get_facilities().await.expect("authorized request");
    assert!(facilities.is_empty());
}

#[tokio::test]
async fn unsuccessful_envelope_returns_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "result": null,
            "error": { "code": 0, "message": "Current user did not login to the application!" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_facilities().await.unwrap_err();
    match err {
        ClientError::Api(msg) => assert!(
            msg.contains("did not login"),
            "unexpected message: {msg}"
        ),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_status_returns_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_facilities().await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_returns_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_facilities().await.unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn wrong_result_shape_names_the_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": { "items": [{ "id": "not-a-number" }] }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    match client.get_facilities().await.unwrap_err() {
        ClientError::Deserialize { context, .. } => assert_eq!(context, "Facility/GetAll"),
        other => panic!("expected Deserialize error, got {other:?}"),
    }
}
