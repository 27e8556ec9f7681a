mod common;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use serial_test::serial;

use common::{bearer, TestState, JWT_SECRET};
use wayfinder_api::routes;

fn itinerary_body() -> Value {
    json!({
        "destination": "Lisbon",
        "start_date": "2025-06-01",
        "end_date": "2025-06-03",
        "plan": {"days": [{"day": 1, "activities": [{"title": "Tram 28"}]}]}
    })
}

#[actix_rt::test]
#[serial]
async fn test_missing_token_is_unauthorized() {
    std::env::set_var("AUTH_JWT_SECRET", JWT_SECRET);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(TestState::default().build()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/itineraries").to_request();
    let err = test::try_call_service(&app, req).await.err().unwrap();
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let err = test::try_call_service(&app, req).await.err().unwrap();
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
#[serial]
async fn test_itinerary_lifecycle_is_scoped_to_owner() {
    std::env::set_var("AUTH_JWT_SECRET", JWT_SECRET);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(TestState::default().build()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/itineraries")
        .insert_header(("Authorization", bearer("alice")))
        .set_json(itinerary_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let saved: Value = test::read_body_json(resp).await;
    assert_eq!(saved["title"], "Trip to Lisbon");
    assert_eq!(saved["user_id"], "alice");
    let id = saved["_id"]["$oid"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/itineraries")
        .insert_header(("Authorization", bearer("alice")))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Someone else can't see or delete it.
    let req = test::TestRequest::get()
        .uri(&format!("/api/itineraries/{}", id))
        .insert_header(("Authorization", bearer("bob")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/itineraries/{}", id))
        .insert_header(("Authorization", bearer("bob")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/itineraries/{}", id))
        .insert_header(("Authorization", bearer("alice")))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["plan"]["days"][0]["activities"][0]["title"], "Tram 28");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/itineraries/{}", id))
        .insert_header(("Authorization", bearer("alice")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
#[serial]
async fn test_malformed_id_is_bad_request() {
    std::env::set_var("AUTH_JWT_SECRET", JWT_SECRET);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(TestState::default().build()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/itineraries/nope")
        .insert_header(("Authorization", bearer("alice")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
#[serial]
async fn test_without_database_saved_trips_are_unavailable() {
    std::env::set_var("AUTH_JWT_SECRET", JWT_SECRET);
    let state = TestState {
        with_stores: false,
        ..TestState::default()
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.build()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/itineraries")
        .insert_header(("Authorization", bearer("alice")))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[actix_rt::test]
#[serial]
async fn test_profile_upsert_and_fetch() {
    std::env::set_var("AUTH_JWT_SECRET", JWT_SECRET);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(TestState::default().build()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", bearer("carol")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri("/api/profile")
        .insert_header(("Authorization", bearer("carol")))
        .set_json(json!({"display_name": "Carol", "passport_country": "ca", "interests": ["hiking"]}))
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["_id"], "carol");
    assert_eq!(saved["passport_country"], "CA");

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(("Authorization", bearer("carol")))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["display_name"], "Carol");
}
