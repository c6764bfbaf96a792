// HTTP surface: session lifecycle and batch endpoints.

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use quad_pendulum::config::SimConfig;
use quad_pendulum::ui::{configure, AppState};
use serde_json::{json, Value};

fn state() -> web::Data<AppState> {
    web::Data::new(AppState::new(SimConfig::interactive()).unwrap())
}

#[actix_web::test]
async fn session_lifecycle() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let req = test::TestRequest::get().uri("/api/session").to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["simulate"], false);
    assert_eq!(snap["steps"], 0);

    // ticks while paused do nothing
    let req = test::TestRequest::post()
        .uri("/api/session/advance")
        .set_json(json!({ "frames": 3 }))
        .to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["steps"], 0);

    let req = test::TestRequest::post().uri("/api/session/toggle").to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["simulate"], true);

    let req = test::TestRequest::post()
        .uri("/api/session/advance")
        .set_json(json!({ "frames": 4 }))
        .to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["steps"], 4);
    assert_eq!(snap["angles_degrees"].as_array().unwrap().len(), 4);

    let req = test::TestRequest::post().uri("/api/session/reset").to_request();
    let snap: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(snap["steps"], 0);
    assert_eq!(snap["simulate"], false);
}

#[actix_web::test]
async fn oversized_advance_is_rejected() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/session/advance")
        .set_json(json!({ "frames": 1_000_000 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn report_uses_text_layout() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/report")
        .set_json(json!({
            "lengths": "100,100,100,100",
            "masses": "1,1,1,1",
            "initial_angles": "90,90,90,90",
            "dt": 0.025,
            "steps": 2
        }))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.starts_with("Time 0.00 seconds:\n  Joint 1: Angle: 180.00 degrees\n"));
    assert_eq!(text.lines().count(), 10);
}

#[actix_web::test]
async fn report_rejects_bad_timestep() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/report")
        .set_json(json!({
            "lengths": "1,1,1,1",
            "masses": "1,1,1,1",
            "initial_angles": "10,10,10,10",
            "dt": 0.0,
            "steps": 5
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn simulate_reports_validation_errors() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/simulate")
        .set_json(json!({
            "lengths": "1,1,1,1",
            "masses": "1,1,1",
            "initial_angles": "45,45,45,45",
            "dt": 0.025,
            "steps": 10
        }))
        .to_request();
    let out: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(out["success"], false);
    assert!(out["error"].as_str().unwrap().contains("masses"));
}
