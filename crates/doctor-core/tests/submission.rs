use axum::{http::StatusCode, routing::post, Json, Router};
use doctor_core::{
    AnalysisClient, Block, FieldId, FieldStore, FormController, JsonFileStore, UiState,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_service(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/analyze")
}

fn fill_required(controller: &mut FormController) {
    controller.input(FieldId::PatientName, "John Doe");
    controller.input(FieldId::Age, "45");
    controller.input(FieldId::Symptoms, "fever and chills");
}

#[tokio::test]
async fn two_agent_response_renders_accordion() {
    let endpoint = spawn_service(Router::new().route(
        "/analyze",
        post(|Json(body): Json<Value>| async move {
            assert!(body["text"].as_str().unwrap().contains("Allergies: None"));
            Json(json!([
                {"agent_type": "diagnostic", "response": {"content": {"text": "CAUTION: high fever\nRecommendation: rest"}}},
                {"agent_type": "medication", "response": {"content": {"text": "Take X"}}}
            ]))
        }),
    ))
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("fields.json")).unwrap();
    let mut controller = FormController::new(Box::new(store));
    fill_required(&mut controller);

    controller
        .submit(&AnalysisClient::new(&endpoint))
        .await
        .expect("submit accepted");

    let panels = controller.panels();
    assert_eq!(panels.len(), 2);
    assert_eq!(panels[0].title, "Diagnostic Analysis");
    assert_eq!(panels[1].title, "Medication Suggestions");
    assert!(panels[0].expanded);
    assert!(!panels[1].expanded);

    let blocks: Vec<&Block> = panels.iter().flat_map(|p| &p.blocks).collect();
    assert_eq!(
        blocks,
        vec![
            &Block::DangerAlert("CAUTION: high fever".to_string()),
            &Block::Recommendation("Recommendation: rest".to_string()),
            &Block::Paragraph("Take X".to_string()),
        ]
    );
}

#[tokio::test]
async fn server_error_shows_error_panel_and_reenables_submit() {
    let endpoint = spawn_service(Router::new().route(
        "/analyze",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    ))
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("fields.json")).unwrap();
    let mut controller = FormController::new(Box::new(store));
    fill_required(&mut controller);

    controller
        .submit(&AnalysisClient::new(&endpoint))
        .await
        .expect("submit accepted");

    assert_eq!(controller.state(), &UiState::Errored);
    assert!(controller.results_visible());
    assert!(!controller.loading_visible());
    assert!(controller.submit_control().enabled);
}

#[test]
fn saved_fields_come_back_and_clear_wipes_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fields.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        let mut controller = FormController::new(Box::new(store));
        controller.input(FieldId::Allergies, "sulfa drugs");
        controller.input(FieldId::Age, "61");
    }

    let store = JsonFileStore::open(&path).unwrap();
    let mut controller = FormController::new(Box::new(store));
    assert_eq!(controller.form().value(FieldId::Allergies), "sulfa drugs");
    assert_eq!(controller.form().value(FieldId::Age), "61");

    controller.clear();
    for id in FieldId::all() {
        assert_eq!(controller.form().value(id), "");
    }

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.get(FieldId::Allergies.as_str()), None);
}
