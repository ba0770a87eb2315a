#![allow(clippy::unwrap_used, clippy::expect_used)]

//! TahvelClient against a local mock server

use std::sync::Arc;

use chrono::NaiveDate;
use mockito::Matcher;
use tunniplaan_api::{ApiError, TahvelClient, TahvelConfig, ViewToken};
use tunniplaan_shared::{ReqwestTransport, TransportConfig};

fn client(server: &mockito::Server, token: &str) -> TahvelClient {
    let transport = Arc::new(ReqwestTransport::new(TransportConfig::default()).unwrap());
    TahvelClient::new(
        transport,
        token,
        TahvelConfig::new().with_base_url(format!("{}/hois_back", server.url())),
    )
}

#[tokio::test]
async fn test_get_user() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hois_back/user")
        .match_header("authorization", "Bearer XYZ")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"fullname":"Mari Maasikas","user":11,"school":{"id":7},"roleCode":"ROLL_T"}"#)
        .create_async()
        .await;

    let user = client(&server, "XYZ").get_user().await.unwrap();

    mock.assert_async().await;
    assert_eq!(user.display_name(), "Mari Maasikas");
    assert_eq!(user.user, Some(11));
    assert_eq!(user.role_code.as_deref(), Some("ROLL_T"));
}

#[tokio::test]
async fn test_get_user_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/hois_back/user")
        .with_status(401)
        .with_body("expired")
        .create_async()
        .await;

    let err = client(&server, "stale").get_user().await.unwrap_err();

    assert!(err.is_unauthorized());
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_get_user_malformed_json() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/hois_back/user")
        .with_status(200)
        .with_body("<html>login</html>")
        .create_async()
        .await;

    let err = client(&server, "XYZ").get_user().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn test_view_token_from_link_query() {
    let server = mockito::Server::new_async().await;
    let token = client(&server, "XYZ")
        .get_view_token("https://tahvel.edu.ee/#/timetable/personal?viewAuth=v-42")
        .await
        .unwrap();
    assert_eq!(token.expose(), "v-42");
}

#[tokio::test]
async fn test_view_token_from_redirect() {
    let mut server = mockito::Server::new_async().await;
    let short = server
        .mock("GET", "/s/abc")
        .with_status(302)
        .with_header("location", "/app?viewAuth=v-99")
        .create_async()
        .await;
    let _app = server
        .mock("GET", "/app")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    let token = client(&server, "XYZ")
        .get_view_token(&format!("{}/s/abc", server.url()))
        .await
        .unwrap();

    short.assert_async().await;
    assert_eq!(token.expose(), "v-99");
}

#[tokio::test]
async fn test_view_token_missing() {
    let mut server = mockito::Server::new_async().await;
    let _page = server
        .mock("GET", "/s/abc")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    let err = client(&server, "XYZ")
        .get_view_token(&format!("{}/s/abc", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingViewToken));
}

#[tokio::test]
async fn test_get_user_attributes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hois_back/timetableevents/timetableByPerson/userAttributes")
        .match_query(Matcher::UrlEncoded("viewAuth".into(), "v 1".into()))
        .with_status(200)
        .with_body(r#"[{"id":3,"schoolCode":"tptlive","role":"ROLL_T","studentGroup":"TA-24","default":true}]"#)
        .create_async()
        .await;

    let attributes = client(&server, "XYZ")
        .get_user_attributes(&ViewToken::new("v 1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0].school_code.as_deref(), Some("tptlive"));
    assert_eq!(attributes[0].is_default, Some(true));
}

#[tokio::test]
async fn test_get_timetable() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/hois_back/timetableevents/timetableByPerson")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("viewAuth".into(), "v-42".into()),
            Matcher::UrlEncoded("from".into(), "2026-10-12T00:00:00Z".into()),
            Matcher::UrlEncoded("thru".into(), "2026-10-18T00:00:00Z".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{
                "studyPeriods": "123",
                "isVocational": true,
                "school": {"id": 7, "nameEt": "Kool"},
                "generalTimetableCurriculum": {"studentGroupCode": "TA-24"},
                "timetableEvents": [{
                    "id": 1,
                    "nameEt": "Programmeerimine",
                    "date": "2026-10-12T00:00:00Z",
                    "timeStart": "08:30",
                    "timeEnd": "10:00",
                    "teachers": [{"id": 9, "name": "J. Tamm"}],
                    "rooms": [{"id": 2, "roomCode": "204", "buildingCode": "A"}],
                    "studentGroups": [{"id": 4, "code": "TA-24"}],
                    "isExam": false
                }]
            }"#,
        )
        .create_async()
        .await;

    let timetable = client(&server, "XYZ")
        .get_timetable(
            &ViewToken::new("v-42"),
            NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(timetable.is_vocational);
    assert_eq!(timetable.timetable_events.len(), 1);
    let event = &timetable.timetable_events[0];
    assert_eq!(event.name(), "Programmeerimine");
    assert_eq!(event.rooms[0].label(), "A-204");
    assert_eq!(event.teachers[0].name.as_deref(), Some("J. Tamm"));
    assert_eq!(
        timetable
            .general_timetable_curriculum
            .as_ref()
            .and_then(|c| c.student_group_code.as_deref()),
        Some("TA-24")
    );
}

#[tokio::test]
async fn test_get_timetable_error_hides_view_token() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/hois_back/timetableevents/timetableByPerson")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let day = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
    let err = client(&server, "XYZ")
        .get_timetable(&ViewToken::new("v-secret"), day, day)
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!err.to_string().contains("v-secret"));
}
