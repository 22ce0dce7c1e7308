//! End-to-end test of the provisioning workflow against a mock feed
//! host and lock service.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{Duration as ChronoDuration, Local};
    use reqwest::Client;

    use doorman::booking;
    use doorman::core::{AppConfig, RoomConfig};
    use doorman::feed;
    use doorman::lock::HttpLockClient;
    use doorman::report;
    use doorman::workflow::{self, Pacing};

    fn feed_body(start: &str, end: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:eviivo-booking-ABC123\r\n\
DTSTART;VALUE=DATE:{start}\r\n\
DTEND;VALUE=DATE:{end}\r\n\
SUMMARY:Reserved\r\n\
DESCRIPTION:John Smith +447911123456\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:eviivo-booking-DEF456\r\n\
DTSTART;VALUE=DATE:{start}\r\n\
DTEND;VALUE=DATE:{end}\r\n\
SUMMARY:Reserved\r\n\
DESCRIPTION:Walk-in guest no contact details\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n"
        )
    }

    fn config(base_url: &str, rooms: Vec<RoomConfig>) -> AppConfig {
        AppConfig {
            api_base_url: base_url.to_string(),
            client_id: "client-123".to_string(),
            access_token: "token-456".to_string(),
            front_door_lock_id: 20641052,
            request_timeout_secs: 5,
            rooms,
        }
    }

    #[tokio::test]
    async fn it_provisions_codes_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let now = Local::now().naive_local();
        let start = (now.date() + ChronoDuration::days(2)).format("%Y%m%d").to_string();
        let end = (now.date() + ChronoDuration::days(5)).format("%Y%m%d").to_string();

        let _feed_mock = server
            .mock("GET", "/rooms/room-1/ical.ics")
            .with_status(200)
            .with_header("content-type", "text/calendar")
            .with_body(feed_body(&start, &end))
            .create();

        // Two bookings, but only the one with a phone number reaches
        // the lock service: front door + room lock = 2 calls.
        let lock_mock = server
            .mock("POST", "/v3/keyboardPwd/add")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"keyboardPwdId": 101, "errcode": 0, "errmsg": "success"}"#)
            .expect(2)
            .create();

        let config = config(
            &server.url(),
            vec![RoomConfig {
                name: "Room 1".to_string(),
                lock_id: 21318606,
                feed_url: format!("{}/rooms/room-1/ical.ics", server.url()),
            }],
        );

        let http = Client::new();
        let fetched = feed::fetch_all(&http, &config.rooms).await;
        let feeds: Vec<(String, String)> = fetched
            .into_iter()
            .filter_map(|(room, result)| result.ok().map(|text| (room, text)))
            .collect();

        let bookings = booking::collect_bookings(&feeds, now);
        assert_eq!(bookings.len(), 2);

        let client = HttpLockClient::new(
            &config.api_base_url,
            &config.client_id,
            &config.access_token,
            Duration::from_secs(5),
        )
        .unwrap();

        let records =
            workflow::process_bookings(&client, &config, &bookings, now, &Pacing::none()).await;
        lock_mock.assert_async().await;

        assert_eq!(records.len(), 2);

        let provisioned = records
            .iter()
            .find(|r| r.booking_id == "ABC123")
            .unwrap();
        assert_eq!(provisioned.phone_code.as_deref(), Some("3456"));
        assert!(provisioned.front_door_success);
        assert!(provisioned.room_code_success);
        assert!(provisioned.failure_reason.is_none());

        let skipped = records
            .iter()
            .find(|r| r.booking_id == "DEF456")
            .unwrap();
        assert!(skipped.phone_code.is_none());
        assert!(!skipped.front_door_success);
        assert!(!skipped.room_code_success);

        let summary = report::summarize(&records);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.no_code, 1);
        assert_eq!(summary.failed_or_partial, 0);
        assert_eq!(
            summary.total,
            summary.no_code + summary.succeeded + summary.failed_or_partial
        );

        let dir = tempfile::tempdir().unwrap();
        let path = report::write_csv(&records, dir.path()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        // Header plus one row per record
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains("ABC123"));
        assert!(contents.contains("None"));
    }

    #[tokio::test]
    async fn it_survives_one_room_feed_failing() {
        let mut server = mockito::Server::new_async().await;
        let now = Local::now().naive_local();
        let start = (now.date() + ChronoDuration::days(2)).format("%Y%m%d").to_string();
        let end = (now.date() + ChronoDuration::days(5)).format("%Y%m%d").to_string();

        let _ok_feed = server
            .mock("GET", "/rooms/room-1/ical.ics")
            .with_status(200)
            .with_body(feed_body(&start, &end))
            .create();
        let _bad_feed = server
            .mock("GET", "/rooms/room-2/ical.ics")
            .with_status(500)
            .create();

        let config = config(
            &server.url(),
            vec![
                RoomConfig {
                    name: "Room 1".to_string(),
                    lock_id: 21318606,
                    feed_url: format!("{}/rooms/room-1/ical.ics", server.url()),
                },
                RoomConfig {
                    name: "Room 2".to_string(),
                    lock_id: 21321678,
                    feed_url: format!("{}/rooms/room-2/ical.ics", server.url()),
                },
            ],
        );

        let http = Client::new();
        let fetched = feed::fetch_all(&http, &config.rooms).await;
        let feeds: Vec<(String, String)> = fetched
            .into_iter()
            .filter_map(|(room, result)| result.ok().map(|text| (room, text)))
            .collect();

        // Room 2 contributes nothing; Room 1 is unaffected
        let bookings = booking::collect_bookings(&feeds, now);
        assert_eq!(bookings.len(), 2);
        assert!(bookings.iter().all(|b| b.room == "Room 1"));
    }

    #[tokio::test]
    async fn it_treats_existing_codes_as_success_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let now = Local::now().naive_local();
        let start = (now.date() + ChronoDuration::days(1)).format("%Y%m%d").to_string();
        let end = (now.date() + ChronoDuration::days(3)).format("%Y%m%d").to_string();

        let _feed_mock = server
            .mock("GET", "/rooms/room-1/ical.ics")
            .with_status(200)
            .with_body(feed_body(&start, &end))
            .create();

        let _lock_mock = server
            .mock("POST", "/v3/keyboardPwd/add")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errcode": -3007, "errmsg": "The password already exists"}"#)
            .expect(2)
            .create();

        let config = config(
            &server.url(),
            vec![RoomConfig {
                name: "Room 1".to_string(),
                lock_id: 21318606,
                feed_url: format!("{}/rooms/room-1/ical.ics", server.url()),
            }],
        );

        let http = Client::new();
        let fetched = feed::fetch_all(&http, &config.rooms).await;
        let feeds: Vec<(String, String)> = fetched
            .into_iter()
            .filter_map(|(room, result)| result.ok().map(|text| (room, text)))
            .collect();

        let bookings = booking::collect_bookings(&feeds, now);
        let client = HttpLockClient::new(
            &config.api_base_url,
            &config.client_id,
            &config.access_token,
            Duration::from_secs(5),
        )
        .unwrap();

        let records =
            workflow::process_bookings(&client, &config, &bookings, now, &Pacing::none()).await;

        let provisioned = records
            .iter()
            .find(|r| r.booking_id == "ABC123")
            .unwrap();
        assert!(provisioned.front_door_success);
        assert!(provisioned.room_code_success);
        assert!(provisioned.codes_match);
    }
}
