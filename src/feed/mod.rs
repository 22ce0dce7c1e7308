//! Fetches per-room iCal feeds over HTTP.

use anyhow::Result;
use reqwest::Client;

use crate::core::RoomConfig;

/// Fetch a single feed, returning the raw iCal text.
pub async fn fetch_feed(client: &Client, url: &str) -> Result<String> {
    let res = client.get(url).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Feed fetch failed: {} ({})", status, text);
    }
    Ok(text)
}

/// Fetch every room's feed sequentially. One room failing must not
/// stop the others, so each result is returned alongside its room for
/// the caller to log and filter.
pub async fn fetch_all(client: &Client, rooms: &[RoomConfig]) -> Vec<(String, Result<String>)> {
    let mut results = Vec::with_capacity(rooms.len());
    for room in rooms {
        let result = fetch_feed(client, &room.feed_url).await;
        if let Err(e) = &result {
            tracing::error!(room = %room.name, error = %e, "feed_fetch_failed");
        }
        results.push((room.name.clone(), result));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str, feed_url: String) -> RoomConfig {
        RoomConfig {
            name: name.to_string(),
            lock_id: 1,
            feed_url,
        }
    }

    #[tokio::test]
    async fn it_fetches_feed_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rooms/room-1/ical.ics")
            .with_status(200)
            .with_header("content-type", "text/calendar")
            .with_body("BEGIN:VCALENDAR\nEND:VCALENDAR\n")
            .create();

        let client = Client::new();
        let url = format!("{}/rooms/room-1/ical.ics", server.url());
        let text = fetch_feed(&client, &url).await.unwrap();
        assert!(text.contains("BEGIN:VCALENDAR"));
    }

    #[tokio::test]
    async fn it_fails_on_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rooms/room-1/ical.ics")
            .with_status(404)
            .create();

        let client = Client::new();
        let url = format!("{}/rooms/room-1/ical.ics", server.url());
        assert!(fetch_feed(&client, &url).await.is_err());
    }

    #[tokio::test]
    async fn it_isolates_per_room_failures() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/ok.ics")
            .with_status(200)
            .with_body("BEGIN:VCALENDAR\nEND:VCALENDAR\n")
            .create();
        let _bad = server
            .mock("GET", "/bad.ics")
            .with_status(500)
            .create();

        let rooms = vec![
            room("Room 1", format!("{}/ok.ics", server.url())),
            room("Room 2", format!("{}/bad.ics", server.url())),
        ];

        let client = Client::new();
        let results = fetch_all(&client, &rooms).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "Room 1");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "Room 2");
        assert!(results[1].1.is_err());
    }
}
