use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    error::SourceError,
    geometry::Point,
    models::Detection,
    settings::SourceSettings,
};

/// Anything that can produce the current batch of tracked subjects.
pub trait DetectionSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Detection>, SourceError>> + Send;
}

/// Polls the NVR's `/api/events` endpoint for in-progress tracks.
pub struct EventApiSource {
    client: reqwest::Client,
    events_url: String,
    settings: SourceSettings,
}

impl EventApiSource {
    pub fn new(settings: SourceSettings) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let events_url = format!("{}/api/events", settings.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            events_url,
            settings,
        })
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }
}

impl DetectionSource for EventApiSource {
    async fn fetch(&self) -> Result<Vec<Detection>, SourceError> {
        let limit = self.settings.limit.to_string();
        let request = self
            .client
            .get(&self.events_url)
            .query(&[
                ("camera", self.settings.camera.as_str()),
                ("label", self.settings.label.as_str()),
                ("in_progress", "1"),
                ("limit", limit.as_str()),
            ])
            .send();

        let response = request.await.map_err(|err| {
            if err.is_timeout() {
                SourceError::Timeout(self.settings.timeout_secs)
            } else {
                SourceError::Transport(err)
            }
        })?;

        // Only a plain 200 carries an event list; 204 and friends are errors.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        decode_events(&body)
    }
}

/// Decodes an event list. The top level must be a JSON array; individual
/// events that do not have the expected shape become malformed detections
/// instead of failing the batch.
pub fn decode_events(body: &str) -> Result<Vec<Detection>, SourceError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| SourceError::Decode(err.to_string()))?;

    let events = value
        .as_array()
        .ok_or_else(|| SourceError::Decode("expected a JSON array of events".into()))?;

    Ok(events.iter().map(decode_event).collect())
}

fn decode_event(event: &Value) -> Detection {
    let last_point = event
        .pointer("/data/path_data")
        .and_then(Value::as_array)
        .and_then(|path| path.last());

    // Each path entry is `[[x, y], timestamp]`.
    let position = last_point
        .and_then(|entry| entry.get(0))
        .and_then(|coords| Some(Point::new(coords.get(0)?.as_f64()?, coords.get(1)?.as_f64()?)));

    let reported_at = last_point
        .and_then(|entry| entry.get(1))
        .and_then(Value::as_f64)
        .or_else(|| event.get("start_time").and_then(Value::as_f64));

    let zones = event
        .get("zones")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Detection {
        position,
        zones,
        reported_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    #[test]
    fn uses_last_path_point() {
        let body = r#"[
            {
                "id": "1718000000.1-abc",
                "start_time": 1718000000.1,
                "zones": [],
                "data": { "path_data": [
                    [[0.20, 0.90], 1718000001.0],
                    [[0.70, 0.90], 1718000004.5]
                ] }
            }
        ]"#;
        let detections = decode_events(body).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].position, Some(Point::new(0.70, 0.90)));
        assert_eq!(detections[0].reported_at, Some(1718000004.5));
    }

    #[test]
    fn keeps_zone_labels_and_marks_shapeless_events_malformed() {
        let body = r#"[
            { "zones": ["desk"], "start_time": 12.0, "data": {} },
            { "data": { "path_data": [["oops"]] } },
            "not an event"
        ]"#;
        let detections = decode_events(body).unwrap();
        assert_eq!(detections.len(), 3);
        assert_eq!(detections[0].zones, vec!["desk".to_string()]);
        assert_eq!(detections[0].position, None);
        assert_eq!(detections[0].reported_at, Some(12.0));
        assert!(!detections[0].is_malformed());
        assert!(detections[1].is_malformed());
        assert!(detections[2].is_malformed());
    }

    #[test]
    fn empty_list_is_a_valid_batch() {
        assert!(decode_events("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_or_garbage_is_a_decode_error() {
        assert!(matches!(
            decode_events(r#"{"error": "no such camera"}"#),
            Err(SourceError::Decode(_))
        ));
        assert!(matches!(decode_events("<html>"), Err(SourceError::Decode(_))));
    }

    #[test]
    fn builds_events_url_without_double_slash() {
        let source = EventApiSource::new(SourceSettings {
            base_url: "http://nvr.local:5000/".into(),
            ..SourceSettings::default()
        })
        .unwrap();
        assert_eq!(source.events_url(), "http://nvr.local:5000/api/events");
    }

    /// Serves one canned response per connection and reports each request line.
    async fn serve(responses: Vec<Option<String>>) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (lines_tx, lines_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let text = String::from_utf8_lossy(&request);
                let _ = lines_tx.send(text.lines().next().unwrap_or_default().to_string());

                match response {
                    Some(raw) => {
                        socket.write_all(raw.as_bytes()).await.unwrap();
                        socket.shutdown().await.unwrap();
                    }
                    // Hold the connection open without answering.
                    None => tokio::time::sleep(Duration::from_secs(10)).await,
                }
            }
        });

        (base_url, lines_rx)
    }

    fn source_for(base_url: String, timeout_secs: u64) -> EventApiSource {
        EventApiSource::new(SourceSettings {
            base_url,
            timeout_secs,
            ..SourceSettings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_maps_status_and_decodes_ok_body() {
        let body = r#"[{"zones":["desk"],"data":{"path_data":[[[0.7,0.9],5.0]]}}]"#;
        let ok = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, mut lines) = serve(vec![
            Some("HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".into()),
            Some("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".into()),
            Some(ok),
        ])
        .await;
        let source = source_for(base_url, 3);

        assert!(matches!(source.fetch().await, Err(SourceError::Status(503))));
        assert!(matches!(source.fetch().await, Err(SourceError::Status(204))));

        let detections = source.fetch().await.unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].position, Some(Point::new(0.7, 0.9)));
        assert_eq!(detections[0].zones, vec!["desk".to_string()]);

        let request_line = lines.recv().await.unwrap();
        assert!(request_line.starts_with("GET /api/events?"), "{request_line}");
        for param in ["camera=tapo_c222", "label=person", "in_progress=1", "limit=5"] {
            assert!(request_line.contains(param), "{param} missing from {request_line}");
        }
    }

    #[tokio::test]
    async fn unanswered_request_is_a_timeout() {
        let (base_url, _lines) = serve(vec![None]).await;
        let source = source_for(base_url, 1);

        assert!(matches!(source.fetch().await, Err(SourceError::Timeout(1))));
    }
}
