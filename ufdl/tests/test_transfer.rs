use rstest::*;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use ufdl::errors::UfdlError;
use ufdl::types::Pk;
use ufdl::{Connection, ServerUrl};

use helpers::*;

mod helpers;

const IDLE: Duration = Duration::from_millis(400);

/// Serve one response whose body is `chunks` bytes, sent one at a time with
/// `pause` before each.
async fn trickle(chunks: usize, pause: Duration) -> ServerUrl {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await.unwrap();
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\nContent-Length: {}\r\n\r\n",
            chunks
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        for _ in 0..chunks {
            tokio::time::sleep(pause).await;
            if socket.write_all(b"x").await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }
    });
    ServerUrl::new(format!("http://{}", addr)).unwrap()
}

fn connect_to(url: ServerUrl) -> Connection {
    let username = random_username();
    let storage = seeded_storage_at(&url, &username);
    Connection::build(url, username, PASSWORD)
        .token_storage(storage)
        .timeout(IDLE)
        .build()
        .unwrap()
}

#[rstest]
#[tokio::test]
async fn test_slow_steady_download_outlasts_timeout() -> AnyResult {
    let conn = connect_to(trickle(8, Duration::from_millis(100)).await);
    let started = Instant::now();
    let body = conn.datasets().download(Pk(1)).await?;
    assert_eq!(body.as_ref(), b"xxxxxxxx");
    assert!(started.elapsed() > IDLE);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_slow_steady_download_to_file() -> AnyResult {
    let conn = connect_to(trickle(6, Duration::from_millis(100)).await);
    let dir = tempfile::tempdir()?;
    let dst = camino::Utf8PathBuf::from_path_buf(dir.path().join("slow.zip")).unwrap();
    assert_eq!(conn.datasets().download_to(Pk(1), &dst).await?, 6);
    assert_eq!(fs_err::read(dst.as_std_path())?, b"xxxxxx");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_stalled_download_fails() {
    let conn = connect_to(trickle(3, Duration::from_secs(2)).await);
    let error = conn.jobs().get_output(Pk(1), "model", "pth").await.unwrap_err();
    assert!(matches!(error, UfdlError::Stalled(idle) if idle == IDLE));
}

#[rstest]
#[tokio::test]
async fn test_api_calls_keep_total_timeout() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"pk": 1, "name": "p", "team": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let conn = connect_to(server_url(&server));
    let error = conn.projects().load(Pk(1)).await.unwrap_err();
    assert!(matches!(&error, UfdlError::Raw(e) if e.is_timeout()));
}
