// End-to-end protocol tests over plaintext TCP: framing, verdict
// wording, malformed input policy, and concurrent correctness.

mod common;

use common::{query_line, query_raw, spawn_server, test_config, TestCorpus};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[tokio::test]
async fn test_exact_verdict_wording() {
    let corpus = TestCorpus::new(&["apple", "banana", "cherry"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    assert_eq!(query_line(addr, "banana").await, "STRING EXISTS\n");
    assert_eq!(query_line(addr, "grape").await, "STRING NOT FOUND\n");
}

#[tokio::test]
async fn test_static_staleness_then_live_freshness() {
    // The concrete scenario: grape is appended after startup
    let mut corpus = TestCorpus::new(&["apple", "banana", "cherry"]);

    let static_addr = spawn_server(test_config(corpus.path(), false)).await;
    assert_eq!(query_line(static_addr, "grape").await, "STRING NOT FOUND\n");

    corpus.append_line("grape");
    assert_eq!(query_line(static_addr, "grape").await, "STRING NOT FOUND\n");

    let live_addr = spawn_server(test_config(corpus.path(), true)).await;
    assert_eq!(query_line(live_addr, "grape").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_nul_padded_request_matches() {
    let corpus = TestCorpus::new(&["apple"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    assert_eq!(query_raw(addr, b"apple\0\0\0\0\n").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_crlf_terminated_request_matches() {
    let corpus = TestCorpus::new(&["apple"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    assert_eq!(query_raw(addr, b"apple\r\n").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_half_close_terminated_request_matches() {
    let corpus = TestCorpus::new(&["apple"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    // No newline at all; EOF ends the frame
    assert_eq!(query_raw(addr, b"apple").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_interior_whitespace_is_significant() {
    let corpus = TestCorpus::new(&["two  spaces"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    assert_eq!(query_line(addr, "two  spaces").await, "STRING EXISTS\n");
    assert_eq!(query_line(addr, "two spaces").await, "STRING NOT FOUND\n");
}

#[tokio::test]
async fn test_empty_query_is_answered() {
    let corpus = TestCorpus::new(&["apple"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    assert_eq!(query_raw(addr, b"\n").await, "STRING NOT FOUND\n");
}

#[tokio::test]
async fn test_oversized_query_rejected_not_truncated() {
    // "apple" plus padding past the buffer must NOT match "apple"
    let corpus = TestCorpus::new(&["apple"]);
    let mut config = test_config(corpus.path(), false);
    config.limits.request_buffer_bytes = 64;
    let addr = spawn_server(config).await;

    let mut request = b"apple".to_vec();
    request.extend(std::iter::repeat(b'x').take(128));
    assert_eq!(query_raw(addr, &request).await, "STRING NOT FOUND\n");
}

#[tokio::test]
async fn test_invalid_utf8_query_is_answered() {
    let corpus = TestCorpus::new(&["apple"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    assert_eq!(
        query_raw(addr, &[0xc3, 0x28, b'\n']).await,
        "STRING NOT FOUND\n"
    );
}

#[tokio::test]
async fn test_connection_closes_after_one_response() {
    let corpus = TestCorpus::new(&["apple"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"apple\n").await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    assert_eq!(response, b"STRING EXISTS\n");

    // read_to_end returning means the server closed; a second read
    // sees a clean EOF
    let mut buf = [0u8; 16];
    assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn test_session_failure_does_not_affect_listener() {
    let corpus = TestCorpus::new(&["apple"]);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    // Abort a connection mid-request
    let stream = TcpStream::connect(addr).await.unwrap();
    drop(stream);

    // The listener keeps serving
    assert_eq!(query_line(addr, "apple").await, "STRING EXISTS\n");
}

#[tokio::test]
async fn test_concurrent_clients_get_uncrossed_responses() {
    let lines: Vec<String> = (0..10_000).map(|i| format!("line-{i:05}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let corpus = TestCorpus::new(&refs);
    let addr = spawn_server(test_config(corpus.path(), false)).await;

    let mut tasks = Vec::new();
    for i in 0..64 {
        tasks.push(tokio::spawn(async move {
            // Half the clients query a present line, half a missing one
            if i % 2 == 0 {
                let query = format!("line-{:05}", i * 137 % 10_000);
                (query_line(addr, &query).await, "STRING EXISTS\n")
            } else {
                let query = format!("missing-{i}");
                (query_line(addr, &query).await, "STRING NOT FOUND\n")
            }
        }));
    }

    for task in tasks {
        let (actual, expected) = task.await.unwrap();
        assert_eq!(actual, expected);
    }
}

#[tokio::test]
async fn test_concurrent_clients_in_live_mode() {
    let lines: Vec<String> = (0..1_000).map(|i| format!("row-{i:04}")).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let corpus = TestCorpus::new(&refs);
    let addr = spawn_server(test_config(corpus.path(), true)).await;

    let mut tasks = Vec::new();
    for i in 0..32 {
        tasks.push(tokio::spawn(async move {
            let query = format!("row-{:04}", i * 31 % 1_000);
            query_line(addr, &query).await
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), "STRING EXISTS\n");
    }
}

#[tokio::test]
async fn test_connection_bound_queues_rather_than_fails() {
    let corpus = TestCorpus::new(&["apple"]);
    let mut config = test_config(corpus.path(), false);
    config.server.max_connections = 2;
    let addr = spawn_server(config).await;

    // Far more clients than permits; all must eventually be served
    let mut tasks = Vec::new();
    for _ in 0..16 {
        tasks.push(tokio::spawn(
            async move { query_line(addr, "apple").await },
        ));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), "STRING EXISTS\n");
    }
}

#[tokio::test]
async fn test_query_log_records_served_lookups() {
    let corpus = TestCorpus::new(&["apple"]);
    let log_dir = tempfile::tempdir().unwrap();
    let log_path = log_dir.path().join("queries.jsonl");

    let mut config = test_config(corpus.path(), false);
    config.logging.query_log_file = Some(log_path.clone());
    let addr = spawn_server(config).await;

    assert_eq!(query_line(addr, "apple").await, "STRING EXISTS\n");
    assert_eq!(query_line(addr, "grape").await, "STRING NOT FOUND\n");

    // The writer task drains asynchronously
    let mut records = Vec::new();
    for _ in 0..100 {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let contents = std::fs::read_to_string(&log_path).unwrap_or_default();
        records = contents
            .lines()
            .map(|line| serde_json::from_str::<haystack::QueryRecord>(line).unwrap())
            .collect();
        if records.len() == 2 {
            break;
        }
    }

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].query, "apple");
    assert_eq!(records[0].verdict, haystack::Verdict::Found);
    assert_eq!(records[1].query, "grape");
    assert_eq!(records[1].verdict, haystack::Verdict::NotFound);
}
