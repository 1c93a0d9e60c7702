//! End-to-end tests for the query lifecycle against a scripted mock engine:
//! submit, poll to completion, stream and coerce the result rows.

use async_trait::async_trait;
use bytes::Bytes;
use quarry_link::{
    DatabaseSummary, EngineTransport, EngineType, JobStatus, JobStatusResponse, QuarryLinkClient,
    QuarryLinkError, QuarryLinkTimeouts, Result, ServerStatus, TableSummary, WireValue,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted engine: a fixed status sequence (the last entry repeats), a
/// result schema, and a result body. Counts every call.
struct MockEngine {
    statuses: Mutex<VecDeque<JobStatus>>,
    result_schema: Option<String>,
    debug_stderr: Option<String>,
    body: Vec<u8>,
    tables: Vec<TableSummary>,
    submits: AtomicUsize,
    polls: AtomicUsize,
    fetches: AtomicUsize,
    kills: AtomicUsize,
}

impl MockEngine {
    fn new(statuses: Vec<JobStatus>, result_schema: Option<&str>, body: Vec<u8>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            result_schema: result_schema.map(|s| s.to_string()),
            debug_stderr: None,
            body,
            tables: Vec::new(),
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            kills: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EngineTransport for MockEngine {
    async fn submit_job(&self, _database: &str, _query: &str, _engine: EngineType) -> Result<String> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok("12345".to_string())
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            *statuses.front().expect("status script exhausted")
        };
        Ok(JobStatusResponse {
            job_id: job_id.to_string(),
            status,
            result_schema: if status == JobStatus::Success {
                self.result_schema.clone()
            } else {
                None
            },
            debug: self.debug_stderr.as_ref().map(|stderr| quarry_link::models::JobDebug {
                cmdout: None,
                stderr: Some(stderr.clone()),
            }),
        })
    }

    async fn fetch_result(&self, _job_id: &str) -> Result<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from(self.body.clone()))
    }

    async fn kill_job(&self, _job_id: &str) -> Result<()> {
        self.kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseSummary>> {
        Ok(vec![DatabaseSummary {
            name: "testdb".to_string(),
            count: Some(2),
            created_at: None,
        }])
    }

    async fn list_tables(&self, _database: &str) -> Result<Vec<TableSummary>> {
        Ok(self.tables.clone())
    }

    async fn server_status(&self) -> Result<ServerStatus> {
        Ok(ServerStatus {
            status: "ok".to_string(),
        })
    }
}

fn encode_rows(rows: &[Vec<WireValue>]) -> Vec<u8> {
    let mut body = Vec::new();
    for row in rows {
        body.extend(rmp_serde::to_vec(&WireValue::Array(row.clone())).unwrap());
    }
    body
}

fn client_over(engine: Arc<MockEngine>) -> QuarryLinkClient {
    QuarryLinkClient::builder()
        .transport(engine)
        .database("testdb")
        .timeouts(
            QuarryLinkTimeouts::builder()
                .poll_interval(Duration::from_millis(1))
                .build(),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_submit_poll_stream_roundtrip() {
    let body = encode_rows(&[
        vec![WireValue::Text("alice".to_string()), WireValue::Int(10)],
        vec![WireValue::Text("bob".to_string()), WireValue::Int(20)],
    ]);
    let engine = Arc::new(MockEngine::new(
        vec![JobStatus::Running, JobStatus::Success],
        Some(r#"[["name","string"],["score","int"]]"#),
        body,
    ));
    let client = client_over(Arc::clone(&engine));

    let mut cursor = client
        .execute_query("SELECT name, score FROM t")
        .await
        .unwrap();

    assert_eq!(cursor.schema().names(), vec!["name", "score"]);

    assert!(cursor.advance().await.unwrap());
    assert_eq!(cursor.get_string(1).unwrap(), Some("alice".to_string()));
    assert_eq!(cursor.get_int(2).unwrap(), 10);

    assert!(cursor.advance().await.unwrap());
    assert_eq!(cursor.get_string(1).unwrap(), Some("bob".to_string()));
    assert_eq!(cursor.get_int(2).unwrap(), 20);

    assert!(!cursor.advance().await.unwrap());

    assert_eq!(engine.submits.load(Ordering::SeqCst), 1);
    // one RUNNING observation plus the final SUCCESS
    assert_eq!(engine.polls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_max_rows_caps_the_cursor() {
    let rows: Vec<Vec<WireValue>> = (0..1000).map(|i| vec![WireValue::Int(i)]).collect();
    let engine = Arc::new(MockEngine::new(
        vec![JobStatus::Success],
        Some(r#"[["n","int"]]"#),
        encode_rows(&rows),
    ));
    let client = QuarryLinkClient::builder()
        .transport(Arc::clone(&engine) as Arc<dyn EngineTransport>)
        .database("testdb")
        .max_rows(10)
        .timeouts(QuarryLinkTimeouts::fast())
        .build()
        .unwrap();

    let mut cursor = client.execute_query("SELECT n FROM big").await.unwrap();
    let mut yielded = 0;
    while cursor.advance().await.unwrap() {
        yielded += 1;
    }
    assert_eq!(yielded, 10);
    assert!(!cursor.has_next().await.unwrap());
    // the cap cuts off decoding, not just iteration; the single body
    // fetch is all the network traffic there is
    assert_eq!(engine.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_job_surfaces_diagnostics() {
    let mut engine = MockEngine::new(vec![JobStatus::Running, JobStatus::Error], None, Vec::new());
    engine.debug_stderr = Some("line 3: table not found".to_string());
    let client = client_over(Arc::new(engine));

    let err = client.execute_query("SELECT * FROM nope").await.unwrap_err();
    match err {
        QuarryLinkError::JobFailed { job_id, message } => {
            assert_eq!(job_id, "12345");
            assert!(message.contains("table not found"));
        }
        other => panic!("expected JobFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_killed_job_fails() {
    let engine = Arc::new(MockEngine::new(vec![JobStatus::Killed], None, Vec::new()));
    let client = client_over(engine);

    let err = client.execute_query("SELECT 2").await.unwrap_err();
    assert!(matches!(err, QuarryLinkError::JobKilled { .. }));
}

#[tokio::test]
async fn test_timeout_leaves_the_job_running() {
    let engine = Arc::new(MockEngine::new(vec![JobStatus::Running], None, Vec::new()));
    let client = QuarryLinkClient::builder()
        .transport(Arc::clone(&engine) as Arc<dyn EngineTransport>)
        .database("testdb")
        .timeouts(
            QuarryLinkTimeouts::builder()
                .poll_interval(Duration::from_millis(20))
                .build(),
        )
        .build()
        .unwrap();

    let err = client
        .execute_query_in("testdb", "SELECT slow()", Some(Duration::from_millis(60)))
        .await
        .unwrap_err();

    assert!(matches!(err, QuarryLinkError::TimeoutError(_)));
    // local timeout never cancels the remote job
    assert_eq!(engine.kills.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_select_one_never_reaches_the_engine() {
    // a status script that would wedge any real submission
    let engine = Arc::new(MockEngine::new(vec![JobStatus::Killed], None, Vec::new()));
    let client = client_over(Arc::clone(&engine));

    let mut cursor = client.execute_query("select 1").await.unwrap();
    assert!(cursor.advance().await.unwrap());
    assert_eq!(cursor.get_int(1).unwrap(), 1);
    assert!(!cursor.advance().await.unwrap());

    assert_eq!(engine.submits.load(Ordering::SeqCst), 0);
    assert_eq!(engine.polls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_timestamp_gate_end_to_end() {
    let body = encode_rows(&[vec![
        WireValue::Text("2024-03-09 12:00:00".to_string()),
        WireValue::Text("2024-03-09 12:00:00".to_string()),
    ]]);
    let engine = Arc::new(MockEngine::new(
        vec![JobStatus::Success],
        Some(r#"[["as_text","string"],["as_ts","timestamp"]]"#),
        body,
    ));
    let client = client_over(engine);

    let mut cursor = client.execute_query("SELECT a, b FROM t").await.unwrap();
    cursor.advance().await.unwrap();

    // identical raw text: the declared column type decides
    assert!(matches!(
        cursor.get_timestamp(1).unwrap_err(),
        QuarryLinkError::TypeMismatch { .. }
    ));
    assert!(cursor.get_timestamp(2).unwrap().is_some());
}

#[tokio::test]
async fn test_null_values_fall_back_per_target_type() {
    let body = encode_rows(&[vec![WireValue::Nil]]);
    let engine = Arc::new(MockEngine::new(
        vec![JobStatus::Success],
        Some(r#"[["v","string"]]"#),
        body,
    ));
    let client = client_over(engine);

    let mut cursor = client.execute_query("SELECT v FROM t").await.unwrap();
    cursor.advance().await.unwrap();

    assert!(!cursor.get_bool(1).unwrap());
    assert_eq!(cursor.get_int(1).unwrap(), 0);
    assert_eq!(cursor.get_long(1).unwrap(), 0);
    assert_eq!(cursor.get_float(1).unwrap(), 0.0);
    assert_eq!(cursor.get_double(1).unwrap(), 0.0);
    assert_eq!(cursor.get_string(1).unwrap(), None);
    assert!(cursor.was_null());
}

#[tokio::test]
async fn test_wide_integer_roundtrip_and_narrowing() {
    let wide = 0x1_2345_6789i64;
    let body = encode_rows(&[vec![WireValue::BigInt(wide)]]);
    let engine = Arc::new(MockEngine::new(
        vec![JobStatus::Success],
        Some(r#"[["v","bigint"]]"#),
        body,
    ));
    let client = client_over(engine);

    let mut cursor = client.execute_query("SELECT v FROM t").await.unwrap();
    cursor.advance().await.unwrap();

    // the 64-bit value survives the wire exactly
    assert_eq!(cursor.get_long(1).unwrap(), wide);
    // narrowing keeps the low 32 bits, without an error
    assert_eq!(cursor.get_int(1).unwrap(), wide as i32);
}

#[tokio::test]
async fn test_catalog_surface() {
    let mut engine = MockEngine::new(vec![JobStatus::Success], None, Vec::new());
    engine.tables = vec![TableSummary {
        name: "events".to_string(),
        count: Some(42),
        schema: Some(r#"[["ts","timestamp"],["payload","string"]]"#.to_string()),
    }];
    let client = client_over(Arc::new(engine));

    let databases = client.list_databases().await.unwrap();
    assert_eq!(databases[0].name, "testdb");

    let tables = client.list_tables("testdb").await.unwrap();
    assert_eq!(tables.len(), 1);

    let schema = client.describe_table("testdb", "events").await.unwrap();
    assert_eq!(schema.len(), 2);
    assert!(schema.column(0).unwrap().is_timestamp());

    assert!(client
        .describe_table("testdb", "missing")
        .await
        .is_err());

    let status = client.server_status().await.unwrap();
    assert!(status.is_ok());
}
