/// Common test utilities for the group service integration tests.
/// Provides a scripted transport, a recording event sink, and response-tree
/// builders. Transport and sink share one trace so tests can assert on the
/// order of interactions across both collaborators.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use arbor_groups::node::attrs;
use arbor_groups::{
    EventSink, GroupError, GroupEvent, GroupService, HistoryRecord, Jid, Node, QueryTransport,
    Result, UpsertMode,
};

/// Local identity used by every test service.
pub const ME: &str = "me@u.arbor";

/// Makes the crate's log output visible under `RUST_LOG`. Safe to call from
/// every test; only the first call installs the logger.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One observed interaction, in the order it happened.
#[derive(Debug, Clone)]
pub enum TraceEntry {
    Query(Node),
    Emit(GroupEvent),
    Upsert(HistoryRecord, UpsertMode),
}

pub type Trace = Arc<Mutex<Vec<TraceEntry>>>;

pub fn new_trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

/// Transport answering from a script of canned results. Each query is
/// recorded into the shared trace before the scripted answer is returned.
pub struct FakeTransport {
    trace: Trace,
    script: Mutex<VecDeque<Result<Node>>>,
    /// Simulated round-trip time, slept through before answering.
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn new(trace: Trace) -> Self {
        FakeTransport {
            trace,
            script: Mutex::new(VecDeque::new()),
            delay: None,
        }
    }

    pub fn with_delay(trace: Trace, delay: Duration) -> Self {
        FakeTransport {
            trace,
            script: Mutex::new(VecDeque::new()),
            delay: Some(delay),
        }
    }

    pub async fn push_response(&self, response: Result<Node>) {
        self.script.lock().await.push_back(response);
    }
}

#[async_trait]
impl QueryTransport for FakeTransport {
    async fn query(&self, request: Node) -> Result<Node> {
        self.trace.lock().await.push(TraceEntry::Query(request));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(GroupError::Transport("script exhausted".to_string())))
    }
}

/// Event sink recording into the shared trace. A failing sink exercises the
/// best-effort side-effect paths.
pub struct RecordingEvents {
    trace: Trace,
    failing: bool,
}

impl RecordingEvents {
    pub fn new(trace: Trace) -> Self {
        RecordingEvents {
            trace,
            failing: false,
        }
    }

    pub fn failing(trace: Trace) -> Self {
        RecordingEvents {
            trace,
            failing: true,
        }
    }
}

#[async_trait]
impl EventSink for RecordingEvents {
    async fn upsert_record(&self, record: HistoryRecord, mode: UpsertMode) -> Result<()> {
        if self.failing {
            return Err(GroupError::Event("sink rejected record".to_string()));
        }
        self.trace.lock().await.push(TraceEntry::Upsert(record, mode));
        Ok(())
    }

    async fn emit(&self, event: GroupEvent) -> Result<()> {
        if self.failing {
            return Err(GroupError::Event("sink rejected event".to_string()));
        }
        self.trace.lock().await.push(TraceEntry::Emit(event));
        Ok(())
    }
}

/// Service over a plain scripted transport and a recording sink.
pub fn setup_service(trace: &Trace) -> (GroupService, Arc<FakeTransport>) {
    let transport = Arc::new(FakeTransport::new(trace.clone()));
    let events = Arc::new(RecordingEvents::new(trace.clone()));
    let service = GroupService::new(transport.clone(), events, Jid::new(ME));
    (service, transport)
}

/// Response envelope with the given children.
pub fn response(children: Vec<Node>) -> Node {
    Node::with_children("iq", attrs(&[]), children)
}

/// Response envelope carrying one group node.
pub fn group_response(pairs: &[(&str, &str)], children: Vec<Node>) -> Node {
    response(vec![Node::with_children("group", attrs(pairs), children)])
}

/// Bare acknowledgement, optionally naming the responding group.
pub fn ack(from: Option<&str>) -> Node {
    match from {
        Some(from) => Node::with_attrs("iq", attrs(&[("from", from)])),
        None => Node::new("iq"),
    }
}

/// Participant node with no role attribute.
pub fn participant(jid: &str) -> Node {
    Node::with_attrs("participant", attrs(&[("jid", jid)]))
}

/// Participant node with extra attributes (role, error code).
pub fn participant_with(jid: &str, pairs: &[(&str, &str)]) -> Node {
    let mut all = vec![("jid", jid)];
    all.extend_from_slice(pairs);
    Node::with_attrs("participant", attrs(&all))
}

/// The trace's queries, in order.
pub async fn queries(trace: &Trace) -> Vec<Node> {
    trace
        .lock()
        .await
        .iter()
        .filter_map(|entry| match entry {
            TraceEntry::Query(node) => Some(node.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_replays_script_in_order() {
        let trace = new_trace();
        let transport = FakeTransport::new(trace.clone());
        transport.push_response(Ok(ack(Some("1@g.arbor")))).await;
        transport.push_response(Ok(ack(None))).await;

        let first = transport.query(Node::new("iq")).await.unwrap();
        let second = transport.query(Node::new("iq")).await.unwrap();
        assert_eq!(first.attr("from"), Some("1@g.arbor"));
        assert_eq!(second.attr("from"), None);

        // Exhausted scripts fail rather than hanging.
        assert!(transport.query(Node::new("iq")).await.is_err());
        assert_eq!(queries(&trace).await.len(), 3);
    }

    #[test]
    fn test_group_response_shape() {
        let node = group_response(&[("id", "9")], vec![participant("a@u.arbor")]);
        let group = node.child("group").unwrap();
        assert_eq!(group.attr("id"), Some("9"));
        assert_eq!(group.children("participant").len(), 1);
    }
}
