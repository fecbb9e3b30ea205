/// Integration tests for the application layer
mod test_utilities;

use std::sync::Arc;
use test_utilities::fixtures::{self, BIG_LOT, BIG_LOT_PARTS, JOB, NESTED_POINTER, POINTERS};
use test_utilities::mocks::*;
use tokio::sync::Semaphore;
use wo_hierarchy::prelude::*;

type TestSession = HierarchySession<Arc<MockQueryGateway>, Arc<RecordingEventSink>>;

fn session_with(gateway: MockQueryGateway) -> (TestSession, Arc<MockQueryGateway>, Arc<RecordingEventSink>) {
    let gateway = Arc::new(gateway);
    let events = Arc::new(RecordingEventSink::new());
    let session = HierarchySession::new(
        Arc::clone(&gateway),
        Arc::clone(&events),
        &HierarchyConfig::default(),
    );
    (session, gateway, events)
}

fn big_lot_anchor() -> WorkOrderKey {
    fixtures::key(BIG_LOT, 1)
}

fn first_pointer() -> WorkOrderKey {
    fixtures::key(BIG_LOT, POINTERS[0].0)
}

#[tokio::test]
async fn test_job_8113_resolves_one_root_per_lot() {
    let (session, gateway, events) = session_with(fixtures::job_8113_gateway());

    let summary = session.load_job(JOB).await.unwrap();

    assert_eq!(fixtures::job_8113_rows().len(), 702);
    assert_eq!(summary.root_count, 15);
    assert_eq!(summary.unresolved_count, 0);
    assert_eq!(summary.anomaly_count, 0);
    assert_eq!(gateway.assembly_calls(), 1);
    assert_eq!(gateway.child_calls(), 0);
    assert_eq!(events.jobs_loaded(), vec![(JobNumber::new(JOB).unwrap(), 15)]);

    let roots = session.roots().unwrap();
    let lots: Vec<&str> = roots.iter().map(|root| root.key.lot_id()).collect();
    let expected: Vec<String> = fixtures::lot_ids();
    assert_eq!(lots, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_big_lot_children_are_numerically_ordered() {
    let (session, _gateway, _events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();

    let root = session.node(&big_lot_anchor()).unwrap();

    assert_eq!(root.children.len(), BIG_LOT_PARTS - 1);
    let subs: Vec<u32> = root
        .children
        .iter()
        .map(|child| child.key.sub_id().as_str().parse().unwrap())
        .collect();
    let expected: Vec<u32> = (2..=BIG_LOT_PARTS as u32).collect();
    assert_eq!(subs, expected);
}

#[tokio::test]
async fn test_expanding_big_lot_returns_single_loaded_batch() {
    let (session, gateway, _events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();

    let expanded = session.expand(&big_lot_anchor()).await.unwrap();

    assert_eq!(expanded.children.len(), BIG_LOT_PARTS - 1);
    assert_eq!(gateway.child_calls(), 0);
    let root = session.node(&big_lot_anchor()).unwrap();
    assert_eq!(root.expansion_state, ExpansionState::Loaded);
}

#[tokio::test]
async fn test_pointer_expansion_fetches_subordinate_slice() {
    let (session, gateway, events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();

    let before = session.node(&first_pointer()).unwrap();
    assert_eq!(before.expansion_state, ExpansionState::Unloaded);
    assert_eq!(before.node_type, NodeType::Assembly);

    let expanded = session.expand(&first_pointer()).await.unwrap();

    assert!(expanded.fetched);
    assert_eq!(expanded.children.len(), 10);
    assert_eq!(
        gateway.child_calls_for(&fixtures::key(BIG_LOT, POINTERS[0].1)),
        1
    );
    assert_eq!(events.expanded(), vec![first_pointer()]);

    let after = session.node(&first_pointer()).unwrap();
    assert_eq!(after.expansion_state, ExpansionState::Loaded);
    assert_eq!(after.children.len(), 10);
    let nested = after
        .children
        .iter()
        .find(|child| child.key == fixtures::key(BIG_LOT, NESTED_POINTER.0))
        .unwrap();
    assert_eq!(nested.expansion_state, ExpansionState::Unloaded);
}

#[tokio::test]
async fn test_search_covers_loaded_nodes_only() {
    let (session, gateway, _events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();

    assert_eq!(
        session.search("COMPONENT 50 OF LOT 26").unwrap(),
        vec![first_pointer()]
    );
    assert!(session.search("s-50").unwrap().is_empty());
    assert_eq!(session.part_ids().unwrap().len(), 14 * 25 + BIG_LOT_PARTS);

    session.expand(&first_pointer()).await.unwrap();

    let expected: Vec<WorkOrderKey> = (5001..=5010).map(|sub| fixtures::key(BIG_LOT, sub)).collect();
    assert_eq!(session.search("s-50").unwrap(), expected);
    let part_ids = session.part_ids().unwrap();
    assert_eq!(part_ids.len(), 14 * 25 + BIG_LOT_PARTS + 10);
    assert!(part_ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(gateway.child_calls(), 1);
}

#[test]
fn test_expand_from_thread_outside_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let gateway = Arc::new(fixtures::job_8113_gateway());
    let events = Arc::new(RecordingEventSink::new());
    let session = SessionFactory::create_on(
        runtime.handle().clone(),
        Arc::clone(&gateway),
        Arc::clone(&events),
        &HierarchyConfig::default(),
    );
    runtime.block_on(session.load_job(JOB)).unwrap();

    // The interactive thread is not a runtime worker
    let expanded = futures::executor::block_on(session.expand(&first_pointer())).unwrap();

    assert_eq!(expanded.children.len(), 10);
    assert_eq!(gateway.child_calls(), 1);
    assert_eq!(events.expanded(), vec![first_pointer()]);
    assert_eq!(
        session.node(&first_pointer()).unwrap().expansion_state,
        ExpansionState::Loaded
    );
}

#[tokio::test]
async fn test_double_expand_issues_one_fetch() {
    let gate = Arc::new(Semaphore::new(0));
    let (session, gateway, events) =
        session_with(fixtures::job_8113_gateway().with_gate(Arc::clone(&gate)));
    session.load_job(JOB).await.unwrap();

    let first = session.expand(&first_pointer());
    let second = session.expand(&first_pointer());
    assert_eq!(
        session.node(&first_pointer()).unwrap().expansion_state,
        ExpansionState::Loading
    );

    gate.add_permits(1);
    let (first, second) = futures::join!(first, second);

    assert_eq!(first.unwrap().children, second.unwrap().children);
    assert_eq!(gateway.child_calls(), 1);
    assert_eq!(events.expanded().len(), 1);
}

#[tokio::test]
async fn test_sibling_expansions_complete_independently() {
    let (session, gateway, events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();

    let handles: Vec<_> = POINTERS
        .iter()
        .map(|(pointer, _)| session.expand(&fixtures::key(BIG_LOT, *pointer)))
        .collect();
    let outcomes = futures::future::join_all(handles).await;

    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(gateway.child_calls(), 3);
    assert_eq!(events.expanded().len(), 3);
}

#[tokio::test]
async fn test_failed_expand_stays_collapsed_and_retries() {
    let (session, gateway, events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();
    let fetch_key = fixtures::key(BIG_LOT, POINTERS[0].1);
    gateway.fail_children(
        fetch_key.clone(),
        HierarchyError::Connection {
            details: "socket closed".to_string(),
        },
    );

    let err = session.expand(&first_pointer()).await.unwrap_err();

    assert!(err.is_retryable());
    let node = session.node(&first_pointer()).unwrap();
    assert_eq!(
        node.expansion_state,
        ExpansionState::Error {
            reason: "connection error: socket closed".to_string()
        }
    );
    assert!(node.children.is_empty());
    assert_eq!(
        events.failures(),
        vec![(first_pointer(), "connection error: socket closed".to_string())]
    );
    // The rest of the tree is untouched
    assert_eq!(session.roots().unwrap().len(), 15);

    gateway.recover_children(&fetch_key);
    let expanded = session.expand(&first_pointer()).await.unwrap();
    assert_eq!(expanded.children.len(), 10);
    assert_eq!(gateway.child_calls_for(&fetch_key), 2);
}

#[tokio::test]
async fn test_restore_visited_job_without_fetches() {
    let gateway = fixtures::job_8113_gateway().with_job(
        "9001",
        vec![LegacyRow::new("9001", "1", "1")
            .with_part("PUMP")
            .with_part_flags(false, true)],
    );
    let (session, gateway, _events) = session_with(gateway);

    session.load_job(JOB).await.unwrap();
    session.expand(&first_pointer()).await.unwrap();
    let expanded_view = session.roots().unwrap();

    session.load_job("9001").await.unwrap();
    assert_eq!(session.current_job().unwrap().as_str(), "9001");

    let summary = session.load_job(JOB).await.unwrap();

    assert!(summary.from_cache);
    assert_eq!(session.roots().unwrap(), expanded_view);
    assert_eq!(gateway.assembly_calls(), 2);
    assert_eq!(gateway.child_calls(), 1);
}

#[tokio::test]
async fn test_result_discarded_after_new_search() {
    let gate = Arc::new(Semaphore::new(0));
    let (session, _gateway, events) =
        session_with(fixtures::job_8113_gateway().with_gate(Arc::clone(&gate)));
    session.load_job(JOB).await.unwrap();

    let pending = session.expand(&first_pointer());
    session.new_search();
    gate.add_permits(1);

    let err = pending.await.unwrap_err();
    assert!(!err.is_user_visible());
    assert!(session.current_job().is_none());
    assert!(events.expanded().is_empty());
    assert!(events.failures().is_empty());
}

#[tokio::test]
async fn test_expand_all_loads_nested_assemblies() {
    let (session, gateway, _events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();

    let summary = session.expand_all().await.unwrap();

    assert_eq!(summary.expanded, POINTERS.len() + 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(gateway.child_calls(), POINTERS.len() + 1);
    let nested = session
        .node(&fixtures::key(BIG_LOT, NESTED_POINTER.0))
        .unwrap();
    assert_eq!(nested.children.len(), 3);
}

#[tokio::test]
async fn test_header_only_lot_is_an_anomaly() {
    let rows = vec![
        LegacyRow::new("4711", "1", "0").with_status("Closed"),
        LegacyRow::new("4711", "1", "1").with_status("Closed"),
        LegacyRow::new("4711", "2", "0"),
        LegacyRow::new("4711", "2", "1")
            .with_part("VALVE")
            .with_part_flags(true, false),
    ];
    let (session, _gateway, _events) = session_with(MockQueryGateway::new().with_job("4711", rows));

    let summary = session.load_job("4711").await.unwrap();

    assert_eq!(summary.root_count, 1);
    assert_eq!(
        session.anomalies().unwrap(),
        vec![Anomaly::LotWithoutAnchor {
            base_id: "4711".to_string(),
            lot_id: "1".to_string()
        }]
    );
}

#[tokio::test]
async fn test_empty_job_is_valid() {
    let (session, _gateway, events) = session_with(MockQueryGateway::new());

    let summary = session.load_job("1234").await.unwrap();

    assert_eq!(summary.root_count, 0);
    assert!(session.roots().unwrap().is_empty());
    assert_eq!(events.jobs_loaded(), vec![(JobNumber::new("1234").unwrap(), 0)]);
}

#[tokio::test]
async fn test_unlinked_rows_are_kept_visible() {
    let rows = vec![
        LegacyRow::new("4711", "1", "1").with_part("FRAME"),
        LegacyRow::new("4712", "1", "1").with_part("STRAY"),
        LegacyRow::new("4711", "", "3").with_part("NO-LOT"),
    ];
    let (session, _gateway, _events) = session_with(MockQueryGateway::new().with_job("4711", rows));

    let summary = session.load_job("4711").await.unwrap();

    assert_eq!(summary.root_count, 1);
    assert_eq!(summary.unresolved_count, 2);
    let unresolved = session.unresolved().unwrap();
    assert_eq!(unresolved[0].row.part_id(), Some("STRAY"));
    assert_eq!(unresolved[1].row.part_id(), Some("NO-LOT"));
}

#[tokio::test]
async fn test_classification_follows_part_flags() {
    let anchor = WorkOrderKey::new("4711", "1", "1");
    let rows = vec![
        LegacyRow::new("4711", "1", "1")
            .with_part("FRAME")
            .with_part_flags(true, false),
        LegacyRow::new("4711", "1", "2")
            .with_part("BRACKET")
            .with_part_flags(true, false),
        LegacyRow::new("4711", "1", "3")
            .with_part("SCREW")
            .with_part_flags(true, true),
        LegacyRow::new("4711", "1", "4")
            .with_part("GEARBOX")
            .with_part_flags(true, false)
            .with_requirement(Requirement::new(anchor, Some("GEARBOX".to_string()), 1.0).with_subordinate("40")),
        LegacyRow::new("4711", "1", "5")
            .with_part("LABEL")
            .with_part_flags(false, false),
    ];
    let gearbox = WorkOrderKey::new("4711", "1", "40");
    let gateway = MockQueryGateway::new()
        .with_job("4711", rows)
        .with_children(gearbox, Vec::new());
    let (session, _gateway, _events) = session_with(gateway);
    session.load_job("4711").await.unwrap();

    let root = &session.roots().unwrap()[0];
    let types: Vec<NodeType> = root.children.iter().map(|c| c.node_type).collect();
    assert_eq!(root.node_type, NodeType::Assembly);
    assert_eq!(
        types,
        vec![
            NodeType::Manufactured,
            NodeType::Purchased,
            NodeType::Assembly,
            NodeType::Unknown
        ]
    );

    // An assembly pointer that turns out empty is re-derived as manufactured
    let pointer = WorkOrderKey::new("4711", "1", "4");
    let expanded = session.expand(&pointer).await.unwrap();
    assert!(expanded.children.is_empty());
    let node = session.node(&pointer).unwrap();
    assert_eq!(node.expansion_state, ExpansionState::Loaded);
    assert_eq!(node.node_type, NodeType::Manufactured);
}

#[tokio::test]
async fn test_view_model_serialization() {
    let (session, _gateway, _events) = session_with(fixtures::job_8113_gateway());
    session.load_job(JOB).await.unwrap();

    let view = session.node(&first_pointer()).unwrap();
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["key"]["baseId"], "8113");
    assert_eq!(json["key"]["lotId"], "26");
    assert_eq!(json["key"]["subId"], "50");
    assert_eq!(json["label"], "[C] 8113-5000/26 - P-26-50");
    assert_eq!(json["nodeType"], "ASSEMBLY");
    assert_eq!(json["expansionState"]["state"], "UNLOADED");
    assert!(json["children"].as_array().unwrap().is_empty());
}
