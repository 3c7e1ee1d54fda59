// tests/integration/demos_run.rs

use std::path::PathBuf;

use unitdag::config::load_and_validate;
use unitdag::dag::UnitGraph;
use unitdag::errors::UnitdagError;
use unitdag::report::RunSummary;
use unitdag::Status;
use unitdag_test_utils::{init_tracing, with_timeout};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

fn graph_for(name: &str) -> UnitGraph {
    let cfg = load_and_validate(demo(name)).expect("demo config should load");
    UnitGraph::from_config(&cfg).expect("demo config should build")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn basic_demo_succeeds() {
    init_tracing();
    let graph = graph_for("basic.toml");

    with_timeout(graph.run_all(|_| {})).await.unwrap();

    let clear = graph.get("Clear Logs").unwrap();
    assert_eq!(clear.return_code(), 7);
    assert_eq!(clear.status(), Status::Succeeded);
    assert_eq!(graph.get("Update Bundler").unwrap().status(), Status::Succeeded);
    assert!(RunSummary::from_graph(&graph).all_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pipeline_demo_routes_around_the_failing_test() {
    init_tracing();
    let graph = graph_for("pipeline.toml");

    with_timeout(graph.run_all(|_| {})).await.unwrap();

    let statuses: Vec<(String, Status)> = graph
        .units()
        .iter()
        .map(|u| (u.name().to_string(), u.status()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("build".to_string(), Status::Succeeded),
            ("test".to_string(), Status::Failed),
            ("deploy".to_string(), Status::DependenciesNotMet),
            ("announce".to_string(), Status::DependenciesNotMet),
            ("report failure".to_string(), Status::Succeeded),
        ]
    );
    assert_eq!(graph.get("test").unwrap().stderr(), "1 test failed\n");

    let summary = RunSummary::from_graph(&graph);
    assert!(!summary.all_ok());
    let text = summary.render(false);
    assert!(text.contains("[FAIL] test"));
    assert!(text.contains("[ok  ] report failure"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cycle_demo_deadlocks() {
    init_tracing();
    let graph = graph_for("cycle.toml");

    let err = with_timeout(graph.run_all(|_| {})).await.unwrap_err();

    match err {
        UnitdagError::Deadlock(report) => {
            assert!(report.contains("A: Waiting\n\t- B (Waiting, needs Succeeded)"));
        }
        other => panic!("expected Deadlock, got {other:?}"),
    }
}
