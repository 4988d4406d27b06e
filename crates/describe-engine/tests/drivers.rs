//! Task driver behavior against recording collaborators.

mod common;

use common::{FakeRenderer, FakeStats, FakeStore, StatsCall};
use describe_engine::{Describer, EngineError, FieldOutcome, SKIP_LEVEL};
use describe_model::{LineStyle, RunRequest, RunSpec, Sentinels, Task};

fn sentinels() -> Sentinels {
    Sentinels::parse(Some("-1"), Some("-1"), Some("!"), Some("19700101")).unwrap()
}

fn table_run(table: &str) -> RunSpec {
    RunSpec::from_request(RunRequest {
        table: Some(table.into()),
        image_types: Some("png".into()),
        out_dir: Some("out".into()),
        sentinels: sentinels(),
        ..Default::default()
    })
    .unwrap()
}

fn query_run(query: &str, xy: Option<&str>) -> RunSpec {
    RunSpec::from_request(RunRequest {
        query: Some(query.into()),
        xy: xy.map(str::to_string),
        image_types: Some("html".into()),
        sentinels: sentinels(),
        ..Default::default()
    })
    .unwrap()
}

fn people() -> FakeStore {
    FakeStore::default()
        .with_table(
            "people",
            &[
                ("age", "Int32"),
                ("score", "Nullable(Float64)"),
                ("tags.name", "Array(String)"),
            ],
        )
        .with_comment("people", "age", "years since birth")
}

#[test]
fn test_table_mode_synthesizes_queries_and_predicates() {
    let run = table_run("people");
    let (store, stats, renderer) = (people(), FakeStats::default(), FakeRenderer::default());

    let report = Describer::new(&run, &store, &stats, &renderer).drive().unwrap();
    assert_eq!(report.rendered(), 3);

    assert_eq!(
        *stats.calls.borrow(),
        vec![
            StatsCall::Histogram {
                query: "SELECT age FROM people".into(),
                field: "age".into(),
                predicate: Some("age != -1".into()),
            },
            StatsCall::Quantile {
                query: "SELECT score FROM people".into(),
                field: "score".into(),
                predicate: Some("score > -1".into()),
            },
            StatsCall::Histogram {
                query: "SELECT arrayJoin(tags.name) AS tags_name FROM people".into(),
                field: "tags_name".into(),
                predicate: Some("tags_name != '!'".into()),
            },
        ]
    );

    let artifacts = renderer.artifacts.borrow();
    let age = &artifacts[0].style;
    assert_eq!(age.title, "Histogram of age: years since birth\nn: 1,234");
    assert_eq!(age.x_title, "Level");
    assert_eq!(age.y_title, "Proportion");
    assert!(!age.legend);
    assert_eq!(age.file_stem, "age");
    assert_eq!(
        age.subtitle.as_deref(),
        Some("SELECT age FROM people WHERE age != -1")
    );

    let score = &artifacts[1].style;
    assert_eq!(score.title, "Quantile of score\nn: 1,234");
    assert_eq!(score.x_title, "u");
    assert_eq!(score.y_title, "score");

    let tags = &artifacts[2].style;
    assert_eq!(tags.file_stem, "tags_name");
    // quotes in the subtitle are replaced for the page script
    assert_eq!(
        tags.subtitle.as_deref(),
        Some("SELECT arrayJoin(tags.name) AS tags_name FROM people WHERE tags_name != `!`")
    );
}

#[test]
fn test_cardinality_guard() {
    let run = table_run("codes");
    let store = FakeStore::default().with_table(
        "codes",
        &[("wide", "String"), ("edge", "String"), ("after", "Int64")],
    );
    let stats = FakeStats::default()
        .with_levels("wide", SKIP_LEVEL + 1)
        .with_levels("edge", SKIP_LEVEL);
    let renderer = FakeRenderer::default();

    let report = Describer::new(&run, &store, &stats, &renderer).drive().unwrap();

    assert_eq!(
        report.outcomes[0],
        FieldOutcome::Skipped {
            field: "wide".into(),
            levels: 1001
        }
    );
    assert!(matches!(&report.outcomes[1], FieldOutcome::Rendered { field, .. } if field == "edge"));
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.rendered(), 2);

    let stems: Vec<String> = renderer
        .artifacts
        .borrow()
        .iter()
        .map(|a| a.style.file_stem.clone())
        .collect();
    assert_eq!(stems, vec!["edge", "after"]);
}

#[test]
fn test_query_mode_reuses_query() {
    let q = "SELECT price, city FROM sales WHERE year = 2024";
    let run = query_run(q, None);
    assert_eq!(run.task, Task::Query);
    let store = FakeStore::default().with_query_columns(&[("price", "DOUBLE"), ("city", "VARCHAR")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    let report = Describer::new(&run, &store, &stats, &renderer).drive().unwrap();
    assert_eq!(report.rendered(), 2);

    assert_eq!(
        *stats.calls.borrow(),
        vec![
            StatsCall::Quantile {
                query: q.into(),
                field: "price".into(),
                predicate: Some("price > -1".into()),
            },
            StatsCall::Histogram {
                query: q.into(),
                field: "city".into(),
                predicate: Some("city != '!'".into()),
            },
        ]
    );
    match &report.outcomes[0] {
        FieldOutcome::Rendered { files, .. } => {
            assert_eq!(files, &vec![std::path::PathBuf::from("./price.html")]);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_expression_column_predicate_is_quoted() {
    let q = "SELECT fare * 2 FROM trips";
    let run = query_run(q, None);
    let store = FakeStore::default().with_query_columns(&[("(fare * 2)", "DOUBLE")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    Describer::new(&run, &store, &stats, &renderer).drive().unwrap();
    assert_eq!(
        *stats.calls.borrow(),
        vec![StatsCall::Quantile {
            query: q.into(),
            field: "(fare * 2)".into(),
            predicate: Some("\"(fare * 2)\" > -1".into()),
        }]
    );
}

#[test]
fn test_xy_is_one_artifact_with_combined_predicate() {
    let q = "SELECT x, y, z FROM t";
    let run = query_run(q, Some("x,y,z"));
    assert_eq!(run.task, Task::Xy);
    let store =
        FakeStore::default().with_query_columns(&[("x", "Float64"), ("y", "Int32"), ("z", "Date")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    let report = Describer::new(&run, &store, &stats, &renderer).drive().unwrap();
    assert_eq!(report.outcomes.len(), 1);

    assert_eq!(
        *stats.calls.borrow(),
        vec![StatsCall::Xy {
            query: q.into(),
            predicate: Some("x > -1 AND y != -1 AND z != '1970-01-01'".into()),
            fields: vec!["x".into(), "y".into(), "z".into()],
            color: None,
            line: LineStyle::Markers,
        }]
    );

    let artifacts = renderer.artifacts.borrow();
    assert_eq!(artifacts.len(), 1);
    let style = &artifacts[0].style;
    assert!(style.legend);
    assert_eq!(style.title, "XY plot of x vs y, z");
    assert_eq!(style.x_title, "x");
    assert_eq!(style.y_title, "y, z");
    assert_eq!(style.file_stem, "xVsy_z");
}

#[test]
fn test_xy_two_fields_has_no_legend() {
    let run = query_run("SELECT a, b FROM t", Some("a, b"));
    let store = FakeStore::default().with_query_columns(&[("a", "Int64"), ("b", "BOOLEAN")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    Describer::new(&run, &store, &stats, &renderer).drive().unwrap();

    let artifacts = renderer.artifacts.borrow();
    assert!(!artifacts[0].style.legend);
    match &stats.calls.borrow()[0] {
        StatsCall::Xy { predicate, .. } => assert_eq!(predicate.as_deref(), Some("a != -1")),
        other => panic!("unexpected call {other:?}"),
    };
}

#[test]
fn test_xy_unknown_field() {
    let run = query_run("SELECT a, b FROM t", Some("a,c"));
    let store = FakeStore::default().with_query_columns(&[("a", "Int64"), ("b", "Int64")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    let err = Describer::new(&run, &store, &stats, &renderer)
        .drive()
        .unwrap_err();
    assert!(matches!(&err, EngineError::UnknownField { field } if field == "c"));
    assert!(stats.calls.borrow().is_empty());
}

#[test]
fn test_first_failure_stops_the_run() {
    let run = table_run("people");
    let store = people();
    let stats = FakeStats::default().failing_on("score");
    let renderer = FakeRenderer::default();

    let err = Describer::new(&run, &store, &stats, &renderer)
        .drive()
        .unwrap_err();
    assert!(matches!(err, EngineError::FieldData { .. }));
    assert_eq!(err.field(), Some("score"));

    // age rendered, score failed, tags never requested
    assert_eq!(stats.calls.borrow().len(), 2);
    assert_eq!(renderer.artifacts.borrow().len(), 1);
}

#[test]
fn test_render_failure_is_fatal() {
    let run = table_run("people");
    let (store, stats) = (people(), FakeStats::default());
    let renderer = FakeRenderer {
        fail: true,
        ..Default::default()
    };

    let err = Describer::new(&run, &store, &stats, &renderer)
        .drive()
        .unwrap_err();
    assert!(matches!(&err, EngineError::Render { field, .. } if field == "age"));
}

#[test]
fn test_schema_failure() {
    let run = table_run("missing");
    let (store, stats, renderer) = (people(), FakeStats::default(), FakeRenderer::default());

    let err = Describer::new(&run, &store, &stats, &renderer)
        .drive()
        .unwrap_err();
    assert!(matches!(err, EngineError::Schema(_)));
    assert!(stats.calls.borrow().is_empty());
}

#[test]
fn test_deep_nesting_is_rejected() {
    let run = table_run("nested");
    let store = FakeStore::default().with_table("nested", &[("a.b.c", "Array(Int32)")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    let err = Describer::new(&run, &store, &stats, &renderer)
        .drive()
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedNesting { .. }));
}

#[test]
fn test_overrides_take_precedence() {
    let run = RunSpec::from_request(RunRequest {
        query: Some("SELECT n FROM t".into()),
        title: Some("Counts".into()),
        subtitle: Some("from t".into()),
        xlab: Some("count".into()),
        sentinels: Sentinels::default(),
        ..Default::default()
    })
    .unwrap();
    let store = FakeStore::default().with_query_columns(&[("n", "UInt64")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    Describer::new(&run, &store, &stats, &renderer).drive().unwrap();

    let artifacts = renderer.artifacts.borrow();
    let style = &artifacts[0].style;
    assert_eq!(style.title, "Counts");
    assert_eq!(style.subtitle.as_deref(), Some("from t"));
    assert_eq!(style.x_title, "count");
    assert_eq!(style.y_title, "Proportion");
    assert!(style.show);
    assert!(style.formats.is_empty());
}

#[test]
fn test_no_sentinels_means_no_subtitle() {
    let run = RunSpec::from_request(RunRequest {
        query: Some("SELECT n FROM t".into()),
        ..Default::default()
    })
    .unwrap();
    let store = FakeStore::default().with_query_columns(&[("n", "Int32")]);
    let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());

    Describer::new(&run, &store, &stats, &renderer).drive().unwrap();

    assert_eq!(renderer.artifacts.borrow()[0].style.subtitle, None);
    match &stats.calls.borrow()[0] {
        StatsCall::Histogram { predicate, .. } => assert_eq!(predicate, &None),
        other => panic!("unexpected call {other:?}"),
    };
}

#[test]
fn test_reruns_are_identical() {
    let run = table_run("people");
    let store = people();

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let (stats, renderer) = (FakeStats::default(), FakeRenderer::default());
        Describer::new(&run, &store, &stats, &renderer).drive().unwrap();
        snapshots.push((stats.calls.into_inner(), renderer.artifacts.into_inner()));
    }
    assert_eq!(snapshots[0], snapshots[1]);
}
