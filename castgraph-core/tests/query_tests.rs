// Tests for graph queries and analysis

use castgraph_core::analyze::Analyze;
use castgraph_core::graph::GraphStore;
use castgraph_core::model::EntityKind;
use castgraph_core::query::{Query, VertexFilter};

fn create_test_graph() -> GraphStore {
    let mut graph = GraphStore::new();
    graph.add_vertex(EntityKind::Actor, "A", 40, 0).unwrap();
    graph.add_vertex(EntityKind::Movie, "M1", 2000, 400).unwrap();
    graph.add_vertex(EntityKind::Actor, "B", 20, 0).unwrap();
    graph.add_vertex(EntityKind::Movie, "M2", 2001, 100).unwrap();
    graph.add_vertex(EntityKind::Actor, "C", 60, 0).unwrap();
    graph.add_vertex(EntityKind::Movie, "M3", 2000, 600).unwrap();

    graph.add_relation("A", "M1", 10).unwrap();
    graph.add_relation("B", "M1", 20).unwrap();
    graph.add_relation("A", "M2", 2).unwrap();
    graph.add_relation("B", "M2", 5).unwrap();
    graph.add_relation("C", "M3", 10).unwrap();
    graph
}

// ============================================================================
// Lookup Tests
// ============================================================================

#[test]
fn test_gross() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    assert_eq!(query.gross("M3"), Some(600));
    assert_eq!(query.gross("A"), None);
    assert_eq!(query.gross("Nobody"), None);
}

#[test]
fn test_movies_of() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    assert_eq!(query.movies_of("A"), Some(vec!["M1", "M2"]));
    assert_eq!(query.movies_of("C"), Some(vec!["M3"]));
    assert_eq!(query.movies_of("M1"), None);
}

#[test]
fn test_actors_in() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    assert_eq!(query.actors_in("M1"), Some(vec!["A", "B"]));
    assert_eq!(query.actors_in("A"), None);
}

// ============================================================================
// Ranking Tests
// ============================================================================

#[test]
fn test_top_actors_by_total_weight() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    assert_eq!(query.top_actors(3), vec![("B", 25), ("A", 12), ("C", 10)]);
    assert_eq!(query.top_actors(1), vec![("B", 25)]);
}

#[test]
fn test_oldest_actors() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    assert_eq!(query.oldest_actors(2), vec![("C", 60), ("A", 40)]);
}

#[test]
fn test_rankings_on_empty_graph() {
    let graph = GraphStore::new();
    let query = Query::new(&graph);

    assert!(query.top_actors(5).is_empty());
    assert!(query.oldest_actors(5).is_empty());
}

// ============================================================================
// Year Tests
// ============================================================================

#[test]
fn test_movies_in_year() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    assert_eq!(query.movies_in_year(2000), vec!["M1", "M3"]);
    assert!(query.movies_in_year(1990).is_empty());
}

#[test]
fn test_actors_in_year() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    assert_eq!(query.actors_in_year(2000), vec!["A", "B", "C"]);
    assert_eq!(query.actors_in_year(2001), vec!["A", "B"]);
}

// ============================================================================
// Filter Tests
// ============================================================================

#[test]
fn test_filter_by_primary() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    let filter = VertexFilter {
        primary: vec![2001],
        ..Default::default()
    };
    let movies: Vec<&str> = query
        .filter(EntityKind::Movie, &filter)
        .into_iter()
        .map(|v| v.identity.as_str())
        .collect();
    assert_eq!(movies, vec!["M2"]);
}

#[test]
fn test_filter_any_match() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    let filter = VertexFilter {
        names: vec!["C".to_string()],
        primary: vec![20],
        ..Default::default()
    };
    let actors: Vec<&str> = query
        .filter(EntityKind::Actor, &filter)
        .into_iter()
        .map(|v| v.identity.as_str())
        .collect();
    assert_eq!(actors, vec!["B", "C"]);
}

#[test]
fn test_empty_filter_matches_everything() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    let filter = VertexFilter::default();
    assert!(filter.is_empty());
    assert_eq!(query.filter(EntityKind::Actor, &filter).len(), 3);
    assert_eq!(query.filter(EntityKind::Movie, &filter).len(), 3);
}

#[test]
fn test_filter_movies_by_gross_or_name() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    let movies: Vec<&str> = query
        .filter_movies(&["M1".to_string()], &[], &[600])
        .into_iter()
        .map(|v| v.identity.as_str())
        .collect();
    assert_eq!(movies, vec!["M1", "M3"]);
}

#[test]
fn test_filter_actors_by_age() {
    let graph = create_test_graph();
    let query = Query::new(&graph);

    let actors: Vec<&str> = query
        .filter_actors(&[], &[40, 60], &[])
        .into_iter()
        .map(|v| v.identity.as_str())
        .collect();
    assert_eq!(actors, vec!["A", "C"]);
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_hub_actors() {
    let graph = create_test_graph();
    let analyze = Analyze::new(&graph);

    assert_eq!(analyze.hub_actors(3), vec![("A", 1), ("B", 1), ("C", 0)]);
}

#[test]
fn test_gross_by_age() {
    let graph = create_test_graph();
    let analyze = Analyze::new(&graph);

    assert_eq!(
        analyze.gross_by_age(3),
        vec![(60, 600), (20, 500), (40, 500)]
    );
}

// ============================================================================
// Overflow Tests
// ============================================================================

fn create_huge_graph() -> GraphStore {
    let mut graph = GraphStore::new();
    graph.add_vertex(EntityKind::Actor, "A", 40, 0).unwrap();
    graph.add_vertex(EntityKind::Movie, "Big", 2000, i64::MAX).unwrap();
    graph.add_vertex(EntityKind::Movie, "Bigger", 2001, i64::MAX).unwrap();
    graph.add_relation("A", "Big", i64::MAX).unwrap();
    graph.add_relation("A", "Bigger", i64::MAX).unwrap();
    graph
}

#[test]
fn test_top_actors_saturates() {
    let graph = create_huge_graph();
    let query = Query::new(&graph);

    assert_eq!(query.top_actors(1), vec![("A", i64::MAX)]);
}

#[test]
fn test_gross_by_age_saturates() {
    let graph = create_huge_graph();
    let analyze = Analyze::new(&graph);

    assert_eq!(analyze.gross_by_age(1), vec![(40, i64::MAX)]);
}
