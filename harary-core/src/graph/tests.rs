//! Unit tests for the signed graph store.

use rstest::rstest;

use crate::error::GraphError;

use super::{EdgeKey, Sign, SignedEdge, SignedGraph};

fn path(node_count: usize) -> SignedGraph {
    let mut graph = SignedGraph::with_nodes(node_count);
    for node in 1..node_count {
        graph
            .add_edge(node - 1, node, Sign::Positive)
            .expect("path edges are valid");
    }
    graph
}

#[rstest]
#[case(Sign::Positive, Sign::Positive, Sign::Positive)]
#[case(Sign::Positive, Sign::Negative, Sign::Negative)]
#[case(Sign::Negative, Sign::Positive, Sign::Negative)]
#[case(Sign::Negative, Sign::Negative, Sign::Positive)]
fn sign_product_follows_multiplication(
    #[case] left: Sign,
    #[case] right: Sign,
    #[case] expected: Sign,
) {
    assert_eq!(left * right, expected);
    assert_eq!(
        i16::from(left.as_i8()) * i16::from(right.as_i8()),
        i16::from(expected.as_i8())
    );
}

#[test]
fn edge_key_is_canonical() {
    let forward = EdgeKey::new(2, 7).expect("distinct endpoints");
    let backward = EdgeKey::new(7, 2).expect("distinct endpoints");
    assert_eq!(forward, backward);
    assert_eq!(forward.low(), 2);
    assert_eq!(forward.high(), 7);
    assert_eq!(EdgeKey::new(3, 3), Err(GraphError::SelfLoop { node: 3 }));
}

#[test]
fn add_edge_is_symmetric() {
    let mut graph = SignedGraph::with_nodes(3);
    graph.add_edge(2, 0, Sign::Negative).expect("edge is valid");
    assert_eq!(graph.sign(0, 2), Some(Sign::Negative));
    assert_eq!(graph.sign(2, 0), Some(Sign::Negative));
    assert!(!graph.contains_edge(0, 1));
}

#[rstest]
#[case::self_loop(1, 1, GraphError::SelfLoop { node: 1 })]
#[case::out_of_range(0, 3, GraphError::NodeOutOfRange { node: 3, node_count: 3 })]
#[case::duplicate(1, 0, GraphError::DuplicateEdge { left: 0, right: 1 })]
fn add_edge_rejects_invalid_requests(
    #[case] left: usize,
    #[case] right: usize,
    #[case] expected: GraphError,
) {
    let mut graph = SignedGraph::with_nodes(3);
    graph.add_edge(0, 1, Sign::Positive).expect("seed edge is valid");
    assert_eq!(graph.add_edge(left, right, Sign::Positive), Err(expected));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn remove_edge_keeps_slots_dense() {
    let mut graph = SignedGraph::complete(5, |_, _| Sign::Positive);
    assert_eq!(graph.remove_edge(1, 0), Ok(Sign::Positive));
    assert_eq!(graph.remove_edge(3, 4), Ok(Sign::Positive));
    assert_eq!(graph.edge_count(), 8);

    let mut slotted: Vec<EdgeKey> = (0..graph.edge_count())
        .map(|index| graph.edge_at(index).expect("slot within range"))
        .collect();
    slotted.sort_unstable();
    let ordered: Vec<EdgeKey> = graph
        .edges()
        .map(|edge| EdgeKey::new(edge.source(), edge.target()).expect("no self loops"))
        .collect();
    assert_eq!(slotted, ordered);
    assert_eq!(graph.edge_at(graph.edge_count()), None);
}

#[test]
fn remove_missing_edge_fails() {
    let mut graph = path(3);
    assert_eq!(
        graph.remove_edge(0, 2),
        Err(GraphError::MissingEdge { left: 0, right: 2 })
    );
}

#[test]
fn flip_edge_toggles_both_directions() {
    let mut graph = path(3);
    assert_eq!(graph.flip_edge(2, 1), Ok(Sign::Negative));
    assert_eq!(graph.sign(1, 2), Some(Sign::Negative));
    assert_eq!(graph.sign(2, 1), Some(Sign::Negative));
    assert_eq!(graph.flip_edge(1, 2), Ok(Sign::Positive));
    assert_eq!(
        graph.flip_edge(0, 2),
        Err(GraphError::MissingEdge { left: 0, right: 2 })
    );
}

#[rstest]
#[case(2, 1, 1.0)]
#[case(4, 3, 0.5)]
#[case(5, 4, 0.4)]
#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
fn density_counts_present_pairs(
    #[case] node_count: usize,
    #[case] edges: usize,
    #[case] expected: f64,
) {
    let graph = path(node_count);
    assert_eq!(graph.edge_count(), edges);
    assert!((graph.density() - expected).abs() < f64::EPSILON);
}

#[test]
fn density_of_trivial_graph_is_zero() {
    assert_eq!(SignedGraph::with_nodes(1).density(), 0.0);
    assert_eq!(SignedGraph::with_nodes(0).max_edge_count(), 0);
}

#[test]
fn edges_are_sorted_and_signed() {
    let graph = SignedGraph::complete(3, |low, high| {
        if low == 0 && high == 2 {
            Sign::Negative
        } else {
            Sign::Positive
        }
    });
    let edges: Vec<SignedEdge> = graph.edges().collect();
    assert_eq!(
        edges,
        vec![
            SignedEdge::new(0, 1, Sign::Positive),
            SignedEdge::new(0, 2, Sign::Negative),
            SignedEdge::new(1, 2, Sign::Positive),
        ]
    );
}

#[test]
fn neighbour_iterators_respect_order() {
    let graph = SignedGraph::complete(4, |_, _| Sign::Negative);
    let all: Vec<usize> = graph.neighbours(2).map(|(node, _)| node).collect();
    let higher: Vec<usize> = graph.higher_neighbours(1).collect();
    assert_eq!(all, vec![0, 1, 3]);
    assert_eq!(higher, vec![2, 3]);
    assert_eq!(graph.neighbours(9).count(), 0);
}

#[test]
fn connectivity_tracks_components() {
    let mut graph = path(4);
    assert!(graph.is_connected());
    graph.remove_edge(1, 2).expect("edge exists");
    assert_eq!(graph.component_count(), 2);
    assert!(!graph.is_connected());

    let isolated = SignedGraph::with_nodes(3);
    assert_eq!(isolated.component_count(), 3);
}
