//! Unit tests for sr-route.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use sr_core::{Context, GeoPoint, NodeId, RoadClass};
    use sr_graph::{RoadGraph, RoadGraphBuilder};
    use sr_risk::{FeatureVector, OracleError, OracleResult, RiskAttacher, RiskOverlay};

    pub const A_POS: GeoPoint = GeoPoint { lat: 0.0, lng: 0.0 };
    pub const B_POS: GeoPoint = GeoPoint { lat: 0.001, lng: 0.0 };
    pub const C_POS: GeoPoint = GeoPoint { lat: 0.0, lng: 0.001 };
    pub const D_POS: GeoPoint = GeoPoint { lat: 0.001, lng: 0.001 };

    /// A→B→D (10 m per segment, primary) and A→C→D (5 m per segment).
    /// C→D is the only `service` road; the test oracles put their risk on
    /// service roads.
    pub fn diamond() -> (RoadGraph, [NodeId; 4]) {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(A_POS);
        let bb = b.add_node(B_POS);
        let c = b.add_node(C_POS);
        let d = b.add_node(D_POS);
        b.add_edge(a, bb, Some(10.0), RoadClass::Primary).unwrap();
        b.add_edge(bb, d, Some(10.0), RoadClass::Primary).unwrap();
        b.add_edge(a, c, Some(5.0), RoadClass::Primary).unwrap();
        b.add_edge(c, d, Some(5.0), RoadClass::Service).unwrap();
        (b.build(), [a, bb, c, d])
    }

    /// `n × n` two-way grid with uneven lengths and a mix of road classes.
    pub fn grid(n: u32) -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        let id = |i: u32, j: u32| NodeId(i * n + j);
        for i in 0..n {
            for j in 0..n {
                b.add_node(GeoPoint::new(i as f64 * 0.001, j as f64 * 0.001));
            }
        }
        for i in 0..n {
            for j in 0..n {
                let class = if (i + j) % 3 == 0 { RoadClass::Service } else { RoadClass::Primary };
                let len = 10.0 + ((i * 7 + j * 13) % 11) as f64;
                if j + 1 < n {
                    b.add_road(id(i, j), id(i, j + 1), Some(len), class).unwrap();
                }
                if i + 1 < n {
                    b.add_road(id(i, j), id(i + 1, j), Some(len + 3.0), RoadClass::Residential).unwrap();
                }
            }
        }
        b.build()
    }

    pub fn is_service(f: &FeatureVector) -> bool {
        f.road_type == RoadClass::Service.capacity_rank()
    }

    /// 0.9 on service roads, 0 elsewhere.
    pub fn hot_service(f: &FeatureVector) -> OracleResult<f64> {
        Ok(if is_service(f) { 0.9 } else { 0.0 })
    }

    /// 1.0 on service roads, 0 elsewhere.
    pub fn certain_on_service(f: &FeatureVector) -> OracleResult<f64> {
        Ok(if is_service(f) { 1.0 } else { 0.0 })
    }

    /// Unavailable on service roads, 0.1 elsewhere.
    pub fn down_on_service(f: &FeatureVector) -> OracleResult<f64> {
        if is_service(f) {
            Err(OracleError::Unavailable("inference endpoint unreachable".into()))
        } else {
            Ok(0.1)
        }
    }

    /// Varied but deterministic scores.
    pub fn scattered(f: &FeatureVector) -> OracleResult<f64> {
        let base = if is_service(f) { 0.6 } else { 0.05 };
        Ok(base + (f.length * 0.37).fract() * 0.3)
    }

    pub fn overlay(graph: &RoadGraph, oracle: impl sr_risk::RiskOracle + 'static) -> RiskOverlay {
        RiskAttacher::new(Arc::new(oracle)).attach(graph, &Context::default())
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dijkstra {
    use sr_core::{EdgeId, GeoPoint, NodeId, RoadClass};
    use sr_graph::{GraphError, RoadGraph, RoadGraphBuilder};

    use crate::{
        CancelToken, EdgeWeight, LengthWeight, RiskWeight, RouteError, RouteVariant, shortest_path,
    };

    use super::helpers::{diamond, grid, hot_service, overlay};

    fn fast(g: &RoadGraph, from: NodeId, to: NodeId) -> Result<crate::Path, RouteError> {
        shortest_path(g, &LengthWeight, RouteVariant::Fast, from, to, &CancelToken::new())
    }

    #[test]
    fn picks_shorter_branch() {
        let (g, [a, _, c, d]) = diamond();
        let path = fast(&g, a, d).unwrap();
        assert_eq!(path.nodes, vec![a, c, d]);
        assert_eq!(path.edges.len(), 2);
        assert_eq!(path.cost, 10.0);
    }

    #[test]
    fn same_start_and_end_is_single_node() {
        let (g, [a, ..]) = diamond();
        let path = fast(&g, a, a).unwrap();
        assert_eq!(path.nodes, vec![a]);
        assert!(path.edges.is_empty());
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn unreachable_target() {
        let (g, [a, _, _, d]) = diamond();
        // Edges are one-way: nothing leaves D.
        let err = fast(&g, d, a).unwrap_err();
        assert!(matches!(
            err,
            RouteError::NoPathExists { variant: RouteVariant::Fast, from, to } if from == d && to == a
        ));
    }

    #[test]
    fn unknown_endpoint() {
        let (g, [a, ..]) = diamond();
        let err = fast(&g, a, NodeId(99)).unwrap_err();
        assert!(matches!(err, RouteError::Graph(GraphError::NodeNotFound(NodeId(99)))));
    }

    #[test]
    fn cheapest_parallel_edge_wins() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let z = b.add_node(GeoPoint::new(0.0, 0.001));
        b.add_edge(a, z, Some(10.0), RoadClass::Primary).unwrap();
        b.add_edge(a, z, Some(4.0), RoadClass::Primary).unwrap();
        b.add_edge(a, z, Some(7.0), RoadClass::Primary).unwrap();
        let g = b.build();

        let path = fast(&g, a, z).unwrap();
        assert_eq!(path.cost, 4.0);
        assert_eq!(g.edge_key(path.edges[0]).parallel, 1);
    }

    #[test]
    fn equal_parallel_edges_keep_lowest_index() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let z = b.add_node(GeoPoint::new(0.0, 0.001));
        b.add_edge(a, z, Some(5.0), RoadClass::Primary).unwrap();
        b.add_edge(a, z, Some(5.0), RoadClass::Secondary).unwrap();
        let g = b.build();

        let path = fast(&g, a, z).unwrap();
        assert_eq!(g.edge_key(path.edges[0]).parallel, 0);
    }

    #[test]
    fn variants_choose_parallel_edges_independently() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let z = b.add_node(GeoPoint::new(0.0, 0.001));
        b.add_edge(a, z, Some(4.0), RoadClass::Service).unwrap(); // short, risky
        b.add_edge(a, z, Some(6.0), RoadClass::Primary).unwrap(); // longer, clean
        let g = b.build();
        let risk = overlay(&g, hot_service);

        let by_length = fast(&g, a, z).unwrap();
        let by_risk = shortest_path(
            &g, &RiskWeight(&risk), RouteVariant::Safe, a, z, &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(g.edge_key(by_length.edges[0]).parallel, 0);
        assert_eq!(g.edge_key(by_risk.edges[0]).parallel, 1);
        assert_eq!(by_risk.cost, 6.0);
    }

    #[test]
    fn equal_cost_paths_prefer_lower_node_ids() {
        // Square A→B→D and A→C→D with identical lengths: B (id 1) settles
        // before C (id 2) and claims D first.
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.001, 0.0));
        let n2 = b.add_node(GeoPoint::new(0.0, 0.001));
        let d = b.add_node(GeoPoint::new(0.001, 0.001));
        // Insert the C branch first so insertion order cannot explain the result.
        b.add_edge(a, n2, Some(5.0), RoadClass::Primary).unwrap();
        b.add_edge(n2, d, Some(5.0), RoadClass::Primary).unwrap();
        b.add_edge(a, n1, Some(5.0), RoadClass::Primary).unwrap();
        b.add_edge(n1, d, Some(5.0), RoadClass::Primary).unwrap();
        let g = b.build();

        for _ in 0..3 {
            assert_eq!(fast(&g, a, d).unwrap().nodes, vec![a, n1, d]);
        }
    }

    #[test]
    fn path_is_connected() {
        let g = grid(5);
        let path = fast(&g, NodeId(0), NodeId(24)).unwrap();
        assert_eq!(path.nodes.first(), Some(&NodeId(0)));
        assert_eq!(path.nodes.last(), Some(&NodeId(24)));
        assert_eq!(path.edges.len() + 1, path.nodes.len());
        for (i, &e) in path.edges.iter().enumerate() {
            assert_eq!(g.edge_from[e.index()], path.nodes[i]);
            assert_eq!(g.edge_to[e.index()], path.nodes[i + 1]);
        }
    }

    /// Bellman-Ford distances from `src` by length.
    fn reference_distances(g: &RoadGraph, src: NodeId) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; g.node_count()];
        dist[src.index()] = 0.0;
        for _ in 0..g.node_count() {
            for e in g.edges() {
                let (u, v) = (g.edge_from[e.index()], g.edge_to[e.index()]);
                let cand = dist[u.index()] + g.edge_length_m[e.index()];
                if cand < dist[v.index()] {
                    dist[v.index()] = cand;
                }
            }
        }
        dist
    }

    #[test]
    fn matches_reference_distances() {
        let g = grid(4);
        for s in 0..g.node_count() as u32 {
            let reference = reference_distances(&g, NodeId(s));
            for t in 0..g.node_count() as u32 {
                let path = fast(&g, NodeId(s), NodeId(t)).unwrap();
                assert!(
                    (path.cost - reference[t as usize]).abs() < 1e-9,
                    "{s} -> {t}: {} vs {}",
                    path.cost,
                    reference[t as usize]
                );
            }
        }
    }

    #[test]
    fn cancelled_search_stops() {
        let g = grid(4);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = shortest_path(&g, &LengthWeight, RouteVariant::Fast, NodeId(0), NodeId(15), &cancel)
            .unwrap_err();
        assert!(matches!(err, RouteError::Cancelled));
    }

    struct Broken(f64);

    impl EdgeWeight for Broken {
        fn weight(&self, _graph: &RoadGraph, _edge: EdgeId) -> f64 {
            self.0
        }
    }

    #[test]
    fn rejects_unusable_weights() {
        let (g, [a, _, _, d]) = diamond();
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let err = shortest_path(&g, &Broken(bad), RouteVariant::Safe, a, d, &CancelToken::new())
                .unwrap_err();
            assert!(matches!(err, RouteError::InvalidWeight { variant: RouteVariant::Safe, .. }));
        }
    }

    #[test]
    fn zero_weights_are_allowed() {
        let (g, [a, _, _, d]) = diamond();
        let path = shortest_path(&g, &Broken(0.0), RouteVariant::Safe, a, d, &CancelToken::new())
            .unwrap();
        assert_eq!(path.cost, 0.0);
        assert_eq!(path.nodes.len(), 3);
    }
}

// ── Dual path solver ──────────────────────────────────────────────────────────

#[cfg(test)]
mod solver {
    use std::sync::Arc;

    use sr_core::{Context, GeoPoint, NodeId, RoadClass};
    use sr_graph::{MAX_EDGE_LENGTH_M, RoadGraphBuilder};
    use sr_risk::{ConstantRisk, MAX_POLICY_FACTOR, RiskAttacher, RiskPolicy};

    use crate::{CancelToken, DualPathSolver, RouteError, RouteVariant};

    use super::helpers::{diamond, grid, hot_service, overlay, scattered};

    #[test]
    fn diamond_splits_fast_and_safe() {
        let (g, [a, b, c, d]) = diamond();
        let risk = overlay(&g, hot_service);
        let paths = DualPathSolver::new(&g, &risk).solve(a, d, &CancelToken::new());

        let fast = paths.fast.unwrap();
        let safe = paths.safe.unwrap();
        assert_eq!(fast.variant, RouteVariant::Fast);
        assert_eq!(fast.nodes, vec![a, c, d]);
        assert_eq!(safe.nodes, vec![a, b, d]);

        assert_eq!(fast.stats.total_length, 10.0);
        assert_eq!(fast.stats.total_risk_weight, 5.0 + 5.0 * (1.0 + 3.0 * 0.9));
        assert_eq!(safe.stats.total_length, 20.0);
        assert_eq!(safe.stats.total_risk_weight, 20.0);
        assert_eq!(safe.stats.node_count, 3);
    }

    #[test]
    fn single_node_when_endpoints_coincide() {
        let (g, [_, b, ..]) = diamond();
        let risk = overlay(&g, hot_service);
        let paths = DualPathSolver::new(&g, &risk).solve(b, b, &CancelToken::new());
        for p in [paths.fast.unwrap(), paths.safe.unwrap()] {
            assert_eq!(p.nodes, vec![b]);
            assert!(p.is_trivial());
            assert_eq!(p.stats.total_length, 0.0);
            assert_eq!(p.stats.total_risk_weight, 0.0);
        }
    }

    #[test]
    fn blocked_only_connection_is_still_used() {
        let mut builder = RoadGraphBuilder::new();
        let a = builder.add_node(GeoPoint::new(0.0, 0.0));
        let z = builder.add_node(GeoPoint::new(0.0, 0.001));
        builder.add_edge(a, z, Some(7.0), RoadClass::Tertiary).unwrap();
        let g = builder.build();

        let ctx = Context { blocked: true, ..Default::default() };
        let risk = RiskAttacher::new(Arc::new(ConstantRisk(0.2))).attach(&g, &ctx);
        let safe = DualPathSolver::new(&g, &risk)
            .solve_variant(RouteVariant::Safe, a, z, &CancelToken::new())
            .unwrap();

        assert_eq!(safe.nodes, vec![a, z]);
        assert_eq!(safe.stats.total_risk_weight, 7.0 * 1000.0);
        assert_eq!(safe.stats.total_length, 7.0);
    }

    #[test]
    fn longest_edges_at_the_largest_penalty_still_route() {
        let mut builder = RoadGraphBuilder::new();
        let nodes: Vec<_> =
            (0..4).map(|i| builder.add_node(GeoPoint::new(0.0, i as f64))).collect();
        for w in nodes.windows(2) {
            builder.add_edge(w[0], w[1], Some(MAX_EDGE_LENGTH_M), RoadClass::Trunk).unwrap();
        }
        let g = builder.build();

        let policy = RiskPolicy { blocked_penalty: MAX_POLICY_FACTOR, ..Default::default() };
        let ctx = Context { blocked: true, ..Default::default() };
        let risk = RiskAttacher::new(Arc::new(ConstantRisk(1.0))).with_policy(policy).attach(&g, &ctx);
        let safe = DualPathSolver::new(&g, &risk)
            .solve_variant(RouteVariant::Safe, nodes[0], nodes[3], &CancelToken::new())
            .unwrap();

        assert_eq!(safe.nodes, nodes);
        assert!(safe.stats.total_risk_weight.is_finite());
        assert_eq!(safe.stats.total_risk_weight, 3.0 * MAX_EDGE_LENGTH_M * MAX_POLICY_FACTOR);
    }

    #[test]
    fn disconnected_fails_both_variants() {
        let mut builder = RoadGraphBuilder::new();
        let a = builder.add_node(GeoPoint::new(0.0, 0.0));
        let b = builder.add_node(GeoPoint::new(0.0, 0.001));
        let c = builder.add_node(GeoPoint::new(1.0, 1.0));
        let d = builder.add_node(GeoPoint::new(1.0, 1.001));
        builder.add_road(a, b, Some(3.0), RoadClass::Primary).unwrap();
        builder.add_road(c, d, Some(3.0), RoadClass::Primary).unwrap();
        let g = builder.build();
        let risk = overlay(&g, hot_service);

        let paths = DualPathSolver::new(&g, &risk).solve(a, d, &CancelToken::new());
        assert!(matches!(paths.fast, Err(RouteError::NoPathExists { variant: RouteVariant::Fast, .. })));
        assert!(matches!(paths.safe, Err(RouteError::NoPathExists { variant: RouteVariant::Safe, .. })));
    }

    #[test]
    fn each_variant_is_optimal_for_its_own_weight() {
        let g = grid(5);
        let risk = overlay(&g, scattered);
        let solver = DualPathSolver::new(&g, &risk);
        let cancel = CancelToken::new();

        for s in 0..g.node_count() as u32 {
            for t in 0..g.node_count() as u32 {
                let paths = solver.solve(NodeId(s), NodeId(t), &cancel);
                let fast = paths.fast.unwrap();
                let safe = paths.safe.unwrap();
                assert!(safe.stats.total_risk_weight <= fast.stats.total_risk_weight + 1e-9);
                assert!(fast.stats.total_length <= safe.stats.total_length + 1e-9);
            }
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_flag_gives_identical_results() {
        let g = grid(4);
        let risk = overlay(&g, scattered);
        let cancel = CancelToken::new();
        let seq = DualPathSolver::new(&g, &risk).solve(NodeId(0), NodeId(15), &cancel);
        let par = DualPathSolver::new(&g, &risk).parallel(true).solve(NodeId(0), NodeId(15), &cancel);
        assert_eq!(seq.fast.unwrap(), par.fast.unwrap());
        assert_eq!(seq.safe.unwrap(), par.safe.unwrap());
    }

    #[test]
    fn cancellation_reaches_both_variants() {
        let g = grid(4);
        let risk = overlay(&g, scattered);
        let cancel = CancelToken::new();
        cancel.cancel();
        let paths = DualPathSolver::new(&g, &risk).solve(NodeId(0), NodeId(15), &cancel);
        assert!(matches!(paths.fast, Err(RouteError::Cancelled)));
        assert!(matches!(paths.safe, Err(RouteError::Cancelled)));
    }
}

// ── Materialization ───────────────────────────────────────────────────────────

#[cfg(test)]
mod materialize {
    use sr_core::{GeoPoint, NodeId, RoadClass};
    use sr_graph::RoadGraphBuilder;

    use crate::{CancelToken, DualPathSolver, RouteError, RouteVariant, SerializedRoute, materialize};

    use super::helpers::{A_POS, C_POS, D_POS, diamond, hot_service, overlay};

    #[test]
    fn coordinates_follow_path_order() {
        let (g, [a, _, _, d]) = diamond();
        let risk = overlay(&g, hot_service);
        let fast = DualPathSolver::new(&g, &risk)
            .solve_variant(RouteVariant::Fast, a, d, &CancelToken::new())
            .unwrap();

        let route = materialize(&g, &fast).unwrap();
        assert_eq!(route.len(), fast.nodes.len());
        assert_eq!(route.points(), &[A_POS, C_POS, D_POS]);
    }

    #[test]
    fn serializes_as_lat_lng_array() {
        let route = SerializedRoute(vec![GeoPoint::new(28.6, 77.2), GeoPoint::new(28.7, 77.3)]);
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "lat": 28.6, "lng": 77.2 }, { "lat": 28.7, "lng": 77.3 }])
        );
    }

    #[test]
    fn node_without_position_fails() {
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let ghost = b.add_node_without_position();
        let z = b.add_node(GeoPoint::new(0.0, 0.002));
        b.add_edge(a, ghost, Some(1.0), RoadClass::Primary).unwrap();
        b.add_edge(ghost, z, Some(1.0), RoadClass::Primary).unwrap();
        let g = b.build();
        let risk = overlay(&g, hot_service);

        let path = DualPathSolver::new(&g, &risk)
            .solve_variant(RouteVariant::Safe, a, z, &CancelToken::new())
            .unwrap();
        let err = materialize(&g, &path).unwrap_err();
        assert!(matches!(
            err,
            RouteError::MissingNodeAttributes { variant: RouteVariant::Safe, node } if node == ghost
        ));
        assert_eq!(ghost, NodeId(1));
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use std::sync::Arc;

    use sr_core::{
        Context, ContextInput, FixedContextSource, Flag, GeoPoint, RoadClass,
    };
    use sr_graph::{RoadGraph, RoadGraphBuilder};
    use sr_risk::RiskOracle;

    use crate::{
        CancelToken, EngineConfig, RouteError, RouteOutcome, RouteRequest, RouteVariant,
        RoutingEngine,
    };

    use super::helpers::{
        A_POS, B_POS, C_POS, D_POS, certain_on_service, diamond, down_on_service, hot_service,
    };

    fn engine_with(graph: RoadGraph, oracle: Arc<dyn RiskOracle>) -> RoutingEngine {
        RoutingEngine::new(Arc::new(graph), oracle)
    }

    fn diamond_engine() -> RoutingEngine {
        engine_with(diamond().0, Arc::new(hot_service))
    }

    fn a_to_d() -> RouteRequest {
        RouteRequest::new(A_POS, D_POS)
    }

    fn blocked() -> ContextInput {
        ContextInput { blocked: Some(Flag::Bool(true)), ..Default::default() }
    }

    #[test_log::test]
    fn diamond_end_to_end() {
        let engine = diamond_engine();
        let resp = engine.handle(&a_to_d(), &CancelToken::new()).unwrap();

        assert_eq!(resp.fast_route.route().unwrap().points(), &[A_POS, C_POS, D_POS]);
        assert_eq!(resp.safe_route.route().unwrap().points(), &[A_POS, B_POS, D_POS]);
        assert_eq!(resp.degraded_edges, 0);
        assert_eq!(resp.fast_stats.unwrap().total_length, 10.0);
        assert_eq!(resp.safe_stats.unwrap().total_length, 20.0);
    }

    #[test]
    fn endpoints_snap_to_nearest_nodes() {
        let engine = diamond_engine();
        let req = RouteRequest::new(GeoPoint::new(-0.0001, 0.00002), GeoPoint::new(0.0012, 0.0011));
        let route = engine.route(&req, &CancelToken::new()).unwrap();
        assert_eq!(route.start.0, 0);
        assert_eq!(route.end.0, 3);
    }

    #[test]
    fn same_endpoint_gives_single_point_routes() {
        let engine = diamond_engine();
        let req = RouteRequest::new(B_POS, GeoPoint::new(0.00101, 0.0));
        let resp = engine.handle(&req, &CancelToken::new()).unwrap();
        assert_eq!(resp.fast_route.route().unwrap().points(), &[B_POS]);
        assert_eq!(resp.safe_route.route().unwrap().points(), &[B_POS]);
        assert_eq!(resp.safe_stats.unwrap().total_risk_weight, 0.0);
    }

    #[test]
    fn disconnected_request_fails() {
        let mut b = RoadGraphBuilder::new();
        b.add_node(A_POS);
        b.add_node(D_POS);
        let engine = engine_with(b.build(), Arc::new(hot_service));

        let err = engine.route(&a_to_d(), &CancelToken::new()).unwrap_err();
        match err {
            RouteError::AllVariantsFailed { fast, safe } => {
                assert!(matches!(*fast, RouteError::NoPathExists { variant: RouteVariant::Fast, .. }));
                assert!(matches!(*safe, RouteError::NoPathExists { variant: RouteVariant::Safe, .. }));
            }
            other => panic!("expected AllVariantsFailed, got {other}"),
        }
    }

    #[test_log::test]
    fn oracle_outage_on_one_edge_is_degraded_not_fatal() {
        let engine = engine_with(diamond().0, Arc::new(down_on_service));
        let route = engine.route(&a_to_d(), &CancelToken::new()).unwrap();

        assert_eq!(route.degradations.len(), 1);
        assert_eq!(route.degradations[0].edge.parallel, 0);
        // C→D now costs 5 000, so the safe route leaves it.
        let safe = route.safe.as_ref().unwrap();
        assert_eq!(safe.coordinates.points(), &[A_POS, B_POS, D_POS]);

        let resp = route.into_response();
        assert_eq!(resp.degraded_edges, 1);
        assert!(resp.fast_route.is_route());
    }

    #[test_log::test]
    fn hanging_oracle_does_not_hang_the_request() {
        let hang = |_: &sr_risk::FeatureVector| -> sr_risk::OracleResult<f64> {
            std::thread::sleep(std::time::Duration::from_secs(3));
            Ok(0.0)
        };
        // Sequential search: stalled oracle calls may still hold Rayon's pool.
        let config =
            EngineConfig { oracle_timeout_ms: 50, parallel_search: false, ..Default::default() };
        let engine = engine_with(diamond().0, Arc::new(hang)).with_config(config).unwrap();

        let started = std::time::Instant::now();
        let resp = engine.handle(&a_to_d(), &CancelToken::new()).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(1));

        // Every edge is conservative, so safe falls back to the shortest path.
        assert_eq!(resp.degraded_edges, 4);
        assert_eq!(resp.safe_route.route().unwrap().points(), &[A_POS, C_POS, D_POS]);
        assert_eq!(resp.safe_stats.unwrap().total_risk_weight, 10.0 * 1000.0);
    }

    #[test_log::test]
    fn one_variant_failing_returns_the_other() {
        // Short service detour through a node with no coordinates, long
        // clean road around it.
        let mut b = RoadGraphBuilder::new();
        let a = b.add_node(A_POS);
        let ghost = b.add_node_without_position();
        let side = b.add_node(B_POS);
        let z = b.add_node(D_POS);
        b.add_edge(a, ghost, Some(4.0), RoadClass::Service).unwrap();
        b.add_edge(ghost, z, Some(4.0), RoadClass::Service).unwrap();
        b.add_edge(a, side, Some(10.0), RoadClass::Primary).unwrap();
        b.add_edge(side, z, Some(10.0), RoadClass::Primary).unwrap();
        let engine = engine_with(b.build(), Arc::new(certain_on_service));

        let resp = engine.handle(&a_to_d(), &CancelToken::new()).unwrap();
        assert!(matches!(
            &resp.fast_route,
            RouteOutcome::Failed { error, .. } if error == "missing_node_attributes"
        ));
        assert!(resp.fast_stats.is_none());
        assert_eq!(resp.safe_route.route().unwrap().points(), &[A_POS, B_POS, D_POS]);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["fast_route"]["error"], "missing_node_attributes");
        assert!(json["safe_route"].is_array());
    }

    #[test]
    fn empty_graph_has_no_node() {
        let engine = engine_with(RoadGraph::empty(), Arc::new(hot_service));
        let err = engine.route(&a_to_d(), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, RouteError::NoNodeFound(_)));
    }

    #[test]
    fn non_finite_coordinate_is_rejected() {
        let engine = diamond_engine();
        let req = RouteRequest::new(GeoPoint::new(f64::NAN, 0.0), D_POS);
        let err = engine.route(&req, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, RouteError::InvalidCoordinate(_)));
    }

    #[test]
    fn invalid_context_is_rejected_at_the_boundary() {
        let engine = diamond_engine();
        let req = a_to_d().with_context(ContextInput { visibility: Some(2.0), ..Default::default() });
        let err = engine.route(&req, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, RouteError::Context(_)));
        assert_eq!(err.kind(), "invalid_context");
    }

    #[test]
    fn caller_context_wins_over_source() {
        let source = FixedContextSource(Context { blocked: true, water_depth: 80.0, ..Default::default() });
        let engine = diamond_engine().with_context_source(Arc::new(source));

        let explicit = a_to_d().with_context(ContextInput { water_depth: Some(10.0), ..Default::default() });
        let route = engine.route(&explicit, &CancelToken::new()).unwrap();
        assert!(!route.context.blocked);
        assert_eq!(route.context.water_depth, 10.0);

        let implicit = engine.route(&a_to_d(), &CancelToken::new()).unwrap();
        assert!(implicit.context.blocked);
        assert_eq!(implicit.context.water_depth, 80.0);
    }

    #[test]
    fn defaults_without_context_or_source() {
        let route = diamond_engine().route(&a_to_d(), &CancelToken::new()).unwrap();
        assert_eq!(route.context, Context::default());
    }

    #[test]
    fn blocked_context_makes_safe_follow_length() {
        let engine = diamond_engine();
        let route = engine.route(&a_to_d().with_context(blocked()), &CancelToken::new()).unwrap();
        let safe = route.safe.unwrap();
        assert_eq!(safe.coordinates.points(), &[A_POS, C_POS, D_POS]);
        assert_eq!(safe.path.stats.total_risk_weight, 10.0 * 1000.0);
    }

    #[test]
    fn cancelled_before_search() {
        let engine = diamond_engine();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = engine.route(&a_to_d(), &cancel).unwrap_err();
        assert!(matches!(err, RouteError::Cancelled));
    }

    #[test]
    fn concurrent_requests_do_not_share_weights() {
        let engine = Arc::new(diamond_engine());
        std::thread::scope(|s| {
            let open = s.spawn(|| engine.route(&a_to_d(), &CancelToken::new()));
            let closed = s.spawn(|| engine.route(&a_to_d().with_context(blocked()), &CancelToken::new()));

            let open = open.join().unwrap().unwrap();
            let closed = closed.join().unwrap().unwrap();
            assert_eq!(open.safe.unwrap().coordinates.points(), &[A_POS, B_POS, D_POS]);
            assert_eq!(closed.safe.unwrap().coordinates.points(), &[A_POS, C_POS, D_POS]);
        });
    }

    #[test]
    fn custom_config_changes_weights() {
        let config = EngineConfig { risk_multiplier: 0.5, ..Default::default() };
        let engine = diamond_engine().with_config(config).unwrap();
        // 5 + 5·(1 + 0.5·0.9) = 12.25 < 20: the short branch is now safe enough.
        let route = engine.route(&a_to_d(), &CancelToken::new()).unwrap();
        assert_eq!(route.safe.unwrap().coordinates.points(), &[A_POS, C_POS, D_POS]);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = EngineConfig { blocked_penalty: 0.0, ..Default::default() };
        assert!(matches!(diamond_engine().with_config(config), Err(RouteError::Config(_))));
    }
}

// ── Config and wire format ────────────────────────────────────────────────────

#[cfg(test)]
mod wire {
    use std::time::Duration;

    use sr_core::Flag;

    use crate::{EngineConfig, RouteError, RouteOutcome, RouteRequest, RouteResponse, SerializedRoute};

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.oracle_budget(), Some(Duration::from_millis(2_000)));
        assert_eq!(config.blocked_penalty, 1_000.0);
        assert_eq!(config.risk_multiplier, 3.0);
        assert!(config.parallel_search);
    }

    #[test]
    fn partial_config() {
        let config = EngineConfig::from_json_str(r#"{ "oracle_timeout_ms": 0, "risk_multiplier": 2 }"#)
            .unwrap();
        assert_eq!(config.oracle_budget(), None);
        assert_eq!(config.risk_multiplier, 2.0);
        assert_eq!(config.blocked_penalty, 1_000.0);
    }

    #[test]
    fn bad_config_values() {
        for json in [
            r#"{ "blocked_penalty": 0.5 }"#,
            r#"{ "risk_multiplier": -1 }"#,
            r#"{ "oracle_timeout_ms": "soon" }"#,
            "not json",
        ] {
            assert!(matches!(EngineConfig::from_json_str(json), Err(RouteError::Config(_))), "{json}");
        }
    }

    #[test]
    fn request_with_partial_context() {
        let req: RouteRequest = serde_json::from_str(
            r#"{ "start_lat": 28.61, "start_lng": 77.20, "end_lat": 28.63, "end_lng": 77.22,
                 "context": { "water_depth": 35, "blocked": 1 } }"#,
        )
        .unwrap();
        let ctx = req.context.as_ref().unwrap();
        assert_eq!(ctx.water_depth, Some(35.0));
        assert_eq!(ctx.blocked, Some(Flag::Number(1.0)));

        let resolved = ctx.resolve().unwrap();
        assert!(resolved.blocked);
        assert_eq!(resolved.traffic_speed, 30.0);
    }

    #[test]
    fn request_without_context() {
        let req: RouteRequest =
            serde_json::from_str(r#"{ "start_lat": 1, "start_lng": 2, "end_lat": 3, "end_lng": 4 }"#)
                .unwrap();
        assert!(req.context.is_none());
        assert_eq!(req.end().lng, 4.0);
    }

    #[test]
    fn response_round_trips_error_marker() {
        let resp = RouteResponse {
            fast_route:     RouteOutcome::Route(SerializedRoute::default()),
            safe_route:     RouteOutcome::Failed {
                error:   "no_path_exists".into(),
                message: "safe route: no path".into(),
            },
            fast_stats:     None,
            safe_stats:     None,
            degraded_edges: 2,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("fast_stats"));
        let back: RouteResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resp);
    }
}
