//! Request-level orchestration.
//!
//! ```text
//! RouteRequest
//!   → context  (caller's, else the engine's ContextSource, else defaults)
//!   → resolve  start / end to nearest nodes
//!   → attach   RiskOverlay for this request
//!   → solve    fast + safe searches
//!   → materialize each successful path
//! ```
//!
//! Endpoint resolution and context validation failures abort the request.
//! After that each variant succeeds or fails on its own; the request only
//! fails when both do.

use std::sync::Arc;

use log::{info, warn};

use sr_core::{Context, ContextInput, ContextSource, GeoPoint, NodeId};
use sr_graph::{GraphError, RoadGraph};
use sr_risk::{Degradation, RiskAttacher, RiskOracle};

use crate::{
    CancelToken, DualPathSolver, EngineConfig, PathResult, RouteError, RouteOutcome, RouteRequest,
    RouteResponse, RouteResult, RouteStats, SerializedRoute, materialize,
};

// ── Results ───────────────────────────────────────────────────────────────────

/// A solved path together with its coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterializedRoute {
    pub path:        PathResult,
    pub coordinates: SerializedRoute,
}

/// Everything one request produced, before encoding.
#[derive(Debug)]
pub struct DualRoute {
    pub start:        NodeId,
    pub end:          NodeId,
    /// The context the overlay was built with.
    pub context:      Context,
    pub fast:         RouteResult<MaterializedRoute>,
    pub safe:         RouteResult<MaterializedRoute>,
    pub degradations: Vec<Degradation>,
}

impl DualRoute {
    pub fn into_response(self) -> RouteResponse {
        let (fast_route, fast_stats) = outcome(self.fast);
        let (safe_route, safe_stats) = outcome(self.safe);
        RouteResponse {
            fast_route,
            safe_route,
            fast_stats,
            safe_stats,
            degraded_edges: self.degradations.len(),
        }
    }
}

fn outcome(result: RouteResult<MaterializedRoute>) -> (RouteOutcome, Option<RouteStats>) {
    match result {
        Ok(m) => (RouteOutcome::Route(m.coordinates), Some(m.path.stats)),
        Err(e) => (RouteOutcome::failed(&e), None),
    }
}

// ── RoutingEngine ─────────────────────────────────────────────────────────────

/// Process-wide routing service.
///
/// Holds the shared read-only graph and oracle handle.  All per-request
/// state (context, overlay, search buffers) lives on the stack of
/// [`route`](Self::route), so one engine serves any number of concurrent
/// requests through `&self`.
///
/// ```rust,ignore
/// let engine = RoutingEngine::new(Arc::new(graph), Arc::new(HeuristicRiskModel))
///     .with_config(EngineConfig::from_json_reader(file)?)?
///     .with_context_source(Arc::new(SyntheticContextSource::new(42)));
/// let response = engine.handle(&request, &CancelToken::new())?;
/// ```
pub struct RoutingEngine {
    graph:          Arc<RoadGraph>,
    oracle:         Arc<dyn RiskOracle>,
    context_source: Option<Arc<dyn ContextSource>>,
    config:         EngineConfig,
}

impl RoutingEngine {
    /// Engine with the default [`EngineConfig`] and no context source.
    pub fn new(graph: Arc<RoadGraph>, oracle: Arc<dyn RiskOracle>) -> Self {
        Self { graph, oracle, context_source: None, config: EngineConfig::default() }
    }

    /// # Errors
    ///
    /// [`RouteError::Config`] if `config` fails validation.
    pub fn with_config(mut self, config: EngineConfig) -> RouteResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Fallback for requests that carry no context.
    pub fn with_context_source(mut self, source: Arc<dyn ContextSource>) -> Self {
        self.context_source = Some(source);
        self
    }

    pub fn graph(&self) -> &Arc<RoadGraph> {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pick the context for one request.  Caller-supplied values always
    /// win; the source is only consulted when the caller sent none.
    pub fn resolve_context(&self, input: Option<&ContextInput>) -> RouteResult<Context> {
        let ctx = match (input, &self.context_source) {
            (Some(input), _) => input.resolve()?,
            (None, Some(source)) => {
                let ctx = source.current_context();
                ctx.validate()?;
                ctx
            }
            (None, None) => Context::default(),
        };
        Ok(ctx)
    }

    /// Map a coordinate to its nearest node.
    pub fn resolve_endpoint(&self, pos: GeoPoint) -> RouteResult<NodeId> {
        if !pos.is_finite() {
            return Err(RouteError::InvalidCoordinate(pos));
        }
        self.graph.resolve(pos).map_err(|e| match e {
            GraphError::NoNodeFound => RouteError::NoNodeFound(pos),
            other => other.into(),
        })
    }

    /// Run one request end to end.
    ///
    /// # Errors
    ///
    /// - [`RouteError::Context`] / [`RouteError::InvalidCoordinate`] for a
    ///   malformed request.
    /// - [`RouteError::NoNodeFound`] if the graph has no positioned nodes.
    /// - [`RouteError::Cancelled`] if `cancel` fires before or during the
    ///   searches.
    /// - [`RouteError::AllVariantsFailed`] if neither variant produced a
    ///   route.
    pub fn route(&self, req: &RouteRequest, cancel: &CancelToken) -> RouteResult<DualRoute> {
        let context = self.resolve_context(req.context.as_ref())?;
        let start = self.resolve_endpoint(req.start())?;
        let end = self.resolve_endpoint(req.end())?;

        if cancel.is_cancelled() {
            return Err(RouteError::Cancelled);
        }

        let mut attacher = RiskAttacher::new(Arc::clone(&self.oracle)).with_policy(self.config.policy());
        if let Some(budget) = self.config.oracle_budget() {
            attacher = attacher.with_budget(budget);
        }
        let overlay = attacher.attach(&self.graph, &context);

        if cancel.is_cancelled() {
            return Err(RouteError::Cancelled);
        }

        let paths = DualPathSolver::new(&self.graph, &overlay)
            .parallel(self.config.parallel_search)
            .solve(start, end, cancel);

        let fast = paths.fast.and_then(|p| self.materialize(p));
        let safe = paths.safe.and_then(|p| self.materialize(p));

        if matches!(fast, Err(RouteError::Cancelled)) || matches!(safe, Err(RouteError::Cancelled)) {
            return Err(RouteError::Cancelled);
        }

        let (fast, safe) = match (fast, safe) {
            (Err(fast), Err(safe)) => {
                return Err(RouteError::AllVariantsFailed { fast: Box::new(fast), safe: Box::new(safe) });
            }
            pair => pair,
        };
        for err in [&fast, &safe].into_iter().filter_map(|r| r.as_ref().err()) {
            warn!("{err}; returning the other variant only");
        }

        info!(
            "routed {start} -> {end}: fast {}, safe {}, {} degraded edges",
            summary(&fast),
            summary(&safe),
            overlay.degradations().len()
        );

        Ok(DualRoute {
            start,
            end,
            context,
            fast,
            safe,
            degradations: overlay.degradations().to_vec(),
        })
    }

    /// [`route`](Self::route), encoded as a response body.
    pub fn handle(&self, req: &RouteRequest, cancel: &CancelToken) -> RouteResult<RouteResponse> {
        self.route(req, cancel).map(DualRoute::into_response)
    }

    fn materialize(&self, path: PathResult) -> RouteResult<MaterializedRoute> {
        let coordinates = materialize(&self.graph, &path)?;
        Ok(MaterializedRoute { path, coordinates })
    }
}

fn summary(result: &RouteResult<MaterializedRoute>) -> String {
    match result {
        Ok(m) => format!("{} nodes / {:.1} m", m.path.stats.node_count, m.path.stats.total_length),
        Err(e) => format!("failed ({})", e.kind()),
    }
}
