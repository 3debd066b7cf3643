//! diamond — smallest end-to-end run of the saferoute engine.
//!
//! Builds a four-node river crossing, then routes the same trip under three
//! contexts: calm weather, a flood reported by the caller, and whatever the
//! synthetic context source produces.  Each response is printed as JSON.
//!
//! Usage: `diamond [engine-config.json]`.  Set `RUST_LOG=debug` to see the
//! attachment and search logs.

mod network;

use std::fs::File;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use log::info;

use sr_core::{ContextInput, Flag, SyntheticContextSource};
use sr_risk::{FeatureVector, HeuristicRiskModel, OracleResult, RiskOracle};
use sr_route::{CancelToken, EngineConfig, RouteRequest, RoutingEngine};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const CONTEXT_SEED: u64 = 42;

/// Extra risk for service roads; in this network they run along the river
/// bank and flood first.
const RIVERBANK_PENALTY: f64 = 0.4;

// ── Oracle ────────────────────────────────────────────────────────────────────

fn riverbank_oracle(f: &FeatureVector) -> OracleResult<f64> {
    let base = HeuristicRiskModel.predict(f)?;
    if f.road_type <= 0.5 {
        Ok((base + RIVERBANK_PENALTY).min(1.0))
    } else {
        Ok(base)
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_reader(File::open(path)?)?,
        None => EngineConfig::default(),
    };

    let (graph, [riverside, _, _, market]) = build_network()?;
    println!(
        "Road graph: {} nodes, {} directed edges",
        graph.node_count(),
        graph.edge_count()
    );

    let start = graph.position(riverside).ok_or_else(|| anyhow::anyhow!("riverside has no position"))?;
    let end = graph.position(market).ok_or_else(|| anyhow::anyhow!("market has no position"))?;

    let engine = RoutingEngine::new(Arc::new(graph), Arc::new(riverbank_oracle))
        .with_config(config)?
        .with_context_source(Arc::new(SyntheticContextSource::new(CONTEXT_SEED)));

    let flooded = ContextInput {
        flood_reports: Some(9.0),
        water_depth:   Some(60.0),
        traffic_speed: Some(12.0),
        near_river:    Some(Flag::Bool(true)),
        ..Default::default()
    };

    let requests = [
        ("calm", RouteRequest::new(start, end).with_context(ContextInput::default())),
        ("flooded", RouteRequest::new(start, end).with_context(flooded)),
        ("synthetic", RouteRequest::new(start, end)),
    ];

    for (label, request) in &requests {
        let t0 = Instant::now();
        let response = engine.handle(request, &CancelToken::new())?;
        info!("{label}: handled in {:.3} ms", t0.elapsed().as_secs_f64() * 1_000.0);

        println!();
        println!("── {label} ──");
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    Ok(())
}
