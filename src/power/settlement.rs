//! Per-tick settlement of one network.
//!
//! Generation and storage output together are capped by the network's ceiling
//! (its weakest edge). Storage covers shortfalls and absorbs leftovers. Consumers are served in ascending id
//! order until the energy runs out; everyone after that goes without.

use std::collections::HashMap;

use super::{Network, NodeId, PowerNode, PowerRole, SettlementReport};
use crate::constants::settlement::ENERGY_EPSILON;

/// Settles `network` over `dt` seconds of game time and records the report on it.
pub(super) fn settle_network(
    network: &mut Network,
    nodes: &mut HashMap<NodeId, PowerNode>,
    dt: f32,
) -> SettlementReport {
    network.refresh_cache();
    let ceiling = network.ceiling_capacity();

    let mut generation = 0.0;
    let mut demand = 0.0;
    let mut deposits = 0.0;
    let mut consumers = Vec::new();
    let mut storages = Vec::new();
    let mut others = Vec::new();
    for id in network.members() {
        let Some(node) = nodes.get_mut(&id) else {
            continue;
        };
        generation += node.rated_generation();
        demand += node.rated_demand();
        // Only transformers ever hold a pending deposit.
        deposits += node.take_deposit();
        match node.role() {
            PowerRole::Consumer { .. } => consumers.push(id),
            PowerRole::Storage { .. } => storages.push(id),
            PowerRole::Generator { .. } | PowerRole::Transformer { .. } | PowerRole::Relay => {
                others.push(id);
            }
        }
    }

    let available = (generation * dt + deposits).min(ceiling * dt);
    let demand_energy = demand * dt;
    let mut report = SettlementReport {
        generation,
        demand,
        ceiling,
        available,
        ..SettlementReport::default()
    };

    // Storage output shares the ceiling with generation.
    let headroom = (ceiling * dt - available).max(0.0);
    let reserve = storages
        .iter()
        .filter_map(|id| nodes.get(id))
        .map(|node| node.dischargeable(dt))
        .sum::<f32>()
        .min(headroom);
    let supply = available + reserve;
    report.deficit = (demand_energy - supply).max(0.0);

    let mut budget = supply;
    let mut exhausted = false;
    for id in &consumers {
        let Some(node) = nodes.get_mut(id) else {
            continue;
        };
        if !node.is_active() {
            node.set_powered(false);
            continue;
        }
        let need = node.rated_demand() * dt;
        if !exhausted && budget + ENERGY_EPSILON >= need {
            budget = (budget - need).max(0.0);
            report.delivered += need;
            report.powered_consumers += 1;
            node.set_powered(true);
        } else {
            exhausted = true;
            report.unserved += need;
            report.unpowered_consumers += 1;
            node.set_powered(false);
        }
    }

    // Draw only what served consumers used beyond generation.
    let mut to_draw = (report.delivered - available).max(0.0).min(reserve);
    for id in &storages {
        if to_draw <= 0.0 {
            break;
        }
        if let Some(node) = nodes.get_mut(id) {
            let drawn = node.discharge(to_draw, dt);
            to_draw -= drawn;
            report.drained += drawn;
        }
    }

    let mut pool = (available - report.delivered).max(0.0);
    let live = report.available + report.drained > 0.0;
    for id in &storages {
        let Some(node) = nodes.get_mut(id) else {
            continue;
        };
        if pool > 0.0 {
            let stored = node.charge(pool);
            pool -= stored;
            report.stored += stored;
        }
        node.set_powered(live);
    }
    for id in &others {
        if let Some(node) = nodes.get_mut(id) {
            node.set_powered(live);
        }
    }
    report.wasted = pool.max(0.0);

    network.record_settlement(report);
    report
}
