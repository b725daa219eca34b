//! Small end-to-end demo: five nodes, a handful of commuting agents, one
//! `Kernel` run, text output.
//!
//! Usage: `sim --config <path>` (see `demos/sim/config.json` for a sample).

mod network;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tk_agent::AgentStoreBuilder;
use tk_core::{AgentId, NodeId, Tick, TransportMode};
use tk_output::{agent_records, network_records, simulation_record, TextEventWriter, ROADNETWORK_DONE};
use tk_schedule::{Activity, LocationType, SubTrip, Trip, TripChain, TripChainItem};
use tk_sim::{AgentEntity, KernelBuilder, KernelConfig};
use tk_spatial::{DijkstraRouter, RoadTopologyBuilder};

/// One agent's commute: home -> work, a dwell, work -> home.
struct Commuter {
    home: NodeId,
    work: NodeId,
    mode: TransportMode,
}

fn trip_chain(commuter: &Commuter, work_arrival_tick: u32, work_duration_ticks: u32) -> Result<TripChain> {
    let sub_trip = |mode| SubTrip { sub_trip_seq: 0, mode, is_primary_mode: true, line: None };

    let items = vec![
        TripChainItem::Activity(Activity {
            sequence: 0,
            location: LocationType::Node(commuter.home),
            activity_type: 0,
            is_primary: true,
            is_flexible: false,
            is_mandatory: true,
            start_tick: Tick(0),
            end_tick: Tick(work_arrival_tick as u64),
        }),
        TripChainItem::Trip(Trip {
            sequence: 1,
            from: LocationType::Node(commuter.home),
            to: LocationType::Node(commuter.work),
            sub_trips: vec![sub_trip(commuter.mode)],
        }),
        TripChainItem::Activity(Activity {
            sequence: 2,
            location: LocationType::Node(commuter.work),
            activity_type: 1,
            is_primary: true,
            is_flexible: false,
            is_mandatory: true,
            start_tick: Tick(work_arrival_tick as u64),
            end_tick: Tick((work_arrival_tick + work_duration_ticks) as u64),
        }),
        TripChainItem::Trip(Trip {
            sequence: 3,
            from: LocationType::Node(commuter.work),
            to: LocationType::Node(commuter.home),
            sub_trips: vec![sub_trip(commuter.mode)],
        }),
        TripChainItem::Activity(Activity {
            sequence: 4,
            location: LocationType::Node(commuter.home),
            activity_type: 0,
            is_primary: true,
            is_flexible: false,
            is_mandatory: true,
            start_tick: Tick((work_arrival_tick + work_duration_ticks) as u64),
            end_tick: Tick(u64::MAX),
        }),
    ];

    TripChain::new(items).context("building trip chain")
}

fn parse_config_path() -> Result<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().context("--config requires a path argument")?;
            return Ok(PathBuf::from(path));
        }
    }
    anyhow::bail!("usage: sim --config <path>");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = parse_config_path()?;
    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("reading config at {}", config_path.display()))?;
    let config: KernelConfig = serde_json::from_str(&raw).context("parsing config JSON")?;
    config.validate().context("config failed validation")?;

    let (network, [north, south, downtown, commerce, connector]) = network::build_network();

    let commuters = [
        Commuter { home: north, work: downtown, mode: TransportMode::Car },
        Commuter { home: south, work: commerce, mode: TransportMode::Car },
        Commuter { home: north, work: commerce, mode: TransportMode::Walk },
        Commuter { home: south, work: downtown, mode: TransportMode::Car },
        Commuter { home: connector, work: downtown, mode: TransportMode::Walk },
        Commuter { home: connector, work: commerce, mode: TransportMode::Car },
    ];

    let work_arrival_tick = 50;
    let work_duration_ticks = 100;

    let mut trip_chains = Vec::with_capacity(commuters.len());
    let mut agent_entities = Vec::with_capacity(commuters.len());
    for (idx, commuter) in commuters.iter().enumerate() {
        let chain = trip_chain(commuter, work_arrival_tick, work_duration_ticks)?;
        let id = AgentId(idx as u32);
        agent_entities.push(AgentEntity::new(id, Tick::ZERO, chain.clone(), config.sim.seed + idx as u64));
        trip_chains.push(chain);
    }

    let agent_store = AgentStoreBuilder::new(commuters.len()).build();

    let output_dir = PathBuf::from("output/sim");
    std::fs::create_dir_all(&output_dir).context("creating output directory")?;
    let mut writer = TextEventWriter::create(&output_dir.join("events.txt")).context("creating output writer")?;

    writer.write_record(&simulation_record(config.sim.tick_duration_millis))?;
    let topology = RoadTopologyBuilder::new().build();
    writer.write_records(&network_records(&topology, network.node_count()))?;
    writer.flush()?;
    println!("{ROADNETWORK_DONE}");

    let mut kernel = KernelBuilder::new(config.clone(), agent_store, network, DijkstraRouter, trip_chains, agent_entities)
        .build()
        .context("building kernel")?;

    while kernel.current_tick() < config.sim.end_tick() {
        kernel.tick().context("advancing tick")?;
        let tick = kernel.current_tick().0;
        if !config.is_warmup(tick) && tick % config.sim.output_interval_ticks == 0 {
            let snapshot = kernel.agent_snapshot();
            writer.write_records(&agent_records(tick, &snapshot))?;
        }
    }
    writer.flush()?;

    println!("ran {} ticks for {} agents", config.sim.end_tick().0, commuters.len());
    for (id, pos, _lane, role) in kernel.agent_snapshot() {
        println!("agent {}: role={role} pos=({}, {})", id.0, pos.x_cm, pos.y_cm);
    }

    Ok(())
}
