use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use sl_compiler::*;
use sl_graph::{BlockProperty, HighLevelBlock, HighLevelSystem, LinkData, LowLevelBlockStructure};
use sl_plugins::{CompileOutcome, CoreBlockPlugin, Plugin, PluginRegistry};
use sl_project::{BlockLibraryConfig, PluginDescriptor, SimulationOptions};

fn basic_blocks() -> PluginDescriptor {
    serde_json::from_value(json!({
        "pluginName": "BasicBlocks",
        "pluginType": "core",
        "blockType": "BasicCpp",
        "blockLibraries": [{
            "name": "BasicBlocks",
            "blockTypes": [
                {"name": "Constant", "outputPorts": 1,
                 "configurationValues": [{"name": "Value", "type": "float", "defaultValue": 0}]},
                {"name": "Gain", "inputPorts": 1, "outputPorts": 1,
                 "configurationValues": [{"name": "Gain", "type": "float", "defaultValue": 1}]}
            ]
        }]
    }))
    .unwrap()
}

fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(CoreBlockPlugin::new(basic_blocks()).unwrap());
    registry.register_builtins();
    registry
}

fn constant(id: &str, value: serde_json::Value) -> HighLevelBlock {
    HighLevelBlock::new(id, "Constant", "core_BasicBlocks", "Constant")
        .with_ports(0, 1)
        .with_property("Value", BlockProperty::untyped(value))
}

fn display(id: &str) -> HighLevelBlock {
    HighLevelBlock::new(id, "Display", "display_library", "display").with_ports(1, 0)
}

fn system(blocks: Vec<HighLevelBlock>, links: Vec<LinkData>) -> HighLevelSystem {
    HighLevelSystem::new("sim.yaml", None, "toolkit.yaml", blocks, links).unwrap()
}

fn link(id: Option<&str>, source: &str, source_port: u32, target: &str, target_port: u32) -> LinkData {
    LinkData::new(id.map(str::to_string), source, source_port, target, target_port)
}

#[test]
fn constant_to_display() {
    let system = system(
        vec![constant("c1", json!(3)), display("d1")],
        vec![link(Some("L1"), "c1", 0, "d1", 0)],
    );
    let structure = compile_system(&system, &registry()).unwrap();

    let ids: Vec<&str> = structure.blocks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["c1", "d1"]);
    assert_eq!(structure.block("c1").unwrap().block_class, "BasicBlocks/Constant");
    assert_eq!(structure.block("d1").unwrap().block_class, "BasicBlocks/Display");

    let l1 = structure.link("L1").unwrap();
    assert_eq!((l1.source_block_id.as_str(), l1.source_port), ("c1", 0));
    assert_eq!((l1.destination_block_id.as_str(), l1.destination_port), ("d1", 0));

    let doc = structure.to_document();
    assert_eq!(doc["Blocks"][0]["Value"], json!("3.0"));
    assert_eq!(doc["Blocks"][0]["BlockType"], json!("BasicCpp"));
}

#[test]
fn unmapped_target_port() {
    // The display declares two inputs but only maps the first.
    let system = system(
        vec![constant("c1", json!(1)), display("d1").with_ports(2, 0)],
        vec![link(Some("L1"), "c1", 0, "d1", 1)],
    );
    let err = compile_system(&system, &registry()).unwrap_err();
    assert_eq!(
        err,
        CompileFailure::UnresolvedLink {
            link_id: "L1".into(),
            endpoint: Endpoint::Target,
            reason: LinkFailure::NotMapped {
                block_id: "d1".into(),
                port: 1,
            },
        }
    );
}

#[test]
fn out_of_range_source_port() {
    let system = system(
        vec![constant("c1", json!(1)), display("d1")],
        vec![link(Some("L1"), "c1", 3, "d1", 0)],
    );
    let err = compile_system(&system, &registry()).unwrap_err();
    assert!(matches!(
        err,
        CompileFailure::UnresolvedLink {
            endpoint: Endpoint::Source,
            reason: LinkFailure::PortOutOfRange { port: 3, available: 1, .. },
            ..
        }
    ));
}

#[test]
fn link_to_missing_block() {
    let system = system(
        vec![constant("c1", json!(1))],
        vec![link(None, "c1", 0, "ghost", 0)],
    );
    let err = compile_system(&system, &registry()).unwrap_err();
    assert_eq!(
        err,
        CompileFailure::UnresolvedLink {
            link_id: "link1".into(),
            endpoint: Endpoint::Target,
            reason: LinkFailure::UnknownBlock {
                block_id: "ghost".into()
            },
        }
    );
}

#[test]
fn unknown_library_is_unresolved() {
    let widget = HighLevelBlock::new("w1", "Widget", "widgets", "widget");
    let err = compile_system(&system(vec![widget], vec![]), &registry()).unwrap_err();
    assert!(matches!(err, CompileFailure::UnresolvedBlock { ref block_id, .. } if block_id == "w1"));
}

#[test]
fn unknown_type_in_known_library_is_schema_failure() {
    let block = HighLevelBlock::new("s1", "Sine", "core_BasicBlocks", "Sine");
    let err = compile_system(&system(vec![block], vec![]), &registry()).unwrap_err();
    assert!(matches!(err, CompileFailure::SchemaLookup { ref block_id, .. } if block_id == "s1"));
}

#[test]
fn coercion_failure_names_block_and_property() {
    let system = system(vec![constant("c1", json!("not a number"))], vec![]);
    let err = compile_system(&system, &registry()).unwrap_err();
    assert!(matches!(
        err,
        CompileFailure::Coercion { ref block_id, ref property, .. } if block_id == "c1" && property == "Value"
    ));
}

struct Counting {
    offered: Arc<AtomicUsize>,
}

impl Plugin for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn libraries(&self) -> &[BlockLibraryConfig] {
        &[]
    }

    fn handles(&self, _block: &HighLevelBlock) -> bool {
        true
    }

    fn compile(&self, _block: &HighLevelBlock) -> CompileOutcome<LowLevelBlockStructure> {
        self.offered.fetch_add(1, Ordering::SeqCst);
        CompileOutcome::Declined
    }
}

#[test]
fn first_willing_plugin_wins() {
    let offered = Arc::new(AtomicUsize::new(0));
    let mut registry = registry();
    registry.register(Counting {
        offered: Arc::clone(&offered),
    });

    let system = system(vec![constant("c1", json!(1)), display("d1")], vec![]);
    compile_system(&system, &registry).unwrap();
    assert_eq!(offered.load(Ordering::SeqCst), 0);

    let widget = HighLevelBlock::new("w1", "Widget", "widgets", "widget");
    compile_system(&self::system(vec![widget], vec![]), &registry).unwrap_err();
    assert_eq!(offered.load(Ordering::SeqCst), 1);
}

#[test]
fn neuron_fan_out_is_wired_through_port_map() {
    let neuron = HighLevelBlock::new("n1", "Neuron", "neuron_library", "neuron")
        .with_ports(2, 1)
        .with_property("gains", BlockProperty::untyped(json!([0.5, 2])));
    let system = system(
        vec![constant("a", json!(1)), constant("b", json!(2)), neuron, display("d1")],
        vec![
            link(Some("La"), "a", 0, "n1", 0),
            link(Some("Lb"), "b", 0, "n1", 1),
            link(Some("Lout"), "n1", 0, "d1", 0),
        ],
    );
    let structure = compile_system(&system, &registry()).unwrap();

    let ids: Vec<&str> = structure.blocks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "n1_gain0", "n1_gain1", "n1_offset", "n1_adder", "d1"]);

    let links: Vec<&str> = structure.links().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(links, ["n1_link0", "n1_link1", "n1_link2", "La", "Lb", "Lout"]);

    assert_eq!(structure.link("Lb").unwrap().destination_block_id, "n1_gain1");
    assert_eq!(structure.link("Lout").unwrap().source_block_id, "n1_adder");

    let doc = structure.to_document();
    assert_eq!(doc["Blocks"][3]["Gain"], json!("2.0"));
}

#[test]
fn generated_link_names() {
    let system = system(
        vec![constant("c1", json!(1)), display("d1"), display("d2")],
        vec![link(None, "c1", 0, "d1", 0), link(None, "c1", 0, "d2", 0)],
    );
    let structure = compile_system(&system, &registry()).unwrap();
    let ids: Vec<&str> = structure.links().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["link1", "link2"]);
    assert_eq!(structure.links()[1].name, "link2");
}

fn wide_system() -> HighLevelSystem {
    let mut blocks = Vec::new();
    let mut links = Vec::new();
    for i in 0..32 {
        blocks.push(constant(&format!("c{i}"), json!(i)));
        blocks.push(display(&format!("d{i}")));
        links.push(link(None, &format!("c{i}"), 0, &format!("d{i}"), 0));
    }
    system(blocks, links)
}

#[test]
fn compilation_is_deterministic() {
    let registry = registry();
    let first = compile_system(&wide_system(), &registry).unwrap();
    let second = compile_system(&wide_system(), &registry).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.to_yaml_string().unwrap(), second.to_yaml_string().unwrap());
}

#[test]
fn parallel_matches_sequential() {
    let registry = registry();
    let sequential = compile_system_with(&wide_system(), &registry, CompileOptions { parallel: false }).unwrap();
    let parallel = compile_system_with(&wide_system(), &registry, CompileOptions { parallel: true }).unwrap();
    assert_eq!(sequential.fingerprint(), parallel.fingerprint());
}

#[test]
fn parallel_reports_first_failure_in_diagram_order() {
    let blocks = vec![
        constant("ok", json!(1)),
        HighLevelBlock::new("w1", "Widget", "widgets", "widget"),
        constant("bad", json!("nope")),
        HighLevelBlock::new("w2", "Widget", "widgets", "widget"),
    ];
    let err = compile_system_with(&system(blocks, vec![]), &registry(), CompileOptions { parallel: true })
        .unwrap_err();
    assert!(matches!(err, CompileFailure::UnresolvedBlock { ref block_id, .. } if block_id == "w1"));
}

struct RecordingEngine;

impl SimulationEngine for RecordingEngine {
    fn simulate(
        &self,
        structure: &sl_graph::LowLevelStructure,
        options: &SimulationOptions,
    ) -> Result<SimulationOutput, EngineError> {
        let stop = options
            .stop_time
            .ok_or_else(|| EngineError::Rejected("no stop time".into()))?;
        let mut output = SimulationOutput::new();
        for block in structure.blocks() {
            let mut series = TimeSeries::default();
            series.push(0.0, 0.0);
            series.push(stop, 1.0);
            output.insert(block.id.as_str(), "output0", series);
        }
        Ok(output)
    }
}

#[test]
fn compile_then_simulate() {
    let system = system(
        vec![constant("c1", json!(1)), display("d1")],
        vec![link(Some("L1"), "c1", 0, "d1", 0)],
    );
    let options = SimulationOptions {
        stop_time: Some(2.0),
        ..SimulationOptions::default()
    };
    let output = compile_and_simulate(
        &system,
        &registry(),
        CompileOptions::default(),
        &RecordingEngine,
        &options,
    )
    .unwrap();
    assert_eq!(output.signal_count(), 2);
    assert_eq!(output.get("c1", "output0").unwrap().times, [0.0, 2.0]);

    let err = compile_and_simulate(
        &system,
        &registry(),
        CompileOptions::default(),
        &RecordingEngine,
        &SimulationOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Engine(EngineError::Rejected(_))));
}
