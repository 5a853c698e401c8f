// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use epanet_bridge::toolkit::{link, node, Toolkit};
use epanet_bridge::BridgeOptions;
use tempfile::TempDir;

pub struct FakeNode {
    pub id: String,
    pub elevation: f32,
    pub base_demand: f32,
    pub emitter: f32,
    pub tank_level: Option<f32>,
    pub demand: f32,
    pub head: f32,
    pub pressure: f32,
    pub quality: f32,
}

impl FakeNode {
    fn junction(id: &str, elevation: f32, base_demand: f32) -> FakeNode {
        FakeNode {
            id: id.to_string(),
            elevation,
            base_demand,
            emitter: 0.0,
            tank_level: None,
            demand: 0.0,
            head: 0.0,
            pressure: 0.0,
            quality: 0.0,
        }
    }

    fn tank(id: &str, elevation: f32, level: f32) -> FakeNode {
        FakeNode {
            tank_level: Some(level),
            ..FakeNode::junction(id, elevation, 0.0)
        }
    }
}

pub struct FakeLink {
    pub id: String,
    pub status: f32,
    pub setting: f32,
    pub flow: f32,
    pub velocity: f32,
    pub headloss: f32,
    pub quality: f32,
}

impl FakeLink {
    fn new(id: &str) -> FakeLink {
        FakeLink {
            id: id.to_string(),
            status: 1.0,
            setting: 1.0,
            flow: 0.0,
            velocity: 0.0,
            headloss: 0.0,
            quality: 0.0,
        }
    }
}

/// Scripted in-memory stand-in for the EPANET toolkit.
///
/// Hydraulics are a toy: flows follow total junction demand, tanks rise
/// one unit per simulated hour. Mutating calls are recorded in `calls`;
/// `failures` makes the named call return the given status code.
/// `next_h_at_end` applies to advances requested after the one that
/// reported the end of the simulation.
pub struct FakeNetwork {
    pub nodes: Vec<FakeNode>,
    pub links: Vec<FakeLink>,
    pub patterns: Vec<Vec<f32>>,
    pub hydraulic_step: i64,
    pub duration: i64,
    pub quality_type: i32,
    pub clock: i64,
    pub ended: bool,
    pub calls: Vec<String>,
    pub failures: HashMap<&'static str, i32>,
    pub opened_file: Option<String>,
}

impl FakeNetwork {
    /// Junctions J1, J2, tank T1; pipes P1, P2 and valve V1; pattern PAT1.
    pub fn net1() -> FakeNetwork {
        FakeNetwork {
            nodes: vec![
                FakeNode::junction("J1", 100.0, 50.0),
                FakeNode::junction("J2", 90.0, 25.0),
                FakeNode::tank("T1", 120.0, 10.0),
            ],
            links: vec![FakeLink::new("P1"), FakeLink::new("P2"), FakeLink::new("V1")],
            patterns: vec![vec![1.0; 24]],
            hydraulic_step: 3600,
            duration: 24 * 3600,
            quality_type: 0,
            clock: 0,
            ended: false,
            calls: Vec::new(),
            failures: HashMap::new(),
            opened_file: None,
        }
    }

    pub fn with_quality(mut self) -> FakeNetwork {
        self.quality_type = 1;
        self
    }

    pub fn failing(mut self, call: &'static str, code: i32) -> FakeNetwork {
        self.failures.insert(call, code);
        self
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn node(&self, id: &str) -> &FakeNode {
        self.nodes.iter().find(|n| n.id == id).expect("unknown fake node")
    }

    pub fn link(&self, id: &str) -> &FakeLink {
        self.links.iter().find(|l| l.id == id).expect("unknown fake link")
    }

    fn record(&mut self, call: &str) -> i32 {
        self.calls.push(call.to_string());
        self.failures.get(call).copied().unwrap_or(0)
    }

    fn solve(&mut self) {
        let total_demand: f32 = self
            .nodes
            .iter()
            .filter(|n| n.tank_level.is_none())
            .map(|n| n.base_demand + n.emitter)
            .sum();
        let quality = if self.quality_type > 0 {
            self.clock as f32 / 3600.0
        } else {
            0.0
        };

        for n in self.nodes.iter_mut() {
            match n.tank_level {
                Some(level) => {
                    n.demand = 0.0;
                    n.head = n.elevation + level;
                }
                None => {
                    n.demand = n.base_demand + n.emitter;
                    n.head = n.elevation + 100.0 - 0.1 * total_demand;
                }
            }
            n.pressure = (n.head - n.elevation) * 0.4333;
            n.quality = quality;
        }

        for l in self.links.iter_mut() {
            l.flow = l.status * l.setting * total_demand;
            l.velocity = 0.01 * l.flow;
            l.headloss = 0.02 * l.flow;
            l.quality = quality;
        }
    }

    fn node_at(&self, index: i32) -> Option<&FakeNode> {
        if index < 1 {
            return None;
        }
        self.nodes.get(index as usize - 1)
    }

    fn link_at(&self, index: i32) -> Option<&FakeLink> {
        if index < 1 {
            return None;
        }
        self.links.get(index as usize - 1)
    }
}

const UNDEFINED_NODE: i32 = 240;
const UNDEFINED_LINK: i32 = 241;
const UNDEFINED_PATTERN: i32 = 242;
const INVALID_NODE_PROPERTY: i32 = 246;
const INVALID_LINK_PROPERTY: i32 = 247;

impl Toolkit for FakeNetwork {
    fn open(&mut self, inp_file: &str, _rpt_file: &str, _out_file: &str) -> i32 {
        let code = self.record("open");
        if code == 0 {
            self.opened_file = Some(inp_file.to_string());
        }
        code
    }

    fn close(&mut self) -> i32 {
        self.record("close")
    }

    fn open_h(&mut self) -> i32 {
        self.record("open_h")
    }

    fn init_h(&mut self, _flag: i32) -> i32 {
        self.clock = 0;
        self.ended = false;
        self.record("init_h")
    }

    fn run_h(&mut self) -> (i32, i64) {
        let code = self.record("run_h");
        if code == 0 {
            self.solve();
        }
        (code, self.clock)
    }

    fn next_h(&mut self) -> (i32, i64) {
        let code = self.record("next_h");
        if code != 0 {
            return (code, 0);
        }
        if self.clock >= self.duration {
            if !self.ended {
                self.ended = true;
                return (0, 0);
            }
            return (self.failures.get("next_h_at_end").copied().unwrap_or(0), 0);
        }

        let step = self.hydraulic_step.min(self.duration - self.clock);
        for n in self.nodes.iter_mut() {
            if let Some(level) = n.tank_level.as_mut() {
                *level += step as f32 / 3600.0;
            }
        }
        self.clock += step;
        (0, step)
    }

    fn close_h(&mut self) -> i32 {
        self.record("close_h")
    }

    fn open_q(&mut self) -> i32 {
        self.record("open_q")
    }

    fn init_q(&mut self, _flag: i32) -> i32 {
        self.record("init_q")
    }

    fn run_q(&mut self) -> (i32, i64) {
        (self.record("run_q"), self.clock)
    }

    fn close_q(&mut self) -> i32 {
        self.record("close_q")
    }

    fn get_qual_type(&self) -> (i32, i32, i32) {
        match self.failures.get("get_qual_type") {
            Some(&code) => (code, 0, 0),
            None => (0, self.quality_type, 0),
        }
    }

    fn get_node_index(&self, id: &str) -> (i32, i32) {
        match self.nodes.iter().position(|n| n.id == id) {
            Some(pos) => (0, pos as i32 + 1),
            None => (240, 0),
        }
    }

    fn get_link_index(&self, id: &str) -> (i32, i32) {
        match self.links.iter().position(|l| l.id == id) {
            Some(pos) => (0, pos as i32 + 1),
            None => (241, 0),
        }
    }

    fn get_node_value(&self, index: i32, property: i32) -> (i32, f32) {
        let n = match self.node_at(index) {
            Some(n) => n,
            None => return (UNDEFINED_NODE, 0.0),
        };
        let value = match property {
            node::BASEDEMAND => n.base_demand,
            node::EMITTER => n.emitter,
            node::TANKLEVEL => n.tank_level.unwrap_or(0.0),
            node::DEMAND => n.demand,
            node::HEAD => n.head,
            node::PRESSURE => n.pressure,
            node::QUALITY => n.quality,
            _ => return (INVALID_NODE_PROPERTY, 0.0),
        };
        (0, value)
    }

    fn set_node_value(&mut self, index: i32, property: i32, value: f32) -> i32 {
        let code = self.record("set_node_value");
        if code != 0 {
            return code;
        }
        if self.node_at(index).is_none() {
            return UNDEFINED_NODE;
        }
        let n = &mut self.nodes[index as usize - 1];
        match property {
            node::BASEDEMAND => n.base_demand = value,
            node::EMITTER => n.emitter = value,
            node::TANKLEVEL if n.tank_level.is_some() => n.tank_level = Some(value),
            _ => return INVALID_NODE_PROPERTY,
        }
        0
    }

    fn get_link_value(&self, index: i32, property: i32) -> (i32, f32) {
        let l = match self.link_at(index) {
            Some(l) => l,
            None => return (UNDEFINED_LINK, 0.0),
        };
        let value = match property {
            link::FLOW => l.flow,
            link::VELOCITY => l.velocity,
            link::HEADLOSS => l.headloss,
            link::STATUS => l.status,
            link::SETTING => l.setting,
            link::QUALITY => l.quality,
            _ => return (INVALID_LINK_PROPERTY, 0.0),
        };
        (0, value)
    }

    fn set_link_value(&mut self, index: i32, property: i32, value: f32) -> i32 {
        let code = self.record("set_link_value");
        if code != 0 {
            return code;
        }
        if self.link_at(index).is_none() {
            return UNDEFINED_LINK;
        }
        let l = &mut self.links[index as usize - 1];
        match property {
            link::STATUS => l.status = value,
            link::SETTING => l.setting = value,
            _ => return INVALID_LINK_PROPERTY,
        }
        0
    }

    fn get_pattern_value(&self, index: i32, period: i32) -> (i32, f32) {
        if index < 1 || period < 1 {
            return (UNDEFINED_PATTERN, 0.0);
        }
        match self
            .patterns
            .get(index as usize - 1)
            .and_then(|p| p.get(period as usize - 1))
        {
            Some(v) => (0, *v),
            None => (UNDEFINED_PATTERN, 0.0),
        }
    }

    fn set_pattern_value(&mut self, index: i32, period: i32, value: f32) -> i32 {
        let code = self.record("set_pattern_value");
        if code != 0 {
            return code;
        }
        if index < 1 || period < 1 {
            return UNDEFINED_PATTERN;
        }
        match self
            .patterns
            .get_mut(index as usize - 1)
            .and_then(|p| p.get_mut(period as usize - 1))
        {
            Some(v) => {
                *v = value;
                0
            }
            None => UNDEFINED_PATTERN,
        }
    }
}

/// A private working directory for one test, removed on drop.
pub struct Scratch {
    pub dir: PathBuf,
    _root: TempDir,
}

impl Scratch {
    pub fn new(tag: &str) -> Scratch {
        let root = tempfile::Builder::new()
            .prefix(&format!("epanet_bridge_{}_", tag))
            .tempdir()
            .expect("cannot create scratch dir");
        Scratch {
            dir: root.path().to_path_buf(),
            _root: root,
        }
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, contents).expect("cannot write scratch file");
        path
    }

    pub fn options(&self) -> BridgeOptions {
        BridgeOptions {
            config_path: self.dir.join("EpanetBridge.json"),
            log_path: self.dir.join("epanet_bridge_debug.log"),
        }
    }

    pub fn read_log(&self) -> String {
        fs::read_to_string(self.dir.join("epanet_bridge_debug.log")).unwrap_or_default()
    }

    /// Writes the model file and a configuration for it.
    pub fn with_config(self, config: &str) -> Scratch {
        self.write("net1.inp", NET1_INP);
        self.write("EpanetBridge.json", config);
        self
    }
}

pub const NET1_INP: &str = "[TITLE]\nscratch model\n\n[JUNCTIONS]\nJ1 100 50\nJ2 90 25\n\n[TANKS]\nT1 120 10 0 20 50 0\n\n[END]\n";

/// Inputs: elapsed time, J1 demand, V1 setting.
/// Outputs: J1 pressure, T1 tank level, P1 flow.
pub fn net1_config(level: &str) -> String {
    format!(
        r#"{{
  "version": "1.0",
  "logging_level": "{}",
  "inp_file": "net1.inp",
  "_comment": "scratch configuration",
  "input_count": 3,
  "output_count": 3,
  "inputs": [
    {{ "index": 0, "name": "ElapsedTime", "object_type": "SYSTEM", "property": "ELAPSEDTIME" }},
    {{ "index": 1, "name": "J1", "object_type": "NODE", "property": "DEMAND" }},
    {{ "index": 2, "name": "V1", "object_type": "LINK", "property": "SETTING" }}
  ],
  "outputs": [
    {{ "index": 0, "name": "J1", "object_type": "NODE", "property": "PRESSURE" }},
    {{ "index": 1, "name": "T1", "object_type": "NODE", "property": "TANKLEVEL" }},
    {{ "index": 2, "name": "P1", "object_type": "LINK", "property": "FLOW" }}
  ]
}}"#,
        level
    )
}
