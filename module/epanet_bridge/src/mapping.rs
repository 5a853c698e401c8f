// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Typed bindings between driver array slots and model elements.

use std::fmt;

use tracing::{debug, error};

use crate::engine::Engine;
use crate::errors::BridgeError;
use crate::toolkit::{link, node, Toolkit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    System,
    Node,
    Link,
    Pattern,
}

impl ObjectKind {
    pub fn parse(s: &str) -> Option<ObjectKind> {
        match s {
            "SYSTEM" => Some(ObjectKind::System),
            "NODE" => Some(ObjectKind::Node),
            "LINK" => Some(ObjectKind::Link),
            "PATTERN" => Some(ObjectKind::Pattern),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::System => "SYSTEM",
            ObjectKind::Node => "NODE",
            ObjectKind::Link => "LINK",
            ObjectKind::Pattern => "PATTERN",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a calculate-phase input value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Node(i32),
    Link(i32),
    Pattern,
}

/// Where a calculate-phase output value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Node(i32),
    Link(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    ElapsedTime,
    NodeDemand,
    NodeBaseDemand,
    NodeElevation,
    NodeEmitter,
    NodeInitQual,
    NodeSourceQual,
    NodeSourcePat,
    NodeSourceType,
    LinkStatus,
    LinkSetting,
    LinkDiameter,
    LinkLength,
    LinkRoughness,
    LinkMinorLoss,
    LinkInitStatus,
    LinkInitSetting,
    LinkKBulk,
    LinkKWall,
    PatternMultiplier,
}

impl InputBinding {
    pub const ALL: [InputBinding; 20] = [
        InputBinding::ElapsedTime,
        InputBinding::NodeDemand,
        InputBinding::NodeBaseDemand,
        InputBinding::NodeElevation,
        InputBinding::NodeEmitter,
        InputBinding::NodeInitQual,
        InputBinding::NodeSourceQual,
        InputBinding::NodeSourcePat,
        InputBinding::NodeSourceType,
        InputBinding::LinkStatus,
        InputBinding::LinkSetting,
        InputBinding::LinkDiameter,
        InputBinding::LinkLength,
        InputBinding::LinkRoughness,
        InputBinding::LinkMinorLoss,
        InputBinding::LinkInitStatus,
        InputBinding::LinkInitSetting,
        InputBinding::LinkKBulk,
        InputBinding::LinkKWall,
        InputBinding::PatternMultiplier,
    ];

    pub fn parse(kind: ObjectKind, property: &str) -> Option<InputBinding> {
        InputBinding::ALL
            .iter()
            .copied()
            .find(|b| b.kind() == kind && b.property() == property)
    }

    pub fn kind(self) -> ObjectKind {
        use InputBinding::*;
        match self {
            ElapsedTime => ObjectKind::System,
            NodeDemand | NodeBaseDemand | NodeElevation | NodeEmitter | NodeInitQual
            | NodeSourceQual | NodeSourcePat | NodeSourceType => ObjectKind::Node,
            LinkStatus | LinkSetting | LinkDiameter | LinkLength | LinkRoughness
            | LinkMinorLoss | LinkInitStatus | LinkInitSetting | LinkKBulk | LinkKWall => ObjectKind::Link,
            PatternMultiplier => ObjectKind::Pattern,
        }
    }

    pub fn property(self) -> &'static str {
        use InputBinding::*;
        match self {
            ElapsedTime => "ELAPSEDTIME",
            NodeDemand => "DEMAND",
            NodeBaseDemand => "BASEDEMAND",
            NodeElevation => "ELEVATION",
            NodeEmitter => "EMITTER",
            NodeInitQual => "INITQUAL",
            NodeSourceQual => "SOURCEQUAL",
            NodeSourcePat => "SOURCEPAT",
            NodeSourceType => "SOURCETYPE",
            LinkStatus => "STATUS",
            LinkSetting => "SETTING",
            LinkDiameter => "DIAMETER",
            LinkLength => "LENGTH",
            LinkRoughness => "ROUGHNESS",
            LinkMinorLoss => "MINORLOSS",
            LinkInitStatus => "INITSTATUS",
            LinkInitSetting => "INITSETTING",
            LinkKBulk => "KBULK",
            LinkKWall => "KWALL",
            PatternMultiplier => "MULTIPLIER",
        }
    }

    /// Engine property written during calculate; `None` for bindings that
    /// validate but cannot be driven per step.
    pub fn target(self) -> Option<InputTarget> {
        match self {
            // demand inputs drive the junction's base demand
            InputBinding::NodeDemand => Some(InputTarget::Node(node::BASEDEMAND)),
            InputBinding::NodeEmitter => Some(InputTarget::Node(node::EMITTER)),
            InputBinding::LinkStatus => Some(InputTarget::Link(link::STATUS)),
            InputBinding::LinkSetting => Some(InputTarget::Link(link::SETTING)),
            InputBinding::PatternMultiplier => Some(InputTarget::Pattern),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputBinding {
    NodeDemand,
    NodeHead,
    NodePressure,
    NodeTankLevel,
    NodeQuality,
    LinkFlow,
    LinkVelocity,
    LinkHeadloss,
    LinkStatus,
    LinkSetting,
    LinkEnergy,
    LinkQuality,
}

impl OutputBinding {
    pub const ALL: [OutputBinding; 12] = [
        OutputBinding::NodeDemand,
        OutputBinding::NodeHead,
        OutputBinding::NodePressure,
        OutputBinding::NodeTankLevel,
        OutputBinding::NodeQuality,
        OutputBinding::LinkFlow,
        OutputBinding::LinkVelocity,
        OutputBinding::LinkHeadloss,
        OutputBinding::LinkStatus,
        OutputBinding::LinkSetting,
        OutputBinding::LinkEnergy,
        OutputBinding::LinkQuality,
    ];

    pub fn parse(kind: ObjectKind, property: &str) -> Option<OutputBinding> {
        OutputBinding::ALL
            .iter()
            .copied()
            .find(|b| b.kind() == kind && b.property() == property)
    }

    pub fn kind(self) -> ObjectKind {
        use OutputBinding::*;
        match self {
            NodeDemand | NodeHead | NodePressure | NodeTankLevel | NodeQuality => ObjectKind::Node,
            _ => ObjectKind::Link,
        }
    }

    pub fn property(self) -> &'static str {
        use OutputBinding::*;
        match self {
            NodeDemand => "DEMAND",
            NodeHead => "HEAD",
            NodePressure => "PRESSURE",
            NodeTankLevel => "TANKLEVEL",
            NodeQuality => "QUALITY",
            LinkFlow => "FLOW",
            LinkVelocity => "VELOCITY",
            LinkHeadloss => "HEADLOSS",
            LinkStatus => "STATUS",
            LinkSetting => "SETTING",
            LinkEnergy => "ENERGY",
            LinkQuality => "QUALITY",
        }
    }

    pub fn source(self) -> Option<OutputSource> {
        use OutputBinding::*;
        match self {
            NodeDemand => Some(OutputSource::Node(node::DEMAND)),
            NodeHead => Some(OutputSource::Node(node::HEAD)),
            NodePressure => Some(OutputSource::Node(node::PRESSURE)),
            NodeTankLevel => Some(OutputSource::Node(node::TANKLEVEL)),
            NodeQuality => Some(OutputSource::Node(node::QUALITY)),
            LinkFlow => Some(OutputSource::Link(link::FLOW)),
            LinkVelocity => Some(OutputSource::Link(link::VELOCITY)),
            LinkHeadloss => Some(OutputSource::Link(link::HEADLOSS)),
            LinkStatus => Some(OutputSource::Link(link::STATUS)),
            LinkSetting => Some(OutputSource::Link(link::SETTING)),
            LinkQuality => Some(OutputSource::Link(link::QUALITY)),
            LinkEnergy => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundInput {
    pub slot: usize,
    pub name: String,
    pub binding: InputBinding,
    /// Engine index; 0 until resolved.
    pub element: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundOutput {
    pub slot: usize,
    pub name: String,
    pub binding: OutputBinding,
    pub element: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mappings {
    pub inputs: Vec<BoundInput>,
    pub outputs: Vec<BoundOutput>,
}

impl Mappings {
    /// Looks up engine indices for every node and link entry that does not
    /// carry one yet. Stops at the first unknown name; entries resolved
    /// before it keep their index.
    pub fn resolve_indices<T: Toolkit>(&mut self, engine: &Engine<T>) -> Result<(), BridgeError> {
        let inputs = self
            .inputs
            .iter_mut()
            .map(|e| (e.binding.kind(), e.name.as_str(), &mut e.element));
        let outputs = self
            .outputs
            .iter_mut()
            .map(|e| (e.binding.kind(), e.name.as_str(), &mut e.element));

        for (kind, name, element) in inputs.chain(outputs) {
            let lookup = match kind {
                ObjectKind::System | ObjectKind::Pattern => {
                    *element = 0;
                    continue;
                }
                _ if *element > 0 => continue,
                ObjectKind::Node => engine.node_index(name),
                ObjectKind::Link => engine.link_index(name),
            };

            match lookup {
                Ok(index) => {
                    debug!("Resolved {} '{}' to index {}", kind, name, index);
                    *element = index;
                }
                Err(err) => {
                    error!("Failed to resolve {} '{}': {}", kind, name, err);
                    return Err(BridgeError::ElementNotFound {
                        name: name.to_string(),
                        code: err.code,
                    });
                }
            }
        }

        Ok(())
    }
}
