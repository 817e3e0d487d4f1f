//! HeadlessRig: полный набор collaborators + probes для инспекции

use bevy::prelude::*;

use super::collaborators::*;
use crate::creature::Collaborators;

/// Параметры, которые ядро шлёт в animation graph
pub const CREATURE_SIGNALS: [&str; 5] = ["isMoving", "reset", "Dead", "stun", "hop"];

/// Probes всех collaborators одного существа
#[derive(Debug, Clone)]
pub struct RigProbes {
    pub body: Probe<BodyState>,
    pub render: Probe<RenderState>,
    pub shapes: Probe<ShapeState>,
    pub health_bar: Probe<HealthBarState>,
    pub graph: Probe<GraphState>,
}

pub struct HeadlessRig {
    pub body: HeadlessBody,
    pub renderer: RecordingRenderer,
    pub shapes: RecordingShapes,
    pub health_bar: RecordingHealthBar,
    pub graph: ParameterGraph,
}

impl HeadlessRig {
    pub fn at(position: Vec2) -> Self {
        Self {
            body: HeadlessBody::at(position),
            renderer: RecordingRenderer::default(),
            shapes: RecordingShapes::default(),
            health_bar: RecordingHealthBar::default(),
            graph: ParameterGraph::new(CREATURE_SIGNALS),
        }
    }

    pub fn probes(&self) -> RigProbes {
        RigProbes {
            body: self.body.probe(),
            render: self.renderer.probe(),
            shapes: self.shapes.probe(),
            health_bar: self.health_bar.probe(),
            graph: self.graph.probe(),
        }
    }

    pub fn into_collaborators(self) -> Collaborators {
        Collaborators {
            movement: Box::new(self.body),
            renderer: Box::new(self.renderer),
            shapes: Box::new(self.shapes),
            health_display: Box::new(self.health_bar),
            animation_graphs: vec![Box::new(self.graph)],
        }
    }
}
