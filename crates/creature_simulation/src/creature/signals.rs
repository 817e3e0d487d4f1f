//! Animation signals с индексом, построенным один раз при setup
//!
//! Индекс `name → [graph indices]` строится в `AnimationSignals::new`
//! и больше не пересобирается. Параметр, которого нет ни в одном
//! graph: обычный negative lookup (`false`), не ошибка.

use std::collections::HashMap;

use super::collaborators::AnimationGraph;

pub struct AnimationSignals {
    graphs: Vec<Box<dyn AnimationGraph>>,
    index: HashMap<String, Vec<usize>>,
}

impl AnimationSignals {
    pub fn new(graphs: Vec<Box<dyn AnimationGraph>>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (graph_index, graph) in graphs.iter().enumerate() {
            for name in graph.parameters() {
                let entry = index.entry(name).or_default();
                // Дубликат параметра в одном graph не должен слать сигнал дважды
                if entry.last() != Some(&graph_index) {
                    entry.push(graph_index);
                }
            }
        }

        Self { graphs, index }
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Сколько graph'ов объявляют параметр
    pub fn recognized_by(&self, name: &str) -> usize {
        self.index.get(name).map_or(0, Vec::len)
    }

    fn dispatch(&mut self, name: &str, mut apply: impl FnMut(&mut dyn AnimationGraph)) -> bool {
        let Some(targets) = self.index.get(name) else {
            return false;
        };
        for &graph_index in targets {
            apply(self.graphs[graph_index].as_mut());
        }
        true
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        self.dispatch(name, |graph| graph.set_bool(name, value))
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> bool {
        self.dispatch(name, |graph| graph.set_int(name, value))
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        self.dispatch(name, |graph| graph.set_float(name, value))
    }

    /// `true` → fire trigger, `false` → reset trigger
    pub fn set_trigger(&mut self, name: &str, value: bool) -> bool {
        self.dispatch(name, |graph| {
            if value {
                graph.set_trigger(name);
            } else {
                graph.reset_trigger(name);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{GraphState, ParameterGraph, Probe};

    fn graph(params: &[&str]) -> (ParameterGraph, Probe<GraphState>) {
        let graph = ParameterGraph::new(params.iter().copied());
        let probe = graph.probe();
        (graph, probe)
    }

    #[test]
    fn test_signal_reaches_only_declaring_graphs() {
        let (body, body_probe) = graph(&["isMoving", "Dead", "reset"]);
        let (weapon, weapon_probe) = graph(&["reset", "swing"]);
        let mut signals = AnimationSignals::new(vec![Box::new(body), Box::new(weapon)]);

        assert_eq!(signals.graph_count(), 2);
        assert_eq!(signals.recognized_by("reset"), 2);

        assert!(signals.set_bool("reset", true));
        assert!(signals.set_bool("Dead", true));
        assert_eq!(body_probe.read().bools.get("reset"), Some(&true));
        assert_eq!(weapon_probe.read().bools.get("reset"), Some(&true));
        assert_eq!(weapon_probe.read().bools.get("Dead"), None);
    }

    #[test]
    fn test_missing_parameter_is_negative_lookup() {
        let (body, body_probe) = graph(&["isMoving"]);
        let mut signals = AnimationSignals::new(vec![Box::new(body)]);

        assert!(!signals.set_float("stun", 0.4));
        assert!(!signals.set_int("combo", 2));
        assert!(!signals.set_trigger("hop", true));
        assert!(body_probe.read().floats.is_empty());
    }

    #[test]
    fn test_trigger_set_and_reset() {
        let (body, body_probe) = graph(&["hop"]);
        let mut signals = AnimationSignals::new(vec![Box::new(body)]);

        assert!(signals.set_trigger("hop", true));
        assert_eq!(body_probe.read().triggers.get("hop"), Some(&true));

        assert!(signals.set_trigger("hop", false));
        assert_eq!(body_probe.read().triggers.get("hop"), Some(&false));
    }

    #[test]
    fn test_duplicate_parameter_dispatched_once() {
        let (body, body_probe) = graph(&["combo", "combo"]);
        let mut signals = AnimationSignals::new(vec![Box::new(body)]);

        assert_eq!(signals.recognized_by("combo"), 1);
        assert!(signals.set_int("combo", 3));
        assert_eq!(body_probe.read().writes, 1);
    }
}
