//! The modifier graph: nodes, input bindings, and topological evaluation.
//!
//! A [`Graph`] owns a set of [`ModifierNode`]s and their ordered input
//! bindings. [`Graph::execute`] validates the topology, visits nodes in
//! dependency order, and lets each node read its inputs' already-computed
//! fields and store its own. Missing input data is a soft failure: the node
//! logs a warning and keeps its last-computed output, which cascades as
//! "no data" to downstream nodes.
use std::collections::HashMap;

use tracing::warn;

use crate::error::{Error, Result};
use crate::field::{HeightField, MaskField};
use crate::grid::GridDescriptor;
use crate::node::ModifierKind;
use crate::{combine, erosion, fault, fir, mask, noise, thermal};

/// Identifier of a node within one graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// One modifier node instance: kind/settings, input bindings, and the output
/// fields it exclusively owns.
#[derive(Clone, Debug)]
pub struct ModifierNode {
    id: NodeId,
    kind: ModifierKind,
    inputs: Vec<Option<NodeId>>,
    height: Option<HeightField>,
    mask: Option<MaskField>,
    size: Option<GridDescriptor>,
}

impl ModifierNode {
    fn new(id: NodeId, kind: ModifierKind) -> Self {
        let inputs = vec![None; kind.max_input_count()];
        Self {
            id,
            kind,
            inputs,
            height: None,
            mask: None,
            size: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &ModifierKind {
        &self.kind
    }

    pub fn inputs(&self) -> &[Option<NodeId>] {
        &self.inputs
    }

    /// Height field computed by the last execute, if any.
    pub fn height_data(&self) -> Option<&HeightField> {
        self.height.as_ref()
    }

    /// Mask field computed by the last execute, if any.
    pub fn mask_data(&self) -> Option<&MaskField> {
        self.mask.as_ref()
    }

    pub fn has_mask_data(&self) -> bool {
        self.mask.is_some()
    }

    /// Grid descriptor this node evaluated over, propagated from input 0;
    /// the Start node is the source of truth.
    pub fn size(&self) -> Option<&GridDescriptor> {
        self.size.as_ref()
    }
}

struct Computed {
    height: Option<HeightField>,
    mask: Option<MaskField>,
    size: Option<GridDescriptor>,
}

/// A DAG of modifier nodes evaluated in topological order.
#[derive(Default)]
pub struct Graph {
    nodes: HashMap<NodeId, ModifierNode>,
    next_id: u32,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node of the given kind with all input slots unbound.
    pub fn add(&mut self, kind: ModifierKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, ModifierNode::new(id, kind));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&ModifierNode> {
        self.nodes.get(&id)
    }

    /// Replace a node's kind/settings, resizing its input slots to the new
    /// arity. The node keeps its last-computed outputs until re-executed.
    pub fn update_kind(&mut self, id: NodeId, kind: ModifierKind) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(Error::UnknownNode { id: id.0 })?;
        node.inputs.resize(kind.max_input_count(), None);
        node.kind = kind;
        Ok(())
    }

    /// Bind `input` as producer for `node`'s given slot.
    pub fn bind(&mut self, node: NodeId, slot: usize, input: NodeId) -> Result<()> {
        if node == input {
            return Err(Error::Graph(format!(
                "node {} cannot consume its own output",
                node.0
            )));
        }
        let producer = self
            .nodes
            .get(&input)
            .ok_or(Error::UnknownNode { id: input.0 })?;
        if matches!(producer.kind, ModifierKind::Output) {
            return Err(Error::Graph(format!(
                "Output node {} cannot be used as an input",
                input.0
            )));
        }

        let consumer = self
            .nodes
            .get_mut(&node)
            .ok_or(Error::UnknownNode { id: node.0 })?;
        let arity = consumer.kind.max_input_count();
        if slot >= arity {
            return Err(Error::Graph(format!(
                "{} node {} has {} input slot(s), got slot {}",
                consumer.kind.name(),
                node.0,
                arity,
                slot
            )));
        }
        consumer.inputs[slot] = Some(input);
        Ok(())
    }

    /// Clear one input slot.
    pub fn unbind(&mut self, node: NodeId, slot: usize) -> Result<()> {
        let consumer = self
            .nodes
            .get_mut(&node)
            .ok_or(Error::UnknownNode { id: node.0 })?;
        if slot >= consumer.inputs.len() {
            return Err(Error::Graph(format!(
                "{} node {} has no input slot {}",
                consumer.kind.name(),
                node.0,
                slot
            )));
        }
        consumer.inputs[slot] = None;
        Ok(())
    }

    /// Remove a node and clear every binding that referenced it.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.nodes
            .remove(&id)
            .ok_or(Error::UnknownNode { id: id.0 })?;
        for node in self.nodes.values_mut() {
            for slot in &mut node.inputs {
                if *slot == Some(id) {
                    *slot = None;
                }
            }
        }
        Ok(())
    }

    /// Height field of a node's last execute.
    pub fn height_data(&self, id: NodeId) -> Option<&HeightField> {
        self.nodes.get(&id).and_then(|n| n.height.as_ref())
    }

    /// Mask field of a node's last execute.
    pub fn mask_data(&self, id: NodeId) -> Option<&MaskField> {
        self.nodes.get(&id).and_then(|n| n.mask.as_ref())
    }

    /// Grid descriptor of a node's last execute.
    pub fn size_of(&self, id: NodeId) -> Option<&GridDescriptor> {
        self.nodes.get(&id).and_then(|n| n.size.as_ref())
    }

    /// Execute every node in dependency order.
    ///
    /// Fails on structural errors (unknown bindings, cycles, missing or
    /// duplicated Start). Missing field data during evaluation is a soft
    /// failure per node, not an error.
    pub fn execute(&mut self) -> Result<()> {
        let starts = self
            .nodes
            .values()
            .filter(|n| matches!(n.kind, ModifierKind::Start(_)))
            .count();
        if starts != 1 {
            return Err(Error::Graph(format!(
                "graph must contain exactly one Start node, found {starts}"
            )));
        }

        for id in self.topo_order()? {
            self.execute_node(id);
        }
        Ok(())
    }

    fn topo_order(&self) -> Result<Vec<NodeId>> {
        let mut indeg: HashMap<NodeId, usize> = HashMap::new();
        let mut dependents: HashMap<NodeId, HashMap<NodeId, usize>> = HashMap::new();

        for (&id, node) in &self.nodes {
            let bound: Vec<NodeId> = node.inputs.iter().copied().flatten().collect();
            for &input in &bound {
                if !self.nodes.contains_key(&input) {
                    return Err(Error::UnknownNode { id: input.0 });
                }
                dependents
                    .entry(input)
                    .or_default()
                    .entry(id)
                    .and_modify(|count| *count += 1)
                    .or_insert(1);
            }
            indeg.insert(id, bound.len());
        }

        let mut queue: Vec<NodeId> = indeg
            .iter()
            .filter_map(|(&id, &deg)| if deg == 0 { Some(id) } else { None })
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop() {
            order.push(id);
            if let Some(children) = dependents.get(&id) {
                for (&child, &count) in children {
                    if let Some(deg) = indeg.get_mut(&child) {
                        *deg = deg.saturating_sub(count);
                        if *deg == 0 {
                            queue.push(child);
                        }
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(Error::Graph("cycle detected in modifier graph".into()));
        }
        Ok(order)
    }

    fn execute_node(&mut self, id: NodeId) {
        let Some(computed) = self.compute(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.height = computed.height;
            node.mask = computed.mask;
            node.size = computed.size;
        }
    }

    fn input_node(&self, node: &ModifierNode, slot: usize) -> Option<&ModifierNode> {
        let id = node.inputs.get(slot).copied().flatten()?;
        self.nodes.get(&id)
    }

    fn required_height(&self, node: &ModifierNode, slot: usize) -> Option<&HeightField> {
        let data = self.input_node(node, slot).and_then(|n| n.height.as_ref());
        if data.is_none() {
            warn!(
                "{} node {} has no height data on input {}.",
                node.kind.name(),
                node.id.0,
                slot
            );
        }
        data
    }

    fn required_mask(&self, node: &ModifierNode, slot: usize) -> Option<&MaskField> {
        let data = self.input_node(node, slot).and_then(|n| n.mask.as_ref());
        if data.is_none() {
            warn!(
                "{} node {} has no mask data on input {}.",
                node.kind.name(),
                node.id.0,
                slot
            );
        }
        data
    }

    fn required_size(&self, node: &ModifierNode, slot: usize) -> Option<GridDescriptor> {
        let size = self
            .input_node(node, slot)
            .and_then(|n| n.size.as_ref())
            .cloned();
        if size.is_none() {
            warn!(
                "{} node {} has no grid descriptor on input {}.",
                node.kind.name(),
                node.id.0,
                slot
            );
        }
        size
    }

    /// Compute a node's outputs from its inputs. `None` means soft failure:
    /// the node's buffers stay as last computed.
    fn compute(&self, id: NodeId) -> Option<Computed> {
        let node = self.nodes.get(&id)?;

        match &node.kind {
            ModifierKind::Start(settings) => Some(Computed {
                height: Some(HeightField::new(settings.grid.resolution)),
                mask: None,
                size: Some(settings.grid.clone()),
            }),
            ModifierKind::HeightMap(settings) => {
                let input = self.required_height(node, 0)?;
                let size = self.required_size(node, 0)?;
                if settings.map.len() != settings.map_resolution * settings.map_resolution {
                    warn!(
                        "HeightMap node {} stores {} values for resolution {}.",
                        node.id.0,
                        settings.map.len(),
                        settings.map_resolution
                    );
                    return None;
                }
                let stored =
                    HeightField::from_data(settings.map_resolution, settings.map.clone());
                Some(Computed {
                    height: Some(mask::height_map_apply(input, &stored, settings.mode)),
                    mask: None,
                    size: Some(size),
                })
            }
            ModifierKind::Noise(settings) => {
                let input = self.required_height(node, 0)?;
                let size = self.required_size(node, 0)?;
                Some(Computed {
                    height: Some(noise::apply(input, &size, settings)),
                    mask: None,
                    size: Some(size),
                })
            }
            ModifierKind::Fault(settings) => {
                let size = self.required_size(node, 0)?;
                Some(Computed {
                    height: Some(fault::generate(&size, settings)),
                    mask: None,
                    size: Some(size),
                })
            }
            ModifierKind::Combine(settings) => {
                let a = self.input_node(node, 0).and_then(|n| n.height.as_ref());
                let b = self.input_node(node, 1).and_then(|n| n.height.as_ref());
                let size = self
                    .input_node(node, 0)
                    .or_else(|| self.input_node(node, 1))
                    .and_then(|n| n.size.as_ref())
                    .cloned();
                let height = match (a, b) {
                    (Some(a), Some(b)) => combine::combine(a, b, settings),
                    // With one bound input the node passes it through.
                    (Some(single), None) | (None, Some(single)) => single.clone(),
                    (None, None) => {
                        warn!("Combine node {} has no height inputs.", node.id.0);
                        return None;
                    }
                };
                Some(Computed {
                    height: Some(height),
                    mask: None,
                    size,
                })
            }
            ModifierKind::FirFilter(settings) => {
                let input = self.required_height(node, 0)?;
                Some(Computed {
                    height: Some(fir::smooth(input, settings.blend)),
                    mask: None,
                    size: self.input_node(node, 0).and_then(|n| n.size.clone()),
                })
            }
            ModifierKind::Erosion(settings) => {
                let input = self.required_height(node, 0)?;
                Some(Computed {
                    height: Some(erosion::erode(input, settings)),
                    mask: None,
                    size: self.input_node(node, 0).and_then(|n| n.size.clone()),
                })
            }
            ModifierKind::ThermalErosion(settings) => {
                let input = self.required_height(node, 0)?;
                Some(Computed {
                    height: Some(thermal::erode(input, settings)),
                    mask: None,
                    size: self.input_node(node, 0).and_then(|n| n.size.clone()),
                })
            }
            ModifierKind::Height(settings) => {
                let input = self.required_height(node, 0)?;
                Some(Computed {
                    height: None,
                    mask: Some(mask::height_select(input, settings)),
                    size: self.input_node(node, 0).and_then(|n| n.size.clone()),
                })
            }
            ModifierKind::Slope(settings) => {
                let input = self.required_height(node, 0)?;
                let size = self.required_size(node, 0)?;
                Some(Computed {
                    height: None,
                    mask: Some(mask::slope_select(input, &size, settings)),
                    size: Some(size),
                })
            }
            ModifierKind::ColorGradient(settings) => {
                let input = self.required_mask(node, 0)?;
                Some(Computed {
                    height: None,
                    mask: Some(settings.gradient.map(input)),
                    size: self.input_node(node, 0).and_then(|n| n.size.clone()),
                })
            }
            ModifierKind::Rgba => {
                let channel = |slot: usize| {
                    self.input_node(node, slot).and_then(|n| n.mask.as_ref())
                };
                let mixed =
                    mask::rgba_mix([channel(0), channel(1), channel(2), channel(3)]);
                let Some(mixed) = mixed else {
                    warn!("RGBA node {} has no mask inputs.", node.id.0);
                    return None;
                };
                Some(Computed {
                    height: None,
                    mask: Some(mixed),
                    size: self.input_node(node, 0).and_then(|n| n.size.clone()),
                })
            }
            ModifierKind::WeightMap(settings) => {
                // The stored map is this node's mask output at its own
                // resolution; the height output is the upstream field with
                // the resampled map combined in.
                let height = self
                    .input_node(node, 0)
                    .and_then(|n| n.height.as_ref())
                    .map(|h| mask::weight_map_apply(h, &settings.map, settings.mode));
                Some(Computed {
                    height,
                    mask: Some(settings.map.clone()),
                    size: self.input_node(node, 0).and_then(|n| n.size.clone()),
                })
            }
            ModifierKind::Output => {
                let Some(input) = self.input_node(node, 0) else {
                    warn!("Output node {} has no input bound.", node.id.0);
                    return None;
                };
                Some(Computed {
                    height: input.height.clone(),
                    mask: input.mask.clone(),
                    size: input.size.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{CombineMode, ErosionSettings, HeightMaskSettings, HeightMode, ModifierKind};
    use glam::Vec3;

    fn start_kind(resolution: usize) -> ModifierKind {
        ModifierKind::start(
            GridDescriptor::new(resolution, 10.0, 10.0, 10.0, Vec3::ZERO).unwrap(),
        )
    }

    #[test]
    fn start_produces_zero_field() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(4));
        graph.execute().unwrap();

        let height = graph.height_data(start).unwrap();
        assert_eq!(height.resolution(), 4);
        assert!(height.data().iter().all(|v| *v == 0.0));
        assert_eq!(graph.size_of(start).unwrap().resolution, 4);
    }

    #[test]
    fn flat_scenario_stays_flat_through_combine_and_fir() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(4));
        let map = graph.add(ModifierKind::height_map(
            4,
            vec![0.0; 16],
            HeightMode::Set,
        ));
        let other = graph.add(ModifierKind::combine(CombineMode::Add, 0.0));
        let fir = graph.add(ModifierKind::fir_filter(0.5));

        graph.bind(map, 0, start).unwrap();
        graph.bind(other, 0, map).unwrap();
        graph.bind(other, 1, map).unwrap();
        graph.bind(fir, 0, other).unwrap();
        graph.execute().unwrap();

        let combined = graph.height_data(other).unwrap();
        assert_eq!(combined.resolution(), 4);
        assert!(combined.data().iter().all(|v| *v == 0.0));

        let smoothed = graph.height_data(fir).unwrap();
        assert!(smoothed.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn execute_requires_exactly_one_start() {
        let mut graph = Graph::new();
        graph.add(ModifierKind::fir_filter(0.5));
        assert!(graph.execute().is_err());

        let mut graph = Graph::new();
        graph.add(start_kind(4));
        graph.add(start_kind(4));
        assert!(graph.execute().is_err());
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = Graph::new();
        graph.add(start_kind(4));
        let a = graph.add(ModifierKind::fir_filter(0.0));
        let b = graph.add(ModifierKind::fir_filter(0.0));
        graph.bind(a, 0, b).unwrap();
        graph.bind(b, 0, a).unwrap();
        assert!(matches!(graph.execute(), Err(Error::Graph(_))));
    }

    #[test]
    fn bind_validates_slots_and_sinks() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(4));
        let fir = graph.add(ModifierKind::fir_filter(0.0));
        let output = graph.add(ModifierKind::Output);

        assert!(graph.bind(fir, 1, start).is_err());
        assert!(graph.bind(fir, 0, fir).is_err());
        assert!(graph.bind(fir, 0, output).is_err());
        assert!(graph.bind(fir, 0, start).is_ok());
    }

    #[test]
    fn missing_input_is_a_soft_failure() {
        let mut graph = Graph::new();
        graph.add(start_kind(4));
        let erosion = graph.add(ModifierKind::Erosion(ErosionSettings::default()));
        graph.execute().unwrap();
        assert!(graph.height_data(erosion).is_none());
    }

    #[test]
    fn soft_failure_cascades_downstream() {
        let mut graph = Graph::new();
        graph.add(start_kind(4));
        let height = graph.add(ModifierKind::Height(HeightMaskSettings::default()));
        let output = graph.add(ModifierKind::Output);
        graph.bind(output, 0, height).unwrap();
        graph.execute().unwrap();

        assert!(graph.mask_data(height).is_none());
        assert!(graph.mask_data(output).is_none());
    }

    #[test]
    fn combine_passes_single_input_through() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(4));
        let map = graph.add(ModifierKind::height_map(
            2,
            vec![1.0, 1.0, 1.0, 1.0],
            HeightMode::Set,
        ));
        let combine = graph.add(ModifierKind::combine(CombineMode::Blend, 0.9));
        graph.bind(map, 0, start).unwrap();
        graph.bind(combine, 0, map).unwrap();
        graph.execute().unwrap();

        assert_eq!(graph.height_data(combine), graph.height_data(map));
    }

    #[test]
    fn output_clones_upstream_fields() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(4));
        let height = graph.add(ModifierKind::Height(HeightMaskSettings::default()));
        let output = graph.add(ModifierKind::Output);
        graph.bind(height, 0, start).unwrap();
        graph.bind(output, 0, height).unwrap();
        graph.execute().unwrap();

        assert!(graph.node(output).unwrap().has_mask_data());
        assert_eq!(graph.mask_data(output), graph.mask_data(height));
    }

    #[test]
    fn remove_clears_dangling_bindings() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(4));
        let fir = graph.add(ModifierKind::fir_filter(0.0));
        graph.bind(fir, 0, start).unwrap();
        graph.remove(start).unwrap();
        assert_eq!(graph.node(fir).unwrap().inputs(), &[None]);
    }

    #[test]
    fn update_kind_resizes_input_slots() {
        let mut graph = Graph::new();
        let node = graph.add(ModifierKind::combine(CombineMode::Add, 0.0));
        assert_eq!(graph.node(node).unwrap().inputs().len(), 2);
        graph
            .update_kind(node, ModifierKind::fir_filter(0.0))
            .unwrap();
        assert_eq!(graph.node(node).unwrap().inputs().len(), 1);
    }

    #[test]
    fn weight_map_mask_keeps_stored_resolution() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(4));
        let weight = graph.add(ModifierKind::weight_map(
            crate::field::MaskField::new(8),
            HeightMode::Multiply,
        ));
        graph.bind(weight, 0, start).unwrap();
        graph.execute().unwrap();

        assert_eq!(graph.mask_data(weight).unwrap().resolution(), 8);
        let height = graph.height_data(weight).unwrap();
        assert_eq!(height.resolution(), 4);
        assert!(height.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn reexecution_is_stable_for_seeded_nodes() {
        let mut graph = Graph::new();
        let start = graph.add(start_kind(8));
        let fault = graph.add(ModifierKind::Fault(crate::node::FaultSettings {
            seed: 3,
            iterations: 8,
            falloff: 5.0,
            mode: crate::node::FaultMode::Step,
        }));
        graph.bind(fault, 0, start).unwrap();

        graph.execute().unwrap();
        let first = graph.height_data(fault).unwrap().clone();
        graph.execute().unwrap();
        let second = graph.height_data(fault).unwrap().clone();
        assert_eq!(first, second);
    }
}
