//! Read-only topology view consumed by the placement engine.
//!
//! A topology is a DAG of components, each owning an ordered list of
//! executors. The view resolves per-executor resource demands and
//! carries the per-worker heap cap that bounds executor co-location.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ComponentId, ExecutorId, TopologyId};

/// Whether a component produces data or processes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Source,
    Processor,
}

/// A named operator in the topology DAG.
///
/// Parent/child lists and the executor list keep their input order —
/// placement order is derived from them and must be reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub execs: Vec<ExecutorId>,
    pub parents: Vec<ComponentId>,
    pub children: Vec<ComponentId>,
}

impl Component {
    pub fn new(id: impl Into<ComponentId>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            execs: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_execs(mut self, execs: impl IntoIterator<Item = ExecutorId>) -> Self {
        self.execs = execs.into_iter().collect();
        self
    }

    pub fn with_parents<S: Into<ComponentId>>(
        mut self,
        parents: impl IntoIterator<Item = S>,
    ) -> Self {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children<S: Into<ComponentId>>(
        mut self,
        children: impl IntoIterator<Item = S>,
    ) -> Self {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-executor resource demand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaskResources {
    pub cpu: f64,
    pub mem: f64,
}

/// Immutable view over one topology's structure and resource demands.
///
/// Components keep their registration order: source seeding and the
/// placement ranks derive from it, so it is part of the deterministic
/// contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyDetails {
    id: TopologyId,
    components: Vec<Component>,
    component_index: BTreeMap<ComponentId, usize>,
    executor_to_component: BTreeMap<ExecutorId, ComponentId>,
    task_resources: BTreeMap<ExecutorId, TaskResources>,
    worker_max_heap: f64,
}

impl TopologyDetails {
    pub fn new(id: impl Into<TopologyId>, worker_max_heap: f64) -> Self {
        Self {
            id: id.into(),
            components: Vec::new(),
            component_index: BTreeMap::new(),
            executor_to_component: BTreeMap::new(),
            task_resources: BTreeMap::new(),
            worker_max_heap,
        }
    }

    /// Register a component and index its executors.
    ///
    /// Re-registering an id replaces the component in place, keeping
    /// its original position.
    pub fn add_component(&mut self, component: Component) {
        for exec in &component.execs {
            self.executor_to_component
                .insert(*exec, component.id.clone());
        }
        match self.component_index.get(&component.id) {
            Some(&i) => self.components[i] = component,
            None => {
                self.component_index
                    .insert(component.id.clone(), self.components.len());
                self.components.push(component);
            }
        }
    }

    /// Declare an executor's resource demand.
    ///
    /// Also how system tasks enter the view: they carry resources but
    /// belong to no component.
    pub fn set_task_resources(&mut self, exec: ExecutorId, cpu: f64, mem: f64) {
        self.task_resources.insert(exec, TaskResources { cpu, mem });
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Components in their registration order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.component_index.get(id).map(|&i| &self.components[i])
    }

    /// All executors of the topology, in id order.
    pub fn executors(&self) -> impl Iterator<Item = &ExecutorId> {
        self.task_resources.keys()
    }

    pub fn executor_count(&self) -> usize {
        self.task_resources.len()
    }

    pub fn component_of(&self, exec: &ExecutorId) -> Option<&ComponentId> {
        self.executor_to_component.get(exec)
    }

    /// CPU demand of one executor; `None` if the executor is unknown.
    pub fn total_cpu_req_task(&self, exec: &ExecutorId) -> Option<f64> {
        self.task_resources.get(exec).map(|r| r.cpu)
    }

    /// Memory demand of one executor; `None` if the executor is unknown.
    pub fn total_mem_req_task(&self, exec: &ExecutorId) -> Option<f64> {
        self.task_resources.get(exec).map(|r| r.mem)
    }

    /// Topology-wide cap on the total memory demand co-located in one
    /// worker slot.
    pub fn worker_max_heap_size(&self) -> f64 {
        self.worker_max_heap
    }
}
