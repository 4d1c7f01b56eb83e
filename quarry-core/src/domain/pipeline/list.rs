// quarry-core/src/domain/pipeline/list.rs

use serde::Deserialize;
use std::collections::HashMap;

use super::stage::{Direction, Stage, StageField, StageId};
use super::validator::ExecutionScope;

/// Stage as written in a pipeline definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct StageDefinition {
    #[serde(default)]
    pub name: Option<String>,
    pub query: String,
    #[serde(default)]
    pub selected: bool,
}

/// Ordered, never-empty list of pipeline stages.
///
/// Stages live in a slot map keyed by [`StageId`]; `order` carries the execution
/// order. Ids come from a counter that only grows, so a removed id is never
/// handed out again and references survive reordering.
#[derive(Debug, Clone)]
pub struct PipelineList {
    slots: HashMap<StageId, Stage>,
    order: Vec<StageId>,
    next_id: u64,
}

impl Default for PipelineList {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineList {
    /// A list holding a single, selected "Stage 1".
    pub fn new() -> Self {
        let mut list = Self::empty();
        let id = list.add_stage();
        list.update_stage(id, StageField::Selected(true));
        list
    }

    fn empty() -> Self {
        Self {
            slots: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Builds a list from file definitions. An empty definition list yields [`PipelineList::new`].
    pub fn from_definitions(definitions: Vec<StageDefinition>) -> Self {
        if definitions.is_empty() {
            return Self::new();
        }

        let mut list = Self::empty();
        for def in definitions {
            let id = list.add_stage();
            if let Some(name) = def.name {
                list.update_stage(id, StageField::Name(name));
            }
            list.update_stage(id, StageField::Query(def.query));
            list.update_stage(id, StageField::Selected(def.selected));
        }
        list
    }

    /// Appends an unselected stage named after its id.
    pub fn add_stage(&mut self) -> StageId {
        let id = StageId::new(self.next_id);
        self.next_id += 1;
        self.slots.insert(id, Stage::new(id));
        self.order.push(id);
        id
    }

    /// Removes a stage. Returns false (and changes nothing) for an unknown id or
    /// when it is the last remaining stage.
    pub fn remove_stage(&mut self, id: StageId) -> bool {
        if self.order.len() <= 1 || !self.slots.contains_key(&id) {
            return false;
        }
        self.slots.remove(&id);
        self.order.retain(|existing| *existing != id);
        true
    }

    /// Replaces one field of a stage. Unknown ids are ignored.
    pub fn update_stage(&mut self, id: StageId, field: StageField) -> bool {
        match self.slots.get_mut(&id) {
            Some(stage) => {
                stage.apply(field);
                true
            }
            None => false,
        }
    }

    /// Swaps a stage with its neighbour. No-op at either boundary.
    pub fn move_stage(&mut self, id: StageId, direction: Direction) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let target = match direction {
            Direction::Up if idx > 0 => idx - 1,
            Direction::Down if idx + 1 < self.order.len() => idx + 1,
            _ => return false,
        };
        self.order.swap(idx, target);
        true
    }

    pub fn get(&self, id: StageId) -> Option<&Stage> {
        self.slots.get(&id)
    }

    pub fn position(&self, id: StageId) -> Option<usize> {
        self.order.iter().position(|existing| *existing == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Stages in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.order.iter().filter_map(|id| self.slots.get(id))
    }

    pub fn ids(&self) -> Vec<StageId> {
        self.order.clone()
    }

    /// The stages an execution covers, in list order.
    pub fn in_scope(&self, scope: ExecutionScope) -> Vec<&Stage> {
        self.iter()
            .filter(|stage| match scope {
                ExecutionScope::All => true,
                ExecutionScope::Selected => stage.selected,
            })
            .collect()
    }
}
