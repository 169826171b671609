use std::collections::HashMap;

/// Opaque identifier the environment uses for one task.
pub type TaskKey = u32;

/// Progress a task keeps between executions, such as how far into a
/// target sequence the organism's outputs have matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub matched: usize,
    pub history: Vec<i32>,
    pub counter: u32,
}

/// Owned per-organism task state, emptied in bulk at every reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStates {
    states: HashMap<TaskKey, TaskState>,
}

impl TaskStates {
    pub fn get(&self, key: TaskKey) -> Option<&TaskState> {
        self.states.get(&key)
    }

    /// State for `key`, created empty on first access.
    pub fn entry(&mut self, key: TaskKey) -> &mut TaskState {
        self.states.entry(key).or_default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
