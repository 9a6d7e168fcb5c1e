use crate::descriptor::Descriptor;

/// One unit of a [`Chain`].
#[derive(Debug, Clone)]
pub enum Stage {
    Single(Descriptor),
    /// Consecutive non-blocking descriptors, run concurrently.
    Batch(Vec<Descriptor>),
}

impl Stage {
    pub fn descriptors(&self) -> &[Descriptor] {
        match self {
            Self::Single(d) => std::slice::from_ref(d),
            Self::Batch(ds) => ds,
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    pub fn len(&self) -> usize {
        self.descriptors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors().is_empty()
    }

    pub fn component_ids(&self) -> Vec<String> {
        self.descriptors()
            .iter()
            .map(|d| d.component_id().to_string())
            .collect()
    }
}

/// Ordered preload plan for one navigation. Never contains two adjacent
/// `Batch` stages.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    stages: Vec<Stage>,
}

impl Chain {
    /// Group descriptors into stages.
    ///
    /// # Algorithm
    ///
    /// 1. Non-blocking descriptors accumulate in a pending buffer
    /// 2. A blocking descriptor flushes the buffer as a `Batch`, then becomes a `Single`
    /// 3. Whatever remains in the buffer is flushed as the final `Batch`
    ///
    /// `[A, b, c, D]` (lowercase = non-blocking) → `[Single(A), Batch(b, c), Single(D)]`.
    pub fn build(descriptors: Vec<Descriptor>) -> Self {
        let mut stages = Vec::new();
        let mut pending: Vec<Descriptor> = Vec::new();

        for descriptor in descriptors {
            if !descriptor.is_blocking() {
                pending.push(descriptor);
                continue;
            }

            if !pending.is_empty() {
                stages.push(Stage::Batch(std::mem::take(&mut pending)));
            }
            stages.push(Stage::Single(descriptor));
        }

        if !pending.is_empty() {
            stages.push(Stage::Batch(pending));
        }

        Self { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }

    pub fn task_count(&self) -> usize {
        self.stages.iter().map(Stage::len).sum()
    }

    /// Component ids per stage (for logging and plan output).
    pub fn layout(&self) -> Vec<Vec<String>> {
        self.stages.iter().map(Stage::component_ids).collect()
    }
}
