use sbp_core::{BlueprintStep, Edge, Role, Segment};

pub(crate) struct StepBuilder {
    step: BlueprintStep,
}

impl StepBuilder {
    pub(crate) fn new(step: &str) -> Self {
        Self {
            step: BlueprintStep::empty(step.trim()),
        }
    }

    pub(crate) fn segment_count(&self) -> usize {
        self.step.segments.len()
    }

    pub(crate) fn push_segment(&mut self, role: Role, action: &str) -> usize {
        self.push_slot(Some(role), action)
    }

    /// Append a segment whose role may be missing (legacy padding).
    pub(crate) fn push_slot(&mut self, role: Option<Role>, action: &str) -> usize {
        let index = self.step.segments.len();
        self.step.segments.push(Segment {
            role,
            action: action.trim().to_string(),
        });
        index
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) {
        debug_assert!(edge.from != edge.to, "self-loop edge {edge:?}");
        self.step.edges.push(edge);
    }

    /// Link every adjacent pair of segments pushed so far.
    pub(crate) fn link_linear_chain(&mut self) {
        for from in 1..self.segment_count() {
            self.push_edge(Edge::linear(from - 1, from));
        }
    }

    pub(crate) fn finish(self) -> BlueprintStep {
        self.step
    }
}
