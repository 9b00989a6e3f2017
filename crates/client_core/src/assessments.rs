use shared::domain::{Assessment, AssessmentId};

/// Most-recent-first collection of assessments plus the current selection.
///
/// Selection is tracked by id and repaired whenever the collection is
/// replaced, so it always names a current member.
#[derive(Debug, Clone, Default)]
pub struct AssessmentStore {
    items: Vec<Assessment>,
    selected: Option<AssessmentId>,
}

impl AssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, items: Vec<Assessment>) {
        self.selected = items.first().map(|item| item.id);
        self.items = items;
    }

    pub fn prepend_and_select(&mut self, item: Assessment) {
        self.selected = Some(item.id);
        self.items.insert(0, item);
    }

    /// Returns `false` and leaves the selection alone when `id` is not a member.
    pub fn select(&mut self, id: AssessmentId) -> bool {
        if self.items.iter().any(|item| item.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn items(&self) -> &[Assessment] {
        &self.items
    }

    pub fn selected(&self) -> Option<&Assessment> {
        let id = self.selected?;
        self.items.iter().find(|item| item.id == id)
    }

    pub fn selected_id(&self) -> Option<AssessmentId> {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
