use crate::models::SelectionState;
use crate::ui::Page;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handles to the page model and the user's selection.
///
/// Lock order is selection before page.
#[derive(Clone)]
pub struct AppState {
    pub selection: Arc<Mutex<SelectionState>>,
    pub page: Arc<Mutex<Page>>,
}

impl AppState {
    pub fn new(selection: SelectionState) -> Self {
        let mut page = Page::default();
        page.apply_selection(selection);
        Self {
            selection: Arc::new(Mutex::new(selection)),
            page: Arc::new(Mutex::new(page)),
        }
    }

    pub async fn snapshot(&self) -> Page {
        self.page.lock().await.clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SelectionState::default())
    }
}
