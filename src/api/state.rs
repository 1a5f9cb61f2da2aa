// src/api/state.rs
use crate::config::AppConfig;
use crate::query::QueryClient;
use crate::transport::HttpClassificationApi;
use crate::views::{EvaluationView, KeyboardHub, LabelingView};
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The screen the (single, local) user currently has open.
enum Screen {
    Closed,
    Evaluation(Arc<EvaluationView>),
    Labeling(Arc<LabelingView>),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: HttpClassificationApi,
    pub queries: QueryClient,
    pub keyboard: KeyboardHub,
    screen: Arc<Mutex<Screen>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let api = HttpClassificationApi::new(Client::new(), config.api_base.clone());
        Self {
            config: Arc::new(config),
            api,
            queries: QueryClient::new(),
            keyboard: KeyboardHub::new(),
            screen: Arc::new(Mutex::new(Screen::Closed)),
        }
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the evaluation screen, closing the labeling screen if it was open.
    pub fn evaluation_screen(&self) -> Arc<EvaluationView> {
        let mut screen = self.screen();
        if let Screen::Evaluation(view) = &*screen {
            return view.clone();
        }
        log::debug!("Entering evaluation screen");
        let view = Arc::new(EvaluationView::open(&self.queries, &self.api));
        *screen = Screen::Evaluation(view.clone());
        view
    }

    /// Open the labeling screen, closing the evaluation screen if it was open.
    pub fn labeling_screen(&self) -> Arc<LabelingView> {
        let mut screen = self.screen();
        if let Screen::Labeling(view) = &*screen {
            return view.clone();
        }
        log::debug!("Entering labeling screen");
        let view = Arc::new(LabelingView::open(
            &self.queries,
            &self.api,
            &self.keyboard,
            self.config.keys,
        ));
        *screen = Screen::Labeling(view.clone());
        view
    }

    pub fn open_labeling_screen(&self) -> Option<Arc<LabelingView>> {
        match &*self.screen() {
            Screen::Labeling(view) => Some(view.clone()),
            _ => None,
        }
    }
}
