use std::sync::Arc;

use crate::config::Settings;
use crate::mail::{MailDispatcher, MailTransport};
use crate::template::TemplateStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub template_store: Arc<TemplateStore>,
    pub dispatcher: Arc<MailDispatcher>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        template_store: Arc<TemplateStore>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let dispatcher = Arc::new(MailDispatcher::new(template_store.clone(), transport));

        Self {
            settings: Arc::new(settings),
            template_store,
            dispatcher,
        }
    }
}
