use std::sync::Arc;

use crate::config::AppConfig;
use crate::decoder::StreamDecoder;
use crate::journal::JournalLifecycle;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub lifecycle: Arc<JournalLifecycle>,
    pub decoder: StreamDecoder,
}

impl AppState {
    pub fn new(config: AppConfig, lifecycle: JournalLifecycle) -> Self {
        let decoder = StreamDecoder::new(config.upload.max_file_size);
        Self {
            config,
            lifecycle: Arc::new(lifecycle),
            decoder,
        }
    }
}
