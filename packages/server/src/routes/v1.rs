use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/journals", journal_routes(config))
}

fn journal_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::journal::create_journal,
            handlers::journal::list_journals
        ))
        .routes(routes!(handlers::journal::mood_calendar))
        .routes(routes!(
            handlers::journal::get_journal,
            handlers::journal::update_journal,
            handlers::journal::patch_journal,
            handlers::journal::delete_journal
        ))
        .layer(handlers::journal::body_limit(config.upload.max_file_size))
}
