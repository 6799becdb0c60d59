pub mod cache;
pub mod error;
pub mod models;
pub mod routes;
pub mod source_fetch;
pub mod timetable_pipeline;

use worker::{Context, Env, Request, Response, Result, ScheduleContext, ScheduledEvent, event};

#[event(fetch)]
async fn fetch(req: Request, env: Env, ctx: Context) -> Result<Response> {
    routes::handle(req, env, ctx).await
}

#[event(scheduled)]
async fn scheduled(_event: ScheduledEvent, env: Env, _ctx: ScheduleContext) {
    let sources = routes::campus_sources_from_env(&env);

    if let Err(error) = timetable_pipeline::sync_all_campuses(&sources).await {
        worker::console_error!("scheduled timetable sync failed: {error}");
    }
}
