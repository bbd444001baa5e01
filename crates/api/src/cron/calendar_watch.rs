use super::validate_cron_request;
use crate::error::ChimeError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use chime_api_structs::sync_calendar_watches::{APIResponse, BatchOutcome};
use chime_domain::SelectedCalendar;
use chime_infra::ChimeContext;
use chrono::{TimeZone, Utc};
use futures::future::join_all;
use tracing::{error, info};

pub async fn sync_calendar_watches_controller(
    http_req: HttpRequest,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    validate_cron_request(&http_req, &ctx)?;

    let usecase = SyncCalendarWatchesUseCase {};
    execute(usecase, &ctx)
        .await
        .map(|report| {
            HttpResponse::Ok().json(APIResponse {
                succeeded_at: Utc
                    .timestamp_millis(ctx.sys.get_timestamp_millis())
                    .to_rfc3339(),
                watched: BatchOutcome {
                    successful: report.watched.successful,
                    failed: report.watched.failed,
                },
                unwatched: BatchOutcome {
                    successful: report.unwatched.successful,
                    failed: report.unwatched.failed,
                },
            })
        })
        .map_err(ChimeError::from)
}

/// Activates and renews calendar watch subscriptions.
#[derive(Debug)]
pub struct SyncCalendarWatchesUseCase {}

#[derive(Debug, Default, PartialEq)]
pub struct BatchReport {
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, PartialEq)]
pub struct CalendarWatchReport {
    pub watched: BatchReport,
    pub unwatched: BatchReport,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

async fn watch_calendar(
    mut calendar: SelectedCalendar,
    ctx: &ChimeContext,
) -> anyhow::Result<()> {
    let channel = ctx.providers.calendar.watch(&calendar).await?;
    calendar.channel_id = Some(channel.channel_id);
    calendar.channel_expiration = Some(channel.expiration);
    ctx.repos.selected_calendars.save(&calendar).await
}

async fn unwatch_calendar(
    mut calendar: SelectedCalendar,
    ctx: &ChimeContext,
) -> anyhow::Result<()> {
    ctx.providers.calendar.unwatch(&calendar).await?;
    calendar.channel_id = None;
    calendar.channel_expiration = None;
    ctx.repos.selected_calendars.save(&calendar).await
}

fn summarize(results: Vec<anyhow::Result<()>>) -> BatchReport {
    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(_) => report.successful += 1,
            Err(e) => {
                error!("Calendar watch transition failed: {:?}", e);
                report.failed += 1;
            }
        }
    }
    report
}

async fn handle_calendars_to_watch(ctx: &ChimeContext) -> BatchReport {
    let now = ctx.sys.get_timestamp_millis();
    let calendars = ctx.repos.selected_calendars.get_next_batch_to_watch(now).await;
    summarize(
        join_all(
            calendars
                .into_iter()
                .map(|calendar| watch_calendar(calendar, ctx)),
        )
        .await,
    )
}

async fn handle_calendars_to_unwatch(ctx: &ChimeContext) -> BatchReport {
    let calendars = ctx.repos.selected_calendars.get_next_batch_to_unwatch().await;
    summarize(
        join_all(
            calendars
                .into_iter()
                .map(|calendar| unwatch_calendar(calendar, ctx)),
        )
        .await,
    )
}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncCalendarWatchesUseCase {
    type Response = CalendarWatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncCalendarWatches";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        info!("Running calendar watch job");

        // Invariant: the watch phase must fully complete before the
        // unwatch phase starts. Re-watching a calendar whose webhook is
        // about to expire discards the old webhook while establishing
        // the new one, and interleaving the two phases reintroduces the
        // double-webhook race on calendars transitioning state.
        let watched = handle_calendars_to_watch(ctx).await;
        let unwatched = handle_calendars_to_unwatch(ctx).await;

        // Failed transitions are not retried here. Any calendar still
        // outside the healthy window is re-selected on the next tick.
        Ok(CalendarWatchReport { watched, unwatched })
    }
}
