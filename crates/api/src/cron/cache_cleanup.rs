use super::validate_cron_request;
use crate::error::ChimeError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use chime_api_structs::cleanup_calendar_cache::APIResponse;
use chime_infra::{ChimeContext, DeleteResult};

pub async fn cleanup_calendar_cache_controller(
    http_req: HttpRequest,
    ctx: web::Data<ChimeContext>,
) -> Result<HttpResponse, ChimeError> {
    validate_cron_request(&http_req, &ctx)?;

    let usecase = CleanupCalendarCacheUseCase {};
    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                deleted: res.deleted_count,
            })
        })
        .map_err(ChimeError::from)
}

/// Drops calendar cache entries that are past their expiry.
#[derive(Debug)]
pub struct CleanupCalendarCacheUseCase {}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for ChimeError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CleanupCalendarCacheUseCase {
    type Response = DeleteResult;

    type Error = UseCaseError;

    const NAME: &'static str = "CleanupCalendarCache";

    async fn execute(&mut self, ctx: &ChimeContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        Ok(ctx.repos.calendar_cache.delete_all_expired(now).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_domain::CalendarCacheEntry;
    use chime_infra::ISys;
    use std::sync::Arc;

    struct StaticTimeSys;
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            1_700_000_000_000
        }
    }

    #[actix_web::test]
    async fn deletes_only_expired_entries() {
        let mut ctx = ChimeContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys {});
        let now = ctx.sys.get_timestamp_millis();

        let expired = CalendarCacheEntry {
            id: Default::default(),
            key: "user-1:google_calendar:primary".into(),
            value: serde_json::json!({ "busy": [] }),
            expires_at: now - 1,
        };
        let fresh = CalendarCacheEntry {
            id: Default::default(),
            key: "user-2:google_calendar:primary".into(),
            value: serde_json::json!({ "busy": [] }),
            expires_at: now + 1000,
        };
        ctx.repos.calendar_cache.insert(&expired).await.unwrap();
        ctx.repos.calendar_cache.insert(&fresh).await.unwrap();

        let res = execute(CleanupCalendarCacheUseCase {}, &ctx).await.unwrap();
        assert_eq!(res.deleted_count, 1);

        let res = execute(CleanupCalendarCacheUseCase {}, &ctx).await.unwrap();
        assert_eq!(res.deleted_count, 0);
    }
}
