use chime_infra::{
    ChimeContext, InMemoryCalendarWatchProvider, InMemoryEmailProvider, InMemorySmsProvider,
};
use std::sync::Arc;

pub struct TestApp {
    pub ctx: ChimeContext,
    pub email: Arc<InMemoryEmailProvider>,
    pub sms: Arc<InMemorySmsProvider>,
    pub calendar: Arc<InMemoryCalendarWatchProvider>,
}

/// Context wired with inmemory repositories and provider doubles, so
/// the full http surface can be exercised without external services.
pub fn test_app() -> TestApp {
    let mut ctx = ChimeContext::create_inmemory();
    let email = Arc::new(InMemoryEmailProvider::new());
    let sms = Arc::new(InMemorySmsProvider::new());
    let calendar = Arc::new(InMemoryCalendarWatchProvider::new());
    ctx.providers.email = email.clone();
    ctx.providers.sms = sms.clone();
    ctx.providers.calendar = calendar.clone();
    TestApp {
        ctx,
        email,
        sms,
        calendar,
    }
}
