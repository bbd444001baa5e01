use super::cancel_booking::CancelBookingUseCase;
use super::create_booking::{CreateBookingUseCase, CreatedBooking};
use crate::shared::usecase::{execute, Subscriber};
use crate::workflow::schedule_mandatory_reminder::ScheduleMandatoryReminderUseCase;
use crate::workflow::schedule_reminders::{BookingLifecycle, ScheduleWorkflowRemindersUseCase};
use chime_domain::Booking;
use chime_infra::ChimeContext;

pub struct ScheduleRemindersOnBookingCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateBookingUseCase> for ScheduleRemindersOnBookingCreated {
    async fn notify(&self, e: &CreatedBooking, ctx: &ChimeContext) {
        let usecase = ScheduleWorkflowRemindersUseCase {
            booking: e.booking.clone(),
            lifecycle: BookingLifecycle::Created,
            workflows_locked_for_user: e.workflows_locked_for_user,
        };
        let _ = execute(usecase, ctx).await;
    }
}

pub struct ScheduleMandatoryReminderOnBookingCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateBookingUseCase> for ScheduleMandatoryReminderOnBookingCreated {
    async fn notify(&self, e: &CreatedBooking, ctx: &ChimeContext) {
        let usecase = ScheduleMandatoryReminderUseCase {
            booking: e.booking.clone(),
            workflows_locked_for_user: e.workflows_locked_for_user,
        };
        let _ = execute(usecase, ctx).await;
    }
}

pub struct ScheduleRemindersOnBookingCancelled;

#[async_trait::async_trait(?Send)]
impl Subscriber<CancelBookingUseCase> for ScheduleRemindersOnBookingCancelled {
    async fn notify(&self, booking: &Booking, ctx: &ChimeContext) {
        let usecase = ScheduleWorkflowRemindersUseCase {
            booking: booking.clone(),
            lifecycle: BookingLifecycle::Cancelled,
            workflows_locked_for_user: true,
        };
        let _ = execute(usecase, ctx).await;
    }
}
