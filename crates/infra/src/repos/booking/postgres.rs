use super::IBookingRepo;

use chime_domain::{Booking, BookingStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::str::FromStr;
use tracing::error;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BookingRaw {
    booking_uid: Uuid,
    event_type_id: Option<i64>,
    user_uid: Uuid,
    host_email: String,
    host_name: String,
    team_uid: Option<Uuid>,
    org_uid: Option<Uuid>,
    title: String,
    start_ts: i64,
    end_ts: i64,
    attendees: serde_json::Value,
    status: String,
    created: i64,
    updated: i64,
}

impl Into<Booking> for BookingRaw {
    fn into(self) -> Booking {
        Booking {
            id: ID::from(self.booking_uid),
            event_type_id: self.event_type_id,
            user_id: ID::from(self.user_uid),
            host_email: self.host_email,
            host_name: self.host_name,
            team_id: self.team_uid.map(ID::from),
            org_id: self.org_uid.map(ID::from),
            title: self.title,
            start_ts: self.start_ts,
            end_ts: self.end_ts,
            attendees: serde_json::from_value(self.attendees).unwrap_or_default(),
            status: BookingStatus::from_str(&self.status).unwrap_or(BookingStatus::Confirmed),
            created: self.created,
            updated: self.updated,
        }
    }
}

#[async_trait::async_trait]
impl IBookingRepo for PostgresBookingRepo {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings
            (booking_uid, event_type_id, user_uid, host_email, host_name, team_uid, org_uid, title, start_ts, end_ts, attendees, status, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(booking.id.inner_ref())
        .bind(booking.event_type_id)
        .bind(booking.user_id.inner_ref())
        .bind(&booking.host_email)
        .bind(&booking.host_name)
        .bind(booking.team_id.as_ref().map(|id| *id.inner_ref()))
        .bind(booking.org_id.as_ref().map(|id| *id.inner_ref()))
        .bind(&booking.title)
        .bind(booking.start_ts)
        .bind(booking.end_ts)
        .bind(serde_json::to_value(&booking.attendees)?)
        .bind(booking.status.as_str())
        .bind(booking.created)
        .bind(booking.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, booking: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE bookings SET
                start_ts = $2,
                end_ts = $3,
                attendees = $4,
                status = $5,
                updated = $6
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking.id.inner_ref())
        .bind(booking.start_ts)
        .bind(booking.end_ts)
        .bind(serde_json::to_value(&booking.attendees)?)
        .bind(booking.status.as_str())
        .bind(booking.updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, booking_id: &ID) -> Option<Booking> {
        sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT * FROM bookings
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find booking {}. DB error: {:?}", booking_id, e);
            None
        })
        .map(|booking| booking.into())
    }
}
