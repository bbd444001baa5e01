mod cancel_booking;
pub mod create_booking;
mod get_booking;
mod subscribers;

use actix_web::web;
use cancel_booking::cancel_booking_controller;
use create_booking::create_booking_controller;
use get_booking::get_booking_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/bookings", web::post().to(create_booking_controller));
    cfg.route(
        "/bookings/{booking_id}",
        web::get().to(get_booking_controller),
    );
    cfg.route(
        "/bookings/{booking_id}/cancel",
        web::post().to(cancel_booking_controller),
    );
}
