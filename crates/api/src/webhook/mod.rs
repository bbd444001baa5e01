mod reconcile;
mod sendgrid;
mod twilio;

use actix_web::web;
use sendgrid::sendgrid_webhook_controller;
use twilio::twilio_webhook_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhook/sendgrid", web::post().to(sendgrid_webhook_controller));
    cfg.route("/webhook/twilio", web::post().to(twilio_webhook_controller));
}
