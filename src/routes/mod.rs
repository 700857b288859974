// Route exports
pub mod compare;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig, compare_path: &str) {
    compare::configure(cfg, compare_path);
}
