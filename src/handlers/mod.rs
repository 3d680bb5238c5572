pub mod chat_handler;
pub mod health_handler;
pub mod history_handler;
pub mod roadmap_handler;

use actix_web::web;

pub use chat_handler::{apply_revision, reject_revision, send_chat_message};
pub use health_handler::health_check;
pub use history_handler::{list_history, restore_snapshot};
pub use roadmap_handler::{
    download_roadmap, generate_roadmap, get_roadmap, get_session, update_settings,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(get_session)
        .service(generate_roadmap)
        .service(download_roadmap)
        .service(get_roadmap)
        .service(send_chat_message)
        .service(apply_revision)
        .service(reject_revision)
        .service(list_history)
        .service(restore_snapshot)
        .service(update_settings);
}
