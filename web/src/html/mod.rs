use crate::{state::AppState, util::FlashMessage};
use axum::{
    Router,
    response::IntoResponse,
    routing::{get, post},
};
use minijinja::context;

mod contact;
mod home;
mod meta;
mod page;
mod project;
#[cfg(test)]
pub(crate) mod tests;
mod youth_house;

pub(crate) use meta::{PageMeta, SITE_NAME};

pub(crate) fn flash_message(state: AppState, msg: FlashMessage) -> impl IntoResponse {
    state.render_template("_flash_messages.html.j2", context!(messages => &[msg]))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/projects", get(project::list_projects))
        .route("/projects/{slug}", get(project::show_project))
        .route("/youth-houses/{slug}", get(youth_house::show_youth_house))
        .route("/contact/message", post(contact::send_message))
        // CMS pages live at the top level, e.g. `/about-entree`
        .route("/{slug}", get(page::show_page))
}
