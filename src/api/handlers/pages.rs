use crate::pages;
use axum::response::Html;

pub async fn index() -> Html<String> {
    Html(pages::index())
}

pub async fn hosteller_login() -> Html<String> {
    Html(pages::hosteller_login())
}

pub async fn warden_login() -> Html<String> {
    Html(pages::warden_login())
}
