mod api;
mod components;
mod coords;
mod pages;

use dioxus::prelude::*;

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
    #[route("/location/:id")]
    LocationView { id: String },
}

#[component]
fn Home() -> Element {
    rsx! {
        pages::explorer::Explorer { location_id: None::<String> }
    }
}

#[component]
fn LocationView(id: String) -> Element {
    rsx! {
        pages::explorer::Explorer { location_id: Some(id) }
    }
}

const CSS: Asset = asset!("/assets/main.css");

#[allow(non_snake_case)]
fn App() -> Element {
    rsx! {
        document::Title { "Waymark" }
        document::Stylesheet { href: CSS }
        Router::<Route> {}
    }
}

fn main() {
    launch(App);
}
