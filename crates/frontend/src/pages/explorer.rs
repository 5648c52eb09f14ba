use dioxus::prelude::*;
use waymark_shared::{Location, MapSession};

use crate::api;
use crate::components::location_dialog::LocationDialog;
use crate::components::map_view::MapView;
use crate::coords;

const MAP_CONFIG: Asset = asset!("/assets/map.json");

/// Point the address bar at `path` without a navigation, so the current
/// selection can be shared without reloading the map.
fn replace_address(path: &str) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    if let Err(e) = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(path)) {
        tracing::debug!(?e, path, "Could not update address");
    }
}

#[component]
pub fn Explorer(location_id: Option<String>) -> Element {
    // The one session for this page; MapView and the dialog both work on it.
    let mut session = use_signal(|| None::<MapSession>);
    let mut load_error = use_signal(|| None::<String>);
    let mut opened_ms = use_signal(|| 0.0_f64);

    use_future(move || {
        let location_id = location_id.clone();
        async move {
            let built = api::load_config(&MAP_CONFIG.to_string())
                .await
                .and_then(|config| {
                    MapSession::new(config, coords::window_size()).map_err(|e| e.to_string())
                });
            match built {
                Ok(mut s) => {
                    if let Some(id) = &location_id {
                        s.select(id);
                    }
                    session.set(Some(s));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Map config rejected");
                    load_error.set(Some(e));
                }
            }
        }
    });

    if let Some(e) = &*load_error.read() {
        return rsx! {
            div { class: "map-error",
                h2 { "Map unavailable" }
                p { "{e}" }
            }
        };
    }

    let loaded = session.read().is_some();
    let selected = session.read().as_ref().and_then(|s| s.selected().cloned());

    rsx! {
        div { class: "app",
            if loaded {
                MapView {
                    session: session,
                    on_select: move |location: Location| {
                        opened_ms.set(coords::now_ms());
                        tracing::info!(id = %location.id, name = %location.name, "Showing location");
                        replace_address(&format!("/location/{}", location.id));
                    },
                }
            } else {
                div { class: "loading", "Loading map…" }
            }

            LocationDialog {
                location: selected,
                opened_ms: opened_ms(),
                on_close: move |_| {
                    if let Some(s) = session.write().as_mut() {
                        s.dismiss();
                    }
                    replace_address("/");
                },
            }
        }
    }
}
