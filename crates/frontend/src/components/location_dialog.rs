use dioxus::prelude::*;
use waymark_shared::Location;

use crate::api;
use crate::coords;

/// The second click of a double-click on a marker lands on the backdrop of the
/// dialog the first click opened. Backdrop clicks this soon after opening are
/// ignored.
const DOUBLE_CLICK_MS: f64 = 500.0;

fn backdrop_dismisses(opened_ms: f64, now_ms: f64) -> bool {
    now_ms - opened_ms >= DOUBLE_CLICK_MS
}

/// Modal with the selected location's details. Renders nothing when no
/// location is selected. `opened_ms` is when the selection was made, on the
/// [`coords::now_ms`] clock.
#[component]
pub fn LocationDialog(
    location: Option<Location>,
    opened_ms: f64,
    on_close: EventHandler<()>,
) -> Element {
    let Some(location) = location else {
        return rsx! {};
    };
    let share_url = api::page_origin().map(|origin| api::build_location_url(&origin, &location.id));

    rsx! {
        div {
            class: "modal-backdrop",
            onclick: move |_| {
                if backdrop_dismisses(opened_ms, coords::now_ms()) {
                    on_close.call(());
                }
            },

            div {
                class: "modal-box",
                role: "dialog",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h3 { class: "modal-title", "{location.name}" }
                p { class: "modal-body",
                    "Coordinates: {location.x}, {location.y}"
                }

                if let Some(url) = share_url {
                    div { class: "share-url",
                        input {
                            r#type: "text",
                            readonly: true,
                            value: "{url}",
                        }
                        button {
                            class: "secondary",
                            onclick: {
                                let url = url.clone();
                                move |_| {
                                    let url = url.clone();
                                    wasm_bindgen_futures::spawn_local(async move {
                                        if let Some(window) = web_sys::window() {
                                            let clipboard = window.navigator().clipboard();
                                            let _ = wasm_bindgen_futures::JsFuture::from(
                                                clipboard.write_text(&url)
                                            ).await;
                                        }
                                    });
                                }
                            },
                            "Copy link"
                        }
                    }
                }

                div { class: "modal-action",
                    button {
                        onclick: move |_| on_close.call(()),
                        "Close"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backdrop_ignores_second_click_of_double_click() {
        assert!(!backdrop_dismisses(1_000.0, 1_200.0));
        assert!(backdrop_dismisses(1_000.0, 1_500.0));
    }

    #[test]
    fn test_deep_linked_dialog_dismisses_at_once() {
        assert!(backdrop_dismisses(0.0, 5_000.0));
    }
}
