use dioxus::html::geometry::WheelDelta;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use waymark_shared::input::{Gesture, InputEvent};
use waymark_shared::{AssetState, FrameItem, Location, MapSession};

use crate::coords::{self, MAP_CONTAINER_ID};

/// Tick period for the glide animation and viewport sync.
const FRAME_MS: u32 = 16;

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// One `<img>` of the current frame, ready for rsx.
#[derive(Debug, Clone, PartialEq)]
struct RenderedItem {
    key: String,
    src: String,
    class: &'static str,
    style: String,
    alt: String,
}

fn render_items(items: &[FrameItem], session: &MapSession) -> Vec<RenderedItem> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let location = item
                .location_id
                .as_deref()
                .and_then(|id| session.scene().location(id));
            RenderedItem {
                key: match &item.location_id {
                    Some(id) => format!("marker-{id}"),
                    None => format!("item-{i}"),
                },
                src: item.asset.clone(),
                class: if location.is_some() { "map-marker" } else { "map-background" },
                style: coords::placement_style(
                    item.screen.origin,
                    item.screen.size,
                    item.state == AssetState::Ready,
                ),
                alt: location.map(|l| l.name.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Full-window map surface bound to a [`MapSession`].
///
/// All camera and hit-test logic lives in the session; this component only
/// forwards DOM events and draws the session's frame.
#[component]
pub fn MapView(session: Signal<Option<MapSession>>, on_select: EventHandler<Location>) -> Element {
    let mut session = session;

    // Viewport sync and glide animation. Writes only when something changed
    // so idle frames don't re-render.
    use_future(move || async move {
        loop {
            TimeoutFuture::new(FRAME_MS).await;
            let size = coords::surface_size();
            let (resized, gliding) = match session.peek().as_ref() {
                Some(s) => (
                    size.is_some_and(|size| size != s.camera().viewport()),
                    s.is_gliding(),
                ),
                None => continue,
            };
            if !resized && !gliding {
                continue;
            }
            if let Some(s) = session.write().as_mut() {
                if let Some(size) = size {
                    s.resize(size);
                }
                s.tick(coords::now_ms());
            }
        }
    });

    let mut dispatch = move |event: InputEvent| {
        let picked = session
            .write()
            .as_mut()
            .and_then(|s| s.handle(event).cloned());
        if let Some(location) = picked {
            on_select.call(location);
        }
    };

    let mut mark_asset = move |key: &str, state: AssetState| {
        let unchanged = session
            .peek()
            .as_ref()
            .is_some_and(|s| s.scene().asset_state(key) == Some(state));
        if unchanged {
            return;
        }
        if let Some(s) = session.write().as_mut() {
            s.set_asset_state(key, state);
        }
    };

    let (items, gesture) = match session.read().as_ref() {
        Some(s) => (render_items(&s.frame().items, s), s.gesture()),
        None => (Vec::new(), Gesture::Idle),
    };
    let container_class = if gesture == Gesture::Idle {
        "map-container"
    } else {
        "map-container dragging"
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onpointerdown: move |evt: Event<PointerData>| {
                evt.prevent_default();
                coords::capture_pointer(evt.pointer_id());
                let client = evt.client_coordinates();
                let Some(position) = coords::client_to_surface_live(client.x, client.y) else { return };
                dispatch(InputEvent::PointerDown {
                    id: evt.pointer_id(),
                    position,
                    time_ms: coords::now_ms(),
                });
            },

            onpointermove: move |evt: Event<PointerData>| {
                let client = evt.client_coordinates();
                let Some(position) = coords::client_to_surface_live(client.x, client.y) else { return };
                dispatch(InputEvent::PointerMove {
                    id: evt.pointer_id(),
                    position,
                    time_ms: coords::now_ms(),
                });
            },

            onpointerup: move |evt: Event<PointerData>| {
                let client = evt.client_coordinates();
                let Some(position) = coords::client_to_surface_live(client.x, client.y) else { return };
                dispatch(InputEvent::PointerUp {
                    id: evt.pointer_id(),
                    position,
                    time_ms: coords::now_ms(),
                });
            },

            onpointercancel: move |evt: Event<PointerData>| {
                dispatch(InputEvent::PointerCancel { id: evt.pointer_id() });
            },

            onpointerleave: move |evt: Event<PointerData>| {
                dispatch(InputEvent::PointerCancel { id: evt.pointer_id() });
            },

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let client = evt.data().client_coordinates();
                let Some(position) = coords::client_to_surface_live(client.x, client.y) else { return };
                dispatch(InputEvent::Wheel {
                    position,
                    delta_y: wheel_delta_y(evt.data().delta()),
                });
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                if let Some(s) = session.write().as_mut() {
                    s.reset_view();
                }
            },

            for item in items {
                img {
                    key: "{item.key}",
                    class: "{item.class}",
                    src: "{item.src}",
                    alt: "{item.alt}",
                    style: "{item.style}",
                    draggable: "false",
                    onload: {
                        let src = item.src.clone();
                        move |_| mark_asset(&src, AssetState::Ready)
                    },
                    onerror: {
                        let src = item.src.clone();
                        move |_| mark_asset(&src, AssetState::Unavailable)
                    },
                }
            }
        }
    }
}
