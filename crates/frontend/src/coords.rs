use waymark_shared::{Point, Size};

pub const MAP_CONTAINER_ID: &str = "waymark-map-container";

/// Used before the window reports a size.
const FALLBACK_VIEWPORT: Size = Size::new(1280.0, 720.0);

/// Convert client (viewport) coordinates to surface-relative coordinates.
pub fn client_to_surface(client_x: f64, client_y: f64, rect_left: f64, rect_top: f64) -> Point {
    Point::new(client_x - rect_left, client_y - rect_top)
}

/// Get the bounding client rect of the map container element.
pub fn surface_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

/// Current size of the map surface, if it is mounted and has an area.
pub fn surface_size() -> Option<Size> {
    let rect = surface_rect()?;
    let size = Size::new(rect.width(), rect.height());
    size.is_positive().then_some(size)
}

/// Keep delivering a pointer's events to the map surface after it leaves the
/// window, so a drag ends with its real release instead of a leave.
pub fn capture_pointer(pointer_id: i32) {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(MAP_CONTAINER_ID))
    else {
        return;
    };
    if let Err(e) = element.set_pointer_capture(pointer_id) {
        tracing::debug!(?e, pointer_id, "Pointer capture refused");
    }
}

/// Client coordinates to surface coordinates using the live container rect.
pub fn client_to_surface_live(client_x: f64, client_y: f64) -> Option<Point> {
    let rect = surface_rect()?;
    Some(client_to_surface(client_x, client_y, rect.left(), rect.top()))
}

/// The map fills the window, so the window size is the initial viewport.
pub fn window_size() -> Size {
    let Some(window) = web_sys::window() else {
        return FALLBACK_VIEWPORT;
    };
    let width = window.inner_width().ok().and_then(|v| v.as_f64());
    let height = window.inner_height().ok().and_then(|v| v.as_f64());
    match (width, height) {
        (Some(w), Some(h)) if Size::new(w, h).is_positive() => Size::new(w, h),
        _ => FALLBACK_VIEWPORT,
    }
}

/// Milliseconds on the page's monotonic clock.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// CSS for an absolutely positioned element covering `rect` on the surface.
pub fn placement_style(origin: Point, size: Size, visible: bool) -> String {
    let visibility = if visible { "visible" } else { "hidden" };
    format!(
        "left: {}px; top: {}px; width: {}px; height: {}px; visibility: {visibility};",
        origin.x, origin.y, size.width, size.height
    )
}
