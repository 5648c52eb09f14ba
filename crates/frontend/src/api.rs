use waymark_shared::MapConfig;

/// Build an absolute URL from the page origin and a root-relative path.
/// reqwest on wasm refuses relative URLs.
pub fn build_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", origin.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Build a shareable link that opens the map with a location's dialog.
pub fn build_location_url(origin: &str, location_id: &str) -> String {
    format!("{}/location/{}", origin.trim_end_matches('/'), location_id)
}

pub fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

/// Fetch and validate the map config.
///
/// An unreachable config falls back to the built-in defaults; a config that
/// arrives but is invalid is an error, and the map must not start.
pub async fn load_config(path: &str) -> Result<MapConfig, String> {
    let origin = page_origin().ok_or_else(|| "No window origin".to_string())?;
    let url = build_url(&origin, path);

    let resp = match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => resp,
        Ok(resp) => {
            tracing::warn!(%url, status = %resp.status(), "Map config not served, using defaults");
            return Ok(MapConfig::default());
        }
        Err(e) => {
            tracing::warn!(%url, error = %e, "Map config fetch failed, using defaults");
            return Ok(MapConfig::default());
        }
    };

    let body = resp.text().await.map_err(|e| e.to_string())?;
    MapConfig::from_json(&body).map_err(|e| e.to_string())
}
