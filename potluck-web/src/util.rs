use potluck_client::api::Target;

/// Reads the page to display from the location hash, eg. `#blog/<uuid>`
pub fn target_from_hash() -> Option<Target> {
    let hash = web_sys::window()?.location().hash().ok()?;
    let hash = hash.trim_start_matches('#');
    if hash.is_empty() {
        return None;
    }
    match hash.parse() {
        Ok(t) => Some(t),
        Err(err) => {
            tracing::warn!(?err, hash, "location hash is not a valid target");
            None
        }
    }
}

pub fn count_label(count: u64, singular: &str, plural: &str) -> String {
    match count {
        1 => format!("1 {singular}"),
        n => format!("{n} {plural}"),
    }
}
