/// Resolves the optional tuning file under the asset root. A missing file is
/// the normal case and stays silent; a malformed one is reported and the
/// defaults stand. Startup path failures are left for the loop runner to
/// surface.
pub(crate) fn load_tuning() -> PhysicsTuning {
    let defaults = PhysicsTuning::default();
    let paths = match engine::resolve_app_paths() {
        Ok(paths) => paths,
        Err(_) => return defaults,
    };
    let path = paths.assets_dir.join(TUNING_FILE_NAME);
    if !path.is_file() {
        return defaults;
    }
    match read_tuning_overrides(&path) {
        Ok(overrides) => {
            info!(path = %path.display(), "tuning_loaded");
            overrides.apply_over(defaults)
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "tuning_invalid_using_defaults");
            defaults
        }
    }
}

fn read_tuning_overrides(path: &Path) -> Result<TuningOverrides, String> {
    let raw = fs::read_to_string(path).map_err(|error| error.to_string())?;
    parse_tuning_overrides(&raw)
}

/// Parse with field-path context so a bad value reports which knob is wrong.
fn parse_tuning_overrides(raw: &str) -> Result<TuningOverrides, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| error.to_string())
}
