use super::ConfigError;

/// Read-only view over a set of named settings.
///
/// The process environment is one implementation; tests pass a closure over a
/// map so they never touch global state.
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Value of `name`, with empty strings treated as unset.
pub fn load_env_string_opt(env: &impl EnvSource, name: &str) -> Option<String> {
    env.get(name).filter(|value| !value.is_empty())
}

/// `true` only when the value equals "true", ignoring case.
pub fn load_env_flag(env: &impl EnvSource, name: &str) -> bool {
    load_env_string_opt(env, name).is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Inline value of `name`, falling back to the contents of the file named by
/// `<name>_FILE` (Docker secrets convention).
pub fn load_env_secret(env: &impl EnvSource, name: &str) -> Result<Option<String>, ConfigError> {
    if let Some(value) = load_env_string_opt(env, name) {
        return Ok(Some(value));
    }

    let file_name = format!("{name}_FILE");
    let Some(path) = load_env_string_opt(env, &file_name) else {
        return Ok(None);
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::SecretFile {
        name: file_name,
        path: path.clone(),
        source,
    })?;

    Ok(Some(contents).filter(|value| !value.is_empty()))
}
