use std::path::PathBuf;

const CREDENTIALS_FILE_NAME: &str = ".netatmo.credentials";

/// `~/.netatmo.credentials`, the location other Netatmo tools share.
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(CREDENTIALS_FILE_NAME))
}

/// Escapes a string for use inside a double-quoted Flux string literal.
pub fn escape_flux_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            // `${` would start string interpolation
            '$' => escaped.push_str("\\$"),
            _ => escaped.push(c),
        }
    }
    escaped
}
