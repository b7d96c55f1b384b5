//! Load sources and path expansion.

use std::fmt;

/// Where a dataset is loaded from.
///
/// Only [`Source::Path`] is loadable; any other kind of source is rejected
/// without I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A filesystem path, possibly containing `~` or `$VAR` references.
    Path(String),
    /// A URL or other non-path location.
    Url(String),
}

impl Source {
    /// Returns the source text as given.
    pub fn as_str(&self) -> &str {
        match self {
            Source::Path(path) => path,
            Source::Url(url) => url,
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self, Source::Path(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        if value.contains("://") {
            Source::Url(value)
        } else {
            Source::Path(value)
        }
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Source::from(value.to_string())
    }
}

impl From<&std::path::Path> for Source {
    fn from(value: &std::path::Path) -> Self {
        Source::Path(value.to_string_lossy().into_owned())
    }
}

/// Expands a leading `~` and `$VAR` / `${VAR}` references.
///
/// `~` and `~/...` use the current user's home directory; `~user` forms are
/// left alone. Unset variables are kept verbatim, as is a `~` when no home
/// directory is known.
pub fn expand_path(path: &str) -> String {
    let path = expand_home(path);
    let expanded = expand_vars(&path);
    tracing::debug!(expanded = %expanded, "expanded path");
    expanded
}

fn expand_home(path: &str) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_string();
    };
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with(std::path::MAIN_SEPARATOR)) {
        return path.to_string();
    }
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => path.to_string(),
    }
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand_vars(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        // `${NAME}`
        if let Some(braced) = after.strip_prefix('{')
            && let Some(end) = braced.find('}')
        {
            let name = &braced[..end];
            let consumed = 1 + 1 + end + 1;
            match lookup(name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[pos..pos + consumed]),
            }
            rest = &rest[pos + consumed..];
            continue;
        }

        // `$NAME`
        let len = after.find(|c: char| !is_var_char(c)).unwrap_or(after.len());
        let name = &after[..len];
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

fn lookup(name: &str) -> Option<String> {
    if name.is_empty() || !name.chars().all(is_var_char) {
        return None;
    }
    std::env::var(name).ok()
}
