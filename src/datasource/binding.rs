//! Alias to URL bindings.
//!
//! A binding argument has the form `alias=URL`. The alias may be omitted,
//! in which case it is the file name of the URL path up to its first dot,
//! so `config.json` binds `config`. Values without a scheme are local
//! paths and become absolute `file://` URLs.

use super::content_type;
use crate::error::DatasourceError;
use crate::vfs::{absolutize, FileSystem};
use std::path::Path;
use url::Url;

/// One alias bound to one datasource URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceBinding {
    /// Short name templates refer to.
    pub alias: String,
    /// Location of the data, without the content-type override.
    pub url: Url,
    /// Forced content type from the `type` query parameter.
    pub content_type: Option<String>,
    /// Extra HTTP headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl DatasourceBinding {
    /// Bind `alias` to an already-parsed URL.
    pub fn new(alias: impl Into<String>, url: &Url) -> Self {
        let (url, content_type) = content_type::split_override(url);
        Self {
            alias: alias.into(),
            url,
            content_type,
            headers: Vec::new(),
        }
    }

    /// Parse an `[alias=]URL` argument.
    ///
    /// Relative paths are resolved against the filesystem's current directory.
    pub fn parse(arg: &str, fs: &dyn FileSystem) -> Result<Self, DatasourceError> {
        let invalid = |message: String| DatasourceError::InvalidBinding {
            arg: arg.to_string(),
            message,
        };

        let (alias, value) = split_alias(arg);
        let url = to_url(value, fs).map_err(invalid)?;
        let alias = match alias {
            Some(alias) => alias.to_string(),
            None => alias_from_url(&url)
                .ok_or_else(|| invalid("cannot derive an alias; use alias=URL".to_string()))?,
        };

        Ok(Self::new(alias, &url))
    }

    /// Builder-style header addition.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A parsed `alias=Name: value` header argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderArg {
    /// Alias the header applies to.
    pub alias: String,
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl HeaderArg {
    /// Parse an `alias=Name: value` argument.
    pub fn parse(arg: &str) -> Result<Self, DatasourceError> {
        let invalid = |message: &str| DatasourceError::InvalidBinding {
            arg: arg.to_string(),
            message: message.to_string(),
        };

        let (alias, header) = arg
            .split_once('=')
            .ok_or_else(|| invalid("expected alias=Name: value"))?;
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| invalid("expected a header of the form Name: value"))?;

        let alias = alias.trim();
        let name = name.trim();
        if alias.is_empty() || name.is_empty() {
            return Err(invalid("alias and header name must not be empty"));
        }

        Ok(Self {
            alias: alias.to_string(),
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// Split off a leading `alias=`, unless the text before `=` is part of a URL.
fn split_alias(arg: &str) -> (Option<&str>, &str) {
    match arg.split_once('=') {
        Some((alias, value)) if !alias.is_empty() && !alias.contains(&[':', '/', '?'][..]) => {
            (Some(alias), value)
        }
        _ => (None, arg),
    }
}

fn to_url(value: &str, fs: &dyn FileSystem) -> Result<Url, String> {
    if value.is_empty() {
        return Err("empty URL".to_string());
    }
    match Url::parse(value) {
        // A one-letter scheme is a Windows drive, not a URL
        Ok(url) if url.scheme().len() > 1 => Ok(url),
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => file_url(value, fs),
        Err(e) => Err(e.to_string()),
    }
}

fn file_url(value: &str, fs: &dyn FileSystem) -> Result<Url, String> {
    let (path, query) = match value.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (value, None),
    };

    let absolute = absolutize(fs, Path::new(path)).map_err(|e| e.to_string())?;
    let url = if path.ends_with('/') || path.ends_with(std::path::MAIN_SEPARATOR) {
        Url::from_directory_path(&absolute)
    } else {
        Url::from_file_path(&absolute)
    };
    let mut url = url.map_err(|()| format!("{} is not a valid path", absolute.display()))?;
    url.set_query(query);
    Ok(url)
}

fn alias_from_url(url: &Url) -> Option<String> {
    let name = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;
    let stem = name.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
