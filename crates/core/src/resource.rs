// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource descriptors and the parser that builds them
//!
//! A resource is one thing to wait for. Tokens come from the command line
//! and take one of three shapes:
//! - `scheme://[user@]host[:port][/path][?query][#tags]` for URI schemes
//! - a bare string, run as a shell command and ready on exit status 0
//! - the empty string, which is always ready

use crate::policy::{InvalidOverride, Overrides};
use crate::tags::{format_tags, parse_tags, Tags};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::{Host, Url};

/// Errors that can occur while parsing a resource token
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid resource {token:?}: {source}")]
    InvalidUri {
        token: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid resource {token:?}: unsupported scheme {scheme:?}")]
    UnsupportedScheme { token: String, scheme: String },
    #[error("invalid resource {token:?}: missing scheme")]
    MissingScheme { token: String },
    #[error("invalid resource {token:?}: missing host")]
    MissingHost { token: String },
    #[error("invalid resource {token:?}: missing port")]
    MissingPort { token: String },
    #[error("invalid resource {token:?}: missing file path")]
    MissingPath { token: String },
    #[error("invalid resource {token:?}: file path is not valid UTF-8 once decoded")]
    InvalidPath { token: String },
    #[error("invalid resource {token:?}: tag {key} has invalid value {value:?} ({reason})")]
    InvalidTag {
        token: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ParseError {
    /// The token that failed to parse
    pub fn token(&self) -> &str {
        match self {
            ParseError::InvalidUri { token, .. }
            | ParseError::UnsupportedScheme { token, .. }
            | ParseError::MissingScheme { token }
            | ParseError::MissingHost { token }
            | ParseError::MissingPort { token }
            | ParseError::MissingPath { token }
            | ParseError::InvalidPath { token }
            | ParseError::InvalidTag { token, .. } => token,
        }
    }
}

/// Resource kind, which decides the readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    Ws,
    Wss,
    Tcp,
    Tcp4,
    Tcp6,
    File,
    Postgres,
    Mysql,
    Command,
    Empty,
}

impl Scheme {
    /// Look up a URI scheme name (case-insensitive)
    ///
    /// Only schemes written as `name://` map here; `command` and `empty`
    /// are inferred from the token shape instead.
    pub fn from_uri_scheme(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "ws" => Some(Scheme::Ws),
            "wss" => Some(Scheme::Wss),
            "tcp" => Some(Scheme::Tcp),
            "tcp4" => Some(Scheme::Tcp4),
            "tcp6" => Some(Scheme::Tcp6),
            "file" => Some(Scheme::File),
            "postgres" => Some(Scheme::Postgres),
            "mysql" => Some(Scheme::Mysql),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
            Scheme::Tcp => "tcp",
            Scheme::Tcp4 => "tcp4",
            Scheme::Tcp6 => "tcp6",
            Scheme::File => "file",
            Scheme::Postgres => "postgres",
            Scheme::Mysql => "mysql",
            Scheme::Command => "command",
            Scheme::Empty => "empty",
        }
    }

    /// Port used when the token names none
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Scheme::Http | Scheme::Ws => Some(80),
            Scheme::Https | Scheme::Wss => Some(443),
            Scheme::Postgres => Some(5432),
            Scheme::Mysql => Some(3306),
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized description of one thing to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub scheme: Scheme,
    /// Original token, kept for diagnostics
    pub raw: String,
    /// Userinfo (`user` or `user:password`), informational only
    pub user: String,
    /// Host name or address; IPv6 literals are stored without brackets
    pub host: String,
    pub port: Option<u16>,
    /// URI path, decoded filesystem path for `file`, command line for `command`
    pub path: String,
    pub query: String,
    pub fragment: String,
    pub tags: Tags,
    pub overrides: Overrides,
}

impl Resource {
    fn empty(raw: &str, scheme: Scheme) -> Self {
        Self {
            scheme,
            raw: raw.to_string(),
            user: String::new(),
            host: String::new(),
            port: None,
            path: String::new(),
            query: String::new(),
            fragment: String::new(),
            tags: Tags::new(),
            overrides: Overrides::default(),
        }
    }

    /// `host:port` suitable for socket address resolution
    pub fn address(&self) -> String {
        let port = self.port.unwrap_or_default();
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, port)
        } else {
            format!("{}:{}", self.host, port)
        }
    }

    /// Whether the resource carries the given tag key
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Short label for logs and reports
    pub fn label(&self) -> &str {
        if self.raw.is_empty() {
            "<empty>"
        } else {
            &self.raw
        }
    }

    fn with_fragment(mut self, fragment: &str) -> Result<Self, ParseError> {
        self.fragment = fragment.to_string();
        self.tags = parse_tags(fragment);
        self.overrides =
            Overrides::from_tags(&self.tags).map_err(|e: InvalidOverride| ParseError::InvalidTag {
                token: self.raw.clone(),
                key: e.key,
                value: e.value,
                reason: e.reason,
            })?;
        Ok(self)
    }
}

impl fmt::Display for Resource {
    /// Canonical string form; parsing it yields an equivalent resource
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Scheme::Empty => Ok(()),
            Scheme::Command => f.write_str(&self.path),
            Scheme::File => {
                write!(f, "file://{}", utf8_percent_encode(&self.path, FILE_PATH))?;
                if !self.query.is_empty() {
                    write!(f, "?{}", self.query)?;
                }
                if !self.tags.is_empty() {
                    write!(f, "#{}", format_tags(&self.tags))?;
                }
                Ok(())
            }
            _ => {
                write!(f, "{}://", self.scheme)?;
                if !self.user.is_empty() {
                    write!(f, "{}@", self.user)?;
                }
                if self.host.contains(':') {
                    write!(f, "[{}]", self.host)?;
                } else {
                    f.write_str(&self.host)?;
                }
                if let Some(port) = self.port {
                    write!(f, ":{}", port)?;
                }
                f.write_str(&self.path)?;
                if !self.query.is_empty() {
                    write!(f, "?{}", self.query)?;
                }
                if !self.tags.is_empty() {
                    write!(f, "#{}", format_tags(&self.tags))?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Resource {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_resource(s)
    }
}

/// Bytes escaped when a file path is rendered back into a token
const FILE_PATH: &AsciiSet = &CONTROLS.add(b' ').add(b'#').add(b'?').add(b'%');

/// Parse every token, failing on the first invalid one
///
/// Output order matches input order.
pub fn parse_resources<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Resource>, ParseError> {
    tokens.iter().map(|t| parse_resource(t.as_ref())).collect()
}

/// Parse a single resource token
pub fn parse_resource(token: &str) -> Result<Resource, ParseError> {
    if token.is_empty() {
        return Ok(Resource::empty(token, Scheme::Empty));
    }

    if let Some((prefix, rest)) = token.split_once("://") {
        if is_scheme_syntax(prefix) {
            return match Scheme::from_uri_scheme(prefix) {
                Some(Scheme::File) => parse_file(token, rest),
                Some(scheme) => parse_network(token, scheme),
                None => Err(ParseError::UnsupportedScheme {
                    token: token.to_string(),
                    scheme: prefix.to_string(),
                }),
            };
        }
    }

    if token.starts_with("//") {
        return Err(schemeless_error(token));
    }

    let mut resource = Resource::empty(token, Scheme::Command);
    resource.path = token.to_string();
    Ok(resource)
}

/// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-` or `.`
fn is_scheme_syntax(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// A `//authority` token names no scheme; report the structural problem
/// when there is one, so `//foo bar` shows the bad host.
fn schemeless_error(token: &str) -> ParseError {
    match Url::parse(&format!("tcp:{}", token)) {
        Err(source) => ParseError::InvalidUri {
            token: token.to_string(),
            source,
        },
        Ok(_) => ParseError::MissingScheme {
            token: token.to_string(),
        },
    }
}

fn parse_file(token: &str, rest: &str) -> Result<Resource, ParseError> {
    let (rest, fragment) = rest.split_once('#').unwrap_or((rest, ""));
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    if path.is_empty() {
        return Err(ParseError::MissingPath {
            token: token.to_string(),
        });
    }
    let path = percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| ParseError::InvalidPath {
            token: token.to_string(),
        })?;

    let mut resource = Resource::empty(token, Scheme::File);
    resource.path = path.into_owned();
    resource.query = query.to_string();
    resource.with_fragment(fragment)
}

fn parse_network(token: &str, scheme: Scheme) -> Result<Resource, ParseError> {
    let url = Url::parse(token).map_err(|source| ParseError::InvalidUri {
        token: token.to_string(),
        source,
    })?;

    let host = match url.host() {
        Some(Host::Ipv6(addr)) => addr.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Domain(name)) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(ParseError::MissingHost {
                token: token.to_string(),
            })
        }
    };

    let port = url.port().or_else(|| scheme.default_port());
    if port.is_none() {
        return Err(ParseError::MissingPort {
            token: token.to_string(),
        });
    }

    let user = match url.password() {
        Some(password) => format!("{}:{}", url.username(), password),
        None => url.username().to_string(),
    };

    let mut resource = Resource::empty(token, scheme);
    resource.user = user;
    resource.host = host;
    resource.port = port;
    resource.path = url.path().to_string();
    resource.query = url.query().unwrap_or_default().to_string();
    resource.with_fragment(url.fragment().unwrap_or_default())
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
