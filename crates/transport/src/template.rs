//! Request templates: `METHOD /path/{var}?name={var}` plus an optional body.
//!
//! Templates are parsed once, when an endpoint is declared, and rendered for
//! every call against the expanded argument values in [`Bindings`].

use std::collections::BTreeMap;

use reqwest::{Method, Url};

use crate::TransportError;

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// Expanded argument values keyed by template variable name.
///
/// A variable bound to `None` came from a `null` argument and renders as "no
/// value", exactly like a variable that was never bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<String, Option<String>>);

impl Bindings {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`. A later binding for the same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.0.insert(name.into(), value);
    }

    /// Returns the value bound to `name`, if it has one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Option::as_deref)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Template fragments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Variable(String),
}

/// A piece of template text with `{name}` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fragment(Vec<Part>);

impl Fragment {
    fn parse(text: &str, source: &str) -> Result<Self, TransportError> {
        let invalid = |message: &str| TransportError::InvalidTemplate {
            template: source.to_owned(),
            message: message.to_owned(),
        };

        let mut parts = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find(['{', '}']) {
            if rest[open..].starts_with('}') {
                return Err(invalid("unmatched '}'"));
            }
            if open > 0 {
                parts.push(Part::Literal(decode_braces(&rest[..open])));
            }
            let after = &rest[open + 1..];
            let close = after
                .find(['{', '}'])
                .filter(|&i| after[i..].starts_with('}'))
                .ok_or_else(|| invalid("unclosed '{'"))?;
            let name = after[..close].trim();
            if name.is_empty() {
                return Err(invalid("empty variable name"));
            }
            parts.push(Part::Variable(name.to_owned()));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(decode_braces(rest)));
        }
        Ok(Self(parts))
    }

    fn variables(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|part| match part {
            Part::Variable(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Renders the fragment, or returns the name of the first variable
    /// without a value.
    fn render<'a>(&'a self, bindings: &Bindings) -> Result<String, &'a str> {
        let mut out = String::new();
        for part in &self.0 {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Variable(name) => out.push_str(bindings.get(name).ok_or(name.as_str())?),
            }
        }
        Ok(out)
    }
}

/// `%7B` / `%7D` in literal text stand for braces that are not variables.
fn decode_braces(text: &str) -> String {
    text.replace("%7B", "{")
        .replace("%7b", "{")
        .replace("%7D", "}")
        .replace("%7d", "}")
}

// ---------------------------------------------------------------------------
// Request templates
// ---------------------------------------------------------------------------

/// A rendered request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: Url,
    /// Rendered body, if the template declares one.
    pub body: Option<String>,
}

/// A parsed request line and optional body template.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTemplate {
    source: String,
    method: Method,
    path: Vec<Fragment>,
    /// `None` marks a bare flag (`?verbose`), rendered without `=`.
    query: Vec<(String, Option<Fragment>)>,
    body: Option<Fragment>,
}

impl RequestTemplate {
    /// Parses a request line such as
    /// `GET /api/stores/{store_id}/employees?filter[first_name]={first}`.
    pub fn parse(request_line: &str) -> Result<Self, TransportError> {
        let source = request_line.trim();
        let invalid = |message: &str| TransportError::InvalidTemplate {
            template: source.to_owned(),
            message: message.to_owned(),
        };

        let (method, target) = source
            .split_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected 'METHOD /path'"))?;
        let method =
            Method::from_bytes(method.as_bytes()).map_err(|_| invalid("invalid HTTP method"))?;

        let target = target.trim();
        if !target.starts_with('/') {
            return Err(invalid("path must start with '/'"));
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        let path = path[1..]
            .split('/')
            .map(|segment| Fragment::parse(segment, source))
            .collect::<Result<Vec<_>, _>>()?;

        let query = query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = match pair.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (pair, None),
                };
                if name.is_empty() {
                    return Err(invalid("empty query parameter name"));
                }
                let value = value.map(|v| Fragment::parse(v, source)).transpose()?;
                Ok((name.to_owned(), value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.to_owned(),
            method,
            path,
            query,
            body: None,
        })
    }

    /// Attaches a body template. `%7B` and `%7D` render as literal braces.
    pub fn with_body(mut self, body: &str) -> Result<Self, TransportError> {
        self.body = Some(Fragment::parse(body, body)?);
        Ok(self)
    }

    /// The request line this template was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Variables that must have a value for the request to render.
    pub fn required_variables(&self) -> impl Iterator<Item = &str> {
        self.path
            .iter()
            .chain(self.body.iter())
            .flat_map(Fragment::variables)
    }

    /// Every variable referenced anywhere in the template.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.required_variables().chain(
            self.query
                .iter()
                .filter_map(|(_, value)| value.as_ref())
                .flat_map(Fragment::variables),
        )
    }

    /// Renders the template against `base`.
    ///
    /// Path segments are appended to the base URL's path and percent-encoded.
    /// Query parameters whose value has an unbound variable are left out;
    /// bare flags are always sent.
    pub fn render(
        &self,
        base: &Url,
        bindings: &Bindings,
    ) -> Result<RenderedRequest, TransportError> {
        let unresolved = |name: &str| TransportError::UnresolvedVariable {
            name: name.to_owned(),
        };

        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TransportError::InvalidConfig {
                    message: format!("base URL '{base}' cannot carry a path"),
                })?;
            segments.pop_if_empty();
            for fragment in &self.path {
                let segment = fragment.render(bindings).map_err(unresolved)?;
                segments.push(&segment);
            }
        }

        let pairs: Vec<(&str, Option<String>)> = self
            .query
            .iter()
            .filter_map(|(name, value)| match value {
                None => Some((name.as_str(), None)),
                Some(value) => Some((name.as_str(), Some(value.render(bindings).ok()?))),
            })
            .collect();
        url.set_query(None);
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (name, value) in &pairs {
                match value {
                    Some(value) => query.append_pair(name, value),
                    None => query.append_key_only(name),
                };
            }
        }

        let body = self
            .body
            .as_ref()
            .map(|body| body.render(bindings).map_err(unresolved))
            .transpose()?;

        Ok(RenderedRequest {
            method: self.method.clone(),
            url,
            body,
        })
    }
}
