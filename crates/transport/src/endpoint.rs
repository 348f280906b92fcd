//! Endpoints: how one operation maps onto an HTTP request.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chain::{ArgumentVector, OperationKey};

use crate::expander::{render_default, Expander};
use crate::template::{Bindings, RequestTemplate};
use crate::TransportError;

struct Parameter {
    name: String,
    expander: Option<Arc<dyn Expander>>,
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("expanded", &self.expander.is_some())
            .finish()
    }
}

/// A request template plus the names bound to each argument position.
///
/// Parameters are declared for the **whole merged argument vector**, in
/// order: the arguments captured by fluent calls come first, then the
/// terminal call's own arguments.
///
/// ```
/// use transport::{Endpoint, LowerCase};
///
/// let endpoint = Endpoint::parse("GET /stores/{store_id}/employees?first={first}")
///     .unwrap()
///     .param("store_id")
///     .param_with("first", LowerCase);
/// assert_eq!(endpoint.parameters().collect::<Vec<_>>(), ["store_id", "first"]);
/// ```
#[derive(Debug)]
pub struct Endpoint {
    template: RequestTemplate,
    parameters: Vec<Parameter>,
    headers: Vec<(String, String)>,
}

impl Endpoint {
    /// Parses the request line of a new endpoint.
    pub fn parse(request_line: &str) -> Result<Self, TransportError> {
        Ok(Self {
            template: RequestTemplate::parse(request_line)?,
            parameters: Vec::new(),
            headers: Vec::new(),
        })
    }

    /// Binds the next argument position to `name`, rendered with the default
    /// rendering.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            expander: None,
        });
        self
    }

    /// Binds the next argument position to `name`, rendered by `expander`.
    pub fn param_with(
        mut self,
        name: impl Into<String>,
        expander: impl Expander + 'static,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            expander: Some(Arc::new(expander)),
        });
        self
    }

    /// Attaches a body template.
    pub fn body(mut self, template: &str) -> Result<Self, TransportError> {
        self.template = self.template.with_body(template)?;
        Ok(self)
    }

    /// Adds a header sent with this endpoint's requests only.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The parsed request template.
    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    /// Declared parameter names, in argument order.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Endpoint-specific headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Expands `arguments` into template bindings.
    ///
    /// `null` arguments bind their name to no value; expanders never see them.
    pub fn bind(
        &self,
        operation: &OperationKey,
        arguments: &ArgumentVector,
    ) -> Result<Bindings, TransportError> {
        if arguments.len() != self.parameters.len() {
            return Err(TransportError::ArgumentCount {
                operation: operation.to_string(),
                expected: self.parameters.len(),
                actual: arguments.len(),
            });
        }

        let mut bindings = Bindings::new();
        for (parameter, value) in self.parameters.iter().zip(arguments) {
            let rendered = match (&parameter.expander, value.is_null()) {
                (_, true) => None,
                (Some(expander), false) => Some(expander.expand(value)),
                (None, false) => render_default(value),
            };
            bindings.insert(parameter.name.clone(), rendered);
        }
        Ok(bindings)
    }
}

/// Endpoints keyed by operation.
#[derive(Debug, Default)]
pub struct EndpointTable {
    endpoints: HashMap<OperationKey, Endpoint>,
}

impl EndpointTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the endpoint for `Interface#operation`.
    ///
    /// Every path and body variable of the template must be bound by a
    /// parameter, and each operation may be registered once.
    pub fn insert(
        &mut self,
        interface: &str,
        operation: &str,
        endpoint: Endpoint,
    ) -> Result<(), TransportError> {
        let key = OperationKey::parse(interface, operation).ok_or_else(|| {
            TransportError::InvalidConfig {
                message: format!("invalid operation name '{interface}#{operation}'"),
            }
        })?;

        if let Some(name) = endpoint
            .template
            .required_variables()
            .find(|var| !endpoint.parameters().any(|p| p == *var))
        {
            return Err(TransportError::InvalidTemplate {
                template: endpoint.template.source().to_owned(),
                message: format!("variable '{name}' is not bound to a parameter"),
            });
        }

        if self.endpoints.contains_key(&key) {
            return Err(TransportError::InvalidConfig {
                message: format!("endpoint for '{key}' is already registered"),
            });
        }
        self.endpoints.insert(key, endpoint);
        Ok(())
    }

    /// Builder form of [`EndpointTable::insert`].
    pub fn with(
        mut self,
        interface: &str,
        operation: &str,
        endpoint: Endpoint,
    ) -> Result<Self, TransportError> {
        self.insert(interface, operation, endpoint)?;
        Ok(self)
    }

    /// Looks up the endpoint for `operation`.
    pub fn get(&self, operation: &OperationKey) -> Option<&Endpoint> {
        self.endpoints.get(operation)
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns `true` if no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
