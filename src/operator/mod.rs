use crate::error::OperatorError;
use crate::value::{ParamKind, ParamMap, ParamValue};
use serde::Serialize;
use std::sync::Arc;

mod builtin;
pub mod form;
mod registry;

pub use form::{FormState, FormValidation, ParameterForm, SimpleForm};
pub use registry::OperatorRegistry;

/// The output artifact of an operator, cached on its node and consumed downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub operator: String,
    /// Names of the products this one was computed from, in binding order.
    pub sources: Vec<String>,
    pub attributes: ParamMap,
}

impl Product {
    pub fn new(name: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator: operator.into(),
            sources: Vec::new(),
            attributes: ParamMap::new(),
        }
    }
}

/// Describes one parameter of an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub required: bool,
}

impl ParameterDescriptor {
    pub fn required(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: ParamValue::Null,
            required: true,
        }
    }

    pub fn optional(name: &str, kind: ParamKind, default: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default,
            required: false,
        }
    }
}

/// Static description of an operator: its input bounds, named sources and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorMetadata {
    pub name: String,
    pub category: String,
    pub description: String,
    pub min_inputs: usize,
    /// `None` means the operator accepts any number of inputs.
    pub max_inputs: Option<usize>,
    /// Names of the required sources, bound to input slots by position.
    pub source_descriptors: Vec<String>,
    pub has_output: bool,
    pub parameters: Vec<ParameterDescriptor>,
}

impl OperatorMetadata {
    /// A source operator: no inputs, one output.
    pub fn new(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            description: String::new(),
            min_inputs: 0,
            max_inputs: Some(0),
            source_descriptors: Vec::new(),
            has_output: true,
            parameters: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_inputs(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_inputs = min;
        self.max_inputs = max;
        self
    }

    pub fn with_sources(mut self, names: &[&str]) -> Self {
        self.source_descriptors = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn without_output(mut self) -> Self {
        self.has_output = false;
        self
    }

    pub fn accepts_inputs(&self) -> bool {
        self.max_inputs != Some(0)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_inputs.is_none()
    }
}

/// Source products bound for one computation.
#[derive(Debug, Clone, Default)]
pub struct SourceProducts {
    named: Vec<(String, Arc<Product>)>,
    extra: Vec<Arc<Product>>,
}

impl SourceProducts {
    pub fn get(&self, name: &str) -> Option<&Arc<Product>> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    /// The variable-length tail bound beyond the named descriptors.
    pub fn extras(&self) -> &[Arc<Product>] {
        &self.extra
    }

    /// All bound products: named ones in descriptor order, then the tail.
    pub fn all(&self) -> impl Iterator<Item = &Arc<Product>> {
        self.named.iter().map(|(_, p)| p).chain(self.extra.iter())
    }

    pub fn len(&self) -> usize {
        self.named.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The computation behind a node.
pub trait Operator: Send + Sync {
    fn metadata(&self) -> &OperatorMetadata;

    /// Computes the target product. May fail; failures mark the node as `Error`.
    fn compute(
        &self,
        sources: &SourceProducts,
        parameters: &ParamMap,
    ) -> Result<Product, OperatorError>;

    /// Creates the parameter form edited by the user for a new node.
    fn create_form(&self) -> Box<dyn ParameterForm> {
        Box::new(SimpleForm::new(self.metadata().parameters.clone()))
    }
}

/// Execution context of one node: accumulates source and parameter bindings
/// and runs the operator on request.
pub struct OperatorContext {
    operator: Arc<dyn Operator>,
    sources: SourceProducts,
    parameters: ParamMap,
}

impl OperatorContext {
    pub fn new(operator: Arc<dyn Operator>) -> Self {
        Self {
            operator,
            sources: SourceProducts::default(),
            parameters: ParamMap::new(),
        }
    }

    pub fn operator(&self) -> &Arc<dyn Operator> {
        &self.operator
    }

    pub fn metadata(&self) -> &OperatorMetadata {
        self.operator.metadata()
    }

    /// Drops all bindings from a previous run.
    pub fn reset(&mut self) {
        self.sources = SourceProducts::default();
        self.parameters.clear();
    }

    pub fn set_source_product(&mut self, name: &str, product: Arc<Product>) {
        match self.sources.named.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = product,
            None => self.sources.named.push((name.to_string(), product)),
        }
    }

    pub fn set_source_products(&mut self, products: Vec<Arc<Product>>) {
        self.sources.extra = products;
    }

    pub fn set_parameter(&mut self, name: &str, value: ParamValue) {
        self.parameters.insert(name.to_string(), value);
    }

    pub fn sources(&self) -> &SourceProducts {
        &self.sources
    }

    /// Runs the operator against the current bindings.
    pub fn target_product(&self) -> Result<Product, OperatorError> {
        self.operator.compute(&self.sources, &self.parameters)
    }
}
