use super::{ParameterDescriptor, Product};
use crate::error::FormError;
use crate::value::{ParamMap, ParamValue};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Ok,
    Warning,
    Error,
}

/// Outcome of validating a parameter form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidation {
    pub state: FormState,
    pub message: String,
}

impl FormValidation {
    pub fn ok() -> Self {
        Self {
            state: FormState::Ok,
            message: String::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            state: FormState::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: FormState::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.state == FormState::Ok
    }
}

/// The editable parameter panel of a node.
///
/// Edits made through [`set_parameter`](ParameterForm::set_parameter) stay pending
/// until [`update_parameters`](ParameterForm::update_parameters) commits them;
/// [`parameters`](ParameterForm::parameters) only ever reports committed values.
pub trait ParameterForm: Send {
    fn validate_parameters(&self) -> FormValidation;

    fn update_parameters(&mut self);

    fn parameters(&self) -> ParamMap;

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), FormError>;

    /// Informs the form about the products currently feeding the node.
    fn set_source_products(&mut self, _products: &[Option<Arc<Product>>]) {}

    /// Serializes the committed parameters into the node's persisted configuration.
    fn to_config(&self) -> Result<ParamMap, FormError>;
}

/// Form driven entirely by an operator's parameter descriptors.
#[derive(Debug, Clone)]
pub struct SimpleForm {
    descriptors: Vec<ParameterDescriptor>,
    pending: ParamMap,
    committed: ParamMap,
    source_names: Vec<Option<String>>,
}

impl SimpleForm {
    pub fn new(descriptors: Vec<ParameterDescriptor>) -> Self {
        let committed: ParamMap = descriptors
            .iter()
            .map(|d| (d.name.clone(), d.default.clone()))
            .collect();
        Self {
            descriptors,
            pending: committed.clone(),
            committed,
            source_names: Vec::new(),
        }
    }

    /// Names of the upstream products last pushed into the form; `None` for
    /// inputs without a product yet.
    pub fn source_names(&self) -> &[Option<String>] {
        &self.source_names
    }

    pub fn has_pending_edits(&self) -> bool {
        self.pending != self.committed
    }
}

impl ParameterForm for SimpleForm {
    fn validate_parameters(&self) -> FormValidation {
        let mut warning = None;
        for descriptor in &self.descriptors {
            let value = self
                .committed
                .get(&descriptor.name)
                .unwrap_or(&ParamValue::Null);
            if !value.matches(descriptor.kind) {
                return FormValidation::error(format!(
                    "Parameter `{}` expects {:?} but was `{}`",
                    descriptor.name, descriptor.kind, value
                ));
            }
            if descriptor.required && value.is_empty() && warning.is_none() {
                warning = Some(FormValidation::warning(format!(
                    "Parameter `{}` is not set",
                    descriptor.name
                )));
            }
        }
        warning.unwrap_or_else(FormValidation::ok)
    }

    fn update_parameters(&mut self) {
        self.committed = self.pending.clone();
    }

    fn parameters(&self) -> ParamMap {
        self.committed.clone()
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), FormError> {
        if !self.descriptors.iter().any(|d| d.name == name) {
            return Err(FormError::UnknownParameter(name.to_string()));
        }
        self.pending.insert(name.to_string(), value);
        Ok(())
    }

    fn set_source_products(&mut self, products: &[Option<Arc<Product>>]) {
        self.source_names = products
            .iter()
            .map(|p| p.as_ref().map(|p| p.name.clone()))
            .collect();
    }

    fn to_config(&self) -> Result<ParamMap, FormError> {
        for (name, value) in &self.committed {
            if let Some(n) = value.find_non_finite() {
                return Err(FormError::NotSerializable {
                    name: name.clone(),
                    reason: format!("{} is not a finite number", n),
                });
            }
        }
        Ok(self.committed.clone())
    }
}
