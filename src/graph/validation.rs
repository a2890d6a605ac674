use super::node::GraphNode;
use crate::notify::NotificationSink;
use crate::operator::{FormState, Product};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Cached outcome of a node's last validation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationStatus {
    /// Never validated.
    Unchecked,
    /// Produced an output product.
    Validated,
    /// The form is invalid, the configuration could not be serialized, or the
    /// computation failed.
    Error,
    /// Inputs are incomplete or an upstream node has no output yet.
    Warning,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValidationStatus::Unchecked => "UNCHECKED",
            ValidationStatus::Validated => "VALIDATED",
            ValidationStatus::Error => "ERROR",
            ValidationStatus::Warning => "WARNING",
        };
        write!(f, "{}", label)
    }
}

const INCOMPLETE_MESSAGE: &str = "Some input products are missing. Node can not be validated";

impl GraphNode {
    /// Commits pending form edits and reports whether the committed parameters
    /// differ from the last snapshot. The snapshot is refreshed either way.
    pub(super) fn check_changes(&mut self) -> bool {
        self.form.update_parameters();
        let update = self.form.parameters();
        let changed = update != self.configuration;
        self.configuration = update;
        changed
    }

    /// Pushes upstream products into the form when the connections changed.
    pub(super) fn update_sources(&mut self, inputs: &[Option<Arc<Product>>]) {
        if !self.changed {
            return;
        }
        self.form.set_source_products(inputs);
        self.form.update_parameters();
        self.changed = false;
        self.recompute_needed = true;
    }

    /// Marks the node as broken without recomputing anything.
    pub(super) fn invalidate(&mut self) {
        self.status = ValidationStatus::Warning;
        self.recompute_needed = true;
    }

    fn incomplete(&mut self, sink: &dyn NotificationSink) -> ValidationStatus {
        self.output = None;
        sink.warning(&self.name, INCOMPLETE_MESSAGE);
        self.status = ValidationStatus::Warning;
        self.status
    }

    /// Recomputes the node's output from the cached outputs of its producers.
    ///
    /// `inputs[i]` is the cached output of the producer in slot `i`.
    pub(super) fn recompute_output(
        &mut self,
        inputs: &[Option<Arc<Product>>],
        sink: &dyn NotificationSink,
    ) -> ValidationStatus {
        let (min_inputs, unbounded, descriptors) = {
            let metadata = self.metadata();
            (
                metadata.min_inputs,
                metadata.is_unbounded(),
                metadata.source_descriptors.clone(),
            )
        };
        if self.incoming.len() < min_inputs {
            return self.incomplete(sink);
        }

        self.form.update_parameters();
        self.recompute_needed = false;
        self.configuration = self.form.parameters();

        let check = self.form.validate_parameters();
        match check.state {
            FormState::Ok => {}
            FormState::Warning => {
                self.output = None;
                sink.warning(
                    &self.name,
                    &format!("Operator UI could not be validated `{}`", check.message),
                );
                self.status = ValidationStatus::Warning;
                return self.status;
            }
            FormState::Error => {
                self.output = None;
                sink.error(
                    &self.name,
                    &format!("Operator UI could not be validated `{}`", check.message),
                );
                self.status = ValidationStatus::Error;
                return self.status;
            }
        }

        match self.form.to_config() {
            Ok(config) => self.persisted = config,
            Err(e) => {
                self.output = None;
                sink.error(
                    &self.name,
                    &format!("could not retrieve configuration `{}`", e),
                );
                self.status = ValidationStatus::Error;
                return self.status;
            }
        }

        self.context.reset();
        if inputs.len() < descriptors.len() {
            return self.incomplete(sink);
        }
        for (descriptor, input) in descriptors.iter().zip(inputs) {
            match input {
                Some(product) => self.context.set_source_product(descriptor, product.clone()),
                None => return self.incomplete(sink),
            }
        }
        if inputs.len() > descriptors.len() && unbounded {
            let mut extra = Vec::with_capacity(inputs.len() - descriptors.len());
            for input in &inputs[descriptors.len()..] {
                match input {
                    Some(product) => extra.push(product.clone()),
                    None => return self.incomplete(sink),
                }
            }
            self.context.set_source_products(extra);
        }

        for (name, value) in &self.configuration {
            self.context.set_parameter(name, value.clone());
        }

        match self.context.target_product() {
            Ok(product) => {
                self.output = Some(Arc::new(product));
                sink.ok(&self.name, "Validated");
                self.status = ValidationStatus::Validated;
            }
            Err(e) => {
                sink.error(&self.name, &e.to_string());
                self.output = None;
                self.status = ValidationStatus::Error;
            }
        }
        self.status
    }
}
