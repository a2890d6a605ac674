use super::{Operator, OperatorMetadata, ParameterDescriptor, Product, SourceProducts};
use crate::error::OperatorError;
use crate::value::{ParamKind, ParamMap, ParamValue};
use ahash::AHashMap;
use std::sync::Arc;

const SOURCE_PRODUCT: &str = "sourceProduct";

fn text_param<'a>(parameters: &'a ParamMap, name: &str) -> Result<&'a str, OperatorError> {
    parameters
        .get(name)
        .and_then(ParamValue::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| OperatorError::MissingParameter(name.to_string()))
}

fn number_param(parameters: &ParamMap, name: &str, default: f64) -> f64 {
    parameters
        .get(name)
        .and_then(ParamValue::as_f64)
        .unwrap_or(default)
}

fn source<'a>(sources: &'a SourceProducts, name: &str) -> Result<&'a Arc<Product>, OperatorError> {
    sources
        .get(name)
        .ok_or_else(|| OperatorError::MissingSource(name.to_string()))
}

/// Strips directories and the extension from a product path.
fn product_name(path: &str) -> String {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

struct ReadOperator {
    metadata: OperatorMetadata,
}

impl ReadOperator {
    fn new() -> Self {
        Self {
            metadata: OperatorMetadata::new("Read", "Input-Output")
                .with_description("Reads a data product from disk")
                .with_parameter(ParameterDescriptor::required("file", ParamKind::Text))
                .with_parameter(ParameterDescriptor::optional(
                    "formatName",
                    ParamKind::Text,
                    ParamValue::from("auto"),
                )),
        }
    }
}

impl Operator for ReadOperator {
    fn metadata(&self) -> &OperatorMetadata {
        &self.metadata
    }

    fn compute(&self, _: &SourceProducts, parameters: &ParamMap) -> Result<Product, OperatorError> {
        let file = text_param(parameters, "file")?;
        let mut product = Product::new(product_name(file), "Read");
        product
            .attributes
            .insert("file".to_string(), ParamValue::from(file));
        if let Some(format) = parameters.get("formatName") {
            product
                .attributes
                .insert("formatName".to_string(), format.clone());
        }
        Ok(product)
    }
}

struct WriteOperator {
    metadata: OperatorMetadata,
}

impl WriteOperator {
    fn new() -> Self {
        Self {
            metadata: OperatorMetadata::new("Write", "Input-Output")
                .with_description("Writes a data product to disk")
                .with_inputs(1, Some(1))
                .with_sources(&[SOURCE_PRODUCT])
                .with_parameter(ParameterDescriptor::required("file", ParamKind::Text))
                .with_parameter(ParameterDescriptor::optional(
                    "formatName",
                    ParamKind::Text,
                    ParamValue::from("BEAM-DIMAP"),
                ))
                .without_output(),
        }
    }
}

impl Operator for WriteOperator {
    fn metadata(&self) -> &OperatorMetadata {
        &self.metadata
    }

    fn compute(
        &self,
        sources: &SourceProducts,
        parameters: &ParamMap,
    ) -> Result<Product, OperatorError> {
        let input = source(sources, SOURCE_PRODUCT)?;
        let file = text_param(parameters, "file")?;
        let mut product = Product::new(product_name(file), "Write");
        product.sources.push(input.name.clone());
        product.attributes = input.attributes.clone();
        product
            .attributes
            .insert("file".to_string(), ParamValue::from(file));
        Ok(product)
    }
}

struct FilterOperator {
    metadata: OperatorMetadata,
}

impl FilterOperator {
    fn new() -> Self {
        Self {
            metadata: OperatorMetadata::new("Filter", "Raster")
                .with_description("Applies a convolution or non-linear filter to every band")
                .with_inputs(1, Some(1))
                .with_sources(&[SOURCE_PRODUCT])
                .with_parameter(ParameterDescriptor::optional(
                    "filterName",
                    ParamKind::Text,
                    ParamValue::from("Arithmetic Mean 3x3"),
                ))
                .with_parameter(ParameterDescriptor::optional(
                    "iterations",
                    ParamKind::Number,
                    ParamValue::Number(1.0),
                )),
        }
    }
}

impl Operator for FilterOperator {
    fn metadata(&self) -> &OperatorMetadata {
        &self.metadata
    }

    fn compute(
        &self,
        sources: &SourceProducts,
        parameters: &ParamMap,
    ) -> Result<Product, OperatorError> {
        let input = source(sources, SOURCE_PRODUCT)?;
        let filter = text_param(parameters, "filterName")?;
        let iterations = number_param(parameters, "iterations", 1.0);
        if iterations < 1.0 || iterations.fract() != 0.0 {
            return Err(OperatorError::InvalidParameter {
                name: "iterations".to_string(),
                message: format!("must be a positive integer, got {}", iterations),
            });
        }

        let mut product = Product::new(format!("{}_filtered", input.name), "Filter");
        product.sources.push(input.name.clone());
        product.attributes = input.attributes.clone();
        product
            .attributes
            .insert("filterName".to_string(), ParamValue::from(filter));
        product
            .attributes
            .insert("iterations".to_string(), ParamValue::Number(iterations));
        Ok(product)
    }
}

struct SubsetOperator {
    metadata: OperatorMetadata,
}

impl SubsetOperator {
    fn new() -> Self {
        Self {
            metadata: OperatorMetadata::new("Subset", "Raster")
                .with_description("Extracts a spatial region from a product")
                .with_inputs(1, Some(1))
                .with_sources(&[SOURCE_PRODUCT])
                .with_parameter(ParameterDescriptor::optional(
                    "region",
                    ParamKind::List,
                    ParamValue::Null,
                ))
                .with_parameter(ParameterDescriptor::optional(
                    "subSamplingX",
                    ParamKind::Number,
                    ParamValue::Number(1.0),
                ))
                .with_parameter(ParameterDescriptor::optional(
                    "subSamplingY",
                    ParamKind::Number,
                    ParamValue::Number(1.0),
                )),
        }
    }

    /// Region is `[x, y, width, height]` with non-negative offsets and a non-empty extent.
    fn region(parameters: &ParamMap) -> Result<Option<Vec<f64>>, OperatorError> {
        let invalid = |message: &str| OperatorError::InvalidParameter {
            name: "region".to_string(),
            message: message.to_string(),
        };
        let items = match parameters.get("region") {
            None | Some(ParamValue::Null) => return Ok(None),
            Some(ParamValue::List(items)) => items,
            Some(_) => return Err(invalid("expected a list of four numbers")),
        };
        let region: Vec<f64> = items.iter().filter_map(ParamValue::as_f64).collect();
        if region.len() != 4 || items.len() != 4 {
            return Err(invalid("expected a list of four numbers"));
        }
        if region[0] < 0.0 || region[1] < 0.0 {
            return Err(invalid("offsets must not be negative"));
        }
        if region[2] <= 0.0 || region[3] <= 0.0 {
            return Err(invalid("width and height must be positive"));
        }
        Ok(Some(region))
    }
}

impl Operator for SubsetOperator {
    fn metadata(&self) -> &OperatorMetadata {
        &self.metadata
    }

    fn compute(
        &self,
        sources: &SourceProducts,
        parameters: &ParamMap,
    ) -> Result<Product, OperatorError> {
        let input = source(sources, SOURCE_PRODUCT)?;
        let region = Self::region(parameters)?;
        for name in ["subSamplingX", "subSamplingY"] {
            let step = number_param(parameters, name, 1.0);
            if step < 1.0 {
                return Err(OperatorError::InvalidParameter {
                    name: name.to_string(),
                    message: format!("must be at least 1, got {}", step),
                });
            }
        }

        let mut product = Product::new(format!("subset_of_{}", input.name), "Subset");
        product.sources.push(input.name.clone());
        product.attributes = input.attributes.clone();
        if let Some(region) = region {
            product.attributes.insert(
                "region".to_string(),
                ParamValue::List(region.into_iter().map(ParamValue::Number).collect()),
            );
        }
        Ok(product)
    }
}

struct BandMergeOperator {
    metadata: OperatorMetadata,
}

impl BandMergeOperator {
    fn new() -> Self {
        Self {
            metadata: OperatorMetadata::new("BandMerge", "Raster")
                .with_description("Merges the bands of several compatible products")
                .with_inputs(1, None)
                .with_sources(&[SOURCE_PRODUCT])
                .with_parameter(ParameterDescriptor::optional(
                    "geographicError",
                    ParamKind::Number,
                    ParamValue::Number(1.0e-5),
                )),
        }
    }
}

impl Operator for BandMergeOperator {
    fn metadata(&self) -> &OperatorMetadata {
        &self.metadata
    }

    fn compute(
        &self,
        sources: &SourceProducts,
        parameters: &ParamMap,
    ) -> Result<Product, OperatorError> {
        let first = source(sources, SOURCE_PRODUCT)?;
        let tolerance = number_param(parameters, "geographicError", 1.0e-5);
        if tolerance < 0.0 {
            return Err(OperatorError::InvalidParameter {
                name: "geographicError".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        let mut product = Product::new(format!("{}_merged", first.name), "BandMerge");
        product.sources = sources.all().map(|p| p.name.clone()).collect();
        product.attributes = first.attributes.clone();
        product.attributes.insert(
            "mergedCount".to_string(),
            ParamValue::Number(sources.len() as f64),
        );
        Ok(product)
    }
}

/// Defines registration and by-name creation for all built-in operators.
macro_rules! define_builtin_operators {
    ( $( ($struct_name:ident, $op_name:expr) ),* $(,)? ) => {
        pub(super) fn register_builtin_operators(registry: &mut AHashMap<String, Arc<dyn Operator>>) {
            $( registry.insert($op_name.to_string(), Arc::new($struct_name::new())); )*
        }

        pub(super) fn create_builtin_by_name(name: &str) -> Option<Arc<dyn Operator>> {
            match name {
                $( $op_name => Some(Arc::new($struct_name::new())), )*
                _ => None,
            }
        }
    };
}

define_builtin_operators! {
    (ReadOperator, "Read"),
    (WriteOperator, "Write"),
    (FilterOperator, "Filter"),
    (SubsetOperator, "Subset"),
    (BandMergeOperator, "BandMerge"),
}
