//! An ordered list of configured transforms.

use std::fmt;

use tracing::info;

use crate::config::TransformConfig;
use crate::error::{ConfigError, TransformError};
use crate::model::VersionedDocument;
use crate::registry::{Transform, TransformRegistry};

/// Configured transforms, applied in configuration order.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Build a pipeline from a configuration.
    ///
    /// Every name is looked up before anything is configured, so an unknown
    /// transform fails the whole pipeline.
    pub fn from_config(
        registry: &TransformRegistry,
        config: &TransformConfig,
    ) -> Result<Self, ConfigError> {
        let transforms = config
            .entries
            .iter()
            .map(|entry| {
                registry
                    .get(&entry.name)
                    .ok_or_else(|| ConfigError::UnknownTransform {
                        name: entry.name.clone(),
                        installed: registry.names().into_iter().map(String::from).collect(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let steps = transforms
            .into_iter()
            .zip(&config.entries)
            .map(|(transform, entry)| transform.configure(&entry.payload))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { steps })
    }

    /// Append an already configured transform.
    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.steps.push(transform);
    }

    /// Apply every step in order, stopping at the first failure. Edits made
    /// by earlier steps are kept.
    pub fn apply(&self, doc: &mut VersionedDocument) -> Result<(), TransformError> {
        for (step, transform) in self.steps.iter().enumerate() {
            info!(step, transform = transform.name(), "applying transform");
            transform.transform(doc)?;
        }
        Ok(())
    }

    /// Descriptions of every step, separated by blank lines.
    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|transform| format!("{}:\n{}", transform.name(), transform.describe()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|transform| transform.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.names())
            .finish()
    }
}
