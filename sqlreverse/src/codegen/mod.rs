//! Template engine for code generation
//!
//! Wraps a handlebars registry with the generation helpers registered and
//! HTML escaping disabled. Compiled templates are cached by name.

use crate::lang::LanguageRegistry;
use crate::{Result, ReverseError};
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;

pub mod helpers;
pub mod templates;

/// Named, compiled templates plus the helper set
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create an engine whose `type`, `tag` and `ident` helpers resolve
    /// languages through `registry`
    pub fn new(registry: Arc<LanguageRegistry>) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        helpers::register_helpers(&mut handlebars, registry);
        Self { handlebars }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Compile `content` under `name`, replacing any earlier template
    pub fn compile(&mut self, name: &str, content: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, content)
            .map_err(|e| ReverseError::TemplateCompile {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        log::debug!("Compiled template '{}'", name);
        Ok(())
    }

    /// Compile `content` under `name` unless it is already cached
    pub fn compile_once(&mut self, name: &str, content: &str) -> Result<()> {
        if self.has_template(name) {
            return Ok(());
        }
        self.compile(name, content)
    }

    /// Render a compiled template
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(|e| ReverseError::Render {
                template: name.to_string(),
                message: e.to_string(),
            })
    }
}
