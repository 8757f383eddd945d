//! Template helpers
//!
//! Naming and type helpers resolve the mapper and language from the
//! `target` object of the render data, so one engine serves every target.

use crate::lang::{LanguageRegistry, LanguageSupport};
use crate::mapping::{self, map_type};
use crate::naming::{self, NameMapper};
use crate::types::{SchemaColumn, SchemaTable};
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, RenderContext, RenderError,
    ScopedJson,
};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::sync::Arc;

handlebars_helper!(lower: |s: str| s.to_lowercase());
handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(title: |s: str| naming::title(s));
handlebars_helper!(camelize: |s: str| naming::camelize(s));
handlebars_helper!(underscore: |s: str| naming::underscore(s));
handlebars_helper!(singularize: |s: str| naming::singularize(s));
handlebars_helper!(pluralize: |s: str| naming::pluralize(s));
handlebars_helper!(diff_pluralize: |word: str, suffix: str| naming::diff_pluralize(word, suffix));
handlebars_helper!(comment: |prefix: str, text: str| continue_comment(prefix, text));

/// Lines of `text` joined so every line after the first starts with the
/// line-comment `prefix`
fn continue_comment(prefix: &str, text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(&format!("\n{} ", prefix))
}

/// Register every helper on `handlebars`
pub fn register_helpers(handlebars: &mut Handlebars<'static>, registry: Arc<LanguageRegistry>) {
    handlebars.register_helper("lower", Box::new(lower));
    handlebars.register_helper("upper", Box::new(upper));
    handlebars.register_helper("title", Box::new(title));
    handlebars.register_helper("camelize", Box::new(camelize));
    handlebars.register_helper("underscore", Box::new(underscore));
    handlebars.register_helper("singularize", Box::new(singularize));
    handlebars.register_helper("pluralize", Box::new(pluralize));
    handlebars.register_helper("diff_pluralize", Box::new(diff_pluralize));
    handlebars.register_helper("comment", Box::new(comment));
    handlebars.register_helper("table_mapper", Box::new(MapperHelper("table_mapper")));
    handlebars.register_helper("column_mapper", Box::new(MapperHelper("column_mapper")));
    handlebars.register_helper("single_pkey", Box::new(SinglePkeyHelper));
    handlebars.register_helper("created_column", Box::new(CreatedColumnHelper));
    handlebars.register_helper("ident", Box::new(IdentHelper(Arc::clone(&registry))));
    handlebars.register_helper("type", Box::new(TypeHelper(Arc::clone(&registry))));
    handlebars.register_helper("tag", Box::new(TagHelper(registry)));
}

fn str_param<'a>(h: &'a Helper, index: usize) -> Result<&'a str, RenderError> {
    h.param(index)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| {
            RenderError::new(format!(
                "{} helper requires a string parameter at position {}",
                h.name(),
                index
            ))
        })
}

fn object_param<T: DeserializeOwned>(h: &Helper, index: usize, what: &str) -> Result<T, RenderError> {
    let value = h.param(index).map(|p| p.value()).ok_or_else(|| {
        RenderError::new(format!("{} helper requires a {} parameter", h.name(), what))
    })?;
    serde_json::from_value(value.clone()).map_err(|e| {
        RenderError::new(format!("{} helper got an invalid {}: {}", h.name(), what, e))
    })
}

fn target_field<'a>(ctx: &'a Context, field: &str) -> Option<&'a str> {
    ctx.data()
        .pointer(&format!("/target/{}", field))
        .and_then(Json::as_str)
}

fn language_of(
    registry: &LanguageRegistry,
    ctx: &Context,
    helper: &str,
) -> Result<Arc<dyn LanguageSupport>, RenderError> {
    let name = target_field(ctx, "language").unwrap_or_default();
    registry.get_language(name).ok_or_else(|| {
        RenderError::new(format!("{} helper needs a known language, got '{}'", helper, name))
    })
}

fn derived<'reg, 'rc>(value: String) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
    Ok(ScopedJson::Derived(Json::String(value)))
}

/// `table_mapper name` / `column_mapper name`
struct MapperHelper(&'static str);

impl HelperDef for MapperHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let name = str_param(h, 0)?;
        let mapper = NameMapper::from(target_field(ctx, self.0).unwrap_or_default());
        derived(mapper.table_to_obj(name))
    }
}

/// `single_pkey table`
struct SinglePkeyHelper;

impl HelperDef for SinglePkeyHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let table: SchemaTable = object_param(h, 0, "table")?;
        derived(mapping::single_pkey(&table))
    }
}

/// `created_column table`
struct CreatedColumnHelper;

impl HelperDef for CreatedColumnHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let table: SchemaTable = object_param(h, 0, "table")?;
        derived(mapping::created_column(&table))
    }
}

/// `ident name`, escaping reserved words of the target language
struct IdentHelper(Arc<LanguageRegistry>);

impl HelperDef for IdentHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let name = str_param(h, 0)?;
        let language = target_field(ctx, "language").and_then(|l| self.0.get_language(l));
        match language {
            Some(language) => derived(language.escape_ident(name)),
            None => derived(name.to_string()),
        }
    }
}

/// `type col`
struct TypeHelper(Arc<LanguageRegistry>);

impl HelperDef for TypeHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let column: SchemaColumn = object_param(h, 0, "column")?;
        let language = language_of(&self.0, ctx, "type")?;
        derived(language.type_name(map_type(&column.sql_type)).to_string())
    }
}

/// `tag table col [json]`
struct TagHelper(Arc<LanguageRegistry>);

impl HelperDef for TagHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let table: SchemaTable = object_param(h, 0, "table")?;
        let column: SchemaColumn = object_param(h, 1, "column")?;
        let with_json = h
            .param(2)
            .and_then(|p| p.value().as_bool())
            .unwrap_or(false);
        let language = language_of(&self.0, ctx, "tag")?;

        let mut tags = Vec::with_capacity(2);
        if with_json {
            tags.push(language.json_tag(&column));
        }
        let tokens = mapping::tag_tokens(&table, &column);
        if !tokens.is_empty() {
            tags.push(language.annotate(&tokens));
        }
        if tags.is_empty() {
            return derived(String::new());
        }
        derived(language.join_tags(&tags))
    }
}
