use std::path::Path;

use tagql::document::Pos;
use tagql::parser::parse_document;
use tagql::position::{Location, map_location};
use tagql::{InterpolationError, reconstruct};

use crate::error::LintDiagnostic;
use crate::rules::LintRule;
use crate::settings::{InterpolationPolicy, ResolvedConfig, Settings};
use crate::source::{CallSite, graphql_file_call_site, scan_tagged_templates, tag_matches};
use crate::validation::{RuleFactory, validate};

/// Extensions linted as whole GraphQL documents.
pub const GRAPHQL_EXTENSIONS: [&str; 2] = ["graphql", "gql"];

/// Run one lint rule over one call site. Produces at most one diagnostic:
/// the interpolation problem (when reported), the syntax error, or the
/// first validation error.
pub fn process(
    rule: &str,
    site: &CallSite,
    settings: &Settings,
    validators: &[RuleFactory],
    policy: InterpolationPolicy,
) -> Option<LintDiagnostic> {
    let diagnostic = |message: String, location: Location| LintDiagnostic {
        rule: rule.to_string(),
        message,
        location,
        node: site.span.expression,
    };

    let mut text = match reconstruct(&site.template, settings.env) {
        Ok(text) => text,
        Err(error) => {
            tracing::debug!(
                tag = %site.tag,
                line = site.span.expression.start.line,
                %error,
                "skipping call site"
            );
            return match policy {
                InterpolationPolicy::Silent => None,
                InterpolationPolicy::Report => {
                    Some(diagnostic(error.to_string(), interpolation_location(site, &error)))
                }
            };
        }
    };

    if settings.env.allows_anonymous_fragments() {
        text = name_anonymous_fragment(&text);
    }

    let document = match parse_document(&text) {
        Ok(document) => document,
        Err(error) => {
            let message = error.message.lines().next().unwrap_or_default().to_string();
            return Some(diagnostic(message, locate(site, error.first_location())));
        }
    };

    let schema = settings.schema.as_ref()?;
    let error = validate(schema, &document, validators).into_iter().next()?;
    let location = locate(site, error.locations.first().copied());
    Some(diagnostic(error.message, location))
}

/// Lint one file with every enabled rule. GraphQL files are linted as a
/// single call site; anything else is scanned for tagged templates.
pub fn lint_source(path: &Path, source: &str, config: &ResolvedConfig) -> Vec<LintDiagnostic> {
    let is_graphql = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| GRAPHQL_EXTENSIONS.contains(&ext));
    let sites = if is_graphql {
        vec![graphql_file_call_site(source)]
    } else {
        scan_tagged_templates(source)
    };
    tracing::debug!(path = %path.display(), call_sites = sites.len(), "linting file");

    let mut diagnostics = Vec::new();
    for rule in &config.rules {
        for site in &sites {
            if let Some(settings) = matching_settings(config, site) {
                diagnostics.extend(rule.check(site, settings, config.interpolation));
            }
        }
    }
    diagnostics.sort_by_key(|d| d.location);
    diagnostics
}

/// The first setting whose tag name selects this call site.
fn matching_settings<'c>(config: &'c ResolvedConfig, site: &CallSite) -> Option<&'c Settings> {
    config
        .settings
        .iter()
        .find(|settings| tag_matches(&settings.tag_name, &site.tag))
}

/// Map a GraphQL position back to the file, falling back to the start of
/// the call site.
fn locate(site: &CallSite, pos: Option<Pos>) -> Location {
    pos.map_or(site.span.expression.start, |pos| {
        map_location(pos, &site.span, site.synthetic_tag)
    })
}

fn interpolation_location(site: &CallSite, error: &InterpolationError) -> Location {
    site.template
        .slots()
        .get(error.slot)
        .map_or(site.span.expression.start, |slot| slot.location)
}

/// `fragment on T` is shorthand in some dialects; give the first such
/// fragment a placeholder name so it parses.
fn name_anonymous_fragment(text: &str) -> String {
    const KEYWORD: &str = "fragment";
    let mut search = 0;
    while let Some(found) = text[search..].find(KEYWORD) {
        let start = search + found;
        let after = &text[start + KEYWORD.len()..];
        let rest = after.trim_start();
        if rest.len() < after.len() && rest.starts_with("on") {
            let split = start + KEYWORD.len();
            return format!("{} _{}", &text[..split], &text[split..]);
        }
        search = start + KEYWORD.len();
    }
    text.to_string()
}

impl LintRule {
    /// Lint one call site with this rule's validators, or the setting's
    /// own list when the rule does not replace it.
    pub fn check(
        &self,
        site: &CallSite,
        settings: &Settings,
        policy: InterpolationPolicy,
    ) -> Option<LintDiagnostic> {
        let overrides = self.validators();
        let validators = overrides.as_deref().unwrap_or(&settings.validators);
        process(self.id(), site, settings, validators, policy)
    }
}
