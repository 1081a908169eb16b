use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tagql::{Dialect, INTERNAL_TAG};

use crate::error::LintError;
use crate::rules::LintRule;
use crate::schema::Schema;
use crate::validation::RuleFactory;
use crate::validation::rules::{SPECIFIED_RULE_NAMES, specified_rule, specified_rules};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "tagql.toml";

/// What to do when a call site's interpolations cannot be reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationPolicy {
    /// Skip the call site without a diagnostic.
    #[default]
    Silent,
    /// Report the interpolation problem at the offending hole.
    Report,
}

// ----------------------------------------------------------------------------
// Raw configuration, as written in TOML
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LintConfig {
    #[serde(default)]
    pub interpolation: InterpolationPolicy,
    #[serde(default)]
    pub schema: Vec<SchemaEntry>,
    pub rules: Option<RulesConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SchemaEntry {
    pub env: Option<String>,
    pub tag_name: Option<String>,
    pub validators: Option<ValidatorsOption>,
    /// SDL file, relative to the configuration file.
    pub schema_file: Option<PathBuf>,
    pub schema_string: Option<String>,
}

/// `"all"` or an explicit list of rule names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ValidatorsOption {
    Keyword(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(default)]
    pub template_strings: bool,
    #[serde(default)]
    pub named_operations: bool,
    #[serde(default)]
    pub capitalized_type_name: bool,
    #[serde(default)]
    pub no_deprecated_fields: bool,
    pub required_fields: Option<RequiredFieldsOptions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RequiredFieldsOptions {
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl LintConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_file(path: &Path) -> Result<Self, LintError> {
        let text = std::fs::read_to_string(path).map_err(|error| LintError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_toml_str(&text).map_err(|error| LintError::ConfigSyntax {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Validate the configuration and build every schema it names.
    /// Relative schema paths are resolved against `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> Result<ResolvedConfig, LintError> {
        if self.schema.is_empty() {
            return Err(LintError::config(
                "Must specify at least one [[schema]] entry",
            ));
        }
        let settings = self
            .schema
            .iter()
            .map(|entry| entry.resolve(base_dir))
            .collect::<Result<Vec<_>, _>>()?;
        let rules = self.enabled_rules();

        tracing::info!(
            settings = settings.len(),
            rules = ?rules.iter().map(LintRule::id).collect::<Vec<_>>(),
            interpolation = ?self.interpolation,
            "resolved lint configuration"
        );

        Ok(ResolvedConfig {
            settings,
            rules,
            interpolation: self.interpolation,
        })
    }

    fn enabled_rules(&self) -> Vec<LintRule> {
        let Some(rules) = &self.rules else {
            return vec![LintRule::TemplateStrings];
        };
        let mut enabled = Vec::new();
        if rules.template_strings {
            enabled.push(LintRule::TemplateStrings);
        }
        if rules.named_operations {
            enabled.push(LintRule::NamedOperations);
        }
        if let Some(options) = &rules.required_fields {
            enabled.push(LintRule::RequiredFields(options.required_fields.clone()));
        }
        if rules.capitalized_type_name {
            enabled.push(LintRule::CapitalizedTypeName);
        }
        if rules.no_deprecated_fields {
            enabled.push(LintRule::NoDeprecatedFields);
        }
        enabled
    }
}

impl SchemaEntry {
    fn resolve(&self, base_dir: &Path) -> Result<Settings, LintError> {
        let schema = match (&self.schema_string, &self.schema_file) {
            (Some(_), Some(_)) => {
                return Err(LintError::config(
                    "Specify only one of `schema-string` and `schema-file`",
                ));
            }
            (Some(sdl), None) => Some(build_schema(sdl, "schema-string")?),
            (None, Some(file)) => {
                let path = base_dir.join(file);
                let sdl = std::fs::read_to_string(&path).map_err(|error| LintError::Io {
                    path: path.clone(),
                    error,
                })?;
                Some(build_schema(&sdl, &path.display().to_string())?)
            }
            (None, None) => None,
        };

        let env = match &self.env {
            Some(name) => name
                .parse::<Dialect>()
                .map_err(|e| LintError::config(e.to_string()))?,
            None => Dialect::Unmarked,
        };

        let tag_name = match &self.tag_name {
            Some(tag) => tag.clone(),
            None => default_tag_name(env).to_string(),
        };

        let validators = match &self.validators {
            None => default_validators(env),
            Some(ValidatorsOption::Keyword(keyword)) if keyword == "all" => specified_rules(),
            Some(ValidatorsOption::Keyword(other)) => {
                return Err(LintError::config(format!(
                    "Invalid option for validators: \"{}\". Use \"all\" or a list of rule names.",
                    other
                )));
            }
            Some(ValidatorsOption::List(names)) => names
                .iter()
                .map(|name| {
                    specified_rule(name).ok_or_else(|| {
                        LintError::config(format!("Unknown validator \"{}\".", name))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Settings {
            env,
            tag_name,
            schema,
            validators,
        })
    }
}

fn build_schema(sdl: &str, origin: &str) -> Result<Arc<Schema>, LintError> {
    Schema::from_sdl(sdl)
        .map(Arc::new)
        .map_err(|error| LintError::Schema {
            origin: origin.to_string(),
            error,
        })
}

/// Tag a dialect's templates are written with when none is configured.
pub fn default_tag_name(env: Dialect) -> &'static str {
    match env {
        Dialect::Relay => "Relay.QL",
        Dialect::Literal => INTERNAL_TAG,
        Dialect::Unmarked | Dialect::Apollo | Dialect::Lokka => "gql",
    }
}

/// Rules that cannot hold for a dialect's templates in isolation.
fn excluded_validators(env: Dialect) -> &'static [&'static str] {
    match env {
        Dialect::Unmarked => &[],
        Dialect::Apollo | Dialect::Lokka | Dialect::Literal => {
            &["KnownFragmentNames", "NoUnusedFragments"]
        }
        Dialect::Relay => &[
            "KnownDirectives",
            "KnownFragmentNames",
            "NoUndefinedVariables",
            "NoUnusedFragments",
            "ProvidedNonNullArguments",
            "ScalarLeafs",
        ],
    }
}

/// The validator set used when a schema entry does not list any.
pub fn default_validators(env: Dialect) -> Vec<RuleFactory> {
    let excluded = excluded_validators(env);
    SPECIFIED_RULE_NAMES
        .iter()
        .copied()
        .filter(|name| !excluded.contains(name))
        .filter_map(specified_rule)
        .collect()
}

// ----------------------------------------------------------------------------
// Resolved configuration
// ----------------------------------------------------------------------------

/// One resolved `[[schema]]` entry.
#[derive(Clone)]
pub struct Settings {
    pub env: Dialect,
    pub tag_name: String,
    pub schema: Option<Arc<Schema>>,
    pub validators: Vec<RuleFactory>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("env", &self.env)
            .field("tag_name", &self.tag_name)
            .field("schema", &self.schema.is_some())
            .field(
                "validators",
                &self.validators.iter().map(RuleFactory::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A validated configuration, ready to lint with.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: Vec<Settings>,
    pub rules: Vec<LintRule>,
    pub interpolation: InterpolationPolicy,
}
