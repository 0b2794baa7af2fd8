use crate::config::Config;
use crate::directive::{Directive, DirectiveSite, GroupFilter, StylesheetBuilder};
use crate::error::Result;
use crate::tokens::{flatten, TokenRecord, TokenScopes};
use crate::utilities::{expand, ClassRecord};

pub const EMPTY_UTILITY_CLASSES_WARNING: &str =
    "no utility classes were generated; check that utilityClasses ids match token groups";

/// Token records and utility classes built once from a [`Config`], ready to
/// replace any number of directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignTokenUtils {
    records: Vec<TokenRecord>,
    classes: Vec<ClassRecord>,
    viewports: Vec<(String, String)>,
    separator: String,
}

impl DesignTokenUtils {
    pub fn new(config: &Config) -> Result<Self> {
        for utility in &config.utility_classes {
            utility.validate()?;
        }
        let scopes = TokenScopes::new(&config.custom_properties);
        let records = flatten(&config.tokens, &scopes)?;
        let classes = expand(&records, &config.utility_classes);
        let viewports = config
            .viewports
            .iter()
            .map(|(label, width)| (label.clone(), width.clone()))
            .collect();

        Ok(Self {
            records,
            classes,
            viewports,
            separator: config.media_query_class_separator.clone(),
        })
    }

    pub fn records(&self) -> &[TokenRecord] {
        &self.records
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    /// Builds the replacement for the directive at `site`.
    ///
    /// `None` means the site is not a directive this engine handles and must
    /// be left in place; `Some` replaces it with the returned nodes, which may
    /// be empty.
    pub fn dispatch<B: StylesheetBuilder>(
        &self,
        site: &DirectiveSite<'_>,
        builder: &mut B,
    ) -> Option<Vec<B::Node>> {
        match Directive::recognize(site)? {
            Directive::CustomProperties(filter) => Some(self.custom_properties(&filter, builder)),
            Directive::UtilityClasses => Some(self.utility_classes(builder)),
        }
    }

    fn custom_properties<B: StylesheetBuilder>(
        &self,
        filter: &GroupFilter,
        builder: &mut B,
    ) -> Vec<B::Node> {
        self.records
            .iter()
            .filter(|record| filter.accepts(record.group.as_deref()))
            .map(|record| builder.declaration(&record.prop, &record.value))
            .collect()
    }

    fn utility_classes<B: StylesheetBuilder>(&self, builder: &mut B) -> Vec<B::Node> {
        if self.classes.is_empty() {
            builder.warn(EMPTY_UTILITY_CLASSES_WARNING);
            return Vec::new();
        }

        let mut nodes = self
            .classes
            .iter()
            .map(|class| class_rule(builder, &class.selector(), class))
            .collect::<Vec<_>>();

        for (label, width) in &self.viewports {
            let rules = self
                .classes
                .iter()
                .filter(|class| !class.skip_viewport_variant)
                .map(|class| {
                    class_rule(builder, &class.viewport_selector(label, &self.separator), class)
                })
                .collect::<Vec<_>>();
            if rules.is_empty() {
                continue;
            }
            nodes.push(builder.conditional_block(&format!("(min-width: {})", width), rules));
        }

        nodes
    }
}

fn class_rule<B: StylesheetBuilder>(
    builder: &mut B,
    selector: &str,
    class: &ClassRecord,
) -> B::Node {
    let declarations: Vec<B::Node> = class
        .properties
        .iter()
        .map(|property| builder.declaration(property, &class.value))
        .collect();
    builder.rule(selector, declarations)
}

#[cfg(test)]
mod tests {
    use super::{DesignTokenUtils, EMPTY_UTILITY_CLASSES_WARNING};
    use crate::config::{Config, CustomPropertyScope, Properties, UtilityClassConfig};
    use crate::directive::{DirectiveSite, StylesheetBuilder, DIRECTIVE_NAME};
    use crate::error::TokenError;
    use serde_json::json;

    #[derive(Default)]
    struct TextBuilder {
        warnings: Vec<String>,
    }

    impl StylesheetBuilder for TextBuilder {
        type Node = String;

        fn declaration(&mut self, property: &str, value: &str) -> String {
            format!("{}:{}", property, value)
        }

        fn rule(&mut self, selector: &str, declarations: Vec<String>) -> String {
            format!("{}{{{}}}", selector, declarations.join(";"))
        }

        fn conditional_block(&mut self, condition: &str, rules: Vec<String>) -> String {
            format!("@media {}{{{}}}", condition, rules.concat())
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
    }

    fn config(value: serde_json::Value) -> Config {
        serde_json::from_value(value).expect("config should parse")
    }

    fn run(engine: &DesignTokenUtils, params: &str, at_root: bool) -> Option<Vec<String>> {
        let site = DirectiveSite {
            name: DIRECTIVE_NAME,
            params,
            at_root,
        };
        engine.dispatch(&site, &mut TextBuilder::default())
    }

    fn grouped_engine() -> DesignTokenUtils {
        DesignTokenUtils::new(&config(json!({
            "tokens": {
                "color": { "accent": "#ff0" },
                "fontFamily": { "base": "sans-serif", "mono": "monospace" },
            },
            "customProperties": [{ "id": "color" }, { "id": "fontFamily", "group": "font" }],
        })))
        .expect("engine")
    }

    #[test]
    fn emits_ungrouped_properties_by_default() {
        let output = run(&grouped_engine(), "(custom-properties)", false);
        assert_eq!(output, Some(vec!["--color-accent:#ff0".to_string()]));
    }

    #[test]
    fn emits_requested_group() {
        let output = run(&grouped_engine(), "(custom-properties: font)", false);
        assert_eq!(
            output,
            Some(vec![
                "--font-family-base:sans-serif".to_string(),
                "--font-family-mono:monospace".to_string(),
            ])
        );
    }

    #[test]
    fn emits_all_groups() {
        let output = run(&grouped_engine(), "(custom-properties: all)", false);
        assert_eq!(output.map(|nodes| nodes.len()), Some(3));
    }

    #[test]
    fn unknown_group_replaces_with_nothing() {
        let output = run(&grouped_engine(), "(custom-properties: motion)", false);
        assert_eq!(output, Some(Vec::new()));
    }

    #[test]
    fn leaves_misplaced_directives_untouched() {
        let engine = grouped_engine();
        assert_eq!(run(&engine, "(custom-properties)", true), None);
        assert_eq!(run(&engine, "(utility-classes)", false), None);
    }

    #[test]
    fn builds_viewport_variants_in_order() {
        let engine = DesignTokenUtils::new(&config(json!({
            "tokens": { "color": { "accent": "#ff0" }, "space": { "m": "1rem" } },
            "breakpoints": { "sm": "320px", "md": "640px" },
            "utilityClasses": [
                { "id": "color", "prefix": "text", "property": "color", "responsiveVariants": true },
                { "id": "space", "property": "gap" },
            ],
        })))
        .expect("engine");
        let output = run(&engine, "(utility-classes)", true).expect("replacement");
        assert_eq!(
            output,
            vec![
                ".text-accent{color:var(--color-accent)}".to_string(),
                ".space-m{gap:var(--space-m)}".to_string(),
                "@media (min-width: 320px){.sm-text-accent{color:var(--color-accent)}}".to_string(),
                "@media (min-width: 640px){.md-text-accent{color:var(--color-accent)}}".to_string(),
            ]
        );
    }

    #[test]
    fn skips_viewports_without_responsive_classes() {
        let engine = DesignTokenUtils::new(&config(json!({
            "tokens": { "space": { "m": "1rem" } },
            "viewports": { "sm": "320px", "md": "640px" },
            "utilityClasses": [{ "id": "space", "property": "gap" }],
        })))
        .expect("engine");
        let output = run(&engine, "(utility-classes)", true).expect("replacement");
        assert_eq!(output, vec![".space-m{gap:var(--space-m)}".to_string()]);
    }

    #[test]
    fn warns_when_no_utility_classes_exist() {
        let engine = grouped_engine();
        let mut builder = TextBuilder::default();
        let site = DirectiveSite {
            name: DIRECTIVE_NAME,
            params: "(utility-classes)",
            at_root: true,
        };
        let output = engine.dispatch(&site, &mut builder);
        assert_eq!(output, Some(Vec::new()));
        assert_eq!(builder.warnings, vec![EMPTY_UTILITY_CLASSES_WARNING.to_string()]);
    }

    #[test]
    fn var_references_match_declared_properties() {
        let engine = DesignTokenUtils::new(&config(json!({
            "tokens": { "color": { "gray": { "100": "#f1f5f9" } }, "textSize": { "step-0": "1rem" } },
            "customProperties": [{ "id": "color.gray", "prefix": "shade" }],
            "utilityClasses": [
                { "id": "color.gray", "property": "color" },
                { "id": "textSize", "property": "font-size", "prefix": "" },
            ],
        })))
        .expect("engine");
        let declared = engine
            .records()
            .iter()
            .map(|record| record.prop.clone())
            .collect::<Vec<_>>();
        for class in engine.classes() {
            let referenced = class
                .value
                .strip_prefix("var(")
                .and_then(|value| value.strip_suffix(')'))
                .expect("var reference");
            assert!(declared.iter().any(|prop| prop == referenced));
        }
    }

    #[test]
    fn same_config_gives_identical_output() {
        let first = run(&grouped_engine(), "(custom-properties: all)", false);
        let second = run(&grouped_engine(), "(custom-properties: all)", false);
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_invalid_utility_class() {
        let config = Config {
            utility_classes: vec![UtilityClassConfig {
                id: "space".to_string(),
                property: Properties::Many(Vec::new()),
                prefix: None,
                responsive_variants: false,
            }],
            custom_properties: vec![CustomPropertyScope {
                id: "space".to_string(),
                prefix: None,
                group: None,
            }],
            ..Config::default()
        };
        assert!(matches!(
            DesignTokenUtils::new(&config),
            Err(TokenError::InvalidUtilityClass { .. })
        ));
    }
}
