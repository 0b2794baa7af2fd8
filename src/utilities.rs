use crate::case::kebab_case;
use crate::config::UtilityClassConfig;
use crate::tokens::TokenRecord;

/// A generated utility class before it is bound to a viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    /// Class name without the leading `.` or any viewport prefix.
    pub selector_base: String,
    pub properties: Vec<String>,
    /// Always a `var(--…)` reference to the token's custom property.
    pub value: String,
    pub skip_viewport_variant: bool,
}

impl ClassRecord {
    pub fn selector(&self) -> String {
        format!(".{}", self.selector_base)
    }

    pub fn viewport_selector(&self, label: &str, separator: &str) -> String {
        format!(".{}{}{}", label, separator, self.selector_base)
    }
}

/// Expands every utility class entry against the records of the token branch
/// it names, entries first, then records in flattening order.
pub fn expand(records: &[TokenRecord], utility_classes: &[UtilityClassConfig]) -> Vec<ClassRecord> {
    let mut classes = Vec::new();

    for utility in utility_classes {
        let selector_prefix = utility
            .prefix
            .clone()
            .unwrap_or_else(|| kebab_case(&utility.id));
        let properties = utility.property.to_vec();
        let before = classes.len();

        for record in records
            .iter()
            .filter(|record| record.parent_id.as_deref() == Some(utility.id.as_str()))
        {
            let selector_base = if selector_prefix.is_empty() {
                record.name.clone()
            } else {
                format!("{}-{}", selector_prefix, record.name)
            };
            classes.push(ClassRecord {
                selector_base,
                properties: properties.clone(),
                value: record.var_reference(),
                skip_viewport_variant: !utility.responsive_variants,
            });
        }

        if classes.len() == before {
            tracing::debug!(id = %utility.id, "utility class entry matched no tokens");
        }
    }

    tracing::debug!(classes = classes.len(), "expanded utility classes");
    classes
}

#[cfg(test)]
mod tests {
    use super::{expand, ClassRecord};
    use crate::config::{Properties, UtilityClassConfig};
    use crate::tokens::{flatten, TokenRecord, TokenScopes, TokenTree};
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<TokenRecord> {
        let tree: TokenTree = serde_json::from_value(value).expect("token tree should parse");
        flatten(&tree, &TokenScopes::default()).expect("flatten")
    }

    fn utility(id: &str, property: Properties, prefix: Option<&str>) -> UtilityClassConfig {
        UtilityClassConfig {
            id: id.to_string(),
            property,
            prefix: prefix.map(str::to_string),
            responsive_variants: false,
        }
    }

    #[test]
    fn expands_one_class_per_token() {
        let records = records(json!({ "color": { "accent": "#ff0", "dark": "#111" } }));
        let classes = expand(&records, &[utility("color", "color".into(), None)]);
        assert_eq!(
            classes,
            vec![
                ClassRecord {
                    selector_base: "color-accent".to_string(),
                    properties: vec!["color".to_string()],
                    value: "var(--color-accent)".to_string(),
                    skip_viewport_variant: true,
                },
                ClassRecord {
                    selector_base: "color-dark".to_string(),
                    properties: vec!["color".to_string()],
                    value: "var(--color-dark)".to_string(),
                    skip_viewport_variant: true,
                },
            ]
        );
    }

    #[test]
    fn uses_prefix_and_default_kebab_id() {
        let records = records(json!({
            "color": { "accent": "#ff0" },
            "textSize": { "step-0": "1rem" },
            "lineHeight": { "tight": 1.1 },
        }));
        let classes = expand(
            &records,
            &[
                utility("color", "color".into(), Some("text")),
                utility("textSize", "font-size".into(), Some("")),
                utility("lineHeight", "line-height".into(), None),
            ],
        );
        let selectors = classes
            .iter()
            .map(ClassRecord::selector)
            .collect::<Vec<_>>();
        assert_eq!(selectors, vec![".text-accent", ".step-0", ".line-height-tight"]);
        assert_eq!(classes[1].value, "var(--text-size-step-0)");
    }

    #[test]
    fn carries_multiple_properties() {
        let records = records(json!({ "space": { "m": "1rem", "l": "2rem" } }));
        let classes = expand(
            &records,
            &[utility(
                "space",
                vec!["margin-top", "margin-bottom"].into(),
                Some("margin-y"),
            )],
        );
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].selector_base, "margin-y-m");
        assert_eq!(classes[0].properties, vec!["margin-top", "margin-bottom"]);
        assert_eq!(classes[0].value, "var(--space-m)");
    }

    #[test]
    fn responsive_flag_controls_viewport_variants() {
        let records = records(json!({ "color": { "accent": "#ff0" }, "space": { "m": "1rem" } }));
        let mut responsive = utility("color", "color".into(), Some("text"));
        responsive.responsive_variants = true;
        let classes = expand(&records, &[responsive, utility("space", "gap".into(), None)]);
        assert!(!classes[0].skip_viewport_variant);
        assert!(classes[1].skip_viewport_variant);
        assert_eq!(classes[0].viewport_selector("sm", "\\:"), ".sm\\:text-accent");
    }

    #[test]
    fn unmatched_entry_yields_nothing() {
        let records = records(json!({ "color": { "accent": "#ff0" } }));
        let classes = expand(&records, &[utility("space", "margin".into(), None)]);
        assert!(classes.is_empty());
    }

    #[test]
    fn matches_nested_branch_ids() {
        let records = records(json!({ "color": { "gray": { "100": "#f1f5f9" } } }));
        let classes = expand(&records, &[utility("color.gray", "color".into(), None)]);
        assert_eq!(classes[0].selector_base, "color-gray-100");
        assert_eq!(classes[0].value, "var(--color-gray-100)");
    }
}
