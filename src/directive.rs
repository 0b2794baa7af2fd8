//! Marker directive recognition and the builder interface the generated
//! output is constructed through.
//!
//! Two directive forms are recognised on the `@design-token-utils` at-rule:
//!
//! ```css
//! :root {
//!   @design-token-utils (custom-properties: font, space);
//! }
//!
//! @design-token-utils (utility-classes);
//! ```
//!
//! The custom-properties form only applies inside a rule and the
//! utility-classes form only at the top level of the stylesheet. A directive in
//! the wrong place is left where it is.

pub const DIRECTIVE_NAME: &str = "design-token-utils";

const CUSTOM_PROPERTIES_ARG: &str = "custom-properties";
const UTILITY_CLASSES_MARKER: &str = "(utility-classes)";

/// Node construction and diagnostics provided by the stylesheet host.
pub trait StylesheetBuilder {
    type Node;

    fn declaration(&mut self, property: &str, value: &str) -> Self::Node;

    fn rule(&mut self, selector: &str, declarations: Vec<Self::Node>) -> Self::Node;

    /// A conditional group such as `@media (min-width: 40rem)` wrapping rules.
    fn conditional_block(&mut self, condition: &str, rules: Vec<Self::Node>) -> Self::Node;

    /// Reports a non-fatal problem; must not abort the transform.
    fn warn(&mut self, message: &str);
}

/// An at-rule found in the host tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSite<'a> {
    pub name: &'a str,
    pub params: &'a str,
    pub at_root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    CustomProperties(GroupFilter),
    UtilityClasses,
}

impl Directive {
    pub fn recognize(site: &DirectiveSite<'_>) -> Option<Self> {
        if site.name != DIRECTIVE_NAME {
            return None;
        }
        let custom_marker = format!("({}", CUSTOM_PROPERTIES_ARG);
        if site.params.contains(&custom_marker) && !site.at_root {
            let args = parse_at_rule_params(site.params, CUSTOM_PROPERTIES_ARG);
            return Some(Directive::CustomProperties(GroupFilter::from_args(args)));
        }
        if site.params.contains(UTILITY_CLASSES_MARKER) && site.at_root {
            return Some(Directive::UtilityClasses);
        }
        None
    }
}

/// Which token groups a custom-properties directive emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    Ungrouped,
    All,
    Groups(Vec<String>),
}

impl GroupFilter {
    pub fn from_args(args: Option<Vec<String>>) -> Self {
        match args {
            None => GroupFilter::Ungrouped,
            Some(args) if args.iter().any(|arg| arg == "all") => GroupFilter::All,
            Some(args) => GroupFilter::Groups(args),
        }
    }

    pub fn accepts(&self, group: Option<&str>) -> bool {
        match self {
            GroupFilter::Ungrouped => group.is_none(),
            GroupFilter::All => true,
            GroupFilter::Groups(groups) => {
                group.is_some_and(|group| groups.iter().any(|candidate| candidate == group))
            }
        }
    }
}

/// Parses the argument list of `(<arg_name>: a, b)`.
///
/// Whitespace is ignored. Returns `None` when the params carry no arguments.
pub fn parse_at_rule_params(params: &str, arg_name: &str) -> Option<Vec<String>> {
    let compact = params
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>();
    let start = format!("({}:", arg_name);
    let inner = compact.strip_prefix(&start)?.strip_suffix(')')?;
    let args = inner
        .split(',')
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if args.is_empty() {
        None
    } else {
        Some(args)
    }
}
