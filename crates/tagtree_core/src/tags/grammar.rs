//! Tag string grammar.
//!
//! # Responsibility
//! - Split a raw tag string into typed tokens.
//! - Parse tokens into plain tags, type tag, relations and matrix config.
//! - Serialize parsed facts back into a tag string.
//!
//! # Invariants
//! - Tokens are split on `,`, trimmed, and empty tokens are dropped.
//! - A `values::` token keeps the comma fragments that follow it up to the
//!   last one holding a `;`, stopping early at any prefixed or relation
//!   fragment. A payload whose last value contains `,` is written with a
//!   closing `;` so the value survives the next split.
//! - Prefixed tokens (`type::`, `source-item::`, `target-item::`, `values::`)
//!   are classified before relation scanning.
//! - A relation splits on the first `>>` only.
//! - Parsing never fails; malformed input degrades to plain tags or empties.

use serde::{Deserialize, Serialize};

/// Separator used when joining tokens into a tag string.
pub const TOKEN_SEPARATOR: &str = ", ";
/// Separator between relation label and target title.
pub const RELATION_SEPARATOR: &str = ">>";
/// Prefix of the item classifier token.
pub const TYPE_PREFIX: &str = "type::";
/// Prefix of the matrix row-axis token.
pub const SOURCE_ITEM_PREFIX: &str = "source-item::";
/// Prefix of the matrix column-axis token.
pub const TARGET_ITEM_PREFIX: &str = "target-item::";
/// Prefix of the permitted matrix values token.
pub const VALUES_PREFIX: &str = "values::";
/// Separator inside the `values::` payload.
pub const VALUES_SEPARATOR: char = ';';
/// Type tag value marking matrix items.
pub const MATRIX_TYPE: &str = "matrix";

/// Directed labeled edge from the owning item to a target title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    /// Free-text relation label, e.g. `high` or `🟩 supports (+2)`.
    pub relation: String,
    /// Title of the target item.
    pub target: String,
}

impl Relation {
    pub fn new(relation: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            target: target.into(),
        }
    }

    /// Renders this relation as a `label>>target` token.
    pub fn to_token(&self) -> String {
        format!("{}{RELATION_SEPARATOR}{}", self.relation, self.target)
    }
}

/// Matrix configuration carried by a matrix item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Title of the row-axis item.
    pub source: Option<String>,
    /// Title of the column-axis item.
    pub target: Option<String>,
    /// Permitted cell values, in declaration order.
    pub values: Vec<String>,
}

/// Classified form of one tag token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagToken {
    Plain(String),
    Type(String),
    Relation(Relation),
    SourceItem(String),
    TargetItem(String),
    Values(Vec<String>),
}

impl TagToken {
    /// Classifies one already-trimmed, non-empty token.
    pub fn classify(token: &str) -> Self {
        let token = token.trim();
        if let Some(value) = token.strip_prefix(TYPE_PREFIX) {
            return Self::Type(value.trim().to_string());
        }
        if let Some(value) = token.strip_prefix(SOURCE_ITEM_PREFIX) {
            return Self::SourceItem(value.trim().to_string());
        }
        if let Some(value) = token.strip_prefix(TARGET_ITEM_PREFIX) {
            return Self::TargetItem(value.trim().to_string());
        }
        if let Some(value) = token.strip_prefix(VALUES_PREFIX) {
            return Self::Values(split_values(value));
        }
        if let Some((label, target)) = token.split_once(RELATION_SEPARATOR) {
            return Self::Relation(Relation::new(label.trim(), target.trim()));
        }
        Self::Plain(token.to_string())
    }

    /// Renders the token back to its textual form.
    pub fn render(&self) -> String {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Type(value) => format!("{TYPE_PREFIX}{value}"),
            Self::Relation(relation) => relation.to_token(),
            Self::SourceItem(value) => format!("{SOURCE_ITEM_PREFIX}{value}"),
            Self::TargetItem(value) => format!("{TARGET_ITEM_PREFIX}{value}"),
            Self::Values(values) => {
                let mut rendered =
                    format!("{VALUES_PREFIX}{}", values.join(&VALUES_SEPARATOR.to_string()));
                if values.last().is_some_and(|value| value.contains(',')) {
                    rendered.push(VALUES_SEPARATOR);
                }
                rendered
            }
        }
    }

    /// Returns whether this token belongs to the matrix config block.
    pub fn is_matrix_config(&self) -> bool {
        matches!(
            self,
            Self::SourceItem(_) | Self::TargetItem(_) | Self::Values(_)
        )
    }
}

/// All facts derived from one tag string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTags {
    /// Bare labels, in order of appearance.
    pub plain: Vec<String>,
    /// Value of the `type::` token. The last one wins when several exist.
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    /// Directed relations, in order of appearance.
    pub relations: Vec<Relation>,
    /// Present when at least one matrix config token exists.
    pub matrix_config: Option<MatrixConfig>,
}

impl ParsedTags {
    /// Returns whether the plain tags contain `tag`.
    pub fn has_plain(&self, tag: &str) -> bool {
        self.plain.iter().any(|value| value == tag)
    }

    /// Returns whether this item is classified as a matrix.
    pub fn is_matrix(&self) -> bool {
        self.type_tag.as_deref() == Some(MATRIX_TYPE)
    }
}

/// Splits a raw tag string into trimmed, non-empty tokens.
///
/// Commas inside a `values::` payload stay within that token.
pub fn split_tokens(tags: &str) -> Vec<String> {
    let fragments: Vec<&str> = tags
        .split(',')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    let mut tokens = Vec::with_capacity(fragments.len());
    let mut index = 0;
    while index < fragments.len() {
        let fragment = fragments[index];
        index += 1;
        if !fragment.starts_with(VALUES_PREFIX) {
            tokens.push(fragment.to_string());
            continue;
        }

        let run_end = fragments[index..]
            .iter()
            .position(|next| opens_token(next))
            .map_or(fragments.len(), |offset| index + offset);
        let absorbed_end = fragments[index..run_end]
            .iter()
            .rposition(|next| next.contains(VALUES_SEPARATOR))
            .map_or(index, |offset| index + offset + 1);

        let mut token = fragment.to_string();
        for continuation in &fragments[index..absorbed_end] {
            token.push_str(TOKEN_SEPARATOR);
            token.push_str(continuation);
        }
        tokens.push(token);
        index = absorbed_end;
    }
    tokens
}

/// Returns whether `value` can sit inside one token as a title or relation
/// label without changing how the tag string splits.
pub fn fits_single_token(value: &str) -> bool {
    !value.contains(',') && !value.contains(RELATION_SEPARATOR)
}

fn opens_token(fragment: &str) -> bool {
    [TYPE_PREFIX, SOURCE_ITEM_PREFIX, TARGET_ITEM_PREFIX, VALUES_PREFIX]
        .iter()
        .any(|prefix| fragment.starts_with(prefix))
        || fragment.contains(RELATION_SEPARATOR)
}

/// Joins tokens with `, `, skipping empty ones.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| token.as_ref().trim())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(TOKEN_SEPARATOR)
}

/// Parses a raw tag string into typed facts.
pub fn parse_tags(tags: &str) -> ParsedTags {
    let mut parsed = ParsedTags::default();
    for token in split_tokens(tags) {
        match TagToken::classify(&token) {
            TagToken::Plain(value) => parsed.plain.push(value),
            TagToken::Type(value) => parsed.type_tag = Some(value),
            TagToken::Relation(relation) => parsed.relations.push(relation),
            TagToken::SourceItem(value) => {
                parsed.matrix_config.get_or_insert_with(Default::default).source = Some(value);
            }
            TagToken::TargetItem(value) => {
                parsed.matrix_config.get_or_insert_with(Default::default).target = Some(value);
            }
            TagToken::Values(values) => {
                parsed.matrix_config.get_or_insert_with(Default::default).values = values;
            }
        }
    }
    parsed
}

/// Serializes parsed facts back into a tag string.
///
/// Order: type, matrix config, plain tags, relations.
pub fn serialize_tags(parsed: &ParsedTags) -> String {
    let mut tokens = Vec::new();
    if let Some(type_tag) = &parsed.type_tag {
        tokens.push(TagToken::Type(type_tag.clone()).render());
    }
    if let Some(config) = &parsed.matrix_config {
        tokens.extend(render_matrix_config(config));
    }
    tokens.extend(parsed.plain.iter().cloned());
    tokens.extend(parsed.relations.iter().map(Relation::to_token));
    join_tokens(&tokens)
}

/// Renders the matrix config block. `values::` is omitted when empty.
pub fn render_matrix_config(config: &MatrixConfig) -> Vec<String> {
    let mut tokens = Vec::new();
    if let Some(source) = &config.source {
        tokens.push(TagToken::SourceItem(source.clone()).render());
    }
    if let Some(target) = &config.target {
        tokens.push(TagToken::TargetItem(target.clone()).render());
    }
    if !config.values.is_empty() {
        tokens.push(TagToken::Values(config.values.clone()).render());
    }
    tokens
}

fn split_values(payload: &str) -> Vec<String> {
    payload
        .split(VALUES_SEPARATOR)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
