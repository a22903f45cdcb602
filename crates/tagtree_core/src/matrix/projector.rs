//! Row/column relation matrix over two sibling subtrees.
//!
//! # Responsibility
//! - Project relations from row items to column items into a dense grid.
//! - Write grid edits back as relation tags on row items.
//! - Rebuild the config block (`type::matrix`, `source-item::`,
//!   `target-item::`, `values::`) on the matrix item.
//!
//! # Invariants
//! - Rows and columns are direct children of the axis items that carry no
//!   `type::` tag.
//! - A cell holds the label of the row's relation whose target equals the
//!   column title. When several exist, the last one wins.
//! - Commit clears every relation from a row to any current column before
//!   writing non-empty cells, so emptied cells drop their relation.

use crate::model::item::{Item, ItemId};
use crate::tags::grammar::{
    fits_single_token, join_tokens, parse_tags, render_matrix_config, split_tokens,
    MatrixConfig, Relation, TagToken, MATRIX_TYPE,
};
use crate::tags::strength::{strength_of, Strength};
use crate::tree::index::{find_by_id, find_by_id_mut, find_id_by_title};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for matrix commit.
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Errors from matrix commit and config resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// `commit` was called before a successful `build`.
    NothingToCommit,
    /// Matrix item id is not in the tree.
    MatrixItemNotFound(ItemId),
    /// Matrix item lacks `source-item::` or `target-item::`.
    IncompleteConfig(ItemId),
    /// A configured axis title does not resolve to an item.
    AxisTitleNotFound(String),
    /// Axis item is missing or has no children.
    AxisUnavailable(ItemId),
    /// Row/column pair is not part of the grid.
    CellNotFound { row_id: ItemId, column_id: ItemId },
    /// Cell label would split into several tokens once written as a relation.
    InvalidCellValue(String),
}

impl Display for MatrixError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToCommit => write!(f, "no matrix data to save; build a matrix first"),
            Self::MatrixItemNotFound(id) => write!(f, "matrix item not found: {id}"),
            Self::IncompleteConfig(id) => {
                write!(f, "matrix item {id} lacks source-item or target-item config")
            }
            Self::AxisTitleNotFound(title) => write!(f, "matrix axis item not found: `{title}`"),
            Self::AxisUnavailable(id) => {
                write!(f, "matrix axis item {id} is missing or has no children")
            }
            Self::CellNotFound { row_id, column_id } => {
                write!(f, "matrix cell not found: row={row_id} column={column_id}")
            }
            Self::InvalidCellValue(value) => {
                write!(f, "matrix cell value `{value}` must not contain `,` or `>>`")
            }
        }
    }
}

impl Error for MatrixError {}

/// One row or column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisEntry {
    pub id: ItemId,
    pub title: String,
}

/// Dense relation grid between two axis subtrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub source_id: ItemId,
    pub source_title: String,
    pub target_id: ItemId,
    pub target_title: String,
    pub rows: Vec<AxisEntry>,
    pub columns: Vec<AxisEntry>,
    /// `row id -> column id -> relation label`. Every row/column pair has an
    /// entry; `None` marks an empty cell.
    pub data: BTreeMap<ItemId, BTreeMap<ItemId, Option<String>>>,
    pub permitted_values: Vec<String>,
}

impl Matrix {
    pub fn cell(&self, row_id: &str, column_id: &str) -> Option<&str> {
        self.data
            .get(row_id)
            .and_then(|row| row.get(column_id))
            .and_then(|value| value.as_deref())
    }

    /// Assigns one cell. Blank values clear the cell.
    ///
    /// Labels containing `,` or `>>` are rejected; they would not survive
    /// the round trip through the row's tag string.
    pub fn set_cell(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: Option<&str>,
    ) -> MatrixResult<()> {
        let value = value.map(str::trim).filter(|value| !value.is_empty());
        if let Some(label) = value {
            if !fits_single_token(label) {
                return Err(MatrixError::InvalidCellValue(label.to_string()));
            }
        }
        let cell = self
            .data
            .get_mut(row_id)
            .and_then(|row| row.get_mut(column_id))
            .ok_or_else(|| MatrixError::CellNotFound {
                row_id: row_id.to_string(),
                column_id: column_id.to_string(),
            })?;
        *cell = value.map(str::to_string);
        Ok(())
    }

    /// Strength of a cell's label, for presentation.
    pub fn cell_strength(&self, row_id: &str, column_id: &str) -> Option<Strength> {
        self.cell(row_id, column_id).map(strength_of)
    }

    /// Number of non-empty cells.
    pub fn filled_cells(&self) -> usize {
        self.data
            .values()
            .flat_map(|row| row.values())
            .filter(|value| value.is_some())
            .count()
    }
}

/// Counts reported by a successful commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixCommitSummary {
    /// Row items whose tags were rewritten.
    pub rows_written: usize,
    /// Relation tokens emitted across all rows.
    pub relations_written: usize,
}

/// Builds the grid for `source_id` rows against `target_id` columns.
///
/// Returns `None` when either axis id is unknown or has no children.
pub fn build_matrix(
    items: &[Item],
    source_id: &str,
    target_id: &str,
    permitted_values: &[String],
) -> Option<Matrix> {
    let source = find_by_id(items, source_id).filter(|item| item.has_children())?;
    let target = find_by_id(items, target_id).filter(|item| item.has_children())?;

    let rows = axis_entries(source);
    let columns = axis_entries(target);

    let mut data = BTreeMap::new();
    for row in &rows {
        let mut cells: BTreeMap<ItemId, Option<String>> = columns
            .iter()
            .map(|column| (column.id.clone(), None))
            .collect();
        let relations = find_by_id(items, &row.id)
            .map(|item| parse_tags(&item.tags).relations)
            .unwrap_or_default();
        for relation in relations {
            for column in columns.iter().filter(|column| column.title == relation.target) {
                cells.insert(column.id.clone(), Some(relation.relation.clone()));
            }
        }
        data.insert(row.id.clone(), cells);
    }

    Some(Matrix {
        source_id: source.id.clone(),
        source_title: source.title.clone(),
        target_id: target.id.clone(),
        target_title: target.title.clone(),
        rows,
        columns,
        data,
        permitted_values: permitted_values
            .iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect(),
    })
}

/// Reads the matrix item's own config and builds its grid.
pub fn build_matrix_from_config(items: &[Item], matrix_item_id: &str) -> MatrixResult<Matrix> {
    let matrix_item = find_by_id(items, matrix_item_id)
        .ok_or_else(|| MatrixError::MatrixItemNotFound(matrix_item_id.to_string()))?;
    let config = parse_tags(&matrix_item.tags).matrix_config.unwrap_or_default();
    let (Some(source_title), Some(target_title)) = (&config.source, &config.target) else {
        return Err(MatrixError::IncompleteConfig(matrix_item_id.to_string()));
    };
    let source_id = find_id_by_title(items, source_title)
        .ok_or_else(|| MatrixError::AxisTitleNotFound(source_title.clone()))?;
    let target_id = find_id_by_title(items, target_title)
        .ok_or_else(|| MatrixError::AxisTitleNotFound(target_title.clone()))?;

    build_matrix(items, source_id, target_id, &config.values).ok_or_else(|| {
        let unavailable = if find_by_id(items, source_id).is_some_and(Item::has_children) {
            target_id
        } else {
            source_id
        };
        MatrixError::AxisUnavailable(unavailable.to_string())
    })
}

/// Writes grid cells back into row tags and rebuilds the matrix item config.
pub fn commit_matrix(
    items: &mut [Item],
    matrix: &Matrix,
    matrix_item_id: &str,
) -> MatrixResult<MatrixCommitSummary> {
    if find_by_id(items, matrix_item_id).is_none() {
        return Err(MatrixError::MatrixItemNotFound(matrix_item_id.to_string()));
    }

    let column_titles: HashSet<&str> = matrix
        .columns
        .iter()
        .map(|column| column.title.as_str())
        .collect();

    let mut summary = MatrixCommitSummary::default();
    for row in &matrix.rows {
        let Some(row_item) = find_by_id_mut(items, &row.id) else {
            continue;
        };
        let mut tokens: Vec<String> = split_tokens(&row_item.tags)
            .into_iter()
            .filter(|token| match TagToken::classify(token) {
                TagToken::Relation(relation) => !column_titles.contains(relation.target.as_str()),
                _ => true,
            })
            .collect();
        for column in &matrix.columns {
            if let Some(label) = matrix.cell(&row.id, &column.id) {
                tokens.push(Relation::new(label, column.title.clone()).to_token());
                summary.relations_written += 1;
            }
        }
        row_item.tags = join_tokens(&tokens);
        summary.rows_written += 1;
    }

    if let Some(matrix_item) = find_by_id_mut(items, matrix_item_id) {
        matrix_item.tags = matrix_item_tags(&matrix_item.tags, matrix);
    }
    Ok(summary)
}

fn matrix_item_tags(existing: &str, matrix: &Matrix) -> String {
    let mut plain = Vec::new();
    let mut relations = Vec::new();
    for token in split_tokens(existing) {
        match TagToken::classify(&token) {
            TagToken::Plain(_) => plain.push(token),
            TagToken::Relation(_) => relations.push(token),
            TagToken::Type(_)
            | TagToken::SourceItem(_)
            | TagToken::TargetItem(_)
            | TagToken::Values(_) => {}
        }
    }

    let config = MatrixConfig {
        source: Some(matrix.source_title.clone()),
        target: Some(matrix.target_title.clone()),
        values: matrix.permitted_values.clone(),
    };
    let mut tokens = vec![TagToken::Type(MATRIX_TYPE.to_string()).render()];
    tokens.extend(render_matrix_config(&config));
    tokens.extend(plain);
    tokens.extend(relations);
    join_tokens(&tokens)
}

fn axis_entries(axis: &Item) -> Vec<AxisEntry> {
    axis.items
        .iter()
        .filter(|child| parse_tags(&child.tags).type_tag.is_none())
        .map(|child| AxisEntry {
            id: child.id.clone(),
            title: child.title.clone(),
        })
        .collect()
}

/// Stateful projector that remembers the last built matrix.
#[derive(Debug, Default)]
pub struct MatrixProjector {
    current: Option<Matrix>,
}

impl MatrixProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and remembers a grid. Returns `None` on unresolved axes and
    /// clears any previous grid in that case.
    pub fn build(
        &mut self,
        items: &[Item],
        source_id: &str,
        target_id: &str,
        permitted_values: &[String],
    ) -> Option<&Matrix> {
        self.current = build_matrix(items, source_id, target_id, permitted_values);
        self.current.as_ref()
    }

    /// Builds and remembers the grid described by a matrix item's config.
    pub fn build_from_config(
        &mut self,
        items: &[Item],
        matrix_item_id: &str,
    ) -> MatrixResult<&Matrix> {
        self.current = None;
        let matrix = build_matrix_from_config(items, matrix_item_id)?;
        Ok(self.current.insert(matrix))
    }

    pub fn matrix(&self) -> Option<&Matrix> {
        self.current.as_ref()
    }

    pub fn matrix_mut(&mut self) -> Option<&mut Matrix> {
        self.current.as_mut()
    }

    /// Edits one cell of the current grid.
    pub fn set_cell(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: Option<&str>,
    ) -> MatrixResult<()> {
        self.current
            .as_mut()
            .ok_or(MatrixError::NothingToCommit)?
            .set_cell(row_id, column_id, value)
    }

    /// Commits the current grid into `items`.
    pub fn commit(
        &self,
        items: &mut [Item],
        matrix_item_id: &str,
    ) -> MatrixResult<MatrixCommitSummary> {
        let matrix = self.current.as_ref().ok_or(MatrixError::NothingToCommit)?;
        commit_matrix(items, matrix, matrix_item_id)
    }
}
