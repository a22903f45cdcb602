//! Document use-case service.
//!
//! # Responsibility
//! - Own the live document and apply every mutation copy-on-write.
//! - Gate renames and reorders behind a caller-supplied confirmation.
//! - Keep the relation and title indexes in step with the live document.
//!
//! # Invariants
//! - Mutations clone the items, edit the clone, then swap it in. A failed or
//!   declined mutation leaves the live document untouched.
//! - `generation` increases on every swap; proposals and matrix sessions
//!   built on an older generation are rejected.
//! - Titles never contain `,` or `>>`, since relations embed them in tag
//!   strings.
//! - Logs carry ids and counts only, never titles, content or tag text.

use crate::filter::tag_filter::{filter_tree, FilterMode};
use crate::graph::relation_index::RelationIndex;
use crate::graph::relations::{propagate_rename, IncomingRelation};
use crate::matrix::projector::{Matrix, MatrixCommitSummary, MatrixError, MatrixProjector};
use crate::model::document::Document;
use crate::model::item::{Item, ItemId};
use crate::tags::grammar::fits_single_token;
use crate::tree::index::{
    find_by_id, find_by_id_mut, insert, move_within_parent, remove, sibling_index,
};
use crate::tree::title_index::{DuplicateTitle, TitleIndex};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Question put to the collaborator before a gated mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationPrompt {
    /// Rename affects relations held by other items.
    RenameRelations {
        item_id: ItemId,
        old_title: String,
        new_title: String,
        affected_relations: usize,
    },
    /// Sibling reorder awaiting approval.
    Reorder {
        item_id: ItemId,
        from_index: usize,
        to_index: usize,
    },
}

/// Collaborator callback deciding gated mutations.
pub trait Confirmation {
    fn confirm(&mut self, prompt: &ConfirmationPrompt) -> bool;
}

impl<F> Confirmation for F
where
    F: FnMut(&ConfirmationPrompt) -> bool,
{
    fn confirm(&mut self, prompt: &ConfirmationPrompt) -> bool {
        self(prompt)
    }
}

/// Errors from document service operations.
#[derive(Debug)]
pub enum DocumentServiceError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Title contains `,` or `>>` and could not be a relation target.
    TitleHasSeparator(String),
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Parent item does not exist.
    ParentNotFound(ItemId),
    /// Proposal was built against an older document generation.
    StaleProposal { proposed: u64, current: u64 },
    /// Matrix was built against an older document generation.
    StaleMatrix { built: u64, current: u64 },
    /// Matrix build or commit failure.
    Matrix(MatrixError),
}

impl Display for DocumentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "item title must not be blank"),
            Self::TitleHasSeparator(title) => {
                write!(f, "item title `{title}` must not contain `,` or `>>`")
            }
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent item not found: {id}"),
            Self::StaleProposal { proposed, current } => write!(
                f,
                "proposal built on generation {proposed}, document is at {current}"
            ),
            Self::StaleMatrix { built, current } => write!(
                f,
                "matrix built on generation {built}, document is at {current}; rebuild it"
            ),
            Self::Matrix(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Matrix(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MatrixError> for DocumentServiceError {
    fn from(value: MatrixError) -> Self {
        Self::Matrix(value)
    }
}

/// Result type used by document service operations.
pub type DocumentServiceResult<T> = Result<T, DocumentServiceError>;

/// Tentative document produced by `propose_*`; drop it to cancel.
#[derive(Debug, Clone)]
pub struct Proposal {
    base_generation: u64,
    items: Vec<Item>,
}

impl Proposal {
    /// Items as they would look after commit.
    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

/// Outcome of a rename request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOutcome {
    /// Relations pointing at the old title before the rename.
    pub affected_relations: usize,
    /// Relation tokens rewritten to the new title.
    pub rewritten_relations: usize,
}

/// Document service facade.
pub struct DocumentService {
    document: Document,
    generation: u64,
    relations: RelationIndex,
    titles: TitleIndex,
    matrix: MatrixProjector,
    matrix_generation: Option<u64>,
}

impl DocumentService {
    /// Wraps a loaded document and builds its indexes.
    pub fn new(document: Document) -> Self {
        let relations = RelationIndex::build(&document.items);
        let titles = TitleIndex::build(&document.items);
        let service = Self {
            document,
            generation: 0,
            relations,
            titles,
            matrix: MatrixProjector::new(),
            matrix_generation: None,
        };
        service.report_duplicate_titles();
        service
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get_item(&self, id: &str) -> Option<&Item> {
        find_by_id(&self.document.items, id)
    }

    /// Titles shared by several items.
    pub fn duplicate_titles(&self) -> Vec<DuplicateTitle> {
        self.titles.duplicates()
    }

    /// Creates an item under `parent_id`, or as a root when `None`.
    pub fn add_item(
        &mut self,
        parent_id: Option<&str>,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
    ) -> DocumentServiceResult<ItemId> {
        let title = normalize_title(title.into())?;
        let item = Item::new(title, content, tags);
        let id = item.id.clone();

        let mut next = self.document.items.clone();
        if !insert(&mut next, item, parent_id) {
            let parent = parent_id.unwrap_or_default().to_string();
            warn!("event=item_add module=service status=error reason=parent_not_found parent_id={parent}");
            return Err(DocumentServiceError::ParentNotFound(parent));
        }
        self.swap_in(next);
        info!("event=item_add module=service status=ok item_id={id}");
        Ok(id)
    }

    /// Replaces an item's content.
    pub fn update_content(
        &mut self,
        id: &str,
        content: impl Into<String>,
    ) -> DocumentServiceResult<()> {
        let content = content.into();
        self.edit_item(id, |item| item.content = content)?;
        info!("event=item_update_content module=service status=ok item_id={id}");
        Ok(())
    }

    /// Replaces an item's tag string.
    pub fn update_tags(&mut self, id: &str, tags: impl Into<String>) -> DocumentServiceResult<()> {
        let tags = tags.into();
        self.edit_item(id, |item| item.tags = tags)?;
        if !self.relations.refresh_item(&self.document.items, id) {
            self.relations.rebuild(&self.document.items);
        }
        info!("event=item_update_tags module=service status=ok item_id={id}");
        Ok(())
    }

    /// Deletes an item and its subtree.
    pub fn delete_item(&mut self, id: &str) -> DocumentServiceResult<()> {
        let mut next = self.document.items.clone();
        if !remove(&mut next, id) {
            return Err(DocumentServiceError::ItemNotFound(id.to_string()));
        }
        self.swap_in(next);
        info!("event=item_delete module=service status=ok item_id={id}");
        Ok(())
    }

    /// Renames an item.
    ///
    /// When other items hold relations to the old title, `confirmation`
    /// decides whether those relations follow the new title. Declining keeps
    /// the rename but leaves the relations pointing at the old title.
    pub fn rename_item(
        &mut self,
        id: &str,
        new_title: impl Into<String>,
        confirmation: &mut impl Confirmation,
    ) -> DocumentServiceResult<RenameOutcome> {
        let new_title = normalize_title(new_title.into())?;
        let old_title = self
            .get_item(id)
            .map(|item| item.title.clone())
            .ok_or_else(|| DocumentServiceError::ItemNotFound(id.to_string()))?;

        let affected_relations = self.relations.incoming(&old_title, Some(id)).len();
        let mut next = self.document.items.clone();
        if let Some(item) = find_by_id_mut(&mut next, id) {
            item.title = new_title.clone();
        }

        let mut rewritten_relations = 0;
        if affected_relations > 0 && old_title != new_title {
            let prompt = ConfirmationPrompt::RenameRelations {
                item_id: id.to_string(),
                old_title: old_title.clone(),
                new_title: new_title.clone(),
                affected_relations,
            };
            if confirmation.confirm(&prompt) {
                rewritten_relations = propagate_rename(&mut next, &old_title, &new_title);
            }
        }

        self.swap_in(next);
        info!(
            "event=item_rename module=service status=ok item_id={id} affected_relations={affected_relations} rewritten_relations={rewritten_relations}"
        );
        Ok(RenameOutcome {
            affected_relations,
            rewritten_relations,
        })
    }

    /// Builds a tentative sibling reorder without touching the live document.
    pub fn propose_reorder(
        &self,
        id: &str,
        target_index: usize,
    ) -> DocumentServiceResult<Proposal> {
        let mut items = self.document.items.clone();
        if !move_within_parent(&mut items, id, target_index) {
            return Err(DocumentServiceError::ItemNotFound(id.to_string()));
        }
        Ok(Proposal {
            base_generation: self.generation,
            items,
        })
    }

    /// Applies a proposal built on the current generation.
    pub fn commit_proposal(&mut self, proposal: Proposal) -> DocumentServiceResult<()> {
        if proposal.base_generation != self.generation {
            warn!(
                "event=proposal_commit module=service status=error reason=stale proposed={} current={}",
                proposal.base_generation, self.generation
            );
            return Err(DocumentServiceError::StaleProposal {
                proposed: proposal.base_generation,
                current: self.generation,
            });
        }
        self.swap_in(proposal.items);
        info!(
            "event=proposal_commit module=service status=ok generation={}",
            self.generation
        );
        Ok(())
    }

    /// Reorders an item among its siblings once `confirmation` approves.
    ///
    /// Returns `false` when the collaborator cancelled; the live document is
    /// unchanged in that case.
    pub fn reorder_item(
        &mut self,
        id: &str,
        target_index: usize,
        confirmation: &mut impl Confirmation,
    ) -> DocumentServiceResult<bool> {
        let from_index = sibling_index(&self.document.items, id)
            .ok_or_else(|| DocumentServiceError::ItemNotFound(id.to_string()))?;
        let proposal = self.propose_reorder(id, target_index)?;
        let prompt = ConfirmationPrompt::Reorder {
            item_id: id.to_string(),
            from_index,
            to_index: target_index,
        };
        if !confirmation.confirm(&prompt) {
            info!("event=item_reorder module=service status=cancelled item_id={id}");
            return Ok(false);
        }
        self.commit_proposal(proposal)?;
        Ok(true)
    }

    /// Filtered structural copy of the live tree.
    pub fn filter(
        &self,
        active_tags: &[String],
        mode: FilterMode,
        include_descendants: bool,
    ) -> Vec<Item> {
        filter_tree(&self.document.items, active_tags, mode, include_descendants)
    }

    /// Incoming relations of item `id`, served from the relation index.
    pub fn incoming_of(&self, id: &str) -> DocumentServiceResult<Vec<IncomingRelation>> {
        let item = self
            .get_item(id)
            .ok_or_else(|| DocumentServiceError::ItemNotFound(id.to_string()))?;
        Ok(self.relations.incoming(&item.title, Some(id)))
    }

    /// Resolves a title to an id. The first pre-order match wins.
    pub fn id_for_title(&self, title: &str) -> Option<&str> {
        self.titles.first_id(title)
    }

    /// Builds the matrix between two axis items and keeps it for editing.
    pub fn build_matrix(
        &mut self,
        source_id: &str,
        target_id: &str,
        permitted_values: &[String],
    ) -> Option<&Matrix> {
        let built = self
            .matrix
            .build(&self.document.items, source_id, target_id, permitted_values);
        if built.is_none() {
            warn!(
                "event=matrix_build module=service status=error reason=axis_unavailable source_id={source_id} target_id={target_id}"
            );
        }
        self.matrix_generation = built.is_some().then_some(self.generation);
        built
    }

    /// Builds the matrix described by a matrix item's config.
    pub fn build_matrix_from_config(
        &mut self,
        matrix_item_id: &str,
    ) -> DocumentServiceResult<&Matrix> {
        self.matrix_generation = None;
        let matrix = self
            .matrix
            .build_from_config(&self.document.items, matrix_item_id)?;
        self.matrix_generation = Some(self.generation);
        Ok(matrix)
    }

    /// Edits one cell of the matrix under construction.
    pub fn set_matrix_cell(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: Option<&str>,
    ) -> DocumentServiceResult<()> {
        Ok(self.matrix.set_cell(row_id, column_id, value)?)
    }

    /// Writes the current matrix back into the document.
    pub fn commit_matrix(
        &mut self,
        matrix_item_id: &str,
    ) -> DocumentServiceResult<MatrixCommitSummary> {
        if let Some(built) = self.matrix_generation.filter(|built| *built != self.generation) {
            warn!(
                "event=matrix_commit module=service status=error reason=stale matrix_item_id={matrix_item_id} built={built} current={}",
                self.generation
            );
            return Err(DocumentServiceError::StaleMatrix {
                built,
                current: self.generation,
            });
        }
        let mut next = self.document.items.clone();
        let summary = match self.matrix.commit(&mut next, matrix_item_id) {
            Ok(summary) => summary,
            Err(err) => {
                warn!(
                    "event=matrix_commit module=service status=error matrix_item_id={matrix_item_id} reason={err}"
                );
                return Err(err.into());
            }
        };
        self.swap_in(next);
        self.matrix_generation = Some(self.generation);
        info!(
            "event=matrix_commit module=service status=ok matrix_item_id={matrix_item_id} rows_written={} relations_written={}",
            summary.rows_written, summary.relations_written
        );
        Ok(summary)
    }

    fn edit_item(&mut self, id: &str, edit: impl FnOnce(&mut Item)) -> DocumentServiceResult<()> {
        let mut next = self.document.items.clone();
        let item = find_by_id_mut(&mut next, id)
            .ok_or_else(|| DocumentServiceError::ItemNotFound(id.to_string()))?;
        edit(item);
        self.document.items = next;
        self.generation += 1;
        Ok(())
    }

    fn swap_in(&mut self, items: Vec<Item>) {
        self.document.items = items;
        self.generation += 1;
        self.relations.rebuild(&self.document.items);
        self.titles = TitleIndex::build(&self.document.items);
        self.report_duplicate_titles();
    }

    fn report_duplicate_titles(&self) {
        for duplicate in self.titles.duplicates() {
            warn!(
                "event=duplicate_title module=service status=warn item_ids={}",
                duplicate.ids.join(";")
            );
        }
    }
}

fn normalize_title(value: String) -> DocumentServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DocumentServiceError::InvalidTitle);
    }
    if !fits_single_token(trimmed) {
        return Err(DocumentServiceError::TitleHasSeparator(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
